//! Remote-method descriptors
//!
//! A [`Method`] knows which JSON-RPC method to call, how many arguments it
//! takes and how to format arguments and results. Calling it is explicit:
//! [`Method::call_sync`] blocks, [`Method::call_async`] returns a future.

use std::fmt;

use serde_json::Value;

use crate::infrastructure::rpc::{RequestManager, RequestSpec, RpcError};

type Result<T> = std::result::Result<T, RpcError>;

/// Formats one call-site argument
pub type ParamFormatter = fn(&Value) -> Result<Value>;

/// Formats a non-null result
pub type OutputFormatter = fn(Value) -> Result<Value>;

/// How the JSON-RPC method name is chosen
#[derive(Clone, Copy)]
pub enum RpcCall {
    Fixed(&'static str),
    /// Picked from the raw arguments, e.g. by hash vs. number
    Select(fn(&[Value]) -> &'static str),
}

impl fmt::Debug for RpcCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcCall::Fixed(name) => f.debug_tuple("Fixed").field(name).finish(),
            RpcCall::Select(_) => f.write_str("Select(..)"),
        }
    }
}

/// Argument formatting strategy
#[derive(Clone, Copy, Default)]
pub enum InputFormatter {
    #[default]
    None,
    /// Same formatter for every argument
    All(ParamFormatter),
    /// One slot per position; `None` passes the argument through
    PerParam(&'static [Option<ParamFormatter>]),
}

impl fmt::Debug for InputFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormatter::None => f.write_str("None"),
            InputFormatter::All(_) => f.write_str("All(..)"),
            InputFormatter::PerParam(slots) => write!(f, "PerParam({} slots)", slots.len()),
        }
    }
}

/// A request built by [`Method::request`] together with the formatter for
/// its result, ready to be sent alone or inside a batch
#[derive(Clone)]
pub struct PreparedRequest {
    pub spec: RequestSpec,
    pub formatter: Option<OutputFormatter>,
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("spec", &self.spec)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl PreparedRequest {
    /// Apply the attached formatter; `null` passes through
    pub fn format_output(&self, result: Value) -> Result<Value> {
        apply_output(self.formatter, result)
    }
}

/// Descriptor of one client method
#[derive(Clone, Copy)]
pub struct Method {
    /// Client-facing name, possibly dotted (`compile.solidity`)
    pub name: &'static str,
    pub call: RpcCall,
    pub params: usize,
    pub inputs: InputFormatter,
    pub output: Option<OutputFormatter>,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("call", &self.call)
            .field("params", &self.params)
            .field("inputs", &self.inputs)
            .field("output", &self.output.is_some())
            .finish()
    }
}

impl Method {
    pub const fn new(name: &'static str, call: &'static str) -> Self {
        Self {
            name,
            call: RpcCall::Fixed(call),
            params: 0,
            inputs: InputFormatter::None,
            output: None,
        }
    }

    pub const fn select(name: &'static str, select: fn(&[Value]) -> &'static str) -> Self {
        Self {
            name,
            call: RpcCall::Select(select),
            params: 0,
            inputs: InputFormatter::None,
            output: None,
        }
    }

    pub const fn params(mut self, params: usize) -> Self {
        self.params = params;
        self
    }

    pub const fn inputs(mut self, inputs: InputFormatter) -> Self {
        self.inputs = inputs;
        self
    }

    pub const fn output(mut self, output: OutputFormatter) -> Self {
        self.output = Some(output);
        self
    }

    /// Resolve the JSON-RPC method name for these raw arguments
    pub fn method_name(&self, args: &[Value]) -> &'static str {
        match self.call {
            RpcCall::Fixed(name) => name,
            RpcCall::Select(select) => select(args),
        }
    }

    /// Format arguments positionally
    pub fn format_input(&self, args: Vec<Value>) -> Result<Vec<Value>> {
        match self.inputs {
            InputFormatter::None => Ok(args),
            InputFormatter::All(formatter) => args.iter().map(formatter).collect(),
            InputFormatter::PerParam(slots) => args
                .into_iter()
                .enumerate()
                .map(|(index, arg)| match slots.get(index).copied().flatten() {
                    Some(formatter) => formatter(&arg),
                    None => Ok(arg),
                })
                .collect(),
        }
    }

    pub fn format_output(&self, result: Value) -> Result<Value> {
        apply_output(self.output, result)
    }

    /// Resolve, format and count-check the arguments; nothing is sent
    pub fn to_spec(&self, args: Vec<Value>) -> Result<RequestSpec> {
        let method = self.method_name(&args);
        let params = self.format_input(args)?;
        if params.len() != self.params {
            return Err(RpcError::InvalidParamCount {
                method: method.to_string(),
                expected: self.params,
                got: params.len(),
            });
        }
        Ok(RequestSpec::new(method, params))
    }

    /// The request plus its result formatter, for batching
    pub fn request(&self, args: Vec<Value>) -> Result<PreparedRequest> {
        Ok(PreparedRequest {
            spec: self.to_spec(args)?,
            formatter: self.output,
        })
    }

    /// Send and wait on the calling thread
    pub fn call_sync(&self, manager: &RequestManager, args: Vec<Value>) -> Result<Value> {
        let spec = self.to_spec(args)?;
        let result = manager.send(&spec)?;
        self.format_output(result)
    }

    pub async fn call_async(&self, manager: &RequestManager, args: Vec<Value>) -> Result<Value> {
        let spec = self.to_spec(args)?;
        let result = manager.send_async(&spec).await?;
        self.format_output(result)
    }
}

fn apply_output(formatter: Option<OutputFormatter>, result: Value) -> Result<Value> {
    match formatter {
        Some(format) if !result.is_null() => format(result),
        _ => Ok(result),
    }
}
