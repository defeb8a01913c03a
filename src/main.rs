use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use ethwire::config;
use ethwire::domain::abi::{encode_call, parse_signature, selector, AbiCoder, AbiValue};
use ethwire::modules::eth::{find_method, BlockRef, FilterOptions, FilterSpec, WatchCallback};
use ethwire::utils::sha3;
use ethwire::{Client, RequestSpec, RpcError};

#[derive(Debug, Parser)]
#[command(
    name = "ethwire",
    version,
    about = "Solidity ABI codec and Ethereum JSON-RPC client"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545) or a configured endpoint name
    #[arg(long, global = true)]
    rpc: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// ABI-encode values: `encode uint256,uint256[] 5 [1,2,3]`
    Encode {
        /// Comma-separated parameter types
        types: String,
        values: Vec<String>,
    },
    /// Decode a hex blob against comma-separated types
    Decode { types: String, data: String },
    /// Print the 4-byte selector of a function signature
    Selector { signature: String },
    /// Keccak-256 of a UTF-8 string
    Keccak { text: String },
    /// Build call data: `calldata "transfer(address,uint256)" 0x.. 1000`
    Calldata { signature: String, args: Vec<String> },
    /// Send one JSON-RPC request; `eth.getBalance` style names use the formatters
    Rpc {
        method: String,
        /// Parameters as JSON, bare words are sent as strings
        params: Vec<String>,
    },
    /// Print the latest block number
    BlockNumber,
    /// Print the balance of an address in wei
    Balance {
        address: String,
        #[arg(long, default_value = "latest")]
        block: String,
    },
    /// Watch new blocks, pending transactions or logs until Ctrl-C
    Watch {
        /// `latest`, `pending` or `logs`
        #[arg(default_value = "latest")]
        target: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long = "topic")]
        topics: Vec<String>,
        #[arg(long)]
        from_block: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Encode { types, values } => {
            let coder = AbiCoder::default();
            let types = split_types(&types);
            let values = parse_values(&coder, &types, &values)?;
            println!("0x{}", coder.encode_params(&types, &values)?);
        }
        Command::Decode { types, data } => {
            let coder = AbiCoder::default();
            let types = split_types(&types);
            for (ty, value) in types.iter().zip(coder.decode_params(&types, &data)?) {
                println!("{ty}: {value}");
            }
        }
        Command::Selector { signature } => {
            println!("0x{}", hex::encode(selector(&signature)));
        }
        Command::Keccak { text } => {
            println!("{}", sha3(&text));
        }
        Command::Calldata { signature, args } => {
            let coder = AbiCoder::default();
            let (_, types) = parse_signature(&signature)?;
            let values = parse_values(&coder, &types, &args)?;
            println!("{}", encode_call(&coder, &signature, &values)?);
        }
        Command::Rpc { method, params } => {
            let client = connect(args.rpc.as_deref())?;
            let params: Vec<Value> = params.iter().map(String::as_str).map(parse_json_arg).collect();
            let result = match find_method(&method) {
                Some(known) => known.call_async(client.manager(), params).await?,
                None => {
                    client
                        .manager()
                        .send_async(&RequestSpec::new(method, params))
                        .await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::BlockNumber => {
            let client = connect(args.rpc.as_deref())?;
            println!("{}", client.eth().block_number().await?);
        }
        Command::Balance { address, block } => {
            let client = connect(args.rpc.as_deref())?;
            let address: Address = address.parse().context("invalid address")?;
            let block: BlockRef = block.parse()?;
            println!("{}", client.eth().balance(&address, block).await?);
        }
        Command::Watch {
            target,
            address,
            topics,
            from_block,
        } => {
            let client = connect(args.rpc.as_deref())?;
            let spec = match target.as_str() {
                "latest" => FilterSpec::Latest,
                "pending" => FilterSpec::Pending,
                "logs" => FilterSpec::Options(FilterOptions {
                    from_block: from_block.map(|b| b.parse::<BlockRef>()).transpose()?,
                    to_block: None,
                    address,
                    topics: topics.into_iter().map(Some).collect(),
                }),
                other => bail!("unknown watch target: {other}"),
            };
            watch(&client, spec).await?;
        }
    }
    Ok(())
}

fn connect(rpc: Option<&str>) -> Result<Client> {
    let config = config::load();
    // a configured endpoint name resolves to its URL
    let rpc = rpc.map(|name| {
        config
            .endpoint(name)
            .map(|endpoint| endpoint.rpc.clone())
            .unwrap_or_else(|| normalize_http_endpoint(name))
    });
    Client::from_config(&config, rpc.as_deref()).context("failed to build client")
}

async fn watch(client: &Client, spec: FilterSpec) -> Result<()> {
    let filter = client.eth().filter(spec).await?;
    eprintln!("watching filter {} (Ctrl-C to stop)", filter.id());
    let callback: WatchCallback = Arc::new(|update: Result<Value, RpcError>| match update {
        Ok(item) => println!("{item}"),
        Err(err) => eprintln!("error: {err}"),
    });
    filter.watch(callback).await?;
    tokio::signal::ctrl_c().await?;
    filter.stop_watching().await?;
    Ok(())
}

fn split_types(types: &str) -> Vec<String> {
    types
        .split(',')
        .map(str::trim)
        .filter(|ty| !ty.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_values(coder: &AbiCoder, types: &[String], values: &[String]) -> Result<Vec<AbiValue>> {
    if types.len() != values.len() {
        bail!(
            "argument count mismatch: expected {} arguments, got {}",
            types.len(),
            values.len()
        );
    }
    types
        .iter()
        .zip(values)
        .map(|(ty, value)| {
            coder
                .parse_value(ty, value)
                .with_context(|| format!("invalid {ty} argument {value:?}"))
        })
        .collect()
}

fn parse_json_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
