//! Function selectors, call data and event log decoding

use alloy_json_abi::{Event, Function};
use alloy_primitives::keccak256;

use super::coder::AbiCoder;
use super::error::{AbiError, Result};
use super::value::AbiValue;
use super::word::WORD_HEX_LEN;
use crate::utils::strip_0x;

/// Remove whitespace and any `returns` clause
pub fn normalize_signature(signature: &str) -> String {
    let signature = match signature.find("returns") {
        Some(pos) => signature[..pos].trim(),
        None => signature,
    };
    signature.split_whitespace().collect()
}

/// First 4 bytes of the Keccak-256 of the canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(normalize_signature(signature).as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Split `name(type1,type2)` into its name and parameter types
pub fn parse_signature(signature: &str) -> Result<(String, Vec<String>)> {
    let normalized = normalize_signature(signature);

    let open = normalized
        .find('(')
        .ok_or_else(|| AbiError::InvalidSignature(format!("missing '(' in {signature}")))?;
    let close = normalized
        .rfind(')')
        .ok_or_else(|| AbiError::InvalidSignature(format!("missing ')' in {signature}")))?;
    if close <= open {
        return Err(AbiError::InvalidSignature(format!(
            "malformed parentheses in {signature}"
        )));
    }

    let name = normalized[..open].to_string();
    let params = &normalized[open + 1..close];
    let types = if params.is_empty() {
        Vec::new()
    } else {
        params.split(',').map(str::to_string).collect()
    };
    Ok((name, types))
}

/// `0x` + selector + encoded arguments for a textual signature
pub fn encode_call(coder: &AbiCoder, signature: &str, args: &[AbiValue]) -> Result<String> {
    let (name, types) = parse_signature(signature)?;
    let canonical = format!("{name}({})", types.join(","));
    let params = coder.encode_params(&types, args)?;
    Ok(format!("0x{}{params}", hex::encode(selector(&canonical))))
}

/// Call data for a function described by a JSON ABI entry
pub fn encode_function_call(
    coder: &AbiCoder,
    function: &Function,
    args: &[AbiValue],
) -> Result<String> {
    let types: Vec<&str> = function.inputs.iter().map(|p| p.ty.as_str()).collect();
    let params = coder.encode_params(&types, args)?;
    Ok(format!(
        "0x{}{params}",
        hex::encode(selector(&function.signature()))
    ))
}

/// Decode the return data of an `eth_call` against the function outputs
pub fn decode_function_output(
    coder: &AbiCoder,
    function: &Function,
    data: &str,
) -> Result<Vec<AbiValue>> {
    let types: Vec<&str> = function.outputs.iter().map(|p| p.ty.as_str()).collect();
    coder.decode_params(&types, data)
}

/// `0x` topic identifying the event
pub fn event_topic(event: &Event) -> String {
    format!("0x{}", hex::encode(keccak256(event.signature().as_bytes())))
}

/// Decode a log into `(name, value)` pairs in declaration order.
///
/// Indexed parameters are read from the topics; indexed dynamic types only
/// carry a hash there, which is returned as its hex text.
pub fn decode_event_log(
    coder: &AbiCoder,
    event: &Event,
    topics: &[String],
    data: &str,
) -> Result<Vec<(String, AbiValue)>> {
    let mut indexed_topics = topics.iter().skip(usize::from(!event.anonymous));

    let data_types: Vec<&str> = event
        .inputs
        .iter()
        .filter(|p| !p.indexed)
        .map(|p| p.ty.as_str())
        .collect();
    let mut data_values = coder.decode_params(&data_types, data)?.into_iter();

    event
        .inputs
        .iter()
        .map(|param| {
            let value = if param.indexed {
                let topic = indexed_topics.next().ok_or_else(|| {
                    AbiError::InvalidSignature(format!("missing topic for {}", param.name))
                })?;
                let topic = strip_0x(topic);
                if is_hashed_topic(&param.ty) || topic.len() != WORD_HEX_LEN {
                    AbiValue::Bytes(format!("0x{topic}"))
                } else {
                    coder.decode_param(&param.ty, topic)?
                }
            } else {
                data_values.next().ok_or(AbiError::LengthMismatch {
                    types: data_types.len(),
                    values: 0,
                })?
            };
            Ok((param.name.clone(), value))
        })
        .collect()
}

fn is_hashed_topic(ty: &str) -> bool {
    ty == "bytes" || ty == "string" || ty.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::{Address, U256};

    const ERC20: &str = r#"[
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    #[test]
    fn test_normalize_signature() {
        assert_eq!(
            normalize_signature("transfer(address, uint256)"),
            "transfer(address,uint256)"
        );
        assert_eq!(
            normalize_signature("transfer(address,uint256) returns (bool)"),
            "transfer(address,uint256)"
        );
    }

    #[test]
    fn test_transfer_selector() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_encode_call_without_args() {
        let coder = AbiCoder::default();
        let data = encode_call(&coder, "totalSupply()", &[]).unwrap();
        assert_eq!(data, "0x18160ddd");
    }

    #[test]
    fn test_parse_signature_errors() {
        assert!(parse_signature("transfer").is_err());
        assert!(parse_signature("transfer)address(").is_err());
    }

    #[test]
    fn test_json_abi_call_matches_textual_signature() {
        let abi: JsonAbi = serde_json::from_str(ERC20).unwrap();
        let function = &abi.function("transfer").unwrap()[0];
        let coder = AbiCoder::default();
        let args = [AbiValue::Address(Address::repeat_byte(0x11)), AbiValue::from(1000u64)];

        let from_abi = encode_function_call(&coder, function, &args).unwrap();
        let from_text = encode_call(&coder, "transfer(address,uint256)", &args).unwrap();
        assert_eq!(from_abi, from_text);
        assert!(from_abi.starts_with("0xa9059cbb"));
    }

    #[test]
    fn test_decode_transfer_log() {
        let abi: JsonAbi = serde_json::from_str(ERC20).unwrap();
        let event = &abi.event("Transfer").unwrap()[0];
        let coder = AbiCoder::default();

        let topics = vec![
            event_topic(event),
            format!("0x{}{}", "0".repeat(24), "11".repeat(20)),
            format!("0x{}{}", "0".repeat(24), "22".repeat(20)),
        ];
        let data = format!("0x{:064x}", 500);
        let decoded = decode_event_log(&coder, event, &topics, &data).unwrap();

        assert_eq!(decoded[0].0, "from");
        assert_eq!(decoded[0].1, AbiValue::Address(Address::repeat_byte(0x11)));
        assert_eq!(decoded[1].1, AbiValue::Address(Address::repeat_byte(0x22)));
        assert_eq!(decoded[2].1, AbiValue::Uint(U256::from(500u64)));
        assert_eq!(
            topics[0],
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }
}
