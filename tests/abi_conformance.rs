//! Cross-check the codec against alloy's dynamic ABI encoder

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, I256, U256};

use ethwire::domain::abi::{encode_call, selector, AbiCoder, AbiValue};

fn fixed_bytes(text: &str) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    B256::from(bytes)
}

fn sample_address() -> Address {
    Address::from([0x11u8; 20])
}

#[test]
fn test_mixed_params_match_alloy() {
    let coder = AbiCoder::default();
    let long_text = "a string that is longer than one thirty-two byte slot";
    let types = [
        "uint256", "string", "bool", "int256", "address", "uint256[]", "bytes32",
    ];
    let values = vec![
        AbiValue::from(5u64),
        AbiValue::from(long_text),
        AbiValue::from(true),
        AbiValue::from(-42i64),
        AbiValue::from(sample_address()),
        AbiValue::from(vec![1u64, 2, 3]),
        AbiValue::from("abc"),
    ];
    let ours = coder.encode_params(&types, &values).unwrap();

    let expected = DynSolValue::Tuple(vec![
        DynSolValue::Uint(U256::from(5), 256),
        DynSolValue::String(long_text.to_string()),
        DynSolValue::Bool(true),
        DynSolValue::Int(-I256::from_raw(U256::from(42u64)), 256),
        DynSolValue::Address(sample_address()),
        DynSolValue::Array(vec![
            DynSolValue::Uint(U256::from(1), 256),
            DynSolValue::Uint(U256::from(2), 256),
            DynSolValue::Uint(U256::from(3), 256),
        ]),
        DynSolValue::FixedBytes(fixed_bytes("abc"), 32),
    ])
    .abi_encode_params();

    assert_eq!(ours, hex::encode(expected));
}

#[test]
fn test_decode_alloy_encoding() {
    let coder = AbiCoder::default();
    let encoded = DynSolValue::Tuple(vec![
        DynSolValue::String("hello".to_string()),
        DynSolValue::Uint(U256::from(291), 256),
        DynSolValue::Array(vec![
            DynSolValue::Address(sample_address()),
            DynSolValue::Address(Address::ZERO),
        ]),
        DynSolValue::Int(I256::MINUS_ONE, 256),
    ])
    .abi_encode_params();

    let decoded = coder
        .decode_params(
            &["string", "uint256", "address[]", "int256"],
            &format!("0x{}", hex::encode(encoded)),
        )
        .unwrap();

    assert_eq!(
        decoded,
        vec![
            AbiValue::from("hello"),
            AbiValue::from(291u64),
            AbiValue::Array(vec![
                AbiValue::from(sample_address()),
                AbiValue::from(Address::ZERO),
            ]),
            AbiValue::from(-1i64),
        ]
    );
}

#[test]
fn test_calldata_matches_alloy() {
    let coder = AbiCoder::default();
    let calldata = encode_call(
        &coder,
        "transfer(address, uint256)",
        &[AbiValue::from(sample_address()), AbiValue::from(1000u64)],
    )
    .unwrap();

    let args = DynSolValue::Tuple(vec![
        DynSolValue::Address(sample_address()),
        DynSolValue::Uint(U256::from(1000), 256),
    ])
    .abi_encode_params();
    assert_eq!(calldata, format!("0xa9059cbb{}", hex::encode(args)));
    assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
}

#[test]
fn test_integer_extremes_round_trip() {
    let coder = AbiCoder::default();
    for value in [I256::MIN, I256::MAX, I256::ZERO, I256::MINUS_ONE] {
        let encoded = coder.encode_param("int256", &AbiValue::Int(value)).unwrap();
        assert_eq!(
            encoded,
            hex::encode(DynSolValue::Int(value, 256).abi_encode())
        );
        assert_eq!(coder.decode_param("int256", &encoded).unwrap(), AbiValue::Int(value));
    }
}

#[test]
fn test_array_length_preserved() {
    let coder = AbiCoder::default();
    for len in [0usize, 1, 5] {
        let array = AbiValue::Array((0..len as u64).map(AbiValue::from).collect());
        let encoded = coder.encode_param("uint256[]", &array).unwrap();
        let decoded = coder.decode_param("uint256[]", &encoded).unwrap();
        assert_eq!(decoded.as_array().map(<[AbiValue]>::len), Some(len));
    }
}

#[test]
fn test_every_family_round_trips() {
    let coder = AbiCoder::default();
    let fixed = |text: &str| AbiValue::Fixed(text.parse().unwrap());
    let cases = vec![
        ("address", AbiValue::from(sample_address())),
        ("address", AbiValue::from(Address::ZERO)),
        ("bool", AbiValue::Bool(false)),
        ("int8", AbiValue::from(-7i64)),
        ("int256", AbiValue::from(1_000_000i64)),
        ("uint8", AbiValue::from(255u64)),
        ("uint256", AbiValue::Uint(U256::MAX)),
        ("bytes", AbiValue::from("hello")),
        ("bytes", AbiValue::from("x".repeat(70))),
        ("string", AbiValue::from("")),
        ("string", AbiValue::from("a string that spans more than a single slot")),
        ("bytes4", AbiValue::from("abcd")),
        ("bytes32", AbiValue::from("q".repeat(32))),
        ("real", fixed("-1.25")),
        ("real", fixed("3.5")),
        ("real128x128", fixed("-0.75")),
        ("ureal", fixed("12.5")),
        ("ureal", fixed("0")),
        ("address[]", AbiValue::Array(vec![AbiValue::from(sample_address())])),
        ("int16[]", AbiValue::Array(vec![AbiValue::from(-300i64), AbiValue::from(300i64)])),
        ("real[]", AbiValue::Array(vec![fixed("-2.5"), fixed("0.5")])),
        ("bool[]", AbiValue::Array(vec![])),
    ];

    for (ty, value) in cases {
        let encoded = coder.encode_param(ty, &value).unwrap();
        assert_eq!(coder.decode_param(ty, &encoded).unwrap(), value, "{ty}");
    }
}

#[test]
fn test_signed_values_use_twos_complement() {
    let coder = AbiCoder::default();
    let one = I256::from_raw(U256::from(1u8));
    let half = I256::from_raw(U256::from(1u8) << 254);

    let mut values: Vec<I256> = (-128i64..=127)
        .map(|n| match AbiValue::from(n) {
            AbiValue::Int(value) => value,
            _ => unreachable!(),
        })
        .collect();
    values.extend([
        I256::MIN,
        I256::MIN + one,
        I256::MAX,
        I256::MAX - one,
        half,
        -half,
        -(half + one),
    ]);

    for value in values {
        for ty in ["int8", "int256"] {
            let encoded = coder.encode_param(ty, &AbiValue::Int(value)).unwrap();
            assert_eq!(encoded, hex::encode(value.into_raw().to_be_bytes::<32>()));
            assert_eq!(encoded.starts_with(['8', '9', 'a', 'b', 'c', 'd', 'e', 'f']), value.is_negative());
            assert_eq!(coder.decode_param(ty, &encoded).unwrap(), AbiValue::Int(value));
        }
    }
}
