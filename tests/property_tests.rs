//! Property-based tests using proptest
//!
//! These tests check the codec invariants over randomly generated keys, codes
//! and envelopes: every representation reproduces the value it came from, and
//! damaged input is rejected without panicking.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use stellar_txrep::core::binary::{from_bytes, to_bytes};
use stellar_txrep::encoding::asset_code::{parse_asset_code, render_asset_code};
use stellar_txrep::encoding::strkey::{self, StrKeyVersion};
use stellar_txrep::txrep::{quote, unquote};
use stellar_txrep::types::{
    Asset, DecoratedSignature, Memo, MuxedAccount, Operation, OperationBody, PublicKey,
    TimeBounds, Transaction, TransactionEnvelope,
};
use stellar_txrep::{MultiFormat, SerializationFormat};

fn key32() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

fn muxed_account() -> impl Strategy<Value = MuxedAccount> {
    (key32(), any::<Option<u64>>())
        .prop_map(|(key, id)| MuxedAccount::from_account(PublicKey::Ed25519(key), id))
}

fn asset() -> impl Strategy<Value = Asset> {
    prop_oneof![
        Just(Asset::Native),
        ("[A-Z0-9]{1,12}", key32())
            .prop_map(|(code, key)| Asset::credit(&code, PublicKey::Ed25519(key)).unwrap()),
    ]
}

fn memo() -> impl Strategy<Value = Memo> {
    prop_oneof![
        Just(Memo::None),
        prop::collection::vec(any::<u8>(), 0..=28).prop_map(|b| Memo::Text(stellar_txrep::core::marshal::XdrString(b))),
        any::<u64>().prop_map(Memo::Id),
        key32().prop_map(Memo::Hash),
        key32().prop_map(Memo::Return),
    ]
}

fn operation() -> impl Strategy<Value = Operation> {
    let body = prop_oneof![
        (key32(), any::<i64>()).prop_map(|(key, amount)| Operation::create_account(
            PublicKey::Ed25519(key),
            amount
        )
        .body),
        (muxed_account(), asset(), any::<i64>())
            .prop_map(|(dest, asset, amount)| Operation::payment(dest, asset, amount).body),
        muxed_account().prop_map(OperationBody::AccountMerge),
        Just(OperationBody::Inflation),
    ];
    (prop::option::of(muxed_account()), body).prop_map(|(source_account, body)| Operation {
        source_account,
        body,
    })
}

fn envelope() -> impl Strategy<Value = TransactionEnvelope> {
    (
        muxed_account(),
        any::<u32>(),
        any::<i64>(),
        prop::option::of((any::<u64>(), any::<u64>())),
        memo(),
        prop::collection::vec(operation(), 0..5),
        prop::collection::vec(
            (any::<[u8; 4]>(), prop::collection::vec(any::<u8>(), 0..=64)),
            0..3,
        ),
    )
        .prop_map(|(source, fee, seq, bounds, memo, ops, sigs)| {
            let mut tx = Transaction {
                source_account: source,
                fee,
                seq_num: seq,
                time_bounds: bounds.map(|(min_time, max_time)| TimeBounds { min_time, max_time }),
                memo,
                ..Transaction::default()
            };
            tx.operations.extend(ops);
            let mut env = TransactionEnvelope::new(tx);
            env.signatures
                .extend(sigs.into_iter().map(|(hint, sig)| DecoratedSignature {
                    hint,
                    signature: sig.into(),
                }));
            env
        })
}

// Property: every strkey version encodes and decodes back to the same payload
proptest! {
    #[test]
    fn prop_strkey_roundtrip(
        idx in 0usize..StrKeyVersion::ALL.len(),
        payload in prop::collection::vec(any::<u8>(), 40..=100),
    ) {
        let version = StrKeyVersion::ALL[idx];
        let len = version.payload_len().unwrap_or(payload.len());
        let payload = &payload[..len];

        let text = strkey::encode(version, payload);
        prop_assert!(text.starts_with(version.prefix()));
        prop_assert!(text.chars().all(strkey::is_strkey_char));

        let decoded = strkey::decode(&text).unwrap();
        prop_assert_eq!(decoded.version, version);
        prop_assert_eq!(decoded.payload.as_slice(), payload);
    }
}

// Property: changing one character of an account strkey never yields a valid key
proptest! {
    #[test]
    fn prop_strkey_single_char_damage_rejected(
        key in key32(),
        pos in 0usize..56,
        replacement in prop::sample::select(
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567".chars().collect::<Vec<_>>()
        ),
    ) {
        let text = strkey::encode(StrKeyVersion::PublicKey, &key);
        let mut chars: Vec<char> = text.chars().collect();
        prop_assume!(chars[pos] != replacement);
        chars[pos] = replacement;
        let damaged: String = chars.into_iter().collect();

        prop_assert!(strkey::decode(&damaged).is_err());
    }
}

// Property: asset code text parses back to the stored bytes
proptest! {
    #[test]
    fn prop_asset_code_roundtrip(
        wide in any::<bool>(),
        code in any::<[u8; 12]>(),
        lead in 1u8..=255,
    ) {
        let mut stored = if wide { code.to_vec() } else { code[..4].to_vec() };
        if !wide {
            // an all-zero narrow code has no text form
            stored[0] = lead;
        }
        let text = render_asset_code(&stored);
        prop_assert!(!text.contains(' '));
        prop_assert_eq!(parse_asset_code(&text).unwrap(), stored);
    }
}

// Property: quoting any bytes yields a parseable single-line string
proptest! {
    #[test]
    fn prop_quote_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let quoted = quote(&bytes);
        prop_assert!(!quoted.contains('\n'));
        prop_assert_eq!(unquote(&quoted).unwrap(), bytes);
    }
}

// Property: random envelopes survive binary, base64 and txrep
proptest! {
    #[test]
    fn prop_envelope_all_formats(env in envelope()) {
        for format in [
            SerializationFormat::Binary,
            SerializationFormat::Base64,
            SerializationFormat::Txrep,
        ] {
            let data = env.serialize_format(format).unwrap();
            let back = TransactionEnvelope::deserialize_format(&data, format).unwrap();
            prop_assert_eq!(&back, &env);
        }
    }
}

// Property: the binary encoding is always a whole number of 4-byte units
proptest! {
    #[test]
    fn prop_binary_alignment(env in envelope()) {
        let mut env = env;
        let bytes = to_bytes(&mut env).unwrap();
        prop_assert_eq!(bytes.len() % 4, 0);
    }
}

// Property: every proper prefix of a valid encoding is rejected
proptest! {
    #[test]
    fn prop_binary_prefix_rejected(env in envelope(), cut in any::<prop::sample::Index>()) {
        let mut env = env;
        let bytes = to_bytes(&mut env).unwrap();
        let len = cut.index(bytes.len());
        prop_assert!(from_bytes::<TransactionEnvelope>(&bytes[..len]).is_err());
    }
}

// Property: arbitrary bytes never panic the binary decoder
proptest! {
    #[test]
    fn prop_binary_garbage_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = from_bytes::<TransactionEnvelope>(&bytes);
    }
}

// Property: arbitrary text never panics the txrep scanner
proptest! {
    #[test]
    fn prop_txrep_garbage_no_panic(text in "(tx\\.[a-zA-Z.\\[\\]0-9]{0,30}: [ -~]{0,40}\n){0,20}") {
        let _ = TransactionEnvelope::from_txrep(&text);
    }
}
