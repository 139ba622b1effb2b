#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end format tests: binary, base64 and txrep for a realistic envelope

use stellar_txrep::core::serialization::{MultiFormat, SerializationFormat};
use stellar_txrep::core::walk::{collect, for_each, Walk};
use stellar_txrep::txrep::AccountBook;
use stellar_txrep::types::{
    AllowTrustOp, Asset, AssetCode, ChangeTrustOp, DecoratedSignature, Ed25519SignedPayload,
    ManageDataOp, Memo, MuxedAccount, Operation, OperationBody, PublicKey, SetOptionsOp, Signer,
    SignerKey, TimeBounds, Transaction, TransactionEnvelope,
};
use stellar_txrep::config::ScanConfig;
use stellar_txrep::TxrepConfig;

const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
const MUXED: &str = "MA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJUAAAAAAAAAAAACJUQ";
const HINT: &str = "fc7fe89a";

fn sample_envelope() -> TransactionEnvelope {
    let issuer: PublicKey = ACCOUNT.parse().unwrap();
    let mut tx = Transaction {
        source_account: MUXED.parse().unwrap(),
        time_bounds: Some(TimeBounds {
            min_time: 0,
            max_time: 1_700_000_000,
        }),
        memo: Memo::Text("coffee".into()),
        ..Transaction::default()
    };
    tx.operations.push(Operation::payment(
        MuxedAccount::from_account(issuer.clone(), None),
        Asset::credit("USD", issuer.clone()).unwrap(),
        250_000_000,
    ));
    tx.operations.push(Operation::new(OperationBody::ManageData(ManageDataOp {
        data_name: "config".into(),
        data_value: Some(vec![1, 2, 3].into()),
    })));
    tx.apply_network_defaults(100, 1);
    let mut env = TransactionEnvelope::new(tx);
    env.signatures.push(DecoratedSignature {
        hint: issuer.hint(),
        signature: vec![0xab; 64].into(),
    });
    env
}

fn golden_txrep() -> String {
    let signature = "ab".repeat(64);
    format!(
        "tx.sourceAccount: {MUXED}
tx.fee: 200
tx.seqNum: 1
tx.timeBounds.present: true
tx.timeBounds.minTime: 0
tx.timeBounds.maxTime: 1700000000
tx.memo.type: MEMO_TEXT
tx.memo.text: \"coffee\"
tx.operations.len: 2
tx.operations[0].sourceAccount.present: false
tx.operations[0].body.type: PAYMENT
tx.operations[0].body.paymentOp.destination: {ACCOUNT}
tx.operations[0].body.paymentOp.asset: USD:{ACCOUNT}
tx.operations[0].body.paymentOp.amount: 250000000
tx.operations[1].sourceAccount.present: false
tx.operations[1].body.type: MANAGE_DATA
tx.operations[1].body.manageDataOp.dataName: \"config\"
tx.operations[1].body.manageDataOp.dataValue.present: true
tx.operations[1].body.manageDataOp.dataValue: 010203
tx.ext.v: 0
signatures.len: 1
signatures[0].hint: {HINT}
signatures[0].signature: {signature}
"
    )
}

#[test]
fn test_print_golden() {
    assert_eq!(sample_envelope().to_txrep().unwrap(), golden_txrep());
}

#[test]
fn test_scan_golden() {
    assert_eq!(
        TransactionEnvelope::from_txrep(&golden_txrep()).unwrap(),
        sample_envelope()
    );
}

#[test]
fn test_base64_and_txrep_agree() {
    let env = sample_envelope();
    let b64 = env.to_base64().unwrap();
    let via_txrep = TransactionEnvelope::from_txrep(&env.to_txrep().unwrap()).unwrap();
    assert_eq!(via_txrep.to_base64().unwrap(), b64);
}

#[test]
fn test_binary_prefix() {
    let bytes = sample_envelope()
        .serialize_format(SerializationFormat::Binary)
        .unwrap();
    // KEY_TYPE_MUXED_ED25519, then id 0
    assert_eq!(&bytes[..12], &[0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(bytes.len() % 4, 0);
}

#[test]
fn test_detect_formats() {
    let env = sample_envelope();
    for format in [
        SerializationFormat::Binary,
        SerializationFormat::Base64,
        SerializationFormat::Txrep,
    ] {
        let data = env.serialize_format(format).unwrap();
        let (back, detected) = TransactionEnvelope::deserialize_detect(&data).unwrap();
        assert_eq!(detected, format);
        assert_eq!(back, env);
    }
}

#[test]
fn test_detect_binary_of_default_envelope() {
    // every byte of this encoding is ASCII, most of them NUL
    let env = TransactionEnvelope::default();
    let bytes = env.serialize_format(SerializationFormat::Binary).unwrap();
    assert!(std::str::from_utf8(&bytes).is_ok());

    let (back, detected) = TransactionEnvelope::deserialize_detect(&bytes).unwrap();
    assert_eq!(detected, SerializationFormat::Binary);
    assert_eq!(back, env);
}

#[test]
fn test_every_operation_roundtrips() {
    let issuer: PublicKey = ACCOUNT.parse().unwrap();
    let bodies = vec![
        OperationBody::CreateAccount(Default::default()),
        OperationBody::SetOptions(SetOptionsOp {
            inflation_dest: Some(issuer.clone()),
            set_flags: Some(3),
            master_weight: Some(1),
            home_domain: Some("example.com".into()),
            signer: Some(Signer {
                key: SignerKey::Ed25519SignedPayload(Ed25519SignedPayload {
                    ed25519: [9; 32],
                    payload: vec![1, 2, 3, 4, 5].into(),
                }),
                weight: 10,
            }),
            ..Default::default()
        }),
        OperationBody::ChangeTrust(ChangeTrustOp {
            line: Asset::credit("LONGASSET", issuer.clone()).unwrap(),
            limit: i64::MAX,
        }),
        OperationBody::AllowTrust(AllowTrustOp {
            trustor: issuer.clone(),
            asset: "EUR".parse::<AssetCode>().unwrap(),
            authorize: 1,
        }),
        OperationBody::AccountMerge(MUXED.parse().unwrap()),
        OperationBody::Inflation,
        OperationBody::ManageData(ManageDataOp {
            data_name: "gone".into(),
            data_value: None,
        }),
        OperationBody::BumpSequence(Default::default()),
    ];
    let mut env = TransactionEnvelope::default();
    for body in bodies {
        env.tx.operations.push(Operation {
            source_account: Some(MuxedAccount::from_account(issuer.clone(), Some(u64::MAX))),
            body,
        });
    }

    let text = env.to_txrep().unwrap();
    assert!(text.contains("tx.operations[5].body.type: INFLATION\n"));
    assert!(text.contains("tx.operations[6].body.manageDataOp.dataValue.present: false\n"));
    assert_eq!(TransactionEnvelope::from_txrep(&text).unwrap(), env);
    assert_eq!(
        TransactionEnvelope::from_base64(&env.to_base64().unwrap()).unwrap(),
        env
    );
}

#[test]
fn test_memo_variants() {
    for memo in [
        Memo::None,
        Memo::Text("\"quoted\" \\ \u{1}".into()),
        Memo::Id(u64::MAX),
        Memo::Hash([0x11; 32]),
        Memo::Return([0x22; 32]),
    ] {
        let mut env = TransactionEnvelope::default();
        env.tx.memo = memo;
        let text = env.to_txrep().unwrap();
        assert_eq!(TransactionEnvelope::from_txrep(&text).unwrap(), env, "{text}");
    }
}

#[test]
fn test_annotated_output_still_scans() {
    let config = TxrepConfig::from_toml(&format!("[accounts]\n{ACCOUNT} = \"issuer\"\n")).unwrap();
    let book = AccountBook::from_config(&config).unwrap();
    let text = sample_envelope().to_txrep_annotated(&book).unwrap();
    assert!(text.contains(&format!("paymentOp.destination: {ACCOUNT} (issuer)\n")));
    assert!(text.contains(&format!("tx.sourceAccount: {MUXED} (issuer)\n")));
    assert_eq!(TransactionEnvelope::from_txrep(&text).unwrap(), sample_envelope());
}

#[test]
fn test_help_marker_roundtrip() {
    let text = golden_txrep()
        .replace("tx.memo.type: MEMO_TEXT\n", "tx.memo.type: MEMO_TEXT?\n")
        .replace("[1].body.type: MANAGE_DATA\n", "[1].body.type: MANAGE_DATA?\n");
    let outcome = TransactionEnvelope::from_txrep_with(&text, &ScanConfig::default()).unwrap();
    assert_eq!(outcome.value, sample_envelope());
    let asked: Vec<&str> = outcome.help.iter().map(String::as_str).collect();
    assert_eq!(asked, ["tx.memo.type", "tx.operations[1].body.type"]);

    let config = TxrepConfig::default();
    let printed = outcome
        .value
        .to_txrep_configured(&config, Some(&outcome.help))
        .unwrap();
    assert!(printed.contains(
        "tx.memo.type: MEMO_TEXT (MEMO_NONE, MEMO_TEXT, MEMO_ID, MEMO_HASH, MEMO_RETURN)\n"
    ));
    assert!(printed.contains("tx.operations[1].body.type: MANAGE_DATA (CREATE_ACCOUNT, PAYMENT, "));
    assert!(printed.contains("tx.operations[0].body.type: PAYMENT\n"));

    // the listed choices are a comment to the scanner
    let again = TransactionEnvelope::from_txrep_with(&printed, &ScanConfig::default()).unwrap();
    assert_eq!(again.value, sample_envelope());
    assert!(again.help.is_empty());
}

#[test]
fn test_configured_print_without_labels() {
    let mut config = TxrepConfig::from_toml(&format!("[accounts]\n{ACCOUNT} = \"issuer\"\n")).unwrap();
    assert!(sample_envelope()
        .to_txrep_configured(&config, None)
        .unwrap()
        .contains("(issuer)"));

    config.print.annotate_accounts = false;
    let plain = sample_envelope().to_txrep_configured(&config, None).unwrap();
    assert_eq!(plain, golden_txrep());
}

#[test]
fn test_walker_sees_every_account() {
    let env = sample_envelope();
    let accounts = env.accounts().unwrap();
    let issuer: PublicKey = ACCOUNT.parse().unwrap();
    // source, payment destination, asset issuer
    assert_eq!(accounts, vec![issuer.clone(), issuer.clone(), issuer]);

    let mut copy = env.clone();
    let muxed = collect::<MuxedAccount, _>(&mut copy).unwrap();
    let paths: Vec<&str> = muxed.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, ["tx.sourceAccount", "tx.operations[0].body.paymentOp.destination"]);

    let mut scalars = 0;
    for_each(&mut copy, |_, value| {
        if value.shape() == "scalar" {
            scalars += 1;
        }
        Walk::Descend
    })
    .unwrap();
    assert!(scalars > 20);
}
