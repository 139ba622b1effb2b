//! Example: Moving a transaction between formats
//!
//! Builds a small payment, prints it as txrep with account labels, edits one
//! line of the text (asking for help on the memo type) and compiles it back to
//! base64.
//!
//! Run with: `cargo run --example txrep_formats`

use stellar_txrep::types::{Asset, Memo, MuxedAccount, Operation, PublicKey, TransactionEnvelope};
use stellar_txrep::utils::init_logging;
use stellar_txrep::{MultiFormat, SerializationFormat, TxrepConfig};

const CONFIG: &str = r#"
[accounts]
GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ = "treasury"

[logging]
log_level = "debug"
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TxrepConfig::from_toml(CONFIG)?;
    config.validate_strict()?;
    init_logging(&config.logging)?;

    let treasury: PublicKey = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ".parse()?;
    let mut env = TransactionEnvelope::default();
    env.tx.source_account = MuxedAccount::from_account(treasury.clone(), Some(7));
    env.tx.memo = Memo::Text("invoice 42".into());
    env.tx.operations.push(Operation::payment(
        MuxedAccount::from_account(treasury.clone(), None),
        Asset::credit("USD", treasury)?,
        5_000_000_000,
    ));
    env.tx.apply_network_defaults(config.network.base_fee, 1);

    println!("=== txrep ===");
    let text = env.to_txrep_configured(&config, None)?;
    print!("{text}");

    println!("\n=== edited ===");
    let edited = text
        .replace("tx.fee: 100", "tx.fee: 1000")
        .replace("tx.memo.type: MEMO_TEXT", "tx.memo.type: MEMO_TEXT?");
    let outcome = TransactionEnvelope::from_txrep_with(&edited, &config.scan)?;
    let changed = outcome.value;
    print!("{}", changed.to_txrep_configured(&config, Some(&outcome.help))?);
    println!("fee is now {}", changed.tx.fee);

    println!("\n=== base64 ===");
    let b64 = changed.to_base64()?;
    println!("{b64}");

    let bytes = changed.serialize_format(SerializationFormat::Binary)?;
    let (back, format) = TransactionEnvelope::deserialize_detect(&bytes)?;
    println!("\n{} bytes detected as {}", bytes.len(), format.name());
    assert_eq!(back, changed);

    Ok(())
}
