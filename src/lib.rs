//! # stellar-txrep
//!
//! Convert Stellar transactions between canonical binary XDR, base64 and txrep,
//! the line-oriented `path: value` text format people can read and edit.
//!
//! Every transaction type describes itself once, through the marshal protocol in
//! [`core::marshal`]. The binary codec, the txrep printer and scanner, and the
//! generic walker are all visitors over that one description.
//!
//! ## Quick Start
//! ```rust
//! use stellar_txrep::types::{Operation, PublicKey, TransactionEnvelope};
//!
//! let mut env = TransactionEnvelope::default();
//! env.tx.operations.push(Operation::create_account(PublicKey::Ed25519([1; 32]), 10_000_000));
//! env.tx.apply_network_defaults(100, 2);
//!
//! let text = env.to_txrep().unwrap();
//! assert!(text.contains("tx.operations[0].body.type: CREATE_ACCOUNT"));
//!
//! let b64 = env.to_base64().unwrap();
//! assert_eq!(TransactionEnvelope::from_txrep(&text).unwrap(), env);
//! assert_eq!(TransactionEnvelope::from_base64(&b64).unwrap(), env);
//! ```
//!
//! ## Modules
//! - [`core`]: marshal protocol, binary codec, base64, walker
//! - [`encoding`]: strkeys and asset code text
//! - [`txrep`]: printer and scanner
//! - [`types`]: transaction structures
//! - [`config`]: scan/print/logging settings

#[macro_use]
mod macros;

pub mod config;
pub mod core;
pub mod encoding;
pub mod error;
pub mod txrep;
pub mod types;
pub mod utils;

pub use crate::config::{TxrepConfig, UnknownKeyPolicy};
pub use crate::core::serialization::{MultiFormat, SerializationFormat};
pub use crate::error::{ErrorKind, Result, TxrepError};
pub use crate::types::TransactionEnvelope;
