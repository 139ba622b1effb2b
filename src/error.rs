//! # Error Types
//!
//! Error handling for every traversal the crate performs.
//!
//! A traversal (binary encode/decode, txrep print/scan, walk) stops at the first
//! failure and hands a single [`TxrepError`] back to whoever started it. Nothing is
//! retried and no partially decoded value is returned.
//!
//! ## Error Categories
//! - **Bound violations**: a variable-length value or array exceeds its declared maximum
//! - **Invalid discriminants**: an enum or union tag outside its declared set
//! - **Malformed encodings**: bad base32/base64 framing, checksums, padding, truncation
//! - **Missing fields**: txrep input lacks a mandatory key
//! - **Unrecognized fields**: txrep input has keys no field consumed
//! - **Illegal characters**: asset code text containing an unescaped control byte
//!
//! ## Example Usage
//! ```rust
//! use stellar_txrep::error::{ErrorKind, TxrepError};
//! use stellar_txrep::types::TransactionEnvelope;
//!
//! match TransactionEnvelope::from_base64("not base64!") {
//!     Ok(_) => unreachable!(),
//!     Err(e) => assert_eq!(e.kind(), ErrorKind::MalformedEncoding),
//! }
//! ```

use crate::encoding::strkey::StrKeyError;
use std::io;
use thiserror::Error;

/// Static messages shared by the codecs.
pub mod constants {
    /// Binary framing
    pub const ERR_TRUNCATED: &str = "unexpected end of input";
    pub const ERR_TRAILING_BYTES: &str = "trailing bytes after value";
    pub const ERR_NONZERO_PADDING: &str = "non-zero padding bytes";
    pub const ERR_BAD_BOOL: &str = "boolean must be 0 or 1";
    pub const ERR_BAD_BASE64: &str = "invalid base64 input";
    pub const ERR_NOT_UTF8: &str = "text input is not valid UTF-8";

    /// Txrep scalar grammar
    pub const ERR_BAD_PRESENT: &str = "must be true or false";
    pub const ERR_BAD_INTEGER: &str = "invalid integer";
    pub const ERR_BAD_HEX: &str = "invalid hex";
    pub const ERR_BAD_QUOTED: &str = "invalid quoted string";

    /// Asset codes
    pub const ERR_DANGLING_ESCAPE: &str = "backslash at end of asset code";
    pub const ERR_ASSET_FORMAT: &str = "asset should be Code:AccountID or native";
    pub const ERR_UNEXPECTED_POOL: &str = "liquidity pool id where an asset was expected";
}

/// Classification of a [`TxrepError`] into the failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BoundViolation,
    InvalidDiscriminant,
    MalformedEncoding,
    MissingField,
    UnrecognizedField,
    IllegalCharacter,
    Io,
    Config,
}

// TxrepError is the single failure type every traversal surfaces
#[derive(Error, Debug)]
pub enum TxrepError {
    #[error("{field}: length {len} exceeds maximum {max}")]
    BoundExceeded { field: String, len: usize, max: usize },

    #[error("{field}: invalid discriminant {value}")]
    InvalidDiscriminant { field: String, value: String },

    #[error("{field}: {reason}")]
    Malformed { field: String, reason: String },

    #[error("{field}: invalid strkey: {source}")]
    StrKey {
        field: String,
        #[source]
        source: StrKeyError,
    },

    #[error("missing required field {field}")]
    MissingField { field: String },

    #[error("unrecognized fields: {}", .0.join(", "))]
    UnrecognizedFields(Vec<String>),

    #[error("{field}: illegal character 0x{byte:02x}")]
    IllegalCharacter { field: String, byte: u8 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StrKeyError> for TxrepError {
    fn from(source: StrKeyError) -> Self {
        TxrepError::StrKey {
            field: String::new(),
            source,
        }
    }
}

impl TxrepError {
    pub fn malformed(field: &str, reason: impl Into<String>) -> Self {
        TxrepError::Malformed {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn bound(field: &str, len: usize, max: usize) -> Self {
        TxrepError::BoundExceeded {
            field: field.to_string(),
            len,
            max,
        }
    }

    pub fn discriminant(field: &str, value: impl ToString) -> Self {
        TxrepError::InvalidDiscriminant {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn missing(field: &str) -> Self {
        TxrepError::MissingField {
            field: field.to_string(),
        }
    }

    /// Which branch of the taxonomy this failure belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TxrepError::BoundExceeded { .. } => ErrorKind::BoundViolation,
            TxrepError::InvalidDiscriminant { .. } => ErrorKind::InvalidDiscriminant,
            TxrepError::Malformed { .. } | TxrepError::StrKey { .. } => {
                ErrorKind::MalformedEncoding
            }
            TxrepError::MissingField { .. } => ErrorKind::MissingField,
            TxrepError::UnrecognizedFields(_) => ErrorKind::UnrecognizedField,
            TxrepError::IllegalCharacter { .. } => ErrorKind::IllegalCharacter,
            TxrepError::Io(_) => ErrorKind::Io,
            TxrepError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Attach a field path to an error raised without one.
    ///
    /// Codecs below the traversal (strkey, asset codes, scalar grammar) do not know
    /// which field they are parsing; the visitor that called them does.
    pub fn at(mut self, path: &str) -> Self {
        match &mut self {
            TxrepError::BoundExceeded { field, .. }
            | TxrepError::InvalidDiscriminant { field, .. }
            | TxrepError::Malformed { field, .. }
            | TxrepError::StrKey { field, .. }
            | TxrepError::MissingField { field }
            | TxrepError::IllegalCharacter { field, .. } => {
                if field.is_empty() {
                    *field = path.to_string();
                }
            }
            TxrepError::UnrecognizedFields(_) | TxrepError::Io(_) | TxrepError::ConfigError(_) => {}
        }
        self
    }
}

/// Type alias for Results using TxrepError
pub type Result<T> = std::result::Result<T, TxrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(TxrepError::bound("x", 5, 4).kind(), ErrorKind::BoundViolation);
        assert_eq!(
            TxrepError::discriminant("x", 99).kind(),
            ErrorKind::InvalidDiscriminant
        );
        assert_eq!(
            TxrepError::malformed("x", constants::ERR_TRUNCATED).kind(),
            ErrorKind::MalformedEncoding
        );
        assert_eq!(TxrepError::missing("x").kind(), ErrorKind::MissingField);
        assert_eq!(
            TxrepError::UnrecognizedFields(vec!["a".into()]).kind(),
            ErrorKind::UnrecognizedField
        );
        assert_eq!(
            TxrepError::from(StrKeyError::BadChecksum).kind(),
            ErrorKind::MalformedEncoding
        );
    }

    #[test]
    fn test_at_fills_only_empty_paths() {
        let e = TxrepError::malformed("", constants::ERR_BAD_HEX).at("tx.memo.hash");
        assert_eq!(e.to_string(), "tx.memo.hash: invalid hex");

        let e = TxrepError::missing("tx.fee").at("tx");
        assert_eq!(e.to_string(), "missing required field tx.fee");
    }
}
