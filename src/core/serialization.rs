//! # Serialization Formats
//!
//! One value, three representations:
//! - **Binary**: canonical XDR bytes
//! - **Base64**: the binary form in standard base64, how transactions travel
//!   between wallets, Horizon and the CLI
//! - **Txrep**: `path: value` lines a human can read and edit
//!
//! ## Format Detection
//! Input is text only when it is UTF-8 with no control bytes besides `\t`,
//! `\r` and `\n`. Text without a `:` that decodes as base64 is base64, text
//! with a `:` is txrep. Everything left is binary.
//!
//! ## Usage
//! ```rust
//! use stellar_txrep::core::serialization::{MultiFormat, SerializationFormat};
//! use stellar_txrep::types::TransactionEnvelope;
//!
//! let env = TransactionEnvelope::default();
//! let b64 = env.serialize_format(SerializationFormat::Base64).unwrap();
//! let (back, format) = TransactionEnvelope::deserialize_detect(&b64).unwrap();
//! assert_eq!(format, SerializationFormat::Base64);
//! assert_eq!(back, env);
//! ```

use crate::core::binary::{from_bytes, to_bytes, Reader, Writer};
use crate::core::marshal::{Visitor, XdrType};
use crate::error::{constants, Result, TxrepError};
use crate::txrep;
use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;
use base64::write::EncoderStringWriter;
use base64::Engine;

/// Supported representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializationFormat {
    Binary,
    /// Standard-alphabet base64 of the binary form (default, what tools exchange)
    #[default]
    Base64,
    Txrep,
}

impl SerializationFormat {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            SerializationFormat::Binary => "binary",
            SerializationFormat::Base64 => "base64",
            SerializationFormat::Txrep => "txrep",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "binary" | "xdr" => Some(SerializationFormat::Binary),
            "base64" => Some(SerializationFormat::Base64),
            "txrep" => Some(SerializationFormat::Txrep),
            _ => None,
        }
    }

    /// Guess the representation of `input`.
    pub fn detect(input: &[u8]) -> Self {
        let is_text = input
            .iter()
            .all(|&b| !b.is_ascii_control() || matches!(b, b'\t' | b'\r' | b'\n'));
        let text = match std::str::from_utf8(input) {
            Ok(text) if is_text => text,
            _ => return SerializationFormat::Binary,
        };
        if text.contains(':') {
            return SerializationFormat::Txrep;
        }
        match STANDARD.decode(text.trim()) {
            Ok(bytes) if !bytes.is_empty() => SerializationFormat::Base64,
            _ => SerializationFormat::Binary,
        }
    }
}

/// Base64 of the binary encoding, streamed through the encoder.
pub fn to_base64<T: XdrType + ?Sized>(value: &mut T) -> Result<String> {
    let mut encoder = EncoderStringWriter::new(&STANDARD);
    Writer::new(&mut encoder).visit("", value.as_value())?;
    Ok(encoder.into_inner())
}

/// Decode base64 text straight into a value. Surrounding whitespace is ignored;
/// anything after the value is an error.
pub fn from_base64<T: XdrType + Default>(input: &str) -> Result<T> {
    let mut decoder = DecoderReader::new(input.trim().as_bytes(), &STANDARD);
    let mut value = T::default();
    let mut reader = Reader::new(&mut decoder);
    reader.visit("", value.as_value())?;
    reader.finish()?;
    Ok(value)
}

/// Types that can move between all three representations.
pub trait MultiFormat: XdrType + Default + Clone {
    /// Serialize to bytes using the specified format
    fn serialize_format(&self, format: SerializationFormat) -> Result<Vec<u8>> {
        let mut value = self.clone();
        match format {
            SerializationFormat::Binary => Ok(to_bytes(&mut value)?.to_vec()),
            SerializationFormat::Base64 => Ok(to_base64(&mut value)?.into_bytes()),
            SerializationFormat::Txrep => Ok(txrep::to_txrep(&mut value)?.into_bytes()),
        }
    }

    /// Deserialize from bytes using the specified format
    fn deserialize_format(data: &[u8], format: SerializationFormat) -> Result<Self> {
        let text = || {
            std::str::from_utf8(data).map_err(|_| TxrepError::malformed("", constants::ERR_NOT_UTF8))
        };
        match format {
            SerializationFormat::Binary => from_bytes(data),
            SerializationFormat::Base64 => from_base64(text()?),
            SerializationFormat::Txrep => Ok(txrep::from_txrep::<Self>(text()?)?.value),
        }
    }

    /// Deserialize after guessing the format
    fn deserialize_detect(data: &[u8]) -> Result<(Self, SerializationFormat)> {
        let format = SerializationFormat::detect(data);
        let value = Self::deserialize_format(data, format)?;
        Ok((value, format))
    }
}

impl<T: XdrType + Default + Clone> MultiFormat for T {}
