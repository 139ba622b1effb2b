//! # Txrep
//!
//! Human-readable transaction representation: one `path: value` line per
//! scalar, in traversal order.
//!
//! ```text
//! tx.sourceAccount: GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ
//! tx.fee: 100
//! tx.seqNum: 1234
//! tx.timeBounds.present: false
//! tx.memo.type: MEMO_TEXT
//! tx.memo.text: "hello"
//! tx.operations.len: 1
//! tx.operations[0].sourceAccount.present: false
//! tx.operations[0].body.type: PAYMENT
//! ```
//!
//! ## Scalar Grammar
//! | Shape | Text |
//! |-------|------|
//! | bool | `true` / `false` |
//! | integers | decimal |
//! | enum | symbol (`MEMO_TEXT`); decimal is accepted on input |
//! | opaque | lowercase hex, empty for zero length |
//! | string | double-quoted, `\"` `\\` and `\xhh` escapes |
//!
//! Only the first whitespace-delimited token of a value is read, so anything
//! after it on the line is a free-form comment. Quoted strings extend to their
//! closing quote.
//!
//! ## Help
//! Writing `?` after an enum value (`tx.memo.type: MEMO_TEXT?`, or just `?`)
//! marks the field. Printing with the resulting [`HelpSet`] appends the
//! declared choices to that line:
//!
//! ```text
//! tx.memo.type: MEMO_TEXT (MEMO_NONE, MEMO_TEXT, MEMO_ID, MEMO_HASH, MEMO_RETURN)
//! ```

pub mod print;
pub mod scan;

pub use print::{to_txrep, to_txrep_annotated, to_txrep_configured, AccountBook, Annotate, Printer};
pub use scan::{from_txrep, from_txrep_with, HelpSet, KeyValueMap, ScanOutcome, Scanner};

use crate::core::marshal::Scalar;
use crate::error::{constants, Result, TxrepError};
use std::fmt::Write;
use std::str::FromStr;

/// First whitespace-delimited token, or "" for a blank value.
pub(crate) fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// Double-quote `bytes`, escaping quotes, backslashes and non-printable bytes.
pub fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('"');
    out
}

/// Parse a double-quoted string from the start of `text`. Anything after the
/// closing quote is ignored.
pub fn unquote(text: &str) -> Result<Vec<u8>> {
    let bad = || TxrepError::malformed("", constants::ERR_BAD_QUOTED);
    let input = text.trim_start().as_bytes();
    if input.first() != Some(&b'"') {
        return Err(bad());
    }
    let mut out = Vec::new();
    let mut pos = 1;
    while let Some(&b) = input.get(pos) {
        pos += 1;
        match b {
            b'"' => return Ok(out),
            b'\\' => {
                let escaped = *input.get(pos).ok_or_else(bad)?;
                pos += 1;
                if escaped == b'x' {
                    let digits = input.get(pos..pos + 2).ok_or_else(bad)?;
                    let mut byte = [0u8; 1];
                    hex::decode_to_slice(digits, &mut byte).map_err(|_| bad())?;
                    out.push(byte[0]);
                    pos += 2;
                } else {
                    out.push(escaped);
                }
            }
            _ => out.push(b),
        }
    }
    // no closing quote
    Err(bad())
}

pub(crate) fn render_scalar(scalar: &Scalar<'_>) -> String {
    match scalar {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Uint(n) => n.to_string(),
        Scalar::Hyper(n) => n.to_string(),
        Scalar::UHyper(n) => n.to_string(),
        Scalar::Enum(e) => e.symbol().to_string(),
        Scalar::Opaque(bytes) => hex::encode(bytes),
        Scalar::VarOpaque { bytes, .. } => hex::encode(bytes),
        Scalar::String { bytes, .. } => quote(bytes),
    }
}

fn parse_number<T: FromStr>(token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| TxrepError::malformed("", constants::ERR_BAD_INTEGER))
}

fn check_bound(len: usize, max: u32) -> Result<()> {
    if len > max as usize {
        return Err(TxrepError::bound("", len, max as usize));
    }
    Ok(())
}

/// Fill `scalar` from the value text of its line. Errors carry an empty field
/// path for the caller to fill in.
pub(crate) fn parse_scalar(scalar: Scalar<'_>, text: &str) -> Result<()> {
    let token = first_token(text);
    match scalar {
        Scalar::Bool(b) => {
            *b = match token {
                "true" => true,
                "false" => false,
                _ => return Err(TxrepError::malformed("", constants::ERR_BAD_PRESENT)),
            }
        }
        Scalar::Int(n) => *n = parse_number(token)?,
        Scalar::Uint(n) => *n = parse_number(token)?,
        Scalar::Hyper(n) => *n = parse_number(token)?,
        Scalar::UHyper(n) => *n = parse_number(token)?,
        Scalar::Enum(e) => {
            if !e.set_symbol(token) {
                let declared = token.parse::<i32>().map(|n| e.set_value(n));
                if declared != Ok(true) {
                    return Err(TxrepError::discriminant("", token));
                }
            }
        }
        Scalar::Opaque(bytes) => {
            hex::decode_to_slice(token, bytes)
                .map_err(|_| TxrepError::malformed("", constants::ERR_BAD_HEX))?;
        }
        Scalar::VarOpaque { bytes, max } => {
            let decoded =
                hex::decode(token).map_err(|_| TxrepError::malformed("", constants::ERR_BAD_HEX))?;
            check_bound(decoded.len(), max)?;
            *bytes = decoded;
        }
        Scalar::String { bytes, max } => {
            let decoded = unquote(text)?;
            check_bound(decoded.len(), max)?;
            *bytes = decoded;
        }
    }
    Ok(())
}
