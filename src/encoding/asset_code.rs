//! Asset code text.
//!
//! Codes are stored as 4 or 12 zero-padded bytes. The text form drops the padding
//! and escapes anything that would not survive a `CODE:ISSUER` token:
//! bytes outside `0x21..=0x7e` become `\xhh`, `\` and `:` get a backslash.
//!
//! A 12-byte code whose trimmed text would be 4 bytes or fewer keeps one padding
//! byte (`ABC\x00\x00`), so the text alone still says which width it came from.

use crate::error::{constants, Result, TxrepError};
use std::fmt::Write;

/// Render a 4- or 12-byte code.
pub fn render_asset_code(code: &[u8]) -> String {
    let mut len = code.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    if code.len() > 4 && len <= 4 {
        len = 5;
    }
    let mut out = String::with_capacity(len);
    for &b in &code[..len] {
        if b <= b' ' || b >= 0x7f {
            let _ = write!(out, "\\x{b:02x}");
        } else {
            if b == b'\\' || b == b':' {
                out.push('\\');
            }
            out.push(char::from(b));
        }
    }
    out
}

/// Parse code text into its zero-padded form: 4 bytes when it decodes to four
/// or fewer bytes, 12 otherwise.
pub fn parse_asset_code(text: &str) -> Result<Vec<u8>> {
    let input = text.as_bytes();
    let mut code = Vec::with_capacity(12);
    let mut pos = 0;
    while pos < input.len() {
        let b = input[pos];
        pos += 1;
        if b <= b' ' || b >= 0x7f {
            return Err(TxrepError::IllegalCharacter {
                field: String::new(),
                byte: b,
            });
        }
        if b != b'\\' {
            code.push(b);
            continue;
        }
        match input.get(pos) {
            Some(b'x') => {
                let digits = input
                    .get(pos + 1..pos + 3)
                    .ok_or_else(|| TxrepError::malformed("", constants::ERR_BAD_HEX))?;
                let mut byte = [0u8; 1];
                hex::decode_to_slice(digits, &mut byte)
                    .map_err(|_| TxrepError::malformed("", constants::ERR_BAD_HEX))?;
                code.push(byte[0]);
                pos += 3;
            }
            Some(&escaped) => {
                code.push(escaped);
                pos += 1;
            }
            None => return Err(TxrepError::malformed("", constants::ERR_DANGLING_ESCAPE)),
        }
    }

    if code.len() > 12 {
        return Err(TxrepError::bound("", code.len(), 12));
    }
    code.resize(if code.len() <= 4 { 4 } else { 12 }, 0);
    Ok(code)
}
