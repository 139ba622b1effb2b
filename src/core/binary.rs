//! # Binary Codec
//!
//! Canonical XDR encoding: big-endian, every item a multiple of 4 bytes.
//!
//! ## Wire Format
//! ```text
//! int/uint/enum/bool   4 bytes
//! hyper/uhyper         8 bytes
//! opaque[N]            N bytes + zero padding to 4
//! opaque<M>/string<M>  length(4) + bytes + zero padding to 4
//! T<M> (var array)     count(4) + elements
//! T[N] (fixed array)   elements
//! *T (optional)        present(4) + T when present
//! union                discriminant(4) + active arm
//! ```
//!
//! The [`Reader`] validates everything the [`Writer`] guarantees: bounds, zero
//! padding, 0/1 booleans and declared discriminants.

use crate::core::marshal::{Scalar, Visitor, XdrType, XdrValue};
use crate::error::{constants, Result, TxrepError};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{self, Read, Write};
use tracing::debug;

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Visitor appending the binary encoding of every value to `W`.
pub struct Writer<W> {
    out: W,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes).map_err(TxrepError::Io)
    }

    fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    fn put_padded(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(bytes)?;
        self.put(&[0u8; 3][..padding(bytes.len())])
    }

    fn put_var(&mut self, name: &str, bytes: &[u8], max: u32) -> Result<()> {
        if bytes.len() > max as usize {
            return Err(TxrepError::bound(name, bytes.len(), max as usize));
        }
        self.put_u32(bytes.len() as u32)?;
        self.put_padded(bytes)
    }

    fn scalar(&mut self, name: &str, scalar: Scalar<'_>) -> Result<()> {
        match scalar {
            Scalar::Bool(b) => self.put_u32(u32::from(*b)),
            Scalar::Int(n) => self.put(&n.to_be_bytes()),
            Scalar::Uint(n) => self.put(&n.to_be_bytes()),
            Scalar::Hyper(n) => self.put(&n.to_be_bytes()),
            Scalar::UHyper(n) => self.put(&n.to_be_bytes()),
            Scalar::Enum(e) => self.put(&e.value().to_be_bytes()),
            Scalar::Opaque(bytes) => self.put_padded(bytes),
            Scalar::VarOpaque { bytes, max } | Scalar::String { bytes, max } => {
                self.put_var(name, bytes, max)
            }
        }
    }
}

impl<W: Write> Visitor for Writer<W> {
    fn visit(&mut self, name: &str, value: XdrValue<'_>) -> Result<()> {
        match value {
            XdrValue::Scalar(s) => self.scalar(name, s),
            XdrValue::Array(a) => {
                if a.fixed_len().is_none() {
                    if a.len() > a.max_len() {
                        return Err(TxrepError::bound(name, a.len(), a.max_len()));
                    }
                    self.put_u32(a.len() as u32)?;
                }
                a.marshal_elements(self, name)
            }
            XdrValue::Optional(o) => {
                self.put_u32(u32::from(o.is_present()))?;
                o.marshal_inner(self, name)
            }
            XdrValue::Aggregate(a) => a.marshal(self, name),
        }
    }
}

/// Visitor filling values from a binary encoding.
pub struct Reader<R> {
    input: R,
}

impl<R: Read> Reader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_err(name: &str, e: io::Error) -> TxrepError {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => TxrepError::malformed(name, constants::ERR_TRUNCATED),
            // base64 framing errors surface from the decoding reader as InvalidData
            io::ErrorKind::InvalidData => TxrepError::malformed(name, constants::ERR_BAD_BASE64),
            _ => TxrepError::Io(e),
        }
    }

    fn take(&mut self, name: &str, buf: &mut [u8]) -> Result<()> {
        self.input
            .read_exact(buf)
            .map_err(|e| Self::read_err(name, e))
    }

    fn take_u32(&mut self, name: &str) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.take(name, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn take_u64(&mut self, name: &str) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.take(name, &mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    fn take_bool(&mut self, name: &str) -> Result<bool> {
        match self.take_u32(name)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(TxrepError::malformed(name, constants::ERR_BAD_BOOL)),
        }
    }

    fn skip_padding(&mut self, name: &str, len: usize) -> Result<()> {
        let mut pad = [0u8; 3];
        let pad = &mut pad[..padding(len)];
        self.take(name, pad)?;
        if pad.iter().any(|&b| b != 0) {
            return Err(TxrepError::malformed(name, constants::ERR_NONZERO_PADDING));
        }
        Ok(())
    }

    fn take_var(&mut self, name: &str, bytes: &mut Vec<u8>, max: u32) -> Result<()> {
        let len = self.take_u32(name)? as usize;
        if len > max as usize {
            return Err(TxrepError::bound(name, len, max as usize));
        }
        // read through `take` so a lying length cannot force a large allocation
        bytes.clear();
        (&mut self.input)
            .take(len as u64)
            .read_to_end(bytes)
            .map_err(|e| Self::read_err(name, e))?;
        if bytes.len() != len {
            return Err(TxrepError::malformed(name, constants::ERR_TRUNCATED));
        }
        self.skip_padding(name, len)
    }

    fn scalar(&mut self, name: &str, scalar: Scalar<'_>) -> Result<()> {
        match scalar {
            Scalar::Bool(b) => *b = self.take_bool(name)?,
            Scalar::Int(n) => *n = self.take_u32(name)? as i32,
            Scalar::Uint(n) => *n = self.take_u32(name)?,
            Scalar::Hyper(n) => *n = self.take_u64(name)? as i64,
            Scalar::UHyper(n) => *n = self.take_u64(name)?,
            Scalar::Enum(e) => {
                let value = self.take_u32(name)? as i32;
                if !e.set_value(value) {
                    return Err(TxrepError::discriminant(name, value));
                }
            }
            Scalar::Opaque(bytes) => {
                self.take(name, bytes)?;
                self.skip_padding(name, bytes.len())?;
            }
            Scalar::VarOpaque { bytes, max } | Scalar::String { bytes, max } => {
                self.take_var(name, bytes, max)?;
            }
        }
        Ok(())
    }

    /// Fail if any input remains after the value.
    pub fn finish(mut self) -> Result<()> {
        let mut extra = [0u8; 1];
        loop {
            return match self.input.read(&mut extra) {
                Ok(0) => Ok(()),
                Ok(_) => Err(TxrepError::malformed("", constants::ERR_TRAILING_BYTES)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => Err(Self::read_err("", e)),
            };
        }
    }
}

impl<R: Read> Visitor for Reader<R> {
    fn visit(&mut self, name: &str, value: XdrValue<'_>) -> Result<()> {
        match value {
            XdrValue::Scalar(s) => self.scalar(name, s),
            XdrValue::Array(a) => {
                if a.fixed_len().is_none() {
                    let count = self.take_u32(name)? as usize;
                    if count > a.max_len() {
                        return Err(TxrepError::bound(name, count, a.max_len()));
                    }
                    a.resize(count);
                }
                a.marshal_elements(self, name)
            }
            XdrValue::Optional(o) => {
                let present = self.take_bool(name)?;
                o.set_present(present);
                o.marshal_inner(self, name)
            }
            XdrValue::Aggregate(a) => a.marshal(self, name),
        }
    }
}

/// Encode `value` to its canonical binary form.
pub fn to_bytes<T: XdrType + ?Sized>(value: &mut T) -> Result<Bytes> {
    let mut writer = Writer::new(BytesMut::with_capacity(256).writer());
    writer.visit("", value.as_value())?;
    let bytes = writer.into_inner().into_inner().freeze();
    debug!(len = bytes.len(), "encoded xdr");
    Ok(bytes)
}

/// Decode a complete value; trailing bytes are an error.
pub fn from_bytes<T: XdrType + Default>(input: &[u8]) -> Result<T> {
    debug!(len = input.len(), "decoding xdr");
    let mut value = T::default();
    let mut reader = Reader::new(input);
    reader.visit("", value.as_value())?;
    reader.finish()?;
    Ok(value)
}
