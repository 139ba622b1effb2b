//! # Marshal Dispatch Protocol
//!
//! Every structured value describes itself to a [`Visitor`] one named child at a
//! time; the visitor decides what "marshal" means (write bytes, read bytes, print,
//! scan, walk). Adding a backend never touches the data types.
//!
//! A value presents itself as exactly one of four shapes, see [`XdrValue`]:
//! - **Scalar**: integers, enums, fixed/variable opaque, strings
//! - **Array**: fixed length, or variable length with a count the visitor owns
//! - **Optional**: a presence flag the visitor owns, plus at most one nested value
//! - **Aggregate**: structs and unions, which recurse into their own fields
//!
//! ## Naming
//! Children are named by dotted path: `tx.operations[2].body.type`. The top-level
//! call uses an empty name, so first-level fields have no leading dot.
//!
//! ## Failure
//! Every step returns [`Result`]; the first failure unwinds the whole traversal
//! through `?` and leaves no half-marshaled state visible to the caller.

use crate::error::{Result, TxrepError};
use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Backend that gives meaning to "marshal this named child".
pub trait Visitor {
    fn visit(&mut self, name: &str, value: XdrValue<'_>) -> Result<()>;
}

/// The closed set of shapes a value can take.
pub enum XdrValue<'a> {
    Scalar(Scalar<'a>),
    Array(&'a mut dyn XdrArray),
    Optional(&'a mut dyn XdrOptional),
    Aggregate(&'a mut dyn XdrAggregate),
}

/// Leaf values. Bounds are carried alongside the storage so every backend can
/// enforce them.
pub enum Scalar<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i32),
    Uint(&'a mut u32),
    Hyper(&'a mut i64),
    UHyper(&'a mut u64),
    Enum(&'a mut dyn XdrEnum),
    /// Fixed-length opaque data
    Opaque(&'a mut [u8]),
    VarOpaque { bytes: &'a mut Vec<u8>, max: u32 },
    String { bytes: &'a mut Vec<u8>, max: u32 },
}

/// An XDR enum: a closed set of named 32-bit values.
pub trait XdrEnum {
    fn value(&self) -> i32;
    /// Returns false, leaving `self` unchanged, when `value` is not declared.
    fn set_value(&mut self, value: i32) -> bool;
    fn symbol(&self) -> &'static str;
    /// Returns false, leaving `self` unchanged, when `symbol` is not declared.
    fn set_symbol(&mut self, symbol: &str) -> bool;
    /// Every declared symbol, in declaration order.
    fn symbols(&self) -> Vec<&'static str>;
}

/// A sequence of values. Variable-length arrays report `fixed_len() == None`.
pub trait XdrArray {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fixed_len(&self) -> Option<usize>;

    fn max_len(&self) -> usize;

    /// Grow or shrink to `len` elements, filling with defaults.
    fn resize(&mut self, len: usize);

    /// Visit every element as `name[i]`.
    fn marshal_elements(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()>;
}

/// A presence-flagged value.
pub trait XdrOptional {
    fn is_present(&self) -> bool;

    /// Setting present on an absent value installs a default one.
    fn set_present(&mut self, present: bool);

    /// Visit the nested value, under the same name, if present.
    fn marshal_inner(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()>;
}

/// Upcast helper so aggregates can be downcast by walkers and annotators.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Structs and unions.
///
/// A union marshals its discriminant first and then only the active arm.
pub trait XdrAggregate: AsAny {
    fn type_name(&self) -> &'static str;

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()>;

    /// Optional capability: a single-token text rendering used by the txrep
    /// backends in place of field-by-field output.
    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        None
    }
}

/// Domain text rendering for keys, assets and asset codes.
pub trait TextForm {
    fn render(&self) -> Result<String>;
    fn parse(&mut self, text: &str) -> Result<()>;
}

/// Anything that can present itself as one of the four shapes.
pub trait XdrType {
    fn as_value(&mut self) -> XdrValue<'_>;
}

impl XdrValue<'_> {
    pub fn shape(&self) -> &'static str {
        match self {
            XdrValue::Scalar(_) => "scalar",
            XdrValue::Array(_) => "array",
            XdrValue::Optional(_) => "optional",
            XdrValue::Aggregate(_) => "aggregate",
        }
    }

    /// Downcast an aggregate to its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            XdrValue::Aggregate(a) => downcast::<T>(&**a),
            _ => None,
        }
    }
}

pub fn downcast<T: Any>(agg: &dyn XdrAggregate) -> Option<&T> {
    agg.as_any().downcast_ref::<T>()
}

/// Dotted child path. An empty parent yields the bare field name.
pub fn join(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Visit `value` as the child `field` of `parent`.
pub fn field<T: XdrType + ?Sized>(
    v: &mut dyn Visitor,
    parent: &str,
    field: &str,
    value: &mut T,
) -> Result<()> {
    v.visit(&join(parent, field), value.as_value())
}

/// Failure for a union asked to marshal a discriminant it does not declare.
pub fn bad_arm(name: &str, value: impl fmt::Display) -> TxrepError {
    TxrepError::discriminant(&join(name, "type"), value)
}

macro_rules! scalar_impl {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl XdrType for $ty {
                fn as_value(&mut self) -> XdrValue<'_> {
                    XdrValue::Scalar(Scalar::$variant(self))
                }
            }
        )*
    };
}

scalar_impl! {
    bool => Bool,
    i32 => Int,
    u32 => Uint,
    i64 => Hyper,
    u64 => UHyper,
}

impl<const N: usize> XdrType for [u8; N] {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Scalar(Scalar::Opaque(self))
    }
}

impl<T: XdrType + ?Sized> XdrType for Box<T> {
    fn as_value(&mut self) -> XdrValue<'_> {
        (**self).as_value()
    }
}

/// Variable-length opaque data, at most `MAX` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VarOpaque<const MAX: u32>(pub Vec<u8>);

impl<const MAX: u32> XdrType for VarOpaque<MAX> {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Scalar(Scalar::VarOpaque {
            bytes: &mut self.0,
            max: MAX,
        })
    }
}

impl<const MAX: u32> From<Vec<u8>> for VarOpaque<MAX> {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl<const MAX: u32> Deref for VarOpaque<MAX> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

/// XDR string, at most `MAX` bytes. Contents are raw bytes, not necessarily UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct XdrString<const MAX: u32>(pub Vec<u8>);

impl<const MAX: u32> XdrType for XdrString<MAX> {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Scalar(Scalar::String {
            bytes: &mut self.0,
            max: MAX,
        })
    }
}

impl<const MAX: u32> From<&str> for XdrString<MAX> {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl<const MAX: u32> fmt::Display for XdrString<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Variable-length array of at most `MAX` elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VecM<T, const MAX: u32>(pub Vec<T>);

impl<T, const MAX: u32> Default for VecM<T, MAX> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T, const MAX: u32> From<Vec<T>> for VecM<T, MAX> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T, const MAX: u32> Deref for VecM<T, MAX> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T, const MAX: u32> DerefMut for VecM<T, MAX> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T: XdrType + Default, const MAX: u32> XdrArray for VecM<T, MAX> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn max_len(&self) -> usize {
        MAX as usize
    }

    fn resize(&mut self, len: usize) {
        self.0.resize_with(len, T::default);
    }

    fn marshal_elements(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        for (i, item) in self.0.iter_mut().enumerate() {
            v.visit(&format!("{name}[{i}]"), item.as_value())?;
        }
        Ok(())
    }
}

impl<T: XdrType + Default, const MAX: u32> XdrType for VecM<T, MAX> {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Array(self)
    }
}

/// Fixed-length array of `N` non-byte elements; byte arrays are `[u8; N]` scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayN<T, const N: usize>(pub [T; N]);

impl<T: Default, const N: usize> Default for ArrayN<T, N> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T: XdrType, const N: usize> XdrArray for ArrayN<T, N> {
    fn len(&self) -> usize {
        N
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    fn max_len(&self) -> usize {
        N
    }

    fn resize(&mut self, _len: usize) {}

    fn marshal_elements(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        for (i, item) in self.0.iter_mut().enumerate() {
            v.visit(&format!("{name}[{i}]"), item.as_value())?;
        }
        Ok(())
    }
}

impl<T: XdrType, const N: usize> XdrType for ArrayN<T, N> {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Array(self)
    }
}

impl<T: XdrType + Default> XdrOptional for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn set_present(&mut self, present: bool) {
        match (present, self.is_some()) {
            (true, false) => *self = Some(T::default()),
            (false, true) => *self = None,
            _ => {}
        }
    }

    fn marshal_inner(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        match self {
            Some(inner) => v.visit(name, inner.as_value()),
            None => Ok(()),
        }
    }
}

impl<T: XdrType + Default> XdrType for Option<T> {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Optional(self)
    }
}
