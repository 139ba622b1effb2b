//! Generic traversal over every nested value.
//!
//! ```rust
//! use stellar_txrep::core::walk::{for_each, Walk};
//! use stellar_txrep::types::TransactionEnvelope;
//!
//! let mut env = TransactionEnvelope::default();
//! let mut paths = Vec::new();
//! for_each(&mut env, |name, _| {
//!     paths.push(name.to_string());
//!     Walk::Descend
//! })
//! .unwrap();
//! assert!(paths.contains(&"tx.fee".to_string()));
//! ```

use crate::core::marshal::{Visitor, XdrAggregate, XdrValue};
use crate::error::Result;
use std::any::Any;

/// What the walker does after the callback has seen a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    /// Skip everything nested inside this value.
    Prune,
}

struct ForEach<F> {
    f: F,
}

impl<F> Visitor for ForEach<F>
where
    F: FnMut(&str, &XdrValue<'_>) -> Walk,
{
    fn visit(&mut self, name: &str, value: XdrValue<'_>) -> Result<()> {
        if (self.f)(name, &value) == Walk::Prune {
            return Ok(());
        }
        match value {
            XdrValue::Scalar(_) => Ok(()),
            XdrValue::Array(a) => a.marshal_elements(self, name),
            XdrValue::Optional(o) => o.marshal_inner(self, name),
            XdrValue::Aggregate(a) => a.marshal(self, name),
        }
    }
}

/// Call `f` on every value nested in `value`, depth first, in field order.
/// The root itself is not reported.
pub fn for_each<T, F>(value: &mut T, f: F) -> Result<()>
where
    T: XdrAggregate + ?Sized,
    F: FnMut(&str, &XdrValue<'_>) -> Walk,
{
    value.marshal(&mut ForEach { f }, "")
}

/// Clone out every nested aggregate of type `T`, together with its path.
pub fn collect<T, A>(value: &mut A) -> Result<Vec<(String, T)>>
where
    T: Any + Clone,
    A: XdrAggregate + ?Sized,
{
    let mut found = Vec::new();
    for_each(value, |name, v| {
        if let Some(item) = v.downcast_ref::<T>() {
            found.push((name.to_string(), item.clone()));
        }
        Walk::Descend
    })?;
    Ok(found)
}
