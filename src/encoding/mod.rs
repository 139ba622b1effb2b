//! Domain text encodings that sit below the txrep grammar.

pub mod asset_code;
pub mod strkey;

pub use asset_code::{parse_asset_code, render_asset_code};
pub use strkey::{StrKey, StrKeyError, StrKeyVersion};
