//! # Core Components
//!
//! The marshal protocol and the codecs that depend only on it.
//!
//! ## Components
//! - **Marshal**: the visitor protocol every type implements
//! - **Binary**: canonical XDR reader and writer
//! - **Serialization**: base64 wrappers and format selection
//! - **Walk**: generic traversal over nested values
//!
//! ## Wire Format
//! ```text
//! [discriminant(4)] [field] [field] ...   every item padded to 4 bytes
//! ```

pub mod binary;
pub mod marshal;
pub mod serialization;
pub mod walk;
