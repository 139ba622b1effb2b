//! # Utility Modules
//!
//! Supporting utilities shared by the codecs.
//!
//! ## Components
//! - **Checksum**: CRC16-XModem for strkeys
//! - **Logging**: tracing subscriber configuration

pub mod checksum;
pub mod logging;

pub use logging::init_logging;
