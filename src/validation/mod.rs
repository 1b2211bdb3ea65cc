//! Validation for untrusted payload fields
//!
//! Every client event and HTTP body passes through these checks before it
//! can reach the registry.

mod payload;

pub use payload::{optional_string, require_channel, require_message, require_string};
