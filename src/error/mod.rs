//! Error types for the unitdeck daemon.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
