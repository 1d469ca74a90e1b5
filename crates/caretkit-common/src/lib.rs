//! # CaretKit Common
//!
//! Shared utilities for the CaretKit crates.
//!
//! ## Features
//!
//! - Logging configuration and setup
//! - Style-property key casing

pub mod case;
pub mod logging;

pub use case::{camelize_key, camelize_key_with};
pub use logging::{init_logging, LogConfig, LogFormat, LoggingError};
