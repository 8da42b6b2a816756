//! Logging utilities.
//!
//! This module centralizes logger initialization. Everything else logs through
//! the standard `log` facade.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
