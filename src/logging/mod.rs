//! Logging for the curator commands
//!
//! This module provides:
//! - Bracketed log lines carrying the active span path
//! - Stdout logging, plus an optional timestamped log file

mod formatter;
mod setup;

pub use setup::setup_logging;
