//! CLI command handlers
//!
//! This module contains all CLI-related functionality including:
//! - Argument parsing structures
//! - Command implementations
//! - Exit code mapping

pub mod args;
pub mod commands;
pub mod help;
pub mod router;

pub use args::{Cli, Commands};
pub use help::{generate_help, get_log_level};
pub use router::execute_command;

use crate::error::ConfigFileError;

/// Process exit code for an error returned by [`execute_command`]
///
/// `2` document, `3` validation, `4` step failure, `1` anything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ConfigFileError>()
        .map_or(1, ConfigFileError::exit_code)
}
