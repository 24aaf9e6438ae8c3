//! Command implementation modules
//!
//! Each command is implemented as a separate module.

pub mod operations;
pub mod run;
pub mod validate;

pub use operations::{render_operations, run_operations_command};
pub use run::run_job_command;
pub use validate::run_validate_command;
