//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::{run_job_command, run_operations_command, run_validate_command};
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            job,
            on_step_error,
            dry_run,
            defaults,
        } => run_job_command(&job, on_step_error, dry_run, defaults.as_deref()),
        Commands::Validate { job, defaults } => run_validate_command(&job, defaults.as_deref()),
        Commands::Operations { family } => run_operations_command(family.as_deref()),
    }
}
