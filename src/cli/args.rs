//! CLI argument structures

use crate::config::StepErrorPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run declarative climate and disaster risk processing jobs
#[derive(Parser, Debug)]
#[command(name = "riskflow")]
#[command(about = "riskflow - Run declarative climate and disaster risk processing jobs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate and run every step of a job document
    #[command(name = "run")]
    Run {
        /// Job document (YAML)
        job: PathBuf,

        /// What to do when a step fails; overrides the document's on_step_error
        #[arg(long, value_enum)]
        on_step_error: Option<StepErrorPolicy>,

        /// Print each step's invocation instead of executing it
        #[arg(long)]
        dry_run: bool,

        /// Defaults registry file (TOML)
        #[arg(long, value_name = "TOML")]
        defaults: Option<PathBuf>,
    },

    /// Check a job document and report every issue
    #[command(name = "validate")]
    Validate {
        /// Job document (YAML)
        job: PathBuf,

        /// Defaults registry file (TOML)
        #[arg(long, value_name = "TOML")]
        defaults: Option<PathBuf>,
    },

    /// List the keys each process type accepts
    #[command(name = "operations")]
    Operations {
        /// Only list this family (CHIRPS, MODIS, analysis, raster, impact, table)
        #[arg(long)]
        family: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::parse_from([
            "riskflow",
            "-vv",
            "run",
            "job.yml",
            "--on-step-error",
            "skip",
            "--dry-run",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                job,
                on_step_error,
                dry_run,
                defaults,
            } => {
                assert_eq!(job, PathBuf::from("job.yml"));
                assert_eq!(on_step_error, Some(StepErrorPolicy::Skip));
                assert!(dry_run);
                assert!(defaults.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
