//! # riskflow
//!
//! Configuration-driven orchestration of climate and disaster risk analysis.
//!
//! ## Usage
//!
//! ```bash
//! riskflow run job.yml [--on-step-error abort|skip] [--dry-run] [--defaults defaults.toml]
//! riskflow validate job.yml
//! riskflow operations [--family raster]
//! ```
//!
//! ## Modules
//!
//! - `config` - Job documents and the defaults registry
//! - `resolve` - The key table and the parameter resolution primitives
//! - `dispatch` - Per-family construction of typed calls
//! - `files` - File references, pattern expansion and output naming
//! - `geo` - The geoprocessing collaborator seam and its backends
//! - `tables` - Native CSV table operations
//! - `router` - Job validation and step execution
//! - `cli` - Command-line interface
//! - `error` - Error types and codes
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod files;
pub mod geo;
pub mod resolve;
pub mod router;
pub mod tables;

pub use config::{Defaults, Job, Step, StepErrorPolicy};
pub use error::{ConfigFileError, Result};
pub use router::{RunContext, RunReport, Router};
