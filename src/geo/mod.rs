//! The geoprocessing collaborator seam.
//!
//! Raster work happens outside this crate. A [`Call`] is prepared into an
//! [`Invocation`] (concrete input files and output paths) and handed to a
//! [`Geoprocessor`]:
//!
//! - [`ExternalGeoprocessor`] runs the configured backend program
//! - [`DryRunGeoprocessor`] prints the plan and performs nothing
//! - [`RecordingGeoprocessor`] records invocations for tests

pub mod call;
mod dry_run;
mod error;
mod external;
pub mod mock;
mod prepare;

pub use call::{Call, ModisLayer};
pub use dry_run::DryRunGeoprocessor;
pub use error::CollaboratorError;
pub use external::ExternalGeoprocessor;
pub use mock::RecordingGeoprocessor;
pub use prepare::{prepare, PrepareError};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A call plus the concrete files it touches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    /// `family.function`
    pub operation: String,
    /// 1-based position of the originating step
    pub step: usize,
    pub arguments: Call,
    /// Expanded input file sets by group label
    pub inputs: BTreeMap<String, Vec<PathBuf>>,
    /// Synthesized destination files
    pub outputs: Vec<PathBuf>,
}

impl Invocation {
    pub fn new(step: usize, arguments: Call) -> Self {
        Self {
            operation: arguments.qualified_name(),
            step,
            arguments,
            inputs: BTreeMap::new(),
            outputs: Vec::new(),
        }
    }

    /// Total number of input files across groups
    pub fn input_count(&self) -> usize {
        self.inputs.values().map(Vec::len).sum()
    }
}

/// Executes prepared invocations
pub trait Geoprocessor {
    fn execute(&self, invocation: &Invocation) -> Result<(), CollaboratorError>;
}

impl<G: Geoprocessor + ?Sized> Geoprocessor for &G {
    fn execute(&self, invocation: &Invocation) -> Result<(), CollaboratorError> {
        (**self).execute(invocation)
    }
}

impl<G: Geoprocessor + ?Sized> Geoprocessor for Box<G> {
    fn execute(&self, invocation: &Invocation) -> Result<(), CollaboratorError> {
        (**self).execute(invocation)
    }
}
