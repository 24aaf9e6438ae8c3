//! `riskflow run`

use crate::config::{load_job, Defaults, StepErrorPolicy};
use crate::error::ConfigFileError;
use crate::geo::{DryRunGeoprocessor, ExternalGeoprocessor, Geoprocessor};
use crate::router::{RunContext, RunReport, Router, StepStatus};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

pub fn run_job_command(
    job_path: &Path,
    on_step_error: Option<StepErrorPolicy>,
    dry_run: bool,
    defaults_path: Option<&Path>,
) -> Result<()> {
    let defaults = Defaults::load(defaults_path)?;
    let job = load_job(job_path)?;

    let context = RunContext::new(defaults)
        .with_policy(on_step_error)
        .with_dry_run(dry_run);

    let geoprocessor: Box<dyn Geoprocessor> = if dry_run {
        Box::new(DryRunGeoprocessor::new())
    } else {
        let backend = ExternalGeoprocessor::from_defaults(&context.defaults);
        debug!("Using geoprocessing backend '{}'", backend.program());
        Box::new(backend)
    };

    let report = Router::new(context, geoprocessor).run(&job)?;
    print_report(&report);
    check_report(&report)?;
    Ok(())
}

fn print_report(report: &RunReport) {
    for step in &report.steps {
        let label = step.operation.as_deref().unwrap_or(step.process.as_str());
        match &step.message {
            Some(message) if step.status != StepStatus::Completed => {
                println!("  step {:>3} {:<9} {label}: {message}", step.position, step.status)
            }
            _ => println!("  step {:>3} {:<9} {label}", step.position, step.status),
        }
    }
    println!("{}", report.summary());
}

/// A run under the skip policy still fails when any step failed
fn check_report(report: &RunReport) -> Result<(), ConfigFileError> {
    match report.steps.iter().find(|s| s.status == StepStatus::Failed) {
        None => Ok(()),
        Some(first) => Err(ConfigFileError::step(
            first.position,
            first.process.clone(),
            format!("{} step(s) failed", report.failed()),
        )),
    }
}
