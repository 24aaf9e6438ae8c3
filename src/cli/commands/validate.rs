//! `riskflow validate`

use crate::config::{load_job, Defaults};
use crate::router::{validate_job, StepPlan};
use anyhow::Result;
use std::path::Path;

pub fn run_validate_command(job_path: &Path, defaults_path: Option<&Path>) -> Result<()> {
    let defaults = Defaults::load(defaults_path)?;
    let job = load_job(job_path)?;
    let report = validate_job(&job, &defaults);

    for step in &report.steps {
        match &step.plan {
            StepPlan::Ready(call) => {
                println!("step {}: {} -> {}", step.position, step.process, call.qualified_name())
            }
            StepPlan::Unknown => {
                println!("step {}: unknown process '{}', skipped", step.position, step.process)
            }
            StepPlan::Invalid(_) => {}
        }
    }
    for line in report.issue_lines() {
        println!("{line}");
    }

    if report.is_valid() {
        println!("{} is valid ({} step(s))", job_path.display(), job.len());
        return Ok(());
    }
    println!("{} issue(s) found", report.issue_count());
    match report.into_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
