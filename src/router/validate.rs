use crate::config::{Defaults, Job};
use crate::dispatch;
use crate::error::{ConfigFileError, StepIssue};
use crate::geo::Call;
use crate::resolve::Family;

/// What validation concluded for one step
#[derive(Debug)]
pub enum StepPlan {
    /// Unknown process; skipped at run time
    Unknown,
    Invalid(Vec<ConfigFileError>),
    Ready(Call),
}

#[derive(Debug)]
pub struct PlannedStep {
    pub position: usize,
    pub process: String,
    pub plan: StepPlan,
}

/// Every step of a job checked against the key table
#[derive(Debug)]
pub struct ValidationReport {
    pub steps: Vec<PlannedStep>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|step| matches!(step.plan, StepPlan::Invalid(_)))
    }

    pub fn issue_count(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match &step.plan {
                StepPlan::Invalid(issues) => issues.len(),
                _ => 0,
            })
            .sum()
    }

    /// Issues as display lines, `step N: message`
    pub fn issue_lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| {
                let issues: &[ConfigFileError] = match &step.plan {
                    StepPlan::Invalid(issues) => issues,
                    _ => &[],
                };
                issues
                    .iter()
                    .map(move |issue| format!("step {}: {}", step.position, issue.message()))
            })
            .collect()
    }

    /// Turn every issue into one aggregate error; `None` when valid
    pub fn into_error(self) -> Option<ConfigFileError> {
        let issues: Vec<StepIssue> = self
            .steps
            .into_iter()
            .flat_map(|step| {
                let position = step.position;
                let errors = match step.plan {
                    StepPlan::Invalid(errors) => errors,
                    _ => Vec::new(),
                };
                errors
                    .into_iter()
                    .map(move |error| StepIssue { step: position, error })
            })
            .collect();
        (!issues.is_empty()).then(|| ConfigFileError::invalid(issues))
    }
}

/// Check every step in one pass, collecting all issues
pub fn validate_job(job: &Job, defaults: &Defaults) -> ValidationReport {
    let steps = job
        .steps
        .iter()
        .map(|step| {
            let plan = match Family::from_process(step.process()) {
                None => StepPlan::Unknown,
                Some(family) => match dispatch::check_step(family, step, defaults) {
                    Ok(call) => StepPlan::Ready(call),
                    Err(issues) => StepPlan::Invalid(issues),
                },
            };
            PlannedStep {
                position: step.position(),
                process: step.process().to_string(),
                plan,
            }
        })
        .collect();
    ValidationReport { steps }
}
