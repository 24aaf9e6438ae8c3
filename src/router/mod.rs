//! Process routing: validate a job, then run its steps in document order.
//!
//! Every step is checked before anything runs. Under the `abort` policy a
//! single issue stops the run before the first step, and the first failing
//! step stops the remaining ones. Under `skip` failures are reported and the
//! run continues.

mod report;
mod validate;

pub use report::{RunReport, StepOutcome, StepStatus};
pub use validate::{validate_job, PlannedStep, StepPlan, ValidationReport};

use crate::config::{Defaults, Job, StepErrorPolicy};
use crate::error::{ConfigFileError, ErrorCode, Result};
use crate::geo::{self, Call, Geoprocessor};
use std::time::Instant;
use tracing::{error, info, warn};

/// Immutable settings shared by every step of a run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub defaults: Defaults,
    /// Overrides the job's `on_step_error` when set
    pub policy: Option<StepErrorPolicy>,
    pub dry_run: bool,
}

impl RunContext {
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: Option<StepErrorPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn policy_for(&self, job: &Job) -> StepErrorPolicy {
        self.policy.unwrap_or(job.on_step_error)
    }
}

pub struct Router<G> {
    context: RunContext,
    geoprocessor: G,
}

impl<G: Geoprocessor> Router<G> {
    pub fn new(context: RunContext, geoprocessor: G) -> Self {
        Self {
            context,
            geoprocessor,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn run(&self, job: &Job) -> Result<RunReport> {
        let policy = self.context.policy_for(job);
        let validation = validate_job(job, &self.context.defaults);

        if policy == StepErrorPolicy::Abort && !validation.is_valid() {
            return Err(validation
                .into_error()
                .unwrap_or_else(|| ConfigFileError::invalid(Vec::new())));
        }

        info!(
            "Running {} step(s) ({:?} on step error{})",
            job.len(),
            policy,
            if self.context.dry_run { ", dry run" } else { "" }
        );

        let mut report = RunReport::new(self.context.dry_run);
        for planned in validation.steps {
            let position = planned.position;
            let process = planned.process;
            match planned.plan {
                StepPlan::Unknown => {
                    warn!("Skipping step {position}: unknown process '{process}'");
                    report.record(StepOutcome::skipped(
                        position,
                        &process,
                        format!("unknown process '{process}'"),
                    ));
                }
                StepPlan::Invalid(issues) => {
                    let message = issues
                        .iter()
                        .map(|issue| issue.message())
                        .collect::<Vec<_>>()
                        .join("; ");
                    warn!("Skipping invalid step {position}: {message}");
                    report.record(StepOutcome::failed(
                        position,
                        &process,
                        None,
                        message,
                        std::time::Duration::ZERO,
                    ));
                }
                StepPlan::Ready(call) => {
                    let operation = call.qualified_name();
                    info!("Step {position}: {operation}");
                    let start = Instant::now();
                    match self.execute_step(position, &process, call) {
                        Ok(()) => report.record(StepOutcome::completed(
                            position,
                            &process,
                            operation,
                            start.elapsed(),
                        )),
                        Err(err) if policy == StepErrorPolicy::Abort => {
                            error!("{}", err.user_message());
                            return Err(err);
                        }
                        Err(err) => {
                            error!("{}", err.user_message());
                            report.record(StepOutcome::failed(
                                position,
                                &process,
                                Some(operation),
                                err.user_message(),
                                start.elapsed(),
                            ));
                        }
                    }
                }
            }
        }

        report.finish();
        info!("{}", report.summary());
        Ok(report)
    }

    /// Prepare and execute one call; errors come back wrapped as step errors
    fn execute_step(&self, position: usize, process: &str, call: Call) -> Result<()> {
        let invocation = geo::prepare(position, call, &self.context.defaults, self.context.dry_run)
            .map_err(|e| {
                ConfigFileError::step_with_code(
                    ErrorCode::EXEC_FILESYSTEM,
                    position,
                    process,
                    e.to_string(),
                )
                .with_source(e)
            })?;

        match &invocation.arguments {
            Call::Table(op) if !self.context.dry_run => {
                op.apply().map_err(|e| {
                    ConfigFileError::step_with_code(ErrorCode::EXEC_TABLE, position, process, e.to_string())
                        .with_source(e)
                })?;
                Ok(())
            }
            _ => self
                .geoprocessor
                .execute(&invocation)
                .map_err(|e| e.into_step_error(position, process)),
        }
    }
}
