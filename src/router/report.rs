use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    /// Unknown process; nothing was invoked
    Skipped,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Completed => "completed",
            StepStatus::Skipped => "skipped",
            StepStatus::Failed => "failed",
        };
        f.pad(s)
    }
}

/// What happened to one step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub position: usize,
    pub process: String,
    /// `family.function`, once dispatched
    pub operation: Option<String>,
    pub status: StepStatus,
    pub message: Option<String>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl StepOutcome {
    pub fn completed(position: usize, process: &str, operation: String, duration: Duration) -> Self {
        Self {
            position,
            process: process.to_string(),
            operation: Some(operation),
            status: StepStatus::Completed,
            message: None,
            duration,
        }
    }

    pub fn skipped(position: usize, process: &str, reason: impl Into<String>) -> Self {
        Self {
            position,
            process: process.to_string(),
            operation: None,
            status: StepStatus::Skipped,
            message: Some(reason.into()),
            duration: Duration::ZERO,
        }
    }

    pub fn failed(
        position: usize,
        process: &str,
        operation: Option<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            position,
            process: process.to_string(),
            operation,
            status: StepStatus::Failed,
            message: Some(message.into()),
            duration,
        }
    }
}

/// Per-step outcomes of a run, in document order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub steps: Vec<StepOutcome>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    pub fn completed(&self) -> usize {
        self.count(StepStatus::Completed)
    }

    pub fn skipped(&self) -> usize {
        self.count(StepStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(StepStatus::Failed)
    }

    /// No step failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, position: usize) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.position == position)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} step(s): {} completed, {} skipped, {} failed",
            self.steps.len(),
            self.completed(),
            self.skipped(),
            self.failed()
        )
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut report = RunReport::new(false);
        report.record(StepOutcome::completed(
            1,
            "raster",
            "raster.crop_files".to_string(),
            Duration::from_millis(12),
        ));
        report.record(StepOutcome::skipped(2, "GPM", "unknown process"));
        report.record(StepOutcome::failed(
            3,
            "impact",
            None,
            "No 'boundary_file' specified",
            Duration::ZERO,
        ));
        report.finish();

        assert_eq!(report.summary(), "3 step(s): 1 completed, 1 skipped, 1 failed");
        assert!(!report.is_success());
        assert_eq!(report.outcome(2).map(|s| s.status), Some(StepStatus::Skipped));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["duration"], 12);
        assert_eq!(json["steps"][2]["status"], "failed");
    }
}
