use super::Job;
use crate::error::{helpers::job_not_found, ErrorCode, ErrorExt, Result};
use std::path::Path;
use tracing::debug;

/// Read and parse a job document from disk
pub fn load_job(path: &Path) -> Result<Job> {
    if !path.exists() {
        return Err(job_not_found(path));
    }

    let content = std::fs::read_to_string(path).to_document_error(
        ErrorCode::CONFIG_NOT_FOUND,
        path,
        "Failed to read job document",
    )?;

    let job = Job::from_yaml_str(&content, Some(path))?;
    debug!(
        "Loaded {} step(s) from {} (on_step_error: {:?})",
        job.len(),
        path.display(),
        job.on_step_error
    );
    Ok(job)
}
