use crate::error::{ConfigFileError, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Geoprocessing program not found: {0}")]
    NotFound(String),

    #[error("Failed to run geoprocessing program: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Failed to send invocation to geoprocessing program: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("{operation} failed{}{}", exit_suffix(.code), stderr_suffix(.stderr))]
    Failed {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Cannot encode invocation: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Injected(String),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " without an exit code".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

impl CollaboratorError {
    pub fn error_code(&self) -> u16 {
        match self {
            CollaboratorError::NotFound(_) => ErrorCode::EXEC_COLLABORATOR_NOT_FOUND,
            _ => ErrorCode::EXEC_COLLABORATOR_FAILED,
        }
    }

    /// Wrap as the failure of step `step`
    pub fn into_step_error(self, step: usize, process: &str) -> ConfigFileError {
        ConfigFileError::step_with_code(self.error_code(), step, process, self.to_string())
            .with_source(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_carries_code_and_stderr() {
        let err = CollaboratorError::Failed {
            operation: "raster.crop_files".to_string(),
            code: Some(3),
            stderr: "boundary has no features\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "raster.crop_files failed with exit code 3: boundary has no features"
        );
        assert_eq!(err.error_code(), ErrorCode::EXEC_COLLABORATOR_FAILED);
    }

    #[test]
    fn test_stdin_failure_is_not_a_spawn_failure() {
        let err = CollaboratorError::Stdin(std::io::Error::other("connection reset"));
        assert_eq!(
            err.to_string(),
            "Failed to send invocation to geoprocessing program: connection reset"
        );
        assert_eq!(err.error_code(), ErrorCode::EXEC_COLLABORATOR_FAILED);
    }

    #[test]
    fn test_step_error_exit_code() {
        let err = CollaboratorError::NotFound("riskflow-geo".to_string()).into_step_error(2, "raster");
        assert_eq!(err.code(), ErrorCode::EXEC_COLLABORATOR_NOT_FOUND);
        assert_eq!(err.exit_code(), 4);
        assert!(err.user_message().starts_with("Step 2 (raster) failed"));
    }
}
