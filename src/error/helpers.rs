use super::{BoxError, ConfigFileError, ErrorCode};
use std::path::Path;

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to a document error attached to `path`
    fn to_document_error(self, code: u16, path: &Path, message: impl Into<String>)
        -> Result<T, ConfigFileError>;

    /// Convert to a step execution error
    fn to_step_error(
        self,
        code: u16,
        step: usize,
        process: &str,
        message: impl Into<String>,
    ) -> Result<T, ConfigFileError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn to_document_error(
        self,
        code: u16,
        path: &Path,
        message: impl Into<String>,
    ) -> Result<T, ConfigFileError> {
        self.map_err(|e| {
            ConfigFileError::document_with_code(code, message, Some(path.to_path_buf()))
                .with_source(e)
        })
    }

    fn to_step_error(
        self,
        code: u16,
        step: usize,
        process: &str,
        message: impl Into<String>,
    ) -> Result<T, ConfigFileError> {
        self.map_err(|e| ConfigFileError::step_with_code(code, step, process, message).with_source(e))
    }
}

/// Create a not found error for a job document
pub fn job_not_found(path: &Path) -> ConfigFileError {
    ConfigFileError::document_with_code(
        ErrorCode::CONFIG_NOT_FOUND,
        format!("Job document not found: {}", path.display()),
        Some(path.to_path_buf()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_extension_trait() {
        let io_result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));

        let err = io_result
            .to_document_error(ErrorCode::CONFIG_NOT_FOUND, Path::new("job.yml"), "Cannot load")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert!(err.cause().is_some());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_step_error_conversion() {
        let io_result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = io_result
            .to_step_error(ErrorCode::EXEC_FILESYSTEM, 3, "raster", "Cannot create output")
            .unwrap_err();
        assert!(matches!(err, ConfigFileError::Step { step: 3, .. }));
        assert!(err.user_message().contains("Step 3 (raster) failed"));
        assert!(err.user_message().contains("caused by: denied"));
    }

    #[test]
    fn test_job_not_found() {
        let err = job_not_found(Path::new("/nope/job.yml"));
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert!(err.to_string().starts_with("[E1001]"));
    }
}
