use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod helpers;


pub use codes::{describe_error_code, ErrorCode};
pub use helpers::ErrorExt;

/// Boxed underlying cause carried by [`ConfigFileError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type crossing the boundary to callers and loggers.
///
/// Every variant carries a human-readable message, an error code and, where
/// one exists, the underlying cause.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    /// The job or defaults document could not be read or understood
    #[error("[E{code:04}] {message}")]
    Document {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxError>,
    },

    /// A required key is absent from a step
    #[error("[E{code:04}] {message}")]
    MissingKey {
        code: u16,
        message: String,
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Neither the explicit filename nor the directory/pattern form was given
    #[error("[E{code:04}] {message}")]
    MissingFileReference {
        code: u16,
        message: String,
        explicit_key: String,
        pattern_key: String,
    },

    /// The `type` of a step is not part of its family's vocabulary
    #[error("[E{code:04}] {message}")]
    InvalidType {
        code: u16,
        message: String,
        family: String,
        type_name: String,
    },

    /// A key is present but its value cannot be used
    #[error("[E{code:04}] {message}")]
    InvalidValue {
        code: u16,
        message: String,
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Aggregate of every issue found while validating a job
    #[error("[E{code:04}] {message}")]
    Invalid {
        code: u16,
        message: String,
        issues: Vec<StepIssue>,
    },

    /// A step failed while executing
    #[error("[E{code:04}] {message}")]
    Step {
        code: u16,
        message: String,
        step: usize,
        process: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// A validation issue tied to the 1-based position of the step raising it
#[derive(Debug)]
pub struct StepIssue {
    pub step: usize,
    pub error: ConfigFileError,
}

impl Display for StepIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}: {}", self.step, self.error.message())
    }
}

impl ConfigFileError {
    /// Create a document error with default code
    pub fn document(message: impl Into<String>) -> Self {
        Self::document_with_code(ErrorCode::CONFIG_GENERIC, message, None)
    }

    /// Create a document error with specific code and path
    pub fn document_with_code(
        code: u16,
        message: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Self {
        Self::Document {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Missing required key; the cause is `None` unless attached later
    pub fn missing_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::MissingKey {
            code: ErrorCode::VALIDATION_MISSING_KEY,
            message: format!("No '{key}' specified"),
            key,
            source: None,
        }
    }

    /// Resolution failure for a FileReference or OutputSpec group
    pub fn missing_file_reference(
        label: &str,
        explicit_key: impl Into<String>,
        pattern_key: impl Into<String>,
    ) -> Self {
        let explicit_key = explicit_key.into();
        let pattern_key = pattern_key.into();
        Self::MissingFileReference {
            code: ErrorCode::VALIDATION_MISSING_FILE_REFERENCE,
            message: format!(
                "No {label} file '{explicit_key}' or pattern '{pattern_key}' specified"
            ),
            explicit_key,
            pattern_key,
        }
    }

    /// Unknown `type` value within a known family
    pub fn invalid_type(family: impl Into<String>, type_name: impl Into<String>) -> Self {
        let family = family.into();
        let type_name = type_name.into();
        Self::InvalidType {
            code: ErrorCode::VALIDATION_INVALID_TYPE,
            message: format!("Unknown {family} process type '{type_name}'"),
            family,
            type_name,
        }
    }

    /// Present but unusable value
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            code: ErrorCode::VALIDATION_INVALID_VALUE,
            message: message.into(),
            key: key.into(),
            source: None,
        }
    }

    /// Aggregate validation failure
    pub fn invalid(issues: Vec<StepIssue>) -> Self {
        let mut message = format!("Job validation failed with {} issue(s)", issues.len());
        for issue in &issues {
            message.push_str(&format!("\n  - {issue}"));
        }
        Self::Invalid {
            code: ErrorCode::VALIDATION_FAILED,
            message,
            issues,
        }
    }

    /// Failure while executing a step
    pub fn step(step: usize, process: impl Into<String>, message: impl Into<String>) -> Self {
        Self::step_with_code(ErrorCode::EXEC_GENERIC, step, process, message)
    }

    /// Failure while executing a step, with a specific code
    pub fn step_with_code(
        code: u16,
        step: usize,
        process: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Step {
            code,
            message: message.into(),
            step,
            process: process.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    ///
    /// Variants without a cause slot keep their content unchanged.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::Document { source: src, .. }
            | Self::MissingKey { source: src, .. }
            | Self::InvalidValue { source: src, .. }
            | Self::Step { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::MissingFileReference { .. } | Self::InvalidType { .. } | Self::Invalid { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        let message = self.message_mut();
        *message = format!("{}: {}", message, context);
        self
    }

    fn message_mut(&mut self) -> &mut String {
        match self {
            Self::Document { message, .. }
            | Self::MissingKey { message, .. }
            | Self::MissingFileReference { message, .. }
            | Self::InvalidType { message, .. }
            | Self::InvalidValue { message, .. }
            | Self::Invalid { message, .. }
            | Self::Step { message, .. } => message,
        }
    }

    /// The human-readable message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Document { message, .. }
            | Self::MissingKey { message, .. }
            | Self::MissingFileReference { message, .. }
            | Self::InvalidType { message, .. }
            | Self::InvalidValue { message, .. }
            | Self::Invalid { message, .. }
            | Self::Step { message, .. } => message,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Document { code, .. }
            | Self::MissingKey { code, .. }
            | Self::MissingFileReference { code, .. }
            | Self::InvalidType { code, .. }
            | Self::InvalidValue { code, .. }
            | Self::Invalid { code, .. }
            | Self::Step { code, .. } => *code,
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Document { .. } => 2,
            Self::MissingKey { .. }
            | Self::MissingFileReference { .. }
            | Self::InvalidType { .. }
            | Self::InvalidValue { .. }
            | Self::Invalid { .. } => 3,
            Self::Step { .. } => 4,
        }
    }

    /// The offending key, for errors tied to a single key
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingKey { key, .. } | Self::InvalidValue { key, .. } => Some(key),
            Self::MissingFileReference { explicit_key, .. } => Some(explicit_key),
            _ => None,
        }
    }

    /// The underlying cause, if any
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Document { source, .. }
            | Self::MissingKey { source, .. }
            | Self::InvalidValue { source, .. }
            | Self::Step { source, .. } => source.as_deref(),
            _ => None,
        }
    }

    /// True for a FileReference/OutputSpec group with neither form present
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::MissingFileReference { .. })
    }

    /// Validation issues carried by an aggregate error
    pub fn issues(&self) -> &[StepIssue] {
        match self {
            Self::Invalid { issues, .. } => issues,
            _ => &[],
        }
    }

    /// Get a user-friendly error message including the cause chain
    pub fn user_message(&self) -> String {
        let mut msg = match self {
            Self::Step { step, process, message, .. } => {
                format!("Step {step} ({process}) failed: {message}")
            }
            Self::Document {
                message,
                path: Some(path),
                ..
            } => format!("{}: {}", path.display(), message),
            other => other.message().to_string(),
        };
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            msg.push_str(&format!("\n  caused by: {err}"));
            cause = err.source();
        }
        msg
    }
}

/// Type alias for Results using ConfigFileError
pub type Result<T> = std::result::Result<T, ConfigFileError>;

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigFileError::document_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax", None)
            .with_source(err)
    }
}

impl From<toml::de::Error> for ConfigFileError {
    fn from(err: toml::de::Error) -> Self {
        ConfigFileError::document_with_code(
            ErrorCode::CONFIG_INVALID_DEFAULTS,
            "Invalid defaults file",
            None,
        )
        .with_source(err)
    }
}
