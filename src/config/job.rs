//! Job documents and their steps

use crate::error::{ConfigFileError, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// What the router does when a step fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StepErrorPolicy {
    /// Stop at the first failing step; later steps are never attempted
    #[default]
    Abort,
    /// Record the failure and continue with the next step
    Skip,
}

/// A loaded job document
#[derive(Debug, Clone)]
pub struct Job {
    /// Steps in document order, which is also their dependency order
    pub steps: Vec<Step>,
    /// Error policy requested by the document
    pub on_step_error: StepErrorPolicy,
    /// Where the document was read from
    pub source: Option<PathBuf>,
}

/// One declared unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    position: usize,
    process: String,
    params: Mapping,
}

impl Job {
    /// Parse a job document
    ///
    /// A document without a `run` key is rejected; `run: []` and `run: null`
    /// are empty jobs.
    pub fn from_yaml_str(content: &str, source: Option<&Path>) -> Result<Self> {
        let with_path = |err: ConfigFileError| match (err, source) {
            (ConfigFileError::Document { code, message, source: cause, .. }, Some(path)) => {
                ConfigFileError::Document {
                    code,
                    message,
                    path: Some(path.to_path_buf()),
                    source: cause,
                }
            }
            (err, _) => err,
        };

        let root: Value = serde_yaml::from_str(content).map_err(|e| with_path(e.into()))?;
        let root = match root {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(with_path(ConfigFileError::document_with_code(
                    ErrorCode::CONFIG_INVALID_YAML,
                    format!("Job document must be a mapping, found {}", yaml_kind(&other)),
                    None,
                )))
            }
        };

        let steps = match root.get("run") {
            None => {
                return Err(with_path(ConfigFileError::document_with_code(
                    ErrorCode::CONFIG_MISSING_RUN,
                    "No 'run' sequence in job document",
                    None,
                )))
            }
            Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| Step::from_value(idx + 1, item))
                .collect::<Result<Vec<_>>>()
                .map_err(with_path)?,
            Some(other) => {
                return Err(with_path(ConfigFileError::document_with_code(
                    ErrorCode::CONFIG_MISSING_RUN,
                    format!("'run' must be a sequence of steps, found {}", yaml_kind(other)),
                    None,
                )))
            }
        };

        let on_step_error = match root.get("on_step_error") {
            None | Some(Value::Null) => StepErrorPolicy::default(),
            Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| {
                with_path(
                    ConfigFileError::document_with_code(
                        ErrorCode::CONFIG_GENERIC,
                        "'on_step_error' must be 'abort' or 'skip'",
                        None,
                    )
                    .with_source(e),
                )
            })?,
        };

        Ok(Self {
            steps,
            on_step_error,
            source: source.map(Path::to_path_buf),
        })
    }

    /// Number of declared steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the job declares no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Step {
    /// Build a step from its YAML node; `position` is 1-based
    pub fn from_value(position: usize, value: &Value) -> Result<Self> {
        let params = match value {
            Value::Mapping(map) => map.clone(),
            other => {
                return Err(ConfigFileError::document_with_code(
                    ErrorCode::CONFIG_INVALID_STEP,
                    format!("Step {position} must be a mapping, found {}", yaml_kind(other)),
                    None,
                ))
            }
        };

        let process = match params.get("process") {
            Some(Value::String(process)) => process.clone(),
            Some(other) => {
                return Err(ConfigFileError::document_with_code(
                    ErrorCode::CONFIG_INVALID_STEP,
                    format!(
                        "Step {position} has a non-string 'process' ({})",
                        yaml_kind(other)
                    ),
                    None,
                ))
            }
            None => {
                return Err(ConfigFileError::document_with_code(
                    ErrorCode::CONFIG_INVALID_STEP,
                    format!("Step {position} has no 'process' specified"),
                    None,
                ))
            }
        };

        Ok(Self {
            position,
            process,
            params,
        })
    }

    /// Parse a single step from YAML text
    pub fn from_yaml_str(position: usize, content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(position, &value)
    }

    /// 1-based position of the step in the job
    pub fn position(&self) -> usize {
        self.position
    }

    /// The `process` discriminator as written
    pub fn process(&self) -> &str {
        &self.process
    }

    /// The `type` sub-discriminator, when present as a string
    pub fn type_name(&self) -> Option<&str> {
        self.params.get("type").and_then(Value::as_str)
    }

    /// Raw value of a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Whether the key is present at all, whatever its value
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Every string key of the step
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().filter_map(Value::as_str)
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
