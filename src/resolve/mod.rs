//! Parameter resolution.
//!
//! Each step key is looked up through three primitives:
//!
//! - [`resolve_file_group`] picks the explicit or directory/pattern form of a
//!   file reference
//! - [`resolve_optional`] returns the step's value or a default
//! - [`resolve_required`] returns the step's value or fails naming the key
//!
//! plus [`resolve_flag`] for presence flags. [`resolve`] and [`resolve_all`]
//! drive the primitives from the static key table in [`table`].

pub mod params;
pub mod schema;
pub mod table;
pub mod value;

pub use params::{Resolved, ResolvedParams};
pub use schema::{Family, FileGroup, Operation, OperationSchema, ParamSpec, ValueKind};
pub use value::ParamValue;

use crate::config::{Defaults, Step};
use crate::error::{ConfigFileError, Result};
use crate::files::{FilePattern, FileReference, OutputSpec};
use chrono::NaiveDate;
use serde_yaml::Value;
use std::path::PathBuf;
use tracing::debug;

/// A key's value when present and not null
fn present<'a>(step: &'a Step, key: &str) -> Option<&'a Value> {
    step.get(key).filter(|v| !v.is_null())
}

/// Pick the explicit or pattern form of a file reference.
///
/// The explicit key wins when both forms are given. With only the pattern
/// form, the directory is whatever the step says, possibly nothing.
pub fn resolve_file_group(
    step: &Step,
    explicit_key: &str,
    dir_key: &str,
    pattern_key: &str,
) -> Result<FileReference> {
    if let Some(file) = present(step, explicit_key) {
        return Ok(FileReference::Explicit(PathBuf::from(scalar_text(
            explicit_key,
            file,
        )?)));
    }
    if let Some(pattern) = present(step, pattern_key) {
        let dir = present(step, dir_key)
            .map(|dir| scalar_text(dir_key, dir).map(PathBuf::from))
            .transpose()?;
        return Ok(FileReference::Pattern {
            dir,
            pattern: scalar_text(pattern_key, pattern)?,
        });
    }
    let label = explicit_key.strip_suffix("_file").unwrap_or(explicit_key);
    Err(ConfigFileError::missing_file_reference(
        label,
        explicit_key,
        pattern_key,
    ))
}

/// The step's value for `key`, or `default` when absent
pub fn resolve_optional(step: &Step, key: &str, default: Option<ParamValue>) -> Option<ParamValue> {
    present(step, key).map(ParamValue::from).or(default)
}

/// The step's value for `key`; fails naming the key when absent
pub fn resolve_required<'a>(step: &'a Step, key: &str) -> Result<&'a Value> {
    present(step, key).ok_or_else(|| ConfigFileError::missing_key(key))
}

/// Presence of `key`, whatever its value. `overwrite: false` is present.
pub fn resolve_flag(step: &Step, key: &str) -> Option<()> {
    step.contains(key).then_some(())
}

/// Resolve every key of `schema`, stopping at the first problem
pub fn resolve(
    step: &Step,
    schema: &'static OperationSchema,
    defaults: &Defaults,
) -> Result<ResolvedParams> {
    resolve_all(step, schema, defaults).map_err(|mut issues| issues.remove(0))
}

/// Resolve every key of `schema`, collecting every problem.
///
/// The error vector is never empty.
pub fn resolve_all(
    step: &Step,
    schema: &'static OperationSchema,
    defaults: &Defaults,
) -> std::result::Result<ResolvedParams, Vec<ConfigFileError>> {
    let mut params = ResolvedParams::new(schema);
    let mut issues = Vec::new();

    for spec in schema.params {
        match resolve_spec(step, spec, defaults) {
            Ok(resolved) => params.insert(spec.name(), resolved),
            Err(err) => issues.push(err),
        }
    }

    if issues.is_empty() {
        debug!(
            "Resolved step {} as {} ({} keys)",
            step.position(),
            schema.title(),
            schema.params.len()
        );
        Ok(params)
    } else {
        Err(issues)
    }
}

fn resolve_spec(step: &Step, spec: &ParamSpec, defaults: &Defaults) -> Result<Resolved> {
    match spec {
        ParamSpec::Required(key, kind) => {
            let value = ParamValue::from(resolve_required(step, key)?);
            check_kind(key, kind, value).map(Resolved::Value)
        }
        ParamSpec::Optional(key, kind, fallback) => {
            match resolve_optional(step, key, None) {
                Some(value) => check_kind(key, kind, value).map(Resolved::Value),
                None => Ok(fallback
                    .value(defaults)
                    .map_or(Resolved::Absent, Resolved::Value)),
            }
        }
        ParamSpec::Flag(key) => Ok(Resolved::Flag(resolve_flag(step, key))),
        ParamSpec::Input(group) => {
            let reference = resolve_group(step, group)?;
            if let FileReference::Pattern { pattern, .. } = &reference {
                FilePattern::parse(pattern).map_err(|e| {
                    ConfigFileError::invalid_value(group.pattern, format!("Invalid '{}'", group.pattern))
                        .with_source(e)
                })?;
            }
            Ok(Resolved::Input(reference))
        }
        ParamSpec::Output(group) => {
            let reference = resolve_group(step, group)?;
            Ok(Resolved::Output(OutputSpec::from(reference)))
        }
    }
}

fn resolve_group(step: &Step, group: &FileGroup) -> Result<FileReference> {
    let reference = resolve_file_group(step, group.file, group.dir, group.pattern)?;

    if group.dir_required {
        if let FileReference::Pattern { dir: None, .. } = reference {
            return Err(ConfigFileError::missing_key(group.dir));
        }
    }
    Ok(reference)
}

impl From<FileReference> for OutputSpec {
    fn from(reference: FileReference) -> Self {
        match reference {
            FileReference::Explicit(file) => OutputSpec::Explicit(file),
            FileReference::Pattern { dir, pattern } => OutputSpec::Pattern { dir, pattern },
        }
    }
}

fn scalar_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(_) => Ok(ParamValue::from(value).to_text().unwrap_or_default()),
        other => Err(ConfigFileError::invalid_value(
            key,
            format!(
                "'{key}' must be a string, found {}",
                ParamValue::from(other).kind_name()
            ),
        )),
    }
}

/// Check and normalize a value against its declared kind
pub fn check_kind(key: &str, kind: &ValueKind, value: ParamValue) -> Result<ParamValue> {
    let mismatch = |value: &ParamValue| {
        ConfigFileError::invalid_value(
            key,
            format!(
                "'{key}' must be {}, found {}",
                kind.describe(),
                value.kind_name()
            ),
        )
    };

    match kind {
        ValueKind::Text | ValueKind::Path => match &value {
            ParamValue::String(_) | ParamValue::Number(_) => {
                Ok(ParamValue::String(value.to_text().unwrap_or_default()))
            }
            other => Err(mismatch(other)),
        },
        ValueKind::Number => value
            .to_number()
            .map(ParamValue::Number)
            .ok_or_else(|| mismatch(&value)),
        ValueKind::Integer => value
            .to_number()
            .filter(|n| n.fract() == 0.0)
            .map(ParamValue::Number)
            .ok_or_else(|| mismatch(&value)),
        ValueKind::Bool => match value {
            ParamValue::Boolean(_) => Ok(value),
            other => Err(mismatch(&other)),
        },
        ValueKind::TextList => value
            .to_text_list()
            .map(ParamValue::from)
            .ok_or_else(|| mismatch(&value)),
        ValueKind::Date => {
            let text = value.to_text().ok_or_else(|| mismatch(&value))?;
            check_date(key, &text)?;
            Ok(ParamValue::String(text))
        }
        ValueKind::DateList => {
            let dates = value.to_text_list().ok_or_else(|| mismatch(&value))?;
            for date in &dates {
                check_date(key, date)?;
            }
            Ok(ParamValue::from(dates))
        }
        ValueKind::Pattern => {
            let text = value.to_text().ok_or_else(|| mismatch(&value))?;
            FilePattern::parse(&text).map_err(|e| {
                ConfigFileError::invalid_value(key, format!("Invalid '{key}'")).with_source(e)
            })?;
            Ok(ParamValue::String(text))
        }
        ValueKind::Mapping => match &value {
            ParamValue::Object(map) if map.values().all(|v| v.to_text().is_some()) => Ok(value),
            other => Err(mismatch(other)),
        },
        ValueKind::Choice(options) => {
            let text = value.to_text().ok_or_else(|| mismatch(&value))?;
            if options.contains(&text.as_str()) {
                Ok(ParamValue::String(text))
            } else {
                Err(ConfigFileError::invalid_value(
                    key,
                    format!(
                        "Unsupported {key} '{text}'; expected one of {}",
                        options.join(", ")
                    ),
                ))
            }
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM` and `YYYY`
pub fn check_date(key: &str, text: &str) -> Result<()> {
    let text = text.trim();
    let valid = match text.len() {
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").is_ok(),
        4 => text.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigFileError::invalid_value(
            key,
            format!("'{key}' has invalid date '{text}'; expected YYYY-MM-DD, YYYY-MM or YYYY"),
        ))
    }
}

#[cfg(test)]
mod tests;
