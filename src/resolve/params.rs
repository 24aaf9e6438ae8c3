use super::schema::{Operation, OperationSchema};
use super::value::ParamValue;
use crate::error::{ConfigFileError, Result};
use crate::files::{FileReference, OutputSpec};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of resolving one [`ParamSpec`](super::schema::ParamSpec)
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Value(ParamValue),
    Absent,
    Flag(Option<()>),
    Input(FileReference),
    Output(OutputSpec),
}

/// Every key of an operation after lookup, defaults and kind checks
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    schema: &'static OperationSchema,
    values: BTreeMap<&'static str, Resolved>,
}

impl ResolvedParams {
    pub(super) fn new(schema: &'static OperationSchema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub(super) fn insert(&mut self, name: &'static str, value: Resolved) {
        self.values.insert(name, value);
    }

    pub fn schema(&self) -> &'static OperationSchema {
        self.schema
    }

    pub fn operation(&self) -> Operation {
        self.schema.operation
    }

    /// Raw resolved entry
    pub fn get(&self, name: &str) -> Option<&Resolved> {
        self.values.get(name)
    }

    fn entry(&self, name: &str) -> Result<&Resolved> {
        self.values.get(name).ok_or_else(|| {
            ConfigFileError::invalid_value(
                name,
                format!("'{name}' is not declared for {}", self.schema.title()),
            )
        })
    }

    fn value(&self, name: &str) -> Result<Option<&ParamValue>> {
        match self.entry(name)? {
            Resolved::Value(value) => Ok(Some(value)),
            Resolved::Absent => Ok(None),
            _ => Err(self.wrong_kind(name, "a value")),
        }
    }

    fn wrong_kind(&self, name: &str, expected: &str) -> ConfigFileError {
        ConfigFileError::invalid_value(
            name,
            format!("'{name}' is not {expected} in {}", self.schema.title()),
        )
    }

    fn convert<T>(
        &self,
        name: &str,
        expected: &str,
        f: impl Fn(&ParamValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.value(name)? {
            Some(value) => f(value).map(Some).ok_or_else(|| self.wrong_kind(name, expected)),
            None => Ok(None),
        }
    }

    fn required<T>(&self, name: &str, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| ConfigFileError::missing_key(name))
    }

    pub fn opt_text(&self, name: &str) -> Result<Option<String>> {
        self.convert(name, "text", ParamValue::to_text)
    }

    pub fn text(&self, name: &str) -> Result<String> {
        self.required(name, self.opt_text(name)?)
    }

    pub fn opt_path(&self, name: &str) -> Result<Option<PathBuf>> {
        Ok(self.opt_text(name)?.map(PathBuf::from))
    }

    pub fn path(&self, name: &str) -> Result<PathBuf> {
        self.required(name, self.opt_path(name)?)
    }

    pub fn opt_number(&self, name: &str) -> Result<Option<f64>> {
        self.convert(name, "a number", ParamValue::to_number)
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        self.required(name, self.opt_number(name)?)
    }

    pub fn opt_integer(&self, name: &str) -> Result<Option<i64>> {
        self.convert(name, "an integer", |v| {
            v.to_number().filter(|n| n.fract() == 0.0).map(|n| n as i64)
        })
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        let value = self.convert(name, "a boolean", ParamValue::as_bool)?;
        self.required(name, value)
    }

    pub fn opt_text_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        self.convert(name, "a list", ParamValue::to_text_list)
    }

    pub fn text_list(&self, name: &str) -> Result<Vec<String>> {
        self.required(name, self.opt_text_list(name)?)
    }

    pub fn mapping(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let value = self.convert(name, "a mapping", |v| {
            v.as_object()?
                .iter()
                .map(|(k, v)| v.to_text().map(|text| (k.clone(), text)))
                .collect::<Option<BTreeMap<String, String>>>()
        })?;
        self.required(name, value)
    }

    /// Presence of a flag key
    pub fn presence(&self, name: &str) -> Result<Option<()>> {
        match self.entry(name)? {
            Resolved::Flag(present) => Ok(*present),
            _ => Err(self.wrong_kind(name, "a flag")),
        }
    }

    /// Presence of a flag key as the boolean passed to collaborators
    pub fn flag(&self, name: &str) -> Result<bool> {
        Ok(self.presence(name)?.is_some())
    }

    pub fn input(&self, label: &str) -> Result<FileReference> {
        match self.entry(label)? {
            Resolved::Input(reference) => Ok(reference.clone()),
            _ => Err(self.wrong_kind(label, "an input file group")),
        }
    }

    pub fn output(&self, label: &str) -> Result<OutputSpec> {
        match self.entry(label)? {
            Resolved::Output(spec) => Ok(spec.clone()),
            _ => Err(self.wrong_kind(label, "an output group")),
        }
    }
}
