//! Native CSV table operations

mod fields;
mod join;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// How `calc_field` writes computed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    /// Truncated to an integer
    Long,
    Double,
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LONG" | "SHORT" => Ok(FieldType::Long),
            "DOUBLE" | "FLOAT" => Ok(FieldType::Double),
            other => Err(format!("unsupported field type '{other}'")),
        }
    }
}

/// Per-column reduction used by `aggregate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    First,
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

impl FromStr for AggregateFn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(AggregateFn::First),
            "sum" => Ok(AggregateFn::Sum),
            "mean" | "avg" | "average" => Ok(AggregateFn::Mean),
            "min" => Ok(AggregateFn::Min),
            "max" => Ok(AggregateFn::Max),
            "count" => Ok(AggregateFn::Count),
            other => Err(format!(
                "unsupported aggregate function '{other}'; expected first, sum, mean, min, max or count"
            )),
        }
    }
}

/// A table operation with every parameter resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "function")]
pub enum TableOperation {
    CalcField {
        table_file: PathBuf,
        new_field: String,
        source_field: String,
        multiplier: f64,
        field_type: FieldType,
    },
    AddField {
        table_file: PathBuf,
        new_field: String,
        value: String,
    },
    Choropleth {
        input_file: PathBuf,
        output_file: PathBuf,
        area_field: String,
        value_field: String,
        start_date_field: String,
        end_date_field: String,
    },
    Merge {
        first_file: PathBuf,
        second_file: PathBuf,
        output_file: PathBuf,
        first_field: String,
        second_field: String,
    },
    Aggregate {
        input_file: PathBuf,
        output_file: PathBuf,
        group_field: String,
        functions: BTreeMap<String, AggregateFn>,
        all_fields: bool,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to access {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("column '{column}' not found in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },
    #[error("value '{value}' in column '{column}' is not a number")]
    NotANumber { column: String, value: String },
}

/// What an operation did
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub output: PathBuf,
    /// Data rows written; `None` when the file was left untouched
    pub rows: Option<usize>,
}

impl TableOperation {
    /// Collaborator-style function name
    pub fn function(&self) -> &'static str {
        match self {
            TableOperation::CalcField { .. } => "calc_field",
            TableOperation::AddField { .. } => "add_field",
            TableOperation::Choropleth { .. } => "calc_choropleth",
            TableOperation::Merge { .. } => "merge_files",
            TableOperation::Aggregate { .. } => "aggregate_rows",
        }
    }

    /// File the operation writes
    pub fn output_path(&self) -> &Path {
        match self {
            TableOperation::CalcField { table_file, .. }
            | TableOperation::AddField { table_file, .. } => table_file,
            TableOperation::Choropleth { output_file, .. }
            | TableOperation::Merge { output_file, .. }
            | TableOperation::Aggregate { output_file, .. } => output_file,
        }
    }

    /// Files the operation reads
    pub fn input_paths(&self) -> Vec<&Path> {
        match self {
            TableOperation::CalcField { table_file, .. }
            | TableOperation::AddField { table_file, .. } => vec![table_file],
            TableOperation::Choropleth { input_file, .. }
            | TableOperation::Aggregate { input_file, .. } => vec![input_file],
            TableOperation::Merge {
                first_file,
                second_file,
                ..
            } => vec![first_file, second_file],
        }
    }

    pub fn apply(&self) -> Result<TableSummary, TableError> {
        let rows = match self {
            TableOperation::CalcField {
                table_file,
                new_field,
                source_field,
                multiplier,
                field_type,
            } => fields::calc_field(table_file, new_field, source_field, *multiplier, *field_type)?,
            TableOperation::AddField {
                table_file,
                new_field,
                value,
            } => fields::add_field(table_file, new_field, value)?,
            TableOperation::Choropleth {
                input_file,
                output_file,
                area_field,
                value_field,
                start_date_field,
                end_date_field,
            } => Some(join::choropleth(
                input_file,
                output_file,
                [area_field, value_field, start_date_field, end_date_field],
            )?),
            TableOperation::Merge {
                first_file,
                second_file,
                output_file,
                first_field,
                second_field,
            } => Some(join::merge(
                (first_file, first_field),
                (second_file, second_field),
                output_file,
            )?),
            TableOperation::Aggregate {
                input_file,
                output_file,
                group_field,
                functions,
                all_fields,
            } => Some(join::aggregate(
                input_file,
                output_file,
                group_field,
                functions,
                *all_fields,
            )?),
        };

        let summary = TableSummary {
            output: self.output_path().to_path_buf(),
            rows,
        };
        if let Some(rows) = summary.rows {
            info!("{}: wrote {} row(s) to {}", self.function(), rows, summary.output.display());
        }
        Ok(summary)
    }
}

impl fmt::Display for TableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.function(), self.output_path().display())
    }
}

/// An in-memory CSV table
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let csv_err = |source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        let headers = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()
            .map_err(csv_err)?;
        Ok(Self { headers, rows })
    }

    pub fn write(&self, path: &Path) -> Result<(), TableError> {
        let csv_err = |source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        writer.write_record(&self.headers).map_err(csv_err)?;
        for row in &self.rows {
            writer.write_record(row).map_err(csv_err)?;
        }
        writer
            .flush()
            .map_err(|e| csv_err(csv::Error::from(e)))?;
        Ok(())
    }

    pub fn column(&self, name: &str, path: &Path) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| missing_column(name, path))
    }

    pub fn column_ignore_case(&self, name: &str, path: &Path) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| missing_column(name, path))
    }
}

fn missing_column(name: &str, path: &Path) -> TableError {
    TableError::MissingColumn {
        column: name.to_string(),
        path: path.to_path_buf(),
    }
}

pub(crate) fn parse_number(column: &str, value: &str) -> Result<f64, TableError> {
    value.trim().parse().map_err(|_| TableError::NotANumber {
        column: column.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests;
