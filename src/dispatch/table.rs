use super::unsupported;
use crate::error::{ConfigFileError, Result};
use crate::geo::Call;
use crate::resolve::{Operation, ResolvedParams};
use crate::tables::{AggregateFn, FieldType, TableOperation};
use std::collections::BTreeMap;

pub(super) fn build(params: &ResolvedParams) -> Result<Call> {
    let op = match params.operation() {
        Operation::CalcField => TableOperation::CalcField {
            table_file: params.path("table_file")?,
            new_field: params.text("new_field")?,
            source_field: params.text("source_field")?,
            multiplier: params.number("multiplier")?,
            field_type: params
                .text("field_type")?
                .parse::<FieldType>()
                .map_err(|msg| ConfigFileError::invalid_value("field_type", msg))?,
        },
        Operation::AddField => TableOperation::AddField {
            table_file: params.path("table_file")?,
            new_field: params.text("new_field")?,
            value: params.text("value")?,
        },
        Operation::Choropleth => TableOperation::Choropleth {
            input_file: params.path("input_file")?,
            output_file: params.path("output_file")?,
            area_field: params.text("area_field")?,
            value_field: params.text("value_field")?,
            start_date_field: params.text("start_date_field")?,
            end_date_field: params.text("end_date_field")?,
        },
        Operation::MergeTables => TableOperation::Merge {
            first_file: params.path("first_file")?,
            second_file: params.path("second_file")?,
            output_file: params.path("output_file")?,
            first_field: params.text("first_field")?,
            second_field: params.text("second_field")?,
        },
        Operation::Aggregate => TableOperation::Aggregate {
            input_file: params.path("input_file")?,
            output_file: params.path("output_file")?,
            group_field: params.text("group_field")?,
            functions: aggregate_functions(params.mapping("functions")?)?,
            all_fields: params.bool("all_fields")?,
        },
        _ => return Err(unsupported(params)),
    };
    Ok(Call::Table(op))
}

fn aggregate_functions(raw: BTreeMap<String, String>) -> Result<BTreeMap<String, AggregateFn>> {
    raw.into_iter()
        .map(|(column, name)| {
            name.parse::<AggregateFn>()
                .map(|function| (column.clone(), function))
                .map_err(|msg| {
                    ConfigFileError::invalid_value("functions", format!("column '{column}': {msg}"))
                })
        })
        .collect()
}
