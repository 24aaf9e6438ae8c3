use super::{parse_number, FieldType, Table, TableError};
use std::path::Path;
use tracing::{debug, warn};

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Append `new_field` = `source_field` * `multiplier`; returns rows written
pub(super) fn calc_field(
    path: &Path,
    new_field: &str,
    source_field: &str,
    multiplier: f64,
    field_type: FieldType,
) -> Result<Option<usize>, TableError> {
    if !is_csv(path) {
        warn!("calc_field only edits CSV tables; {} left untouched", path.display());
        return Ok(None);
    }

    let mut table = Table::read(path)?;
    let source = table.column_ignore_case(source_field, path)?;
    debug!("calc_field: {new_field} = {source_field} * {multiplier} ({field_type:?})");

    table.headers.push(new_field.to_string());
    for row in &mut table.rows {
        let cell = row.get(source).map(|c| c.trim().to_string()).unwrap_or_default();
        let computed = if cell.is_empty() {
            String::new()
        } else {
            let value = parse_number(source_field, &cell)? * multiplier;
            match field_type {
                FieldType::Long => format!("{}", value.trunc() as i64),
                FieldType::Double => format!("{value:?}"),
            }
        };
        row.push(computed);
    }

    table.write(path)?;
    Ok(Some(table.rows.len()))
}

/// Append a constant column
pub(super) fn add_field(path: &Path, new_field: &str, value: &str) -> Result<Option<usize>, TableError> {
    if !is_csv(path) {
        warn!("add_field only edits CSV tables; {} left untouched", path.display());
        return Ok(None);
    }

    let mut table = Table::read(path)?;
    table.headers.push(new_field.to_string());
    for row in &mut table.rows {
        row.push(value.to_string());
    }
    table.write(path)?;
    Ok(Some(table.rows.len()))
}
