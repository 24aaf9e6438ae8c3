use super::{parse_number, AggregateFn, Table, TableError};
use crate::resolve::value::format_number;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Copy four columns into an `area_id,value,start_date,end_date` table
pub(super) fn choropleth(
    input: &Path,
    output: &Path,
    fields: [&str; 4],
) -> Result<usize, TableError> {
    let table = Table::read(input)?;
    let columns = fields
        .iter()
        .map(|field| table.column(field, input))
        .collect::<Result<Vec<usize>, TableError>>()?;

    let result = Table {
        headers: ["area_id", "value", "start_date", "end_date"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: table
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect(),
    };
    result.write(output)?;
    Ok(result.rows.len())
}

/// Inner join on `first.1 == second.1`, keeping the first table's row order.
///
/// Shared key names collapse into one column. Other names present in both
/// tables get `_x` and `_y` suffixes.
pub(super) fn merge(
    first: (&Path, &str),
    second: (&Path, &str),
    output: &Path,
) -> Result<usize, TableError> {
    let left = Table::read(first.0)?;
    let right = Table::read(second.0)?;
    let left_key = left.column(first.1, first.0)?;
    let right_key = right.column(second.1, second.0)?;
    let same_key = first.1 == second.1;

    let right_columns: Vec<usize> = (0..right.headers.len())
        .filter(|&idx| !(same_key && idx == right_key))
        .collect();

    let mut headers: Vec<String> = left
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let clash = idx != left_key
                && right_columns.iter().any(|&r| &right.headers[r] == name);
            if clash {
                format!("{name}_x")
            } else {
                name.clone()
            }
        })
        .collect();
    headers.extend(right_columns.iter().map(|&r| {
        let name = &right.headers[r];
        let clash = left
            .headers
            .iter()
            .enumerate()
            .any(|(idx, l)| l == name && !(same_key && idx == left_key));
        if clash {
            format!("{name}_y")
        } else {
            name.clone()
        }
    }));

    let mut index: HashMap<&str, Vec<&Vec<String>>> = HashMap::new();
    for row in &right.rows {
        if let Some(key) = row.get(right_key) {
            index.entry(key.as_str()).or_default().push(row);
        }
    }

    let mut rows = Vec::new();
    for row in &left.rows {
        let Some(matches) = row.get(left_key).and_then(|key| index.get(key.as_str())) else {
            continue;
        };
        for other in matches {
            let mut joined = row.clone();
            joined.extend(
                right_columns
                    .iter()
                    .map(|&r| other.get(r).cloned().unwrap_or_default()),
            );
            rows.push(joined);
        }
    }

    let result = Table { headers, rows };
    result.write(output)?;
    Ok(result.rows.len())
}

/// Group rows by `group_field` and reduce each other column.
///
/// Columns named in `functions` use their function; with `all_fields` the
/// remaining columns keep their first value, otherwise they are dropped.
pub(super) fn aggregate(
    input: &Path,
    output: &Path,
    group_field: &str,
    functions: &BTreeMap<String, AggregateFn>,
    all_fields: bool,
) -> Result<usize, TableError> {
    let table = Table::read(input)?;
    let group = table.column(group_field, input)?;

    for column in functions.keys() {
        table.column(column, input)?;
    }

    let reduced: Vec<(usize, AggregateFn)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != group)
        .filter_map(|(idx, name)| match functions.get(name) {
            Some(function) => Some((idx, *function)),
            None if all_fields => Some((idx, AggregateFn::First)),
            None => None,
        })
        .collect();

    let mut groups: Vec<(String, Vec<&Vec<String>>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for row in &table.rows {
        let key = row.get(group).map(String::as_str).unwrap_or_default();
        match positions.get(key) {
            Some(&pos) => groups[pos].1.push(row),
            None => {
                positions.insert(key, groups.len());
                groups.push((key.to_string(), vec![row]));
            }
        }
    }
    groups.sort_by(|a, b| compare_keys(&a.0, &b.0));

    let mut headers = vec![table.headers[group].clone()];
    headers.extend(reduced.iter().map(|&(idx, _)| table.headers[idx].clone()));

    let mut rows = Vec::with_capacity(groups.len());
    for (key, members) in &groups {
        let mut row = vec![key.clone()];
        for &(idx, function) in &reduced {
            let cells: Vec<&str> = members
                .iter()
                .map(|r| r.get(idx).map(String::as_str).unwrap_or_default())
                .collect();
            row.push(reduce(&table.headers[idx], function, &cells)?);
        }
        rows.push(row);
    }

    let result = Table { headers, rows };
    result.write(output)?;
    Ok(result.rows.len())
}

/// Numeric order when both keys are numbers, text order otherwise
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn reduce(column: &str, function: AggregateFn, cells: &[&str]) -> Result<String, TableError> {
    if function == AggregateFn::First {
        return Ok(cells.first().map(|c| c.to_string()).unwrap_or_default());
    }

    let present: Vec<&str> = cells
        .iter()
        .copied()
        .filter(|c| !c.trim().is_empty())
        .collect();
    if function == AggregateFn::Count {
        return Ok(present.len().to_string());
    }

    let values = present
        .iter()
        .map(|c| parse_number(column, c))
        .collect::<Result<Vec<f64>, TableError>>()?;
    if values.is_empty() {
        return Ok(String::new());
    }

    let result = match function {
        AggregateFn::Sum => Some(values.iter().sum::<f64>()),
        AggregateFn::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        AggregateFn::Min => values.iter().copied().reduce(f64::min),
        AggregateFn::Max => values.iter().copied().reduce(f64::max),
        AggregateFn::First | AggregateFn::Count => None,
    };
    Ok(result.map(format_number).unwrap_or_default())
}
