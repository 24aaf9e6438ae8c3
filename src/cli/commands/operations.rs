//! `riskflow operations`: the key table in readable form

use crate::resolve::schema::{Fallback, FileGroup, ParamSpec};
use crate::resolve::table::OPERATIONS;
use crate::resolve::value::format_number;
use crate::resolve::{Family, OperationSchema};
use anyhow::{anyhow, Result};
use std::fmt::Write;

pub fn run_operations_command(family: Option<&str>) -> Result<()> {
    let family = family
        .map(|name| {
            Family::from_process(name).ok_or_else(|| {
                let known: Vec<&str> = Family::ALL.iter().map(Family::name).collect();
                anyhow!("Unknown family '{name}'; expected one of {}", known.join(", "))
            })
        })
        .transpose()?;
    println!("{}", render_operations(family));
    Ok(())
}

/// Every operation of `family` (all when `None`), separated by blank lines
pub fn render_operations(family: Option<Family>) -> String {
    OPERATIONS
        .iter()
        .filter(|schema| family.map_or(true, |f| schema.family == f))
        .map(render_schema)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_schema(schema: &OperationSchema) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", schema.title());
    let _ = writeln!(out, "  {}", schema.summary);

    let required = schema.required_keys();
    if !required.is_empty() {
        let _ = writeln!(out, "  required: {}", required.join(", "));
    }
    for (group, is_output) in schema.groups() {
        let label = if is_output { "output:  " } else { "files:   " };
        let _ = writeln!(out, "  {label} {}", render_group(group));
    }

    let optional: Vec<String> = schema
        .params
        .iter()
        .filter_map(|spec| match spec {
            ParamSpec::Optional(key, _, fallback) => Some(match render_fallback(fallback) {
                Some(default) => format!("{key} (default: {default})"),
                None => key.to_string(),
            }),
            _ => None,
        })
        .collect();
    if !optional.is_empty() {
        let _ = writeln!(out, "  optional: {}", optional.join(", "));
    }

    let flags = schema.flags();
    if !flags.is_empty() {
        let _ = writeln!(out, "  flags:    {}", flags.join(", "));
    }
    out
}

fn render_group(group: &FileGroup) -> String {
    let pattern_form = format!("{} + {}", group.dir, group.pattern);
    let pattern_form = if group.dir_required {
        pattern_form
    } else {
        format!("[{}] + {}", group.dir, group.pattern)
    };
    format!("{} | {pattern_form}", group.file)
}

fn render_fallback(fallback: &Fallback) -> Option<String> {
    match fallback {
        Fallback::None => None,
        Fallback::Text(text) => Some(text.to_string()),
        Fallback::Number(n) => Some(format_number(*n)),
        Fallback::Bool(b) => Some(b.to_string()),
        Fallback::EmptyMapping => Some("{}".to_string()),
        Fallback::Registry(key) => Some(format!("registry {}", key.describe())),
    }
}
