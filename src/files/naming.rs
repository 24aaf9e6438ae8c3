//! Output filename synthesis from `{placeholder}` templates

use super::pattern::FilePattern;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NamingError {
    #[error("input '{input}' does not match pattern '{pattern}'")]
    NoMatch { input: String, pattern: String },
    #[error("output pattern '{template}' uses unknown placeholder '{{{name}}}'")]
    UnknownPlaceholder { template: String, name: String },
    #[error("output pattern '{template}' has an unterminated placeholder")]
    Unterminated { template: String },
}

/// Build an output filename for `input_name` from `output_pattern`.
///
/// Named groups of a regex `input_pattern` fill placeholders of the same
/// name. `{filename}`, `{stem}` and `{ext}` always refer to the input name.
/// `{{` and `}}` produce literal braces.
pub fn generate_output_filename(
    input_name: &str,
    input_pattern: Option<&FilePattern>,
    output_pattern: &str,
) -> Result<String, NamingError> {
    let mut fields = builtin_fields(input_name);

    if let Some(pattern @ FilePattern::Regex(_)) = input_pattern {
        if !pattern.is_match(input_name) {
            return Err(NamingError::NoMatch {
                input: input_name.to_string(),
                pattern: pattern.as_str().to_string(),
            });
        }
        fields.extend(pattern.captures(input_name));
    }

    render(output_pattern, &fields)
}

fn builtin_fields(input_name: &str) -> BTreeMap<String, String> {
    let path = Path::new(input_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    BTreeMap::from([
        ("filename".to_string(), input_name.to_string()),
        ("stem".to_string(), stem),
        ("ext".to_string(), ext),
    ])
}

fn render(template: &str, fields: &BTreeMap<String, String>) -> Result<String, NamingError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(NamingError::Unterminated {
                                template: template.to_string(),
                            })
                        }
                    }
                }
                let value = fields.get(name.trim()).ok_or_else(|| NamingError::UnknownPlaceholder {
                    template: template.to_string(),
                    name: name.clone(),
                })?;
                out.push_str(value);
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
