//! Run manifest: one scalar per line, in [`Parameter`] order.

mod parser;

use crate::common::schema::{PARAMETER_COUNT, Parameter, ParameterSet};
use crate::domain::{LweError, LweResult};
use std::fs;
use std::path::Path;

pub fn parse_manifest(source: &str) -> LweResult<ParameterSet> {
    let lines = source.lines().collect::<Vec<_>>();
    if lines.len() < PARAMETER_COUNT {
        return Err(LweError::manifest_parse(format!(
            "manifest has {} lines but {} parameters are required",
            lines.len(),
            PARAMETER_COUNT
        )));
    }

    let mut parameters = ParameterSet::default();
    for (parameter, line) in Parameter::ALL.iter().zip(&lines) {
        let value = parser::last_numeric_token(line).ok_or_else(|| {
            LweError::manifest_parse(format!(
                "line {} ({}) has no numeric value: '{}'",
                parameter.index() + 1,
                parameter,
                line.trim()
            ))
        })?;
        let value = if parameter.is_integral() {
            value.trunc()
        } else {
            value
        };
        parameters.set(*parameter, value);
    }

    Ok(parameters)
}

pub fn read_manifest(path: &Path) -> LweResult<ParameterSet> {
    let source = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LweError::missing_resource(format!("manifest '{}' does not exist", path.display()))
        } else {
            LweError::io(
                "IO.MANIFEST_READ",
                format!("failed to read manifest '{}': {}", path.display(), source),
            )
        }
    })?;
    parse_manifest(&source)
}

/// Render a manifest in schema order, one `name: value` line per parameter.
pub fn render_manifest(parameters: &ParameterSet) -> String {
    let mut rendered = String::new();
    for (parameter, value) in parameters.iter() {
        rendered.push_str(parameter.as_str());
        rendered.push_str(": ");
        rendered.push_str(&format!("{value:e}"));
        rendered.push('\n');
    }
    rendered
}
