//! Data-driven resolver tests.
//!
//! Every `tests/fixtures/*.fixture` file holds PHP source, a line reading
//! `--- expect`, and then one expectation per line:
//!
//! ```text
//! /* marker */ => {"scope": "private", "type": "?int"}
//! /* other */  => error
//! /* third */  => none
//! ```
//!
//! The marker names a comment in the source; the first variable after it
//! is resolved.  A JSON object is compared key by key against the
//! serialized descriptor, so it only needs to list the fields the case is
//! about.  `error` expects a not-a-property error and `none` the
//! interface/enum outcome.

use datatest_stable::Utf8Path;
use php_member_props::{TokenKind, TokenStream, get_member_properties};

const SEPARATOR: &str = "--- expect";

fn marker_variable(stream: &TokenStream, marker: &str) -> Option<usize> {
    let comment = stream
        .iter()
        .position(|t| t.kind == TokenKind::Comment && t.text.trim() == marker)?;
    stream
        .iter()
        .skip(comment + 1)
        .find(|t| t.kind == TokenKind::Variable)
        .map(|t| t.index)
}

fn check_expectation(stream: &TokenStream, line: &str) -> Result<(), String> {
    let (marker, expected) = line
        .split_once("=>")
        .ok_or_else(|| format!("malformed expectation: {line}"))?;
    let (marker, expected) = (marker.trim(), expected.trim());
    let index = marker_variable(stream, marker)
        .ok_or_else(|| format!("{marker}: marker or variable not found"))?;
    let outcome = get_member_properties(stream, index);

    match (expected, outcome) {
        ("error", Err(e)) if e.is_not_class_property() => Ok(()),
        ("none", Ok(None)) => Ok(()),
        ("error" | "none", other) => Err(format!("{marker}: expected {expected}, got {other:?}")),
        (json, Ok(Some(descriptor))) => {
            let want: serde_json::Value =
                serde_json::from_str(json).map_err(|e| format!("{marker}: bad JSON: {e}"))?;
            let got = serde_json::to_value(&descriptor).map_err(|e| e.to_string())?;
            let fields = want
                .as_object()
                .ok_or_else(|| format!("{marker}: expectation must be a JSON object"))?;
            for (key, value) in fields {
                if got.get(key) != Some(value) {
                    return Err(format!(
                        "{marker}: field {key}: expected {value}, got {}",
                        got.get(key).unwrap_or(&serde_json::Value::Null)
                    ));
                }
            }
            Ok(())
        }
        (_, other) => Err(format!("{marker}: expected a property, got {other:?}")),
    }
}

fn run_fixture(path: &Utf8Path, contents: String) -> datatest_stable::Result<()> {
    let (source, expectations) = contents
        .split_once(SEPARATOR)
        .ok_or_else(|| format!("{path}: missing `{SEPARATOR}` line"))?;
    let stream = TokenStream::tokenize(source);

    let failures: Vec<String> = expectations
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .filter_map(|line| check_expectation(&stream, line).err())
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{path}:\n  {}", failures.join("\n  ")).into())
    }
}

datatest_stable::harness! {
    { test = run_fixture, root = "tests/fixtures", pattern = r"\.fixture$" },
}
