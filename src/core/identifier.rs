//! Checks and conversions for names spliced into generated C source

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{FeynmanError, Result};

static INVALID_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]+").expect("Invalid identifier character regex"));

/// Verify that `s` can be pasted into C source as an identifier without escaping.
pub fn validate_identifier(s: &str) -> Result<()> {
    let cleaned = INVALID_CHARACTERS.replace_all(s, "");
    if cleaned != s {
        return Err(FeynmanError::Validation(format!(
            "'{}' must contain only alphanumeric characters and underscores",
            s
        )));
    }

    match cleaned.chars().next() {
        None => Err(FeynmanError::Validation(
            "An identifier must contain at least one letter".to_string(),
        )),
        Some(first) if !first.is_ascii_alphabetic() => Err(FeynmanError::Validation(format!(
            "'{}' must start with a letter",
            s
        ))),
        Some(_) => Ok(()),
    }
}

/// Validate an identifier that arrives as untyped data.
///
/// Anything other than a JSON string (including null) is a type error.
pub fn validate_identifier_value(value: &Value) -> Result<&str> {
    let s = value.as_str().ok_or_else(|| {
        FeynmanError::Type(format!("Expected an identifier string, found {}", value))
    })?;
    validate_identifier(s)?;
    Ok(s)
}

/// Convert a snake_case name into PascalCase for generated type names.
///
/// Doubled underscores survive as a single literal underscore
/// (`_cern__physics_` becomes `Cern_Physics`).
pub fn to_pascal_case(s: &str) -> String {
    let trimmed = s.trim_matches('_');
    let mut segments = trimmed.split('_');
    let mut result = segments.next().unwrap_or_default().to_lowercase();

    for segment in segments {
        if segment.is_empty() {
            result.push('_');
        } else {
            result.push_str(&capitalize(segment));
        }
    }

    let mut chars = result.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character and lower-case the rest
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
