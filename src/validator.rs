//! Structured validation issues.
//!
//! Every schema failure (declaration time or request time) is reported as a list of
//! [`ValidationIssue`]s. Each issue carries a stable `code`, a human readable `message`,
//! the offending value and a JSON path rooted at `$` (for example `$.path.petId` or
//! `$.query.tag[1]`).

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single schema validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub data: Value,
    pub path: String,
}

impl ValidationIssue {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        data: Value,
        path: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            code: code.into(),
            message: message.into(),
            data,
            path: path.into(),
        }
    }

    /// Convert an error reported by the JSON Schema engine.
    pub fn from_error(error: &ValidationError<'_>) -> Self {
        let data = error.instance.clone().into_owned();
        let mut path = json_path(&error.instance_path.to_string());

        let (code, message) = match &error.kind {
            ValidationErrorKind::Type { kind } => {
                let expected = match kind {
                    TypeKind::Single(ty) => ty.to_string(),
                    TypeKind::Multiple(_) => return Self::fallback("VALIDATION_INVALID_TYPE", error, data, path),
                };
                (
                    "VALIDATION_INVALID_TYPE",
                    format!("Invalid type: {} should be {}", type_name(&data), expected),
                )
            }
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                path = format!("{}{}", path, segment(&name));
                (
                    "OBJECT_REQUIRED",
                    format!("Missing required property: {}", name),
                )
            }
            ValidationErrorKind::Enum { .. } => {
                ("ENUM_MISMATCH", format!("No enum match for: {}", data))
            }
            ValidationErrorKind::Minimum { .. } | ValidationErrorKind::ExclusiveMinimum { .. } => {
                ("NUMBER_MINIMUM", error.to_string())
            }
            ValidationErrorKind::Maximum { .. } | ValidationErrorKind::ExclusiveMaximum { .. } => {
                ("NUMBER_MAXIMUM", error.to_string())
            }
            ValidationErrorKind::MinLength { .. } => ("STRING_LENGTH_SHORT", error.to_string()),
            ValidationErrorKind::MaxLength { .. } => ("STRING_LENGTH_LONG", error.to_string()),
            ValidationErrorKind::Pattern { .. } => ("STRING_PATTERN", error.to_string()),
            ValidationErrorKind::MinItems { .. } => ("ARRAY_LENGTH_SHORT", error.to_string()),
            ValidationErrorKind::MaxItems { .. } => ("ARRAY_LENGTH_LONG", error.to_string()),
            ValidationErrorKind::UniqueItems => ("ARRAY_UNIQUE", error.to_string()),
            ValidationErrorKind::AdditionalProperties { .. } => {
                ("OBJECT_ADDITIONAL_PROPERTIES", error.to_string())
            }
            ValidationErrorKind::Format { .. } => ("FORMAT_INVALID", error.to_string()),
            _ => ("SCHEMA_INVALID", error.to_string()),
        };

        ValidationIssue::new(code, message, data, path)
    }

    fn fallback(code: &str, error: &ValidationError<'_>, data: Value, path: String) -> Self {
        ValidationIssue::new(code, error.to_string(), data, path)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Ordered list of issues produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Print issues to stderr in the same layout the CLI uses for declaration errors.
pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!("\nDeclaration validation failed. {} issue(s) found:\n", issues.len());
    for issue in issues {
        eprintln!("{}", issue);
    }
    eprintln!();
}

/// Rewrite a JSON pointer (`/query/tag/1`) as a `$`-rooted path (`$.query.tag[1]`).
pub(crate) fn json_path(pointer: &str) -> String {
    let mut out = String::from("$");
    for raw in pointer.split('/').skip(1) {
        let chunk = raw.replace("~1", "/").replace("~0", "~");
        if !chunk.is_empty() && chunk.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(&chunk);
            out.push(']');
        } else {
            out.push_str(&segment(&chunk));
        }
    }
    out
}

fn segment(name: &str) -> String {
    format!(".{}", name)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_path_properties_and_indices() {
        assert_eq!(json_path(""), "$");
        assert_eq!(json_path("/path/petId"), "$.path.petId");
        assert_eq!(json_path("/query/tag/1"), "$.query.tag[1]");
        assert_eq!(json_path("/header/a~1b"), "$.header.a/b");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!(1)), "integer");
        assert_eq!(type_name(&json!(1.5)), "number");
        assert_eq!(type_name(&json!("x")), "string");
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new("ENUM_MISMATCH", "No enum match for: \"x\"", json!("x"), "$.query.status");
        assert_eq!(
            issue.to_string(),
            "[ENUM_MISMATCH] $.query.status: No enum match for: \"x\""
        );
    }
}
