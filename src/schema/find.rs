//! Model reference detection.
//!
//! A schema node references a model when it carries a `$ref`, when it is an
//! array whose `items` carries a `$ref`, or when its `type` is not one of the
//! built-in type names.

use super::constants::is_model_type;
use crate::spec::{ModelSpec, OperationSpec};
use serde_json::Value;
use std::collections::BTreeSet;

/// Model referenced by a schema node, if any.
pub fn model(node: &Value) -> Option<&str> {
    let obj = node.as_object()?;
    reference(
        obj.get("type").and_then(Value::as_str),
        obj.get("$ref").and_then(Value::as_str),
        obj.get("items"),
    )
}

fn reference<'a>(
    type_name: Option<&'a str>,
    reference: Option<&'a str>,
    items: Option<&'a Value>,
) -> Option<&'a str> {
    if let Some(r) = reference {
        return Some(r);
    }
    match type_name {
        Some("array") => items
            .and_then(|i| i.get("$ref"))
            .and_then(Value::as_str),
        Some(t) if is_model_type(t) => Some(t),
        _ => None,
    }
}

/// Models referenced directly by an operation's response type and parameters.
pub fn operation_models(op: &OperationSpec) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    if let Some(m) = reference(
        op.type_name.as_deref(),
        op.reference.as_deref(),
        op.items.as_ref(),
    ) {
        found.insert(m.to_string());
    }
    for param in &op.parameters {
        if let Some(m) = reference(
            param.type_name.as_deref(),
            param.reference.as_deref(),
            param.items.as_ref(),
        ) {
            found.insert(m.to_string());
        }
    }
    found
}

/// Models referenced by the properties of a model.
pub fn model_references(model_spec: &ModelSpec) -> BTreeSet<String> {
    model_spec
        .properties
        .values()
        .filter_map(model)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ParamType, ParameterSpec};
    use serde_json::json;

    #[test]
    fn test_model_detection_rules() {
        assert_eq!(model(&json!({"$ref": "Pet"})), Some("Pet"));
        assert_eq!(model(&json!({"type": "array", "items": {"$ref": "Tag"}})), Some("Tag"));
        assert_eq!(model(&json!({"type": "array", "items": {"type": "string"}})), None);
        assert_eq!(model(&json!({"type": "Category"})), Some("Category"));
        assert_eq!(model(&json!({"type": "integer", "format": "int64"})), None);
        assert_eq!(model(&json!({"type": "void"})), None);
        assert_eq!(model(&json!("Pet")), None);
    }

    #[test]
    fn test_operation_models() {
        let op = OperationSpec::new("POST", "addPet")
            .type_name("Pet")
            .parameter(ParameterSpec::new("body", ParamType::Body, "NewPet"))
            .parameter(ParameterSpec::new("q", ParamType::Query, "string"));
        let found: Vec<String> = operation_models(&op).into_iter().collect();
        assert_eq!(found, vec!["NewPet".to_string(), "Pet".to_string()]);
    }

    #[test]
    fn test_model_references() {
        let pet = ModelSpec::new("Pet")
            .property("category", json!({"$ref": "Category"}))
            .property("tags", json!({"type": "array", "items": {"$ref": "Tag"}}))
            .property("name", json!({"type": "string"}));
        let found: Vec<String> = model_references(&pet).into_iter().collect();
        assert_eq!(found, vec!["Category".to_string(), "Tag".to_string()]);
    }
}
