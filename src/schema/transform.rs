//! Conversions from swagger declarations to JSON Schema documents.

use super::constants::{is_model_type, VALIDATED_STRING_FORMATS};
use crate::error::DeclarationError;
use crate::spec::{ModelSpec, OperationSpec, ParamType, ParameterSpec};
use serde_json::{json, Map, Value};

/// Turn a model declaration into a JSON Schema.
///
/// The `id` is dropped, `format` survives only on strings and non built-in
/// `type` names become `$ref`s.
pub fn model(spec: &ModelSpec) -> Result<Value, DeclarationError> {
    let mut schema = serde_json::to_value(spec).map_err(|e| DeclarationError::Schema {
        context: format!("model {}", spec.id),
        message: e.to_string(),
    })?;
    if let Value::Object(obj) = &mut schema {
        obj.remove("id");
    }
    convert(&mut schema);
    Ok(schema)
}

fn convert(node: &mut Value) {
    match node {
        Value::Object(obj) => {
            let type_name = obj.get("type").and_then(Value::as_str).map(str::to_string);
            if obj.get("format").map(Value::is_string).unwrap_or(false)
                && type_name.as_deref() != Some("string")
            {
                obj.remove("format");
            }
            if let Some(t) = type_name {
                if is_model_type(&t) {
                    obj.remove("type");
                    obj.insert("$ref".to_string(), Value::String(t));
                }
            }
            for child in obj.values_mut() {
                convert(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(convert),
        _ => {}
    }
}

/// Build the validation schema for all parameters of one location.
///
/// The result wraps the location so that errors are reported as
/// `$.<location>.<name>`. Returns `None` when the operation declares no
/// validated parameter at that location.
pub fn parameters(
    op: &OperationSpec,
    param_type: ParamType,
) -> Result<Option<Value>, DeclarationError> {
    let location = param_type.as_str();

    if param_type == ParamType::Body {
        let Some(param) = op.parameters_in(ParamType::Body).next() else {
            return Ok(None);
        };
        let Some(schema) = parameter(op, param)? else {
            return Ok(None);
        };
        let mut root = json!({
            "type": "object",
            "properties": { location: schema },
        });
        if param.is_required() {
            root["required"] = json!([location]);
        }
        return Ok(Some(root));
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in op.parameters_in(param_type) {
        let Some(schema) = parameter(op, param)? else {
            continue;
        };
        if param.is_required() && param.default_value.is_none() {
            required.push(Value::String(param.name.clone()));
        }
        properties.insert(param.name.clone(), schema);
    }
    if properties.is_empty() {
        return Ok(None);
    }

    let mut inner = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        inner["required"] = Value::Array(required);
    }
    Ok(Some(json!({
        "type": "object",
        "properties": { location: inner },
        "required": [location],
    })))
}

fn parameter(op: &OperationSpec, param: &ParameterSpec) -> Result<Option<Value>, DeclarationError> {
    let unknown = |type_name: &str| DeclarationError::UnknownParameterType {
        nickname: op.nickname.clone(),
        name: param.name.clone(),
        type_name: type_name.to_string(),
    };
    let type_name = param.data_type().ok_or_else(|| unknown(""))?;

    let mut schema = match type_name {
        "integer" => {
            let mut s = json!({ "type": "integer" });
            if let Some(min) = param.minimum.as_ref().and_then(as_i64) {
                s["minimum"] = json!(min);
            }
            if let Some(max) = param.maximum.as_ref().and_then(as_i64) {
                s["maximum"] = json!(max);
            }
            s
        }
        "number" => {
            let mut s = json!({ "type": "number" });
            if let Some(min) = param.minimum.as_ref().and_then(as_f64) {
                s["minimum"] = json!(min);
            }
            if let Some(max) = param.maximum.as_ref().and_then(as_f64) {
                s["maximum"] = json!(max);
            }
            s
        }
        "string" => {
            let mut s = json!({ "type": "string" });
            if let Some(min) = param.minimum.as_ref().and_then(as_i64) {
                s["minLength"] = json!(min);
            }
            if let Some(max) = param.maximum.as_ref().and_then(as_i64) {
                s["maxLength"] = json!(max);
            }
            if let Some(format) = &param.format {
                if VALIDATED_STRING_FORMATS.contains(&format.as_str()) {
                    s["format"] = json!(format);
                }
            }
            s
        }
        "boolean" => json!({ "type": "boolean" }),
        "array" => {
            let mut items = param.items.clone().unwrap_or_else(|| json!({}));
            convert(&mut items);
            let mut s = json!({ "type": "array", "items": items });
            if let Some(unique) = param.unique_items {
                s["uniqueItems"] = json!(unique);
            }
            s
        }
        // multipart uploads are not decoded, nothing to validate
        "File" => return Ok(None),
        other if param.param_type == ParamType::Body && is_model_type(other) => {
            json!({ "$ref": other })
        }
        other => return Err(unknown(other)),
    };

    if let Some(values) = &param.enum_values {
        schema["enum"] = Value::Array(values.clone());
    }
    if let Some(default) = &param.default_value {
        schema["default"] = default.clone();
    }

    let multiple = matches!(
        param.param_type,
        ParamType::Path | ParamType::Query | ParamType::Header
    ) && param.is_multiple();
    if multiple && type_name != "array" {
        schema = wrap_multiple(schema);
    }

    Ok(Some(schema))
}

fn wrap_multiple(mut item: Value) -> Value {
    let default = item.as_object_mut().and_then(|o| o.remove("default"));
    let mut schema = json!({ "type": "array", "items": item });
    match default {
        Some(Value::Array(values)) => schema["default"] = Value::Array(values),
        Some(value) => schema["default"] = json!([value]),
        None => {}
    }
    schema
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
