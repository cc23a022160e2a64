//! Value coercion and default filling ahead of structural validation.
//!
//! Query, header, path and form values arrive as strings. In coercive mode
//! every leaf whose schema declares a primitive `type` is converted before
//! the validator sees it; values that cannot be converted are left alone so
//! that validation reports them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

static INTEGER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^-?\d+$").ok());
static NUMBER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^-?(\d+|\d*\.\d+|\d+\.\d*)$").ok());

const MAX_DEPTH: usize = 64;

/// Options for one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Convert stringly typed leaves to their declared type
    pub coerce: bool,
    /// Insert `default` values for absent properties
    pub use_default: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions {
            coerce: false,
            use_default: true,
        }
    }
}

impl ValidateOptions {
    pub fn coercive() -> Self {
        ValidateOptions {
            coerce: true,
            use_default: true,
        }
    }

    pub fn strict() -> Self {
        ValidateOptions::default()
    }
}

/// Walk `data` alongside `schema`, coercing leaves and filling defaults.
///
/// `$ref`s of the form `#/definitions/<name>` are followed through `definitions`.
pub(crate) fn prepare(
    schema: &Value,
    definitions: &Map<String, Value>,
    data: &mut Value,
    options: ValidateOptions,
) {
    walk(schema, definitions, data, options, 0);
}

fn walk(
    schema: &Value,
    definitions: &Map<String, Value>,
    data: &mut Value,
    options: ValidateOptions,
    depth: usize,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let schema = resolve(schema, definitions);
    let Some(obj) = schema.as_object() else {
        return;
    };

    if options.coerce {
        if let Some(type_name) = obj.get("type").and_then(Value::as_str) {
            coerce(type_name, data);
        }
    }

    match data {
        Value::Array(items) => {
            if let Some(item_schema) = obj.get("items").filter(|s| s.is_object()) {
                for item in items.iter_mut() {
                    walk(item_schema, definitions, item, options, depth + 1);
                }
            }
        }
        Value::Object(map) => {
            if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
                for (name, prop_schema) in properties {
                    match map.get_mut(name) {
                        Some(value) => walk(prop_schema, definitions, value, options, depth + 1),
                        None if options.use_default => {
                            let prop_schema = resolve(prop_schema, definitions);
                            if let Some(default) = prop_schema.get("default") {
                                map.insert(name.clone(), default.clone());
                            }
                        }
                        None => {}
                    }
                }
            }
        }
        _ => {}
    }
}

fn resolve<'a>(schema: &'a Value, definitions: &'a Map<String, Value>) -> &'a Value {
    let mut current = schema;
    for _ in 0..MAX_DEPTH {
        let Some(target) = current
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix("#/definitions/"))
            .and_then(|name| definitions.get(name))
        else {
            break;
        };
        current = target;
    }
    current
}

/// Convert `value` in place towards `type_name` following the fixed rules.
pub fn coerce(type_name: &str, value: &mut Value) {
    let converted = match (type_name, &*value) {
        ("integer", Value::String(s)) if matches(&INTEGER, s) => {
            s.parse::<i64>().ok().map(Value::from)
        }
        ("number", Value::String(s)) if matches(&NUMBER, s) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ("boolean", Value::String(s)) => Some(Value::Bool(!matches!(s.as_str(), "" | "0" | "false"))),
        ("boolean", Value::Number(n)) => match n.as_f64() {
            Some(f) if f == 0.0 => Some(Value::Bool(false)),
            Some(f) if f == 1.0 => Some(Value::Bool(true)),
            _ => None,
        },
        ("array", Value::Array(_)) => None,
        ("array", Value::String(s)) if s.is_empty() => Some(Value::Array(Vec::new())),
        ("array", Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
            Some(Value::Array(vec![value.clone()]))
        }
        ("array", Value::Object(map)) => Some(Value::Array(map.values().cloned().collect())),
        ("array", Value::Null) => Some(Value::Array(Vec::new())),
        ("string", Value::Number(n)) => Some(Value::String(n.to_string())),
        _ => None,
    };
    if let Some(v) = converted {
        *value = v;
    }
}

fn matches(re: &Lazy<Option<Regex>>, s: &str) -> bool {
    re.as_ref().map(|r| r.is_match(s)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerced(type_name: &str, value: Value) -> Value {
        let mut v = value;
        coerce(type_name, &mut v);
        v
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerced("integer", json!("123")), json!(123));
        assert_eq!(coerced("integer", json!("-7")), json!(-7));
        assert_eq!(coerced("integer", json!("abc")), json!("abc"));
        assert_eq!(coerced("integer", json!("1.5")), json!("1.5"));
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(coerced("number", json!("1.5")), json!(1.5));
        assert_eq!(coerced("number", json!(".5")), json!(0.5));
        assert_eq!(coerced("number", json!("2.")), json!(2.0));
        assert_eq!(coerced("number", json!("1e3")), json!("1e3"));
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(coerced("boolean", json!("")), json!(false));
        assert_eq!(coerced("boolean", json!("0")), json!(false));
        assert_eq!(coerced("boolean", json!("false")), json!(false));
        assert_eq!(coerced("boolean", json!("true")), json!(true));
        assert_eq!(coerced("boolean", json!("yes")), json!(true));
        assert_eq!(coerced("boolean", json!(0)), json!(false));
        assert_eq!(coerced("boolean", json!(1)), json!(true));
        assert_eq!(coerced("boolean", json!(2)), json!(2));
    }

    #[test]
    fn test_array_coercion() {
        assert_eq!(coerced("array", json!("one")), json!(["one"]));
        assert_eq!(coerced("array", json!(["one", "two"])), json!(["one", "two"]));
        assert_eq!(coerced("array", json!({})), json!([]));
        assert_eq!(coerced("array", json!({"a": 1, "b": 2})), json!([1, 2]));
        assert_eq!(coerced("array", json!("")), json!([]));
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(coerced("string", json!(12)), json!("12"));
        assert_eq!(coerced("string", json!(true)), json!(true));
    }

    #[test]
    fn test_prepare_coerces_nested_items_and_defaults() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "object",
                    "properties": {
                        "ids": {"type": "array", "items": {"type": "integer"}},
                        "status": {"type": "string", "default": "available"}
                    }
                }
            }
        });
        let mut data = json!({"query": {"ids": ["1", "2"]}});
        prepare(&schema, &Map::new(), &mut data, ValidateOptions::coercive());
        assert_eq!(data, json!({"query": {"ids": [1, 2], "status": "available"}}));
    }

    #[test]
    fn test_prepare_follows_definitions() {
        let mut defs = Map::new();
        defs.insert(
            "Pet".into(),
            json!({"properties": {"status": {"type": "string", "default": "sold"}}}),
        );
        let schema = json!({"properties": {"body": {"$ref": "#/definitions/Pet"}}});
        let mut data = json!({"body": {"name": "x"}});
        prepare(&schema, &defs, &mut data, ValidateOptions::strict());
        assert_eq!(data["body"]["status"], json!("sold"));
    }
}
