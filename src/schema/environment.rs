use super::coerce::{prepare, ValidateOptions};
use crate::error::DeclarationError;
use crate::validator::{ValidationErrors, ValidationIssue};
use jsonschema::{Draft, JSONSchema};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Named schema registry plus validation entry points.
///
/// Schemas registered with [`add_schema`](Self::add_schema) can be referenced
/// from any other schema by bare name (`{"$ref": "Pet"}`). Compiling a schema
/// embeds every transitively referenced registry entry under `definitions`.
#[derive(Debug, Clone, Default)]
pub struct SchemaEnvironment {
    schemas: BTreeMap<String, Value>,
}

impl SchemaEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named schema.
    pub fn add_schema(&mut self, id: impl Into<String>, schema: Value) {
        let id = id.into();
        debug!(schema_id = %id, "Registered schema");
        self.schemas.insert(id, schema);
    }

    pub fn has_schema(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    pub fn get_schema(&self, id: &str) -> Option<&Value> {
        self.schemas.get(id)
    }

    pub fn schema_ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Compile `schema` against the current registry.
    ///
    /// Fails when a referenced model is not registered or the resulting
    /// document is not a valid schema. `context` names the schema in errors.
    pub fn compile(&self, schema: &Value, context: &str) -> Result<CompiledSchema, DeclarationError> {
        let mut root = schema.clone();
        let mut pending = BTreeSet::new();
        rewrite_refs(&mut root, &mut pending);

        let mut definitions = Map::new();
        while let Some(name) = pending.pop_first() {
            if definitions.contains_key(&name) {
                continue;
            }
            let Some(found) = self.schemas.get(&name) else {
                return Err(DeclarationError::UnresolvedModel {
                    context: context.to_string(),
                    model: name,
                });
            };
            let mut found = found.clone();
            rewrite_refs(&mut found, &mut pending);
            definitions.insert(name, found);
        }

        if let Value::Object(obj) = &mut root {
            if !definitions.is_empty() {
                obj.insert("definitions".to_string(), Value::Object(definitions.clone()));
            }
        }

        let validator = JSONSchema::options()
            .with_draft(Draft::Draft4)
            .compile(&root)
            .map_err(|e| DeclarationError::Schema {
                context: context.to_string(),
                message: e.to_string(),
            })?;

        Ok(CompiledSchema {
            validator: Arc::new(validator),
            schema: Arc::new(root),
            definitions: Arc::new(definitions),
        })
    }

    /// Validate `data`, coercing and filling defaults in place first.
    ///
    /// A schema that cannot be compiled is reported as a single issue.
    pub fn validate(
        &self,
        schema: &Value,
        data: &mut Value,
        options: ValidateOptions,
    ) -> Result<(), ValidationErrors> {
        match self.compile(schema, "schema") {
            Ok(compiled) => compiled.validate(data, options),
            Err(err) => Err(ValidationErrors(vec![ValidationIssue::new(
                "SCHEMA_INVALID",
                err.to_string(),
                Value::Null,
                "$",
            )])),
        }
    }

    /// Validate a declaration; any issue becomes a [`DeclarationError::Invalid`].
    pub fn validate_throw(
        &self,
        schema: &Value,
        data: &Value,
        entity: &'static str,
    ) -> Result<(), DeclarationError> {
        let mut data = data.clone();
        self.validate(schema, &mut data, ValidateOptions::strict())
            .map_err(|errors| DeclarationError::Invalid {
                entity,
                message: "Validation failed".to_string(),
                errors: errors.into_issues(),
            })
    }
}

/// A schema compiled once and shared across requests.
#[derive(Clone)]
pub struct CompiledSchema {
    validator: Arc<JSONSchema>,
    schema: Arc<Value>,
    definitions: Arc<Map<String, Value>>,
}

impl CompiledSchema {
    /// The compiled document including embedded `definitions`.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn validate(&self, data: &mut Value, options: ValidateOptions) -> Result<(), ValidationErrors> {
        prepare(&self.schema, &self.definitions, data, options);
        let issues: Vec<ValidationIssue> = match self.validator.validate(&*data) {
            Ok(()) => return Ok(()),
            Err(errors) => errors.map(|e| ValidationIssue::from_error(&e)).collect(),
        };
        Err(ValidationErrors(issues))
    }

    pub fn is_valid(&self, data: &Value) -> bool {
        self.validator.is_valid(data)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Point bare model names at `#/definitions/<name>` and collect every name.
fn rewrite_refs(node: &mut Value, found: &mut BTreeSet<String>) {
    match node {
        Value::Object(obj) => {
            if let Some(Value::String(reference)) = obj.get_mut("$ref") {
                if let Some(name) = reference.strip_prefix(DEFINITIONS_PREFIX) {
                    found.insert(name.to_string());
                } else if !reference.starts_with('#') && !reference.contains('/') {
                    found.insert(reference.clone());
                    *reference = format!("{}{}", DEFINITIONS_PREFIX, reference);
                }
            }
            for child in obj.values_mut() {
                rewrite_refs(child, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_refs(item, found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_with_pet() -> SchemaEnvironment {
        let mut env = SchemaEnvironment::new();
        env.add_schema(
            "Tag",
            json!({"properties": {"name": {"type": "string"}}, "required": ["name"]}),
        );
        env.add_schema(
            "Pet",
            json!({
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "tags": {"type": "array", "items": {"$ref": "Tag"}}
                }
            }),
        );
        env
    }

    #[test]
    fn test_validate_resolves_named_models() {
        let env = env_with_pet();
        let schema = json!({"$ref": "Pet"});
        let mut ok = json!({"name": "doggie", "tags": [{"name": "a"}]});
        assert!(env.validate(&schema, &mut ok, ValidateOptions::strict()).is_ok());

        let mut bad = json!({"name": "doggie", "tags": [{}]});
        let errors = env
            .validate(&schema, &mut bad, ValidateOptions::strict())
            .unwrap_err();
        assert_eq!(errors.issues()[0].code, "OBJECT_REQUIRED");
        assert_eq!(errors.issues()[0].path, "$.tags[0].name");
    }

    #[test]
    fn test_coercive_validation() {
        let env = SchemaEnvironment::new();
        let schema = json!({
            "type": "object",
            "properties": {"path": {"type": "object", "properties": {"petId": {"type": "integer"}}}}
        });
        let mut data = json!({"path": {"petId": "123"}});
        env.validate(&schema, &mut data, ValidateOptions::coercive()).unwrap();
        assert_eq!(data["path"]["petId"], json!(123));

        let mut data = json!({"path": {"petId": "abc"}});
        let errors = env
            .validate(&schema, &mut data, ValidateOptions::coercive())
            .unwrap_err();
        assert_eq!(errors.issues()[0].code, "VALIDATION_INVALID_TYPE");
        assert_eq!(errors.issues()[0].message, "Invalid type: string should be integer");
        assert_eq!(errors.issues()[0].path, "$.path.petId");
    }

    #[test]
    fn test_unresolved_model_fails_compile() {
        let env = SchemaEnvironment::new();
        let err = env.compile(&json!({"$ref": "Missing"}), "body").unwrap_err();
        assert_eq!(
            err,
            DeclarationError::UnresolvedModel {
                context: "body".into(),
                model: "Missing".into()
            }
        );
    }

    #[test]
    fn test_validate_throw_carries_issues() {
        let env = SchemaEnvironment::new();
        let schema = json!({"type": "object", "required": ["id"]});
        let err = env.validate_throw(&schema, &json!({}), "model").unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert!(err.to_string().starts_with("model Validation failed"));
    }
}
