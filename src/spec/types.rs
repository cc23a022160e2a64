use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The only interchange format version this crate speaks.
pub const SWAGGER_VERSION: &str = "1.2";

pub const DEFAULT_API_VERSION: &str = "0.0.0";
pub const DEFAULT_DOCS_PATH: &str = "/api-docs";

/// Request location a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Path,
    Query,
    Header,
    Form,
    Body,
}

impl ParamType {
    pub const ALL: [ParamType; 5] = [
        ParamType::Path,
        ParamType::Query,
        ParamType::Header,
        ParamType::Form,
        ParamType::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Path => "path",
            ParamType::Query => "query",
            ParamType::Header => "header",
            ParamType::Form => "form",
            ParamType::Body => "body",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options accepted by `Framework::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkOptions {
    pub base_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_path: Option<String>,
}

impl FrameworkOptions {
    pub fn new(base_path: impl Into<String>) -> Self {
        FrameworkOptions {
            base_path: base_path.into(),
            api_version: None,
            authorizations: None,
            docs_path: None,
        }
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = Some(path.into());
        self
    }

    pub fn authorizations(mut self, authorizations: Map<String, Value>) -> Self {
        self.authorizations = Some(authorizations);
        self
    }
}

/// Framework level metadata, the root of the resource listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSpec {
    pub swagger_version: String,
    pub base_path: String,
    pub api_version: String,
    /// Resource paths of declared apis in declaration order.
    pub apis: Vec<String>,
    pub authorizations: Map<String, Value>,
}

impl From<&FrameworkOptions> for FrameworkSpec {
    fn from(options: &FrameworkOptions) -> Self {
        FrameworkSpec {
            swagger_version: SWAGGER_VERSION.to_string(),
            base_path: options.base_path.clone(),
            api_version: options
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            apis: Vec::new(),
            authorizations: options.authorizations.clone().unwrap_or_default(),
        }
    }
}

/// Top-level declaration of one api (one `resourcePath`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    pub resource_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Map<String, Value>>,
}

impl ApiSpec {
    pub fn new(resource_path: impl Into<String>) -> Self {
        ApiSpec {
            resource_path: resource_path.into(),
            ..Default::default()
        }
    }
}

/// One URL path group inside an api.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResourceSpec {
    pub fn new(path: impl Into<String>) -> Self {
        ResourceSpec {
            path: path.into(),
            description: None,
        }
    }
}

/// A swagger `ParameterObject`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub param_type: ParamType,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple: Option<bool>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, param_type: ParamType, type_name: impl Into<String>) -> Self {
        ParameterSpec {
            param_type,
            name: name.into(),
            type_name: Some(type_name.into()),
            reference: None,
            description: None,
            required: None,
            allow_multiple: None,
            enum_values: None,
            minimum: None,
            maximum: None,
            default_value: None,
            format: None,
            items: None,
            unique_items: None,
            extra: Map::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn allow_multiple(mut self, allow: bool) -> Self {
        self.allow_multiple = Some(allow);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn enum_values(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Declared type, falling back to `$ref` for model parameters.
    pub fn data_type(&self) -> Option<&str> {
        self.type_name.as_deref().or(self.reference.as_deref())
    }

    /// Path parameters are required whatever the declaration says.
    pub fn is_required(&self) -> bool {
        self.param_type == ParamType::Path || self.required.unwrap_or(false)
    }

    pub fn is_multiple(&self) -> bool {
        self.allow_multiple.unwrap_or(false)
    }
}

/// A swagger `OperationObject`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub nickname: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_messages: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationSpec {
    pub fn new(method: impl Into<String>, nickname: impl Into<String>) -> Self {
        OperationSpec {
            method: method.into(),
            path: None,
            summary: None,
            notes: None,
            nickname: nickname.into(),
            type_name: Some("void".to_string()),
            reference: None,
            items: None,
            format: None,
            parameters: Vec::new(),
            consumes: None,
            produces: None,
            authorizations: None,
            response_messages: None,
            deprecated: None,
            extra: Map::new(),
        }
    }

    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn consumes(mut self, mimes: &[&str]) -> Self {
        self.consumes = Some(mimes.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn produces(mut self, mimes: &[&str]) -> Self {
        self.produces = Some(mimes.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Upper-cased HTTP method.
    pub fn method_name(&self) -> String {
        self.method.to_ascii_uppercase()
    }

    pub fn parameters_in(&self, param_type: ParamType) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters
            .iter()
            .filter(move |p| p.param_type == param_type)
    }
}

/// A named data model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelSpec {
    pub fn new(id: impl Into<String>) -> Self {
        ModelSpec {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }
}

/// Entry of the resource listing index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceListingEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The documentation index served at the docs prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListing {
    pub api_version: String,
    pub swagger_version: String,
    #[serde(default)]
    pub apis: Vec<ResourceListingEntry>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub authorizations: Map<String, Value>,
}

/// One path inside an api declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDeclarationEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

/// The per-resource documentation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDeclaration {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub swagger_version: String,
    #[serde(default)]
    pub base_path: String,
    pub resource_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Map<String, Value>>,
    #[serde(default)]
    pub apis: Vec<ApiDeclarationEntry>,
    #[serde(default)]
    pub models: BTreeMap<String, ModelSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_roundtrips_unknown_fields() {
        let raw = json!({
            "method": "GET",
            "nickname": "getPetById",
            "type": "Pet",
            "parameters": [
                {"paramType": "path", "name": "petId", "type": "integer", "format": "int64", "x-extra": true}
            ],
            "x-internal": "yes"
        });
        let op: OperationSpec = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(op.parameters[0].param_type, ParamType::Path);
        assert_eq!(op.extra.get("x-internal"), Some(&json!("yes")));
        assert_eq!(serde_json::to_value(&op).unwrap(), raw);
    }

    #[test]
    fn test_path_params_always_required() {
        let p = ParameterSpec::new("petId", ParamType::Path, "integer").required(false);
        assert!(p.is_required());
        let q = ParameterSpec::new("status", ParamType::Query, "string");
        assert!(!q.is_required());
    }

    #[test]
    fn test_framework_spec_defaults() {
        let spec = FrameworkSpec::from(&FrameworkOptions::new("http://localhost"));
        assert_eq!(spec.swagger_version, "1.2");
        assert_eq!(spec.api_version, "0.0.0");
        assert!(spec.authorizations.is_empty());
    }
}
