use super::registry::NicknameRegistry;
use crate::error::DeclarationError;
use crate::middleware::{Hooks, Stage};
use crate::schema::{swagger, transform, SchemaEnvironment};
use crate::spec::{ApiSpec, OperationSpec, ParamType};
use http::Method;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Route-level facts about an operation, shared with every request context.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationInfo {
    /// `resourcePath` of the owning Api
    pub api_path: String,
    /// Effective (prefixed) path of the owning resource
    pub path: String,
    pub method: Method,
    pub spec: OperationSpec,
}

/// What an operation sees of its ancestors during setup.
pub(crate) struct OperationScope<'a> {
    pub env: &'a SchemaEnvironment,
    pub api: &'a ApiSpec,
    pub path: &'a str,
    pub hooks: &'a Hooks,
    pub nicknames: &'a mut NicknameRegistry,
}

/// One HTTP method on one resource, plus its handler chain.
pub struct Operation {
    spec: OperationSpec,
    handlers: Vec<Arc<dyn Stage>>,
    hooks: Hooks,
    attached: Option<Attached>,
}

/// State resolved once at setup.
#[derive(Clone)]
pub(crate) struct Attached {
    pub info: Arc<OperationInfo>,
    pub hooks: Hooks,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Wrapper schema per parameter location
    pub schemas: BTreeMap<ParamType, Value>,
}

impl Operation {
    /// The method is upper-cased; nothing else is checked until setup.
    pub fn new(mut spec: OperationSpec) -> Self {
        spec.method = spec.method_name();
        Operation {
            spec,
            handlers: Vec::new(),
            hooks: Hooks::default(),
            attached: None,
        }
    }

    /// Append a handler; handlers run in the order they were added.
    pub fn handler(&mut self, handler: Arc<dyn Stage>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn method(&self) -> &str {
        &self.spec.method
    }

    pub fn nickname(&self) -> &str {
        &self.spec.nickname
    }

    pub fn handlers(&self) -> &[Arc<dyn Stage>] {
        &self.handlers
    }

    pub fn is_setup(&self) -> bool {
        self.attached.is_some()
    }

    pub(crate) fn attached(&self) -> Option<&Attached> {
        self.attached.as_ref()
    }

    pub(crate) fn setup(&mut self, scope: OperationScope<'_>) -> Result<(), DeclarationError> {
        if self.attached.is_some() {
            return Err(DeclarationError::AlreadySetup {
                entity: "operation",
                name: self.spec.nickname.clone(),
            });
        }

        let raw = serde_json::to_value(&self.spec).map_err(|e| DeclarationError::Schema {
            context: self.spec.nickname.clone(),
            message: e.to_string(),
        })?;
        scope
            .env
            .validate_throw(&swagger::OPERATION, &raw, "operation")?;

        let method = Method::from_bytes(self.spec.method.as_bytes()).map_err(|_| {
            DeclarationError::Invalid {
                entity: "operation",
                message: format!("unsupported method {}", self.spec.method),
                errors: Vec::new(),
            }
        })?;

        let mut names = BTreeSet::new();
        for param in &self.spec.parameters {
            if !names.insert(param.name.as_str()) {
                return Err(DeclarationError::DuplicateParameter {
                    nickname: self.spec.nickname.clone(),
                    name: param.name.clone(),
                });
            }
        }
        if self.spec.parameters_in(ParamType::Body).count() > 1 {
            return Err(DeclarationError::MultipleBodyParameters {
                nickname: self.spec.nickname.clone(),
            });
        }

        let mut schemas = BTreeMap::new();
        for location in ParamType::ALL {
            if let Some(schema) = transform::parameters(&self.spec, location)? {
                schemas.insert(location, schema);
            }
        }

        scope
            .nicknames
            .register(&self.spec.nickname, &self.spec.method, scope.path)?;

        let consumes = self
            .spec
            .consumes
            .clone()
            .or_else(|| scope.api.consumes.clone())
            .unwrap_or_default();
        let produces = self
            .spec
            .produces
            .clone()
            .or_else(|| scope.api.produces.clone())
            .unwrap_or_default();

        self.attached = Some(Attached {
            info: Arc::new(OperationInfo {
                api_path: scope.api.resource_path.clone(),
                path: scope.path.to_string(),
                method,
                spec: self.spec.clone(),
            }),
            hooks: self.hooks.inherit(scope.hooks),
            consumes,
            produces,
            schemas,
        });
        Ok(())
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("method", &self.spec.method)
            .field("nickname", &self.spec.nickname)
            .field("handlers", &self.handlers.len())
            .field("setup", &self.attached.is_some())
            .finish()
    }
}
