use super::operation::{Operation, OperationScope};
use super::registry::NicknameRegistry;
use crate::error::DeclarationError;
use crate::middleware::{Hooks, Stage};
use crate::schema::{swagger, SchemaEnvironment};
use crate::spec::{ApiSpec, OperationSpec, ResourceSpec};
use std::sync::Arc;

/// Join a resource path onto its Api's `resourcePath`.
///
/// The check is on segment boundaries: `/pet` and `/pet/{petId}` already
/// carry the `/pet` prefix, `/petshop` does not. Applying it to its own
/// output returns the output unchanged.
pub fn prefixed_path(api_path: &str, path: &str) -> String {
    let prefix = api_path.trim_end_matches('/');
    if prefix.is_empty() {
        return path.to_string();
    }
    let carries_prefix = path
        .strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(false);
    if carries_prefix {
        path.to_string()
    } else {
        format!("{}{}", prefix, path)
    }
}

/// What a resource sees of its Api during setup.
pub(crate) struct ResourceScope<'a> {
    pub env: &'a SchemaEnvironment,
    pub api: &'a ApiSpec,
    pub hooks: &'a Hooks,
    pub nicknames: &'a mut NicknameRegistry,
}

/// A URL path under an Api, with at most one operation per method.
pub struct Resource {
    spec: ResourceSpec,
    operations: Vec<Operation>,
    hooks: Hooks,
    /// Effective path, known once setup ran
    path: Option<String>,
}

impl Resource {
    pub fn new(spec: ResourceSpec) -> Self {
        Resource {
            spec,
            operations: Vec::new(),
            hooks: Hooks::default(),
            path: None,
        }
    }

    /// Declare an operation with its first handler.
    pub fn operation(
        &mut self,
        spec: OperationSpec,
        handler: Arc<dyn Stage>,
    ) -> Result<&mut Operation, DeclarationError> {
        let mut operation = Operation::new(spec);
        operation.handler(handler);
        self.add_operation(operation)
    }

    /// Attach a constructed operation; a second one for the same method is rejected.
    pub fn add_operation(&mut self, operation: Operation) -> Result<&mut Operation, DeclarationError> {
        if self.operations.iter().any(|o| o.method() == operation.method()) {
            return Err(DeclarationError::DuplicateOperation {
                method: operation.method().to_string(),
                path: self.spec.path.clone(),
            });
        }
        self.operations.push(operation);
        let last = self.operations.len() - 1;
        Ok(&mut self.operations[last])
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    /// Effective path after setup, the declared one before.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.spec.path)
    }

    /// Operations in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation_for(&self, method: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|o| o.method().eq_ignore_ascii_case(method))
    }

    pub fn is_setup(&self) -> bool {
        self.path.is_some()
    }

    pub(crate) fn setup(&mut self, scope: ResourceScope<'_>) -> Result<(), DeclarationError> {
        if self.path.is_some() {
            return Err(DeclarationError::AlreadySetup {
                entity: "resource",
                name: self.spec.path.clone(),
            });
        }

        let raw = serde_json::to_value(&self.spec).map_err(|e| DeclarationError::Schema {
            context: self.spec.path.clone(),
            message: e.to_string(),
        })?;
        scope.env.validate_throw(&swagger::RESOURCE, &raw, "resource")?;
        if !self.spec.path.starts_with('/') {
            return Err(DeclarationError::InvalidPath {
                entity: "resource",
                path: self.spec.path.clone(),
            });
        }

        let path = prefixed_path(&scope.api.resource_path, &self.spec.path);
        let hooks = self.hooks.inherit(scope.hooks);
        for operation in &mut self.operations {
            operation.setup(OperationScope {
                env: scope.env,
                api: scope.api,
                path: &path,
                hooks: &hooks,
                nicknames: &mut *scope.nicknames,
            })?;
        }
        self.path = Some(path);
        Ok(())
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path())
            .field("operations", &self.operations)
            .finish()
    }
}
