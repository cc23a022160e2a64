use super::registry::NicknameRegistry;
use super::resource::{Resource, ResourceScope};
use crate::error::DeclarationError;
use crate::middleware::Hooks;
use crate::schema::{swagger, transform, SchemaEnvironment};
use crate::spec::{ApiSpec, ModelSpec, ResourceSpec};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Register a model into the schema registry under its id.
///
/// Registering the same model twice is allowed; a different model under an
/// id that is already taken is not.
pub(crate) fn register_model(
    env: &mut SchemaEnvironment,
    model: &ModelSpec,
) -> Result<(), DeclarationError> {
    let raw = serde_json::to_value(model).map_err(|e| DeclarationError::Schema {
        context: model.id.clone(),
        message: e.to_string(),
    })?;
    env.validate_throw(&swagger::MODEL, &raw, "model")?;
    let schema = transform::model(model)?;
    match env.get_schema(&model.id) {
        Some(existing) if *existing == schema => Ok(()),
        Some(_) => Err(DeclarationError::DuplicateModel {
            id: model.id.clone(),
        }),
        None => {
            env.add_schema(model.id.clone(), schema);
            Ok(())
        }
    }
}

/// What an Api sees of the framework during setup.
pub(crate) struct ApiScope<'a> {
    pub env: &'a mut SchemaEnvironment,
    pub hooks: &'a Hooks,
}

/// One API declaration: a `resourcePath` with its resources and models.
pub struct Api {
    spec: ApiSpec,
    resources: Vec<Resource>,
    models: BTreeMap<String, ModelSpec>,
    hooks: Hooks,
    nicknames: Option<NicknameRegistry>,
}

impl Api {
    pub fn new(spec: ApiSpec) -> Self {
        Api {
            spec,
            resources: Vec::new(),
            models: BTreeMap::new(),
            hooks: Hooks::default(),
            nicknames: None,
        }
    }

    /// Declare a resource and return it for adding operations.
    pub fn resource(&mut self, spec: ResourceSpec) -> &mut Resource {
        self.add_resource(Resource::new(spec))
    }

    pub fn add_resource(&mut self, resource: Resource) -> &mut Resource {
        self.resources.push(resource);
        let last = self.resources.len() - 1;
        &mut self.resources[last]
    }

    /// Declare a model; ids are unique within the Api.
    pub fn model(&mut self, model: ModelSpec) -> Result<&mut Self, DeclarationError> {
        if self.models.contains_key(&model.id) {
            return Err(DeclarationError::DuplicateModel { id: model.id });
        }
        self.models.insert(model.id.clone(), model);
        Ok(self)
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    pub fn resource_path(&self) -> &str {
        &self.spec.resource_path
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn models(&self) -> &BTreeMap<String, ModelSpec> {
        &self.models
    }

    /// Nicknames claimed by this Api's operations, available after setup.
    pub fn nicknames(&self) -> Option<&NicknameRegistry> {
        self.nicknames.as_ref()
    }

    pub fn is_setup(&self) -> bool {
        self.nicknames.is_some()
    }

    pub(crate) fn setup(&mut self, scope: ApiScope<'_>) -> Result<(), DeclarationError> {
        if self.nicknames.is_some() {
            return Err(DeclarationError::AlreadySetup {
                entity: "api",
                name: self.spec.resource_path.clone(),
            });
        }

        let raw = serde_json::to_value(&self.spec).map_err(|e| DeclarationError::Schema {
            context: self.spec.resource_path.clone(),
            message: e.to_string(),
        })?;
        scope.env.validate_throw(&swagger::API, &raw, "api")?;
        if !self.spec.resource_path.starts_with('/') {
            return Err(DeclarationError::InvalidPath {
                entity: "api",
                path: self.spec.resource_path.clone(),
            });
        }

        // models first so forward references from operations resolve
        for model in self.models.values() {
            register_model(scope.env, model)?;
        }

        let hooks = self.hooks.inherit(scope.hooks);
        let mut nicknames = NicknameRegistry::new(self.spec.resource_path.clone());
        let mut paths = BTreeSet::new();
        for resource in &mut self.resources {
            resource.setup(ResourceScope {
                env: &*scope.env,
                api: &self.spec,
                hooks: &hooks,
                nicknames: &mut nicknames,
            })?;
            if !paths.insert(resource.path().to_string()) {
                return Err(DeclarationError::DuplicateResource {
                    path: resource.path().to_string(),
                });
            }
        }

        debug!(
            resource_path = %self.spec.resource_path,
            resources = self.resources.len(),
            operations = nicknames.len(),
            models = self.models.len(),
            "Api setup complete"
        );
        self.nicknames = Some(nicknames);
        Ok(())
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("resource_path", &self.spec.resource_path)
            .field("resources", &self.resources)
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}
