use super::api::{register_model, Api, ApiScope};
use crate::docs::{Docs, DocsRouter};
use crate::error::DeclarationError;
use crate::middleware::Hooks;
use crate::router::Router;
use crate::schema::constants::DEFAULT_BODY_LIMIT;
use crate::schema::{swagger, SchemaEnvironment};
use crate::server::{AppService, Decoder, DecoderRegistry, Encoder, EncoderRegistry};
use crate::spec::{ApiSpec, FrameworkOptions, FrameworkSpec, ModelSpec, DEFAULT_DOCS_PATH};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// The aggregate root: every Api, the shared schema registry and the
/// compiled dispatcher.
///
/// Declarations are collected first and checked by [`setup`](Self::setup),
/// which [`dispatcher`](Self::dispatcher) runs on first use. Once set up the
/// framework is committed and further declarations are rejected.
pub struct Framework {
    options: FrameworkOptions,
    spec: FrameworkSpec,
    env: SchemaEnvironment,
    apis: Vec<Api>,
    models: BTreeMap<String, ModelSpec>,
    hooks: Hooks,
    encoders: EncoderRegistry,
    decoders: DecoderRegistry,
    body_limit: usize,
    committed: bool,
    failed: Option<DeclarationError>,
    router: OnceCell<Arc<Router>>,
}

impl Framework {
    /// Create a framework; the options are validated immediately.
    pub fn new(options: FrameworkOptions) -> Result<Self, DeclarationError> {
        let env = SchemaEnvironment::new();
        let raw = serde_json::to_value(&options).map_err(|e| DeclarationError::Schema {
            context: "framework".to_string(),
            message: e.to_string(),
        })?;
        env.validate_throw(&swagger::FRAMEWORK_OPTIONS, &raw, "framework")?;

        Ok(Framework {
            spec: FrameworkSpec::from(&options),
            options,
            env,
            apis: Vec::new(),
            models: BTreeMap::new(),
            hooks: Hooks::default(),
            encoders: EncoderRegistry::default(),
            decoders: DecoderRegistry::default(),
            body_limit: DEFAULT_BODY_LIMIT,
            committed: false,
            failed: None,
            router: OnceCell::new(),
        })
    }

    fn ensure_open(&self) -> Result<(), DeclarationError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.committed {
            Err(DeclarationError::Committed)
        } else {
            Ok(())
        }
    }

    /// Declare an Api and return it for adding resources and models.
    pub fn api(&mut self, spec: ApiSpec) -> Result<&mut Api, DeclarationError> {
        self.add_api(Api::new(spec))
    }

    /// Attach a constructed Api; `resourcePath` must be unique.
    pub fn add_api(&mut self, api: Api) -> Result<&mut Api, DeclarationError> {
        self.ensure_open()?;
        if self
            .apis
            .iter()
            .any(|a| a.resource_path() == api.resource_path())
        {
            return Err(DeclarationError::DuplicateApi {
                resource_path: api.resource_path().to_string(),
            });
        }
        self.spec.apis.push(api.resource_path().to_string());
        self.apis.push(api);
        let last = self.apis.len() - 1;
        Ok(&mut self.apis[last])
    }

    /// Declare a model shared by every Api.
    pub fn model(&mut self, model: ModelSpec) -> Result<&mut Self, DeclarationError> {
        self.ensure_open()?;
        if self.models.contains_key(&model.id) {
            return Err(DeclarationError::DuplicateModel { id: model.id });
        }
        self.models.insert(model.id.clone(), model);
        Ok(self)
    }

    /// Framework-wide hooks, inherited by every operation that sets none.
    pub fn hooks_mut(&mut self) -> Result<&mut Hooks, DeclarationError> {
        self.ensure_open()?;
        Ok(&mut self.hooks)
    }

    /// Register a response encoder for `mime`.
    pub fn encoder(&mut self, mime: &str, encoder: Arc<dyn Encoder>) -> Result<&mut Self, DeclarationError> {
        self.ensure_open()?;
        self.encoders.insert(mime, encoder);
        Ok(self)
    }

    /// Register a request body decoder for `mime`.
    pub fn decoder(&mut self, mime: &str, decoder: Arc<dyn Decoder>) -> Result<&mut Self, DeclarationError> {
        self.ensure_open()?;
        self.decoders.insert(mime, decoder);
        Ok(self)
    }

    /// Maximum accepted request body in bytes.
    pub fn body_limit(&mut self, limit: usize) -> Result<&mut Self, DeclarationError> {
        self.ensure_open()?;
        self.body_limit = limit;
        Ok(self)
    }

    /// Validate and link every declaration.
    ///
    /// Framework models are registered first, then each Api cascades into
    /// its resources and operations. Runs once; a second call is an error.
    /// A failed setup leaves the framework unusable and every later call
    /// returns the first error again.
    pub fn setup(&mut self) -> Result<(), DeclarationError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.committed {
            return Err(DeclarationError::AlreadySetup {
                entity: "framework",
                name: self.spec.base_path.clone(),
            });
        }
        if let Err(err) = self.setup_all() {
            warn!(base_path = %self.spec.base_path, error = %err, "Framework setup failed");
            self.failed = Some(err.clone());
            return Err(err);
        }
        self.committed = true;
        info!(
            base_path = %self.spec.base_path,
            apis_count = self.apis.len(),
            models_count = self.env.schema_ids().count(),
            "Framework setup complete"
        );
        Ok(())
    }

    fn setup_all(&mut self) -> Result<(), DeclarationError> {
        for model in self.models.values() {
            register_model(&mut self.env, model)?;
        }
        for api in &mut self.apis {
            api.setup(ApiScope {
                env: &mut self.env,
                hooks: &self.hooks,
            })?;
        }
        Ok(())
    }

    /// The compiled request router, set up and built on first call.
    pub fn dispatcher(&mut self) -> Result<Arc<Router>, DeclarationError> {
        if !self.committed {
            self.setup()?;
        }
        let framework = &*self;
        framework
            .router
            .get_or_try_init(|| Router::build(framework).map(Arc::new))
            .cloned()
    }

    /// Documentation view of the current declarations.
    pub fn docs(&self) -> Docs {
        Docs::new(self)
    }

    /// HTTP surface for the documentation, mounted at `docsPath`.
    pub fn docs_dispatcher(&mut self) -> Result<DocsRouter, DeclarationError> {
        if !self.committed {
            self.setup()?;
        }
        Ok(DocsRouter::new(self.docs(), self.docs_path()))
    }

    /// Docs router followed by the api router.
    pub fn service(&mut self) -> Result<AppService, DeclarationError> {
        let router = self.dispatcher()?;
        let docs = self.docs_dispatcher()?;
        Ok(AppService::new(router, Some(Arc::new(docs))))
    }

    pub fn options(&self) -> &FrameworkOptions {
        &self.options
    }

    pub fn spec(&self) -> &FrameworkSpec {
        &self.spec
    }

    pub fn docs_path(&self) -> &str {
        self.options.docs_path.as_deref().unwrap_or(DEFAULT_DOCS_PATH)
    }

    /// Apis in declaration order.
    pub fn apis(&self) -> &[Api] {
        &self.apis
    }

    pub fn find_api(&self, resource_path: &str) -> Option<&Api> {
        self.apis.iter().find(|a| a.resource_path() == resource_path)
    }

    /// Models declared on the framework itself.
    pub fn models(&self) -> &BTreeMap<String, ModelSpec> {
        &self.models
    }

    pub fn env(&self) -> &SchemaEnvironment {
        &self.env
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }

    pub fn max_body_size(&self) -> usize {
        self.body_limit
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

impl std::fmt::Debug for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framework")
            .field("spec", &self.spec)
            .field("apis", &self.apis)
            .field("committed", &self.committed)
            .finish()
    }
}
