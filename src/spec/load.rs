use super::types::{
    ApiDeclaration, ApiSpec, FrameworkOptions, OperationSpec, ResourceListing, ResourceSpec,
};
use crate::framework::Framework;
use crate::middleware::Stage;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A resource listing plus the declaration of every Api it lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarations {
    pub listing: ResourceListing,
    pub apis: Vec<ApiDeclaration>,
}

/// Read a JSON or YAML document, chosen by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str(&content).map_err(anyhow::Error::from)
    } else {
        serde_json::from_str(&content).map_err(anyhow::Error::from)
    };
    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

/// `dir/<stem>.json`, `.yaml` or `.yml`, whichever exists first.
pub fn find_document(dir: &Path, stem: &str) -> Result<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
        .ok_or_else(|| anyhow!("no {}.json or {}.yaml in {}", stem, stem, dir.display()))
}

/// File stem for a listed api path: `/pet` and `/pet.{format}` map to `pet`.
fn document_stem(path: &str) -> &str {
    let path = path.trim_start_matches('/');
    path.strip_suffix(".{format}").unwrap_or(path)
}

/// Read `index` and one declaration per listed api from `dir`.
pub fn read_declarations(dir: &Path) -> Result<Declarations> {
    let listing: ResourceListing = read_document(&find_document(dir, "index")?)?;
    let apis = listing
        .apis
        .iter()
        .map(|entry| {
            let path = find_document(dir, document_stem(&entry.path))?;
            read_document::<ApiDeclaration>(&path)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Declarations { listing, apis })
}

impl Declarations {
    /// Options derived from the documents themselves.
    pub fn default_options(&self) -> FrameworkOptions {
        let base_path = self
            .apis
            .iter()
            .map(|a| a.base_path.as_str())
            .find(|b| !b.is_empty())
            .unwrap_or("/")
            .to_string();
        let mut options = FrameworkOptions::new(base_path);
        if !self.listing.api_version.is_empty() {
            options = options.api_version(self.listing.api_version.clone());
        }
        if !self.listing.authorizations.is_empty() {
            options = options.authorizations(self.listing.authorizations.clone());
        }
        options
    }

    /// Declare everything on a new framework; `handlers` supplies the
    /// handler for each operation.
    pub fn build<F>(&self, options: FrameworkOptions, handlers: F) -> Result<Framework>
    where
        F: Fn(&OperationSpec) -> Arc<dyn Stage>,
    {
        let mut framework = Framework::new(options)?;
        for decl in &self.apis {
            let description = self
                .listing
                .apis
                .iter()
                .find(|e| document_stem(&e.path) == document_stem(&decl.resource_path))
                .and_then(|e| e.description.clone())
                .or_else(|| decl.description.clone());
            let api = framework.api(ApiSpec {
                resource_path: decl.resource_path.clone(),
                description,
                base_path: Some(decl.base_path.clone()).filter(|b| !b.is_empty()),
                consumes: decl.consumes.clone(),
                produces: decl.produces.clone(),
                authorizations: decl.authorizations.clone(),
            })?;
            for (id, model) in &decl.models {
                let mut model = model.clone();
                if model.id.is_empty() {
                    model.id = id.clone();
                }
                api.model(model)?;
            }
            for entry in &decl.apis {
                let resource = api.resource(ResourceSpec {
                    path: entry.path.clone(),
                    description: entry.description.clone(),
                });
                for op in &entry.operations {
                    resource.operation(op.clone(), handlers(op))?;
                }
            }
        }
        Ok(framework)
    }
}

/// Load a directory of declarations into a framework.
///
/// `options` defaults to [`Declarations::default_options`].
pub fn load_declarations<F>(
    dir: &Path,
    options: Option<FrameworkOptions>,
    handlers: F,
) -> Result<Framework>
where
    F: Fn(&OperationSpec) -> Arc<dyn Stage>,
{
    let declarations = read_declarations(dir)?;
    let options = options.unwrap_or_else(|| declarations.default_options());
    let framework = declarations.build(options, handlers)?;
    info!(
        dir = %dir.display(),
        apis_count = declarations.apis.len(),
        "Loaded declarations"
    );
    Ok(framework)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem("/pet"), "pet");
        assert_eq!(document_stem("/pet.{format}"), "pet");
        assert_eq!(document_stem("/store/order"), "store/order");
    }
}
