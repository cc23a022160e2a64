use crate::framework::Framework;
use crate::schema::find;
use crate::spec::{
    ApiDeclaration, ApiDeclarationEntry, ApiSpec, FrameworkSpec, ModelSpec, OperationSpec,
    ResourceListing, ResourceListingEntry,
};
use std::collections::{BTreeMap, BTreeSet};

/// Transitive closure of the models used by `operations`.
///
/// Starts from the models the operations reference directly and keeps
/// adding the models referenced by the properties of every model found,
/// until a full pass adds nothing. Names missing from `known` are left out.
pub fn model_closure<'a>(
    operations: impl IntoIterator<Item = &'a OperationSpec>,
    known: &BTreeMap<String, ModelSpec>,
) -> BTreeMap<String, ModelSpec> {
    let mut pending: BTreeSet<String> = operations
        .into_iter()
        .flat_map(find::operation_models)
        .collect();
    let mut resolved = BTreeMap::new();
    loop {
        let mut added = false;
        let names: Vec<String> = pending
            .iter()
            .filter(|name| !resolved.contains_key(*name))
            .cloned()
            .collect();
        for name in names {
            if let Some(model) = known.get(&name) {
                pending.extend(find::model_references(model));
                resolved.insert(name, model.clone());
                added = true;
            }
        }
        if !added {
            break;
        }
    }
    resolved
}

#[derive(Debug, Clone)]
struct ResourceDoc {
    path: String,
    description: Option<String>,
    operations: Vec<OperationSpec>,
}

#[derive(Debug, Clone)]
struct ApiDoc {
    spec: ApiSpec,
    resources: Vec<ResourceDoc>,
}

/// Documentation view of a framework's declarations.
///
/// Holds its own copy of the declarations so it can be served from any
/// thread; renders the index and per-Api declarations on demand.
#[derive(Debug, Clone)]
pub struct Docs {
    spec: FrameworkSpec,
    apis: Vec<ApiDoc>,
    /// Every declared model, the Api's own taking precedence per declaration
    models: BTreeMap<String, ModelSpec>,
}

impl Docs {
    pub fn new(framework: &Framework) -> Self {
        let mut models = framework.models().clone();
        let apis = framework
            .apis()
            .iter()
            .map(|api| {
                for (id, model) in api.models() {
                    models.entry(id.clone()).or_insert_with(|| model.clone());
                }
                ApiDoc {
                    spec: api.spec().clone(),
                    resources: api
                        .resources()
                        .iter()
                        .map(|resource| ResourceDoc {
                            path: resource.path().to_string(),
                            description: resource.spec().description.clone(),
                            operations: resource
                                .operations()
                                .iter()
                                .map(|op| op.spec().clone())
                                .collect(),
                        })
                        .collect(),
                }
            })
            .collect();
        Docs {
            spec: framework.spec().clone(),
            apis,
            models,
        }
    }

    /// Resource paths of every declared Api.
    pub fn resource_paths(&self) -> impl Iterator<Item = &str> {
        self.apis.iter().map(|a| a.spec.resource_path.as_str())
    }

    /// The resource listing served at the docs root.
    pub fn index(&self) -> ResourceListing {
        ResourceListing {
            api_version: self.spec.api_version.clone(),
            swagger_version: self.spec.swagger_version.clone(),
            apis: self
                .apis
                .iter()
                .map(|api| ResourceListingEntry {
                    path: api.spec.resource_path.clone(),
                    description: api.spec.description.clone(),
                })
                .collect(),
            authorizations: self.spec.authorizations.clone(),
        }
    }

    /// The declaration of the Api at `resource_path`.
    pub fn declaration(&self, resource_path: &str) -> Option<ApiDeclaration> {
        let api = self
            .apis
            .iter()
            .find(|a| a.spec.resource_path == resource_path)?;
        let own = api.spec.clone();
        let operations = api.resources.iter().flat_map(|r| r.operations.iter());
        Some(ApiDeclaration {
            api_version: self.spec.api_version.clone(),
            swagger_version: self.spec.swagger_version.clone(),
            base_path: own
                .base_path
                .unwrap_or_else(|| self.spec.base_path.clone()),
            resource_path: own.resource_path,
            description: own.description.filter(|d| !d.is_empty()),
            consumes: own.consumes.filter(|c| !c.is_empty()),
            produces: own.produces.filter(|p| !p.is_empty()),
            authorizations: own.authorizations.filter(|a| !a.is_empty()),
            apis: api
                .resources
                .iter()
                .map(|r| ApiDeclarationEntry {
                    path: r.path.clone(),
                    description: r.description.clone(),
                    operations: r.operations.clone(),
                })
                .collect(),
            models: model_closure(operations, &self.models),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ParamType, ParameterSpec};
    use serde_json::json;

    fn known() -> BTreeMap<String, ModelSpec> {
        [
            ModelSpec::new("A").property("b", json!({"$ref": "B"})),
            ModelSpec::new("B").property("c", json!({"type": "array", "items": {"$ref": "C"}})),
            ModelSpec::new("C").property("d", json!({"type": "D"})),
            ModelSpec::new("Unused").property("name", json!({"type": "string"})),
        ]
        .into_iter()
        .map(|m| (m.id.clone(), m))
        .collect()
    }

    #[test]
    fn test_model_closure_is_transitive() {
        let op = OperationSpec::new("GET", "getA").type_name("A");
        let models = model_closure([&op], &known());
        assert_eq!(models.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_model_closure_from_parameters() {
        let op = OperationSpec::new("POST", "addB")
            .parameter(ParameterSpec::new("body", ParamType::Body, "B"));
        let models = model_closure([&op], &known());
        assert_eq!(models.keys().collect::<Vec<_>>(), vec!["B", "C"]);
    }

    #[test]
    fn test_model_closure_without_models() {
        let op = OperationSpec::new("GET", "ping");
        assert!(model_closure([&op], &known()).is_empty());
    }
}
