mod common;

use common::{body_json, petstore, request};
use serde_json::json;
use swagger_framework::docs::DocsRouter;
use swagger_framework::framework::Framework;
use swagger_framework::middleware::{handler, Outcome};
use swagger_framework::spec::{
    ApiSpec, FrameworkOptions, ModelSpec, OperationSpec, ParamType, ParameterSpec, ResourceSpec,
};

fn docs_router() -> DocsRouter {
    petstore().docs_dispatcher().unwrap()
}

#[test]
fn test_index_lists_every_api() {
    let router = docs_router();
    for path in ["/api-docs", "/api-docs/"] {
        let resp = router.dispatch(request("GET", path));
        assert_eq!(resp.status(), 200, "{}", path);
        assert_eq!(
            body_json(&resp),
            json!({
                "apiVersion": "1.0.0",
                "swaggerVersion": "1.2",
                "apis": [
                    { "path": "/pet", "description": "Operations about pets" },
                    { "path": "/store", "description": "Operations about store" }
                ]
            })
        );
    }
}

#[test]
fn test_declaration_includes_reachable_models_only() {
    let resp = docs_router().dispatch(request("GET", "/api-docs/store"));
    assert_eq!(resp.status(), 200);
    let body = body_json(&resp);
    assert_eq!(body["resourcePath"], "/store");
    assert_eq!(body["basePath"], "http://petstore.swagger.wordnik.com/api");
    assert_eq!(body["apis"][0]["path"], "/store/order/{orderId}");
    let models: Vec<&String> = body["models"].as_object().unwrap().keys().collect();
    assert_eq!(models, vec!["Order"]);
}

#[test]
fn test_pet_declaration_closure() {
    let docs = petstore().docs();
    let declaration = docs.declaration("/pet").unwrap();
    let ids: Vec<&str> = declaration.models.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["Category", "Pet", "Tag"]);
    assert_eq!(declaration.apis.len(), 4);
    assert_eq!(
        declaration.produces,
        Some(vec!["application/json".to_string(), "application/xml".to_string()])
    );
    assert!(docs.declaration("/user").is_none());
}

#[test]
fn test_docs_methods() {
    let router = docs_router();
    let resp = router.dispatch(request("POST", "/api-docs/pet"));
    assert_eq!(resp.status(), 405);
    assert_eq!(resp.headers()["allow"], "GET HEAD");

    let resp = router.dispatch(request("HEAD", "/api-docs/pet"));
    assert_eq!(resp.status(), 200);
    assert!(resp.body().is_empty());

    assert!(router.handle(request("GET", "/api-docs/user")).is_none());
    assert_eq!(router.dispatch(request("GET", "/api-docs/user")).status(), 404);
}

#[test]
fn test_custom_docs_path_and_framework_base_path() {
    let mut framework = Framework::new(
        FrameworkOptions::new("http://localhost:9000")
            .api_version("2.0")
            .docs_path("/docs/"),
    )
    .unwrap();
    framework
        .model(ModelSpec::new("User").property("name", json!({ "type": "string" })))
        .unwrap();
    framework
        .api(ApiSpec::new("/user"))
        .unwrap()
        .resource(ResourceSpec::new("/user"))
        .operation(
            OperationSpec::new("POST", "createUser")
                .parameter(ParameterSpec::new("body", ParamType::Body, "User")),
            handler(|_| Outcome::Continue),
        )
        .unwrap();

    let router = framework.docs_dispatcher().unwrap();
    assert_eq!(router.prefix(), "/docs");
    let resp = router.dispatch(request("GET", "/docs/user"));
    assert_eq!(resp.status(), 200);
    let body = body_json(&resp);
    assert_eq!(body["apiVersion"], "2.0");
    assert_eq!(body["basePath"], "http://localhost:9000");
    assert_eq!(body["models"]["User"]["id"], "User");
}

#[test]
fn test_service_routes_docs_and_api() {
    let service = petstore().service().unwrap();
    assert_eq!(service.call(request("GET", "/api-docs")).status(), 200);
    assert_eq!(service.call(request("GET", "/pet/3")).status(), 200);
    assert_eq!(service.call(request("GET", "/nowhere")).status(), 404);
}
