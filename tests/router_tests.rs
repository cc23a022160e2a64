mod common;

use common::{body_json, json_request, petstore, request};
use http::Method;
use serde_json::json;

#[test]
fn test_static_segment_beats_parameter() {
    let router = petstore().dispatcher().unwrap();
    let (route, params) = router.route(&Method::GET, "/pet/findByStatus").unwrap();
    assert_eq!(route.info.spec.nickname, "findPetsByStatus");
    assert!(params.is_empty());

    let (route, params) = router.route(&Method::GET, "/pet/12").unwrap();
    assert_eq!(route.info.spec.nickname, "getPetById");
    assert_eq!(params[0].1, "12");
}

#[test]
fn test_path_parameter_bounds() {
    let router = petstore().dispatcher().unwrap();
    let resp = router.dispatch(request("GET", "/pet/42"));
    assert_eq!(resp.status(), 200);
    let body = body_json(&resp);
    assert_eq!(body["nickname"], "getPetById");
    assert_eq!(body["path"], json!({ "petId": 42 }));

    let resp = router.dispatch(request("GET", "/pet/0"));
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(&resp)["errors"][0]["path"], "$.path.petId");
}

#[test]
fn test_multiple_query_values_with_default() {
    let router = petstore().dispatcher().unwrap();

    let resp = router.dispatch(request("GET", "/pet/findByStatus"));
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(&resp)["query"], json!({ "status": ["available"] }));

    let resp = router.dispatch(request("GET", "/pet/findByStatus?status=sold&status=pending"));
    assert_eq!(resp.status(), 200);
    assert_eq!(
        body_json(&resp)["query"],
        json!({ "status": ["sold", "pending"] })
    );

    let resp = router.dispatch(request("GET", "/pet/findByStatus?status=lost"));
    assert_eq!(resp.status(), 400);
}

#[test]
fn test_missing_required_query_is_400() {
    let router = petstore().dispatcher().unwrap();
    let resp = router.dispatch(request("GET", "/pet/findByTags"));
    assert_eq!(resp.status(), 400);
    let body = body_json(&resp);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["path"], "$.query.tags");
}

#[test]
fn test_accept_negotiation() {
    let router = petstore().dispatcher().unwrap();

    let req = http::Request::builder()
        .uri("/pet/1")
        .header("accept", "application/xml")
        .body(Vec::new())
        .unwrap();
    let resp = router.dispatch(req);
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/xml"));

    let req = http::Request::builder()
        .uri("/pet/1")
        .header("accept", "text/html")
        .body(Vec::new())
        .unwrap();
    let resp = router.dispatch(req);
    assert_eq!(resp.status(), 406);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
}

#[test]
fn test_unsupported_content_type_is_415() {
    let router = petstore().dispatcher().unwrap();
    let req = http::Request::builder()
        .method("POST")
        .uri("/pet")
        .header("content-type", "text/plain")
        .body(b"rex".to_vec())
        .unwrap();
    let resp = router.dispatch(req);
    assert_eq!(resp.status(), 415);
    let message = body_json(&resp)["message"].as_str().unwrap().to_string();
    assert!(message.contains("application/json"), "{}", message);
}

#[test]
fn test_body_validation() {
    let router = petstore().dispatcher().unwrap();
    let pet = json!({
        "id": 1,
        "name": "rex",
        "category": { "id": 2, "name": "dogs" },
        "tags": [{ "id": 3, "name": "good" }],
        "status": "available"
    });
    let resp = router.dispatch(json_request("POST", "/pet", pet.clone()));
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(&resp)["body"], pet);

    let resp = router.dispatch(json_request(
        "POST",
        "/pet",
        json!({ "id": 1, "name": "rex", "tags": [{ "id": "three" }] }),
    ));
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(&resp)["errors"][0]["path"], "$.body.tags[0].id");
}

#[test]
fn test_body_is_not_coerced() {
    let router = petstore().dispatcher().unwrap();
    let resp = router.dispatch(json_request("PUT", "/pet", json!({ "id": "1", "name": "rex" })));
    assert_eq!(resp.status(), 400);
}

#[test]
fn test_missing_required_body_is_400() {
    let router = petstore().dispatcher().unwrap();
    let req = http::Request::builder()
        .method("PUT")
        .uri("/pet")
        .body(Vec::new())
        .unwrap();
    assert_eq!(router.dispatch(req).status(), 400);
}

#[test]
fn test_body_limit_is_413() {
    let mut framework = petstore();
    framework.body_limit(16).unwrap();
    let router = framework.dispatcher().unwrap();
    let resp = router.dispatch(json_request(
        "POST",
        "/pet",
        json!({ "id": 1, "name": "a name well over sixteen bytes" }),
    ));
    assert_eq!(resp.status(), 413);
    assert_eq!(body_json(&resp), json!({ "message": "Request body too large" }));
}

#[test]
fn test_form_values_are_coerced() {
    let router = petstore().dispatcher().unwrap();
    let req = http::Request::builder()
        .method("POST")
        .uri("/pet/5")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(b"name=rex&status=sold".to_vec())
        .unwrap();
    let resp = router.dispatch(req);
    assert_eq!(resp.status(), 200);
    let body = body_json(&resp);
    assert_eq!(body["path"], json!({ "petId": 5 }));
    assert_eq!(body["form"], json!({ "name": "rex", "status": "sold" }));
}

#[test]
fn test_method_handling_on_petstore() {
    let router = petstore().dispatcher().unwrap();

    let resp = router.dispatch(request("OPTIONS", "/pet/1"));
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["allow"], "GET POST DELETE");

    let resp = router.dispatch(request("PATCH", "/pet/1"));
    assert_eq!(resp.status(), 405);
    assert_eq!(resp.headers()["allow"], "GET POST DELETE");

    let resp = router.dispatch(request("HEAD", "/pet/1"));
    assert_eq!(resp.status(), 200);
    assert!(resp.body().is_empty());

    assert_eq!(router.dispatch(request("GET", "/user/1")).status(), 404);
}

#[test]
fn test_store_declared_in_yaml() {
    let router = petstore().dispatcher().unwrap();
    let resp = router.dispatch(request("GET", "/store/order/abc"));
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(&resp)["path"], json!({ "orderId": "abc" }));
}

#[test]
fn test_echo_handler_reports_params() {
    let mut framework = swagger_framework::spec::load_declarations(
        &common::petstore_dir(),
        None,
        |_| swagger_framework::echo::echo_handler(),
    )
    .unwrap();
    let router = framework.dispatcher().unwrap();
    let resp = router.dispatch(request("GET", "/pet/findByTags?tags=a&tags=b"));
    assert_eq!(resp.status(), 200);
    let body = body_json(&resp);
    assert_eq!(body["nickname"], "findPetsByTags");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/pet/findByTags");
    assert_eq!(body["params"]["query"], json!({ "tags": ["a", "b"] }));
    assert_eq!(body["params"]["body"], serde_json::Value::Null);
}
