use serde_json::{json, Value};
use swagger_framework::schema::{coerce, find, transform, SchemaEnvironment, ValidateOptions};
use swagger_framework::spec::{ModelSpec, OperationSpec, ParamType, ParameterSpec};

fn environment() -> SchemaEnvironment {
    let mut env = SchemaEnvironment::new();
    let tag = ModelSpec::new("Tag").property("name", json!({ "type": "string" }));
    let pet = ModelSpec::new("Pet")
        .property("name", json!({ "type": "string" }))
        .property("tags", json!({ "type": "array", "items": { "$ref": "Tag" } }))
        .property("owner", json!({ "type": "Person" }))
        .required(&["name"]);
    let person = ModelSpec::new("Person").property("age", json!({ "type": "integer", "format": "int32" }));
    for model in [tag, pet, person] {
        env.add_schema(model.id.clone(), transform::model(&model).unwrap());
    }
    env
}

#[test]
fn test_model_transform_turns_types_into_refs() {
    let person = ModelSpec::new("Person").property("age", json!({ "type": "integer", "format": "int32" }));
    assert_eq!(
        transform::model(&person).unwrap(),
        json!({ "properties": { "age": { "type": "integer" } } })
    );
    let env = environment();
    assert_eq!(
        env.get_schema("Pet").unwrap()["properties"]["owner"],
        json!({ "$ref": "Person" })
    );
}

#[test]
fn test_compile_embeds_transitive_models() {
    let env = environment();
    let compiled = env.compile(&json!({ "$ref": "Pet" }), "test").unwrap();
    let definitions = compiled.schema()["definitions"].as_object().unwrap();
    let mut ids: Vec<&String> = definitions.keys().collect();
    ids.sort();
    assert_eq!(ids, vec!["Person", "Pet", "Tag"]);

    assert!(compiled.is_valid(&json!({ "name": "rex", "owner": { "age": 3 } })));
    assert!(!compiled.is_valid(&json!({ "owner": { "age": 3 } })));
    assert!(!compiled.is_valid(&json!({ "name": "rex", "tags": [{ "name": 1 }] })));
}

#[test]
fn test_compile_unknown_model_fails() {
    let env = environment();
    assert!(env.compile(&json!({ "$ref": "Order" }), "test").is_err());
}

#[test]
fn test_coercive_validation_fills_defaults() {
    let env = environment();
    let op = OperationSpec::new("GET", "find")
        .parameter(ParameterSpec::new("limit", ParamType::Query, "integer").default_value(json!(10)))
        .parameter(ParameterSpec::new("active", ParamType::Query, "boolean"))
        .parameter(
            ParameterSpec::new("tag", ParamType::Query, "string")
                .allow_multiple(true)
                .required(true),
        );
    let schema = transform::parameters(&op, ParamType::Query).unwrap().unwrap();
    let mut data = json!({ "query": { "active": "false", "tag": "a" } });
    env.validate(&schema, &mut data, ValidateOptions::coercive()).unwrap();
    assert_eq!(
        data,
        json!({ "query": { "limit": 10, "active": false, "tag": ["a"] } })
    );

    let mut missing = json!({ "query": {} });
    let errors = env
        .validate(&schema, &mut missing, ValidateOptions::coercive())
        .unwrap_err();
    assert_eq!(errors.issues()[0].path, "$.query.tag");
}

#[test]
fn test_strict_validation_does_not_coerce() {
    let env = environment();
    let schema = json!({ "type": "object", "properties": { "n": { "type": "integer" } } });
    let mut data = json!({ "n": "5" });
    assert!(env.validate(&schema, &mut data, ValidateOptions::strict()).is_err());
    let mut data = json!({ "n": "5" });
    assert!(env.validate(&schema, &mut data, ValidateOptions::coercive()).is_ok());
    assert_eq!(data, json!({ "n": 5 }));
}

#[test]
fn test_coerce_rules() {
    let cases: Vec<(&str, Value, Value)> = vec![
        ("integer", json!("42"), json!(42)),
        ("integer", json!("4.2"), json!("4.2")),
        ("number", json!("-1.5"), json!(-1.5)),
        ("boolean", json!("0"), json!(false)),
        ("boolean", json!("yes"), json!(true)),
        ("array", json!("x"), json!(["x"])),
        ("string", json!(7), json!("7")),
    ];
    for (type_name, mut value, expected) in cases {
        coerce(type_name, &mut value);
        assert_eq!(value, expected, "{}", type_name);
    }
}

#[test]
fn test_find_operation_models() {
    let mut op = OperationSpec::new("GET", "list")
        .type_name("array")
        .parameter(ParameterSpec::new("body", ParamType::Body, "Pet"));
    op.items = Some(json!({ "$ref": "Tag" }));
    let found: Vec<String> = find::operation_models(&op).into_iter().collect();
    assert_eq!(found, vec!["Pet", "Tag"]);
}
