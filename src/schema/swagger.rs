//! JSON Schemas for the declaration documents themselves.
//!
//! Every entity validates its own declaration against one of these during
//! setup, so a malformed declaration fails before any request is served.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

fn mime_type_array() -> Value {
    json!({
        "type": "array",
        "items": { "type": "string", "pattern": "^[^/\\s]+/[^/\\s]+" },
        "uniqueItems": true,
    })
}

fn data_type_base() -> Value {
    json!({
        "type": { "type": "string" },
        "$ref": { "type": "string" },
        "format": { "type": "string" },
        "defaultValue": {},
        "enum": { "type": "array", "minItems": 1 },
        "minimum": { "type": ["string", "number"] },
        "maximum": { "type": ["string", "number"] },
        "items": {
            "type": "object",
            "properties": {
                "type": { "type": "string" },
                "$ref": { "type": "string" },
                "format": { "type": "string" },
            },
        },
        "uniqueItems": { "type": "boolean" },
    })
}

fn merge(base: Value, extra: Value) -> Value {
    let mut out = base;
    if let (Value::Object(target), Value::Object(source)) = (&mut out, extra) {
        target.extend(source);
    }
    out
}

pub static FRAMEWORK_OPTIONS: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["basePath"],
        "properties": {
            "basePath": { "type": "string", "minLength": 1 },
            "apiVersion": { "type": "string" },
            "authorizations": { "type": "object" },
            "docsPath": { "type": "string", "pattern": "^/" },
        },
    })
});

pub static API: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["resourcePath"],
        "properties": {
            "resourcePath": { "type": "string", "pattern": "^/" },
            "description": { "type": "string" },
            "basePath": { "type": "string" },
            "consumes": mime_type_array(),
            "produces": mime_type_array(),
            "authorizations": { "type": "object" },
        },
    })
});

pub static RESOURCE: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["path"],
        "properties": {
            "path": { "type": "string", "pattern": "^/" },
            "description": { "type": "string" },
        },
    })
});

pub static PARAMETER: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["paramType", "name"],
        "anyOf": [{ "required": ["type"] }, { "required": ["$ref"] }],
        "properties": merge(data_type_base(), json!({
            "paramType": { "enum": ["path", "query", "body", "header", "form"] },
            "name": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "required": { "type": "boolean" },
            "allowMultiple": { "type": "boolean" },
        })),
    })
});

pub static OPERATION: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["method", "nickname", "parameters"],
        "anyOf": [{ "required": ["type"] }, { "required": ["$ref"] }],
        "properties": merge(data_type_base(), json!({
            "method": { "enum": ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"] },
            "path": { "type": "string", "pattern": "^/" },
            "summary": { "type": "string", "maxLength": 120 },
            "notes": { "type": "string" },
            "nickname": { "type": "string", "pattern": "^[a-zA-Z0-9_]+$" },
            "authorizations": { "type": "object" },
            "parameters": { "type": "array", "items": PARAMETER.clone() },
            "responseMessages": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["code", "message"],
                    "properties": {
                        "code": { "type": "integer" },
                        "message": { "type": "string" },
                        "responseModel": { "type": "string" },
                    },
                },
            },
            "produces": mime_type_array(),
            "consumes": mime_type_array(),
            "deprecated": { "enum": ["true", "false"] },
        })),
    })
});

pub static MODEL: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["id", "properties"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "required": { "type": "array", "items": { "type": "string" }, "uniqueItems": true },
            "properties": {
                "type": "object",
                "additionalProperties": { "type": "object" },
            },
            "subTypes": { "type": "array", "items": { "type": "string" }, "uniqueItems": true },
            "discriminator": { "type": "string" },
        },
    })
});
