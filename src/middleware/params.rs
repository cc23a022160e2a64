//! Extraction and coercive validation of header, path and query parameters.

use super::core::{Context, Outcome, Stage};
use crate::error::HandlerError;
use crate::schema::{CompiledSchema, ValidateOptions};
use crate::server::request::{header_param, parse_query_params};
use crate::server::Reply;
use crate::spec::{ParamType, ParameterSpec};
use crate::validator::ValidationErrors;
use serde_json::{Map, Value};
use tracing::debug;

/// What a stage needs to know about one declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub multiple: bool,
    /// Empty strings count as absent for numeric parameters
    pub numeric: bool,
}

impl From<&ParameterSpec> for ParamInfo {
    fn from(spec: &ParameterSpec) -> Self {
        ParamInfo {
            name: spec.name.clone(),
            multiple: spec.is_multiple(),
            numeric: matches!(spec.data_type(), Some("integer") | Some("number")),
        }
    }
}

/// 400 reply carrying every validation issue.
pub fn validation_failed(errors: ValidationErrors) -> Outcome {
    Outcome::Respond(Reply::error(
        400,
        HandlerError::exposed(400, "Validation failed").with_errors(errors.into_issues()),
    ))
}

/// Validate `values` under `location` and store the result on the context.
pub(crate) fn validate_into(
    ctx: &mut Context,
    schema: &CompiledSchema,
    location: ParamType,
    values: Value,
    options: ValidateOptions,
) -> Outcome {
    let mut root = Map::new();
    root.insert(location.as_str().to_string(), values);
    let mut wrapper = Value::Object(root);
    if let Err(errors) = schema.validate(&mut wrapper, options) {
        debug!(
            request_id = %ctx.request_id,
            location = %location,
            issues = errors.len(),
            "Request validation failed"
        );
        return validation_failed(errors);
    }
    let validated = wrapper
        .as_object_mut()
        .and_then(|o| o.remove(location.as_str()))
        .unwrap_or(Value::Null);
    ctx.params.set(location, validated);
    Outcome::Continue
}

/// Drop empty strings for numeric parameters so defaults and `required` apply.
pub(crate) fn normalize(values: &mut Map<String, Value>, params: &[ParamInfo]) {
    values.retain(|name, value| {
        let Some(info) = params.iter().find(|p| &p.name == name) else {
            return false;
        };
        !(info.numeric && value.as_str() == Some(""))
    });
}

/// Header, path or query extraction followed by coercive validation.
pub struct ParamStage {
    location: ParamType,
    schema: CompiledSchema,
    params: Vec<ParamInfo>,
}

impl ParamStage {
    pub fn new(location: ParamType, schema: CompiledSchema, params: Vec<ParamInfo>) -> Self {
        ParamStage {
            location,
            schema,
            params,
        }
    }

    fn extract(&self, ctx: &Context) -> Map<String, Value> {
        let mut values = match self.location {
            ParamType::Header => self
                .params
                .iter()
                .filter_map(|p| {
                    header_param(&ctx.headers, &p.name, p.multiple).map(|v| (p.name.clone(), v))
                })
                .collect(),
            ParamType::Path => ctx
                .path_params
                .iter()
                .map(|(name, raw)| {
                    let decoded = urlencoding::decode(raw)
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| raw.clone());
                    (name.to_string(), Value::String(decoded))
                })
                .collect(),
            _ => parse_query_params(&ctx.target),
        };
        normalize(&mut values, &self.params);
        values
    }
}

impl Stage for ParamStage {
    fn name(&self) -> &str {
        self.location.as_str()
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        let values = self.extract(ctx);
        validate_into(
            ctx,
            &self.schema,
            self.location,
            Value::Object(values),
            ValidateOptions::coercive(),
        )
    }
}
