//! Raw body read plus form and body decoding with validation.

use super::core::{Context, Outcome, Stage};
use super::params::{normalize, validate_into, ParamInfo};
use crate::error::HandlerError;
use crate::schema::constants::MIME_FORM;
use crate::schema::{CompiledSchema, ValidateOptions};
use crate::server::encoder::essence;
use crate::server::{DecoderRegistry, Reply};
use crate::spec::ParamType;
use serde_json::Value;
use tracing::debug;

/// Accepts the request body if it fits under the limit, otherwise 413.
pub struct RawBodyStage {
    limit: usize,
}

impl RawBodyStage {
    pub fn new(limit: usize) -> Self {
        RawBodyStage { limit }
    }
}

impl Stage for RawBodyStage {
    fn name(&self) -> &str {
        "raw-body"
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        let body = ctx.take_body();
        if body.len() > self.limit {
            debug!(
                request_id = %ctx.request_id,
                size = body.len(),
                limit = self.limit,
                "Request body too large"
            );
            return Outcome::Respond(Reply::error(
                413,
                HandlerError::exposed(413, "Request body too large"),
            ));
        }
        ctx.raw_body = Some(body);
        Outcome::Continue
    }
}

fn is_form(ctx: &Context) -> bool {
    ctx.content_type()
        .map(|ct| essence(ct) == MIME_FORM)
        .unwrap_or(false)
}

fn decode_failed(message: String) -> Outcome {
    Outcome::Respond(Reply::error(
        400,
        HandlerError::exposed(400, format!("Invalid body: {}", message)),
    ))
}

/// Form decoding with coercive validation of the declared form parameters.
pub struct FormStage {
    schema: CompiledSchema,
    params: Vec<ParamInfo>,
    decoders: DecoderRegistry,
}

impl FormStage {
    pub fn new(schema: CompiledSchema, params: Vec<ParamInfo>, decoders: DecoderRegistry) -> Self {
        FormStage {
            schema,
            params,
            decoders,
        }
    }
}

impl Stage for FormStage {
    fn name(&self) -> &str {
        "form"
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        if !is_form(ctx) {
            return Outcome::Continue;
        }
        let Some(decoder) = self.decoders.get(MIME_FORM) else {
            return Outcome::Continue;
        };
        let raw = ctx.raw_body.as_deref().unwrap_or_default();
        let mut values = match decoder.decode(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => serde_json::Map::new(),
            Err(err) => return decode_failed(err.to_string()),
        };
        normalize(&mut values, &self.params);
        validate_into(
            ctx,
            &self.schema,
            ParamType::Form,
            Value::Object(values),
            ValidateOptions::coercive(),
        )
    }
}

/// Decodes the body with the decoder for its `Content-Type` and validates it strictly.
pub struct BodyStage {
    schema: CompiledSchema,
    decoders: DecoderRegistry,
}

impl BodyStage {
    pub fn new(schema: CompiledSchema, decoders: DecoderRegistry) -> Self {
        BodyStage { schema, decoders }
    }
}

impl Stage for BodyStage {
    fn name(&self) -> &str {
        "body"
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        if is_form(ctx) {
            return Outcome::Continue;
        }
        let raw = ctx.raw_body.as_deref().unwrap_or_default();
        let decoded = match ctx.content_type().map(|ct| self.decoders.get(ct)) {
            Some(Some(decoder)) if !raw.is_empty() => match decoder.decode(raw) {
                Ok(value) => Some(value),
                Err(err) => return decode_failed(err.to_string()),
            },
            Some(None) => return Outcome::Continue,
            _ => None,
        };

        let mut root = serde_json::Map::new();
        if let Some(value) = decoded {
            root.insert(ParamType::Body.as_str().to_string(), value);
        }
        let mut wrapper = Value::Object(root);
        if let Err(errors) = self.schema.validate(&mut wrapper, ValidateOptions::strict()) {
            debug!(
                request_id = %ctx.request_id,
                issues = errors.len(),
                "Body validation failed"
            );
            return super::params::validation_failed(errors);
        }
        if let Some(value) = wrapper
            .as_object_mut()
            .and_then(|o| o.remove(ParamType::Body.as_str()))
        {
            ctx.params.set(ParamType::Body, value);
        }
        Outcome::Continue
    }
}
