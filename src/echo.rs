use crate::middleware::{handler, Context, Outcome, Stage};
use crate::server::Reply;
use serde_json::{json, Value};
use std::sync::Arc;

/// Reply with what the stages extracted for this request.
///
/// Used by `swagger-framework serve` for every declared operation so a set
/// of declarations can be exercised before real handlers exist.
pub fn echo(ctx: &mut Context) -> Outcome {
    let params = &ctx.params;
    Reply::json(
        200,
        json!({
            "nickname": ctx.operation.spec.nickname,
            "method": ctx.method.as_str(),
            "path": ctx.path(),
            "params": {
                "header": params.header.clone().unwrap_or(Value::Null),
                "path": params.path.clone().unwrap_or(Value::Null),
                "query": params.query.clone().unwrap_or(Value::Null),
                "form": params.form.clone().unwrap_or(Value::Null),
                "body": params.body.clone().unwrap_or(Value::Null),
            },
        }),
    )
    .into()
}

/// [`echo`] as a handler stage.
pub fn echo_handler() -> Arc<dyn Stage> {
    handler(echo)
}
