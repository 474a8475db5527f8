//! Payload parsing and parameter validation.
//!
//! Validation happens in three steps:
//!
//! 1. [`parse_body`] decodes a JSON object body for body-bearing methods.
//! 2. [`validate_parameters`] checks every declared parameter against its
//!    source and collects *all* missing and invalid parameters before failing.
//! 3. [`run_validators`] runs the custom validators of the accepted values and
//!    stops at the first failure.

use crate::registry::ValidatorRegistry;
use heron_core::{codes, Outcome, ParamKind, ParamSource, ParameterSpec, RequestContext, ValueKind};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Methods whose body is never read.
const BODYLESS_METHODS: [&str; 2] = ["GET", "HEAD"];

/// Decodes the request body into a JSON object.
///
/// Returns `Ok(None)` when the body is empty or the method does not carry one.
///
/// # Errors
///
/// - [`codes::UNSUPPORTED_CONTENT_TYPE`] when a non-JSON response format was
///   negotiated; the payload is the `Accept` header value
/// - [`codes::MALFORMED_BODY`] when the body is not JSON; the payload is the
///   decoder message
/// - [`codes::BODY_NOT_OBJECT`] when the JSON is not an object
pub fn parse_body(ctx: &RequestContext) -> Result<Option<Map<String, Value>>, Outcome> {
    if ctx.body().is_empty() || BODYLESS_METHODS.contains(&ctx.method()) {
        return Ok(None);
    }

    if ctx.negotiated_content_type() != heron_core::ContentType::Json {
        let accept = ctx.header("accept").map_or(Value::Null, Value::from);
        return Err(Outcome::new(codes::UNSUPPORTED_CONTENT_TYPE).with_data(accept));
    }

    let value: Value = serde_json::from_slice(ctx.body())
        .map_err(|e| Outcome::new(codes::MALFORMED_BODY).with_data(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(Outcome::new(codes::BODY_NOT_OBJECT)),
    }
}

/// Returns true if `value` satisfies the kind and refinements of `spec`.
///
/// `null` is accepted only for optional parameters, and then skips the
/// refinements.
#[must_use]
pub fn check_value(spec: &ParameterSpec, value: &Value) -> bool {
    let kind = ValueKind::of(value);
    if kind == ValueKind::Null {
        return !spec.required;
    }
    if !spec.kind.accepts(kind) {
        return false;
    }

    match (spec.kind, value) {
        (ParamKind::Enum, Value::String(s)) => spec.options.iter().any(|option| option == s),
        (ParamKind::String, Value::String(s)) => {
            spec.max_length == 0 || s.chars().count() <= spec.max_length
        }
        _ => true,
    }
}

/// Validates every declared parameter against its source.
///
/// Query values are always strings. A parameter absent from its source is
/// reported as missing, whatever its `required` flag.
///
/// # Errors
///
/// [`codes::INVALID_PARAMETERS`] with `{"missing": [spec..], "invalid": [spec..]}`
/// when at least one parameter is missing or invalid.
pub fn validate_parameters(
    specs: &[ParameterSpec],
    query: &HashMap<String, String>,
    body: Option<&Map<String, Value>>,
) -> Result<Map<String, Value>, Outcome> {
    let mut accepted = Map::new();
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for spec in specs {
        let value = match spec.source {
            ParamSource::Query => query.get(&spec.name).map(|v| Value::String(v.clone())),
            ParamSource::Body => body.and_then(|b| b.get(&spec.name)).cloned(),
        };

        let Some(value) = value else {
            missing.push(spec);
            continue;
        };

        if check_value(spec, &value) {
            accepted.insert(spec.name.clone(), value);
        } else {
            invalid.push(spec);
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        return Ok(accepted);
    }

    tracing::debug!(
        missing = missing.len(),
        invalid = invalid.len(),
        "parameter validation failed"
    );

    Err(Outcome::new(codes::INVALID_PARAMETERS).with_data(json!({
        "missing": missing,
        "invalid": invalid,
    })))
}

/// Runs the custom validators of every accepted, non-null parameter.
///
/// Parameters run in declaration order and validators in list order. An
/// outcome without a code counts as success.
///
/// # Errors
///
/// The first failing outcome, with its code and message key preserved and its
/// payload wrapped as `{"parameter", "validator", "input", "error"}`.
/// [`codes::VALIDATOR_UNIMPLEMENTED`] if an identifier is not registered.
pub fn run_validators(
    specs: &[ParameterSpec],
    ctx: &RequestContext,
    validators: &ValidatorRegistry,
) -> Result<(), Outcome> {
    for spec in specs {
        let Some(input) = ctx.parameter(&spec.name) else {
            continue;
        };
        if input.is_null() {
            continue;
        }

        for id in &spec.validators {
            let Some(validator) = validators.get(id) else {
                tracing::warn!(parameter = %spec.name, validator = %id, "validator not registered");
                return Err(
                    Outcome::new(codes::VALIDATOR_UNIMPLEMENTED).with_data(json!({
                        "parameter": spec,
                        "validator": id,
                    })),
                );
            };

            let result = validator(input, ctx).normalized();
            if !result.is_ok() {
                return Err(Outcome {
                    data: json!({
                        "parameter": spec,
                        "validator": id,
                        "input": input,
                        "error": result.data,
                    }),
                    ..result
                });
            }
        }
    }

    Ok(())
}
