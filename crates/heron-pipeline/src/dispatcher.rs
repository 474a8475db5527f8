//! The fixed-order request dispatcher.
//!
//! A [`Dispatcher`] owns one instance of every stage, built once from a
//! [`SchemaRegistry`], a [`Backend`] and the handler and validator
//! registries. The order cannot be changed after construction.
//!
//! ```text
//! Negotiation → [Resolution → Network → TokenExtraction → Authentication →
//!                Payload → PreExecution → Execution → PostExecution] → Response
//! ```
//!
//! The bracketed stages are guarded: each runs only while the outcome is
//! success. They are also wrapped as a whole in panic recovery, so a panicking
//! hook or validator still yields a well-formed `INTERNAL_ERROR` response.

use crate::backend::{Backend, NoopBackend};
use crate::recovery;
use crate::registry::{HandlerRegistry, ValidatorRegistry};
use crate::response::{Response, ResponseBuilder};
use crate::stage::{PipelineStage, Stage};
use crate::stages::{
    Authentication, ContentNegotiation, Execution, NetworkGuard, PayloadValidation,
    PostExecution, PreExecution, Resolution, TokenExtraction,
};
use heron_core::{Outcome, RequestContext, SchemaRegistry};
use heron_telemetry::metrics;
use serde_json::Value;
use std::sync::Arc;

/// Runs requests through the fixed stage sequence.
///
/// # Example
///
/// ```
/// use heron_core::{fixtures, Outcome, RequestContext};
/// use heron_pipeline::Dispatcher;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let dispatcher = Dispatcher::builder(Arc::new(fixtures::sample_registry()))
///     .handler("list_users", |_ctx| Outcome::success(json!([{"id": 1}])))
///     .build();
///
/// let mut ctx = RequestContext::new("/users", "GET");
/// let response = dispatcher.handle(&mut ctx);
///
/// assert_eq!(response.status, 200);
/// assert_eq!(response.json().unwrap()["data"], json!([{"id": 1}]));
/// ```
pub struct Dispatcher {
    negotiation: ContentNegotiation,
    stages: Vec<Box<dyn PipelineStage>>,
    responses: ResponseBuilder,
}

impl Dispatcher {
    /// Starts building a dispatcher over a registry.
    #[must_use]
    pub fn builder(registry: Arc<SchemaRegistry>) -> DispatcherBuilder {
        DispatcherBuilder::new(registry)
    }

    /// Processes one request and returns its response.
    ///
    /// Always returns a response. The context is left in its final state, so
    /// callers can inspect the outcome, parameters and extensions afterwards.
    pub fn handle(&self, ctx: &mut RequestContext) -> Response {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %ctx.request_id(),
            http.method = %ctx.method(),
            http.path = %ctx.path(),
        );
        let _entered = span.enter();

        self.negotiation.process(ctx);

        if let Err(message) = recovery::catch(|| self.run_guarded(ctx)) {
            tracing::error!(panic = %message, "pipeline panicked");
            metrics::record_panic("pipeline");
            ctx.set_outcome(Outcome::internal_error(message));
        }

        let response = self.responses.build(ctx);
        let elapsed = ctx.elapsed();

        tracing::info!(
            code = %ctx.outcome().code,
            http.status_code = response.status,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "request dispatched"
        );
        metrics::record_request(&ctx.outcome().code, response.status, elapsed);

        response
    }

    /// Runs every guarded stage while the outcome stays successful.
    fn run_guarded(&self, ctx: &mut RequestContext) {
        for stage in &self.stages {
            if !ctx.is_successful() {
                break;
            }

            stage.process(ctx);

            if !ctx.is_successful() {
                let stage = stage.stage();
                tracing::debug!(stage = stage.name(), code = %ctx.outcome().code, "stage stopped the pipeline");
                if stage.is_pre_handler() {
                    metrics::record_rejection(stage.name(), &ctx.outcome().code);
                }
            }
        }
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = vec![self.negotiation.stage().name()];
        names.extend(self.stages.iter().map(|s| s.stage().name()));
        names.push(Stage::Response.name());
        names
    }

    /// Returns the response builder used for assembly.
    #[must_use]
    pub fn responses(&self) -> &ResponseBuilder {
        &self.responses
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    registry: Arc<SchemaRegistry>,
    backend: Arc<dyn Backend>,
    handlers: HandlerRegistry,
    validators: ValidatorRegistry,
}

impl DispatcherBuilder {
    /// Creates a builder with a [`NoopBackend`] and empty registries.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            backend: Arc::new(NoopBackend),
            handlers: HandlerRegistry::new(),
            validators: ValidatorRegistry::new(),
        }
    }

    /// Sets the backend hooks.
    #[must_use]
    pub fn backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    /// Sets a shared backend.
    #[must_use]
    pub fn shared_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = backend;
        self
    }

    /// Registers one handler.
    #[must_use]
    pub fn handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> Outcome + Send + Sync + 'static,
    {
        self.handlers.register(name, handler);
        self
    }

    /// Replaces the handler registry.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Registers one custom validator.
    #[must_use]
    pub fn validator<F>(mut self, id: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &RequestContext) -> Outcome + Send + Sync + 'static,
    {
        self.validators.register(id, validator);
        self
    }

    /// Replaces the validator registry.
    #[must_use]
    pub fn validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    /// Builds the dispatcher.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let stages: Vec<Box<dyn PipelineStage>> = vec![
            Box::new(Resolution::new(Arc::clone(&self.registry))),
            Box::new(NetworkGuard),
            Box::new(TokenExtraction),
            Box::new(Authentication::new(Arc::clone(&self.backend))),
            Box::new(PayloadValidation::new(self.validators)),
            Box::new(PreExecution::new(Arc::clone(&self.backend))),
            Box::new(Execution::new(self.handlers)),
            Box::new(PostExecution::new(self.backend)),
        ];

        tracing::debug!(
            resources = self.registry.resource_count(),
            codes = self.registry.code_count(),
            "dispatcher built"
        );

        Dispatcher {
            negotiation: ContentNegotiation,
            stages,
            responses: ResponseBuilder::new(self.registry),
        }
    }
}
