use std::sync::Arc;
use std::time::Instant;

use apollo_compiler::ast::OperationType;
use apollo_compiler::validation::{DiagnosticList, Valid};
use apollo_compiler::ExecutableDocument;
use axum::http::HeaderMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use super::client::{UpstreamClient, UpstreamRequest};
use super::reconcile::{reconcile, Reconciled};
use super::rewrite::rewrite;
use crate::adapters::metrics_handler::MetricsCollector;
use crate::domain::{GraphQLError, GraphQLRequest, GraphQLResponse, JsonMap, Location, ObjectValue};
use crate::execution::{execute, select_operation, ExecutionRequest, FakeResolver};
use crate::faker::FakerSettings;
use crate::schema::{SchemaStore, WorkingSchema};

/// Where a request is in its way through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    RewritingQuery,
    Forwarding,
    Reconciling,
    Executing,
    Responding,
    RespondingWithGlobalError,
}

/// Answers GraphQL requests against the current Working Schema.
///
/// In mock mode every field is synthesized locally. In proxy mode the query is reduced to
/// what the upstream server knows, forwarded once, and the upstream data becomes the root
/// value that local execution completes with synthesized values.
pub struct Gateway {
    store: Arc<SchemaStore>,
    upstream: Option<Arc<dyn UpstreamClient>>,
    faker: FakerSettings,
    forward_headers: Vec<String>,
    metrics: Arc<MetricsCollector>,
}

impl Gateway {
    pub fn new(
        store: Arc<SchemaStore>,
        upstream: Option<Arc<dyn UpstreamClient>>,
        faker: FakerSettings,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            upstream,
            faker,
            forward_headers: Vec::new(),
            metrics,
        }
    }

    /// Inbound header names copied onto forwarded requests
    pub fn with_forward_headers(mut self, names: Vec<String>) -> Self {
        self.forward_headers = names;
        self
    }

    pub fn store(&self) -> &Arc<SchemaStore> {
        &self.store
    }

    pub fn mode(&self) -> &'static str {
        if self.upstream.is_some() {
            "proxy"
        } else {
            "mock"
        }
    }

    pub async fn handle(&self, request: GraphQLRequest, headers: &HeaderMap) -> GraphQLResponse {
        let started = Instant::now();
        let mode = self.mode();
        let response = self.process(request, headers).await;

        let outcome = match (&response.data, response.errors.is_empty()) {
            (_, true) => "success",
            (Some(_), false) => "partial",
            (None, false) => "failure",
        };
        self.metrics
            .requests_total
            .with_label_values(&[mode, outcome])
            .inc();
        self.metrics
            .request_duration
            .with_label_values(&[mode])
            .observe(started.elapsed().as_secs_f64());
        response
    }

    async fn process(&self, request: GraphQLRequest, headers: &HeaderMap) -> GraphQLResponse {
        debug!(stage = ?Stage::Received, operation_name = ?request.operation_name);
        // the snapshot is kept for the whole request even if the schema is swapped meanwhile
        let schema = self.store.snapshot();
        let document = match ExecutableDocument::parse_and_validate(
            &schema.schema,
            &request.query,
            "request.graphql",
        ) {
            Ok(document) => document,
            Err(invalid) => return GraphQLResponse::from_errors(request_errors(&invalid.errors)),
        };
        let operation_name = request.operation_name.as_deref();
        let variables = request.variables.unwrap_or_default();

        let operation_type = match select_operation(&document, operation_name) {
            Ok(operation) => operation.operation_type,
            Err(error) => return GraphQLResponse::from_errors(vec![error]),
        };
        let upstream = match &self.upstream {
            Some(upstream) if operation_type != OperationType::Subscription => upstream,
            _ => {
                return self.execute_locally(
                    &schema,
                    &document,
                    operation_name,
                    &variables,
                    Reconciled {
                        root: ObjectValue::new(),
                        global_errors: Vec::new(),
                    },
                )
            }
        };

        debug!(stage = ?Stage::RewritingQuery);
        let rewritten = match rewrite(&schema, &document, operation_name, &variables) {
            Ok(rewritten) => rewritten,
            Err(error) => return GraphQLResponse::from_errors(vec![error]),
        };

        debug!(stage = ?Stage::Forwarding, query = %rewritten.query);
        let forwarded = upstream
            .execute(UpstreamRequest {
                query: rewritten.query,
                variables: rewritten.variables,
                operation_name: rewritten.operation_name,
                headers: self.forwarded_headers(headers),
            })
            .await;
        let upstream_response = match forwarded {
            Ok(response) => {
                self.metrics
                    .upstream_requests_total
                    .with_label_values(&["success"])
                    .inc();
                response
            }
            Err(error) => {
                self.metrics
                    .upstream_requests_total
                    .with_label_values(&["failure"])
                    .inc();
                warn!(%error, "Upstream request failed");
                debug!(stage = ?Stage::RespondingWithGlobalError);
                return GraphQLResponse::from_errors(vec![GraphQLError::new(error.to_string())]);
            }
        };

        debug!(stage = ?Stage::Reconciling);
        let reconciled = reconcile(upstream_response);
        for error in &reconciled.global_errors {
            warn!(message = %error.message, "Upstream returned an error without a path");
        }
        self.execute_locally(&schema, &document, operation_name, &variables, reconciled)
    }

    fn execute_locally(
        &self,
        schema: &WorkingSchema,
        document: &Valid<ExecutableDocument>,
        operation_name: Option<&str>,
        variables: &JsonMap,
        reconciled: Reconciled,
    ) -> GraphQLResponse {
        debug!(stage = ?Stage::Executing);
        let resolver = FakeResolver::new(schema, &self.faker, StdRng::from_entropy());
        let mut response = execute(
            ExecutionRequest {
                schema,
                document,
                operation_name,
                variables,
            },
            &reconciled.root,
            &resolver,
        );
        response.errors.extend(reconciled.global_errors);
        debug!(stage = ?Stage::Responding, errors = response.errors.len());
        response
    }

    fn forwarded_headers(&self, headers: &HeaderMap) -> Vec<(String, String)> {
        self.forward_headers
            .iter()
            .filter_map(|name| {
                let value = headers.get(name.as_str())?.to_str().ok()?;
                Some((name.to_ascii_lowercase(), value.to_string()))
            })
            .collect()
    }
}

/// Syntax and validation errors of a request document
fn request_errors(errors: &DiagnosticList) -> Vec<GraphQLError> {
    errors
        .iter()
        .map(|diagnostic| {
            let error = diagnostic.to_json();
            let locations: Vec<Location> = error
                .locations
                .iter()
                .map(|location| Location {
                    line: location.line,
                    column: location.column,
                })
                .collect();
            GraphQLError {
                message: error.message,
                locations: (!locations.is_empty()).then_some(locations),
                path: None,
                extensions: None,
            }
        })
        .collect()
}
