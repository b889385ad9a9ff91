//! # fakeql - GraphQL mock and extension server
//!
//! fakeql serves a GraphQL API whose values are synthesized from the types and directives of
//! an SDL document. It can also sit in front of a real GraphQL server, extending its schema
//! with locally defined types and fields: the query is reduced to what the real server
//! knows, forwarded, and the answer is completed with synthesized values.
//!
//! ## Directives
//!
//! - `@fake(type:, options:, locale:)` picks a generator for a field or scalar
//! - `@examples(values:)` picks among literal values
//! - `@listLength(min:, max:)` bounds the length of generated lists
//! - `@override` lets an extension field replace the upstream field of the same name
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fakeql::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: request, response and value types, errors
//! - **Schema**: directive vocabulary, schema merging and the Working Schema store
//! - **Faker**: directive lookup and type-directed value synthesis
//! - **Execution**: GraphQL execution against a root value tree
//! - **Proxy**: query rewriting, upstream access, response reconciliation and the gateway
//! - **Adapters**: HTTP handlers
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod execution;
pub mod faker;
pub mod proxy;
pub mod schema;

use crate::adapters::graphql_handler;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use crate::adapters::sdl_handler::{self, SdlState};
use crate::proxy::Gateway;
use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `gateway` - Answers GraphQL requests against the current Working Schema
/// * `metrics` - Prometheus collector shared with the gateway
/// * `cors_origin` - Allowed origin, any origin when `None`
pub fn create_app(
    gateway: Arc<Gateway>,
    metrics: Arc<MetricsCollector>,
    cors_origin: Option<&str>,
) -> Router {
    let health_handler = Arc::new(HealthHandler::new(gateway.store().clone()));
    let metrics_handler = Arc::new(MetricsHandler::new(metrics.clone()));

    let ops_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }));

    let sdl_router = Router::new()
        .route(
            "/user-sdl",
            get(sdl_handler::get_user_sdl).post(sdl_handler::post_user_sdl),
        )
        .with_state(SdlState {
            store: gateway.store().clone(),
            metrics,
        });

    let graphql_router = Router::new()
        .route(
            "/graphql",
            get(graphql_handler::get_graphql).post(graphql_handler::post_graphql),
        )
        .with_state(gateway);

    let router = ops_router.merge(sdl_router).merge(graphql_router);

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let cors = match cors_origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => cors.allow_origin(AllowOrigin::exact(origin)),
        None => cors.allow_origin(Any),
    };
    router.layer(cors)
}
