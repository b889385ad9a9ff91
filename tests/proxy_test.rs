//! Proxy mode against a wiremock upstream.
//!
//! The upstream answers introspection with a response produced by fakeql itself in mock mode,
//! so the introspection round trip runs through the same query text a real server receives.

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use cynic::QueryBuilder;
use cynic_introspection::query::IntrospectionQuery;
use fakeql::adapters::metrics_handler::MetricsCollector;
use fakeql::domain::GraphQLRequest;
use fakeql::faker::FakerSettings;
use fakeql::proxy::{Gateway, HttpUpstream, UpstreamClient};
use fakeql::schema::{MergeOptions, SchemaMode, SchemaStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REMOTE: &str = r#"
type Query {
  user(id: ID!): User
}

type User {
  id: ID!
  name: String
  email: String
}
"#;

const EXTENSION: &str = r#"
extend type User {
  pet: Pet
  email: String @override @fake(type: email)
}

type Pet {
  name: String @examples(values: ["Rex"])
}
"#;

/// The introspection response a server with `REMOTE` as its schema would send
async fn introspection_response() -> Value {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("remote.graphql");
    std::fs::write(&path, REMOTE).unwrap();
    let store = SchemaStore::open(SchemaMode::Mock, path, MergeOptions::default()).unwrap();
    let gateway = Gateway::new(
        Arc::new(store),
        None,
        FakerSettings::default(),
        Arc::new(MetricsCollector::new().unwrap()),
    );
    let operation = IntrospectionQuery::build(());
    let response = gateway
        .handle(
            GraphQLRequest {
                query: operation.query,
                ..Default::default()
            },
            &HeaderMap::new(),
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    serde_json::to_value(response).unwrap()
}

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("__schema"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(introspection_response().await))
        .mount(&server)
        .await;
    server
}

async fn proxy_app(server: &MockServer, dir: &TempDir) -> Router {
    let upstream = HttpUpstream::new(
        format!("{}/graphql", server.uri()),
        vec![("x-api-key".to_string(), "secret".to_string())],
        Duration::from_secs(5),
    )
    .unwrap();
    let remote_sdl = upstream.introspect().await.unwrap();

    let path = dir.path().join("schema_extension.faker.graphql");
    std::fs::write(&path, EXTENSION).unwrap();
    let store = SchemaStore::open(
        SchemaMode::Proxy { remote_sdl },
        path,
        MergeOptions::default(),
    )
    .unwrap();

    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let upstream: Arc<dyn UpstreamClient> = Arc::new(upstream);
    let gateway = Arc::new(
        Gateway::new(Arc::new(store), Some(upstream), FakerSettings::default(), metrics.clone())
            .with_forward_headers(vec!["authorization".to_string()]),
    );
    fakeql::create_app(gateway, metrics, None)
}

fn graphql(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/graphql")
        .method("POST")
        .header("Content-Type", "application/json")
        .header("Authorization", "Bearer token")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_introspected_schema_is_extended() {
    let server = upstream().await;
    let dir = TempDir::new().unwrap();
    let app = proxy_app(&server, &dir).await;

    let response = app
        .oneshot(Request::builder().uri("/user-sdl").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["schemaSDL"].as_str().unwrap().contains("type User"));
    assert_eq!(body["extensionSDL"], EXTENSION);
}

#[tokio::test]
async fn test_upstream_values_are_merged_with_local_fields() {
    let server = upstream().await;
    Mock::given(method("POST"))
        .and(body_string_contains("user"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "user": { "id": "7", "name": "Ann" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let app = proxy_app(&server, &dir).await;

    let response = app
        .oneshot(graphql(json!({
            "query": "query($id: ID!) { user(id: $id) { id name email pet { name } } }",
            "variables": { "id": "7" }
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.get("errors").is_none(), "{body}");

    let user = &body["data"]["user"];
    assert_eq!(user["id"], "7");
    assert_eq!(user["name"], "Ann");
    assert!(user["email"].as_str().unwrap().contains('@'));
    assert_eq!(user["pet"]["name"], "Rex");

    // the forwarded query only asks for what the upstream server knows
    let forwarded: Vec<Value> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter(|body| !body["query"].as_str().unwrap_or_default().contains("__schema"))
        .collect();
    assert_eq!(forwarded.len(), 1);
    let query = forwarded[0]["query"].as_str().unwrap();
    assert!(!query.contains("pet"));
    assert!(!query.contains("email"));
    assert_eq!(forwarded[0]["variables"], json!({ "id": "7" }));
}

#[tokio::test]
async fn test_upstream_errors_surface_at_their_path() {
    let server = upstream().await;
    Mock::given(method("POST"))
        .and(body_string_contains("user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "user": { "id": "7", "name": null } },
            "errors": [
                { "message": "name is private", "path": ["user", "name"] },
                { "message": "upstream degraded" }
            ]
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let app = proxy_app(&server, &dir).await;

    let response = app
        .oneshot(graphql(json!({ "query": r#"{ user(id: "7") { id name pet { name } } }"# })))
        .await
        .unwrap();
    let body = body_json(response).await;

    assert_eq!(body["data"]["user"]["name"], Value::Null);
    assert_eq!(body["data"]["user"]["pet"]["name"], "Rex");
    assert_eq!(
        body["errors"],
        json!([
            {
                "message": "name is private",
                "locations": [{ "line": 1, "column": 22 }],
                "path": ["user", "name"]
            },
            { "message": "upstream degraded" }
        ])
    );
}

#[tokio::test]
async fn test_unreachable_upstream_is_a_global_error() {
    let server = upstream().await;
    let dir = TempDir::new().unwrap();
    let app = proxy_app(&server, &dir).await;
    // only introspection is mocked, so the forwarded query gets a 404
    let response = app
        .oneshot(graphql(json!({ "query": r#"{ user(id: "7") { name } }"# })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body.get("data").is_none());
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["message"].as_str().unwrap().contains("404"));
}
