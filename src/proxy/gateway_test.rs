use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use tempfile::TempDir;

use super::{Gateway, UpstreamClient, UpstreamRequest, UpstreamResponse};
use crate::adapters::metrics_handler::MetricsCollector;
use crate::domain::{GraphQLRequest, UpstreamError};
use crate::faker::FakerSettings;
use crate::schema::{MergeOptions, SchemaMode, SchemaStore};

const REMOTE: &str = r#"
    type Query {
      user(id: ID!): User
    }

    type User {
      id: ID!
      name: String
    }
"#;

const EXTENSION: &str = r#"
    extend type User {
      pet: Pet
    }

    type Pet {
      name: String @fake(type: firstName)
    }
"#;

/// Replays one canned upstream answer and records what was sent
struct StubUpstream {
    reply: Result<Value, String>,
    sent: Mutex<Vec<UpstreamRequest>>,
}

impl StubUpstream {
    fn replying(body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(body),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<UpstreamRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.sent.lock().unwrap().push(request);
        match &self.reply {
            Ok(body) => Ok(serde_json::from_value(body.clone()).unwrap()),
            Err(message) => Err(UpstreamError::Transport(message.clone())),
        }
    }
}

struct Fixture {
    _dir: TempDir,
    gateway: Gateway,
    metrics: Arc<MetricsCollector>,
}

fn proxy(upstream: Arc<StubUpstream>) -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("extension.graphql");
    std::fs::write(&path, EXTENSION).unwrap();
    let store = SchemaStore::open(
        SchemaMode::Proxy {
            remote_sdl: REMOTE.to_string(),
        },
        path,
        MergeOptions::default(),
    )
    .unwrap();
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let gateway = Gateway::new(
        Arc::new(store),
        Some(upstream),
        FakerSettings::default(),
        metrics.clone(),
    )
    .with_forward_headers(vec!["Authorization".to_string()]);
    Fixture {
        _dir: dir,
        gateway,
        metrics,
    }
}

fn request(query: &str) -> GraphQLRequest {
    GraphQLRequest {
        query: query.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_upstream_data_is_completed_with_extension_fields() {
    let upstream = StubUpstream::replying(json!({
        "data": { "user": { "id": "1", "name": "Ann" } }
    }));
    let fixture = proxy(upstream.clone());

    let response = fixture
        .gateway
        .handle(
            request(r#"{ user(id: "1") { id name pet { name } } }"#),
            &HeaderMap::new(),
        )
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let user = &response.data.as_ref().unwrap()["user"];
    assert_eq!(user["id"], "1");
    assert_eq!(user["name"], "Ann");
    assert!(user["pet"]["name"].as_str().is_some_and(|name| !name.is_empty()));

    let sent = upstream.sent();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].query.contains("pet"));
}

#[tokio::test]
async fn test_upstream_field_errors_are_reraised_in_place() {
    let upstream = StubUpstream::replying(json!({
        "data": { "user": { "id": "1", "name": null } },
        "errors": [
            { "message": "name is private", "path": ["user", "name"], "extensions": { "code": "FORBIDDEN" } },
            { "message": "slow down" }
        ]
    }));
    let fixture = proxy(upstream);

    let response = fixture
        .gateway
        .handle(request(r#"{ user(id: "1") { id name } }"#), &HeaderMap::new())
        .await;

    let data = response.data.as_ref().unwrap();
    assert_eq!(data["user"]["id"], "1");
    assert_eq!(data["user"]["name"], Value::Null);

    let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["name is private", "slow down"]);
    assert_eq!(
        serde_json::to_value(&response.errors[0].path).unwrap(),
        json!(["user", "name"])
    );
    assert_eq!(response.errors[0].extensions.as_ref().unwrap()["code"], "FORBIDDEN");
    assert!(response.errors[1].path.is_none());
}

#[tokio::test]
async fn test_transport_failure_is_one_global_error() {
    let fixture = proxy(StubUpstream::failing("connection refused"));

    let response = fixture
        .gateway
        .handle(request(r#"{ user(id: "1") { name } }"#), &HeaderMap::new())
        .await;

    assert!(response.data.is_none());
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.contains("connection refused"));

    let metrics = fixture.metrics.encode().unwrap();
    assert!(metrics.contains(r#"fakeql_upstream_requests_total{outcome="failure"} 1"#));
}

#[tokio::test]
async fn test_invalid_queries_are_not_forwarded() {
    let upstream = StubUpstream::replying(json!({ "data": {} }));
    let fixture = proxy(upstream.clone());

    let response = fixture
        .gateway
        .handle(request("{ user { unknownField } }"), &HeaderMap::new())
        .await;

    assert!(response.data.is_none());
    assert!(!response.errors.is_empty());
    assert!(upstream.sent().is_empty());
}

#[tokio::test]
async fn test_listed_headers_are_forwarded() {
    let upstream = StubUpstream::replying(json!({ "data": { "user": null } }));
    let fixture = proxy(upstream.clone());
    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("Bearer token"));
    headers.insert("cookie", HeaderValue::from_static("session=1"));

    fixture
        .gateway
        .handle(request(r#"{ user(id: "1") { name } }"#), &headers)
        .await;

    assert_eq!(
        upstream.sent()[0].headers,
        vec![("authorization".to_string(), "Bearer token".to_string())]
    );
}

#[tokio::test]
async fn test_extension_only_query_still_reaches_upstream_with_typename() {
    let upstream = StubUpstream::replying(json!({ "data": { "__typename": "Query" } }));
    let fixture = proxy(upstream.clone());

    let response = fixture
        .gateway
        .handle(request("{ __typename }"), &HeaderMap::new())
        .await;

    assert_eq!(response.data, Some(json!({ "__typename": "Query" })));
    assert!(upstream.sent()[0].query.contains("__typename"));
}

#[tokio::test]
async fn test_mock_mode_synthesizes_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.graphql");
    std::fs::write(&path, "type Query { greeting: String @fake(type: word) }").unwrap();
    let store = SchemaStore::open(SchemaMode::Mock, path, MergeOptions::default()).unwrap();
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let gateway = Gateway::new(Arc::new(store), None, FakerSettings::default(), metrics.clone());

    let response = gateway.handle(request("{ greeting }"), &HeaderMap::new()).await;

    assert!(response.errors.is_empty());
    assert!(response.data.unwrap()["greeting"].is_string());
    assert_eq!(gateway.mode(), "mock");
    assert!(metrics
        .encode()
        .unwrap()
        .contains(r#"fakeql_requests_total{mode="mock",outcome="success"} 1"#));
}
