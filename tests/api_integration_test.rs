use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fakeql::adapters::metrics_handler::MetricsCollector;
use fakeql::faker::FakerSettings;
use fakeql::proxy::Gateway;
use fakeql::schema::{MergeOptions, SchemaMode, SchemaStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // Correct import for oneshot

const SDL: &str = r#"
type Query {
  greeting: String @fake(type: word)
  company: Company
  pet: Pet
}

type Company {
  name: String @fake(type: companyName)
  employees: [Employee!]! @listLength(min: 3, max: 3)
}

type Employee {
  firstName: String @fake(type: firstName)
  role: String @examples(values: ["engineer", "designer"])
}

type Cat { lives: Int }
type Dog { barks: Boolean }
union Pet = Cat | Dog
"#;

fn app(dir: &TempDir) -> Router {
    let path = dir.path().join("schema.faker.graphql");
    std::fs::write(&path, SDL).unwrap();
    let store = SchemaStore::open(SchemaMode::Mock, path, MergeOptions::default()).unwrap();
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let gateway = Arc::new(Gateway::new(
        Arc::new(store),
        None,
        FakerSettings::default(),
        metrics.clone(),
    ));
    fakeql::create_app(gateway, metrics, None)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body_bytes.to_vec()).unwrap()
}

fn graphql(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/graphql")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_post_graphql_synthesizes_values() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .oneshot(graphql(json!({
            "query": "{ greeting company { name employees { firstName role } } pet { __typename } }"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body.get("errors").is_none(), "{body}");
    let data = &body["data"];
    assert!(data["greeting"].is_string());
    assert!(data["company"]["name"].is_string());

    let employees = data["company"]["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 3);
    for employee in employees {
        assert!(employee["firstName"].is_string());
        let role = employee["role"].as_str().unwrap();
        assert!(role == "engineer" || role == "designer");
    }

    let typename = data["pet"]["__typename"].as_str().unwrap();
    assert!(typename == "Cat" || typename == "Dog");
}

#[tokio::test]
async fn test_get_graphql_with_variables() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/graphql?query=query%20Q(%24skip%3A%20Boolean!)%20%7B%20greeting%20%40skip(if%3A%20%24skip)%20%7D&variables=%7B%22skip%22%3Atrue%7D&operationName=Q")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "data": {} }));
}

#[tokio::test]
async fn test_validation_errors_are_graphql_errors() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .oneshot(graphql(json!({ "query": "{ nope }" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body.get("data").is_none());
    let errors = body["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
    assert!(errors[0]["message"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/graphql")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_sdl_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/user-sdl").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["schemaSDL"], SDL);
    assert_eq!(body["extensionSDL"], Value::Null);

    let new_sdl = "type Query { answer: Int @examples(values: [42]) }";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/user-sdl")
                .method("POST")
                .body(Body::from(new_sdl))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("schema.faker.graphql")).unwrap(),
        new_sdl
    );

    let response = app
        .oneshot(graphql(json!({ "query": "{ answer }" })))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "data": { "answer": 42 } }));
}

#[tokio::test]
async fn test_invalid_sdl_is_rejected_and_previous_schema_kept() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/user-sdl")
                .method("POST")
                .body(Body::from("type Query { a: Missing b: AlsoMissing }"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_text(response).await;
    assert!(message.contains("Missing"));
    assert!(message.contains("AlsoMissing"));

    let response = app
        .oneshot(graphql(json!({ "query": "{ greeting }" })))
        .await
        .unwrap();
    assert!(body_json(response).await["data"]["greeting"].is_string());
}

#[tokio::test]
async fn test_introspection_for_tooling() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let response = app
        .oneshot(graphql(json!({
            "query": r#"{ __type(name: "Company") { name kind fields { name type { kind ofType { kind ofType { kind ofType { name } } } } } } }"#
        })))
        .await
        .unwrap();
    let body = body_json(response).await;
    let company = &body["data"]["__type"];
    assert_eq!(company["kind"], "OBJECT");
    let employees = company["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|field| field["name"] == "employees")
        .unwrap();
    assert_eq!(
        employees["type"],
        json!({ "kind": "NON_NULL", "ofType": { "kind": "LIST", "ofType": { "kind": "NON_NULL", "ofType": { "name": "Employee" } } } })
    );
}

#[tokio::test]
async fn test_health_and_metrics() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    app.clone()
        .oneshot(graphql(json!({ "query": "{ greeting }" })))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["mode"], "mock");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let metrics = body_text(response).await;
    assert!(metrics.contains(r#"fakeql_requests_total{mode="mock",outcome="success"} 1"#));
}
