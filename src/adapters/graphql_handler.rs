//! GraphQL over HTTP: `POST /graphql` with a JSON body, `GET /graphql` with query parameters.
//!
//! Every well-formed request is answered with status 200 and a `{ data, errors }` body.
//! Only bodies that are not GraphQL requests at all get a 400.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::{GraphQLError, GraphQLRequest, GraphQLResponse, JsonMap};
use crate::proxy::Gateway;

/// Query parameters of `GET /graphql`. `variables` is a JSON-encoded object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLQueryParams {
    pub query: Option<String>,
    pub variables: Option<String>,
    pub operation_name: Option<String>,
}

pub async fn post_graphql(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: GraphQLRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return bad_request(format!("Invalid GraphQL request body: {e}")),
    };
    Json(gateway.handle(request, &headers).await).into_response()
}

pub async fn get_graphql(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> Response {
    let Some(query) = params.query else {
        return bad_request("Must provide query string.");
    };
    let variables = match params.variables.as_deref() {
        None | Some("") => None,
        Some(raw) => match serde_json::from_str::<Option<JsonMap>>(raw) {
            Ok(variables) => variables,
            Err(e) => return bad_request(format!("Variables are invalid JSON: {e}")),
        },
    };
    let request = GraphQLRequest {
        query,
        variables,
        operation_name: params.operation_name.filter(|name| !name.is_empty()),
    };
    Json(gateway.handle(request, &headers).await).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(GraphQLResponse::from_errors(vec![GraphQLError::new(message)])),
    )
        .into_response()
}
