//! HTTP access to the upstream GraphQL server.

use std::time::Duration;

use async_trait::async_trait;
use cynic::{GraphQlResponse, QueryBuilder};
use cynic_introspection::query::IntrospectionQuery;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Serialize;
use tracing::debug;

use super::reconcile::UpstreamResponse;
use crate::domain::{JsonMap, UpstreamError};

/// One forwarded query
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRequest {
    pub query: String,
    pub variables: JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Headers copied from the inbound request
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

/// Sends exactly one request per call. Retries, if any, are the transport's business.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
    /// Static headers sent on introspection and every forwarded request
    headers: Vec<(String, String)>,
}

impl HttpUpstream {
    pub fn new(
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            headers,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn post<T: Serialize + ?Sized>(
        &self,
        body: &T,
        extra_headers: &[(String, String)],
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(&self.url)
            .header(USER_AGENT, concat!("fakeql/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .json(body);
        for (name, value) in self.headers.iter().chain(extra_headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    /// Fetches the upstream schema and prints it as SDL
    pub async fn introspect(&self) -> Result<String, UpstreamError> {
        let operation = IntrospectionQuery::build(());
        let response = self
            .post(&operation, &[])
            .send()
            .await
            .map_err(|e| UpstreamError::Introspection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Introspection(format!("{status}: {body}")));
        }

        let result: GraphQlResponse<IntrospectionQuery> = response
            .json()
            .await
            .map_err(|e| UpstreamError::Introspection(e.to_string()))?;
        if let Some(errors) = result.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|error| error.message).collect();
            return Err(UpstreamError::Introspection(messages.join("\n")));
        }
        let Some(data) = result.data else {
            return Err(UpstreamError::Introspection(
                "response carries no data".to_string(),
            ));
        };
        let schema = data
            .into_schema()
            .map_err(|e| UpstreamError::Introspection(e.to_string()))?;
        Ok(schema.to_sdl())
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        debug!(
            url = %self.url,
            operation_name = ?request.operation_name,
            "Forwarding query upstream"
        );
        let response = self.post(&request, &request.headers).send().await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<UpstreamResponse>(&body) {
            // GraphQL servers may answer with a 4xx or 5xx and still carry a GraphQL body
            Ok(parsed) if parsed.data.is_some() || !parsed.errors.is_empty() => Ok(parsed),
            _ if !status.is_success() => Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            }),
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(UpstreamError::Decode(e.to_string())),
        }
    }
}
