use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;
pub mod value;

pub use error::{FakerError, SchemaError, StoreError, UpstreamError};
pub use value::{ErrorMarker, FieldValue, ObjectValue, RootValue};

pub type JsonMap = serde_json::Map<String, Value>;

/// A GraphQL-over-HTTP request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Option<JsonMap>,
    #[serde(default)]
    pub operation_name: Option<String>,
}

/// A GraphQL response, either produced locally or received from the upstream server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    /// Response for a request that failed before execution started
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }
}

/// One segment of a response path: an object key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_path"
    )]
    pub path: Option<Vec<PathSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonMap>,
}

/// A path with a segment that is neither a key nor a list index is dropped, which leaves
/// the error global instead of failing the whole response body.
fn lenient_path<'de, D>(deserializer: D) -> Result<Option<Vec<PathSegment>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(segments) = Option::<Vec<Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Value::String(key) => Some(PathSegment::Key(key)),
            Value::Number(index) => index
                .as_u64()
                .and_then(|index| usize::try_from(index).ok())
                .map(PathSegment::Index),
            _ => None,
        })
        .collect())
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    /// Errors without a path cannot be attached to a field of the response tree
    pub fn has_path(&self) -> bool {
        self.path.as_ref().is_some_and(|path| !path.is_empty())
    }
}
