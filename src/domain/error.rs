//! Error types for schema building, value synthesis and upstream calls

use thiserror::Error;

/// Errors raised while merging and validating SDL documents
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Syntax errors, all of them
    #[error("Failed to parse SDL:\n{}", .0.join("\n"))]
    Parse(Vec<String>),

    /// Validation errors of the merged document, all of them
    #[error("Schema validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    /// The merged schema does not define a query root type
    #[error("Schema has no query root type")]
    MissingQueryType,
}

impl SchemaError {
    /// Individual messages, for reporting each sub-error separately
    pub fn messages(&self) -> Vec<String> {
        match self {
            SchemaError::Parse(errors) | SchemaError::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Errors raised while synthesizing a value
#[derive(Debug, Error)]
pub enum FakerError {
    /// `@fake(type: ...)` names a generator that is not implemented
    #[error("Unknown fake generator: {0}")]
    UnknownGenerator(String),

    /// Unknown locale passed to `@fake(locale: ...)`
    #[error("Unknown fake locale: {0}")]
    UnknownLocale(String),

    /// A directive argument has an unexpected shape
    #[error("Invalid @{directive} directive: {reason}")]
    InvalidDirective { directive: String, reason: String },

    /// `@examples` values cannot be used for the annotated type
    #[error("Invalid examples: {0}")]
    InvalidExamples(String),

    /// Output type missing from the schema or not an output type
    #[error("Cannot synthesize a value of type {0}")]
    UnsupportedType(String),
}

/// Errors talking to the extended (upstream) GraphQL server
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Non-success status without a GraphQL body
    #[error("Upstream responded with {status}: {body}")]
    Status { status: u16, body: String },

    /// Body is not a GraphQL response
    #[error("Invalid upstream response: {0}")]
    Decode(String),

    /// Remote schema could not be introspected
    #[error("Can't get introspection from upstream: {0}")]
    Introspection(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err.to_string())
    }
}

/// Errors replacing the served SDL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to access SDL file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
