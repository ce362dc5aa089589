use std::time::Duration;
use thiserror::Error;

/// Main error type for the fulfillment webhook
#[derive(Error, Debug)]
pub enum FulfillmentError {
    /// Request body is not a usable webhook payload
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Action name outside the supported vocabulary
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// Neo4j driver errors (connect, execute, stream)
    #[error("Graph database error: {0}")]
    Graph(#[from] neo4rs::Error),

    /// Query failed for a reason not raised by the driver
    #[error("Query error: {0}")]
    Query(String),

    /// Query did not finish within the configured timeout
    #[error("Query {template} timed out after {elapsed:?}")]
    QueryTimeout { template: String, elapsed: Duration },

    /// A returned value could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Query result lacks a field a message needs
    #[error("Result entry '{alias}' is missing field '{field}'")]
    MissingField { alias: String, field: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system / socket I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FulfillmentError {
    /// Short machine-readable kind, used as the `error` field of HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            FulfillmentError::MalformedRequest(_) => "malformed_request",
            FulfillmentError::UnsupportedAction(_) => "unsupported_action",
            FulfillmentError::Graph(_) | FulfillmentError::Query(_) => "graph_unavailable",
            FulfillmentError::QueryTimeout { .. } => "graph_timeout",
            FulfillmentError::Decode(_) => "graph_decode",
            FulfillmentError::MissingField { .. } => "data_integrity",
            FulfillmentError::Config(_) | FulfillmentError::Io(_) => "internal",
        }
    }

    /// True for errors caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FulfillmentError::MalformedRequest(_) | FulfillmentError::UnsupportedAction(_)
        )
    }
}

/// Convenient Result type using FulfillmentError
pub type Result<T> = std::result::Result<T, FulfillmentError>;
