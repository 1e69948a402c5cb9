//! Error types for the HTTP adapter.

use thiserror::Error;

/// A transport request that cannot be turned into an execution request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No query text, or an empty one.
    #[error("Must provide query string.")]
    MissingQuery,

    /// `variables` is present but is not a JSON object.
    #[error("{0}")]
    MalformedVariables(String),

    /// The body or query string has the wrong shape.
    #[error("{0}")]
    MalformedBody(String),
}

impl RequestError {
    pub(crate) fn variables(message: impl Into<String>) -> Self {
        Self::MalformedVariables(message.into())
    }

    pub(crate) fn body(message: impl Into<String>) -> Self {
        Self::MalformedBody(message.into())
    }
}

/// Failure to produce the engine configuration for a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The route was registered without a `query` option.
    #[error("No query configuration is registered for this route.")]
    Missing,

    /// The per-request configuration function panicked.
    #[error("Query configuration panicked: {0}")]
    Panicked(String),

    /// Error raised by a per-request configuration function.
    #[error("{0}")]
    Custom(String),
}

impl ConfigError {
    /// Creates a custom configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Rejected route registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Route path \"{0}\" must start with \"/\".")]
    InvalidPath(String),

    #[error("Method '{method}' already declared for route '{path}'.")]
    DuplicateRoute { method: String, path: String },
}

/// Failure of the host server itself.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
