//! Error types produced by the runtime.

use gqlbridge_core::{Diagnostic, LineIndex, Location};
use serde::{Deserialize, Serialize};

/// A client-facing GraphQL error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct GraphQLError {
    /// The error message.
    pub message: String,
    /// Source locations the error refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    /// Response path of the field that failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    /// Error extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl GraphQLError {
    /// Creates a new error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Converts a syntax diagnostic, resolving its span against `index`.
    #[must_use]
    pub fn from_diagnostic(diagnostic: &Diagnostic, index: &LineIndex<'_>) -> Self {
        Self::new(diagnostic.message.clone()).with_location(diagnostic.location(index))
    }

    /// Adds a location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Replaces the locations.
    #[must_use]
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Adds a path to the error.
    #[must_use]
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// Adds an extension.
    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }

    /// Sets the error code extension.
    #[must_use]
    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.with_extension("code", serde_json::Value::String(code.into()))
    }
}

/// A segment of a response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Integrity problems found in a schema.
///
/// All problems are kept, but the error renders as one message so a broken
/// schema surfaces as a single error entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .issues.join("\n\n"))]
pub struct SchemaError {
    pub issues: Vec<String>,
}

impl SchemaError {
    /// Creates an error from a single problem.
    pub fn new(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }
}

/// A failure that aborts execution as a whole, as opposed to a field error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// A resolver panicked.
    #[error("Resolver for {field} panicked: {message}")]
    Panicked { field: String, message: String },

    /// The executor task was cancelled or failed to join.
    #[error("Execution task failed: {0}")]
    Join(String),

    /// No root operation type for the planned operation.
    #[error("Schema is not configured to execute {0} operation.")]
    MissingRootType(String),
}
