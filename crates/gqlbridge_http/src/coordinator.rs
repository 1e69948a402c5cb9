//! Execution coordination.
//!
//! A request moves through normalize, resolve config, parse, schema check,
//! validate, plan, method check and execute, stopping at the first stage
//! that fails. Every stage reports a tagged [`Outcome`], and [`classify`]
//! alone decides the HTTP status from it.

use crate::config::{default_format_error, EngineConfig, QueryConfig};
use crate::error::{ConfigError, RequestError};
use crate::request::{normalize, ExecutionRequest, RawRequest};
use crate::response::Reply;
use gqlbridge_core::{Interner, LineIndex};
use gqlbridge_runtime::{
    validate, Executor, ExecutorConfig, GraphQLError, PlanError, PlannerConfig, QueryPlan,
    QueryPlanner, Response,
};
use gqlbridge_syntax::parse;
use hyper::header::ALLOW;
use hyper::{Method, StatusCode};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// The kind of failure that stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MissingQuery,
    MalformedVariables,
    MalformedBody,
    ConfigResolution,
    Syntax,
    SchemaConfiguration,
    Validation,
    OperationResolution,
    VariableCoercion,
    QueryLimitExceeded,
    MethodNotAllowed,
    Execution,
}

impl FailureKind {
    /// Returns the string representation of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingQuery => "MISSING_QUERY",
            Self::MalformedVariables => "MALFORMED_VARIABLES",
            Self::MalformedBody => "MALFORMED_BODY",
            Self::ConfigResolution => "CONFIG_RESOLUTION_ERROR",
            Self::Syntax => "SYNTAX_ERROR",
            Self::SchemaConfiguration => "SCHEMA_CONFIGURATION_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::OperationResolution => "OPERATION_RESOLUTION_ERROR",
            Self::VariableCoercion => "VARIABLE_COERCION_ERROR",
            Self::QueryLimitExceeded => "QUERY_LIMIT_EXCEEDED",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Execution => "EXECUTION_ERROR",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed stage and the errors it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub errors: Vec<GraphQLError>,
}

impl Failure {
    pub fn new(kind: FailureKind, errors: Vec<GraphQLError>) -> Self {
        Self { kind, errors }
    }

    /// A failure with a single error message.
    pub fn message(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::new(kind, vec![GraphQLError::new(message)])
    }
}

impl From<RequestError> for Failure {
    fn from(error: RequestError) -> Self {
        let kind = match error {
            RequestError::MissingQuery => FailureKind::MissingQuery,
            RequestError::MalformedVariables(_) => FailureKind::MalformedVariables,
            RequestError::MalformedBody(_) => FailureKind::MalformedBody,
        };
        Self::message(kind, error.to_string())
    }
}

impl From<ConfigError> for Failure {
    fn from(error: ConfigError) -> Self {
        Self::message(FailureKind::ConfigResolution, error.to_string())
    }
}

impl From<PlanError> for Failure {
    fn from(error: PlanError) -> Self {
        let kind = match error {
            PlanError::OperationResolution(_) => FailureKind::OperationResolution,
            PlanError::VariableCoercion(_) => FailureKind::VariableCoercion,
            PlanError::LimitExceeded(_) => FailureKind::QueryLimitExceeded,
        };
        Self::new(kind, error.into_errors())
    }
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Execution ran to completion, possibly with field errors.
    Executed(Response),
    /// A stage failed before or during execution.
    Failed(Failure),
}

/// Maps an outcome to its HTTP status.
pub fn classify(outcome: &Outcome) -> StatusCode {
    let kind = match outcome {
        Outcome::Executed(_) => return StatusCode::OK,
        Outcome::Failed(failure) => failure.kind,
    };
    match kind {
        FailureKind::MissingQuery
        | FailureKind::MalformedVariables
        | FailureKind::MalformedBody
        | FailureKind::Syntax
        | FailureKind::Validation
        | FailureKind::OperationResolution
        | FailureKind::VariableCoercion
        | FailureKind::QueryLimitExceeded => StatusCode::BAD_REQUEST,
        FailureKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        FailureKind::ConfigResolution
        | FailureKind::SchemaConfiguration
        | FailureKind::Execution => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Runs requests for one registered route.
#[derive(Debug, Default)]
pub struct Coordinator {
    query: Option<QueryConfig>,
    planner: QueryPlanner,
    executor: Executor,
}

impl Coordinator {
    /// Creates a coordinator.
    pub fn new(query: Option<QueryConfig>, planner: PlannerConfig, executor: ExecutorConfig) -> Self {
        Self {
            query,
            planner: QueryPlanner::with_config(planner),
            executor: Executor::with_config(executor),
        }
    }

    /// Answers one request.
    pub async fn handle(&self, raw: &RawRequest) -> Reply {
        debug!(method = %raw.method, path = %raw.path, "graphql request");
        let request = normalize(raw);

        let config = match self.resolve_config(raw) {
            Ok(config) => config,
            Err(error) => {
                // Normalization comes first; the failed resolution only
                // costs the custom formatter.
                let failure = request.err().map_or_else(|| error.into(), Failure::from);
                return respond(&Outcome::Failed(failure), &default_format_error);
            }
        };

        let outcome = match request {
            Ok(request) => self.run(&config, &raw.method, &request).await,
            Err(error) => Outcome::Failed(error.into()),
        };
        respond(&outcome, &*config.format_error)
    }

    fn resolve_config(&self, raw: &RawRequest) -> Result<EngineConfig, ConfigError> {
        self.query
            .as_ref()
            .ok_or(ConfigError::Missing)?
            .resolve(raw)
    }

    /// Runs the stages after normalization and config resolution.
    pub async fn run(
        &self,
        config: &EngineConfig,
        method: &Method,
        request: &ExecutionRequest,
    ) -> Outcome {
        let plan = match self.prepare(config, method, request) {
            Ok(plan) => plan,
            Err(failure) => return Outcome::Failed(failure),
        };

        debug!(operation = ?plan.operation_name, "executing");
        let executed = self
            .executor
            .execute(
                Arc::new(plan),
                Arc::clone(&config.schema),
                Arc::clone(&config.resolvers),
                config.root_value.clone(),
                config.context.clone(),
            )
            .await;

        match executed {
            Ok(response) => Outcome::Executed(response),
            Err(error) => Outcome::Failed(Failure::message(FailureKind::Execution, error.to_string())),
        }
    }

    /// Parse, schema check, validate, plan and method check.
    ///
    /// Synchronous so that the interned document never crosses an await.
    fn prepare(
        &self,
        config: &EngineConfig,
        method: &Method,
        request: &ExecutionRequest,
    ) -> Result<QueryPlan, Failure> {
        let source = request.query.as_str();
        let interner = Interner::new();
        let index = LineIndex::new(source);

        let parsed = parse(source, &interner);
        if let Some(diagnostic) = parsed.diagnostics.first_error() {
            debug!(message = %diagnostic.message, "syntax error");
            return Err(Failure::new(
                FailureKind::Syntax,
                vec![GraphQLError::from_diagnostic(diagnostic, &index)],
            ));
        }

        config
            .schema
            .validate()
            .map_err(|e| Failure::message(FailureKind::SchemaConfiguration, e.to_string()))?;

        let errors = validate(&config.schema, &parsed.document, &interner, &index);
        if !errors.is_empty() {
            debug!(count = errors.len(), "validation failed");
            return Err(Failure::new(FailureKind::Validation, errors));
        }

        let plan = self.planner.plan(
            &config.schema,
            &parsed.document,
            &interner,
            &index,
            request.operation_name.as_deref(),
            &request.variables(),
        )?;

        if plan.is_mutation() && method == Method::GET {
            return Err(Failure::message(
                FailureKind::MethodNotAllowed,
                "Can only perform a mutation operation from a POST request.",
            ));
        }
        Ok(plan)
    }
}

/// Renders an outcome, passing every error through `format`.
pub fn respond(outcome: &Outcome, format: &dyn Fn(&GraphQLError) -> Value) -> Reply {
    let status = classify(outcome);
    let mut body = Map::new();
    match outcome {
        Outcome::Executed(response) => {
            body.insert("data".to_string(), response.data.clone());
            if response.has_errors() {
                body.insert("errors".to_string(), format_all(&response.errors, format));
            }
        }
        Outcome::Failed(failure) => {
            if status.is_server_error() {
                warn!(kind = %failure.kind, errors = ?failure.errors, "request failed");
            } else {
                debug!(kind = %failure.kind, "request rejected");
            }
            body.insert("errors".to_string(), format_all(&failure.errors, format));
        }
    }

    let reply = Reply::json(status, &Value::Object(body));
    if status == StatusCode::METHOD_NOT_ALLOWED {
        reply.with_header(ALLOW, "POST")
    } else {
        reply
    }
}

fn format_all(errors: &[GraphQLError], format: &dyn Fn(&GraphQLError) -> Value) -> Value {
    Value::Array(errors.iter().map(format).collect())
}
