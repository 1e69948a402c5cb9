//! Engine configuration and route registration options.

use crate::error::ConfigError;
use crate::request::RawRequest;
use gqlbridge_runtime::{
    Context, ExecutorConfig, GraphQLError, PlannerConfig, ResolverMap, Schema,
};
use serde_json::{json, Value};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Turns an error into the JSON shape sent to clients.
pub type FormatError = Arc<dyn Fn(&GraphQLError) -> Value + Send + Sync>;

/// Produces the engine configuration for one request.
pub type ConfigFn = Arc<dyn Fn(&RawRequest) -> Result<EngineConfig, ConfigError> + Send + Sync>;

/// Default error view: `message`, plus `locations`, `path` and
/// `extensions` when present.
pub fn default_format_error(error: &GraphQLError) -> Value {
    serde_json::to_value(error).unwrap_or_else(|_| json!({ "message": error.message }))
}

/// Everything needed to run a query.
#[derive(Clone)]
pub struct EngineConfig {
    pub schema: Arc<Schema>,
    pub resolvers: Arc<ResolverMap>,
    pub root_value: Value,
    pub context: Context,
    pub format_error: FormatError,
}

impl EngineConfig {
    /// Creates a config with default resolvers, an empty root value and the
    /// default error formatter.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            resolvers: Arc::new(ResolverMap::new()),
            root_value: Value::Object(serde_json::Map::new()),
            context: Context::new(),
            format_error: Arc::new(default_format_error),
        }
    }

    /// Sets the resolvers.
    #[must_use]
    pub fn resolvers(mut self, resolvers: impl Into<Arc<ResolverMap>>) -> Self {
        self.resolvers = resolvers.into();
        self
    }

    /// Sets the root value handed to root field resolvers.
    #[must_use]
    pub fn root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    /// Sets the request context.
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Sets the error formatter.
    #[must_use]
    pub fn format_error<F>(mut self, format_error: F) -> Self
    where
        F: Fn(&GraphQLError) -> Value + Send + Sync + 'static,
    {
        self.format_error = Arc::new(format_error);
        self
    }

    /// Formats one error.
    pub fn format(&self, error: &GraphQLError) -> Value {
        (self.format_error)(error)
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("schema", &self.schema.query_type)
            .field("root_value", &self.root_value)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// The `query` registration option.
#[derive(Clone)]
pub enum QueryConfig {
    /// One configuration shared by every request.
    Static(EngineConfig),
    /// A configuration computed from each request.
    PerRequest(ConfigFn),
}

impl QueryConfig {
    /// Wraps a per-request configuration function.
    pub fn per_request<F>(f: F) -> Self
    where
        F: Fn(&RawRequest) -> Result<EngineConfig, ConfigError> + Send + Sync + 'static,
    {
        Self::PerRequest(Arc::new(f))
    }

    /// Resolves the configuration for `raw`.
    ///
    /// A panicking configuration function is reported as an error.
    pub fn resolve(&self, raw: &RawRequest) -> Result<EngineConfig, ConfigError> {
        match self {
            Self::Static(config) => Ok(config.clone()),
            Self::PerRequest(f) => catch_unwind(AssertUnwindSafe(|| f(raw)))
                .unwrap_or_else(|payload| Err(ConfigError::Panicked(panic_message(&*payload)))),
        }
    }
}

impl From<EngineConfig> for QueryConfig {
    fn from(config: EngineConfig) -> Self {
        Self::Static(config)
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(config) => f.debug_tuple("Static").field(config).finish(),
            Self::PerRequest(_) => f.write_str("PerRequest(..)"),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Host-level route settings. The adapter itself never reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    /// Send CORS headers and answer `OPTIONS` preflight requests.
    pub cors: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteConfig {
    pub fn new() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            cors: false,
        }
    }

    /// Sets the body size limit.
    #[must_use]
    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Enables CORS.
    #[must_use]
    pub fn cors(mut self) -> Self {
        self.cors = true;
        self
    }
}

/// The `route` registration option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    pub path: String,
    pub config: RouteConfig,
}

/// Options accepted by [`Server::register`](crate::Server::register).
#[derive(Debug, Clone)]
pub struct PluginOptions {
    pub route: RouteOptions,
    pub query: Option<QueryConfig>,
    pub planner: PlannerConfig,
    pub executor: ExecutorConfig,
}

impl PluginOptions {
    /// Options for a route at `path` with no query configuration yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            route: RouteOptions {
                path: path.into(),
                config: RouteConfig::default(),
            },
            query: None,
            planner: PlannerConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }

    /// Sets the query configuration.
    #[must_use]
    pub fn query(mut self, query: impl Into<QueryConfig>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the host route settings.
    #[must_use]
    pub fn route_config(mut self, config: RouteConfig) -> Self {
        self.route.config = config;
        self
    }

    /// Sets the planner limits.
    #[must_use]
    pub fn planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    /// Sets the executor settings.
    #[must_use]
    pub fn executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }
}
