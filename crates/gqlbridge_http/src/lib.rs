//! HTTP adapter for gqlbridge.
//!
//! Exposes a GraphQL engine over HTTP:
//! - `request`: Request normalization (GET query string, POST body)
//! - `coordinator`: Staged execution and status classification
//! - `config`: Engine configuration and route registration options
//! - `server`: Host server with route registration and in-process injection
//!
//! # Example
//!
//! ```no_run
//! use gqlbridge_http::{EngineConfig, PluginOptions, Server, ServerConfig};
//! use gqlbridge_runtime::Schema;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::from_sdl("type Query { hello: String }")?;
//! let config = EngineConfig::new(schema).root_value(json!({ "hello": "Hello world!" }));
//!
//! let mut server = Server::new(ServerConfig::new().port(4000));
//! server.register(PluginOptions::new("/graphql").query(config))?;
//! server.listen().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use config::{
    default_format_error, ConfigFn, EngineConfig, FormatError, PluginOptions, QueryConfig,
    RouteConfig, RouteOptions,
};
pub use coordinator::{classify, respond, Coordinator, Failure, FailureKind, Outcome};
pub use error::{ConfigError, RegistrationError, RequestError, ServerError, ServerResult};
pub use request::{normalize, ExecutionRequest, RawRequest};
pub use response::Reply;
pub use server::{InjectRequest, Server, ServerConfig};

pub use hyper::{Method, StatusCode};
