//! Command-line interface for gqlbridge.
//!
//! # Usage
//!
//! ```bash
//! # Serve a schema over HTTP
//! gqlbridge serve --schema schema.graphql --root root.json --port 4000
//!
//! # Check schema files
//! gqlbridge check schema.graphql
//!
//! # Run one query in-process
//! gqlbridge exec --schema schema.graphql --root root.json '{ hello }'
//! ```

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use gqlbridge_core::Span;
use gqlbridge_http::{
    EngineConfig, InjectRequest, PluginOptions, QueryConfig, RegistrationError, Reply,
    RouteConfig, Server, ServerConfig, ServerError,
};
use gqlbridge_runtime::{
    Context, ExecutorConfig, PlannerConfig, Schema, SchemaError, SdlError,
};
use miette::{LabeledSpan, NamedSource, SourceCode};
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gqlbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that run queries.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Schema SDL file
    #[arg(long)]
    pub schema: PathBuf,

    /// JSON file with the root value
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Maximum query depth (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_depth: usize,

    /// Maximum query complexity (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_complexity: usize,

    /// Time limit for a single resolver, in milliseconds
    #[arg(long)]
    pub field_timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve a schema over HTTP
    Serve {
        #[command(flatten)]
        engine: EngineArgs,

        /// Route path
        #[arg(long, default_value = "/graphql")]
        path: String,

        /// Host to bind to
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 4000)]
        port: u16,

        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },

    /// Check schema files for errors
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Run a single query in-process
    Exec {
        #[command(flatten)]
        engine: EngineArgs,

        /// Query text
        query: String,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,

        /// Operation to run
        #[arg(long)]
        operation_name: Option<String>,
    },
}

/// Errors reported by the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid root value in {}: {source}", path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid schema {}:\n{source}", path.display())]
    InvalidSchema {
        path: PathBuf,
        #[source]
        source: SdlError,
    },

    #[error("Invalid variables: {0}")]
    InvalidVariables(#[source] serde_json::Error),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Runs a parsed command line, returning the process exit code.
pub async fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Commands::Serve {
            engine,
            path,
            host,
            port,
            cors,
        } => {
            let mut route = RouteConfig::new();
            if cors {
                route = route.cors();
            }
            let server = build_server(&engine, &path, route, ServerConfig::new().host(host).port(port))?;
            server.listen_with_shutdown(shutdown_signal()).await?;
            Ok(0)
        }
        Commands::Check { files } => check_files(&files, cli.verbose),
        Commands::Exec {
            engine,
            query,
            variables,
            operation_name,
        } => {
            let reply = exec(&engine, &query, variables.as_deref(), operation_name.as_deref()).await?;
            print_reply(&reply);
            Ok(i32::from(!reply.status.is_success()))
        }
    }
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolves once `signal` fires. If the signal handler cannot be
/// installed this never resolves and the server runs until killed.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("received Ctrl-C"),
        Err(error) => {
            warn!(%error, "unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// Loads the schema and optional root value into an engine configuration.
pub fn load_engine(schema: &Path, root: Option<&Path>) -> Result<EngineConfig, CliError> {
    let sdl = read(schema)?;
    let built = Schema::from_sdl(&sdl).map_err(|source| CliError::InvalidSchema {
        path: schema.to_path_buf(),
        source,
    })?;

    let mut config = EngineConfig::new(built);
    if let Some(root) = root {
        let value = serde_json::from_str(&read(root)?).map_err(|source| CliError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;
        config = config.root_value(value);
    }
    Ok(config)
}

/// Builds a server with one GraphQL route.
///
/// Each request gets a context carrying its method and path.
pub fn build_server(
    args: &EngineArgs,
    path: &str,
    route: RouteConfig,
    server: ServerConfig,
) -> Result<Server, CliError> {
    let engine = load_engine(&args.schema, args.root.as_deref())?;
    let query = QueryConfig::per_request(move |raw| {
        let context = Context::new()
            .with("method", raw.method.as_str())
            .with("path", &raw.path);
        Ok(engine.clone().context(context))
    });

    let mut server = Server::new(server);
    server.register(
        PluginOptions::new(path)
            .query(query)
            .route_config(route)
            .planner(PlannerConfig {
                max_depth: args.max_depth,
                max_complexity: args.max_complexity,
            })
            .executor(ExecutorConfig {
                field_timeout: args.field_timeout_ms.map(Duration::from_millis),
            }),
    )?;
    Ok(server)
}

/// Runs one query through an in-process server.
pub async fn exec(
    args: &EngineArgs,
    query: &str,
    variables: Option<&str>,
    operation_name: Option<&str>,
) -> Result<Reply, CliError> {
    let variables: Value = match variables {
        Some(text) => serde_json::from_str(text).map_err(CliError::InvalidVariables)?,
        None => Value::Null,
    };
    let server = build_server(args, "/graphql", RouteConfig::new(), ServerConfig::new())?;
    let body = json!({
        "query": query,
        "variables": variables,
        "operationName": operation_name,
    });
    Ok(server.inject(InjectRequest::post("/graphql").json(&body)).await)
}

fn print_reply(reply: &Reply) {
    let status = reply.status.to_string();
    if reply.status.is_success() {
        eprintln!("{}", status.green().bold());
    } else {
        eprintln!("{}", status.red().bold());
    }
    match reply.json_body() {
        Ok(body) => println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| reply.text())
        ),
        Err(_) => println!("{}", reply.text()),
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// A schema problem located in its source file, rendered with miette.
#[derive(Debug, Error)]
#[error("{message}")]
struct SourceProblem {
    code: &'static str,
    message: String,
    src: NamedSource<String>,
    span: Span,
}

impl miette::Diagnostic for SourceProblem {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::at(self.span, "here"))))
    }
}

/// Result of checking one schema file.
#[derive(Debug)]
pub enum CheckOutcome {
    Ok,
    Sdl(SdlError),
    Integrity(SchemaError),
}

/// Builds and validates the schema in `source`.
pub fn check_source(source: &str) -> CheckOutcome {
    match Schema::from_sdl(source) {
        Err(error) => CheckOutcome::Sdl(error),
        Ok(schema) => match schema.validate() {
            Ok(()) => CheckOutcome::Ok,
            Err(error) => CheckOutcome::Integrity(error),
        },
    }
}

fn check_files(files: &[PathBuf], verbose: bool) -> Result<i32, CliError> {
    let mut failed = 0;

    for file in files {
        if verbose {
            println!("{} {}", "Checking".blue(), file.display());
        }
        let source = read(file)?;

        match check_source(&source) {
            CheckOutcome::Ok => {
                if verbose {
                    println!("{} {}", "OK".green(), file.display());
                }
            }
            CheckOutcome::Sdl(error) => {
                failed += 1;
                eprintln!("{} {}", "Error".red().bold(), file.display());
                let name = file.display().to_string();
                for diagnostic in error.diagnostics {
                    let problem = SourceProblem {
                        code: diagnostic.code,
                        message: diagnostic.message,
                        src: NamedSource::new(name.clone(), source.clone()),
                        span: diagnostic.span,
                    };
                    eprintln!("{:?}", miette::Report::new(problem));
                }
            }
            CheckOutcome::Integrity(error) => {
                failed += 1;
                eprintln!("{} {}", "Error".red().bold(), file.display());
                for issue in &error.issues {
                    eprintln!("  {} {}", "-->".blue(), issue);
                }
            }
        }
    }

    if failed > 0 {
        eprintln!(
            "{} {} of {} file(s) failed",
            "Error:".red().bold(),
            failed,
            files.len()
        );
        Ok(1)
    } else {
        println!(
            "{} {} file(s) checked",
            "Success:".green().bold(),
            files.len()
        );
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[tokio::test]
    async fn test_shutdown_waits_when_signal_is_unavailable() {
        let failing = async { Err(std::io::Error::other("no signal driver")) };
        let waited =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(failing)).await;
        assert!(waited.is_err());

        let fired = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_shutdown(async { Ok(()) }),
        )
        .await;
        assert!(fired.is_ok());
    }

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["gqlbridge", "serve", "--schema", "s.graphql"]).unwrap();
        match cli.command {
            Commands::Serve {
                engine,
                path,
                host,
                port,
                cors,
            } => {
                assert_eq!(engine.schema, PathBuf::from("s.graphql"));
                assert_eq!(engine.max_depth, 0);
                assert_eq!(path, "/graphql");
                assert_eq!(host, "localhost");
                assert_eq!(port, 4000);
                assert!(!cors);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_exec_args() {
        let cli = Cli::try_parse_from([
            "gqlbridge",
            "exec",
            "--schema",
            "s.graphql",
            "--variables",
            "{\"id\": 1}",
            "--operation-name",
            "Q",
            "query Q { hello }",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Exec { ref query, ref operation_name, .. }
                if query == "query Q { hello }" && operation_name.as_deref() == Some("Q")
        ));
    }

    #[test]
    fn test_check_source() {
        assert!(matches!(
            check_source("type Query { hello: String }"),
            CheckOutcome::Ok
        ));
        assert!(matches!(
            check_source("type Query { hello: }"),
            CheckOutcome::Sdl(_)
        ));
        match check_source("type Query") {
            CheckOutcome::Integrity(error) => insta::assert_debug_snapshot!(error.issues, @r###"
            [
                "Type Query must define one or more fields.",
            ]
            "###),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gqlbridge-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_exec_runs_query() {
        let args = EngineArgs {
            schema: write_temp("exec.graphql", "type Query { hello: String }"),
            root: Some(write_temp("exec.json", r#"{"hello": "Hello world!"}"#)),
            max_depth: 0,
            max_complexity: 0,
            field_timeout_ms: None,
        };
        let reply = exec(&args, "{ hello }", None, None).await.unwrap();
        assert!(reply.status.is_success());
        assert_eq!(reply.text(), r#"{"data":{"hello":"Hello world!"}}"#);

        let error = exec(&args, "{ hello }", Some("{"), None).await.unwrap_err();
        assert!(matches!(error, CliError::InvalidVariables(_)));
    }

    #[test]
    fn test_load_engine_reports_missing_file() {
        let error = load_engine(Path::new("/nonexistent/schema.graphql"), None).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read /nonexistent/schema.graphql"));
    }
}
