//! Host HTTP server.
//!
//! Owns the route table and the HTTP/1.1 connection loop, decodes request
//! bodies and hands each matched request to its route's [`Coordinator`].

use crate::config::{PluginOptions, RouteConfig};
use crate::coordinator::Coordinator;
use crate::error::{RegistrationError, ServerError, ServerResult};
use crate::request::RawRequest;
use crate::response::Reply;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_TYPE,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self {
            port: 4000,
            host: "localhost".to_string(),
        }
    }

    /// Sets the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

#[derive(Debug)]
struct Route {
    path: String,
    methods: Vec<Method>,
    config: RouteConfig,
    coordinator: Coordinator,
}

impl Route {
    fn allow(&self) -> String {
        let mut allow: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        if self.config.cors {
            allow.push("OPTIONS");
        }
        allow.join(", ")
    }
}

/// A request run in-process through [`Server::inject`].
#[derive(Debug, Clone)]
pub struct InjectRequest {
    pub method: Method,
    /// Path plus optional query string, e.g. `/graphql?query={hello}`.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InjectRequest {
    /// Creates a request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// A POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Adds a header. Values that are not valid header text are ignored.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and its content type.
    #[must_use]
    pub fn json(self, body: &Value) -> Self {
        self.header("content-type", "application/json")
            .body(body.to_string())
    }
}

/// The HTTP server hosting GraphQL routes.
#[derive(Debug, Default)]
pub struct Server {
    config: ServerConfig,
    routes: Vec<Route>,
}

impl Server {
    /// Creates a server with no routes.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
        }
    }

    /// Returns the server config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registers a GraphQL endpoint, binding GET and POST on `route.path`.
    pub fn register(&mut self, options: PluginOptions) -> Result<&mut Self, RegistrationError> {
        let PluginOptions {
            route,
            query,
            planner,
            executor,
        } = options;

        if !route.path.starts_with('/') || route.path.parse::<Uri>().is_err() {
            return Err(RegistrationError::InvalidPath(route.path));
        }
        if self.routes.iter().any(|r| r.path == route.path) {
            return Err(RegistrationError::DuplicateRoute {
                method: Method::GET.to_string(),
                path: route.path,
            });
        }

        info!(path = %route.path, "registered graphql route");
        self.routes.push(Route {
            path: route.path,
            methods: vec![Method::GET, Method::POST],
            config: route.config,
            coordinator: Coordinator::new(query, planner, executor),
        });
        Ok(self)
    }

    /// Returns true if `method` is bound on `path`.
    pub fn has_route(&self, path: &str, method: &Method) -> bool {
        self.route(path)
            .is_some_and(|route| route.methods.contains(method))
    }

    fn route(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.path == path)
    }

    /// Runs a request in-process, without a socket.
    pub async fn inject(&self, request: InjectRequest) -> Reply {
        let (path, query) = match request.url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (request.url.as_str(), None),
        };
        let Some(route) = self.route(path) else {
            return not_found(&request.method, path);
        };
        if request.body.len() > route.config.max_body_bytes {
            return too_large(route);
        }
        dispatch(route, request.method, path, query, request.headers, request.body).await
    }

    /// Serves on the configured host and port until the process exits.
    pub async fn listen(self) -> ServerResult<()> {
        self.listen_with_shutdown(std::future::pending()).await
    }

    /// Serves on the configured host and port until `shutdown` completes.
    pub async fn listen_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send,
    ) -> ServerResult<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// completes. Each connection runs on its own task.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send,
    ) -> ServerResult<()> {
        if let Ok(addr) = listener.local_addr() {
            for route in &self.routes {
                info!("Listening on http://{}{}", addr, route.path);
            }
        }

        let server = Arc::new(self);
        tokio::pin!(shutdown);
        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted.map_err(ServerError::Accept)?,
                () = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
            };

            let io = TokioIo::new(stream);
            let server = Arc::clone(&server);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let server = Arc::clone(&server);
                    async move { Ok::<_, Infallible>(server.handle(req, peer).await.into_hyper()) }
                });
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if !err.is_incomplete_message() {
                        error!(%peer, "Connection error: {:?}", err);
                    }
                }
            });
        }
    }

    async fn handle(&self, req: Request<Incoming>, peer: SocketAddr) -> Reply {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path();
        debug!(%peer, method = %parts.method, %path, "incoming request");

        let Some(route) = self.route(path) else {
            return not_found(&parts.method, path);
        };
        let body = match Limited::new(body, route.config.max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                return too_large(route);
            }
            Err(err) => {
                return Reply::host_error(StatusCode::BAD_REQUEST, format!("Failed to read body: {err}"));
            }
        };
        dispatch(route, parts.method, path, parts.uri.query(), parts.headers, body).await
    }
}

async fn dispatch(
    route: &Route,
    method: Method,
    path: &str,
    query: Option<&str>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    if method == Method::OPTIONS && route.config.cors {
        return with_cors(route, Reply::empty(StatusCode::NO_CONTENT));
    }
    if !route.methods.contains(&method) {
        let reply = Reply::host_error(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method {method} is not allowed on {path}"),
        );
        return with_allow(reply, &route.allow());
    }

    let decoded = if method == Method::GET {
        Ok(None)
    } else {
        decode_body(&headers, &body)
    };
    let body = match decoded {
        Ok(body) => body,
        Err(reply) => return with_cors(route, reply),
    };

    let raw = RawRequest {
        method,
        path: path.to_string(),
        query: query.map(str::to_string),
        headers,
        body,
    };
    let reply = route.coordinator.handle(&raw).await;
    debug!(status = reply.status.as_u16(), "graphql response");
    with_cors(route, reply)
}

/// Decodes a request body according to its content type.
fn decode_body(headers: &HeaderMap, body: &Bytes) -> Result<Option<Value>, Reply> {
    if body.is_empty() {
        return Ok(None);
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/json" => serde_json::from_slice(body)
            .map(Some)
            .map_err(|e| Reply::host_error(StatusCode::BAD_REQUEST, format!("Body is not valid JSON: {e}"))),
        "application/graphql" => Ok(Some(Value::Object(Map::from_iter([(
            "query".to_string(),
            Value::String(String::from_utf8_lossy(body).into_owned()),
        )])))),
        "application/x-www-form-urlencoded" => {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
                .map(|pairs| {
                    Some(Value::Object(
                        pairs
                            .into_iter()
                            .map(|(k, v)| (k, Value::String(v)))
                            .collect(),
                    ))
                })
                .map_err(|e| Reply::host_error(StatusCode::BAD_REQUEST, format!("Invalid form body: {e}")))
        }
        _ => Err(Reply::host_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported Media Type: {content_type}"),
        )),
    }
}

fn not_found(method: &Method, path: &str) -> Reply {
    Reply::host_error(StatusCode::NOT_FOUND, format!("Route {method}:{path} not found"))
}

fn too_large(route: &Route) -> Reply {
    with_cors(
        route,
        Reply::host_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body is larger than {} bytes", route.config.max_body_bytes),
        ),
    )
}

fn with_allow(mut reply: Reply, allow: &str) -> Reply {
    if let Ok(value) = HeaderValue::from_str(allow) {
        reply.headers.insert(ALLOW, value);
    }
    reply
}

fn with_cors(route: &Route, reply: Reply) -> Reply {
    if !route.config.cors {
        return reply;
    }
    reply
        .with_header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .with_header(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
        .with_header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_decode_json_body() {
        let body = Bytes::from_static(br#"{"query":"{a}"}"#);
        assert_eq!(
            decode_body(&headers("application/json; charset=utf-8"), &body).unwrap(),
            Some(json!({"query": "{a}"}))
        );
        assert_eq!(
            decode_body(&HeaderMap::new(), &body).unwrap(),
            Some(json!({"query": "{a}"}))
        );
        assert_eq!(decode_body(&HeaderMap::new(), &Bytes::new()).unwrap(), None);
    }

    #[test]
    fn test_decode_invalid_json() {
        let reply = decode_body(&headers("application/json"), &Bytes::from_static(b"{")).unwrap_err();
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_decode_graphql_and_form_bodies() {
        assert_eq!(
            decode_body(&headers("application/graphql"), &Bytes::from_static(b"{ hello }")).unwrap(),
            Some(json!({"query": "{ hello }"}))
        );
        assert_eq!(
            decode_body(
                &headers("application/x-www-form-urlencoded"),
                &Bytes::from_static(b"query=%7Bhello%7D&operationName=Q")
            )
            .unwrap(),
            Some(json!({"query": "{hello}", "operationName": "Q"}))
        );
    }

    #[test]
    fn test_decode_unsupported_media_type() {
        let reply = decode_body(&headers("text/plain"), &Bytes::from_static(b"hi")).unwrap_err();
        assert_eq!(reply.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_register_rejects_bad_paths() {
        let mut server = Server::default();
        assert_eq!(
            server.register(PluginOptions::new("graphql")).unwrap_err(),
            RegistrationError::InvalidPath("graphql".into())
        );
        assert_eq!(
            server.register(PluginOptions::new("")).unwrap_err(),
            RegistrationError::InvalidPath(String::new())
        );
        server.register(PluginOptions::new("/graphql")).unwrap();
        assert!(matches!(
            server.register(PluginOptions::new("/graphql")),
            Err(RegistrationError::DuplicateRoute { .. })
        ));
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::new().host("0.0.0.0").port(8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(ServerConfig::default().port, 4000);
    }
}
