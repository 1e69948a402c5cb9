//! Request normalization.
//!
//! Turns a transport request (GET query string or POST body) into a
//! canonical [`ExecutionRequest`].

use crate::error::RequestError;
use hyper::{HeaderMap, Method};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A request as handed over by the host server.
///
/// The body has already been decoded into a structured value by the host.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    pub path: String,
    /// Raw URL query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RawRequest {
    /// Creates a request with no query string, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the raw query string.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the decoded body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The canonical execution request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionRequest {
    pub query: String,
    pub variables: Option<Map<String, Value>>,
    pub operation_name: Option<String>,
}

impl ExecutionRequest {
    /// Variables, or an empty map when none were sent.
    pub fn variables(&self) -> Map<String, Value> {
        self.variables.clone().unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct UrlParams {
    query: Option<String>,
    variables: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
}

/// Extracts the execution request from `raw`.
///
/// GET reads `query`, `variables` (JSON text) and `operationName` from the
/// query string. Other methods read the same keys from the body object,
/// falling back to the query string for keys the body does not carry.
pub fn normalize(raw: &RawRequest) -> Result<ExecutionRequest, RequestError> {
    let params = url_params(raw.query.as_deref())?;

    if raw.method == Method::GET {
        return build(
            params.query,
            params.variables.map(Value::String),
            params.operation_name,
        );
    }

    let body = match &raw.body {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(RequestError::body("POST body must be a JSON object.")),
    };

    let query = match body.get("query") {
        None | Some(Value::Null) => params.query,
        Some(Value::String(query)) => Some(query.clone()),
        Some(_) => return Err(RequestError::body("POST body \"query\" must be a string.")),
    };
    let variables = match body.get("variables") {
        None => params.variables.map(Value::String),
        Some(value) => Some(value.clone()),
    };
    let operation_name = match body.get("operationName") {
        None | Some(Value::Null) => params.operation_name,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => {
            return Err(RequestError::body(
                "POST body \"operationName\" must be a string.",
            ))
        }
    };

    build(query, variables, operation_name)
}

fn url_params(query: Option<&str>) -> Result<UrlParams, RequestError> {
    match query {
        None | Some("") => Ok(UrlParams::default()),
        Some(query) => serde_urlencoded::from_str(query)
            .map_err(|e| RequestError::body(format!("Invalid query string: {e}"))),
    }
}

fn build(
    query: Option<String>,
    variables: Option<Value>,
    operation_name: Option<String>,
) -> Result<ExecutionRequest, RequestError> {
    let query = query
        .filter(|q| !q.is_empty())
        .ok_or(RequestError::MissingQuery)?;

    Ok(ExecutionRequest {
        query,
        variables: decode_variables(variables)?,
        operation_name: operation_name.filter(|name| !name.is_empty()),
    })
}

fn decode_variables(value: Option<Value>) -> Result<Option<Map<String, Value>>, RequestError> {
    let value = match value {
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map_err(|_| RequestError::variables("Variables are invalid JSON."))?,
        Some(value) => value,
        None => return Ok(None),
    };
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(RequestError::variables("Variables must be an object.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get(query: &str) -> RawRequest {
        RawRequest::new(Method::GET, "/graphql").with_query(query)
    }

    fn post(body: Value) -> RawRequest {
        RawRequest::new(Method::POST, "/graphql").with_body(body)
    }

    #[test]
    fn test_get_parameters() {
        let request = normalize(&get(
            "query=query%20Q(%24id%3A%20ID)%7Bhello%7D&variables=%7B%22id%22%3A1%7D&operationName=Q",
        ))
        .unwrap();
        assert_eq!(request.query, "query Q($id: ID){hello}");
        assert_eq!(request.variables, Some(json!({"id": 1}).as_object().unwrap().clone()));
        assert_eq!(request.operation_name.as_deref(), Some("Q"));
    }

    #[test]
    fn test_get_unencoded_braces() {
        let request = normalize(&get("query={ hello }")).unwrap();
        assert_eq!(request.query, "{ hello }");
        assert_eq!(request.variables, None);
        assert_eq!(request.operation_name, None);
    }

    #[test]
    fn test_get_ignores_body() {
        let raw = get("query={a}").with_body(json!({"query": "{b}"}));
        assert_eq!(normalize(&raw).unwrap().query, "{a}");
    }

    #[test]
    fn test_missing_query() {
        assert_eq!(normalize(&get("")), Err(RequestError::MissingQuery));
        assert_eq!(normalize(&get("query=")), Err(RequestError::MissingQuery));
        assert_eq!(
            normalize(&post(json!({"variables": {}}))),
            Err(RequestError::MissingQuery)
        );
        assert_eq!(
            normalize(&RawRequest::new(Method::POST, "/graphql")),
            Err(RequestError::MissingQuery)
        );
    }

    #[test]
    fn test_malformed_variables() {
        assert_eq!(
            normalize(&get("query={a}&variables={oops")),
            Err(RequestError::variables("Variables are invalid JSON."))
        );
        assert_eq!(
            normalize(&get("query={a}&variables=[1]")),
            Err(RequestError::variables("Variables must be an object."))
        );
        assert_eq!(
            normalize(&post(json!({"query": "{a}", "variables": 3}))),
            Err(RequestError::variables("Variables must be an object."))
        );
    }

    #[test]
    fn test_post_body() {
        let request = normalize(&post(json!({
            "query": "query Q { hello }",
            "variables": {"x": [1, 2]},
            "operationName": "Q",
        })))
        .unwrap();
        assert_eq!(request.query, "query Q { hello }");
        assert_eq!(request.variables(), *json!({"x": [1, 2]}).as_object().unwrap());
        assert_eq!(request.operation_name.as_deref(), Some("Q"));
    }

    #[test]
    fn test_post_variables_as_string() {
        let request =
            normalize(&post(json!({"query": "{a}", "variables": "{\"n\": null}"}))).unwrap();
        assert_eq!(request.variables, Some(json!({"n": null}).as_object().unwrap().clone()));

        let request = normalize(&post(json!({"query": "{a}", "variables": null}))).unwrap();
        assert_eq!(request.variables, None);
    }

    #[test]
    fn test_post_falls_back_to_query_string() {
        let raw = RawRequest::new(Method::POST, "/graphql")
            .with_query("query=%7Bhello%7D&operationName=Op")
            .with_body(json!({}));
        let request = normalize(&raw).unwrap();
        assert_eq!(request.query, "{hello}");
        assert_eq!(request.operation_name.as_deref(), Some("Op"));
    }

    #[test]
    fn test_malformed_body() {
        assert_eq!(
            normalize(&post(json!(["{a}"]))),
            Err(RequestError::body("POST body must be a JSON object."))
        );
        assert_eq!(
            normalize(&post(json!({"query": 1}))),
            Err(RequestError::body("POST body \"query\" must be a string."))
        );
        assert_eq!(
            normalize(&post(json!({"query": "{a}", "operationName": 1}))),
            Err(RequestError::body(
                "POST body \"operationName\" must be a string."
            ))
        );
    }
}
