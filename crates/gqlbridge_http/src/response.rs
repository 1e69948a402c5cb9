//! HTTP replies.

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Response, StatusCode};
use serde_json::Value;

pub(crate) type Body = BoxBody<Bytes, hyper::Error>;

pub(crate) fn full<T: Into<Bytes>>(chunk: T) -> Body {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}

/// A finished reply: status, headers and the serialized body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    /// A JSON reply.
    pub fn json(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    /// A JSON reply shaped like `{"error", "message", "statusCode"}`, used
    /// for host-level rejections that never reach the adapter.
    pub fn host_error(status: StatusCode, message: impl Into<String>) -> Self {
        let error = status.canonical_reason().unwrap_or("Error");
        Self::json(
            status,
            &serde_json::json!({
                "error": error,
                "message": message.into(),
                "statusCode": status.as_u16(),
            }),
        )
    }

    /// An empty reply.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }

    /// The body as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub(crate) fn into_hyper(self) -> Response<Body> {
        let mut response = Response::new(full(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_reply() {
        let reply = Reply::json(StatusCode::OK, &json!({"data": {"b": 1, "a": 2}}));
        assert_eq!(reply.headers[CONTENT_TYPE], "application/json");
        assert_eq!(reply.text(), r#"{"data":{"b":1,"a":2}}"#);
    }

    #[test]
    fn test_host_error() {
        let reply = Reply::host_error(StatusCode::NOT_FOUND, "Route GET:/nope not found");
        assert_eq!(
            reply.json_body().unwrap(),
            json!({"error": "Not Found", "message": "Route GET:/nope not found", "statusCode": 404})
        );
    }

    #[test]
    fn test_into_hyper() {
        let response = Reply::empty(StatusCode::NO_CONTENT)
            .with_header(hyper::header::ALLOW, "GET, POST")
            .into_hyper();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[hyper::header::ALLOW], "GET, POST");
    }
}
