//! Integration tests for the GraphQL route: registration, the request
//! scenarios and a real socket round trip.

use gqlbridge_http::{
    ConfigError, EngineConfig, InjectRequest, Method, PluginOptions, QueryConfig, Reply,
    RouteConfig, Server, ServerConfig, StatusCode,
};
use gqlbridge_runtime::{GraphQLError, ResolverError, ResolverMap, Schema};
use regex::Regex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SDL: &str = r#"
    type Query {
      hello: String
      greet(name: String!): String
      broken: String
    }

    type Mutation {
      rename(to: String!): String
    }
"#;

fn engine() -> EngineConfig {
    let mut resolvers = ResolverMap::new();
    resolvers.register_fn("Query", "greet", |_, args, _, _| {
        let name: String = args.require("name")?;
        Ok(json!(format!("Hello {name}!")))
    });
    resolvers.register_fn("Query", "broken", |_, _, _, _| {
        Err(ResolverError::custom("broken on purpose"))
    });
    resolvers.register_fn("Mutation", "rename", |_, args, _, _| {
        Ok(args.get("to").cloned().unwrap_or(Value::Null))
    });
    EngineConfig::new(Schema::from_sdl(SDL).unwrap())
        .resolvers(resolvers)
        .root_value(json!({ "hello": "Hello world!" }))
}

fn server_with(options: PluginOptions) -> Server {
    let mut server = Server::new(ServerConfig::new());
    server.register(options).unwrap();
    server
}

fn server() -> Server {
    server_with(PluginOptions::new("/graphql").query(engine()))
}

fn errors(reply: &Reply) -> Vec<Value> {
    reply.json_body().unwrap()["errors"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

#[test]
fn test_registers_get_and_post() {
    let mut server = Server::default();
    server
        .register(PluginOptions::new("/graphql").query(engine().format_error(|error| {
            json!({
                "message": error.message,
                "locations": error.locations,
                "stack": Value::Null,
            })
        })))
        .unwrap();

    assert!(server.has_route("/graphql", &Method::GET));
    assert!(server.has_route("/graphql", &Method::POST));
    assert!(!server.has_route("/graphql", &Method::PUT));
    assert!(!server.has_route("/other", &Method::GET));
}

#[test]
fn test_registers_without_query_option() {
    let server = server_with(PluginOptions::new("/graphql"));
    assert!(server.has_route("/graphql", &Method::GET));
    assert!(server.has_route("/graphql", &Method::POST));
}

#[tokio::test]
async fn test_get_hello() {
    let reply = server().inject(InjectRequest::get("/graphql?query={ hello }")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers["content-type"], "application/json");
    assert_eq!(reply.text(), r#"{"data":{"hello":"Hello world!"}}"#);
}

#[tokio::test]
async fn test_post_hello() {
    let reply = server()
        .inject(InjectRequest::post("/graphql").json(&json!({ "query": "{hello}" })))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json_body().unwrap(),
        json!({ "data": { "hello": "Hello world!" } })
    );
}

#[tokio::test]
async fn test_get_syntax_error() {
    let reply = server().inject(InjectRequest::get("/graphql?query={ }")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let errors = errors(&reply);
    assert_eq!(errors.len(), 1);
    let message = errors[0]["message"].as_str().unwrap();
    assert!(Regex::new("Syntax Error").unwrap().is_match(message), "{message}");
    assert!(reply.json_body().unwrap().get("data").is_none());
}

#[tokio::test]
async fn test_schema_without_fields_is_server_error() {
    let options = PluginOptions::new("/graphql").query(QueryConfig::per_request(|raw| {
        let schema = Schema::from_sdl("type Query").map_err(|e| ConfigError::new(e.to_string()))?;
        Ok(EngineConfig::new(schema).root_value(json!({ "path": raw.path })))
    }));
    let reply = server_with(options)
        .inject(InjectRequest::post("/graphql").json(&json!({ "query": "{ hello }" })))
        .await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    let errors = errors(&reply);
    assert_eq!(errors.len(), 1);
    let message = errors[0]["message"].as_str().unwrap();
    assert!(
        Regex::new("Type Query must define one or more fields")
            .unwrap()
            .is_match(message),
        "{message}"
    );
}

#[tokio::test]
async fn test_validation_error() {
    let reply = server()
        .inject(InjectRequest::get("/graphql?query=%7B%20nope%20%7D"))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    insta::assert_snapshot!(reply.text(), @r###"{"errors":[{"message":"Cannot query field \"nope\" on type \"Query\".","locations":[{"line":1,"column":3}]}]}"###);
}

#[tokio::test]
async fn test_deeply_nested_documents_are_syntax_errors() {
    let depth = 10_000;
    let selections = format!("{}{}", "{a".repeat(depth), "}".repeat(depth));
    let list = format!(
        "{{ greet(name: {}\"x\"{}) }}",
        "[".repeat(depth),
        "]".repeat(depth)
    );
    for query in [selections, list] {
        let reply = server()
            .inject(InjectRequest::post("/graphql").json(&json!({ "query": query })))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let errors = errors(&reply);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0]["message"],
            "Syntax Error: Document nesting exceeds the maximum depth of 128."
        );
    }
}

#[tokio::test]
async fn test_conflicting_response_keys_are_rejected() {
    let reply = server()
        .inject(InjectRequest::post("/graphql").json(&json!({
            "query": "{ a: hello a: greet(name: \"x\") }"
        })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    insta::assert_snapshot!(reply.text(), @r###"{"errors":[{"message":"Fields \"a\" conflict because \"hello\" and \"greet\" are different fields. Use different aliases on the fields to fetch both if this was intentional.","locations":[{"line":1,"column":3},{"line":1,"column":12}]}]}"###);

    let reply = server()
        .inject(InjectRequest::post("/graphql").json(&json!({
            "query": "{ greet(name: \"x\") greet(name: \"y\") }"
        })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let errors = errors(&reply);
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["message"]
        .as_str()
        .unwrap()
        .contains("they have differing arguments"));
}

#[tokio::test]
async fn test_partial_result() {
    let reply = server()
        .inject(InjectRequest::post("/graphql").json(&json!({ "query": "{ hello broken }" })))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json_body().unwrap(),
        json!({
            "data": { "hello": "Hello world!", "broken": null },
            "errors": [{
                "message": "broken on purpose",
                "locations": [{ "line": 1, "column": 9 }],
                "path": ["broken"]
            }]
        })
    );
}

#[tokio::test]
async fn test_variables_and_operation_name() {
    let query = "query A { hello } query B($name: String!) { greet(name: $name) }";
    let reply = server()
        .inject(InjectRequest::post("/graphql").json(&json!({
            "query": query,
            "variables": { "name": "Ada" },
            "operationName": "B",
        })))
        .await;
    assert_eq!(reply.text(), r#"{"data":{"greet":"Hello Ada!"}}"#);

    let url = "/graphql?query=query%20Q(%24name%3A%20String!)%7Bgreet(name%3A%20%24name)%7D&variables=%7B%22name%22%3A%22Bo%22%7D";
    let reply = server().inject(InjectRequest::get(url)).await;
    assert_eq!(reply.text(), r#"{"data":{"greet":"Hello Bo!"}}"#);
}

#[tokio::test]
async fn test_missing_query_and_bad_variables() {
    let server = server();

    let reply = server.inject(InjectRequest::get("/graphql")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.text(), r#"{"errors":[{"message":"Must provide query string."}]}"#);

    let reply = server
        .inject(InjectRequest::get("/graphql?query={hello}&variables=nope"))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.text(), r#"{"errors":[{"message":"Variables are invalid JSON."}]}"#);

    let reply = server
        .inject(InjectRequest::post("/graphql").json(&json!({
            "query": "query ($name: String!) { greet(name: $name) }",
        })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        errors(&reply)[0]["message"],
        r#"Variable "$name" of required type "String!" was not provided."#
    );
}

#[tokio::test]
async fn test_get_is_idempotent() {
    let server = server();
    let first = server
        .inject(InjectRequest::get("/graphql?query={ hello broken }"))
        .await;
    let second = server
        .inject(InjectRequest::get("/graphql?query={ hello broken }"))
        .await;
    assert_eq!(first.status, second.status);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn test_mutation_requires_post() {
    let server = server();
    let reply = server
        .inject(InjectRequest::get("/graphql?query=mutation{rename(to:\"x\")}"))
        .await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(reply.headers["allow"], "POST");

    let reply = server
        .inject(InjectRequest::post("/graphql").json(&json!({
            "query": "mutation { rename(to: \"x\") }",
        })))
        .await;
    assert_eq!(reply.text(), r#"{"data":{"rename":"x"}}"#);
}

#[tokio::test]
async fn test_config_error_is_server_error() {
    let options = PluginOptions::new("/graphql").query(QueryConfig::per_request(|raw| {
        match raw.header("x-tenant") {
            Some(_) => Ok(engine()),
            None => Err(ConfigError::new("Unknown tenant")),
        }
    }));
    let server = server_with(options);

    let reply = server.inject(InjectRequest::get("/graphql?query={hello}")).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.text(), r#"{"errors":[{"message":"Unknown tenant"}]}"#);

    let reply = server
        .inject(InjectRequest::get("/graphql?query={hello}").header("x-tenant", "acme"))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_query_config_is_server_error() {
    let reply = server_with(PluginOptions::new("/graphql"))
        .inject(InjectRequest::get("/graphql?query={hello}"))
        .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(errors(&reply).len(), 1);
}

#[tokio::test]
async fn test_format_error_applies_to_every_error() {
    fn format(error: &GraphQLError) -> Value {
        json!({
            "message": error.message,
            "locations": error.locations,
            "stack": format!("GraphQLError: {}", error.message),
        })
    }
    let server = server_with(
        PluginOptions::new("/graphql").query(engine().format_error(format)),
    );

    let reply = server.inject(InjectRequest::get("/graphql?query={")).await;
    assert_eq!(
        errors(&reply),
        vec![json!({
            "message": "Syntax Error: Expected Name, found <EOF>.",
            "locations": [{ "line": 1, "column": 2 }],
            "stack": "GraphQLError: Syntax Error: Expected Name, found <EOF>.",
        })]
    );

    let reply = server.inject(InjectRequest::get("/graphql?query={broken}")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(errors(&reply)[0]["stack"], "GraphQLError: broken on purpose");
}

#[tokio::test]
async fn test_host_rejections() {
    let server = server_with(
        PluginOptions::new("/graphql")
            .query(engine())
            .route_config(RouteConfig::new().max_body_bytes(32)),
    );

    let reply = server.inject(InjectRequest::get("/nope?query={hello}")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = server
        .inject(InjectRequest::new(Method::PUT, "/graphql?query={hello}"))
        .await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(reply.headers["allow"], "GET, POST");

    let reply = server
        .inject(InjectRequest::post("/graphql").json(&json!({ "query": "{ hello hello hello hello }" })))
        .await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);

    let reply = server
        .inject(
            InjectRequest::post("/graphql")
                .header("content-type", "text/plain")
                .body("{hello}"),
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let reply = server
        .inject(
            InjectRequest::post("/graphql")
                .header("content-type", "application/graphql")
                .body("{hello}"),
        )
        .await;
    assert_eq!(reply.text(), r#"{"data":{"hello":"Hello world!"}}"#);
}

#[tokio::test]
async fn test_cors() {
    let server = server_with(
        PluginOptions::new("/graphql")
            .query(engine())
            .route_config(RouteConfig::new().cors()),
    );

    let reply = server.inject(InjectRequest::new(Method::OPTIONS, "/graphql")).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert_eq!(reply.headers["access-control-allow-origin"], "*");

    let reply = server.inject(InjectRequest::get("/graphql?query={hello}")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_serves_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server().serve(listener, async {
        let _ = stopped.await;
    }));

    let body = r#"{"query":"{ hello }"}"#;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /graphql HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("content-type: application/json\r\n"), "{response}");
    assert!(response.ends_with(r#"{"data":{"hello":"Hello world!"}}"#), "{response}");

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
