//! Query execution.
//!
//! Root fields each run on their own tokio task: all at once for queries,
//! one after another for mutations. Nested fields are resolved in order
//! within their root field's task.

use crate::context::Context;
use crate::error::{ExecutionError, GraphQLError, PathSegment};
use crate::query::{FieldPlan, PlanNode, QueryPlan, SelectionItem};
use crate::resolver::{Resolver, ResolverArgs, ResolverInfo, ResolverMap};
use crate::schema::{FieldDef, Schema, TypeDef, TypeRef};
use crate::value::serialize_leaf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executor configuration.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Time limit for a single resolver call.
    pub field_timeout: Option<Duration>,
}

/// The query executor.
#[derive(Debug, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    /// Creates a new executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor with configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executes a query plan.
    ///
    /// Field errors end up in [`Response::errors`]. An `Err` is returned
    /// only when execution as a whole fails, e.g. a resolver panicked.
    pub async fn execute(
        &self,
        plan: Arc<QueryPlan>,
        schema: Arc<Schema>,
        resolvers: Arc<ResolverMap>,
        root_value: Value,
        ctx: Context,
    ) -> Result<Response, ExecutionError> {
        let root_type = plan.root_type.clone();
        if schema.object(&root_type).is_none() {
            return Err(ExecutionError::MissingRootType(plan.operation.to_string()));
        }

        let exec = Arc::new(Execution {
            schema,
            resolvers,
            ctx: ctx.with_variables(plan.variables.clone()),
            config: self.config.clone(),
        });

        let groups: Vec<(String, Vec<FieldPlan>)> =
            collect_fields(&exec.schema, &root_type, &[plan.selections()])
                .into_iter()
                .map(|(key, fields)| (key, fields.into_iter().cloned().collect()))
                .collect();

        let spawn = |key: String, fields: Vec<FieldPlan>| -> JoinHandle<RootOutcome> {
            let exec = Arc::clone(&exec);
            let root_value = root_value.clone();
            let root_type = root_type.clone();
            tokio::spawn(async move {
                let refs: Vec<&FieldPlan> = fields.iter().collect();
                let mut errors = Vec::new();
                let path = vec![PathSegment::Field(key.clone())];
                let result = exec
                    .execute_field(&root_type, &root_value, &refs, path, &mut errors)
                    .await;
                RootOutcome {
                    key,
                    field_name: refs[0].field_name.clone(),
                    result,
                    errors,
                }
            })
        };

        let mut data = Map::new();
        let mut errors = Vec::new();
        let mut data_is_null = false;

        match &plan.root {
            PlanNode::Parallel(_) => {
                let handles: Vec<_> = groups
                    .into_iter()
                    .map(|(key, fields)| {
                        let field_name = fields[0].field_name.clone();
                        (field_name, spawn(key, fields))
                    })
                    .collect();
                for (field_name, handle) in handles {
                    let outcome = handle
                        .await
                        .map_err(|e| join_error(e, &root_type, &field_name))?;
                    data_is_null |= outcome.merge_into(&mut data, &mut errors);
                }
            }
            PlanNode::Sequence(_) => {
                for (key, fields) in groups {
                    let field_name = fields[0].field_name.clone();
                    let outcome = spawn(key, fields)
                        .await
                        .map_err(|e| join_error(e, &root_type, &field_name))?;
                    tracing::trace!(field = %outcome.field_name, "mutation field completed");
                    if outcome.merge_into(&mut data, &mut errors) {
                        data_is_null = true;
                        break;
                    }
                }
            }
        }

        Ok(Response {
            data: if data_is_null {
                Value::Null
            } else {
                Value::Object(data)
            },
            errors,
        })
    }
}

struct RootOutcome {
    key: String,
    field_name: String,
    result: Option<Result<Value, GraphQLError>>,
    errors: Vec<GraphQLError>,
}

impl RootOutcome {
    /// Adds this field to the root object. Returns true if a non-null root
    /// field failed, which nulls the whole result.
    fn merge_into(self, data: &mut Map<String, Value>, errors: &mut Vec<GraphQLError>) -> bool {
        errors.extend(self.errors);
        match self.result {
            None => false,
            Some(Ok(value)) => {
                data.insert(self.key, value);
                false
            }
            Some(Err(error)) => {
                errors.push(error);
                true
            }
        }
    }
}

fn join_error(error: JoinError, root_type: &str, field_name: &str) -> ExecutionError {
    if !error.is_panic() {
        return ExecutionError::Join(error.to_string());
    }
    let payload = error.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ExecutionError::Panicked {
        field: format!("{root_type}.{field_name}"),
        message,
    }
}

/// State shared by every field of one execution.
struct Execution {
    schema: Arc<Schema>,
    resolvers: Arc<ResolverMap>,
    ctx: Context,
    config: ExecutorConfig,
}

impl Execution {
    /// Executes the merged `fields` sharing one response key.
    ///
    /// Returns `None` for fields the type does not define. An `Err` is a
    /// null that must propagate to the parent; nullable failures are
    /// recorded in `errors` instead.
    async fn execute_field(
        &self,
        parent_type: &str,
        parent: &Value,
        fields: &[&FieldPlan],
        path: Vec<PathSegment>,
        errors: &mut Vec<GraphQLError>,
    ) -> Option<Result<Value, GraphQLError>> {
        let field = fields[0];
        if field.field_name == "__typename" {
            return Some(Ok(Value::String(parent_type.to_string())));
        }
        let def = self.schema.field(parent_type, &field.field_name)?;

        let site = FieldSite {
            parent_type,
            fields,
        };
        let result = match self.resolve_field(&site, parent, def, &path).await {
            Ok(resolved) => {
                self.complete_value(&site, &def.ty, resolved, path, errors)
                    .await
            }
            Err(error) => Err(error),
        };

        Some(match result {
            Err(error) if !def.ty.is_non_null() => {
                errors.push(error);
                Ok(Value::Null)
            }
            other => other,
        })
    }

    async fn resolve_field(
        &self,
        site: &FieldSite<'_>,
        parent: &Value,
        def: &FieldDef,
        path: &[PathSegment],
    ) -> Result<Value, GraphQLError> {
        let field = site.fields[0];
        let args = match &field.arguments {
            Ok(arguments) => ResolverArgs::from_map(arguments.clone()),
            Err(error) => return Err(error.clone().with_path(path.to_vec())),
        };
        let info = ResolverInfo::new(&field.field_name, site.parent_type)
            .with_return_type(def.ty.to_string())
            .with_path(path.to_vec())
            .with_selected_fields(selected_fields(site.fields));

        let Some(resolver) = self.resolvers.get(site.parent_type, &field.field_name) else {
            return Err(site.error(
                format!(
                    "No resolver is registered for {}.{}.",
                    site.parent_type, field.field_name
                ),
                path,
            ));
        };
        let future = resolver.resolve(parent, &args, &self.ctx, &info);
        let result = match self.config.field_timeout {
            Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| {
                site.error(
                    format!(
                        "Resolver for {}.{} timed out after {}ms.",
                        site.parent_type,
                        field.field_name,
                        limit.as_millis()
                    ),
                    path,
                )
            })?,
            None => future.await,
        };
        result.map_err(|e| site.error(e.to_string(), path))
    }

    fn complete_value<'a>(
        &'a self,
        site: &'a FieldSite<'a>,
        ty: &'a TypeRef,
        value: Value,
        path: Vec<PathSegment>,
        errors: &'a mut Vec<GraphQLError>,
    ) -> BoxFuture<'a, Result<Value, GraphQLError>> {
        Box::pin(async move {
            match ty {
                TypeRef::NonNull(inner) => {
                    let completed = self
                        .complete_value(site, inner, value, path.clone(), errors)
                        .await?;
                    if completed.is_null() {
                        return Err(site.error(
                            format!(
                                "Cannot return null for non-nullable field {}.{}.",
                                site.parent_type, site.fields[0].field_name
                            ),
                            &path,
                        ));
                    }
                    Ok(completed)
                }
                _ if value.is_null() => Ok(Value::Null),
                TypeRef::List(inner) => {
                    let Value::Array(items) = value else {
                        return Err(site.error(
                            format!(
                                "Expected Iterable, but did not find one for field \"{}.{}\".",
                                site.parent_type, site.fields[0].field_name
                            ),
                            &path,
                        ));
                    };
                    let mut completed = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        let mut item_path = path.clone();
                        item_path.push(PathSegment::Index(index));
                        match self.complete_value(site, inner, item, item_path, errors).await {
                            Ok(value) => completed.push(value),
                            Err(error) if inner.is_non_null() => return Err(error),
                            Err(error) => {
                                errors.push(error);
                                completed.push(Value::Null);
                            }
                        }
                    }
                    Ok(Value::Array(completed))
                }
                TypeRef::Named(name) => match self.schema.get_type(name) {
                    Some(TypeDef::Scalar(_) | TypeDef::Enum(_)) => {
                        serialize_leaf(&self.schema, name, &value)
                            .map_err(|message| site.error(message, &path))
                    }
                    Some(TypeDef::Object(_)) => {
                        self.execute_object(name, &value, site.sub_selections(), &path, errors)
                            .await
                    }
                    Some(TypeDef::Interface(_) | TypeDef::Union(_)) => {
                        let runtime_type = self.resolve_abstract_type(site, name, &value, &path)?;
                        self.execute_object(
                            &runtime_type,
                            &value,
                            site.sub_selections(),
                            &path,
                            errors,
                        )
                        .await
                    }
                    _ => Err(site.error(
                        format!("Cannot complete value of unexpected output type: \"{name}\"."),
                        &path,
                    )),
                },
            }
        })
    }

    /// Determines the object type of a value of an interface or union type
    /// from its `__typename` property.
    fn resolve_abstract_type(
        &self,
        site: &FieldSite<'_>,
        abstract_type: &str,
        value: &Value,
        path: &[PathSegment],
    ) -> Result<String, GraphQLError> {
        let Some(runtime_type) = value.get("__typename").and_then(Value::as_str) else {
            return Err(site.error(
                format!(
                    "Abstract type \"{abstract_type}\" must resolve to an Object type at runtime for field \"{}.{}\". Provide a \"__typename\" property on the resolved value.",
                    site.parent_type, site.fields[0].field_name
                ),
                path,
            ));
        };
        if self.schema.object(runtime_type).is_none() {
            return Err(site.error(
                format!(
                    "Abstract type \"{abstract_type}\" was resolved to a type \"{runtime_type}\" that does not exist inside the schema."
                ),
                path,
            ));
        }
        if !self.schema.is_possible_type(abstract_type, runtime_type) {
            return Err(site.error(
                format!(
                    "Runtime Object type \"{runtime_type}\" is not a possible type for \"{abstract_type}\"."
                ),
                path,
            ));
        }
        Ok(runtime_type.to_string())
    }

    fn execute_object<'a>(
        &'a self,
        type_name: &'a str,
        value: &'a Value,
        selections: Vec<&'a [SelectionItem]>,
        path: &'a [PathSegment],
        errors: &'a mut Vec<GraphQLError>,
    ) -> BoxFuture<'a, Result<Value, GraphQLError>> {
        Box::pin(async move {
            let grouped = collect_fields(&self.schema, type_name, &selections);
            let mut object = Map::new();
            for (key, fields) in grouped {
                let mut field_path = path.to_vec();
                field_path.push(PathSegment::Field(key.clone()));
                match self
                    .execute_field(type_name, value, &fields, field_path, errors)
                    .await
                {
                    Some(Ok(completed)) => {
                        object.insert(key, completed);
                    }
                    Some(Err(error)) => return Err(error),
                    None => {}
                }
            }
            Ok(Value::Object(object))
        })
    }
}

/// The merged field nodes being executed and the type they belong to.
struct FieldSite<'a> {
    parent_type: &'a str,
    fields: &'a [&'a FieldPlan],
}

impl<'a> FieldSite<'a> {
    fn error(&self, message: impl Into<String>, path: &[PathSegment]) -> GraphQLError {
        let locations = self
            .fields
            .iter()
            .flat_map(|field| field.locations.iter().cloned())
            .collect();
        GraphQLError::new(message)
            .with_locations(locations)
            .with_path(path.to_vec())
    }

    fn sub_selections(&self) -> Vec<&'a [SelectionItem]> {
        self.fields
            .iter()
            .filter_map(|field| field.selection.as_deref())
            .collect()
    }
}

/// Groups the fields that apply to `type_name` by response key, in
/// selection order.
fn collect_fields<'p>(
    schema: &Schema,
    type_name: &str,
    selections: &[&'p [SelectionItem]],
) -> IndexMap<String, Vec<&'p FieldPlan>> {
    let mut grouped: IndexMap<String, Vec<&'p FieldPlan>> = IndexMap::new();
    for items in selections {
        collect_into(schema, type_name, items, &mut grouped);
    }
    grouped
}

fn collect_into<'p>(
    schema: &Schema,
    type_name: &str,
    items: &'p [SelectionItem],
    grouped: &mut IndexMap<String, Vec<&'p FieldPlan>>,
) {
    for item in items {
        match item {
            SelectionItem::Field(field) => {
                grouped
                    .entry(field.response_key.clone())
                    .or_default()
                    .push(field);
            }
            SelectionItem::Conditional {
                type_condition,
                selections,
            } => {
                let applies = type_condition.as_deref().map_or(true, |condition| {
                    condition == type_name || schema.is_possible_type(condition, type_name)
                });
                if applies {
                    collect_into(schema, type_name, selections, grouped);
                }
            }
        }
    }
}

/// Names of the fields selected directly below `fields`.
fn selected_fields(fields: &[&FieldPlan]) -> Vec<String> {
    fn walk(items: &[SelectionItem], out: &mut Vec<String>) {
        for item in items {
            match item {
                SelectionItem::Field(field) => {
                    if !out.contains(&field.field_name) {
                        out.push(field.field_name.clone());
                    }
                }
                SelectionItem::Conditional { selections, .. } => walk(selections, out),
            }
        }
    }
    let mut out = Vec::new();
    for field in fields {
        if let Some(selection) = &field.selection {
            walk(selection, &mut out);
        }
    }
    out
}

/// A GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The data; `null` when a non-null root field failed.
    pub data: Value,
    /// The errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    /// Creates a successful response with data.
    pub fn data(data: Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Returns true if the response has errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if the response has data.
    pub fn has_data(&self) -> bool {
        !self.data.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryPlanner;
    use crate::resolver::ResolverError;
    use gqlbridge_core::{Interner, LineIndex};
    use gqlbridge_syntax::parse;
    use serde_json::json;

    const SDL: &str = r#"
        type Query {
          hello: String
          user(id: ID!): User
          users: [User!]
          required: String!
          search: [SearchResult]
          slow: String
          broken: String
        }
        type Mutation { first: Int second: Int! third: Int }
        union SearchResult = User | Post
        type User { id: ID! name: String status: Status }
        type Post { title: String }
        enum Status { ACTIVE BANNED }
    "#;

    async fn run_with(
        config: ExecutorConfig,
        resolvers: ResolverMap,
        query: &str,
    ) -> Result<Response, ExecutionError> {
        let schema = Arc::new(Schema::from_sdl(SDL).unwrap());
        let plan = {
            let interner = Interner::new();
            let result = parse(query, &interner);
            assert!(result.is_ok(), "{query}");
            let index = LineIndex::new(query);
            QueryPlanner::new()
                .plan(&schema, &result.document, &interner, &index, None, &Map::new())
                .unwrap()
        };
        Executor::with_config(config)
            .execute(
                Arc::new(plan),
                schema,
                Arc::new(resolvers),
                json!({}),
                Context::new(),
            )
            .await
    }

    async fn run(resolvers: ResolverMap, query: &str) -> Response {
        run_with(ExecutorConfig::default(), resolvers, query)
            .await
            .unwrap()
    }

    fn users() -> ResolverMap {
        let mut resolvers = ResolverMap::new();
        resolvers.register_fn("Query", "hello", |_, _, _, _| Ok(json!("Hello world!")));
        resolvers.register_fn("Query", "user", |_, args, _, _| {
            let id: String = args.require("id")?;
            Ok(json!({"id": id, "name": "Ada", "status": "ACTIVE"}))
        });
        resolvers.register_async("Query", "users", |_, _, _, _| async {
            Ok(json!([
                {"id": "1", "name": "Ada"},
                {"id": null, "name": "Nobody"},
            ]))
        });
        resolvers
    }

    #[tokio::test]
    async fn test_simple_query() {
        let response = run(users(), "{ hello }").await;
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"data":{"hello":"Hello world!"}}"#
        );
    }

    #[tokio::test]
    async fn test_aliases_typename_and_arguments() {
        let response = run(
            users(),
            r#"{ greeting: hello user(id: 7) { __typename id name status } }"#,
        )
        .await;
        assert_eq!(
            response.data,
            json!({
                "greeting": "Hello world!",
                "user": {"__typename": "User", "id": "7", "name": "Ada", "status": "ACTIVE"}
            })
        );
        assert!(!response.has_errors());
    }

    #[tokio::test]
    async fn test_merged_response_keys() {
        let response = run(users(), "{ user(id: 1) { id } user(id: 1) { name } }").await;
        assert_eq!(response.data, json!({"user": {"id": "1", "name": "Ada"}}));
    }

    #[tokio::test]
    async fn test_null_propagates_to_nullable_list() {
        let response = run(users(), "{ hello users { id } }").await;
        assert_eq!(response.data, json!({"hello": "Hello world!", "users": null}));
        assert_eq!(response.errors.len(), 1);
        let error = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(
            error,
            json!({
                "message": "Cannot return null for non-nullable field User.id.",
                "locations": [{"line": 1, "column": 17}],
                "path": ["users", 1, "id"]
            })
        );
    }

    #[tokio::test]
    async fn test_non_null_root_field_nulls_data() {
        let response = run(users(), "{ hello required }").await;
        assert_eq!(response.data, Value::Null);
        assert_eq!(
            response.errors[0].message,
            "Cannot return null for non-nullable field Query.required."
        );
    }

    #[tokio::test]
    async fn test_resolver_error_is_a_field_error() {
        let mut resolvers = users();
        resolvers.register_fn("Query", "broken", |_, _, _, _| {
            Err(ResolverError::custom("database unavailable"))
        });
        let response = run(resolvers, "{ hello broken }").await;
        assert_eq!(response.data, json!({"hello": "Hello world!", "broken": null}));
        assert_eq!(
            serde_json::to_value(&response.errors).unwrap(),
            json!([{
                "message": "database unavailable",
                "locations": [{"line": 1, "column": 9}],
                "path": ["broken"]
            }])
        );
    }

    #[tokio::test]
    async fn test_missing_resolver_without_default_is_a_field_error() {
        let mut resolvers = users();
        resolvers.remove_default();
        let response = run(resolvers, "{ hello user(id: 1) { name } }").await;
        assert_eq!(
            response.data,
            json!({"hello": "Hello world!", "user": {"name": null}})
        );
        assert_eq!(
            serde_json::to_value(&response.errors).unwrap(),
            json!([{
                "message": "No resolver is registered for User.name.",
                "locations": [{"line": 1, "column": 23}],
                "path": ["user", "name"]
            }])
        );
    }

    #[tokio::test]
    async fn test_leaf_serialization_errors() {
        let mut resolvers = ResolverMap::new();
        resolvers.register_fn("Query", "user", |_, _, _, _| {
            Ok(json!({"id": "1", "status": "DELETED"}))
        });
        let response = run(resolvers, "{ user(id: 1) { status } }").await;
        assert_eq!(response.data, json!({"user": {"status": null}}));
        assert_eq!(
            response.errors[0].message,
            r#"Enum "Status" cannot represent value: "DELETED""#
        );
    }

    #[tokio::test]
    async fn test_abstract_types_resolve_from_typename() {
        let mut resolvers = ResolverMap::new();
        resolvers.register_fn("Query", "search", |_, _, _, _| {
            Ok(json!([
                {"__typename": "User", "id": "1", "name": "Ada"},
                {"__typename": "Post", "title": "Notes"},
                {"title": "Anonymous"},
            ]))
        });
        let response = run(
            resolvers,
            "{ search { __typename ... on User { name } ... on Post { title } } }",
        )
        .await;
        assert_eq!(
            response.data,
            json!({"search": [
                {"__typename": "User", "name": "Ada"},
                {"__typename": "Post", "title": "Notes"},
                null
            ]})
        );
        assert!(response.errors[0]
            .message
            .starts_with(r#"Abstract type "SearchResult" must resolve to an Object type"#));
    }

    #[tokio::test]
    async fn test_mutations_stop_at_failed_non_null_field() {
        let mut resolvers = ResolverMap::new();
        resolvers.register_fn("Mutation", "first", |_, _, _, _| Ok(json!(1)));
        resolvers.register_fn("Mutation", "second", |_, _, _, _| {
            Err(ResolverError::custom("rejected"))
        });
        resolvers.register_fn("Mutation", "third", |_, _, _, _| {
            panic!("must not run after a failed non-null field")
        });
        let response = run(resolvers, "mutation { first second third }").await;
        assert_eq!(response.data, Value::Null);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "rejected");
    }

    #[tokio::test]
    async fn test_field_timeout() {
        let mut resolvers = users();
        resolvers.register_async("Query", "slow", |_, _, _, _| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!("late"))
        });
        let config = ExecutorConfig {
            field_timeout: Some(Duration::from_millis(20)),
        };
        let response = run_with(config, resolvers, "{ hello slow }").await.unwrap();
        assert_eq!(response.data, json!({"hello": "Hello world!", "slow": null}));
        assert_eq!(
            response.errors[0].message,
            "Resolver for Query.slow timed out after 20ms."
        );
    }

    #[tokio::test]
    async fn test_panicking_resolver_is_unrecoverable() {
        let mut resolvers = users();
        resolvers.register_fn("Query", "broken", |_, _, _, _| panic!("boom"));
        let err = run_with(ExecutorConfig::default(), resolvers, "{ hello broken }")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Panicked {
                field: "Query.broken".to_string(),
                message: "boom".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_context_sees_variables() {
        let schema = Arc::new(Schema::from_sdl("type Query { echo(text: String): String }").unwrap());
        let query = "query ($text: String) { echo(text: $text) }";
        let plan = {
            let interner = Interner::new();
            let result = parse(query, &interner);
            let index = LineIndex::new(query);
            let variables = json!({"text": "hi"}).as_object().cloned().unwrap();
            QueryPlanner::new()
                .plan(&schema, &result.document, &interner, &index, None, &variables)
                .unwrap()
        };
        let mut resolvers = ResolverMap::new();
        resolvers.register_fn("Query", "echo", |_, args, ctx, _| {
            assert_eq!(ctx.variable("text"), args.get("text"));
            Ok(args.get("text").cloned().unwrap_or(Value::Null))
        });
        let response = Executor::new()
            .execute(
                Arc::new(plan),
                schema,
                Arc::new(resolvers),
                Value::Null,
                Context::new(),
            )
            .await
            .unwrap();
        assert_eq!(response.data, json!({"echo": "hi"}));
    }
}
