//! Runtime for gqlbridge.
//!
//! This crate provides the GraphQL query engine driven by the HTTP adapter:
//! - `schema`: Schema definition, building and integrity checks
//! - `sdl`: Building a schema from SDL text
//! - `validation`: Validation of executable documents
//! - `query`: Operation selection, variable coercion and query planning
//! - `executor`: Query execution
//! - `resolver`: Field resolvers
//! - `context`: Request-scoped resolver context
//! - `value`: Input coercion and leaf serialization

pub mod context;
pub mod error;
pub mod executor;
mod overlap;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod sdl;
pub mod validation;
pub mod value;

pub use context::Context;
pub use error::{ExecutionError, GraphQLError, PathSegment, SchemaError};
pub use executor::{Executor, ExecutorConfig, Response};
pub use query::{
    FieldPlan, PlanError, PlanNode, PlannerConfig, QueryPlan, QueryPlanner, SelectionItem,
    MAX_PLAN_NESTING,
};
pub use resolver::{
    AsyncFnResolver, DefaultResolver, FnResolver, Resolver, ResolverArgs, ResolverError,
    ResolverFuture, ResolverInfo, ResolverMap, ResolverResult,
};
pub use schema::{
    DirectiveDefinition, EnumDef, EnumValueDef, FieldDef, InputFieldDef, InputObjectDef,
    InterfaceDef, ObjectDef, ScalarDef, Schema, SchemaBuilder, TypeDef, TypeRef, UnionDef,
};
pub use sdl::SdlError;
pub use validation::validate;
