//! Query planning.
//!
//! The planner picks the operation to run, coerces its variables and lowers
//! the selection tree into an owned [`QueryPlan`]. Plans hold no references
//! into the document, so they can cross `await` points and task boundaries.

use crate::error::GraphQLError;
use crate::schema::{InputFieldDef, Schema};
use crate::sdl::type_ref_from_ast;
use crate::value::{coerce_input_value, coerce_literal, inspect, print_value};
use gqlbridge_core::{Interner, LineIndex, Location, Span};
use gqlbridge_syntax::{
    Argument, Directive, Document, FieldSelection, FragmentDefinition, OperationDefinition,
    OperationType, Selection, SelectionSet, Value as AstValue,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::cell::Cell;

/// Deepest nesting of selection sets a plan may reach once fragment
/// spreads are inlined.
pub const MAX_PLAN_NESTING: usize = 128;

/// Query planner configuration.
///
/// A limit of `0` disables the check.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlannerConfig {
    /// Maximum query depth.
    pub max_depth: usize,
    /// Maximum query complexity.
    pub max_complexity: usize,
}

/// The query planner.
#[derive(Debug, Default)]
pub struct QueryPlanner {
    config: PlannerConfig,
}

impl QueryPlanner {
    /// Creates a new query planner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query planner with configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans the operation named `operation_name` (or the only operation)
    /// of a validated document.
    pub fn plan(
        &self,
        schema: &Schema,
        document: &Document<'_>,
        interner: &Interner,
        index: &LineIndex<'_>,
        operation_name: Option<&str>,
        variables: &Map<String, Value>,
    ) -> Result<QueryPlan, PlanError> {
        let operation = select_operation(document, interner, operation_name)?;
        let location = index.span_location(operation.span);
        if operation.operation == OperationType::Subscription {
            return Err(PlanError::OperationResolution(
                GraphQLError::new("Subscription operations are not supported.")
                    .with_location(location),
            ));
        }
        let root_type = schema
            .root_type_name(operation.operation)
            .ok_or_else(|| {
                PlanError::OperationResolution(
                    GraphQLError::new(format!(
                        "Schema is not configured to execute {} operation.",
                        operation.operation
                    ))
                    .with_location(location),
                )
            })?
            .to_string();

        let variables = coerce_variables(schema, operation, interner, index, variables)
            .map_err(PlanError::VariableCoercion)?;

        let mut fragments = FxHashMap::default();
        for fragment in document.fragments() {
            fragments
                .entry(interner.get(fragment.name.value))
                .or_insert(fragment);
        }
        let lowering = Lowering {
            schema,
            interner,
            index,
            fragments,
            variables: &variables,
            nesting: Cell::new(0),
            too_deep: Cell::new(false),
        };
        let selections =
            lowering.selection_set(&root_type, &operation.selection_set, &mut Vec::new());
        if lowering.too_deep.get() {
            return Err(PlanError::LimitExceeded(
                GraphQLError::new(format!(
                    "Query nesting exceeds the maximum depth of {MAX_PLAN_NESTING}."
                ))
                .with_location(location),
            ));
        }

        let depth = selection_depth(&selections);
        if self.config.max_depth > 0 && depth > self.config.max_depth {
            return Err(PlanError::LimitExceeded(
                GraphQLError::new(format!(
                    "Query depth {depth} exceeds the maximum allowed depth of {}.",
                    self.config.max_depth
                ))
                .with_location(location),
            ));
        }
        let complexity = selection_complexity(&selections);
        if self.config.max_complexity > 0 && complexity > self.config.max_complexity {
            return Err(PlanError::LimitExceeded(
                GraphQLError::new(format!(
                    "Query complexity {complexity} exceeds the maximum allowed complexity of {}.",
                    self.config.max_complexity
                ))
                .with_location(location),
            ));
        }

        let root = match operation.operation {
            OperationType::Mutation => PlanNode::Sequence(selections),
            _ => PlanNode::Parallel(selections),
        };
        Ok(QueryPlan {
            operation_name: operation.name.map(|name| interner.get(name.value)),
            operation: operation.operation,
            root_type,
            root,
            variables,
            depth,
            complexity,
        })
    }
}

/// A query plan.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub operation_name: Option<String>,
    pub operation: OperationType,
    /// Name of the root object type.
    pub root_type: String,
    /// The root node of the plan.
    pub root: PlanNode,
    /// Coerced variable values.
    pub variables: Map<String, Value>,
    pub depth: usize,
    pub complexity: usize,
}

impl QueryPlan {
    /// Returns true if the plan writes data.
    pub fn is_mutation(&self) -> bool {
        self.operation == OperationType::Mutation
    }

    /// Root selections, whichever strategy runs them.
    pub fn selections(&self) -> &[SelectionItem] {
        match &self.root {
            PlanNode::Sequence(items) | PlanNode::Parallel(items) => items,
        }
    }
}

/// How the root fields of a plan are run.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Sequential execution.
    Sequence(Vec<SelectionItem>),
    /// Parallel execution.
    Parallel(Vec<SelectionItem>),
}

/// One entry of a lowered selection set.
#[derive(Debug, Clone)]
pub enum SelectionItem {
    Field(FieldPlan),
    /// Selections that apply when the runtime type matches `type_condition`
    /// (always, when there is none).
    Conditional {
        type_condition: Option<String>,
        selections: Vec<SelectionItem>,
    },
}

/// A field to resolve.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub response_key: String,
    pub field_name: String,
    /// Coerced arguments, or the error that prevents resolving the field.
    pub arguments: Result<Map<String, Value>, GraphQLError>,
    pub locations: Vec<Location>,
    /// Sub-selections of composite fields.
    pub selection: Option<Vec<SelectionItem>>,
}

/// A planning error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlanError {
    /// The operation to run could not be determined.
    #[error("{0}")]
    OperationResolution(GraphQLError),

    /// Variable values do not match their declared types.
    #[error("{} variable value(s) are invalid", .0.len())]
    VariableCoercion(Vec<GraphQLError>),

    /// The query is too deep or too complex.
    #[error("{0}")]
    LimitExceeded(GraphQLError),
}

impl PlanError {
    /// Returns the client-facing errors.
    pub fn into_errors(self) -> Vec<GraphQLError> {
        match self {
            Self::OperationResolution(error) | Self::LimitExceeded(error) => vec![error],
            Self::VariableCoercion(errors) => errors,
        }
    }
}

fn select_operation<'d>(
    document: &'d Document<'_>,
    interner: &Interner,
    operation_name: Option<&str>,
) -> Result<&'d OperationDefinition, PlanError> {
    let operations = document.operations();
    let found = match operation_name {
        None => match operations.as_slice() {
            [] => return Err(resolution_error("Must provide an operation.")),
            [only] => Some(*only),
            _ => {
                return Err(resolution_error(
                    "Must provide operation name if query contains multiple operations.",
                ))
            }
        },
        Some(wanted) => operations
            .into_iter()
            .find(|op| op.name.is_some_and(|name| interner.is(name.value, wanted))),
    };
    found.ok_or_else(|| {
        resolution_error(format!(
            "Unknown operation named \"{}\".",
            operation_name.unwrap_or_default()
        ))
    })
}

fn resolution_error(message: impl Into<String>) -> PlanError {
    PlanError::OperationResolution(GraphQLError::new(message))
}

/// Coerces the request's variable values against the operation's
/// variable definitions.
fn coerce_variables(
    schema: &Schema,
    operation: &OperationDefinition,
    interner: &Interner,
    index: &LineIndex<'_>,
    inputs: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<GraphQLError>> {
    let mut coerced = Map::new();
    let mut errors = Vec::new();

    for definition in &operation.variables {
        let name = interner.get(definition.name.value);
        let ty = type_ref_from_ast(&definition.ty, interner);
        let mut error =
            |message: String| errors.push(GraphQLError::new(message).with_location(index.span_location(definition.span)));

        if !schema.is_input_type(&ty) {
            error(format!(
                "Variable \"${name}\" expected value of type \"{ty}\" which cannot be used as an input type."
            ));
            continue;
        }

        match inputs.get(&name) {
            None => {
                if let Some(default) = &definition.default_value {
                    match coerce_literal(schema, &ty, default, &Map::new(), interner) {
                        Ok(Some(value)) => {
                            coerced.insert(name, value);
                        }
                        Ok(None) => {}
                        Err(reason) => error(format!(
                            "Variable \"${name}\" has invalid default value {}; {reason}",
                            print_value(default, interner)
                        )),
                    }
                } else if ty.is_non_null() {
                    error(format!(
                        "Variable \"${name}\" of required type \"{ty}\" was not provided."
                    ));
                }
            }
            Some(Value::Null) if ty.is_non_null() => error(format!(
                "Variable \"${name}\" of non-null type \"{ty}\" must not be null."
            )),
            Some(value) => match coerce_input_value(schema, &ty, value) {
                Ok(value) => {
                    coerced.insert(name, value);
                }
                Err(invalid) => {
                    let mut prefix = format!("Variable \"${name}\" got invalid value {}", inspect(value));
                    if !invalid.path.is_empty() {
                        let path = invalid.path_string();
                        let separator = if path.starts_with('[') { "" } else { "." };
                        prefix.push_str(&format!(" at \"{name}{separator}{path}\""));
                    }
                    error(format!("{prefix}; {}", invalid.message));
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

struct Lowering<'a, 'd> {
    schema: &'a Schema,
    interner: &'a Interner,
    index: &'a LineIndex<'a>,
    fragments: FxHashMap<String, &'d FragmentDefinition>,
    variables: &'a Map<String, Value>,
    nesting: Cell<usize>,
    too_deep: Cell<bool>,
}

impl Lowering<'_, '_> {
    fn selection_set(
        &self,
        parent: &str,
        set: &SelectionSet,
        visiting: &mut Vec<String>,
    ) -> Vec<SelectionItem> {
        if self.too_deep.get() || self.nesting.get() >= MAX_PLAN_NESTING {
            self.too_deep.set(true);
            return Vec::new();
        }
        self.nesting.set(self.nesting.get() + 1);
        let items = self.selections(parent, set, visiting);
        self.nesting.set(self.nesting.get() - 1);
        items
    }

    fn selections(
        &self,
        parent: &str,
        set: &SelectionSet,
        visiting: &mut Vec<String>,
    ) -> Vec<SelectionItem> {
        let mut items = Vec::with_capacity(set.selections.len());
        for selection in &set.selections {
            if !self.should_include(selection.directives()) {
                continue;
            }
            match selection {
                Selection::Field(field) => {
                    items.push(SelectionItem::Field(self.field(parent, field, visiting)));
                }
                Selection::FragmentSpread(spread) => {
                    let name = self.interner.get(spread.name.value);
                    if visiting.contains(&name) {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(&name).copied() else {
                        continue;
                    };
                    let condition = self.interner.get(fragment.type_condition.value);
                    visiting.push(name);
                    let selections =
                        self.selection_set(&condition, &fragment.selection_set, visiting);
                    visiting.pop();
                    items.push(SelectionItem::Conditional {
                        type_condition: Some(condition),
                        selections,
                    });
                }
                Selection::InlineFragment(inline) => {
                    let condition = inline
                        .type_condition
                        .map(|name| self.interner.get(name.value));
                    let scope = condition.as_deref().unwrap_or(parent);
                    let selections = self.selection_set(scope, &inline.selection_set, visiting);
                    items.push(SelectionItem::Conditional {
                        type_condition: condition,
                        selections,
                    });
                }
            }
        }
        items
    }

    fn field(&self, parent: &str, field: &FieldSelection, visiting: &mut Vec<String>) -> FieldPlan {
        let field_name = self.interner.get(field.name.value);
        let def = if field_name == "__typename" {
            None
        } else {
            self.schema.field(parent, &field_name)
        };
        let arguments = match def {
            Some(def) => self.arguments(&def.arguments, &field.arguments, field.span),
            None => Ok(Map::new()),
        };
        let selection = field.selection_set.as_ref().map(|set| {
            let child = def.map_or("", |def| def.ty.name());
            self.selection_set(child, set, visiting)
        });
        FieldPlan {
            response_key: self.interner.get(field.response_key().value),
            field_name,
            arguments,
            locations: vec![self.location(field.span)],
            selection,
        }
    }

    fn location(&self, span: Span) -> Location {
        self.index.span_location(span)
    }

    fn arguments(
        &self,
        defs: &IndexMap<String, InputFieldDef>,
        provided: &[Argument],
        field_span: Span,
    ) -> Result<Map<String, Value>, GraphQLError> {
        let mut coerced = Map::new();
        for def in defs.values() {
            let argument = provided
                .iter()
                .find(|argument| self.interner.is(argument.name.value, &def.name));
            let Some(argument) = argument else {
                if let Some(default) = &def.default_value {
                    coerced.insert(def.name.clone(), default.clone());
                } else if def.ty.is_non_null() {
                    return Err(GraphQLError::new(format!(
                        "Argument \"{}\" of required type \"{}\" was not provided.",
                        def.name, def.ty
                    ))
                    .with_location(self.location(field_span)));
                }
                continue;
            };

            let value_location = self.location(argument.value.span());
            let is_null = match &argument.value {
                AstValue::Null(_) => true,
                AstValue::Variable(variable) => {
                    let variable = self.interner.get(variable.value);
                    let Some(value) = self.variables.get(&variable) else {
                        if let Some(default) = &def.default_value {
                            coerced.insert(def.name.clone(), default.clone());
                        } else if def.ty.is_non_null() {
                            return Err(GraphQLError::new(format!(
                                "Argument \"{}\" of required type \"{}\" was provided the variable \"${variable}\" which was not provided a runtime value.",
                                def.name, def.ty
                            ))
                            .with_location(value_location));
                        }
                        continue;
                    };
                    value.is_null()
                }
                _ => false,
            };
            if is_null && def.ty.is_non_null() {
                return Err(GraphQLError::new(format!(
                    "Argument \"{}\" of non-null type \"{}\" must not be null.",
                    def.name, def.ty
                ))
                .with_location(value_location));
            }

            match coerce_literal(self.schema, &def.ty, &argument.value, self.variables, self.interner)
            {
                Ok(Some(value)) => {
                    coerced.insert(def.name.clone(), value);
                }
                Ok(None) => {}
                Err(_) => {
                    return Err(GraphQLError::new(format!(
                        "Argument \"{}\" has invalid value {}.",
                        def.name,
                        print_value(&argument.value, self.interner)
                    ))
                    .with_location(value_location));
                }
            }
        }
        Ok(coerced)
    }

    /// Evaluates `@skip` and `@include`.
    fn should_include(&self, directives: &[Directive]) -> bool {
        for directive in directives {
            let condition = || self.directive_condition(directive);
            if self.interner.is(directive.name.value, "skip") && condition() == Some(true) {
                return false;
            }
            if self.interner.is(directive.name.value, "include") && condition() == Some(false) {
                return false;
            }
        }
        true
    }

    fn directive_condition(&self, directive: &Directive) -> Option<bool> {
        let argument = directive
            .arguments
            .iter()
            .find(|argument| self.interner.is(argument.name.value, "if"))?;
        match &argument.value {
            AstValue::Boolean(value, _) => Some(*value),
            AstValue::Variable(name) => self
                .variables
                .get(&self.interner.get(name.value))
                .and_then(Value::as_bool),
            _ => None,
        }
    }
}

/// Depth of the deepest field; root fields are at depth 1.
fn selection_depth(items: &[SelectionItem]) -> usize {
    items
        .iter()
        .map(|item| match item {
            SelectionItem::Field(field) => {
                1 + field.selection.as_deref().map_or(0, selection_depth)
            }
            SelectionItem::Conditional { selections, .. } => selection_depth(selections),
        })
        .max()
        .unwrap_or(0)
}

/// Number of fields in the plan, each costing one.
fn selection_complexity(items: &[SelectionItem]) -> usize {
    items
        .iter()
        .map(|item| match item {
            SelectionItem::Field(field) => {
                1 + field.selection.as_deref().map_or(0, selection_complexity)
            }
            SelectionItem::Conditional { selections, .. } => selection_complexity(selections),
        })
        .sum()
}
