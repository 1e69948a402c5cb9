//! Validation of executable documents against a schema.
//!
//! Rules checked:
//! - only executable definitions, unique operation and fragment names,
//!   a lone anonymous operation, operation types the schema supports
//! - fields exist on their parent type, leaf fields have no selection and
//!   composite fields have one
//! - arguments are known, unique and required ones are present; literals
//!   fit their types
//! - fragments are known, used, acyclic and on composite types
//! - fields sharing a response key can be merged
//! - type names and directives are known, directives are in valid
//!   locations and not repeated
//! - variables are unique, input typed, defined, used and used in
//!   positions their type allows

use crate::error::GraphQLError;
use crate::overlap::Overlaps;
use crate::query::MAX_PLAN_NESTING;
use crate::schema::{InputFieldDef, Schema, TypeDef, TypeRef};
use crate::sdl::type_ref_from_ast;
use crate::value::literal_errors;
use gqlbridge_core::{Interner, LineIndex, Span};
use gqlbridge_syntax::{
    Argument, Definition, Directive, DirectiveLocation, Document, FieldSelection,
    FragmentDefinition, Name, OperationDefinition, OperationType, Selection, SelectionSet, Value,
};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

/// Validates `document` against `schema`.
///
/// Returns every error found; an empty list means the document may be
/// executed.
pub fn validate(
    schema: &Schema,
    document: &Document<'_>,
    interner: &Interner,
    index: &LineIndex<'_>,
) -> Vec<GraphQLError> {
    let mut validator = Validator {
        schema,
        interner,
        index,
        fragments: FxHashMap::default(),
        errors: Vec::new(),
    };
    validator.run(document);
    validator.errors
}

/// A variable reference and the type expected where it appears.
struct VariableUsage {
    name: String,
    span: Span,
    expected: Option<TypeRef>,
    location_has_default: bool,
}

/// What a definition's selection set refers to.
#[derive(Default)]
struct Usage {
    spreads: Vec<(String, Span)>,
    variables: Vec<VariableUsage>,
}

enum ArgumentOwner<'s> {
    Field { parent: &'s str, field: &'s str },
    Directive(&'s str),
}

struct Validator<'a, 'd> {
    schema: &'a Schema,
    interner: &'a Interner,
    index: &'a LineIndex<'a>,
    fragments: FxHashMap<String, &'d FragmentDefinition>,
    errors: Vec<GraphQLError>,
}

impl<'a, 'd> Validator<'a, 'd> {
    fn run(&mut self, document: &'d Document<'_>) {
        let mut operations = Vec::new();
        let mut fragments = Vec::new();
        for definition in &document.definitions {
            match definition {
                Definition::Operation(op) => operations.push(op),
                Definition::Fragment(fragment) => fragments.push(fragment),
                Definition::Schema(def) => {
                    self.error("The schema definition is not executable.", &[def.span]);
                }
                Definition::Type(def) => {
                    let name = self.name(def.name());
                    self.error(
                        format!("The \"{name}\" definition is not executable."),
                        &[def.span()],
                    );
                }
                Definition::Directive(def) => {
                    let name = self.name(def.name);
                    self.error(
                        format!("The \"{name}\" definition is not executable."),
                        &[def.span],
                    );
                }
            }
        }

        self.check_operation_names(&operations);
        for fragment in &fragments {
            let name = self.name(fragment.name);
            if let Some(first) = self.fragments.get(&name) {
                let first_span = first.name.span;
                self.error(
                    format!("There can be only one fragment named \"{name}\"."),
                    &[first_span, fragment.name.span],
                );
            } else {
                self.fragments.insert(name, fragment);
            }
        }

        let mut fragment_usages: FxHashMap<String, Usage> = FxHashMap::default();
        for fragment in &fragments {
            let usage = self.visit_fragment(fragment);
            fragment_usages
                .entry(self.name(fragment.name))
                .or_insert(usage);
        }

        let mut used_fragments = FxHashSet::default();
        for op in &operations {
            let usage = self.visit_operation(op);
            let reachable = reachable_fragments(&usage, &fragment_usages);
            self.check_variables(op, &usage, &reachable, &fragment_usages);
            used_fragments.extend(reachable);
        }

        for fragment in &fragments {
            let name = self.name(fragment.name);
            if !used_fragments.contains(&name) {
                self.error(
                    format!("Fragment \"{name}\" is never used."),
                    &[fragment.span],
                );
            }
        }

        self.check_fragment_cycles(&fragments, &fragment_usages);
    }

    fn name(&self, name: Name) -> String {
        self.interner.get(name.value)
    }

    fn error(&mut self, message: impl Into<String>, spans: &[Span]) {
        let locations = spans
            .iter()
            .map(|span| self.index.span_location(*span))
            .collect();
        self.errors
            .push(GraphQLError::new(message).with_locations(locations));
    }

    fn check_operation_names(&mut self, operations: &[&OperationDefinition]) {
        let mut seen: Vec<(String, Span)> = Vec::new();
        for op in operations {
            match op.name {
                None if operations.len() > 1 => self.error(
                    "This anonymous operation must be the only defined operation.",
                    &[op.span],
                ),
                None => {}
                Some(name) => {
                    let value = self.name(name);
                    if let Some((_, first)) = seen.iter().find(|(n, _)| *n == value) {
                        let first = *first;
                        self.error(
                            format!("There can be only one operation named \"{value}\"."),
                            &[first, name.span],
                        );
                    } else {
                        seen.push((value, name.span));
                    }
                }
            }
            if self.schema.root_type_name(op.operation).is_none() {
                self.error(
                    format!(
                        "Schema is not configured to execute {} operation.",
                        op.operation
                    ),
                    &[op.span],
                );
            }
        }
    }

    fn visit_operation(&mut self, op: &OperationDefinition) -> Usage {
        let mut usage = Usage::default();
        let location = match op.operation {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        };

        let mut seen: Vec<String> = Vec::new();
        for var in &op.variables {
            let name = self.name(var.name);
            if seen.contains(&name) {
                self.error(
                    format!("There can be only one variable named \"${name}\"."),
                    &[var.name.span],
                );
            }
            seen.push(name.clone());

            let ty = type_ref_from_ast(&var.ty, self.interner);
            if self.schema.get_type(ty.name()).is_none() {
                self.error(
                    format!("Unknown type \"{}\".", ty.name()),
                    &[var.ty.named().span],
                );
            } else if !self.schema.is_input_type(&ty) {
                self.error(
                    format!("Variable \"${name}\" cannot be non-input type \"{ty}\"."),
                    &[var.ty.span()],
                );
            } else if let Some(default) = &var.default_value {
                self.check_literal(&ty, default);
            }
            self.visit_directives(&var.directives, DirectiveLocation::VariableDefinition, &mut usage);
        }

        self.visit_directives(&op.directives, location, &mut usage);
        let root = self
            .schema
            .root_type_name(op.operation)
            .filter(|name| self.schema.is_composite_type(name));
        self.visit_selection_set(root, &op.selection_set, &mut usage);
        usage
    }

    fn visit_fragment(&mut self, fragment: &FragmentDefinition) -> Usage {
        let mut usage = Usage::default();
        let parent = self.type_condition(fragment.type_condition, Some(fragment.name));
        self.visit_directives(
            &fragment.directives,
            DirectiveLocation::FragmentDefinition,
            &mut usage,
        );
        self.visit_selection_set(parent.as_deref(), &fragment.selection_set, &mut usage);
        usage
    }

    /// Checks a type condition, returning the type name when fields can be
    /// checked against it.
    fn type_condition(&mut self, condition: Name, fragment: Option<Name>) -> Option<String> {
        let type_name = self.name(condition);
        if self.schema.get_type(&type_name).is_none() {
            self.error(format!("Unknown type \"{type_name}\"."), &[condition.span]);
            return None;
        }
        if !self.schema.is_composite_type(&type_name) {
            let message = match fragment {
                Some(fragment) => format!(
                    "Fragment \"{}\" cannot condition on non composite type \"{type_name}\".",
                    self.name(fragment)
                ),
                None => format!(
                    "Fragment cannot condition on non composite type \"{type_name}\"."
                ),
            };
            self.error(message, &[condition.span]);
            return None;
        }
        Some(type_name)
    }

    fn visit_selection_set(&mut self, parent: Option<&str>, set: &SelectionSet, usage: &mut Usage) {
        self.check_overlaps(parent, set);
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    self.visit_directives(&field.directives, DirectiveLocation::Field, usage);
                    self.visit_field(parent, field, usage);
                }
                Selection::FragmentSpread(spread) => {
                    self.visit_directives(
                        &spread.directives,
                        DirectiveLocation::FragmentSpread,
                        usage,
                    );
                    let name = self.name(spread.name);
                    if !self.fragments.contains_key(&name) {
                        self.error(format!("Unknown fragment \"{name}\"."), &[spread.name.span]);
                    }
                    usage.spreads.push((name, spread.span));
                }
                Selection::InlineFragment(inline) => {
                    self.visit_directives(
                        &inline.directives,
                        DirectiveLocation::InlineFragment,
                        usage,
                    );
                    let inner = match inline.type_condition {
                        Some(condition) => self.type_condition(condition, None),
                        None => parent.map(str::to_string),
                    };
                    self.visit_selection_set(inner.as_deref(), &inline.selection_set, usage);
                }
            }
        }
    }

    fn check_overlaps(&mut self, parent: Option<&str>, set: &SelectionSet) {
        let conflicts = Overlaps {
            schema: self.schema,
            interner: self.interner,
            fragments: &self.fragments,
        }
        .within(parent, set);
        for conflict in conflicts {
            self.error(conflict.message(), &conflict.spans());
        }
    }

    fn visit_field(&mut self, parent: Option<&str>, field: &FieldSelection, usage: &mut Usage) {
        let field_name = self.name(field.name);
        let schema = self.schema;

        if field_name == "__typename" {
            self.visit_arguments(&field.arguments, None, None, field.span, usage);
            if let Some(set) = &field.selection_set {
                self.error(
                    "Field \"__typename\" must not have a selection since type \"String!\" has no subfields.",
                    &[set.span],
                );
            }
            return;
        }

        let Some(parent) = parent else {
            self.visit_arguments(&field.arguments, None, None, field.span, usage);
            if let Some(set) = &field.selection_set {
                self.visit_selection_set(None, set, usage);
            }
            return;
        };

        let Some(def) = schema.field(parent, &field_name) else {
            self.error(
                format!("Cannot query field \"{field_name}\" on type \"{parent}\"."),
                &[field.span],
            );
            self.visit_arguments(&field.arguments, None, None, field.span, usage);
            if let Some(set) = &field.selection_set {
                self.visit_selection_set(None, set, usage);
            }
            return;
        };

        self.visit_arguments(
            &field.arguments,
            Some(&def.arguments),
            Some(ArgumentOwner::Field {
                parent,
                field: &field_name,
            }),
            field.span,
            usage,
        );

        let named = def.ty.name();
        let child = if schema.is_leaf_type(named) {
            if let Some(set) = &field.selection_set {
                self.error(
                    format!(
                        "Field \"{field_name}\" must not have a selection since type \"{}\" has no subfields.",
                        def.ty
                    ),
                    &[set.span],
                );
            }
            None
        } else if schema.is_composite_type(named) {
            if field.selection_set.is_none() {
                self.error(
                    format!(
                        "Field \"{field_name}\" of type \"{}\" must have a selection of subfields. Did you mean \"{field_name} {{ ... }}\"?",
                        def.ty
                    ),
                    &[field.span],
                );
            }
            Some(named)
        } else {
            None
        };

        if let Some(set) = &field.selection_set {
            self.visit_selection_set(child, set, usage);
        }
    }

    fn visit_arguments(
        &mut self,
        arguments: &[Argument],
        defs: Option<&IndexMap<String, InputFieldDef>>,
        owner: Option<ArgumentOwner<'_>>,
        node_span: Span,
        usage: &mut Usage,
    ) {
        let mut seen: Vec<(String, Span)> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let name = self.name(argument.name);
            if let Some((_, first)) = seen.iter().find(|(n, _)| *n == name) {
                let first = *first;
                self.error(
                    format!("There can be only one argument named \"{name}\"."),
                    &[first, argument.name.span],
                );
            } else {
                seen.push((name.clone(), argument.name.span));
            }

            let def = defs.and_then(|defs| defs.get(&name));
            match (def, &owner) {
                (Some(def), _) => {
                    self.check_literal(&def.ty, &argument.value);
                    self.collect_variables(
                        &argument.value,
                        Some(&def.ty),
                        def.default_value.is_some(),
                        usage,
                    );
                }
                (None, Some(ArgumentOwner::Field { parent, field })) => {
                    self.error(
                        format!("Unknown argument \"{name}\" on field \"{parent}.{field}\"."),
                        &[argument.name.span],
                    );
                    self.collect_variables(&argument.value, None, false, usage);
                }
                (None, Some(ArgumentOwner::Directive(directive))) => {
                    self.error(
                        format!("Unknown argument \"{name}\" on directive \"@{directive}\"."),
                        &[argument.name.span],
                    );
                    self.collect_variables(&argument.value, None, false, usage);
                }
                (None, None) => self.collect_variables(&argument.value, None, false, usage),
            }
        }

        let (Some(defs), Some(owner)) = (defs, owner) else {
            return;
        };
        for def in defs.values() {
            if def.is_required() && !seen.iter().any(|(n, _)| *n == def.name) {
                let message = match &owner {
                    ArgumentOwner::Field { field, .. } => format!(
                        "Field \"{field}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        def.name, def.ty
                    ),
                    ArgumentOwner::Directive(directive) => format!(
                        "Directive \"@{directive}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        def.name, def.ty
                    ),
                };
                self.error(message, &[node_span]);
            }
        }
    }

    fn visit_directives(
        &mut self,
        directives: &[Directive],
        location: DirectiveLocation,
        usage: &mut Usage,
    ) {
        let schema = self.schema;
        let mut seen: Vec<String> = Vec::new();
        for directive in directives {
            let name = self.name(directive.name);
            let Some(def) = schema.directive(&name) else {
                self.error(format!("Unknown directive \"@{name}\"."), &[directive.span]);
                self.visit_arguments(&directive.arguments, None, None, directive.span, usage);
                continue;
            };
            if !def.locations.contains(&location) {
                self.error(
                    format!(
                        "Directive \"@{name}\" may not be used on {}.",
                        location.as_str()
                    ),
                    &[directive.span],
                );
            }
            if !def.repeatable {
                if seen.contains(&name) {
                    self.error(
                        format!(
                            "The directive \"@{name}\" can only be used once at this location."
                        ),
                        &[directive.span],
                    );
                }
                seen.push(name.clone());
            }
            self.visit_arguments(
                &directive.arguments,
                Some(&def.arguments),
                Some(ArgumentOwner::Directive(&name)),
                directive.span,
                usage,
            );
        }
    }

    fn check_literal(&mut self, ty: &TypeRef, value: &Value) {
        for (span, message) in literal_errors(self.schema, ty, value, self.interner) {
            self.error(message, &[span]);
        }
    }

    fn collect_variables(
        &self,
        value: &Value,
        expected: Option<&TypeRef>,
        location_has_default: bool,
        usage: &mut Usage,
    ) {
        match value {
            Value::Variable(name) => usage.variables.push(VariableUsage {
                name: self.name(*name),
                span: name.span,
                expected: expected.cloned(),
                location_has_default,
            }),
            Value::List(items, _) => {
                let item_type = expected.and_then(|ty| match ty.nullable() {
                    TypeRef::List(inner) => Some(inner.as_ref()),
                    _ => None,
                });
                for item in items {
                    self.collect_variables(item, item_type, false, usage);
                }
            }
            Value::Object(fields, _) => {
                let input = expected.and_then(|ty| match (ty.nullable(), self.schema.get_type(ty.name())) {
                    (TypeRef::Named(_), Some(TypeDef::InputObject(input))) => Some(input),
                    _ => None,
                });
                for (name, field_value) in fields {
                    let def = input.and_then(|input| input.fields.get(&self.name(*name)));
                    self.collect_variables(
                        field_value,
                        def.map(|def| &def.ty),
                        def.is_some_and(|def| def.default_value.is_some()),
                        usage,
                    );
                }
            }
            _ => {}
        }
    }

    fn check_variables(
        &mut self,
        op: &OperationDefinition,
        usage: &Usage,
        reachable: &[String],
        fragment_usages: &FxHashMap<String, Usage>,
    ) {
        let op_name = op.name.map(|name| self.name(name));
        let usages = usage.variables.iter().chain(
            reachable
                .iter()
                .filter_map(|name| fragment_usages.get(name))
                .flat_map(|usage| usage.variables.iter()),
        );

        let mut used: FxHashSet<String> = FxHashSet::default();
        for variable in usages {
            used.insert(variable.name.clone());
            let definition = op
                .variables
                .iter()
                .find(|def| self.interner.is(def.name.value, &variable.name));
            let Some(definition) = definition else {
                let message = match &op_name {
                    Some(op_name) => format!(
                        "Variable \"${}\" is not defined by operation \"{op_name}\".",
                        variable.name
                    ),
                    None => format!("Variable \"${}\" is not defined.", variable.name),
                };
                self.error(message, &[variable.span, op.span]);
                continue;
            };

            let Some(expected) = &variable.expected else { continue };
            let var_type = type_ref_from_ast(&definition.ty, self.interner);
            if !self.schema.is_input_type(&var_type) {
                continue;
            }
            let has_non_null_default = definition
                .default_value
                .as_ref()
                .is_some_and(|value| !matches!(value, Value::Null(_)));
            if !self.allowed_variable_usage(
                &var_type,
                has_non_null_default,
                expected,
                variable.location_has_default,
            ) {
                self.error(
                    format!(
                        "Variable \"${}\" of type \"{var_type}\" used in position expecting type \"{expected}\".",
                        variable.name
                    ),
                    &[definition.span, variable.span],
                );
            }
        }

        for definition in &op.variables {
            let name = self.name(definition.name);
            if !used.contains(&name) {
                let message = match &op_name {
                    Some(op_name) => {
                        format!("Variable \"${name}\" is never used in operation \"{op_name}\".")
                    }
                    None => format!("Variable \"${name}\" is never used."),
                };
                self.error(message, &[definition.span]);
            }
        }
    }

    fn allowed_variable_usage(
        &self,
        var_type: &TypeRef,
        has_non_null_default: bool,
        location_type: &TypeRef,
        location_has_default: bool,
    ) -> bool {
        if location_type.is_non_null() && !var_type.is_non_null() {
            if !has_non_null_default && !location_has_default {
                return false;
            }
            return self.schema.is_subtype(var_type, location_type.nullable());
        }
        self.schema.is_subtype(var_type, location_type)
    }

    fn check_fragment_cycles(
        &mut self,
        fragments: &[&FragmentDefinition],
        usages: &FxHashMap<String, Usage>,
    ) {
        let mut cycles = CycleDetector {
            usages,
            visited: FxHashSet::default(),
            path: Vec::new(),
            path_index: FxHashMap::default(),
            found: Vec::new(),
        };
        for fragment in fragments {
            cycles.detect(&self.name(fragment.name));
        }
        for (message, spans) in cycles.found {
            self.error(message, &spans);
        }
    }
}

/// Fragment names reachable from `usage` through spreads, in discovery order.
fn reachable_fragments(usage: &Usage, fragment_usages: &FxHashMap<String, Usage>) -> Vec<String> {
    let mut reached: Vec<String> = Vec::new();
    let mut stack: Vec<&str> = usage.spreads.iter().rev().map(|(n, _)| n.as_str()).collect();
    while let Some(name) = stack.pop() {
        if reached.iter().any(|r| r == name) {
            continue;
        }
        reached.push(name.to_string());
        if let Some(inner) = fragment_usages.get(name) {
            stack.extend(inner.spreads.iter().rev().map(|(n, _)| n.as_str()));
        }
    }
    reached
}

struct CycleDetector<'u> {
    usages: &'u FxHashMap<String, Usage>,
    visited: FxHashSet<String>,
    path: Vec<(&'u str, Span)>,
    path_index: FxHashMap<&'u str, usize>,
    found: Vec<(String, Vec<Span>)>,
}

impl<'u> CycleDetector<'u> {
    fn detect(&mut self, fragment: &str) {
        let usages = self.usages;
        let Some((name, usage)) = usages.get_key_value(fragment) else {
            return;
        };
        if !self.visited.insert(name.clone()) || usage.spreads.is_empty() {
            return;
        }
        self.path_index.insert(name.as_str(), self.path.len());
        for (spread, span) in &usage.spreads {
            let cycle_start = self.path_index.get(spread.as_str()).copied();
            self.path.push((spread.as_str(), *span));
            match cycle_start {
                None if self.path.len() <= MAX_PLAN_NESTING => self.detect(spread),
                None => {}
                Some(start) => {
                    let cycle = &self.path[start..];
                    let via: Vec<String> = cycle[..cycle.len() - 1]
                        .iter()
                        .map(|(name, _)| format!("\"{name}\""))
                        .collect();
                    let message = if via.is_empty() {
                        format!("Cannot spread fragment \"{spread}\" within itself.")
                    } else {
                        format!(
                            "Cannot spread fragment \"{spread}\" within itself via {}.",
                            via.join(", ")
                        )
                    };
                    self.found
                        .push((message, cycle.iter().map(|(_, span)| *span).collect()));
                }
            }
            self.path.pop();
        }
        self.path_index.remove(name.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlbridge_syntax::parse;

    const SDL: &str = r#"
        type Query {
          hello: String
          user(id: ID!): User
          users(first: Int = 10, filter: Filter): [User!]!
          node(id: ID!): Node
        }
        type Mutation { rename(id: ID!, name: String!): User }
        interface Node { id: ID! }
        type User implements Node { id: ID! name: String friends: [User!]! }
        input Filter { role: Role! }
        enum Role { ADMIN GUEST }
    "#;

    fn messages(query: &str) -> Vec<String> {
        let schema = Schema::from_sdl(SDL).unwrap();
        let interner = Interner::new();
        let result = parse(query, &interner);
        assert!(result.is_ok(), "{query}");
        let index = LineIndex::new(query);
        validate(&schema, &result.document, &interner, &index)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    #[test]
    fn test_valid_documents() {
        assert!(messages("{ hello }").is_empty());
        assert!(messages("query Q($id: ID!) { user(id: $id) { id name __typename } }").is_empty());
        assert!(messages(
            "query { users(filter: {role: ADMIN}) { ...F } } fragment F on User { friends { id } }"
        )
        .is_empty());
        assert!(messages("{ node(id: 1) { id ... on User { name } } }").is_empty());
        assert!(messages("query ($skip: Boolean!) { hello @skip(if: $skip) }").is_empty());
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            messages("{ hello goodbye }"),
            vec![r#"Cannot query field "goodbye" on type "Query"."#]
        );
    }

    #[test]
    fn test_leaf_and_composite_selections() {
        insta::assert_debug_snapshot!(messages("{ hello { x } user(id: 1) }"), @r###"
        [
            "Field \"hello\" must not have a selection since type \"String\" has no subfields.",
            "Field \"user\" of type \"User\" must have a selection of subfields. Did you mean \"user { ... }\"?",
        ]
        "###);
    }

    #[test]
    fn test_arguments() {
        insta::assert_debug_snapshot!(messages("{ user { id } users(first: 1, first: 2, last: 3) { id } }"), @r###"
        [
            "Field \"user\" argument \"id\" of type \"ID!\" is required, but it was not provided.",
            "There can be only one argument named \"first\".",
            "Unknown argument \"last\" on field \"Query.users\".",
        ]
        "###);
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(
            messages(r#"{ users(first: "ten") { id } }"#),
            vec![r#"Expected value of type "Int", found "ten"; Int cannot represent non-integer value: "ten""#]
        );
        assert_eq!(
            messages("{ users(filter: {role: OWNER}) { id } }"),
            vec![r#"Expected value of type "Role!", found OWNER; Value "OWNER" does not exist in "Role" enum."#]
        );
    }

    #[test]
    fn test_operation_rules() {
        insta::assert_debug_snapshot!(messages("query A { hello } query A { hello } { hello }"), @r###"
        [
            "There can be only one operation named \"A\".",
            "This anonymous operation must be the only defined operation.",
        ]
        "###);
    }

    #[test]
    fn test_executable_definitions_only() {
        assert_eq!(
            messages("{ hello } type Extra { a: Int }"),
            vec![r#"The "Extra" definition is not executable."#]
        );
    }

    #[test]
    fn test_fragment_rules() {
        insta::assert_debug_snapshot!(
            messages("{ ...Missing user(id: 1) { ...A } } fragment A on User { ...B } fragment B on User { ...A } fragment C on Role { x }"),
            @r###"
        [
            "Fragment \"C\" cannot condition on non composite type \"Role\".",
            "Unknown fragment \"Missing\".",
            "Fragment \"C\" is never used.",
            "Cannot spread fragment \"A\" within itself via \"B\".",
        ]
        "###
        );
    }

    #[test]
    fn test_unknown_types_and_directives() {
        insta::assert_debug_snapshot!(
            messages("query ($a: Nope) { hello @cached ... on Ghost { hello } }"),
            @r###"
        [
            "Unknown type \"Nope\".",
            "Unknown directive \"@cached\".",
            "Unknown type \"Ghost\".",
            "Variable \"$a\" is never used.",
        ]
        "###
        );
    }

    #[test]
    fn test_directive_locations() {
        assert_eq!(
            messages("query @skip(if: true) { hello @include(if: true) @include(if: false) }"),
            vec![
                r#"Directive "@skip" may not be used on QUERY."#,
                r#"The directive "@include" can only be used once at this location."#,
            ]
        );
    }

    #[test]
    fn test_variable_rules() {
        insta::assert_debug_snapshot!(
            messages("query Q($id: ID, $id: ID, $unused: Int, $obj: User) { user(id: $id) { id } node(id: $missing) { id } }"),
            @r###"
        [
            "There can be only one variable named \"$id\".",
            "Variable \"$obj\" cannot be non-input type \"User\".",
            "Variable \"$id\" of type \"ID\" used in position expecting type \"ID!\".",
            "Variable \"$missing\" is not defined by operation \"Q\".",
            "Variable \"$unused\" is never used in operation \"Q\".",
            "Variable \"$obj\" is never used in operation \"Q\".",
        ]
        "###
        );
    }

    #[test]
    fn test_variables_through_fragments() {
        assert!(messages(
            "query Q($id: ID!) { ...Root } fragment Root on Query { user(id: $id) { id } }"
        )
        .is_empty());
        assert_eq!(
            messages("query Q { ...Root } fragment Root on Query { user(id: $id) { id } }"),
            vec![r#"Variable "$id" is not defined by operation "Q"."#]
        );
    }

    #[test]
    fn test_unsupported_operation_type() {
        let schema = Schema::from_sdl("type Query { a: Int }").unwrap();
        let interner = Interner::new();
        let source = "mutation { a }";
        let result = parse(source, &interner);
        let index = LineIndex::new(source);
        let errors = validate(&schema, &result.document, &interner, &index);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Schema is not configured to execute mutation operation."
        );
        assert_eq!(errors[0].locations[0].line, 1);
        assert_eq!(errors[0].locations[0].column, 1);
    }

    #[test]
    fn test_error_locations() {
        let schema = Schema::from_sdl(SDL).unwrap();
        let interner = Interner::new();
        let source = "{\n  hello\n  nope\n}";
        let result = parse(source, &interner);
        let index = LineIndex::new(source);
        let errors = validate(&schema, &result.document, &interner, &index);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "message": "Cannot query field \"nope\" on type \"Query\".",
                "locations": [{"line": 3, "column": 3}]
            }])
        );
    }

    #[test]
    fn test_overlapping_fields_with_different_names() {
        let schema = Schema::from_sdl(SDL).unwrap();
        let interner = Interner::new();
        let source = "{ a: hello a: user(id: 1) { id } }";
        let result = parse(source, &interner);
        let index = LineIndex::new(source);
        let errors = validate(&schema, &result.document, &interner, &index);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "message": "Fields \"a\" conflict because \"hello\" and \"user\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
                "locations": [{"line": 1, "column": 3}, {"line": 1, "column": 12}]
            }])
        );
    }

    #[test]
    fn test_overlapping_fields_with_differing_arguments() {
        insta::assert_debug_snapshot!(messages("{ user(id: 1) { id } user(id: 2) { id } }"), @r###"
        [
            "Fields \"user\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional.",
        ]
        "###);
        insta::assert_debug_snapshot!(messages("query ($id: ID!) { user(id: $id) { id } user { id } }"), @r###"
        [
            "Fields \"user\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional.",
            "Field \"user\" argument \"id\" of type \"ID!\" is required, but it was not provided.",
        ]
        "###);
    }

    #[test]
    fn test_mergeable_fields_are_accepted() {
        assert!(messages("{ hello hello a: hello a: hello }").is_empty());
        assert!(messages("{ user(id: 1) { id } user(id: 1) { name } }").is_empty());
        assert!(messages(
            "{ users(filter: {role: ADMIN}) { id } users(filter: {role: ADMIN}) { name } }"
        )
        .is_empty());
        assert!(messages("query ($id: ID!) { user(id: $id) { id } user(id: $id) { id } }").is_empty());
        assert!(messages("{ node(id: 1) { id ... on User { id } } }").is_empty());
    }

    #[test]
    fn test_overlapping_subfields() {
        insta::assert_debug_snapshot!(messages("{ user(id: 1) { x: id } user(id: 1) { x: name } }"), @r###"
        [
            "Fields \"user\" conflict because subfields \"x\" conflict because \"id\" and \"name\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
        ]
        "###);
    }

    #[test]
    fn test_overlapping_fields_across_fragments() {
        insta::assert_debug_snapshot!(
            messages("{ user(id: 1) { ...A ...B } } fragment A on User { n: name } fragment B on User { n: id }"),
            @r###"
        [
            "Fields \"n\" conflict because \"name\" and \"id\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
        ]
        "###
        );
        // A conflict inside one fragment is reported once, for the fragment itself.
        insta::assert_debug_snapshot!(
            messages("{ user(id: 1) { ...F } } fragment F on User { n: name n: id }"),
            @r###"
        [
            "Fields \"n\" conflict because \"name\" and \"id\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
        ]
        "###
        );
    }

    #[test]
    fn test_deep_fragment_chains_do_not_overflow() {
        let mut query = String::from("{ users { ...U0 } }\n");
        for i in 0..3_000 {
            query.push_str(&format!("fragment U{i} on User {{ friends {{ ...U{} }} }}\n", i + 1));
        }
        query.push_str("fragment U3000 on User { ...U0 }\n");
        let errors = messages(&query);
        assert!(errors.iter().all(|message| message.starts_with("Cannot spread fragment")));
    }
}
