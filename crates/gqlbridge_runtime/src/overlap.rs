//! Fields that share a response key must resolve to the same value.
//!
//! Two selections written under one response key conflict when they name
//! different fields, pass different arguments, return incompatible types,
//! or their own sub-selections conflict. Fields on two distinct object
//! types never run together, so only their result shapes are compared.

use crate::query::MAX_PLAN_NESTING;
use crate::schema::{Schema, TypeRef};
use gqlbridge_core::{Interner, Span};
use gqlbridge_syntax::{Argument, FieldSelection, FragmentDefinition, Selection, SelectionSet, Value};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Two fields under one response key that cannot be merged.
pub(crate) struct Conflict {
    pub response_key: String,
    pub reason: Reason,
    /// The first field and the conflicting fields below it.
    pub first: Vec<Span>,
    /// The second field and the conflicting fields below it.
    pub second: Vec<Span>,
}

impl Conflict {
    pub fn message(&self) -> String {
        format!(
            "Fields \"{}\" conflict because {}. Use different aliases on the fields to fetch both if this was intentional.",
            self.response_key, self.reason
        )
    }

    pub fn spans(&self) -> Vec<Span> {
        self.first.iter().chain(&self.second).copied().collect()
    }
}

pub(crate) enum Reason {
    Message(String),
    Subfields(Vec<Conflict>),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Subfields(conflicts) => {
                for (i, conflict) in conflicts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    write!(
                        f,
                        "subfields \"{}\" conflict because {}",
                        conflict.response_key, conflict.reason
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// A field collected under its response key.
struct Entry<'f> {
    /// Type the field is selected on, when known.
    parent: Option<String>,
    field: &'f FieldSelection,
    /// Top-level fragment spread the field was reached through.
    origin: Option<String>,
}

type FieldMap<'f> = IndexMap<String, Vec<Entry<'f>>>;

pub(crate) struct Overlaps<'a, 'f> {
    pub schema: &'a Schema,
    pub interner: &'a Interner,
    pub fragments: &'a FxHashMap<String, &'f FragmentDefinition>,
}

impl<'f> Overlaps<'_, 'f> {
    /// Conflicts between fields of one selection set, fragments included.
    ///
    /// Pairs reached through the same fragment spread are left to the
    /// check of that fragment's own selection set.
    pub fn within(&self, parent: Option<&str>, set: &'f SelectionSet) -> Vec<Conflict> {
        let mut fields = FieldMap::default();
        self.collect(parent, set, None, 0, &mut FxHashSet::default(), &mut fields);

        let mut conflicts = Vec::new();
        for (key, entries) in &fields {
            for (i, first) in entries.iter().enumerate() {
                for second in &entries[i + 1..] {
                    if first.origin.is_some() && first.origin == second.origin {
                        continue;
                    }
                    if let Some(conflict) = self.conflict(key, first, second, false, 0) {
                        conflicts.push(conflict);
                    }
                }
            }
        }
        conflicts
    }

    fn collect(
        &self,
        parent: Option<&str>,
        set: &'f SelectionSet,
        origin: Option<&str>,
        depth: usize,
        visited: &mut FxHashSet<String>,
        fields: &mut FieldMap<'f>,
    ) {
        if depth >= MAX_PLAN_NESTING {
            return;
        }
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    let key = self.interner.get(field.response_key().value);
                    fields.entry(key).or_default().push(Entry {
                        parent: parent.map(str::to_string),
                        field,
                        origin: origin.map(str::to_string),
                    });
                }
                Selection::InlineFragment(inline) => {
                    let scope = inline
                        .type_condition
                        .map(|name| self.interner.get(name.value))
                        .or_else(|| parent.map(str::to_string));
                    self.collect(
                        scope.as_deref(),
                        &inline.selection_set,
                        origin,
                        depth + 1,
                        visited,
                        fields,
                    );
                }
                Selection::FragmentSpread(spread) => {
                    let name = self.interner.get(spread.name.value);
                    let Some(fragment) = self.fragments.get(&name).copied() else {
                        continue;
                    };
                    if !visited.insert(name.clone()) {
                        continue;
                    }
                    let condition = self.interner.get(fragment.type_condition.value);
                    let origin = origin.unwrap_or(&name);
                    self.collect(
                        Some(&condition),
                        &fragment.selection_set,
                        Some(origin),
                        depth + 1,
                        visited,
                        fields,
                    );
                }
            }
        }
    }

    fn conflict(
        &self,
        key: &str,
        first: &Entry<'f>,
        second: &Entry<'f>,
        exclusive: bool,
        depth: usize,
    ) -> Option<Conflict> {
        let exclusive = exclusive
            || (first.parent != second.parent
                && self.is_object(first.parent.as_deref())
                && self.is_object(second.parent.as_deref()));
        let conflict = |reason: String| Conflict {
            response_key: key.to_string(),
            reason: Reason::Message(reason),
            first: vec![first.field.span],
            second: vec![second.field.span],
        };

        if !exclusive {
            let first_name = self.interner.get(first.field.name.value);
            let second_name = self.interner.get(second.field.name.value);
            if first_name != second_name {
                return Some(conflict(format!(
                    "\"{first_name}\" and \"{second_name}\" are different fields"
                )));
            }
            if !same_arguments(&first.field.arguments, &second.field.arguments) {
                return Some(conflict("they have differing arguments".to_string()));
            }
        }

        let first_type = self.field_type(first);
        let second_type = self.field_type(second);
        if let (Some(a), Some(b)) = (first_type, second_type) {
            if self.types_conflict(a, b) {
                return Some(conflict(format!(
                    "they return conflicting types \"{a}\" and \"{b}\""
                )));
            }
        }

        let (Some(first_set), Some(second_set)) =
            (&first.field.selection_set, &second.field.selection_set)
        else {
            return None;
        };
        if depth >= MAX_PLAN_NESTING {
            return None;
        }
        let nested = self.between(
            (first_type.map(TypeRef::name), first_set),
            (second_type.map(TypeRef::name), second_set),
            exclusive,
            depth + 1,
        );
        if nested.is_empty() {
            return None;
        }
        let mut first_spans = vec![first.field.span];
        let mut second_spans = vec![second.field.span];
        for sub in &nested {
            first_spans.extend(&sub.first);
            second_spans.extend(&sub.second);
        }
        Some(Conflict {
            response_key: key.to_string(),
            reason: Reason::Subfields(nested),
            first: first_spans,
            second: second_spans,
        })
    }

    /// Conflicts between the fields of two sub-selections.
    fn between(
        &self,
        (first_parent, first_set): (Option<&str>, &'f SelectionSet),
        (second_parent, second_set): (Option<&str>, &'f SelectionSet),
        exclusive: bool,
        depth: usize,
    ) -> Vec<Conflict> {
        let mut first_fields = FieldMap::default();
        self.collect(first_parent, first_set, None, 0, &mut FxHashSet::default(), &mut first_fields);
        let mut second_fields = FieldMap::default();
        self.collect(second_parent, second_set, None, 0, &mut FxHashSet::default(), &mut second_fields);

        let mut conflicts = Vec::new();
        for (key, firsts) in &first_fields {
            let Some(seconds) = second_fields.get(key) else {
                continue;
            };
            for first in firsts {
                for second in seconds {
                    if let Some(conflict) = self.conflict(key, first, second, exclusive, depth) {
                        conflicts.push(conflict);
                    }
                }
            }
        }
        conflicts
    }

    fn is_object(&self, name: Option<&str>) -> bool {
        name.is_some_and(|name| self.schema.object(name).is_some())
    }

    fn field_type(&self, entry: &Entry<'_>) -> Option<&TypeRef> {
        let parent = entry.parent.as_deref()?;
        let name = self.interner.get(entry.field.name.value);
        self.schema.field(parent, &name).map(|def| &def.ty)
    }

    fn types_conflict(&self, first: &TypeRef, second: &TypeRef) -> bool {
        match (first, second) {
            (TypeRef::List(a), TypeRef::List(b)) | (TypeRef::NonNull(a), TypeRef::NonNull(b)) => {
                self.types_conflict(a, b)
            }
            (TypeRef::List(_), _) | (_, TypeRef::List(_)) => true,
            (TypeRef::NonNull(_), _) | (_, TypeRef::NonNull(_)) => true,
            (TypeRef::Named(a), TypeRef::Named(b)) => {
                (self.schema.is_leaf_type(a) || self.schema.is_leaf_type(b)) && a != b
            }
        }
    }
}

fn same_arguments(first: &[Argument], second: &[Argument]) -> bool {
    first.len() == second.len()
        && first.iter().all(|a| {
            second
                .iter()
                .any(|b| a.name.value == b.name.value && same_value(&a.value, &b.value))
        })
}

fn same_value(first: &Value, second: &Value) -> bool {
    match (first, second) {
        (Value::Variable(a), Value::Variable(b)) | (Value::Enum(a), Value::Enum(b)) => {
            a.value == b.value
        }
        (Value::Int(a, _), Value::Int(b, _))
        | (Value::Float(a, _), Value::Float(b, _))
        | (Value::String(a, _), Value::String(b, _)) => a == b,
        (Value::Boolean(a, _), Value::Boolean(b, _)) => a == b,
        (Value::Null(_), Value::Null(_)) => true,
        (Value::List(a, _), Value::List(b, _)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(a, _), Value::Object(b, _)) => {
            a.len() == b.len()
                && a.iter().all(|(name, value)| {
                    b.iter()
                        .any(|(other, v)| name.value == other.value && same_value(value, v))
                })
        }
        _ => false,
    }
}
