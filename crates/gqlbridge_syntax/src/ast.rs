//! Abstract Syntax Tree types for GraphQL documents.

use gqlbridge_core::{Span, Text};

/// A complete document.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub definitions: Vec<Definition<'a>>,
    pub span: Span,
}

impl Document<'_> {
    /// Returns the operation definitions in document order.
    #[must_use]
    pub fn operations(&self) -> Vec<&OperationDefinition> {
        self.definitions
            .iter()
            .filter_map(|def| match def {
                Definition::Operation(op) => Some(op),
                _ => None,
            })
            .collect()
    }

    /// Returns the fragment definitions in document order.
    #[must_use]
    pub fn fragments(&self) -> Vec<&FragmentDefinition> {
        self.definitions
            .iter()
            .filter_map(|def| match def {
                Definition::Fragment(fragment) => Some(fragment),
                _ => None,
            })
            .collect()
    }
}

/// A top-level definition.
#[derive(Debug, Clone)]
pub enum Definition<'a> {
    Schema(SchemaDefinition<'a>),
    Type(TypeDefinition<'a>),
    Directive(DirectiveDefinition<'a>),
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
}

impl Definition<'_> {
    /// Returns true for operations and fragments.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::Operation(_) | Self::Fragment(_))
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Schema(def) => def.span,
            Self::Type(def) => def.span(),
            Self::Directive(def) => def.span,
            Self::Operation(def) => def.span,
            Self::Fragment(def) => def.span,
        }
    }
}

/// Schema definition.
#[derive(Debug, Clone)]
pub struct SchemaDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub directives: Vec<Directive>,
    pub operations: Vec<OperationTypeDefinition>,
    pub span: Span,
}

/// Operation type in schema (query/mutation/subscription).
#[derive(Debug, Clone)]
pub struct OperationTypeDefinition {
    pub operation: OperationType,
    pub type_name: Name,
    pub span: Span,
}

/// Type of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type definitions.
#[derive(Debug, Clone)]
pub enum TypeDefinition<'a> {
    Object(ObjectTypeDefinition<'a>),
    Interface(ObjectTypeDefinition<'a>),
    Union(UnionTypeDefinition<'a>),
    Enum(EnumTypeDefinition<'a>),
    Input(InputObjectTypeDefinition<'a>),
    Scalar(ScalarTypeDefinition<'a>),
}

impl<'a> TypeDefinition<'a> {
    #[must_use]
    pub fn name(&self) -> Name {
        match self {
            Self::Object(def) | Self::Interface(def) => def.name,
            Self::Union(def) => def.name,
            Self::Enum(def) => def.name,
            Self::Input(def) => def.name,
            Self::Scalar(def) => def.name,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Object(def) | Self::Interface(def) => def.span,
            Self::Union(def) => def.span,
            Self::Enum(def) => def.span,
            Self::Input(def) => def.span,
            Self::Scalar(def) => def.span,
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&Description<'a>> {
        match self {
            Self::Object(def) | Self::Interface(def) => def.description.as_ref(),
            Self::Union(def) => def.description.as_ref(),
            Self::Enum(def) => def.description.as_ref(),
            Self::Input(def) => def.description.as_ref(),
            Self::Scalar(def) => def.description.as_ref(),
        }
    }
}

/// Object or interface type definition; both share one shape.
#[derive(Debug, Clone)]
pub struct ObjectTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub implements: Vec<Name>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition<'a>>,
    pub span: Span,
}

/// Union type definition.
#[derive(Debug, Clone)]
pub struct UnionTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub members: Vec<Name>,
    pub span: Span,
}

/// Enum type definition.
#[derive(Debug, Clone)]
pub struct EnumTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub values: Vec<EnumValueDefinition<'a>>,
    pub span: Span,
}

/// Enum value definition.
#[derive(Debug, Clone)]
pub struct EnumValueDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input object type definition.
#[derive(Debug, Clone)]
pub struct InputObjectTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub fields: Vec<InputValueDefinition<'a>>,
    pub span: Span,
}

/// Scalar type definition.
#[derive(Debug, Clone)]
pub struct ScalarTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Field definition.
#[derive(Debug, Clone)]
pub struct FieldDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition<'a>>,
    pub ty: Type,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input value definition (arguments, input fields).
#[derive(Debug, Clone)]
pub struct InputValueDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Type reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Named type: `User`
    Named(Name),
    /// List type: `[User]`
    List(Box<Type>, Span),
    /// Non-null type: `User!`
    NonNull(Box<Type>, Span),
}

impl Type {
    /// Returns the innermost named type.
    #[must_use]
    pub fn named(&self) -> Name {
        match self {
            Self::Named(name) => *name,
            Self::List(inner, _) | Self::NonNull(inner, _) => inner.named(),
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Named(name) => name.span,
            Self::List(_, span) | Self::NonNull(_, span) => *span,
        }
    }

    #[must_use]
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(..))
    }
}

/// Where a directive may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveLocation {
    // Executable
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,

    // Type system
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    const ALL: [(Self, &'static str); 19] = [
        (Self::Query, "QUERY"),
        (Self::Mutation, "MUTATION"),
        (Self::Subscription, "SUBSCRIPTION"),
        (Self::Field, "FIELD"),
        (Self::FragmentDefinition, "FRAGMENT_DEFINITION"),
        (Self::FragmentSpread, "FRAGMENT_SPREAD"),
        (Self::InlineFragment, "INLINE_FRAGMENT"),
        (Self::VariableDefinition, "VARIABLE_DEFINITION"),
        (Self::Schema, "SCHEMA"),
        (Self::Scalar, "SCALAR"),
        (Self::Object, "OBJECT"),
        (Self::FieldDefinition, "FIELD_DEFINITION"),
        (Self::ArgumentDefinition, "ARGUMENT_DEFINITION"),
        (Self::Interface, "INTERFACE"),
        (Self::Union, "UNION"),
        (Self::Enum, "ENUM"),
        (Self::EnumValue, "ENUM_VALUE"),
        (Self::InputObject, "INPUT_OBJECT"),
        (Self::InputFieldDefinition, "INPUT_FIELD_DEFINITION"),
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(location, _)| *location == self)
            .map_or("", |(_, name)| name)
    }

    /// Parses a directive location from its SDL spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(location, _)| *location)
    }
}

/// Directive definition.
#[derive(Debug, Clone)]
pub struct DirectiveDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition<'a>>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
    pub span: Span,
}

/// Directive usage.
#[derive(Debug, Clone)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

/// Argument.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Name,
    pub value: Value,
    pub span: Span,
}

/// Operation definition.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    pub operation: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// Variable definition.
#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Fragment definition.
#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: Name,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// Selection set.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
    pub span: Span,
}

/// Selection.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl Selection {
    #[must_use]
    pub fn directives(&self) -> &[Directive] {
        match self {
            Self::Field(field) => &field.directives,
            Self::FragmentSpread(spread) => &spread.directives,
            Self::InlineFragment(fragment) => &fragment.directives,
        }
    }
}

/// Field selection.
#[derive(Debug, Clone)]
pub struct FieldSelection {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    pub selection_set: Option<SelectionSet>,
    pub span: Span,
}

impl FieldSelection {
    /// The key this field is written under in the response.
    #[must_use]
    pub fn response_key(&self) -> Name {
        self.alias.unwrap_or(self.name)
    }
}

/// Fragment spread.
#[derive(Debug, Clone)]
pub struct FragmentSpread {
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Inline fragment.
#[derive(Debug, Clone)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// Input value literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Variable(Name),
    /// Integer literal as written; it may exceed every integer width.
    Int(String, Span),
    /// Float literal as written.
    Float(String, Span),
    String(String, Span),
    Boolean(bool, Span),
    Null(Span),
    Enum(Name),
    List(Vec<Value>, Span),
    Object(Vec<(Name, Value)>, Span),
}

impl Value {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Variable(name) | Self::Enum(name) => name.span,
            Self::Int(_, span)
            | Self::Float(_, span)
            | Self::String(_, span)
            | Self::Boolean(_, span)
            | Self::Null(span)
            | Self::List(_, span)
            | Self::Object(_, span) => *span,
        }
    }

    /// Returns true if the literal mentions no variables.
    #[must_use]
    pub fn is_const(&self) -> bool {
        match self {
            Self::Variable(_) => false,
            Self::List(items, _) => items.iter().all(Self::is_const),
            Self::Object(fields, _) => fields.iter().all(|(_, value)| value.is_const()),
            _ => true,
        }
    }
}

/// Name with span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub value: Text,
    pub span: Span,
}

impl Name {
    #[must_use]
    pub fn new(value: Text, span: Span) -> Self {
        Self { value, span }
    }
}

/// Description (documentation string) as written in the source.
#[derive(Debug, Clone)]
pub struct Description<'a> {
    /// Raw text between the quotes.
    pub raw: &'a str,
    /// True for `"""block"""` descriptions.
    pub block: bool,
    pub span: Span,
}

impl<'a> Description<'a> {
    #[must_use]
    pub fn new(raw: &'a str, block: bool, span: Span) -> Self {
        Self { raw, block, span }
    }

    /// Returns the description text with escapes or block indentation
    /// processed.
    #[must_use]
    pub fn value(&self) -> String {
        if self.block {
            crate::lexer::block_string_value(self.raw)
        } else {
            crate::lexer::unescape(self.raw).unwrap_or_else(|_| self.raw.to_string())
        }
    }
}
