//! Schema definition, construction and integrity checking.

use crate::error::SchemaError;
use gqlbridge_syntax::{DirectiveLocation, OperationType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Names of the built-in scalars.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Reason recorded for `@deprecated` without an explicit reason.
pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// A GraphQL schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub description: Option<String>,
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    pub types: IndexMap<String, TypeDef>,
    pub directives: IndexMap<String, DirectiveDefinition>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Returns all types.
    pub fn types(&self) -> impl Iterator<Item = (&String, &TypeDef)> {
        self.types.iter()
    }

    /// Gets a directive definition by name.
    pub fn directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    /// Returns the root type name for an operation type.
    pub fn root_type_name(&self, operation: OperationType) -> Option<&str> {
        match operation {
            OperationType::Query => self.query_type.as_deref(),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// Returns the root object type for an operation type.
    pub fn root_type(&self, operation: OperationType) -> Option<&ObjectDef> {
        self.root_type_name(operation).and_then(|name| self.object(name))
    }

    /// Gets an object type by name.
    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        match self.types.get(name) {
            Some(TypeDef::Object(object)) => Some(object),
            _ => None,
        }
    }

    /// Returns the fields of an object or interface type.
    pub fn fields(&self, type_name: &str) -> Option<&IndexMap<String, FieldDef>> {
        match self.types.get(type_name)? {
            TypeDef::Object(object) => Some(&object.fields),
            TypeDef::Interface(interface) => Some(&interface.fields),
            _ => None,
        }
    }

    /// Gets a field of an object or interface type.
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.fields(type_name)?.get(field_name)
    }

    /// Returns the object types a value of `type_name` may have at runtime.
    pub fn possible_types(&self, type_name: &str) -> Vec<&str> {
        match self.types.get(type_name) {
            Some(TypeDef::Object(object)) => vec![object.name.as_str()],
            Some(TypeDef::Union(union)) => union.members.iter().map(String::as_str).collect(),
            Some(TypeDef::Interface(_)) => self
                .types
                .values()
                .filter_map(|ty| match ty {
                    TypeDef::Object(object)
                        if object.implements.iter().any(|name| name == type_name) =>
                    {
                        Some(object.name.as_str())
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if `object_name` is a possible runtime type of `type_name`.
    pub fn is_possible_type(&self, type_name: &str, object_name: &str) -> bool {
        if type_name == object_name {
            return true;
        }
        match self.types.get(type_name) {
            Some(TypeDef::Union(union)) => union.members.iter().any(|m| m == object_name),
            Some(TypeDef::Interface(_)) => self
                .object(object_name)
                .is_some_and(|object| object.implements.iter().any(|i| i == type_name)),
            _ => false,
        }
    }

    /// Returns true if the named type is a scalar or enum.
    pub fn is_leaf_type(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(TypeDef::is_leaf)
    }

    /// Returns true if the named type is an object, interface or union.
    pub fn is_composite_type(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(TypeDef::is_composite)
    }

    /// Returns true if the named type is an interface or union.
    pub fn is_abstract_type(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDef::Interface(_) | TypeDef::Union(_))
        )
    }

    /// Returns true if the type may be used for arguments and variables.
    pub fn is_input_type(&self, ty: &TypeRef) -> bool {
        self.types.get(ty.name()).is_some_and(TypeDef::is_input)
    }

    /// Returns true if the type may be used for fields.
    pub fn is_output_type(&self, ty: &TypeRef) -> bool {
        self.types.get(ty.name()).is_some_and(TypeDef::is_output)
    }

    /// Returns true if a value of type `sub` may be used where `sup` is
    /// expected.
    pub fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        match (sub, sup) {
            (TypeRef::NonNull(sub), TypeRef::NonNull(sup)) => self.is_subtype(sub, sup),
            (TypeRef::NonNull(sub), sup) => self.is_subtype(sub, sup),
            (_, TypeRef::NonNull(_)) => false,
            (TypeRef::List(sub), TypeRef::List(sup)) => self.is_subtype(sub, sup),
            (TypeRef::List(_), _) | (_, TypeRef::List(_)) => false,
            (TypeRef::Named(sub), TypeRef::Named(sup)) => {
                sub == sup || (self.is_abstract_type(sup) && self.is_possible_type(sup, sub))
            }
        }
    }

    /// Checks the schema for integrity problems.
    ///
    /// Every problem found is collected into one [`SchemaError`].
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut issues = Vec::new();
        self.validate_root_types(&mut issues);
        for ty in self.types.values() {
            self.validate_type(ty, &mut issues);
        }
        for directive in self.directives.values() {
            for arg in directive.arguments.values() {
                if !self.is_input_type(&arg.ty) {
                    issues.push(self.input_type_issue(
                        format!("@{}({}:)", directive.name, arg.name),
                        &arg.ty,
                    ));
                }
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { issues })
        }
    }

    fn validate_root_types(&self, issues: &mut Vec<String>) {
        match &self.query_type {
            None => issues.push("Query root type must be provided.".to_string()),
            Some(name) => match self.types.get(name) {
                Some(TypeDef::Object(_)) => {}
                Some(_) => issues.push(format!(
                    "Query root type must be Object type, it cannot be {name}."
                )),
                None => issues.push(format!("Unknown type \"{name}\".")),
            },
        }
        for (kind, root) in [
            ("Mutation", &self.mutation_type),
            ("Subscription", &self.subscription_type),
        ] {
            let Some(name) = root else { continue };
            match self.types.get(name) {
                Some(TypeDef::Object(_)) => {}
                Some(_) => issues.push(format!(
                    "{kind} root type must be Object type if provided, it cannot be {name}."
                )),
                None => issues.push(format!("Unknown type \"{name}\".")),
            }
        }
    }

    fn validate_type(&self, ty: &TypeDef, issues: &mut Vec<String>) {
        let name = ty.name();
        if name.starts_with("__") {
            issues.push(format!(
                "Name \"{name}\" must not begin with \"__\", which is reserved by GraphQL introspection."
            ));
        }
        match ty {
            TypeDef::Scalar(_) => {}
            TypeDef::Object(object) => {
                self.validate_fields(name, &object.fields, issues);
                self.validate_implements(name, &object.fields, &object.implements, issues);
            }
            TypeDef::Interface(interface) => {
                self.validate_fields(name, &interface.fields, issues);
                self.validate_implements(name, &interface.fields, &interface.implements, issues);
            }
            TypeDef::Union(union) => {
                if union.members.is_empty() {
                    issues.push(format!(
                        "Union type {name} must define one or more member types."
                    ));
                }
                for member in &union.members {
                    match self.types.get(member) {
                        Some(TypeDef::Object(_)) => {}
                        Some(_) => issues.push(format!(
                            "Union type {name} can only include Object types, it cannot include {member}."
                        )),
                        None => issues.push(format!("Unknown type \"{member}\".")),
                    }
                }
            }
            TypeDef::Enum(enum_def) => {
                if enum_def.values.is_empty() {
                    issues.push(format!("Enum type {name} must define one or more values."));
                }
                for value in &enum_def.values {
                    if matches!(value.name.as_str(), "true" | "false" | "null") {
                        issues.push(format!(
                            "Enum type {name} cannot include value: {}.",
                            value.name
                        ));
                    }
                }
            }
            TypeDef::InputObject(input) => {
                if input.fields.is_empty() {
                    issues.push(format!(
                        "Input Object type {name} must define one or more fields."
                    ));
                }
                for field in input.fields.values() {
                    if !self.is_input_type(&field.ty) {
                        issues.push(
                            self.input_type_issue(format!("{name}.{}", field.name), &field.ty),
                        );
                    }
                }
            }
        }
    }

    fn validate_fields(
        &self,
        type_name: &str,
        fields: &IndexMap<String, FieldDef>,
        issues: &mut Vec<String>,
    ) {
        if fields.is_empty() {
            issues.push(format!("Type {type_name} must define one or more fields."));
        }
        for field in fields.values() {
            if field.name.starts_with("__") {
                issues.push(format!(
                    "Name \"{}\" must not begin with \"__\", which is reserved by GraphQL introspection.",
                    field.name
                ));
            }
            if self.types.get(field.ty.name()).is_none() {
                issues.push(format!("Unknown type \"{}\".", field.ty.name()));
            } else if !self.is_output_type(&field.ty) {
                issues.push(format!(
                    "The type of {type_name}.{} must be Output Type but got: {}.",
                    field.name, field.ty
                ));
            }
            for arg in field.arguments.values() {
                if !self.is_input_type(&arg.ty) {
                    issues.push(self.input_type_issue(
                        format!("{type_name}.{}({}:)", field.name, arg.name),
                        &arg.ty,
                    ));
                }
            }
        }
    }

    fn validate_implements(
        &self,
        type_name: &str,
        fields: &IndexMap<String, FieldDef>,
        implements: &[String],
        issues: &mut Vec<String>,
    ) {
        for interface_name in implements {
            let interface = match self.types.get(interface_name) {
                Some(TypeDef::Interface(interface)) => interface,
                Some(_) => {
                    issues.push(format!(
                        "Type {type_name} must only implement Interface types, it cannot implement {interface_name}."
                    ));
                    continue;
                }
                None => {
                    issues.push(format!("Unknown type \"{interface_name}\"."));
                    continue;
                }
            };
            for (field_name, expected) in &interface.fields {
                let Some(field) = fields.get(field_name) else {
                    issues.push(format!(
                        "Interface field {interface_name}.{field_name} expected but {type_name} does not provide it."
                    ));
                    continue;
                };
                if !self.is_subtype(&field.ty, &expected.ty) {
                    issues.push(format!(
                        "Interface field {interface_name}.{field_name} expects type {} but {type_name}.{field_name} is type {}.",
                        expected.ty, field.ty
                    ));
                }
                for arg_name in expected.arguments.keys() {
                    if !field.arguments.contains_key(arg_name) {
                        issues.push(format!(
                            "Interface field argument {interface_name}.{field_name}({arg_name}:) expected but {type_name}.{field_name} does not provide it."
                        ));
                    }
                }
            }
        }
    }

    fn input_type_issue(&self, coordinate: String, ty: &TypeRef) -> String {
        if self.types.get(ty.name()).is_none() {
            format!("Unknown type \"{}\".", ty.name())
        } else {
            format!("The type of {coordinate} must be Input Type but got: {ty}.")
        }
    }
}

/// A type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeDef {
    Scalar(ScalarDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union(UnionDef),
    Enum(EnumDef),
    InputObject(InputObjectDef),
}

impl TypeDef {
    /// Returns the type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(s) => &s.name,
            Self::Object(o) => &o.name,
            Self::Interface(i) => &i.name,
            Self::Union(u) => &u.name,
            Self::Enum(e) => &e.name,
            Self::InputObject(i) => &i.name,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    pub fn is_output(&self) -> bool {
        !matches!(self, Self::InputObject(_))
    }
}

/// Scalar type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarDef {
    pub name: String,
    pub description: Option<String>,
}

impl ScalarDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Object type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
}

impl ObjectDef {
    /// Creates an object type without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Declares an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Interface type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// Union type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionDef {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

/// Enum type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    /// Returns true if `value` names one of the enum's values.
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.name == value)
    }
}

/// Enum value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
}

impl EnumValueDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecated: false,
            deprecation_reason: None,
        }
    }
}

/// Input object type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputFieldDef>,
}

/// Field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub arguments: IndexMap<String, InputFieldDef>,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
}

impl FieldDef {
    /// Creates a field without arguments.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: IndexMap::new(),
            deprecated: false,
            deprecation_reason: None,
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn argument(mut self, argument: InputFieldDef) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }
}

/// Input value definition, used for arguments and input object fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<serde_json::Value>,
}

impl InputFieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    #[must_use]
    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Returns true if the value must be provided.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// Type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self::NonNull(Box::new(inner))
    }

    /// Returns the innermost type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Strips one level of non-null wrapping.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// Directive definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputFieldDef>,
    #[serde(with = "locations")]
    pub locations: Vec<DirectiveLocation>,
    pub repeatable: bool,
}

mod locations {
    use gqlbridge_syntax::DirectiveLocation;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        locations: &[DirectiveLocation],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let names: Vec<&str> = locations.iter().map(|l| l.as_str()).collect();
        names.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<DirectiveLocation>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                DirectiveLocation::parse(name).ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown directive location {name}"))
                })
            })
            .collect()
    }
}

fn builtin_directives() -> Vec<DirectiveDefinition> {
    let condition = |name: &str, description: &str| DirectiveDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        arguments: IndexMap::from([(
            "if".to_string(),
            InputFieldDef::new("if", TypeRef::non_null(TypeRef::named("Boolean"))),
        )]),
        locations: vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
        repeatable: false,
    };
    vec![
        condition(
            "include",
            "Directs the executor to include this field or fragment only when the `if` argument is true.",
        ),
        condition(
            "skip",
            "Directs the executor to skip this field or fragment when the `if` argument is true.",
        ),
        DirectiveDefinition {
            name: "deprecated".to_string(),
            description: Some("Marks an element of a GraphQL schema as no longer supported.".to_string()),
            arguments: IndexMap::from([(
                "reason".to_string(),
                InputFieldDef::new("reason", TypeRef::named("String"))
                    .default_value(serde_json::Value::from(DEFAULT_DEPRECATION_REASON)),
            )]),
            locations: vec![
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::ArgumentDefinition,
                DirectiveLocation::InputFieldDefinition,
                DirectiveLocation::EnumValue,
            ],
            repeatable: false,
        },
    ]
}

/// Schema builder.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Creates a new schema builder with the built-in scalars and directives.
    pub fn new() -> Self {
        let mut schema = Schema::default();
        for name in BUILTIN_SCALARS {
            schema.types.insert(
                name.to_string(),
                TypeDef::Scalar(ScalarDef {
                    name: name.to_string(),
                    description: Some(format!("Built-in {name} scalar")),
                }),
            );
        }
        for directive in builtin_directives() {
            schema.directives.insert(directive.name.clone(), directive);
        }
        Self { schema }
    }

    /// Sets the schema description.
    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.schema.description = Some(desc.into());
        self
    }

    /// Sets the query type.
    #[must_use]
    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.schema.query_type = Some(name.into());
        self
    }

    /// Sets the mutation type.
    #[must_use]
    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.schema.mutation_type = Some(name.into());
        self
    }

    /// Sets the subscription type.
    #[must_use]
    pub fn subscription_type(mut self, name: impl Into<String>) -> Self {
        self.schema.subscription_type = Some(name.into());
        self
    }

    /// Adds a type, replacing any type with the same name.
    #[must_use]
    pub fn add_type(mut self, type_def: TypeDef) -> Self {
        self.schema
            .types
            .insert(type_def.name().to_string(), type_def);
        self
    }

    /// Adds a directive definition.
    #[must_use]
    pub fn add_directive(mut self, directive: DirectiveDefinition) -> Self {
        self.schema
            .directives
            .insert(directive.name.clone(), directive);
        self
    }

    /// Returns true if a type with this name was added.
    pub fn has_type(&self, name: &str) -> bool {
        self.schema.types.contains_key(name)
    }

    /// Builds the schema.
    ///
    /// No integrity check happens here, see [`Schema::validate`].
    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> TypeRef {
        TypeRef::named("String")
    }

    fn hello_schema() -> Schema {
        SchemaBuilder::new()
            .query_type("Query")
            .add_type(TypeDef::Object(
                ObjectDef::new("Query").field(FieldDef::new("hello", string())),
            ))
            .build()
    }

    #[test]
    fn test_schema_builder() {
        let schema = SchemaBuilder::new()
            .description("My GraphQL API")
            .query_type("Query")
            .build();

        assert_eq!(schema.description.as_deref(), Some("My GraphQL API"));
        assert_eq!(schema.query_type.as_deref(), Some("Query"));
        for name in BUILTIN_SCALARS {
            assert!(schema.is_leaf_type(name));
        }
        assert!(schema.directive("skip").is_some());
        assert!(schema.directive("include").is_some());
    }

    #[test]
    fn test_valid_schema() {
        assert!(hello_schema().validate().is_ok());
    }

    #[test]
    fn test_query_without_fields() {
        let schema = SchemaBuilder::new()
            .query_type("Query")
            .add_type(TypeDef::Object(
                ObjectDef::new("Query").description("i haz the queries"),
            ))
            .build();

        let error = schema.validate().unwrap_err();
        assert_eq!(error.to_string(), "Type Query must define one or more fields.");
    }

    #[test]
    fn test_missing_query_root() {
        let error = SchemaBuilder::new().build().validate().unwrap_err();
        assert_eq!(error.to_string(), "Query root type must be provided.");
    }

    #[test]
    fn test_issues_are_joined() {
        let schema = SchemaBuilder::new()
            .query_type("Query")
            .add_type(TypeDef::Object(
                ObjectDef::new("Query").field(FieldDef::new("user", TypeRef::named("User"))),
            ))
            .add_type(TypeDef::Enum(EnumDef {
                name: "Color".to_string(),
                description: None,
                values: Vec::new(),
            }))
            .build();

        let error = schema.validate().unwrap_err();
        insta::assert_snapshot!(error, @r###"
        Unknown type "User".

        Enum type Color must define one or more values.
        "###);
    }

    #[test]
    fn test_interface_contract() {
        let schema = SchemaBuilder::new()
            .query_type("Query")
            .add_type(TypeDef::Interface(
                InterfaceDef::new("Node")
                    .field(FieldDef::new("id", TypeRef::non_null(TypeRef::named("ID")))),
            ))
            .add_type(TypeDef::Object(
                ObjectDef::new("Query")
                    .implements("Node")
                    .field(FieldDef::new("hello", string())),
            ))
            .build();

        let error = schema.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Interface field Node.id expected but Query does not provide it."
        );
    }

    #[test]
    fn test_input_type_positions() {
        let schema = SchemaBuilder::new()
            .query_type("Query")
            .add_type(TypeDef::Object(
                ObjectDef::new("Query").field(
                    FieldDef::new("me", TypeRef::named("Query"))
                        .argument(InputFieldDef::new("filter", TypeRef::named("Query"))),
                ),
            ))
            .build();

        let error = schema.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "The type of Query.me(filter:) must be Input Type but got: Query."
        );
    }

    #[test]
    fn test_possible_types() {
        let schema = SchemaBuilder::new()
            .add_type(TypeDef::Interface(
                InterfaceDef::new("Node").field(FieldDef::new("id", TypeRef::named("ID"))),
            ))
            .add_type(TypeDef::Object(
                ObjectDef::new("User")
                    .implements("Node")
                    .field(FieldDef::new("id", TypeRef::named("ID"))),
            ))
            .add_type(TypeDef::Union(UnionDef {
                name: "Result".to_string(),
                description: None,
                members: vec!["User".to_string()],
            }))
            .build();

        assert_eq!(schema.possible_types("Node"), vec!["User"]);
        assert!(schema.is_possible_type("Result", "User"));
        assert!(schema.is_possible_type("Node", "User"));
        assert!(!schema.is_possible_type("Node", "Result"));
    }

    #[test]
    fn test_type_ref_display_and_subtyping() {
        let schema = hello_schema();
        let list = TypeRef::non_null(TypeRef::list(TypeRef::non_null(string())));
        assert_eq!(list.to_string(), "[String!]!");
        assert_eq!(list.name(), "String");

        assert!(schema.is_subtype(&TypeRef::non_null(string()), &string()));
        assert!(!schema.is_subtype(&string(), &TypeRef::non_null(string())));
        assert!(!schema.is_subtype(&TypeRef::list(string()), &string()));
    }
}
