//! Building a [`Schema`] from SDL source.

use crate::schema::{
    DirectiveDefinition, EnumDef, EnumValueDef, FieldDef, InputFieldDef, InputObjectDef,
    InterfaceDef, ObjectDef, ScalarDef, Schema, SchemaBuilder, TypeDef, TypeRef, UnionDef,
    BUILTIN_SCALARS, DEFAULT_DEPRECATION_REASON,
};
use crate::value::const_to_json;
use gqlbridge_core::{diagnostics::codes, Diagnostic, DiagnosticBag, Interner, Span};
use gqlbridge_syntax::{self as ast, Definition, OperationType, TypeDefinition};
use indexmap::IndexMap;

/// Errors found while building a schema from SDL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render(.diagnostics))]
pub struct SdlError {
    pub diagnostics: Vec<Diagnostic>,
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts an AST type reference.
pub fn type_ref_from_ast(ty: &ast::Type, interner: &Interner) -> TypeRef {
    match ty {
        ast::Type::Named(name) => TypeRef::Named(interner.get(name.value)),
        ast::Type::List(inner, _) => TypeRef::list(type_ref_from_ast(inner, interner)),
        ast::Type::NonNull(inner, _) => TypeRef::non_null(type_ref_from_ast(inner, interner)),
    }
}

impl Schema {
    /// Builds a schema from SDL.
    ///
    /// Root types come from the `schema { }` block when present, otherwise
    /// from types named `Query`, `Mutation` and `Subscription`. The result
    /// is not checked for integrity, see [`Schema::validate`].
    pub fn from_sdl(source: &str) -> Result<Self, SdlError> {
        let interner = Interner::new();
        let result = gqlbridge_syntax::parse(source, &interner);
        if !result.is_ok() {
            return Err(SdlError {
                diagnostics: result.diagnostics.into_vec(),
            });
        }
        SdlBuilder::new(&interner).build(&result.document)
    }
}

struct SdlBuilder<'i> {
    interner: &'i Interner,
    diagnostics: DiagnosticBag,
    builder: SchemaBuilder,
    roots: Vec<(OperationType, String)>,
    references: Vec<(String, Span)>,
}

impl<'i> SdlBuilder<'i> {
    fn new(interner: &'i Interner) -> Self {
        Self {
            interner,
            diagnostics: DiagnosticBag::new(),
            builder: SchemaBuilder::new(),
            roots: Vec::new(),
            references: Vec::new(),
        }
    }

    fn build(mut self, document: &ast::Document<'_>) -> Result<Schema, SdlError> {
        let mut schema_definition_seen = false;
        let mut defined: Vec<String> = Vec::new();
        let mut description = None;

        for definition in &document.definitions {
            match definition {
                Definition::Schema(schema_def) => {
                    if schema_definition_seen {
                        self.diagnostics.error(
                            codes::DUPLICATE_DEFINITION,
                            schema_def.span,
                            "Must provide only one schema definition.",
                        );
                        continue;
                    }
                    schema_definition_seen = true;
                    description = schema_def.description.as_ref().map(ast::Description::value);
                    for op in &schema_def.operations {
                        let name = self.name(op.type_name);
                        self.references.push((name.clone(), op.type_name.span));
                        self.roots.push((op.operation, name));
                    }
                }
                Definition::Type(type_def) => {
                    let name = self.name(type_def.name());
                    if defined.contains(&name) {
                        self.diagnostics.error(
                            codes::DUPLICATE_DEFINITION,
                            type_def.name().span,
                            format!("There can be only one type named \"{name}\"."),
                        );
                        continue;
                    }
                    if BUILTIN_SCALARS.contains(&name.as_str())
                        && !matches!(type_def, TypeDefinition::Scalar(_))
                    {
                        self.diagnostics.error(
                            codes::DUPLICATE_DEFINITION,
                            type_def.name().span,
                            format!("Type \"{name}\" already exists in the schema."),
                        );
                        continue;
                    }
                    defined.push(name);
                    let converted = self.type_def(type_def);
                    self.builder = std::mem::take(&mut self.builder).add_type(converted);
                }
                Definition::Directive(directive) => {
                    let converted = self.directive(directive);
                    if defined.iter().any(|d| d == &format!("@{}", converted.name)) {
                        self.diagnostics.error(
                            codes::DUPLICATE_DEFINITION,
                            directive.name.span,
                            format!("There can be only one directive named \"@{}\".", converted.name),
                        );
                        continue;
                    }
                    defined.push(format!("@{}", converted.name));
                    self.builder = std::mem::take(&mut self.builder).add_directive(converted);
                }
                Definition::Operation(_) | Definition::Fragment(_) => {
                    self.diagnostics.error(
                        codes::INVALID_DEFINITION,
                        definition.span(),
                        "Executable definitions are not allowed in a schema document.",
                    );
                }
            }
        }

        for (name, span) in std::mem::take(&mut self.references) {
            if !self.builder.has_type(&name) {
                self.diagnostics.error(
                    codes::UNKNOWN_TYPE,
                    span,
                    format!("Unknown type \"{name}\"."),
                );
            }
        }

        if self.diagnostics.has_errors() {
            return Err(SdlError {
                diagnostics: self.diagnostics.into_vec(),
            });
        }

        let mut builder = self.builder;
        if let Some(description) = description {
            builder = builder.description(description);
        }
        if schema_definition_seen {
            for (operation, name) in self.roots {
                builder = match operation {
                    OperationType::Query => builder.query_type(name),
                    OperationType::Mutation => builder.mutation_type(name),
                    OperationType::Subscription => builder.subscription_type(name),
                };
            }
        } else {
            if builder.has_type("Query") {
                builder = builder.query_type("Query");
            }
            if builder.has_type("Mutation") {
                builder = builder.mutation_type("Mutation");
            }
            if builder.has_type("Subscription") {
                builder = builder.subscription_type("Subscription");
            }
        }
        Ok(builder.build())
    }

    fn name(&self, name: ast::Name) -> String {
        self.interner.get(name.value)
    }

    fn reference(&mut self, name: ast::Name) -> String {
        let value = self.name(name);
        self.references.push((value.clone(), name.span));
        value
    }

    fn type_ref(&mut self, ty: &ast::Type) -> TypeRef {
        let named = ty.named();
        let name = self.name(named);
        self.references.push((name, named.span));
        type_ref_from_ast(ty, self.interner)
    }

    fn type_def(&mut self, def: &TypeDefinition<'_>) -> TypeDef {
        let description = def.description().map(ast::Description::value);
        match def {
            TypeDefinition::Scalar(scalar) => TypeDef::Scalar(ScalarDef {
                name: self.name(scalar.name),
                description,
            }),
            TypeDefinition::Object(object) => TypeDef::Object(ObjectDef {
                name: self.name(object.name),
                description,
                fields: self.fields(object),
                implements: object.implements.iter().map(|i| self.reference(*i)).collect(),
            }),
            TypeDefinition::Interface(interface) => TypeDef::Interface(InterfaceDef {
                name: self.name(interface.name),
                description,
                fields: self.fields(interface),
                implements: interface
                    .implements
                    .iter()
                    .map(|i| self.reference(*i))
                    .collect(),
            }),
            TypeDefinition::Union(union) => TypeDef::Union(UnionDef {
                name: self.name(union.name),
                description,
                members: union.members.iter().map(|m| self.reference(*m)).collect(),
            }),
            TypeDefinition::Enum(enum_def) => {
                let type_name = self.name(enum_def.name);
                let mut values: Vec<EnumValueDef> = Vec::with_capacity(enum_def.values.len());
                for value in &enum_def.values {
                    let name = self.name(value.name);
                    if values.iter().any(|v| v.name == name) {
                        self.diagnostics.error(
                            codes::DUPLICATE_DEFINITION,
                            value.name.span,
                            format!("Enum value \"{type_name}.{name}\" can only be defined once."),
                        );
                        continue;
                    }
                    let reason = self.deprecation(&value.directives);
                    values.push(EnumValueDef {
                        name,
                        description: value.description.as_ref().map(ast::Description::value),
                        deprecated: reason.is_some(),
                        deprecation_reason: reason,
                    });
                }
                TypeDef::Enum(EnumDef {
                    name: type_name,
                    description,
                    values,
                })
            }
            TypeDefinition::Input(input) => TypeDef::InputObject(InputObjectDef {
                name: self.name(input.name),
                description,
                fields: self.input_values(&input.fields),
            }),
        }
    }

    fn fields(&mut self, def: &ast::ObjectTypeDefinition<'_>) -> IndexMap<String, FieldDef> {
        let type_name = self.name(def.name);
        let mut fields = IndexMap::with_capacity(def.fields.len());
        for field in &def.fields {
            let name = self.name(field.name);
            if fields.contains_key(&name) {
                self.diagnostics.error(
                    codes::DUPLICATE_DEFINITION,
                    field.name.span,
                    format!("Field \"{type_name}.{name}\" can only be defined once."),
                );
                continue;
            }
            let reason = self.deprecation(&field.directives);
            let field_def = FieldDef {
                name: name.clone(),
                description: field.description.as_ref().map(ast::Description::value),
                ty: self.type_ref(&field.ty),
                arguments: self.input_values(&field.arguments),
                deprecated: reason.is_some(),
                deprecation_reason: reason,
            };
            fields.insert(name, field_def);
        }
        fields
    }

    fn input_values(
        &mut self,
        values: &[ast::InputValueDefinition<'_>],
    ) -> IndexMap<String, InputFieldDef> {
        let mut out = IndexMap::with_capacity(values.len());
        for value in values {
            let def = InputFieldDef {
                name: self.name(value.name),
                description: value.description.as_ref().map(ast::Description::value),
                ty: self.type_ref(&value.ty),
                default_value: value
                    .default_value
                    .as_ref()
                    .map(|v| const_to_json(v, self.interner)),
            };
            out.insert(def.name.clone(), def);
        }
        out
    }

    fn directive(&mut self, def: &ast::DirectiveDefinition<'_>) -> DirectiveDefinition {
        DirectiveDefinition {
            name: self.name(def.name),
            description: def.description.as_ref().map(ast::Description::value),
            arguments: self.input_values(&def.arguments),
            locations: def.locations.clone(),
            repeatable: def.repeatable,
        }
    }

    /// Returns the deprecation reason when `@deprecated` is present.
    fn deprecation(&self, directives: &[ast::Directive]) -> Option<String> {
        let directive = directives
            .iter()
            .find(|d| self.interner.is(d.name.value, "deprecated"))?;
        let reason = directive
            .arguments
            .iter()
            .find(|arg| self.interner.is(arg.name.value, "reason"))
            .and_then(|arg| match &arg.value {
                ast::Value::String(reason, _) => Some(reason.clone()),
                _ => None,
            });
        Some(reason.unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_string()))
    }
}
