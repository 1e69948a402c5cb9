//! Conversions between AST literals, JSON input values and leaf results.
//!
//! Three directions are covered:
//! - literals written in a document are checked ([`literal_errors`]) and
//!   converted with variables substituted ([`coerce_literal`]),
//! - JSON variable values are coerced against their declared type
//!   ([`coerce_input_value`]),
//! - resolver results for scalars and enums are serialized
//!   ([`serialize_leaf`]).

use crate::error::PathSegment;
use crate::schema::{EnumDef, InputObjectDef, Schema, TypeDef, TypeRef};
use gqlbridge_core::{Interner, Span};
use gqlbridge_syntax::Value as AstValue;
use serde_json::{Map, Value};

/// Prints a literal the way it would appear in a document.
pub fn print_value(value: &AstValue, interner: &Interner) -> String {
    match value {
        AstValue::Variable(name) => format!("${}", interner.get(name.value)),
        AstValue::Int(text, _) | AstValue::Float(text, _) => text.clone(),
        AstValue::String(s, _) => inspect(&Value::String(s.clone())),
        AstValue::Boolean(b, _) => b.to_string(),
        AstValue::Null(_) => "null".to_string(),
        AstValue::Enum(name) => interner.get(name.value),
        AstValue::List(items, _) => {
            let items: Vec<String> = items.iter().map(|v| print_value(v, interner)).collect();
            format!("[{}]", items.join(", "))
        }
        AstValue::Object(fields, _) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, v)| format!("{}: {}", interner.get(name.value), print_value(v, interner)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

/// Renders a JSON value for error messages.
pub fn inspect(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unprintable>".to_string())
}

/// Parses numeric literal text into a JSON number. Values outside the
/// finite `f64` range have no JSON representation and yield `None`.
fn float_json(text: &str) -> Option<Value> {
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

/// Converts a constant literal to JSON. Variables become `null` and enum
/// values become strings.
pub fn const_to_json(value: &AstValue, interner: &Interner) -> Value {
    match value {
        AstValue::Variable(_) | AstValue::Null(_) => Value::Null,
        AstValue::Int(text, _) => match text.parse::<i64>() {
            Ok(int) => Value::from(int),
            Err(_) => float_json(text).unwrap_or(Value::Null),
        },
        AstValue::Float(text, _) => float_json(text).unwrap_or(Value::Null),
        AstValue::String(s, _) => Value::String(s.clone()),
        AstValue::Boolean(b, _) => Value::Bool(*b),
        AstValue::Enum(name) => Value::String(interner.get(name.value)),
        AstValue::List(items, _) => items.iter().map(|v| const_to_json(v, interner)).collect(),
        AstValue::Object(fields, _) => Value::Object(
            fields
                .iter()
                .map(|(name, v)| (interner.get(name.value), const_to_json(v, interner)))
                .collect(),
        ),
    }
}

/// Checks a literal against the type expected at its position.
///
/// Variables are not checked here; their usage is validated separately.
/// Returns one message per offending node.
pub fn literal_errors(
    schema: &Schema,
    ty: &TypeRef,
    value: &AstValue,
    interner: &Interner,
) -> Vec<(Span, String)> {
    let mut errors = Vec::new();
    LiteralChecker {
        schema,
        interner,
        errors: &mut errors,
    }
    .check(ty, ty, value);
    errors
}

struct LiteralChecker<'a> {
    schema: &'a Schema,
    interner: &'a Interner,
    errors: &'a mut Vec<(Span, String)>,
}

impl LiteralChecker<'_> {
    fn check(&mut self, location_type: &TypeRef, ty: &TypeRef, value: &AstValue) {
        if matches!(value, AstValue::Variable(_)) {
            return;
        }
        match ty {
            TypeRef::NonNull(inner) => {
                if matches!(value, AstValue::Null(_)) {
                    self.errors.push((
                        value.span(),
                        format!("Expected value of type \"{location_type}\", found null."),
                    ));
                } else {
                    self.check(location_type, inner, value);
                }
            }
            _ if matches!(value, AstValue::Null(_)) => {}
            TypeRef::List(inner) => match value {
                AstValue::List(items, _) => {
                    for item in items {
                        self.check(inner, inner, item);
                    }
                }
                _ => self.check(inner, inner, value),
            },
            TypeRef::Named(name) => match self.schema.get_type(name) {
                Some(TypeDef::InputObject(input)) => self.check_object(location_type, input, value),
                Some(def @ (TypeDef::Scalar(_) | TypeDef::Enum(_))) => {
                    if let Err(reason) = parse_literal(def, value, self.interner) {
                        self.errors.push((
                            value.span(),
                            format!(
                                "Expected value of type \"{location_type}\", found {}; {reason}",
                                print_value(value, self.interner)
                            ),
                        ));
                    }
                }
                // Unknown or output types are reported by other checks.
                _ => {}
            },
        }
    }

    fn check_object(&mut self, location_type: &TypeRef, input: &InputObjectDef, value: &AstValue) {
        let AstValue::Object(fields, span) = value else {
            self.errors.push((
                value.span(),
                format!(
                    "Expected value of type \"{location_type}\", found {}.",
                    print_value(value, self.interner)
                ),
            ));
            return;
        };
        let mut seen = Vec::with_capacity(fields.len());
        for (name, field_value) in fields {
            let field_name = self.interner.get(name.value);
            if seen.contains(&field_name) {
                self.errors.push((
                    name.span,
                    format!("There can be only one input field named \"{field_name}\"."),
                ));
                continue;
            }
            match input.fields.get(&field_name) {
                Some(def) => self.check(&def.ty, &def.ty, field_value),
                None => self.errors.push((
                    name.span,
                    format!(
                        "Field \"{field_name}\" is not defined by type \"{}\".",
                        input.name
                    ),
                )),
            }
            seen.push(field_name);
        }
        for def in input.fields.values() {
            if def.is_required() && !seen.contains(&def.name) {
                self.errors.push((
                    *span,
                    format!(
                        "Field \"{}.{}\" of required type \"{}\" was not provided.",
                        input.name, def.name, def.ty
                    ),
                ));
            }
        }
    }
}

/// Parses a leaf literal, the literal counterpart of [`coerce_input_value`].
fn parse_literal(def: &TypeDef, value: &AstValue, interner: &Interner) -> Result<Value, String> {
    let printed = || print_value(value, interner);
    match def {
        TypeDef::Enum(enum_def) => match value {
            AstValue::Enum(name) => {
                let name = interner.get(name.value);
                if enum_def.has_value(&name) {
                    Ok(Value::String(name))
                } else {
                    Err(format!(
                        "Value \"{name}\" does not exist in \"{}\" enum.",
                        enum_def.name
                    ))
                }
            }
            _ => Err(format!(
                "Enum \"{}\" cannot represent non-enum value: {}.",
                enum_def.name,
                printed()
            )),
        },
        TypeDef::Scalar(scalar) => match (scalar.name.as_str(), value) {
            ("Int", AstValue::Int(text, _)) => text.parse::<i32>().map(Value::from).map_err(|_| {
                format!("Int cannot represent non 32-bit signed integer value: {text}")
            }),
            ("Int", _) => Err(format!("Int cannot represent non-integer value: {}", printed())),
            ("Float", AstValue::Int(text, _) | AstValue::Float(text, _)) => float_json(text)
                .ok_or_else(|| format!("Float cannot represent non numeric value: {text}")),
            ("Float", _) => Err(format!(
                "Float cannot represent non numeric value: {}",
                printed()
            )),
            ("String", AstValue::String(s, _)) => Ok(Value::String(s.clone())),
            ("String", _) => Err(format!(
                "String cannot represent a non string value: {}",
                printed()
            )),
            ("Boolean", AstValue::Boolean(b, _)) => Ok(Value::Bool(*b)),
            ("Boolean", _) => Err(format!(
                "Boolean cannot represent a non boolean value: {}",
                printed()
            )),
            ("ID", AstValue::String(s, _)) => Ok(Value::String(s.clone())),
            ("ID", AstValue::Int(text, _)) => Ok(Value::String(text.clone())),
            ("ID", _) => Err(format!(
                "ID cannot represent a non-string and non-integer value: {}",
                printed()
            )),
            _ => Ok(const_to_json(value, interner)),
        },
        _ => Err(format!("Unexpected input value: {}", printed())),
    }
}

/// Converts a literal into a JSON value of type `ty`, substituting
/// variables from `variables`.
///
/// Returns `Ok(None)` when the literal is a variable without a runtime
/// value, so the caller can fall back to a default.
pub fn coerce_literal(
    schema: &Schema,
    ty: &TypeRef,
    value: &AstValue,
    variables: &Map<String, Value>,
    interner: &Interner,
) -> Result<Option<Value>, String> {
    if let AstValue::Variable(name) = value {
        let name = interner.get(name.value);
        return match variables.get(&name) {
            Some(Value::Null) if ty.is_non_null() => {
                Err(format!("Variable \"${name}\" must not be null here."))
            }
            Some(value) => Ok(Some(value.clone())),
            None => Ok(None),
        };
    }
    match ty {
        TypeRef::NonNull(inner) => match value {
            AstValue::Null(_) => Err(format!("Expected non-nullable type \"{ty}\" not to be null.")),
            _ => coerce_literal(schema, inner, value, variables, interner),
        },
        _ if matches!(value, AstValue::Null(_)) => Ok(Some(Value::Null)),
        TypeRef::List(inner) => match value {
            AstValue::List(items, _) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let coerced = coerce_literal(schema, inner, item, variables, interner)?;
                    match coerced {
                        Some(v) => out.push(v),
                        None if inner.is_non_null() => {
                            return Err(format!(
                                "Expected non-nullable type \"{inner}\" not to be null."
                            ))
                        }
                        None => out.push(Value::Null),
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            single => Ok(coerce_literal(schema, inner, single, variables, interner)?
                .map(|v| Value::Array(vec![v]))),
        },
        TypeRef::Named(name) => match schema.get_type(name) {
            Some(TypeDef::InputObject(input)) => {
                let AstValue::Object(fields, _) = value else {
                    return Err(format!("Expected type \"{name}\" to be an object."));
                };
                let mut out = Map::new();
                for def in input.fields.values() {
                    let provided = fields
                        .iter()
                        .find(|(field_name, _)| interner.is(field_name.value, &def.name));
                    let coerced = match provided {
                        Some((_, field_value)) => {
                            coerce_literal(schema, &def.ty, field_value, variables, interner)?
                        }
                        None => None,
                    };
                    match coerced.or_else(|| def.default_value.clone()) {
                        Some(v) => {
                            out.insert(def.name.clone(), v);
                        }
                        None if def.ty.is_non_null() => {
                            return Err(format!(
                                "Field \"{}\" of required type \"{}\" was not provided.",
                                def.name, def.ty
                            ))
                        }
                        None => {}
                    }
                }
                Ok(Some(Value::Object(out)))
            }
            Some(def) => parse_literal(def, value, interner).map(Some),
            None => Err(format!("Unknown type \"{name}\".")),
        },
    }
}

/// A JSON input value that does not fit its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    /// Path inside the value where coercion failed.
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl InputError {
    fn new(path: &[PathSegment], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// Renders the path as `a.b[0]`.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

/// Coerces a JSON input value (typically a variable) to `ty`.
pub fn coerce_input_value(schema: &Schema, ty: &TypeRef, value: &Value) -> Result<Value, InputError> {
    let mut path = Vec::new();
    coerce_input(schema, ty, value, &mut path)
}

fn coerce_input(
    schema: &Schema,
    ty: &TypeRef,
    value: &Value,
    path: &mut Vec<PathSegment>,
) -> Result<Value, InputError> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(InputError::new(
                    path,
                    format!("Expected non-nullable type \"{ty}\" not to be null."),
                ));
            }
            coerce_input(schema, inner, value, path)
        }
        _ if value.is_null() => Ok(Value::Null),
        TypeRef::List(inner) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    let coerced = coerce_input(schema, inner, item, path);
                    path.pop();
                    out.push(coerced?);
                }
                Ok(Value::Array(out))
            }
            single => Ok(Value::Array(vec![coerce_input(schema, inner, single, path)?])),
        },
        TypeRef::Named(name) => match schema.get_type(name) {
            Some(TypeDef::InputObject(input)) => coerce_input_object(schema, input, value, path),
            Some(TypeDef::Enum(enum_def)) => coerce_enum(enum_def, value).map_err(|m| InputError::new(path, m)),
            Some(TypeDef::Scalar(scalar)) => {
                parse_scalar_value(&scalar.name, value).map_err(|m| InputError::new(path, m))
            }
            Some(_) => Err(InputError::new(
                path,
                format!("Type \"{name}\" is not an input type."),
            )),
            None => Err(InputError::new(path, format!("Unknown type \"{name}\"."))),
        },
    }
}

fn coerce_input_object(
    schema: &Schema,
    input: &InputObjectDef,
    value: &Value,
    path: &mut Vec<PathSegment>,
) -> Result<Value, InputError> {
    let Value::Object(fields) = value else {
        return Err(InputError::new(
            path,
            format!("Expected type \"{}\" to be an object.", input.name),
        ));
    };
    let mut out = Map::new();
    for def in input.fields.values() {
        match fields.get(&def.name) {
            Some(field_value) => {
                path.push(PathSegment::Field(def.name.clone()));
                let coerced = coerce_input(schema, &def.ty, field_value, path);
                path.pop();
                out.insert(def.name.clone(), coerced?);
            }
            None => {
                if let Some(default) = &def.default_value {
                    out.insert(def.name.clone(), default.clone());
                } else if def.ty.is_non_null() {
                    return Err(InputError::new(
                        path,
                        format!(
                            "Field \"{}\" of required type \"{}\" was not provided.",
                            def.name, def.ty
                        ),
                    ));
                }
            }
        }
    }
    if let Some(unknown) = fields.keys().find(|key| !input.fields.contains_key(*key)) {
        return Err(InputError::new(
            path,
            format!(
                "Field \"{unknown}\" is not defined by type \"{}\".",
                input.name
            ),
        ));
    }
    Ok(Value::Object(out))
}

fn coerce_enum(enum_def: &EnumDef, value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) if enum_def.has_value(s) => Ok(value.clone()),
        Value::String(s) => Err(format!(
            "Value \"{s}\" does not exist in \"{}\" enum.",
            enum_def.name
        )),
        other => Err(format!(
            "Enum \"{}\" cannot represent non-string value: {}.",
            enum_def.name,
            inspect(other)
        )),
    }
}

fn parse_scalar_value(name: &str, value: &Value) -> Result<Value, String> {
    match name {
        "Int" => {
            let Some(number) = value.as_f64() else {
                return Err(format!(
                    "Int cannot represent non-integer value: {}",
                    inspect(value)
                ));
            };
            if number.fract() != 0.0 {
                return Err(format!(
                    "Int cannot represent non-integer value: {}",
                    inspect(value)
                ));
            }
            if number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
                return Err(format!(
                    "Int cannot represent non 32-bit signed integer value: {}",
                    inspect(value)
                ));
            }
            #[allow(clippy::cast_possible_truncation)]
            Ok(Value::from(number as i32))
        }
        "Float" => match value {
            Value::Number(_) => Ok(value.clone()),
            _ => Err(format!(
                "Float cannot represent non numeric value: {}",
                inspect(value)
            )),
        },
        "String" => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(format!(
                "String cannot represent a non string value: {}",
                inspect(value)
            )),
        },
        "Boolean" => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(format!(
                "Boolean cannot represent a non boolean value: {}",
                inspect(value)
            )),
        },
        "ID" => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            _ => Err(format!("ID cannot represent value: {}", inspect(value))),
        },
        _ => Ok(value.clone()),
    }
}

/// Serializes a resolver result for a scalar or enum type.
pub fn serialize_leaf(schema: &Schema, type_name: &str, value: &Value) -> Result<Value, String> {
    match schema.get_type(type_name) {
        Some(TypeDef::Enum(enum_def)) => match value {
            Value::String(s) if enum_def.has_value(s) => Ok(value.clone()),
            other => Err(format!(
                "Enum \"{}\" cannot represent value: {}",
                enum_def.name,
                inspect(other)
            )),
        },
        Some(TypeDef::Scalar(_)) => serialize_scalar(type_name, value),
        _ => Err(format!("Type \"{type_name}\" is not a leaf type.")),
    }
}

fn serialize_scalar(name: &str, value: &Value) -> Result<Value, String> {
    match name {
        "Int" => {
            let number = match value {
                Value::Bool(b) => Some(f64::from(u8::from(*b))),
                Value::Number(n) => n.as_f64(),
                Value::String(s) if !s.is_empty() => s.parse::<f64>().ok(),
                _ => None,
            };
            match number {
                Some(n) if n.fract() == 0.0 => {
                    if n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
                        Err(format!(
                            "Int cannot represent non 32-bit signed integer value: {}",
                            inspect(value)
                        ))
                    } else {
                        #[allow(clippy::cast_possible_truncation)]
                        Ok(Value::from(n as i32))
                    }
                }
                _ => Err(format!(
                    "Int cannot represent non-integer value: {}",
                    inspect(value)
                )),
            }
        }
        "Float" => {
            let number = match value {
                Value::Bool(b) => Some(f64::from(u8::from(*b))),
                Value::Number(n) => n.as_f64(),
                Value::String(s) if !s.is_empty() => s.parse::<f64>().ok(),
                _ => None,
            };
            match number.filter(|n| n.is_finite()) {
                Some(n) => Ok(Value::from(n)),
                None => Err(format!(
                    "Float cannot represent non numeric value: {}",
                    inspect(value)
                )),
            }
        }
        "String" => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(format!("String cannot represent value: {}", inspect(value))),
        },
        "Boolean" => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|n| n != 0.0))),
            _ => Err(format!(
                "Boolean cannot represent a non boolean value: {}",
                inspect(value)
            )),
        },
        "ID" => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            _ => Err(format!("ID cannot represent value: {}", inspect(value))),
        },
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumValueDef, InputFieldDef, SchemaBuilder};
    use gqlbridge_syntax::{parse, Definition, Selection};
    use serde_json::json;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .add_type(TypeDef::Enum(EnumDef {
                name: "Color".to_string(),
                description: None,
                values: vec![EnumValueDef::new("RED"), EnumValueDef::new("BLUE")],
            }))
            .add_type(TypeDef::InputObject(InputObjectDef {
                name: "Filter".to_string(),
                description: None,
                fields: [
                    InputFieldDef::new("limit", TypeRef::non_null(TypeRef::named("Int"))),
                    InputFieldDef::new("color", TypeRef::named("Color"))
                        .default_value(json!("RED")),
                ]
                .into_iter()
                .map(|f| (f.name.clone(), f))
                .collect(),
            }))
            .build()
    }

    /// Parses `{ f(a: <literal>) }` and returns the literal.
    fn literal(source: &str, interner: &Interner) -> AstValue {
        let text = format!("{{ f(a: {source}) }}");
        let result = parse(&text, interner);
        assert!(result.is_ok(), "{source}");
        let Some(Definition::Operation(op)) = result.document.definitions.into_iter().next() else {
            panic!("expected an operation");
        };
        let Some(Selection::Field(field)) = op.selection_set.selections.into_iter().next() else {
            panic!("expected a field");
        };
        field.arguments.into_iter().next().unwrap().value
    }

    fn messages(ty: &TypeRef, source: &str) -> Vec<String> {
        let interner = Interner::new();
        let value = literal(source, &interner);
        literal_errors(&schema(), ty, &value, &interner)
            .into_iter()
            .map(|(_, message)| message)
            .collect()
    }

    #[test]
    fn test_print_value() {
        let interner = Interner::new();
        let value = literal(r#"{a: [1, 2.5, "x"], b: RED, c: null}"#, &interner);
        assert_eq!(
            print_value(&value, &interner),
            r#"{a: [1, 2.5, "x"], b: RED, c: null}"#
        );
    }

    #[test]
    fn test_literal_scalar_errors() {
        let int = TypeRef::named("Int");
        assert!(messages(&int, "3").is_empty());
        assert_eq!(
            messages(&int, r#""abc""#),
            vec![r#"Expected value of type "Int", found "abc"; Int cannot represent non-integer value: "abc""#]
        );
        assert_eq!(
            messages(&TypeRef::non_null(int), "null"),
            vec![r#"Expected value of type "Int!", found null."#]
        );
    }

    #[test]
    fn test_oversized_int_literal_is_echoed_as_written() {
        let int = TypeRef::named("Int");
        assert_eq!(
            messages(&int, "99999999999999999999"),
            vec!["Expected value of type \"Int\", found 99999999999999999999; Int cannot represent non 32-bit signed integer value: 99999999999999999999"]
        );
        assert_eq!(
            messages(&int, "2147483648"),
            vec!["Expected value of type \"Int\", found 2147483648; Int cannot represent non 32-bit signed integer value: 2147483648"]
        );
        assert!(messages(&int, "-2147483648").is_empty());

        let interner = Interner::new();
        let value = literal("99999999999999999999", &interner);
        assert_eq!(print_value(&value, &interner), "99999999999999999999");
    }

    #[test]
    fn test_non_finite_float_literal_is_rejected() {
        let float = TypeRef::named("Float");
        assert!(messages(&float, "1.5e300").is_empty());
        assert_eq!(
            messages(&float, "1e400"),
            vec!["Expected value of type \"Float\", found 1e400; Float cannot represent non numeric value: 1e400"]
        );
        assert_eq!(
            messages(&float, "-1e400"),
            vec!["Expected value of type \"Float\", found -1e400; Float cannot represent non numeric value: -1e400"]
        );
    }

    #[test]
    fn test_literal_enum_errors() {
        let color = TypeRef::named("Color");
        assert!(messages(&color, "BLUE").is_empty());
        assert_eq!(
            messages(&color, "GREEN"),
            vec![r#"Expected value of type "Color", found GREEN; Value "GREEN" does not exist in "Color" enum."#]
        );
    }

    #[test]
    fn test_literal_input_object_errors() {
        let filter = TypeRef::named("Filter");
        assert!(messages(&filter, "{limit: 10}").is_empty());
        assert_eq!(
            messages(&filter, "{color: RED, size: 2}"),
            vec![
                r#"Field "size" is not defined by type "Filter"."#,
                r#"Field "Filter.limit" of required type "Int!" was not provided."#,
            ]
        );
    }

    #[test]
    fn test_coerce_literal_with_variables() {
        let interner = Interner::new();
        let value = literal("{limit: $n}", &interner);
        let mut variables = Map::new();
        variables.insert("n".to_string(), json!(5));

        let coerced =
            coerce_literal(&schema(), &TypeRef::named("Filter"), &value, &variables, &interner)
                .unwrap();
        assert_eq!(coerced, Some(json!({"limit": 5, "color": "RED"})));

        let missing = coerce_literal(
            &schema(),
            &TypeRef::named("Filter"),
            &value,
            &Map::new(),
            &interner,
        );
        assert_eq!(
            missing.unwrap_err(),
            r#"Field "limit" of required type "Int!" was not provided."#
        );
    }

    #[test]
    fn test_coerce_input_value() {
        let schema = schema();
        let list = TypeRef::list(TypeRef::named("Int"));
        assert_eq!(
            coerce_input_value(&schema, &list, &json!(4)).unwrap(),
            json!([4])
        );

        let error = coerce_input_value(
            &schema,
            &TypeRef::named("Filter"),
            &json!({"limit": 1.5}),
        )
        .unwrap_err();
        assert_eq!(error.path_string(), "limit");
        assert_eq!(error.message, "Int cannot represent non-integer value: 1.5");

        let error = coerce_input_value(&schema, &TypeRef::named("Color"), &json!("GREEN"))
            .unwrap_err();
        assert_eq!(
            error.message,
            r#"Value "GREEN" does not exist in "Color" enum."#
        );
    }

    #[test]
    fn test_serialize_leaf() {
        let schema = schema();
        assert_eq!(serialize_leaf(&schema, "Int", &json!(true)).unwrap(), json!(1));
        assert_eq!(serialize_leaf(&schema, "ID", &json!(7)).unwrap(), json!("7"));
        assert_eq!(serialize_leaf(&schema, "String", &json!(1.5)).unwrap(), json!("1.5"));
        assert_eq!(
            serialize_leaf(&schema, "Int", &json!(2_147_483_648_i64)).unwrap_err(),
            "Int cannot represent non 32-bit signed integer value: 2147483648"
        );
        assert_eq!(
            serialize_leaf(&schema, "Color", &json!("GREEN")).unwrap_err(),
            r#"Enum "Color" cannot represent value: "GREEN""#
        );
    }
}
