//! Recursive descent parser for GraphQL documents.
//!
//! The parser stops at the first syntax error: once a diagnostic has been
//! reported every loop unwinds and the partially built document is
//! returned alongside exactly one diagnostic.

use crate::ast::*;
use crate::lexer::{block_string_value, unescape, LexError, Lexer};
use crate::token::{Token, TokenKind};
use gqlbridge_core::{diagnostics::codes, DiagnosticBag, Interner, Span, Text};

/// Deepest nesting of selection sets, list and object values, and list
/// types accepted in a single document.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parser for GraphQL executable and type system documents.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_end: u32,
    depth: usize,
    diagnostics: DiagnosticBag,
}

/// Result of parsing.
pub struct ParseResult<'a> {
    pub document: Document<'a>,
    pub diagnostics: DiagnosticBag,
}

impl ParseResult<'_> {
    /// Returns true if the source parsed without errors.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Parses a source string into a document.
pub fn parse<'a>(source: &'a str, interner: &'a Interner) -> ParseResult<'a> {
    let mut parser = Parser::new(source, interner);
    let document = parser.parse_document();
    ParseResult {
        document,
        diagnostics: parser.diagnostics,
    }
}

impl<'a> Parser<'a> {
    /// Creates a new parser.
    pub fn new(source: &'a str, interner: &'a Interner) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source, interner),
            current: Token::new(TokenKind::Eof, Span::empty(0)),
            prev_end: 0,
            depth: 0,
            diagnostics: DiagnosticBag::new(),
        };
        parser.bump();
        parser
    }

    #[inline]
    fn at(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    #[inline]
    fn failed(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Reads the next token, reporting lexical errors as they appear.
    fn bump(&mut self) {
        self.current = self.lexer.next_token();
        if self.current.kind == TokenKind::Error {
            let (code, message) = match self.lexer.take_error() {
                Some(error @ LexError::UnterminatedString) => {
                    (codes::UNTERMINATED_STRING, error.to_string())
                }
                Some(error @ LexError::InvalidNumber(_)) => {
                    (codes::INVALID_NUMBER, error.to_string())
                }
                Some(error) => (codes::UNEXPECTED_CHARACTER, error.to_string()),
                None => (codes::UNEXPECTED_CHARACTER, "Unexpected character.".to_string()),
            };
            self.report(code, self.current.span, &message);
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.prev_end = self.current.span.end;
        self.bump();
    }

    /// Returns true once `close` is reached or after an error. Running
    /// into the end of input makes the next item report the error.
    fn at_end(&self, close: TokenKind) -> bool {
        self.at_kind(close) || self.failed()
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn current_text(&self) -> &'a str {
        self.lexer.span_text(self.current.span)
    }

    fn intern_current(&self) -> Text {
        self.lexer.intern_span(self.current.span)
    }

    /// Records a syntax error unless one has already been reported.
    fn report(&mut self, code: &'static str, span: Span, message: &str) {
        if !self.failed() {
            self.diagnostics
                .error(code, span, format!("Syntax Error: {message}"));
        }
    }

    /// Enters one level of nesting. Returns false, after reporting, once
    /// the document nests deeper than [`MAX_NESTING_DEPTH`].
    fn enter(&mut self) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            let message = format!(
                "Document nesting exceeds the maximum depth of {MAX_NESTING_DEPTH}."
            );
            self.report(codes::NESTING_TOO_DEEP, self.current.span, &message);
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Describes the current token the way error messages show it.
    fn describe_current(&self) -> String {
        let kind = self.at();
        match kind {
            TokenKind::Eof => kind.as_str().to_string(),
            _ if kind.is_punctuator() => kind.to_string(),
            _ if kind.is_name() => format!("Name \"{}\"", self.current_text()),
            TokenKind::StringLiteral => {
                let text = self.current_text();
                format!("String \"{}\"", &text[1..text.len() - 1])
            }
            TokenKind::BlockStringLiteral => {
                let text = self.current_text();
                format!("BlockString \"{}\"", &text[3..text.len() - 3])
            }
            _ => format!("{} \"{}\"", kind.as_str(), self.current_text()),
        }
    }

    fn unexpected(&mut self) {
        let code = if self.at_kind(TokenKind::Eof) {
            codes::UNEXPECTED_EOF
        } else {
            codes::UNEXPECTED_TOKEN
        };
        let message = format!("Unexpected {}.", self.describe_current());
        self.report(code, self.current.span, &message);
    }

    fn error_expected(&mut self, expected: &str) {
        let message = format!("Expected {expected}, found {}.", self.describe_current());
        self.report(codes::UNEXPECTED_TOKEN, self.current.span, &message);
    }

    /// Expects a punctuator.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            self.error_expected(&kind.to_string());
            false
        }
    }

    /// Expects a keyword, such as `on`.
    fn expect_keyword(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            self.error_expected(&format!("\"{}\"", kind.as_str()));
            false
        }
    }

    /// Parses `open item+ close`.
    fn many<T>(
        &mut self,
        open: TokenKind,
        mut item: impl FnMut(&mut Self) -> T,
        close: TokenKind,
    ) -> Vec<T> {
        let mut items = Vec::new();
        if !self.expect(open) {
            return items;
        }
        loop {
            items.push(item(self));
            if self.at_end(close) {
                break;
            }
        }
        self.expect(close);
        items
    }

    /// Parses `(open item+ close)?`.
    fn optional_many<T>(
        &mut self,
        open: TokenKind,
        item: impl FnMut(&mut Self) -> T,
        close: TokenKind,
    ) -> Vec<T> {
        if self.at_kind(open) {
            self.many(open, item, close)
        } else {
            Vec::new()
        }
    }

    /// Parses `open item* close`.
    fn any<T>(
        &mut self,
        open: TokenKind,
        mut item: impl FnMut(&mut Self) -> T,
        close: TokenKind,
    ) -> Vec<T> {
        let mut items = Vec::new();
        self.expect(open);
        while !self.at_end(close) {
            items.push(item(self));
        }
        self.expect(close);
        items
    }

    /// Parses a document.
    pub fn parse_document(&mut self) -> Document<'a> {
        let start = self.current.span.start;
        let mut definitions = Vec::new();

        loop {
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            }
            if self.at_kind(TokenKind::Eof) || self.failed() {
                break;
            }
        }

        Document {
            definitions,
            span: self.span_from(start),
        }
    }

    fn parse_definition(&mut self) -> Option<Definition<'a>> {
        if self.at_kind(TokenKind::LBrace) {
            return Some(Definition::Operation(self.parse_operation()));
        }

        let description = self.parse_description();

        let definition = match self.at() {
            TokenKind::Query | TokenKind::Mutation | TokenKind::Subscription
                if description.is_none() =>
            {
                Definition::Operation(self.parse_operation())
            }
            TokenKind::Fragment if description.is_none() => {
                Definition::Fragment(self.parse_fragment_definition())
            }
            TokenKind::Schema => Definition::Schema(self.parse_schema_definition(description)),
            TokenKind::Scalar => Definition::Type(TypeDefinition::Scalar(
                self.parse_scalar_type(description),
            )),
            TokenKind::Type => Definition::Type(TypeDefinition::Object(
                self.parse_object_type(description),
            )),
            TokenKind::Interface => Definition::Type(TypeDefinition::Interface(
                self.parse_object_type(description),
            )),
            TokenKind::Union => {
                Definition::Type(TypeDefinition::Union(self.parse_union_type(description)))
            }
            TokenKind::Enum => {
                Definition::Type(TypeDefinition::Enum(self.parse_enum_type(description)))
            }
            TokenKind::Input => Definition::Type(TypeDefinition::Input(
                self.parse_input_object_type(description),
            )),
            TokenKind::Directive => {
                Definition::Directive(self.parse_directive_definition(description))
            }
            _ => {
                self.unexpected();
                return None;
            }
        };
        Some(definition)
    }

    fn parse_description(&mut self) -> Option<Description<'a>> {
        let block = match self.at() {
            TokenKind::StringLiteral => false,
            TokenKind::BlockStringLiteral => true,
            _ => return None,
        };
        let span = self.current.span;
        let text = self.current_text();
        let quotes = if block { 3 } else { 1 };
        let raw = &text[quotes..text.len() - quotes];
        self.advance();
        Some(Description::new(raw, block, span))
    }

    /// Parses a name; keywords are valid names.
    fn parse_name(&mut self) -> Name {
        let span = self.current.span;
        if self.at().is_name() {
            let value = self.intern_current();
            self.advance();
            Name::new(value, span)
        } else {
            self.error_expected("Name");
            Name::new(self.lexer.intern_span(Span::empty(span.start)), span)
        }
    }

    // =========================================================================
    // Executable definitions
    // =========================================================================

    fn parse_operation(&mut self) -> OperationDefinition {
        let start = self.current.span.start;

        if self.at_kind(TokenKind::LBrace) {
            let selection_set = self.parse_selection_set();
            return OperationDefinition {
                operation: OperationType::Query,
                name: None,
                variables: Vec::new(),
                directives: Vec::new(),
                selection_set,
                span: self.span_from(start),
            };
        }

        let operation = self.parse_operation_type();
        let name = self.at().is_name().then(|| self.parse_name());
        let variables = self.optional_many(
            TokenKind::LParen,
            Self::parse_variable_definition,
            TokenKind::RParen,
        );
        let directives = self.parse_directives(false);
        let selection_set = self.parse_selection_set();

        OperationDefinition {
            operation,
            name,
            variables,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_operation_type(&mut self) -> OperationType {
        let operation = match self.at() {
            TokenKind::Query => OperationType::Query,
            TokenKind::Mutation => OperationType::Mutation,
            TokenKind::Subscription => OperationType::Subscription,
            _ => {
                self.unexpected();
                return OperationType::Query;
            }
        };
        self.advance();
        operation
    }

    fn parse_variable_definition(&mut self) -> VariableDefinition {
        let start = self.current.span.start;
        self.expect(TokenKind::Dollar);
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let default_value = if self.at_kind(TokenKind::Eq) {
            self.advance();
            Some(self.parse_value(true))
        } else {
            None
        };
        let directives = self.parse_directives(true);

        VariableDefinition {
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_fragment_definition(&mut self) -> FragmentDefinition {
        let start = self.current.span.start;
        self.advance(); // fragment

        let name = self.parse_fragment_name();
        self.expect_keyword(TokenKind::On);
        let type_condition = self.parse_name();
        let directives = self.parse_directives(false);
        let selection_set = self.parse_selection_set();

        FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_fragment_name(&mut self) -> Name {
        if self.at_kind(TokenKind::On) {
            self.unexpected();
        }
        self.parse_name()
    }

    /// Parses a selection set; an empty `{ }` is a syntax error.
    fn parse_selection_set(&mut self) -> SelectionSet {
        let start = self.current.span.start;
        if !self.enter() {
            return SelectionSet {
                selections: Vec::new(),
                span: Span::empty(start),
            };
        }
        let selections = self.many(TokenKind::LBrace, Self::parse_selection, TokenKind::RBrace);
        self.leave();
        SelectionSet {
            selections,
            span: self.span_from(start),
        }
    }

    fn parse_selection(&mut self) -> Selection {
        if !self.at_kind(TokenKind::Spread) {
            return Selection::Field(self.parse_field_selection());
        }

        let start = self.current.span.start;
        self.advance(); // ...

        if self.at().is_name() && !self.at_kind(TokenKind::On) {
            let name = self.parse_fragment_name();
            let directives = self.parse_directives(false);
            return Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                span: self.span_from(start),
            });
        }

        let type_condition = if self.at_kind(TokenKind::On) {
            self.advance();
            Some(self.parse_name())
        } else {
            None
        };
        let directives = self.parse_directives(false);
        let selection_set = self.parse_selection_set();
        Selection::InlineFragment(InlineFragment {
            type_condition,
            directives,
            selection_set,
            span: self.span_from(start),
        })
    }

    fn parse_field_selection(&mut self) -> FieldSelection {
        let start = self.current.span.start;

        let first_name = self.parse_name();
        let (alias, name) = if self.at_kind(TokenKind::Colon) {
            self.advance();
            (Some(first_name), self.parse_name())
        } else {
            (None, first_name)
        };

        let arguments = self.parse_arguments(false);
        let directives = self.parse_directives(false);
        let selection_set = self
            .at_kind(TokenKind::LBrace)
            .then(|| self.parse_selection_set());

        FieldSelection {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_arguments(&mut self, is_const: bool) -> Vec<Argument> {
        self.optional_many(
            TokenKind::LParen,
            |parser| parser.parse_argument(is_const),
            TokenKind::RParen,
        )
    }

    fn parse_argument(&mut self, is_const: bool) -> Argument {
        let start = self.current.span.start;
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let value = self.parse_value(is_const);
        Argument {
            name,
            value,
            span: self.span_from(start),
        }
    }

    fn parse_directives(&mut self, is_const: bool) -> Vec<Directive> {
        let mut directives = Vec::new();
        while self.at_kind(TokenKind::At) && !self.failed() {
            let start = self.current.span.start;
            self.advance(); // @
            let name = self.parse_name();
            let arguments = self.parse_arguments(is_const);
            directives.push(Directive {
                name,
                arguments,
                span: self.span_from(start),
            });
        }
        directives
    }

    // =========================================================================
    // Values and types
    // =========================================================================

    fn parse_value(&mut self, is_const: bool) -> Value {
        let span = self.current.span;

        match self.at() {
            TokenKind::LBracket | TokenKind::LBrace if !self.enter() => Value::Null(span),
            TokenKind::LBracket => {
                let items = self.any(
                    TokenKind::LBracket,
                    |parser| parser.parse_value(is_const),
                    TokenKind::RBracket,
                );
                self.leave();
                Value::List(items, self.span_from(span.start))
            }
            TokenKind::LBrace => {
                let fields = self.any(
                    TokenKind::LBrace,
                    |parser| {
                        let name = parser.parse_name();
                        parser.expect(TokenKind::Colon);
                        (name, parser.parse_value(is_const))
                    },
                    TokenKind::RBrace,
                );
                self.leave();
                Value::Object(fields, self.span_from(span.start))
            }
            TokenKind::IntLiteral => {
                let text = self.current_text().to_string();
                self.advance();
                Value::Int(text, span)
            }
            TokenKind::FloatLiteral => {
                let text = self.current_text().to_string();
                self.advance();
                Value::Float(text, span)
            }
            TokenKind::StringLiteral | TokenKind::BlockStringLiteral => self.parse_string_value(),
            TokenKind::True | TokenKind::False => {
                let value = self.at_kind(TokenKind::True);
                self.advance();
                Value::Boolean(value, span)
            }
            TokenKind::Null => {
                self.advance();
                Value::Null(span)
            }
            kind if kind.is_name() => Value::Enum(self.parse_name()),
            TokenKind::Dollar if !is_const => {
                self.advance();
                Value::Variable(self.parse_name())
            }
            TokenKind::Dollar => {
                self.advance();
                let name = self.current_text();
                let message = format!("Unexpected variable \"${name}\" in constant value.");
                self.report(codes::UNEXPECTED_TOKEN, span, &message);
                Value::Null(span)
            }
            _ => {
                self.unexpected();
                Value::Null(span)
            }
        }
    }

    fn parse_string_value(&mut self) -> Value {
        let span = self.current.span;
        let text = self.current_text();
        let value = if self.at_kind(TokenKind::BlockStringLiteral) {
            block_string_value(&text[3..text.len() - 3])
        } else {
            match unescape(&text[1..text.len() - 1]) {
                Ok(value) => value,
                Err(error) => {
                    self.report(codes::INVALID_ESCAPE, span, &error.to_string());
                    String::new()
                }
            }
        };
        self.advance();
        Value::String(value, span)
    }

    fn parse_type(&mut self) -> Type {
        let start = self.current.span.start;
        let ty = if self.at_kind(TokenKind::LBracket) {
            if !self.enter() {
                let span = Span::empty(start);
                return Type::Named(Name::new(self.lexer.intern_span(span), span));
            }
            self.advance();
            let inner = self.parse_type();
            self.leave();
            self.expect(TokenKind::RBracket);
            Type::List(Box::new(inner), self.span_from(start))
        } else {
            Type::Named(self.parse_name())
        };

        if self.at_kind(TokenKind::Bang) {
            self.advance();
            Type::NonNull(Box::new(ty), self.span_from(start))
        } else {
            ty
        }
    }

    // =========================================================================
    // Type system definitions
    // =========================================================================

    fn parse_schema_definition(
        &mut self,
        description: Option<Description<'a>>,
    ) -> SchemaDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // schema

        let directives = self.parse_directives(true);
        let operations = self.many(
            TokenKind::LBrace,
            |parser| {
                let op_start = parser.current.span.start;
                let operation = parser.parse_operation_type();
                parser.expect(TokenKind::Colon);
                let type_name = parser.parse_name();
                OperationTypeDefinition {
                    operation,
                    type_name,
                    span: parser.span_from(op_start),
                }
            },
            TokenKind::RBrace,
        );

        SchemaDefinition {
            description,
            directives,
            operations,
            span: self.span_from(start),
        }
    }

    fn parse_scalar_type(&mut self, description: Option<Description<'a>>) -> ScalarTypeDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // scalar
        let name = self.parse_name();
        let directives = self.parse_directives(true);
        ScalarTypeDefinition {
            description,
            name,
            directives,
            span: self.span_from(start),
        }
    }

    /// Parses `type` and `interface` definitions.
    fn parse_object_type(&mut self, description: Option<Description<'a>>) -> ObjectTypeDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // type | interface

        let name = self.parse_name();
        let implements = self.parse_implements();
        let directives = self.parse_directives(true);
        let fields = self.optional_many(
            TokenKind::LBrace,
            Self::parse_field_definition,
            TokenKind::RBrace,
        );

        ObjectTypeDefinition {
            description,
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    fn parse_implements(&mut self) -> Vec<Name> {
        let mut interfaces = Vec::new();
        if !self.at_kind(TokenKind::Implements) {
            return interfaces;
        }
        self.advance();
        if self.at_kind(TokenKind::Amp) {
            self.advance();
        }
        loop {
            interfaces.push(self.parse_name());
            if !self.at_kind(TokenKind::Amp) || self.failed() {
                break;
            }
            self.advance();
        }
        interfaces
    }

    fn parse_field_definition(&mut self) -> FieldDefinition<'a> {
        let start = self.current.span.start;
        let description = self.parse_description();
        let name = self.parse_name();
        let arguments = self.optional_many(
            TokenKind::LParen,
            Self::parse_input_value_definition,
            TokenKind::RParen,
        );
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let directives = self.parse_directives(true);

        FieldDefinition {
            description,
            name,
            arguments,
            ty,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_input_value_definition(&mut self) -> InputValueDefinition<'a> {
        let start = self.current.span.start;
        let description = self.parse_description();
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let default_value = if self.at_kind(TokenKind::Eq) {
            self.advance();
            Some(self.parse_value(true))
        } else {
            None
        };
        let directives = self.parse_directives(true);

        InputValueDefinition {
            description,
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_union_type(&mut self, description: Option<Description<'a>>) -> UnionTypeDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // union

        let name = self.parse_name();
        let directives = self.parse_directives(true);
        let mut members = Vec::new();
        if self.at_kind(TokenKind::Eq) {
            self.advance();
            if self.at_kind(TokenKind::Pipe) {
                self.advance();
            }
            loop {
                members.push(self.parse_name());
                if !self.at_kind(TokenKind::Pipe) || self.failed() {
                    break;
                }
                self.advance();
            }
        }

        UnionTypeDefinition {
            description,
            name,
            directives,
            members,
            span: self.span_from(start),
        }
    }

    fn parse_enum_type(&mut self, description: Option<Description<'a>>) -> EnumTypeDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // enum

        let name = self.parse_name();
        let directives = self.parse_directives(true);
        let values = self.optional_many(
            TokenKind::LBrace,
            Self::parse_enum_value_definition,
            TokenKind::RBrace,
        );

        EnumTypeDefinition {
            description,
            name,
            directives,
            values,
            span: self.span_from(start),
        }
    }

    fn parse_enum_value_definition(&mut self) -> EnumValueDefinition<'a> {
        let start = self.current.span.start;
        let description = self.parse_description();
        if matches!(self.at(), TokenKind::True | TokenKind::False | TokenKind::Null) {
            let message = format!(
                "Name \"{}\" is reserved and cannot be used for an enum value.",
                self.current_text()
            );
            self.report(codes::UNEXPECTED_TOKEN, self.current.span, &message);
        }
        let name = self.parse_name();
        let directives = self.parse_directives(true);

        EnumValueDefinition {
            description,
            name,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_input_object_type(
        &mut self,
        description: Option<Description<'a>>,
    ) -> InputObjectTypeDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // input

        let name = self.parse_name();
        let directives = self.parse_directives(true);
        let fields = self.optional_many(
            TokenKind::LBrace,
            Self::parse_input_value_definition,
            TokenKind::RBrace,
        );

        InputObjectTypeDefinition {
            description,
            name,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    fn parse_directive_definition(
        &mut self,
        description: Option<Description<'a>>,
    ) -> DirectiveDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // directive

        self.expect(TokenKind::At);
        let name = self.parse_name();
        let arguments = self.optional_many(
            TokenKind::LParen,
            Self::parse_input_value_definition,
            TokenKind::RParen,
        );
        let repeatable = self.at_kind(TokenKind::Repeatable);
        if repeatable {
            self.advance();
        }
        self.expect_keyword(TokenKind::On);
        if self.at_kind(TokenKind::Pipe) {
            self.advance();
        }

        let mut locations = Vec::new();
        loop {
            match crate::ast::DirectiveLocation::parse(self.current_text()) {
                Some(location) if self.at().is_name() => {
                    locations.push(location);
                    self.advance();
                }
                _ => {
                    self.unexpected();
                    break;
                }
            }
            if !self.at_kind(TokenKind::Pipe) || self.failed() {
                break;
            }
            self.advance();
        }

        DirectiveDefinition {
            description,
            name,
            arguments,
            repeatable,
            locations,
            span: self.span_from(start),
        }
    }
}
