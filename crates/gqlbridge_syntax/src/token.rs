//! Token kinds and structures for GraphQL.

use gqlbridge_core::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of a token.
///
/// Keywords get their own kinds so the parser can dispatch on them, but
/// every keyword is still a valid name wherever GraphQL expects one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TokenKind {
    // Special tokens
    Eof,
    Error,

    // Literals
    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BlockStringLiteral,

    // Keywords - type system
    Type,
    Interface,
    Union,
    Enum,
    Input,
    Scalar,
    Schema,
    Extend,
    Implements,
    Directive,
    Repeatable,

    // Keywords - executable
    Query,
    Mutation,
    Subscription,
    Fragment,
    On,

    // Keywords - values
    True,
    False,
    Null,

    // Punctuation
    Bang,
    Dollar,
    Amp,
    LParen,
    RParen,
    Spread,
    Colon,
    Eq,
    At,
    LBracket,
    RBracket,
    LBrace,
    Pipe,
    RBrace,
}

impl TokenKind {
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::Type
                | Self::Interface
                | Self::Union
                | Self::Enum
                | Self::Input
                | Self::Scalar
                | Self::Schema
                | Self::Extend
                | Self::Implements
                | Self::Directive
                | Self::Repeatable
                | Self::Query
                | Self::Mutation
                | Self::Subscription
                | Self::Fragment
                | Self::On
                | Self::True
                | Self::False
                | Self::Null
        )
    }

    /// Returns true if the token can be read as a GraphQL name.
    #[must_use]
    pub const fn is_name(self) -> bool {
        matches!(self, Self::Ident) || self.is_keyword()
    }

    #[must_use]
    pub const fn is_punctuator(self) -> bool {
        matches!(
            self,
            Self::Bang
                | Self::Dollar
                | Self::Amp
                | Self::LParen
                | Self::RParen
                | Self::Spread
                | Self::Colon
                | Self::Eq
                | Self::At
                | Self::LBracket
                | Self::RBracket
                | Self::LBrace
                | Self::Pipe
                | Self::RBrace
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "<EOF>",
            Self::Error => "<error>",
            Self::Ident => "Name",
            Self::IntLiteral => "Int",
            Self::FloatLiteral => "Float",
            Self::StringLiteral => "String",
            Self::BlockStringLiteral => "BlockString",
            Self::Type => "type",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::Input => "input",
            Self::Scalar => "scalar",
            Self::Schema => "schema",
            Self::Extend => "extend",
            Self::Implements => "implements",
            Self::Directive => "directive",
            Self::Repeatable => "repeatable",
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Fragment => "fragment",
            Self::On => "on",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Bang => "!",
            Self::Dollar => "$",
            Self::Amp => "&",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Spread => "...",
            Self::Colon => ":",
            Self::Eq => "=",
            Self::At => "@",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::Pipe => "|",
            Self::RBrace => "}",
        }
    }

    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "type" => Self::Type,
            "interface" => Self::Interface,
            "union" => Self::Union,
            "enum" => Self::Enum,
            "input" => Self::Input,
            "scalar" => Self::Scalar,
            "schema" => Self::Schema,
            "extend" => Self::Extend,
            "implements" => Self::Implements,
            "directive" => Self::Directive,
            "repeatable" => Self::Repeatable,
            "query" => Self::Query,
            "mutation" => Self::Mutation,
            "subscription" => Self::Subscription,
            "fragment" => Self::Fragment,
            "on" => Self::On,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_punctuator() {
            write!(f, "\"{}\"", self.as_str())
        } else {
            f.write_str(self.as_str())
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    #[inline]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_names() {
        for word in ["type", "query", "on", "null", "repeatable"] {
            let kind = TokenKind::from_keyword(word).unwrap();
            assert!(kind.is_keyword());
            assert!(kind.is_name());
            assert_eq!(kind.as_str(), word);
        }
        assert!(TokenKind::from_keyword("hello").is_none());
    }

    #[test]
    fn test_display_quotes_punctuators() {
        assert_eq!(TokenKind::RBrace.to_string(), "\"}\"");
        assert_eq!(TokenKind::Spread.to_string(), "\"...\"");
        assert_eq!(TokenKind::Eof.to_string(), "<EOF>");
        assert_eq!(TokenKind::Ident.to_string(), "Name");
    }
}
