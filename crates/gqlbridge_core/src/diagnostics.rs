//! Diagnostic reporting for gqlbridge.

use crate::span::{LineIndex, Location, Span};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// An error that rejects the document.
    Error,
    /// A warning that doesn't reject the document.
    Warning,
}

/// A diagnostic message tied to a span of the source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Diagnostic code, see [`codes`].
    pub code: &'static str,
    /// Client-facing message.
    pub message: String,
    /// Where the problem was found.
    pub span: Span,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    /// Returns true if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// Resolves the start of the span to a line/column location.
    #[must_use]
    pub fn location(&self, index: &LineIndex<'_>) -> Location {
        index.span_location(self.span)
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic.
    pub fn error(&mut self, code: &'static str, span: Span, message: impl Into<String>) {
        self.add(Diagnostic::error(code, span, message));
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns the first error reported, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.errors().next()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Consumes the bag, returning the diagnostics in report order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Diagnostic codes.
pub mod codes {
    pub const UNEXPECTED_TOKEN: &str = "E0001";
    pub const UNEXPECTED_EOF: &str = "E0002";
    pub const UNEXPECTED_CHARACTER: &str = "E0003";
    pub const UNTERMINATED_STRING: &str = "E0004";
    pub const INVALID_NUMBER: &str = "E0005";
    pub const INVALID_ESCAPE: &str = "E0006";
    pub const NESTING_TOO_DEEP: &str = "E0007";

    // Schema building
    pub const UNKNOWN_TYPE: &str = "E0101";
    pub const DUPLICATE_DEFINITION: &str = "E0102";
    pub const INVALID_DEFINITION: &str = "E0103";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.error(codes::UNEXPECTED_TOKEN, Span::new(0, 1), "first");
        bag.add(Diagnostic::warning("W0001", Span::new(2, 3), "noise"));
        bag.error(codes::UNEXPECTED_EOF, Span::new(4, 4), "second");

        assert!(bag.has_errors());
        assert_eq!(bag.len(), 3);
        assert_eq!(bag.error_count(), 2);
        assert_eq!(bag.first_error().map(|d| d.message.as_str()), Some("first"));
    }

    #[test]
    fn test_diagnostic_location() {
        let source = "{\n  hello(\n}";
        let index = LineIndex::new(source);
        let diag = Diagnostic::error(codes::UNEXPECTED_TOKEN, Span::new(11, 12), "bad");

        assert_eq!(diag.location(&index), Location::new(3, 1));
        assert_eq!(diag.to_string(), "bad");
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut bag = DiagnosticBag::new();
        bag.add(Diagnostic::warning("W0001", Span::empty(0), "just a hint"));

        assert!(!bag.has_errors());
        assert!(bag.first_error().is_none());
    }
}
