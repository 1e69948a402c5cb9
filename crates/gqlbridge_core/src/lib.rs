//! Core utilities for gqlbridge.
//!
//! This crate provides foundational types used throughout gqlbridge:
//! - `span`: Byte spans and line/column locations
//! - `text`: String interning
//! - `diagnostics`: Error reporting

pub mod diagnostics;
pub mod span;
pub mod text;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity};
pub use span::{LineIndex, Location, Span};
pub use text::{Interner, Text};
