//! Shared primitive types for the grammar lexer, parser and analyzer

pub mod span;

pub use span::{Position, Span, Spanned};
