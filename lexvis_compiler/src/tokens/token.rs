//! Tokens of the grammar language
use crate::grammar::ast::CharSetItem;
use crate::grammar::keywords::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    Keyword(Keyword),
    /// Rule, token, mode or option name
    Identifier(String),
    /// `'...'` with escapes decoded
    StringLiteral(String),
    /// `[...]` with escapes decoded
    CharSet(Vec<CharSetItem>),
    Integer(i64),
    /// `{...}` body
    Action(String),
    /// `{...}?` body
    Predicate(String),

    // Punctuation
    Colon,     // :
    ColonColon, // ::
    Semi,      // ;
    Pipe,      // |
    Arrow,     // ->
    LParen,    // (
    RParen,    // )
    LBrace,    // { opening a declaration block
    RBrace,    // }
    Comma,     // ,
    Dot,       // .
    Range,     // ..
    Tilde,     // ~
    Question,  // ?
    Star,      // *
    Plus,      // +
    Assign,    // =
    PlusAssign, // +=
    At,        // @
    Pound,     // #
    Lt,        // <
    Gt,        // >

    // Trivia
    Whitespace,
    Comment(String),

    Eof,
}

impl Token {
    /// Trivia is dropped from the parser's view of the stream
    pub fn is_significant(&self) -> bool {
        !matches!(self, Token::Whitespace | Token::Comment(_))
    }

    /// Rendering used in syntax diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Keyword(k) => format!("'{}'", k),
            Token::Identifier(name) => format!("'{}'", name),
            Token::StringLiteral(value) => format!("'{}'", escape_literal(value)),
            Token::CharSet(_) => "character set".to_string(),
            Token::Integer(n) => format!("'{}'", n),
            Token::Action(_) => "action".to_string(),
            Token::Predicate(_) => "semantic predicate".to_string(),
            Token::Whitespace => "whitespace".to_string(),
            Token::Comment(_) => "comment".to_string(),
            Token::Eof => "<EOF>".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Colon => ":",
            Token::ColonColon => "::",
            Token::Semi => ";",
            Token::Pipe => "|",
            Token::Arrow => "->",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Range => "..",
            Token::Tilde => "~",
            Token::Question => "?",
            Token::Star => "*",
            Token::Plus => "+",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::At => "@",
            Token::Pound => "#",
            Token::Lt => "<",
            Token::Gt => ">",
            _ => "",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Re-escape a decoded literal for display (`'\n'` rather than a raw newline)
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance() {
        assert!(!Token::Whitespace.is_significant());
        assert!(!Token::Comment("// x".into()).is_significant());
        assert!(Token::Semi.is_significant());
        assert!(Token::Eof.is_significant());
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Arrow.describe(), "'->'");
        assert_eq!(Token::Keyword(Keyword::Mode).describe(), "'mode'");
        assert_eq!(Token::StringLiteral("\n".into()).describe(), "'\\n'");
        assert_eq!(Token::Eof.describe(), "<EOF>");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("a'b\\"), "a\\'b\\\\");
        assert_eq!(escape_literal("\t"), "\\t");
    }
}
