//! Abstract syntax of a grammar file
//!
//! Only what the lexer generator needs is kept: lexer rules in full, parser
//! rules reduced to the string literals they mention.

use crate::utils::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// Name of the implicit first mode
pub const DEFAULT_MODE_NAME: &str = "DEFAULT_MODE";

/// Declared kind of a grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrammarKind {
    Lexer,
    Parser,
    Combined,
}

impl GrammarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarKind::Lexer => "lexer",
            GrammarKind::Parser => "parser",
            GrammarKind::Combined => "combined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarFile {
    pub kind: GrammarKind,
    /// Declared name; `None` when the header is missing
    pub name: Option<Spanned<String>>,
    pub options: Vec<GrammarOption>,
    pub tokens: Vec<Spanned<String>>,
    pub channels: Vec<Spanned<String>>,
    /// Named actions such as `@header`, skipped by the generator
    pub named_actions: Vec<Spanned<String>>,
    /// Declared modes in order, without `DEFAULT_MODE`
    pub modes: Vec<Spanned<String>>,
    pub lexer_rules: Vec<LexerRule>,
    pub parser_rules: Vec<ParserRule>,
}

impl GrammarFile {
    pub fn option(&self, name: &str) -> Option<&GrammarOption> {
        self.options.iter().rev().find(|opt| opt.name == name)
    }

    pub fn case_insensitive(&self) -> bool {
        self.option("caseInsensitive")
            .map(|opt| opt.value == "true")
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarOption {
    pub name: String,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexerRule {
    pub name: String,
    pub fragment: bool,
    /// Mode section the rule was declared in
    pub mode: String,
    /// Rule-level `options { caseInsensitive = ... }` override
    pub case_insensitive: Option<bool>,
    pub alternatives: Vec<LexerAlternative>,
    pub span: Span,
}

/// Outer alternative of a lexer rule; commands apply to the whole alternative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexerAlternative {
    pub elements: Vec<Element>,
    pub commands: Vec<LexerCommand>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub span: Span,
}

impl Element {
    pub fn new(kind: ElementKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Decoded string literal
    Literal(String),
    /// `'a'..'z'`
    Range(char, char),
    /// `[a-z_]`
    CharSet(Vec<CharSetItem>),
    /// `.`
    Wildcard,
    RuleRef(String),
    /// `~x`
    Not(Box<Element>),
    /// `( alt | alt )`
    Block(Vec<Vec<Element>>),
    Repeat {
        element: Box<Element>,
        quantifier: Quantifier,
        greedy: bool,
    },
    /// `{...}`, ignored
    Action,
    /// `{...}?`, ignored
    Predicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharSetItem {
    Char(char),
    Range(char, char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Quantifier::Optional => "?",
            Quantifier::ZeroOrMore => "*",
            Quantifier::OneOrMore => "+",
        }
    }
}

/// Unresolved lexer command as written after `->`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexerCommand {
    pub name: String,
    pub argument: Option<CommandArgument>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandArgument {
    Name(String),
    Number(i64),
}

impl std::fmt::Display for CommandArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandArgument::Name(name) => f.write_str(name),
            CommandArgument::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserRule {
    pub name: String,
    /// String literals referenced in the rule body, in order
    pub literals: Vec<Spanned<String>>,
    pub span: Span,
}
