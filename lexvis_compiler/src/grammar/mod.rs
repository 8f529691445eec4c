//! Grammar language definitions: reserved words and the syntax tree

pub mod ast;
pub mod keywords;

pub use ast::{
    CharSetItem, CommandArgument, Element, ElementKind, GrammarFile, GrammarKind, GrammarOption,
    LexerAlternative, LexerCommand, LexerRule, ParserRule, Quantifier, DEFAULT_MODE_NAME,
};
pub use keywords::Keyword;
