//! Declaration checks and number assignment for token types, channels and modes

use super::types::SemanticError;
use crate::{
    artifact::schema::{Vocabulary, DEFAULT_TOKEN_CHANNEL, HIDDEN_CHANNEL},
    config::compile_time::{automaton::MAX_MODES, grammar::MAX_RULE_COUNT},
    grammar::ast::{ElementKind, GrammarFile, LexerRule, DEFAULT_MODE_NAME},
    log_debug,
    tokens::escape_literal,
    utils::{Span, Spanned},
};
use std::collections::HashMap;

pub const DEFAULT_CHANNEL_NAME: &str = "DEFAULT_TOKEN_CHANNEL";
pub const HIDDEN_CHANNEL_NAME: &str = "HIDDEN";

/// Parser-rule literal that needs a synthesized `T__n` rule
#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitLiteral {
    pub rule_name: String,
    pub value: String,
    pub token_type: i32,
    pub span: Span,
}

/// Every name the grammar declares, mapped to its number
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub token_types: HashMap<String, i32>,
    pub literal_names: Vec<Option<String>>,
    pub symbolic_names: Vec<Option<String>>,
    pub channels: Vec<String>,
    pub modes: Vec<String>,
    pub implicit_literals: Vec<ImplicitLiteral>,
    /// First declaration of each lexer rule
    pub lexer_rules: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn token_type(&self, name: &str) -> Option<i32> {
        self.token_types.get(name).copied()
    }

    pub fn channel(&self, name: &str) -> Option<i32> {
        self.channels.iter().position(|c| c == name).map(|i| i as i32)
    }

    pub fn mode(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|m| m == name)
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(self.literal_names.clone(), self.symbolic_names.clone())
    }

    fn define_token(&mut self, name: Option<&str>, literal: Option<String>) -> i32 {
        let token_type = self.symbolic_names.len() as i32;
        self.symbolic_names.push(name.map(str::to_string));
        self.literal_names.push(literal);
        if let Some(name) = name {
            self.token_types.insert(name.to_string(), token_type);
        }
        token_type
    }
}

/// Quoted display form used for literal names, e.g. `'+'`
pub fn quoted_literal(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

/// Literal a rule consists of, if its only alternative is exactly one string
pub fn single_literal(rule: &LexerRule) -> Option<&str> {
    match rule.alternatives.as_slice() {
        [alt] => match alt.elements.as_slice() {
            [element] => match &element.kind {
                ElementKind::Literal(value) => Some(value.as_str()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Build the symbol table, collecting declaration errors
pub fn build_symbol_table(grammar: &GrammarFile, errors: &mut Vec<SemanticError>) -> SymbolTable {
    let mut table = SymbolTable {
        symbolic_names: vec![None],
        literal_names: vec![None],
        ..Default::default()
    };

    check_limits(grammar, errors);

    // Lexer rule names
    for (index, rule) in grammar.lexer_rules.iter().enumerate() {
        if let Some(&first) = table.lexer_rules.get(&rule.name) {
            errors.push(SemanticError::DuplicateRule {
                name: rule.name.clone(),
                previous_line: grammar.lexer_rules[first].span.start.line,
                span: rule.span,
            });
        } else {
            table.lexer_rules.insert(rule.name.clone(), index);
        }
    }

    // Parser rule names only clash among themselves
    let mut parser_rules: HashMap<&str, u32> = HashMap::new();
    for rule in &grammar.parser_rules {
        if let Some(&line) = parser_rules.get(rule.name.as_str()) {
            errors.push(SemanticError::DuplicateRule {
                name: rule.name.clone(),
                previous_line: line,
                span: rule.span,
            });
        } else {
            parser_rules.insert(&rule.name, rule.span.start.line);
        }
    }

    // Channels
    table.channels = vec![DEFAULT_CHANNEL_NAME.to_string(), HIDDEN_CHANNEL_NAME.to_string()];
    for channel in &grammar.channels {
        if table.channels.contains(&channel.value) {
            errors.push(duplicate("channel", channel));
        } else {
            table.channels.push(channel.value.clone());
        }
    }
    debug_assert_eq!(table.channel(DEFAULT_CHANNEL_NAME), Some(DEFAULT_TOKEN_CHANNEL));
    debug_assert_eq!(table.channel(HIDDEN_CHANNEL_NAME), Some(HIDDEN_CHANNEL));

    // Modes; reopening a mode continues it
    table.modes = vec![DEFAULT_MODE_NAME.to_string()];
    for mode in &grammar.modes {
        if !table.modes.contains(&mode.value) {
            table.modes.push(mode.value.clone());
        }
    }

    // tokens {} names come first
    for token in &grammar.tokens {
        if table.token_types.contains_key(&token.value) {
            errors.push(duplicate("token", token));
        } else {
            table.define_token(Some(&token.value), None);
        }
    }

    // Literals of parser rules a lexer rule already spells out do not get T__n
    let mut aliased: HashMap<&str, &str> = HashMap::new();
    for rule in grammar.lexer_rules.iter().filter(|r| !r.fragment) {
        if let Some(value) = single_literal(rule) {
            aliased.entry(value).or_insert(&rule.name);
        }
    }

    let mut seen_literals: Vec<&str> = Vec::new();
    for literal in grammar.parser_rules.iter().flat_map(|r| r.literals.iter()) {
        if literal.value.is_empty() {
            errors.push(SemanticError::EmptyLiteral { span: literal.span });
            continue;
        }
        if aliased.contains_key(literal.value.as_str()) || seen_literals.contains(&literal.value.as_str()) {
            continue;
        }
        seen_literals.push(&literal.value);

        let rule_name = format!("T__{}", table.implicit_literals.len());
        let token_type = table.define_token(None, Some(quoted_literal(&literal.value)));
        table.implicit_literals.push(ImplicitLiteral {
            rule_name,
            value: literal.value.clone(),
            token_type,
            span: literal.span,
        });
    }

    // Non-fragment lexer rules in declaration order
    for rule in grammar.lexer_rules.iter().filter(|r| !r.fragment) {
        let literal = single_literal(rule).map(quoted_literal);
        match table.token_type(&rule.name) {
            Some(existing) => {
                // A tokens {} entry backed by a rule keeps its number
                if let (Some(literal), Some(slot)) =
                    (literal, table.literal_names.get_mut(existing as usize))
                {
                    if slot.is_none() {
                        *slot = Some(literal);
                    }
                }
            }
            None => {
                table.define_token(Some(&rule.name), literal);
            }
        }
    }

    log_debug!("Symbol table built",
        "token_types" => table.symbolic_names.len() - 1,
        "implicit_literals" => table.implicit_literals.len(),
        "channels" => table.channels.len(),
        "modes" => table.modes.len());

    table
}

fn check_limits(grammar: &GrammarFile, errors: &mut Vec<SemanticError>) {
    let rule_count = grammar.lexer_rules.len();
    if rule_count > MAX_RULE_COUNT {
        let span = grammar.lexer_rules[MAX_RULE_COUNT].span;
        errors.push(SemanticError::TooManyRules {
            count: rule_count,
            limit: MAX_RULE_COUNT,
            span,
        });
    }

    let mut distinct_modes: Vec<&str> = vec![DEFAULT_MODE_NAME];
    for mode in &grammar.modes {
        if !distinct_modes.contains(&mode.value.as_str()) {
            distinct_modes.push(&mode.value);
        }
        if distinct_modes.len() > MAX_MODES {
            errors.push(SemanticError::TooManyModes {
                count: distinct_modes.len(),
                limit: MAX_MODES,
                span: mode.span,
            });
            break;
        }
    }
}

fn duplicate(kind: &'static str, name: &Spanned<String>) -> SemanticError {
    SemanticError::DuplicateDeclaration {
        kind,
        name: name.value.clone(),
        span: name.span,
    }
}
