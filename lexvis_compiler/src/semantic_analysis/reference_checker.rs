//! Rule references and element validity inside lexer rules

use super::{symbol_table::SymbolTable, types::SemanticError};
use crate::{
    grammar::ast::{CharSetItem, Element, ElementKind, GrammarFile},
    log_debug,
    tokens::escape_literal,
};

/// Check every element of every lexer rule
pub fn check_references(grammar: &GrammarFile, table: &SymbolTable) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    for rule in &grammar.lexer_rules {
        for alt in &rule.alternatives {
            for element in &alt.elements {
                check_element(element, grammar, table, &mut errors);
            }
        }
    }

    log_debug!("Reference check finished",
        "rules" => grammar.lexer_rules.len(),
        "errors" => errors.len());
    errors
}

fn check_element(
    element: &Element,
    grammar: &GrammarFile,
    table: &SymbolTable,
    errors: &mut Vec<SemanticError>,
) {
    match &element.kind {
        ElementKind::Literal(value) if value.is_empty() => {
            errors.push(SemanticError::EmptyLiteral { span: element.span });
        }
        ElementKind::Range(from, to) if from > to => {
            errors.push(invalid_range(*from, *to, element));
        }
        ElementKind::CharSet(items) => {
            if items.is_empty() {
                errors.push(SemanticError::EmptyLiteral { span: element.span });
            }
            for item in items {
                if let CharSetItem::Range(from, to) = item {
                    if from > to {
                        errors.push(invalid_range(*from, *to, element));
                    }
                }
            }
        }
        ElementKind::RuleRef(name) => {
            if !table.lexer_rules.contains_key(name) {
                errors.push(SemanticError::UndefinedRule {
                    name: name.clone(),
                    span: element.span,
                });
            }
        }
        ElementKind::Not(inner) => {
            check_element(inner, grammar, table, errors);
            if !is_set_like(inner, grammar, &mut Vec::new()) {
                errors.push(SemanticError::InvalidSetElement {
                    element: describe_element(inner),
                    span: inner.span,
                });
            }
        }
        ElementKind::Block(alternatives) => {
            for alt in alternatives {
                for nested in alt {
                    check_element(nested, grammar, table, errors);
                }
            }
        }
        ElementKind::Repeat { element: inner, .. } => {
            check_element(inner, grammar, table, errors);
        }
        _ => {}
    }
}

/// Whether the element denotes a set of single characters and can be negated
pub fn is_set_like(element: &Element, grammar: &GrammarFile, visiting: &mut Vec<String>) -> bool {
    match &element.kind {
        ElementKind::Literal(value) => value.chars().count() == 1,
        ElementKind::Range(..) | ElementKind::CharSet(_) => true,
        ElementKind::Not(inner) => is_set_like(inner, grammar, visiting),
        ElementKind::Block(alternatives) => alternatives.iter().all(|alt| match alt.as_slice() {
            [single] => is_set_like(single, grammar, visiting),
            _ => false,
        }),
        ElementKind::RuleRef(name) => {
            if visiting.contains(name) {
                return false;
            }
            let Some(rule) = grammar.lexer_rules.iter().find(|r| &r.name == name) else {
                return false;
            };
            visiting.push(name.clone());
            let result = rule.alternatives.iter().all(|alt| match alt.elements.as_slice() {
                [single] => is_set_like(single, grammar, visiting),
                _ => false,
            });
            visiting.pop();
            result
        }
        _ => false,
    }
}

/// Short human-readable form of an element for diagnostics
pub fn describe_element(element: &Element) -> String {
    match &element.kind {
        ElementKind::Literal(value) => format!("'{}'", escape_literal(value)),
        ElementKind::Range(from, to) => format!(
            "'{}'..'{}'",
            escape_literal(&from.to_string()),
            escape_literal(&to.to_string())
        ),
        ElementKind::CharSet(_) => "character set".to_string(),
        ElementKind::Wildcard => "wildcard".to_string(),
        ElementKind::RuleRef(name) => format!("rule reference {}", name),
        ElementKind::Not(_) => "negated set".to_string(),
        ElementKind::Block(_) => "block".to_string(),
        ElementKind::Repeat { quantifier, .. } => format!("{} loop", quantifier.symbol()),
        ElementKind::Action => "action".to_string(),
        ElementKind::Predicate => "semantic predicate".to_string(),
    }
}

fn invalid_range(from: char, to: char, element: &Element) -> SemanticError {
    SemanticError::InvalidRange {
        from: format!("'{}'", escape_literal(&from.to_string())),
        to: format!("'{}'", escape_literal(&to.to_string())),
        span: element.span,
    }
}
