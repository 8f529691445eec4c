//! Findings that do not stop compilation

use super::types::SemanticWarning;
use crate::{
    grammar::ast::{Element, ElementKind, GrammarFile, GrammarKind, Quantifier},
    logging::codes,
};

/// Options the generator understands; everything else is reported and ignored
const SUPPORTED_OPTIONS: &[&str] = &["caseInsensitive"];

#[derive(Debug, Clone, Copy)]
pub struct LintSettings {
    pub warn_on_name_mismatch: bool,
    pub warn_on_ignored_actions: bool,
}

pub fn lint_grammar(
    grammar: &GrammarFile,
    file_stem: Option<&str>,
    implicit_literal_count: usize,
    settings: LintSettings,
) -> Vec<SemanticWarning> {
    let mut warnings = Vec::new();

    if settings.warn_on_name_mismatch {
        if let (Some(name), Some(stem)) = (&grammar.name, file_stem) {
            if name.value != stem {
                warnings.push(SemanticWarning::new(
                    codes::warnings::NAME_MISMATCH,
                    format!("grammar name {} and file name {} differ", name.value, stem),
                    name.span,
                ));
            }
        }
    }

    for option in &grammar.options {
        if !SUPPORTED_OPTIONS.contains(&option.name.as_str()) {
            warnings.push(SemanticWarning::new(
                codes::warnings::IGNORED_OPTION,
                format!("unsupported option {} ignored", option.name),
                option.span,
            ));
        }
    }

    // ANTLR rejects these; the generator still builds the modes
    if grammar.kind == GrammarKind::Combined {
        if let Some(mode) = grammar.modes.first() {
            warnings.push(SemanticWarning::new(
                codes::warnings::MODES_IN_COMBINED,
                format!(
                    "lexical modes are only allowed in lexer grammars; mode {} kept",
                    mode.value
                ),
                mode.span,
            ));
        }
    }

    if settings.warn_on_ignored_actions {
        for action in &grammar.named_actions {
            warnings.push(SemanticWarning::new(
                codes::warnings::IGNORED_ACTION,
                format!("named action @{} ignored", action.value),
                action.span,
            ));
        }
    }

    for rule in &grammar.lexer_rules {
        if rule.fragment {
            for command in rule.alternatives.iter().flat_map(|alt| alt.commands.iter()) {
                warnings.push(SemanticWarning::new(
                    codes::warnings::COMMAND_ON_FRAGMENT,
                    format!(
                        "fragment rule {} contains an action or command which can never be executed",
                        rule.name
                    ),
                    command.span,
                ));
            }
        } else if rule
            .alternatives
            .iter()
            .any(|alt| sequence_nullable(&alt.elements, grammar, &mut Vec::new()))
        {
            warnings.push(SemanticWarning::new(
                codes::warnings::EMPTY_MATCH,
                format!("non-fragment lexer rule {} can match the empty string", rule.name),
                rule.span,
            ));
        }

        if settings.warn_on_ignored_actions {
            for alt in &rule.alternatives {
                for element in &alt.elements {
                    visit_actions(element, &mut |element| {
                        let what = if element.kind == ElementKind::Predicate {
                            "semantic predicate"
                        } else {
                            "action"
                        };
                        warnings.push(SemanticWarning::new(
                            codes::warnings::IGNORED_ACTION,
                            format!("{} in rule {} ignored", what, rule.name),
                            element.span,
                        ));
                    });
                }
            }
        }
    }

    if grammar.lexer_rules.iter().all(|r| r.fragment) && implicit_literal_count == 0 {
        let span = grammar.name.as_ref().map(|n| n.span).unwrap_or_default();
        warnings.push(SemanticWarning::new(
            codes::warnings::NO_LEXER_RULES,
            "grammar defines no lexer rules",
            span,
        ));
    }

    warnings
}

fn visit_actions(element: &Element, visit: &mut impl FnMut(&Element)) {
    match &element.kind {
        ElementKind::Action | ElementKind::Predicate => visit(element),
        ElementKind::Not(inner) | ElementKind::Repeat { element: inner, .. } => {
            visit_actions(inner, visit)
        }
        ElementKind::Block(alternatives) => {
            for nested in alternatives.iter().flatten() {
                visit_actions(nested, visit);
            }
        }
        _ => {}
    }
}

fn sequence_nullable(elements: &[Element], grammar: &GrammarFile, visiting: &mut Vec<String>) -> bool {
    elements.iter().all(|e| nullable(e, grammar, visiting))
}

/// Whether the element can match without consuming input
pub fn nullable(element: &Element, grammar: &GrammarFile, visiting: &mut Vec<String>) -> bool {
    match &element.kind {
        ElementKind::Literal(value) => value.is_empty(),
        ElementKind::Range(..) | ElementKind::CharSet(_) | ElementKind::Wildcard | ElementKind::Not(_) => false,
        ElementKind::Action | ElementKind::Predicate => true,
        ElementKind::Block(alternatives) => alternatives
            .iter()
            .any(|alt| sequence_nullable(alt, grammar, visiting)),
        ElementKind::Repeat {
            element, quantifier, ..
        } => match quantifier {
            Quantifier::Optional | Quantifier::ZeroOrMore => true,
            Quantifier::OneOrMore => nullable(element, grammar, visiting),
        },
        ElementKind::RuleRef(name) => {
            // Recursion is reported elsewhere
            if visiting.contains(name) {
                return false;
            }
            let Some(rule) = grammar.lexer_rules.iter().find(|r| &r.name == name) else {
                return false;
            };
            visiting.push(name.clone());
            let result = rule
                .alternatives
                .iter()
                .any(|alt| sequence_nullable(&alt.elements, grammar, visiting));
            visiting.pop();
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexical::tokenize, syntax::parse_grammar};

    const ALL: LintSettings = LintSettings {
        warn_on_name_mismatch: true,
        warn_on_ignored_actions: true,
    };

    fn lint(source: &str, stem: Option<&str>) -> Vec<SemanticWarning> {
        let grammar = parse_grammar(tokenize(source).unwrap()).unwrap();
        lint_grammar(&grammar, stem, 0, ALL)
    }

    fn codes_of(warnings: &[SemanticWarning]) -> Vec<&'static str> {
        warnings.iter().map(|w| w.code.as_str()).collect()
    }

    #[test]
    fn test_clean_grammar() {
        assert!(lint("lexer grammar L;\nA : [a-z]+ ;\n", Some("L")).is_empty());
    }

    #[test]
    fn test_name_mismatch_and_options() {
        let warnings = lint("lexer grammar L;\noptions { superClass = Base; }\nA : 'a' ;\n", Some("Other"));
        assert_eq!(codes_of(&warnings), vec!["W100", "W104"]);
        assert_eq!(warnings[0].message, "grammar name L and file name Other differ");
    }

    #[test]
    fn test_empty_match_and_fragment_command() {
        let warnings = lint(
            "lexer grammar L;\nA : 'a'* ;\nB : D? ;\nfragment D : 'd' -> skip ;\nE : 'e' ;\n",
            None,
        );
        assert_eq!(codes_of(&warnings), vec!["W103", "W103", "W102"]);
    }

    #[test]
    fn test_ignored_actions() {
        let warnings = lint("lexer grammar L;\n@members { int x; }\nA : 'a' {x++;} ;\n", None);
        assert_eq!(codes_of(&warnings), vec!["W101", "W101"]);

        let grammar = parse_grammar(tokenize("lexer grammar L;\nA : 'a' {x++;} ;\n").unwrap()).unwrap();
        let quiet = LintSettings {
            warn_on_ignored_actions: false,
            ..ALL
        };
        assert!(lint_grammar(&grammar, None, 0, quiet).is_empty());
    }

    #[test]
    fn test_modes_in_combined_grammar() {
        let source = "grammar G;\nstart : A ;\nA : 'a' -> pushMode(M) ;\nmode M;\nB : 'b' ;\nmode N;\nC : 'c' ;\n";
        let warnings = lint(source, None);
        assert_eq!(codes_of(&warnings), vec!["W106"]);
        assert_eq!(
            warnings[0].message,
            "lexical modes are only allowed in lexer grammars; mode M kept"
        );

        let lexer = lint("lexer grammar L;\nA : 'a' -> pushMode(M) ;\nmode M;\nB : 'b' ;\n", None);
        assert!(lexer.is_empty());
    }

    #[test]
    fn test_no_lexer_rules() {
        let grammar = parse_grammar(tokenize("grammar P;\nstart : 'x' ;\n").unwrap()).unwrap();
        assert!(lint_grammar(&grammar, None, 1, ALL).is_empty());
        let warnings = lint("lexer grammar L;\nfragment F : 'f' ;\n", None);
        assert_eq!(codes_of(&warnings), vec!["W105"]);
    }
}
