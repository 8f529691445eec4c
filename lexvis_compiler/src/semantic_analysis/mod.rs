//! Semantic analysis of lexer grammars
//!
//! Runs after parsing. Every check contributes to one error list so a grammar
//! with several mistakes reports all of them in one run.

pub mod command_resolver;
pub mod cycle_analyzer;
pub mod lints;
pub mod reference_checker;
pub mod symbol_table;
pub mod types;

pub use lints::LintSettings;
pub use symbol_table::SymbolTable;
pub use types::{
    AnalyzedAlternative, AnalyzedGrammar, AnalyzedRule, SemanticError, SemanticOutput,
    SemanticResult, SemanticWarning,
};

use crate::{
    artifact::schema::DEFAULT_MODE,
    grammar::ast::{Element, ElementKind, GrammarFile},
    log_debug, log_info, log_success, log_warning,
    logging::codes,
};

/// Errors beyond this count are dropped from the report
pub const MAX_SEMANTIC_ERRORS: usize = 100;

pub struct SemanticAnalyzer {
    settings: LintSettings,
}

impl SemanticAnalyzer {
    pub fn new(settings: LintSettings) -> Self {
        Self { settings }
    }

    /// Analyze a parsed grammar named `name`; `file_stem` enables the name check
    pub fn analyze(&self, grammar: &GrammarFile, name: &str, file_stem: Option<&str>) -> SemanticOutput {
        log_info!("Starting semantic analysis",
            "grammar" => name,
            "lexer_rules" => grammar.lexer_rules.len(),
            "parser_rules" => grammar.parser_rules.len(),
            "modes" => grammar.modes.len() + 1);

        let start_time = std::time::Instant::now();
        let mut output = SemanticOutput::default();

        log_debug!("Step 1: Declarations and symbol numbering");
        let table = symbol_table::build_symbol_table(grammar, &mut output.errors);

        log_debug!("Step 2: Rule references and set elements");
        output
            .errors
            .extend(reference_checker::check_references(grammar, &table));

        log_debug!("Step 3: Recursive rule detection");
        output.errors.extend(cycle_analyzer::analyze_rule_cycles(grammar));

        log_debug!("Step 4: Lexer command resolution");
        let rules = build_rules(grammar, &table, &mut output.errors);

        log_debug!("Step 5: Lints");
        output.warnings = lints::lint_grammar(
            grammar,
            file_stem,
            table.implicit_literals.len(),
            self.settings,
        );
        for warning in &output.warnings {
            log_warning!(warning.code, &warning.message,
                "line" => warning.span.start.line,
                "column" => warning.span.start.column);
        }

        if output.errors.len() > MAX_SEMANTIC_ERRORS {
            log_info!("Error report truncated",
                "errors" => output.errors.len(),
                "limit" => MAX_SEMANTIC_ERRORS);
            output.errors.truncate(MAX_SEMANTIC_ERRORS);
        }

        if !output.errors.is_empty() {
            for error in &output.errors {
                error.log();
            }
            log_info!("Semantic analysis failed",
                "errors" => output.errors.len(),
                "warnings" => output.warnings.len());
            return output;
        }

        output.grammar = Some(AnalyzedGrammar {
            name: name.to_string(),
            kind: grammar.kind,
            vocabulary: table.vocabulary(),
            channel_names: table.channels.clone(),
            mode_names: table.modes.clone(),
            rules,
        });

        log_success!(codes::success::SEMANTIC_ANALYSIS_COMPLETE,
            "Semantic analysis completed",
            "grammar" => name,
            "token_types" => table.symbolic_names.len() - 1,
            "warnings" => output.warnings.len(),
            "duration_ms" => start_time.elapsed().as_millis());

        output
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new(LintSettings {
            warn_on_name_mismatch: true,
            warn_on_ignored_actions: true,
        })
    }
}

fn build_rules(
    grammar: &GrammarFile,
    table: &SymbolTable,
    errors: &mut Vec<SemanticError>,
) -> Vec<AnalyzedRule> {
    let grammar_case_insensitive = grammar.case_insensitive();
    let mut rules = Vec::with_capacity(table.implicit_literals.len() + grammar.lexer_rules.len());

    for literal in &table.implicit_literals {
        rules.push(AnalyzedRule {
            name: literal.rule_name.clone(),
            fragment: false,
            implicit: true,
            token_type: Some(literal.token_type),
            mode: DEFAULT_MODE,
            case_insensitive: grammar_case_insensitive,
            alternatives: vec![AnalyzedAlternative {
                elements: vec![Element::new(
                    ElementKind::Literal(literal.value.clone()),
                    literal.span,
                )],
                actions: Vec::new(),
            }],
            span: literal.span,
        });
    }

    for (index, rule) in grammar.lexer_rules.iter().enumerate() {
        // Duplicates were already reported
        if table.lexer_rules.get(&rule.name) != Some(&index) {
            continue;
        }

        let alternatives = rule
            .alternatives
            .iter()
            .map(|alt| AnalyzedAlternative {
                elements: alt.elements.clone(),
                actions: if rule.fragment {
                    Vec::new()
                } else {
                    command_resolver::resolve_commands(&alt.commands, table, errors)
                },
            })
            .collect();

        rules.push(AnalyzedRule {
            name: rule.name.clone(),
            fragment: rule.fragment,
            implicit: false,
            token_type: if rule.fragment {
                None
            } else {
                table.token_type(&rule.name)
            },
            mode: table.mode(&rule.mode).unwrap_or(DEFAULT_MODE),
            case_insensitive: rule.case_insensitive.unwrap_or(grammar_case_insensitive),
            alternatives,
            span: rule.span,
        });
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::schema::LexerAction;
    use crate::{lexical::tokenize, syntax::parse_grammar};
    use assert_matches::assert_matches;

    fn analyze(source: &str) -> SemanticOutput {
        let grammar = parse_grammar(tokenize(source).unwrap()).unwrap();
        SemanticAnalyzer::default().analyze(&grammar, "G", Some("G"))
    }

    #[test]
    fn test_combined_grammar() {
        let output = analyze(
            "grammar G;\n\
             options { caseInsensitive = true; }\n\
             prog : 'let' ID '=' INT ';' ;\n\
             ID : [a-z]+ ;\n\
             INT : DIGIT+ ;\n\
             fragment DIGIT : [0-9] ;\n\
             WS : [ \\r\\n]+ -> channel(HIDDEN) ;\n",
        );
        assert!(output.is_successful(), "{:?}", output.errors);
        let grammar = output.grammar.unwrap();

        let names: Vec<&str> = grammar.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["T__0", "T__1", "T__2", "ID", "INT", "DIGIT", "WS"]);
        assert!(grammar.rules[0].implicit);
        assert_eq!(grammar.rule("ID").unwrap().token_type, Some(4));
        assert_eq!(grammar.rule("DIGIT").unwrap().token_type, None);
        assert!(grammar.rules.iter().all(|r| r.case_insensitive));
        assert_eq!(
            grammar.rule("WS").unwrap().alternatives[0].actions,
            vec![LexerAction::Channel(1)]
        );
        assert_eq!(grammar.vocabulary.max_token_type, 6);
        assert_eq!(grammar.vocabulary.literal_name(1), Some("'let'"));
        assert_eq!(grammar.vocabulary.type_name(1), "1");
        assert_eq!(grammar.vocabulary.type_name(6), "WS");
    }

    #[test]
    fn test_collects_every_error() {
        let output = analyze(
            "lexer grammar G;\n\
             A : B ;\n\
             C : C 'c' ;\n\
             D : 'd' -> mode(NOPE) ;\n\
             E : ~'ee' ;\n",
        );
        assert!(!output.is_successful());
        assert!(output.grammar.is_none());
        let codes: Vec<&str> = output.errors.iter().map(|e| e.error_code().as_str()).collect();
        assert_eq!(codes, vec!["E100", "E107", "E102", "E103"]);
    }

    #[test]
    fn test_rule_modes_and_overrides() {
        let output = analyze(
            "lexer grammar G;\n\
             OPEN : '<' -> pushMode(TAG) ;\n\
             TEXT : ~'<'+ ;\n\
             mode TAG;\n\
             NAME options { caseInsensitive = true; } : [a-z]+ ;\n\
             CLOSE : '>' -> popMode ;\n",
        );
        assert!(output.is_successful(), "{:?}", output.errors);
        let grammar = output.grammar.unwrap();
        assert_eq!(grammar.mode_names, vec!["DEFAULT_MODE", "TAG"]);
        assert_eq!(grammar.rule("TEXT").unwrap().mode, 0);
        let name = grammar.rule("NAME").unwrap();
        assert_eq!(name.mode, 1);
        assert!(name.case_insensitive);
        assert!(!grammar.rule("CLOSE").unwrap().case_insensitive);
    }

    #[test]
    fn test_fragment_commands_dropped_with_warning() {
        let output = analyze("lexer grammar G;\nA : F ;\nfragment F : 'f' -> skip ;\n");
        assert!(output.is_successful());
        assert_matches!(&output.warnings[..], [w] if w.code == codes::warnings::COMMAND_ON_FRAGMENT);
        assert!(output.grammar.unwrap().rule("F").unwrap().alternatives[0].actions.is_empty());
    }
}
