//! ANTLR-compatible `.tokens` vocabulary file
//!
//! One `NAME=type` line per named token type, then one `'literal'=type` line
//! per literal, both in type order.

use crate::semantic_analysis::AnalyzedGrammar;
use std::fmt::Write;

pub fn render(grammar: &AnalyzedGrammar) -> String {
    let vocabulary = &grammar.vocabulary;
    let mut out = String::new();

    for token_type in 1..=vocabulary.max_token_type {
        let name = vocabulary
            .symbolic_name(token_type)
            .map(str::to_string)
            .or_else(|| {
                grammar
                    .rules
                    .iter()
                    .find(|r| r.implicit && r.token_type == Some(token_type))
                    .map(|r| r.name.clone())
            });
        if let Some(name) = name {
            let _ = writeln!(out, "{}={}", name, token_type);
        }
    }

    for token_type in 1..=vocabulary.max_token_type {
        if let Some(literal) = vocabulary.literal_name(token_type) {
            let _ = writeln!(out, "{}={}", literal, token_type);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexical::tokenize, semantic_analysis::SemanticAnalyzer, syntax::parse_grammar};

    #[test]
    fn test_implicit_tokens_are_named() {
        let grammar = parse_grammar(
            tokenize("grammar Calc;\ne : e '*' e | INT ;\nINT : [0-9]+ ;\nSTAR_ALIAS : '*' ;\nPLUS : '+' ;\n").unwrap(),
        )
        .unwrap();
        let analyzed = SemanticAnalyzer::default()
            .analyze(&grammar, "Calc", None)
            .grammar
            .unwrap();
        assert_eq!(
            render(&analyzed),
            "INT=1\nSTAR_ALIAS=2\nPLUS=3\n'*'=2\n'+'=3\n"
        );

        let grammar = parse_grammar(tokenize("grammar G;\ns : 'go' ;\nID : [a-z]+ ;\n").unwrap()).unwrap();
        let analyzed = SemanticAnalyzer::default().analyze(&grammar, "G", None).grammar.unwrap();
        assert_eq!(render(&analyzed), "T__0=1\nID=2\n'go'=1\n");
    }
}
