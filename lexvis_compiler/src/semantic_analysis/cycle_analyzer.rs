//! Recursive lexer rule detection
//!
//! Lexer rules are inlined into a finite automaton, so any cycle in the
//! rule reference graph (including self-reference) is rejected.

use super::types::SemanticError;
use crate::{
    grammar::ast::{Element, ElementKind, GrammarFile},
    log_debug,
    utils::Span,
};
use std::collections::HashMap;

/// Longest cycle path kept in a diagnostic
const MAX_CYCLE_PATH_LENGTH: usize = 32;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct ReferenceGraph<'a> {
    names: Vec<&'a str>,
    /// Outgoing references with the span of the referencing element
    edges: Vec<Vec<(usize, Span)>>,
}

impl<'a> ReferenceGraph<'a> {
    fn build(grammar: &'a GrammarFile) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut names = Vec::new();
        for rule in &grammar.lexer_rules {
            if !index.contains_key(rule.name.as_str()) {
                index.insert(&rule.name, names.len());
                names.push(rule.name.as_str());
            }
        }

        let mut edges = vec![Vec::new(); names.len()];
        for rule in &grammar.lexer_rules {
            let from = index[rule.name.as_str()];
            for alt in &rule.alternatives {
                for element in &alt.elements {
                    collect_refs(element, &mut |name, span| {
                        if let Some(&to) = index.get(name) {
                            edges[from].push((to, span));
                        }
                    });
                }
            }
        }

        Self { names, edges }
    }
}

fn collect_refs(element: &Element, visit: &mut impl FnMut(&str, Span)) {
    match &element.kind {
        ElementKind::RuleRef(name) => visit(name, element.span),
        ElementKind::Not(inner) | ElementKind::Repeat { element: inner, .. } => {
            collect_refs(inner, visit)
        }
        ElementKind::Block(alternatives) => {
            for nested in alternatives.iter().flatten() {
                collect_refs(nested, visit);
            }
        }
        _ => {}
    }
}

/// Report each distinct cycle once, at the reference that closes it
pub fn analyze_rule_cycles(grammar: &GrammarFile) -> Vec<SemanticError> {
    let graph = ReferenceGraph::build(grammar);
    let mut marks = vec![Mark::Unvisited; graph.names.len()];
    let mut stack: Vec<usize> = Vec::new();
    let mut errors = Vec::new();

    for root in 0..graph.names.len() {
        if marks[root] == Mark::Unvisited {
            visit(root, &graph, &mut marks, &mut stack, &mut errors);
        }
    }

    log_debug!("Rule cycle analysis finished",
        "rules" => graph.names.len(),
        "cycles" => errors.len());
    errors
}

fn visit(
    node: usize,
    graph: &ReferenceGraph<'_>,
    marks: &mut Vec<Mark>,
    stack: &mut Vec<usize>,
    errors: &mut Vec<SemanticError>,
) {
    marks[node] = Mark::InProgress;
    stack.push(node);

    for &(next, span) in &graph.edges[node] {
        match marks[next] {
            Mark::Unvisited => visit(next, graph, marks, stack, errors),
            Mark::InProgress => {
                let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle_path: Vec<String> = stack[start..]
                    .iter()
                    .map(|&n| graph.names[n].to_string())
                    .collect();
                cycle_path.push(graph.names[next].to_string());
                if cycle_path.len() > MAX_CYCLE_PATH_LENGTH {
                    cycle_path.truncate(MAX_CYCLE_PATH_LENGTH);
                    cycle_path.push("...".to_string());
                }
                errors.push(SemanticError::RecursiveRule { cycle_path, span });
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
}
