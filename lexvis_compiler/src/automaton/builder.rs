//! Thompson construction of one NFA per lexer mode
//!
//! Fragment and token rule references are inlined, so every automaton is
//! self-contained. The mode start state has one epsilon edge per rule
//! alternative in priority order; each alternative ends in its own
//! accepting state.

use super::charset::CharSet;
use crate::{
    artifact::schema::{Accept, ModeAutomaton, NfaState, Transition},
    config::compile_time::automaton::MAX_NFA_STATES,
    grammar::ast::{CharSetItem, Element, ElementKind, Quantifier},
    logging::codes,
    semantic_analysis::{AnalyzedGrammar, AnalyzedRule},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutomatonError {
    #[error("mode {mode} needs more than {limit} automaton states")]
    StateLimitExceeded { mode: String, limit: usize },

    #[error("{element} in rule {rule} is not a valid set element")]
    InvalidSetElement { rule: String, element: String },

    #[error("set complement in rule {rule} is empty")]
    EmptySet { rule: String },

    #[error("reference to undefined rule: {name}")]
    UndefinedRule { name: String },

    #[error("recursive lexer rule reference: {name}")]
    RecursiveRule { name: String },
}

impl AutomatonError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::StateLimitExceeded { .. } => codes::automaton::STATE_LIMIT_EXCEEDED,
            Self::InvalidSetElement { .. } | Self::EmptySet { .. } => {
                codes::semantic::INVALID_SET_ELEMENT
            }
            Self::UndefinedRule { .. } => codes::semantic::UNDEFINED_RULE,
            Self::RecursiveRule { .. } => codes::semantic::RECURSIVE_RULE,
        }
    }
}

/// Start and end state of a partial automaton
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: usize,
    end: usize,
}

/// Automata for every mode plus per-token-rule flags
#[derive(Debug, Clone)]
pub struct AutomatonOutput {
    pub modes: Vec<ModeAutomaton>,
    /// Indices into `AnalyzedGrammar::rules` of the rules that produce tokens,
    /// in artifact rule-table order
    pub token_rules: Vec<usize>,
    /// Parallel to `token_rules`
    pub non_greedy: Vec<bool>,
}

impl AutomatonOutput {
    pub fn state_count(&self) -> usize {
        self.modes.iter().map(|m| m.states.len()).sum()
    }
}

pub fn build_automata(grammar: &AnalyzedGrammar) -> Result<AutomatonOutput, AutomatonError> {
    let token_rules: Vec<usize> = grammar
        .rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.is_token())
        .map(|(index, _)| index)
        .collect();
    let mut non_greedy = vec![false; token_rules.len()];

    let mut modes = Vec::with_capacity(grammar.mode_names.len());
    for (mode_index, mode_name) in grammar.mode_names.iter().enumerate() {
        let mut builder = ModeBuilder::new(grammar, mode_name);
        let start = builder.new_state()?;

        for (table_index, &rule_index) in token_rules.iter().enumerate() {
            let rule = &grammar.rules[rule_index];
            if rule.mode != mode_index {
                continue;
            }
            builder.owner = Some(table_index);
            builder.non_greedy = false;
            builder.rule_name = rule.name.clone();
            builder.inline_stack = vec![rule_index];

            for (alt_index, alt) in rule.alternatives.iter().enumerate() {
                let body = builder.sequence(&alt.elements, rule.case_insensitive)?;
                let accept = builder.new_state()?;
                builder.states[accept].accept = Some(Accept {
                    rule: table_index,
                    alternative: alt_index,
                });
                builder.epsilon(start, body.start);
                builder.epsilon(body.end, accept);
            }
            non_greedy[table_index] = builder.non_greedy;
        }

        modes.push(ModeAutomaton {
            name: mode_name.clone(),
            start,
            states: builder.states,
        });
    }

    Ok(AutomatonOutput {
        modes,
        token_rules,
        non_greedy,
    })
}

struct ModeBuilder<'g> {
    grammar: &'g AnalyzedGrammar,
    mode_name: &'g str,
    states: Vec<NfaState>,
    /// Artifact rule index that new states belong to
    owner: Option<usize>,
    rule_name: String,
    non_greedy: bool,
    inline_stack: Vec<usize>,
}

impl<'g> ModeBuilder<'g> {
    fn new(grammar: &'g AnalyzedGrammar, mode_name: &'g str) -> Self {
        Self {
            grammar,
            mode_name,
            states: Vec::new(),
            owner: None,
            rule_name: String::new(),
            non_greedy: false,
            inline_stack: Vec::new(),
        }
    }

    fn new_state(&mut self) -> Result<usize, AutomatonError> {
        if self.states.len() >= MAX_NFA_STATES {
            return Err(AutomatonError::StateLimitExceeded {
                mode: self.mode_name.to_string(),
                limit: MAX_NFA_STATES,
            });
        }
        self.states.push(NfaState {
            rule: self.owner,
            ..Default::default()
        });
        Ok(self.states.len() - 1)
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.push(to);
    }

    /// Decision between another repetition and leaving the block
    ///
    /// Edge order is priority order: greedy decisions try `enter` first,
    /// non-greedy ones `exit`.
    fn branch(&mut self, from: usize, enter: usize, exit: usize, greedy: bool) {
        let state = &mut self.states[from];
        if greedy {
            state.epsilon.extend([enter, exit]);
        } else {
            state.non_greedy = true;
            state.epsilon.extend([exit, enter]);
        }
    }

    fn transition(&mut self, set: CharSet) -> Result<Fragment, AutomatonError> {
        let start = self.new_state()?;
        let end = self.new_state()?;
        self.states[start].transitions.push(Transition {
            ranges: set.into_ranges(),
            target: end,
        });
        Ok(Fragment { start, end })
    }

    fn empty(&mut self) -> Result<Fragment, AutomatonError> {
        let state = self.new_state()?;
        Ok(Fragment {
            start: state,
            end: state,
        })
    }

    fn sequence(&mut self, elements: &[Element], ci: bool) -> Result<Fragment, AutomatonError> {
        let mut parts = elements.iter();
        let Some(first) = parts.next() else {
            return self.empty();
        };
        let head = self.element(first, ci)?;
        let mut end = head.end;
        for element in parts {
            let next = self.element(element, ci)?;
            self.epsilon(end, next.start);
            end = next.end;
        }
        Ok(Fragment {
            start: head.start,
            end,
        })
    }

    fn alternatives<'a>(
        &mut self,
        alternatives: impl Iterator<Item = &'a [Element]>,
        ci: bool,
    ) -> Result<Fragment, AutomatonError> {
        let start = self.new_state()?;
        let end = self.new_state()?;
        for alt in alternatives {
            let body = self.sequence(alt, ci)?;
            self.epsilon(start, body.start);
            self.epsilon(body.end, end);
        }
        Ok(Fragment { start, end })
    }

    fn element(&mut self, element: &Element, ci: bool) -> Result<Fragment, AutomatonError> {
        match &element.kind {
            ElementKind::Literal(value) => {
                let mut chars = value.chars();
                let Some(first) = chars.next() else {
                    return self.empty();
                };
                let head = self.transition(fold(CharSet::from_char(first), ci))?;
                let mut end = head.end;
                for c in chars {
                    let next = self.transition(fold(CharSet::from_char(c), ci))?;
                    self.epsilon(end, next.start);
                    end = next.end;
                }
                Ok(Fragment {
                    start: head.start,
                    end,
                })
            }
            ElementKind::Range(..) | ElementKind::CharSet(_) => {
                let set = self.element_set(element, ci)?;
                self.transition(set)
            }
            ElementKind::Wildcard => self.transition(CharSet::full()),
            ElementKind::Not(_) => {
                let set = self.element_set(element, ci)?;
                if set.is_empty() {
                    return Err(AutomatonError::EmptySet {
                        rule: self.rule_name.clone(),
                    });
                }
                self.transition(set)
            }
            ElementKind::RuleRef(name) => {
                let (index, rule) = self.lookup(name)?;
                self.inline_stack.push(index);
                let fragment = self.alternatives(
                    rule.alternatives.iter().map(|alt| alt.elements.as_slice()),
                    rule.case_insensitive,
                );
                self.inline_stack.pop();
                fragment
            }
            ElementKind::Block(alternatives) => {
                self.alternatives(alternatives.iter().map(Vec::as_slice), ci)
            }
            ElementKind::Repeat {
                element: inner,
                quantifier,
                greedy,
            } => {
                if !greedy {
                    self.non_greedy = true;
                }
                let start = self.new_state()?;
                let body = self.element(inner, ci)?;
                let end = self.new_state()?;
                match quantifier {
                    Quantifier::Optional => {
                        self.branch(start, body.start, end, *greedy);
                        self.epsilon(body.end, end);
                    }
                    Quantifier::ZeroOrMore => {
                        self.branch(start, body.start, end, *greedy);
                        self.branch(body.end, body.start, end, *greedy);
                    }
                    Quantifier::OneOrMore => {
                        self.epsilon(start, body.start);
                        self.branch(body.end, body.start, end, *greedy);
                    }
                }
                Ok(Fragment { start, end })
            }
            ElementKind::Action | ElementKind::Predicate => self.empty(),
        }
    }

    fn lookup(&self, name: &str) -> Result<(usize, &'g AnalyzedRule), AutomatonError> {
        let index = self
            .grammar
            .rule_index(name)
            .ok_or_else(|| AutomatonError::UndefinedRule {
                name: name.to_string(),
            })?;
        if self.inline_stack.contains(&index) {
            return Err(AutomatonError::RecursiveRule {
                name: name.to_string(),
            });
        }
        Ok((index, &self.grammar.rules[index]))
    }

    /// Single-character set denoted by a set-like element
    fn element_set(&mut self, element: &Element, ci: bool) -> Result<CharSet, AutomatonError> {
        let set = match &element.kind {
            ElementKind::Literal(value) => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => CharSet::from_char(c),
                    _ => return Err(self.invalid_set_element(element)),
                }
            }
            ElementKind::Range(lo, hi) => CharSet::from_range(*lo as u32, *hi as u32),
            ElementKind::CharSet(items) => {
                let mut set = CharSet::new();
                for item in items {
                    match *item {
                        CharSetItem::Char(c) => set.add_range(c as u32, c as u32),
                        CharSetItem::Range(lo, hi) => set.add_range(lo as u32, hi as u32),
                    }
                }
                set
            }
            ElementKind::Not(inner) => self.element_set(inner, ci)?.complement(),
            ElementKind::Block(alternatives) => {
                let mut set = CharSet::new();
                for alt in alternatives {
                    match alt.as_slice() {
                        [single] => set.union(&self.element_set(single, ci)?),
                        _ => return Err(self.invalid_set_element(element)),
                    }
                }
                set
            }
            ElementKind::RuleRef(name) => {
                let (index, rule) = self.lookup(name)?;
                self.inline_stack.push(index);
                let mut set = CharSet::new();
                let mut result = Ok(());
                for alt in &rule.alternatives {
                    match alt.elements.as_slice() {
                        [single] => match self.element_set(single, rule.case_insensitive) {
                            Ok(member) => set.union(&member),
                            Err(error) => {
                                result = Err(error);
                                break;
                            }
                        },
                        _ => {
                            result = Err(self.invalid_set_element(element));
                            break;
                        }
                    }
                }
                self.inline_stack.pop();
                result?;
                set
            }
            _ => return Err(self.invalid_set_element(element)),
        };

        // Negation folds its operand, never the complement
        Ok(match element.kind {
            ElementKind::Not(_) => set,
            _ => fold(set, ci),
        })
    }

    fn invalid_set_element(&self, element: &Element) -> AutomatonError {
        AutomatonError::InvalidSetElement {
            rule: self.rule_name.clone(),
            element: crate::semantic_analysis::reference_checker::describe_element(element),
        }
    }
}

fn fold(set: CharSet, ci: bool) -> CharSet {
    if ci {
        set.case_folded()
    } else {
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_analysis::SemanticAnalyzer;
    use crate::{lexical::tokenize, syntax::parse_grammar};
    use assert_matches::assert_matches;
    use std::collections::BTreeSet;

    fn analyzed(source: &str) -> AnalyzedGrammar {
        let grammar = parse_grammar(tokenize(source).unwrap()).unwrap();
        let output = SemanticAnalyzer::default().analyze(&grammar, "T", None);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        output.grammar.unwrap()
    }

    fn closure(mode: &ModeAutomaton, seeds: &[usize]) -> BTreeSet<usize> {
        let mut seen: BTreeSet<usize> = BTreeSet::new();
        let mut stack: Vec<usize> = seeds.to_vec();
        while let Some(state) = stack.pop() {
            if seen.insert(state) {
                stack.extend(mode.states[state].epsilon.iter().copied());
            }
        }
        seen
    }

    /// Accepting (rule, alt) pairs reached after consuming all of `input`
    fn accepts(mode: &ModeAutomaton, input: &str) -> Vec<(usize, usize)> {
        let mut current = closure(mode, &[mode.start]);
        for c in input.chars() {
            let next: Vec<usize> = current
                .iter()
                .flat_map(|&s| mode.states[s].transitions.iter())
                .filter(|t| t.matches(c as u32))
                .map(|t| t.target)
                .collect();
            current = closure(mode, &next);
        }
        let mut found: Vec<(usize, usize)> = current
            .iter()
            .filter_map(|&s| mode.states[s].accept)
            .map(|a| (a.rule, a.alternative))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_literals_sets_and_loops() {
        let grammar = analyzed(
            "lexer grammar T;\nIF : 'if' ;\nID : [a-z_] [a-z0-9_]* ;\nNUM : DIGIT+ ('.' DIGIT+)? ;\nfragment DIGIT : [0-9] ;\n",
        );
        let output = build_automata(&grammar).unwrap();
        assert_eq!(output.token_rules, vec![0, 1, 2]);
        let mode = &output.modes[0];
        assert_eq!(accepts(mode, "if"), vec![(0, 0), (1, 0)]);
        assert_eq!(accepts(mode, "iffy_2"), vec![(1, 0)]);
        assert_eq!(accepts(mode, "3.14"), vec![(2, 0)]);
        assert!(accepts(mode, "3.").is_empty());
        assert!(accepts(mode, "").is_empty());
    }

    #[test]
    fn test_negation_and_wildcard() {
        let grammar = analyzed("lexer grammar T;\nLINE : '#' ~[\\r\\n]* ;\nANY : . ;\n");
        let mode = &build_automata(&grammar).unwrap().modes[0];
        assert_eq!(accepts(mode, "# note ✓"), vec![(0, 0)]);
        assert!(accepts(mode, "#a\nb").is_empty());
        assert_eq!(accepts(mode, "λ"), vec![(1, 0)]);
    }

    #[test]
    fn test_case_insensitive_rules() {
        let grammar = analyzed(
            "lexer grammar T;\noptions { caseInsensitive = true; }\nSELECT : 'select' ;\nNOT_A : ~'a' ;\n",
        );
        let mode = &build_automata(&grammar).unwrap().modes[0];
        assert_eq!(accepts(mode, "SeLeCt"), vec![(0, 0)]);
        assert!(accepts(mode, "A").is_empty());
        assert_eq!(accepts(mode, "b"), vec![(1, 0)]);
    }

    #[test]
    fn test_modes_and_non_greedy() {
        let grammar = analyzed(
            "lexer grammar T;\nCOMMENT : '/*' .*? '*/' ;\nOPEN : '<' -> pushMode(TAG) ;\nmode TAG;\nNAME : [a-z]+ ;\nCLOSE : '>' -> popMode ;\n",
        );
        let output = build_automata(&grammar).unwrap();
        assert_eq!(output.modes.len(), 2);
        assert_eq!(output.non_greedy, vec![true, false, false, false]);
        assert_eq!(accepts(&output.modes[0], "/* x */"), vec![(0, 0)]);
        assert!(accepts(&output.modes[0], "abc").is_empty());
        assert_eq!(accepts(&output.modes[1], "abc"), vec![(2, 0)]);
        assert!(output.modes[1]
            .states
            .iter()
            .skip(1)
            .all(|s| matches!(s.rule, Some(2) | Some(3))));
    }

    #[test]
    fn test_decision_edges_follow_greediness() {
        let grammar = analyzed("lexer grammar T;\nLAZY : 'x' .*? 'y' ;\nEAGER : 'z' .* ;\n");
        let mode = &build_automata(&grammar).unwrap().modes[0];
        let decisions: Vec<&NfaState> = mode
            .states
            .iter()
            .filter(|s| s.rule.is_some() && s.epsilon.len() == 2)
            .collect();
        assert_eq!(decisions.len(), 4);

        for state in decisions {
            // The exit edge leads forward out of the loop, the other back into the body
            let lazy = state.rule == Some(0);
            assert_eq!(state.non_greedy, lazy);
            let body = mode.states[state.epsilon[usize::from(lazy)]].transitions.len();
            assert_eq!(body, 1, "body entry of {:?}", state);
        }
    }

    #[test]
    fn test_alternatives_keep_their_index() {
        let grammar = analyzed("lexer grammar T;\nX : 'a' | 'b' -> skip | 'c' ;\n");
        let mode = &build_automata(&grammar).unwrap().modes[0];
        assert_eq!(accepts(mode, "b"), vec![(0, 1)]);
        assert_eq!(accepts(mode, "c"), vec![(0, 2)]);
    }

    #[test]
    fn test_empty_complement_rejected() {
        let grammar = analyzed("lexer grammar T;\nNOTHING : ~[\\u0000-\\u{10FFFF}] ;\n");
        assert_matches!(build_automata(&grammar), Err(AutomatonError::EmptySet { rule }) if rule == "NOTHING");
    }
}
