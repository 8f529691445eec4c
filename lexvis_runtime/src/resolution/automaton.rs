//! Executable form of a lexer artifact
//!
//! Validation checks every cross reference once so the engine can index
//! without bounds failures; resolution precomputes epsilon closures in
//! priority order.

use super::error::LoadError;
use lexvis_compiler::artifact::schema::{
    Accept, LexerAction, LexerArtifact, ModeAutomaton, RuleInfo, Transition, Vocabulary,
    FORMAT_VERSION, MAX_CHAR,
};

/// State reached through epsilon edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureEntry {
    pub state: usize,
    /// The path passed a non-greedy decision, this state included
    pub non_greedy: bool,
}

/// NFA state with its epsilon closure resolved
#[derive(Debug, Clone)]
pub struct ExecState {
    pub rule: Option<usize>,
    pub transitions: Vec<Transition>,
    pub accept: Option<Accept>,
    /// Consuming and accepting states reachable through epsilon edges,
    /// this one included, in priority order
    pub closure: Vec<ClosureEntry>,
}

#[derive(Debug, Clone)]
pub struct ExecutableMode {
    pub name: String,
    pub start: usize,
    pub states: Vec<ExecState>,
}

impl ExecutableMode {
    pub fn start_closure(&self) -> &[ClosureEntry] {
        &self.states[self.start].closure
    }
}

/// A validated artifact ready to drive lexer instances
#[derive(Debug, Clone)]
pub struct ExecutableLexer {
    pub lexer_name: String,
    pub grammar_name: String,
    pub vocabulary: Vocabulary,
    pub channel_names: Vec<String>,
    pub mode_names: Vec<String>,
    pub rules: Vec<RuleInfo>,
    pub modes: Vec<ExecutableMode>,
}

impl ExecutableLexer {
    pub fn mode_index(&self, name: &str) -> Option<usize> {
        self.mode_names.iter().position(|m| m == name)
    }

    pub fn state_count(&self) -> usize {
        self.modes.iter().map(|m| m.states.len()).sum()
    }
}

/// Check format, naming and every index the engine will follow
pub fn validate(artifact: &LexerArtifact, expected_lexer: &str) -> Result<(), LoadError> {
    if artifact.format_version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedFormat {
            found: artifact.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if artifact.lexer_name != expected_lexer {
        return Err(LoadError::LexerNameMismatch {
            expected: expected_lexer.to_string(),
            found: artifact.lexer_name.clone(),
        });
    }
    if !artifact.vocabulary.is_consistent() {
        return Err(LoadError::invalid("vocabulary tables are inconsistent"));
    }
    if artifact.channel_names.len() < 2 {
        return Err(LoadError::invalid("channel table lacks the predefined channels"));
    }
    if artifact.mode_names.is_empty() || artifact.mode_names.len() != artifact.modes.len() {
        return Err(LoadError::invalid(format!(
            "{} mode names for {} mode automata",
            artifact.mode_names.len(),
            artifact.modes.len()
        )));
    }

    let mode_count = artifact.modes.len();
    let max_type = artifact.vocabulary.max_token_type;
    for (index, rule) in artifact.rules.iter().enumerate() {
        if rule.mode >= mode_count {
            return Err(LoadError::invalid(format!(
                "rule {} ({}) references mode {}",
                index, rule.name, rule.mode
            )));
        }
        if rule.token_type < 1 || rule.token_type > max_type {
            return Err(LoadError::invalid(format!(
                "rule {} has token type {} outside 1..={}",
                rule.name, rule.token_type, max_type
            )));
        }
        if rule.alternatives.is_empty() {
            return Err(LoadError::invalid(format!("rule {} has no alternatives", rule.name)));
        }
        for action in rule.alternatives.iter().flat_map(|alt| &alt.actions) {
            validate_action(rule, action, mode_count)?;
        }
    }

    for mode in &artifact.modes {
        validate_mode(mode, &artifact.rules)?;
    }
    Ok(())
}

fn validate_action(
    rule: &RuleInfo,
    action: &LexerAction,
    mode_count: usize,
) -> Result<(), LoadError> {
    let valid = match *action {
        // Numeric types past the vocabulary are legal and render as their code
        LexerAction::Type(t) => t >= 1,
        LexerAction::Channel(c) => c >= 0,
        LexerAction::Mode(m) | LexerAction::PushMode(m) => m < mode_count,
        LexerAction::Skip | LexerAction::More | LexerAction::PopMode => true,
    };
    if valid {
        Ok(())
    } else {
        Err(LoadError::invalid(format!(
            "rule {} has out of range command {}",
            rule.name, action
        )))
    }
}

fn validate_mode(mode: &ModeAutomaton, rules: &[RuleInfo]) -> Result<(), LoadError> {
    let count = mode.states.len();
    if mode.start >= count {
        return Err(LoadError::invalid(format!(
            "mode {} starts at missing state {}",
            mode.name, mode.start
        )));
    }

    for (index, state) in mode.states.iter().enumerate() {
        let bad_state = |what: &str| {
            LoadError::invalid(format!("mode {} state {}: {}", mode.name, index, what))
        };
        if state.rule.is_some_and(|r| r >= rules.len()) {
            return Err(bad_state("owner rule out of range"));
        }
        if state.epsilon.iter().any(|&t| t >= count) {
            return Err(bad_state("epsilon target out of range"));
        }
        for transition in &state.transitions {
            if transition.target >= count {
                return Err(bad_state("transition target out of range"));
            }
            if transition.ranges.is_empty() || !ranges_well_formed(&transition.ranges) {
                return Err(bad_state("transition ranges are not sorted and disjoint"));
            }
        }
        if let Some(accept) = state.accept {
            let alternatives = rules.get(accept.rule).map(|r| r.alternatives.len());
            if !alternatives.is_some_and(|n| accept.alternative < n) {
                return Err(bad_state("accept references a missing rule alternative"));
            }
        }
    }
    Ok(())
}

fn ranges_well_formed(ranges: &[(u32, u32)]) -> bool {
    ranges.iter().all(|&(lo, hi)| lo <= hi && hi <= MAX_CHAR)
        && ranges.windows(2).all(|pair| pair[0].1 < pair[1].0)
}

/// Build the executable lexer; `artifact` must have passed [`validate`]
pub fn resolve(artifact: LexerArtifact) -> ExecutableLexer {
    let modes = artifact.modes.into_iter().map(resolve_mode).collect();
    ExecutableLexer {
        lexer_name: artifact.lexer_name,
        grammar_name: artifact.grammar_name,
        vocabulary: artifact.vocabulary,
        channel_names: artifact.channel_names,
        mode_names: artifact.mode_names,
        rules: artifact.rules,
        modes,
    }
}

fn resolve_mode(mode: ModeAutomaton) -> ExecutableMode {
    let mut seen = vec![false; mode.states.len() * 2];
    let closures: Vec<Vec<ClosureEntry>> = (0..mode.states.len())
        .map(|s| epsilon_closure(&mode, s, &mut seen))
        .collect();

    let states = mode
        .states
        .into_iter()
        .zip(closures)
        .map(|(state, closure)| ExecState {
            rule: state.rule,
            transitions: state.transitions,
            accept: state.accept,
            closure,
        })
        .collect();

    ExecutableMode {
        name: mode.name,
        start: mode.start,
        states,
    }
}

/// Depth-first preorder over epsilon edges in their listed order
///
/// A state reached both with and without passing a non-greedy decision
/// appears once per flag. `seen` is indexed by `state * 2 + flag`, must be
/// all false on entry and is left all false.
fn epsilon_closure(mode: &ModeAutomaton, from: usize, seen: &mut [bool]) -> Vec<ClosureEntry> {
    let slot = |entry: ClosureEntry| entry.state * 2 + usize::from(entry.non_greedy);
    let mut stack = vec![ClosureEntry {
        state: from,
        non_greedy: mode.states[from].non_greedy,
    }];
    let mut visited = Vec::new();
    let mut closure = Vec::new();

    while let Some(entry) = stack.pop() {
        if seen[slot(entry)] {
            continue;
        }
        seen[slot(entry)] = true;
        visited.push(entry);

        let state = &mode.states[entry.state];
        if !state.transitions.is_empty() || state.accept.is_some() {
            closure.push(entry);
        }
        for &next in state.epsilon.iter().rev() {
            stack.push(ClosureEntry {
                state: next,
                non_greedy: entry.non_greedy || mode.states[next].non_greedy,
            });
        }
    }

    for entry in visited {
        seen[slot(entry)] = false;
    }
    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lexvis_compiler::compile_source;
    use lexvis_compiler::config::runtime::CompilerPreferences;

    fn artifact(grammar: &str) -> LexerArtifact {
        compile_source(grammar, None, &CompilerPreferences::default())
            .unwrap()
            .artifact
    }

    #[test]
    fn test_compiled_artifact_validates_and_resolves() {
        let artifact = artifact("lexer grammar T;\nID : [a-z]+ ;\nWS : ' '+ -> skip ;\n");
        validate(&artifact, "TLexer").unwrap();

        let lexer = resolve(artifact);
        assert_eq!(lexer.lexer_name, "TLexer");
        assert_eq!(lexer.mode_index("DEFAULT_MODE"), Some(0));
        let mode = &lexer.modes[0];
        // Start reaches the first state of each rule, in rule order
        let owners: Vec<_> = mode
            .start_closure()
            .iter()
            .map(|e| mode.states[e.state].rule)
            .collect();
        assert_eq!(owners, vec![Some(0), Some(1)]);
        for state in &mode.states {
            assert!(state.closure.iter().all(|e| !e.non_greedy));
        }
    }

    #[test]
    fn test_non_greedy_closure_lists_exit_first() {
        let artifact = artifact("lexer grammar T;\nC : 'a' 'b'*? 'c' ;\n");
        let lexer = resolve(artifact);
        let mode = &lexer.modes[0];

        // After 'a' the closure offers 'c' (leave the loop) before 'b'
        let after_a = mode
            .states
            .iter()
            .find(|s| s.transitions.iter().any(|t| t.matches('a' as u32)))
            .map(|s| s.transitions[0].target)
            .unwrap();
        let entries = &mode.states[after_a].closure;
        let firsts: Vec<u32> = entries
            .iter()
            .map(|e| mode.states[e.state].transitions[0].ranges[0].0)
            .collect();
        assert_eq!(firsts, vec!['c' as u32, 'b' as u32]);
        assert!(entries.iter().all(|e| e.non_greedy));
    }

    #[test]
    fn test_rejects_wrong_lexer_name_and_version() {
        let mut artifact = artifact("lexer grammar T;\nID : [a-z]+ ;\n");
        assert_matches!(
            validate(&artifact, "OtherLexer"),
            Err(LoadError::LexerNameMismatch { .. })
        );

        artifact.format_version = FORMAT_VERSION + 1;
        assert_matches!(
            validate(&artifact, "TLexer"),
            Err(LoadError::UnsupportedFormat { .. })
        );
    }

    #[test]
    fn test_rejects_dangling_references() {
        let mut broken = artifact("lexer grammar T;\nID : [a-z]+ ;\n");
        broken.modes[0].states[0].epsilon.push(10_000);
        assert_matches!(validate(&broken, "TLexer"), Err(LoadError::InvalidArtifact { .. }));

        let mut broken = artifact("lexer grammar T;\nID : [a-z]+ -> pushMode(M) ;\nmode M;\nX : 'x' ;\n");
        broken.rules[0].alternatives[0].actions = vec![LexerAction::PushMode(7)];
        assert_matches!(validate(&broken, "TLexer"), Err(LoadError::InvalidArtifact { .. }));

        let mut broken = artifact("lexer grammar T;\nID : [a-z]+ ;\n");
        broken.vocabulary.symbolic_names.pop();
        assert_matches!(validate(&broken, "TLexer"), Err(LoadError::InvalidArtifact { .. }));
    }

    #[test]
    fn test_range_shape_checks() {
        assert!(ranges_well_formed(&[(1, 3), (5, 9)]));
        assert!(!ranges_well_formed(&[(1, 5), (5, 9)]));
        assert!(!ranges_well_formed(&[(4, 2)]));
        assert!(!ranges_well_formed(&[(0, MAX_CHAR + 1)]));
    }
}
