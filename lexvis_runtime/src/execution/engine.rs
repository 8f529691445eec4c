//! # Tokenization Engine
//!
//! Runs a resolved lexer over one input text with ANTLR lexer semantics:
//! longest match per mode, ties to the earliest rule and alternative,
//! `skip`/`more`/`type`/`channel` and mode stack commands.
//!
//! Configurations are kept in priority order. Once a rule accepts during a
//! step, its lower-priority configurations that went through a non-greedy
//! decision are dropped, so `.*?` stops at the first terminator while an
//! escape alternative inside the loop keeps running.

use crate::resolution::{ClosureEntry, ExecutableLexer, ExecutableMode, LexerOptions};
use crate::types::Token;
use lexvis_compiler::artifact::schema::{Accept, LexerAction};
use lexvis_compiler::config::compile_time::runtime::{MAX_INPUT_SIZE, MAX_TOKEN_COUNT};
use lexvis_compiler::logging::codes;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("line {line}:{column} token recognition error at: '{text}'")]
    TokenRecognition {
        text: String,
        line: usize,
        column: usize,
    },

    #[error("line {line}:{column} popMode with an empty mode stack")]
    EmptyModeStack { line: usize, column: usize },

    #[error("token count exceeds the limit of {limit}")]
    TokenLimitExceeded { limit: usize },

    #[error("input is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },

    #[error("lexer mode {mode} does not exist")]
    InvalidMode { mode: usize },
}

impl ExecutionError {
    pub fn error_code(&self) -> codes::Code {
        codes::runtime::EXECUTION_FAILED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Match {
    end: usize,
    rule: usize,
    alternative: usize,
}

/// Ordered, deduplicated set of NFA configurations
///
/// Members keep the order they were added in, which is match priority.
#[derive(Debug, Default)]
struct StateSet {
    members: Vec<ClosureEntry>,
    marked: Vec<bool>,
}

impl StateSet {
    fn with_capacity(states: usize) -> Self {
        Self {
            members: Vec::new(),
            marked: vec![false; states * 2],
        }
    }

    fn slot(entry: ClosureEntry) -> usize {
        entry.state * 2 + usize::from(entry.non_greedy)
    }

    fn clear(&mut self) {
        for &entry in &self.members {
            self.marked[Self::slot(entry)] = false;
        }
        self.members.clear();
    }

    fn insert(&mut self, entry: ClosureEntry) {
        let slot = Self::slot(entry);
        if !self.marked[slot] {
            self.marked[slot] = true;
            self.members.push(entry);
        }
    }

    fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A lexer bound to one input text
pub struct LexerInstance {
    lexer: Arc<ExecutableLexer>,
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    mode: usize,
    mode_stack: Vec<usize>,
    default_channel: i32,
    emitted: usize,
    current: StateSet,
    next: StateSet,
}

impl LexerInstance {
    pub fn new(
        lexer: Arc<ExecutableLexer>,
        input: &str,
        options: LexerOptions,
    ) -> Result<Self, ExecutionError> {
        if input.len() > MAX_INPUT_SIZE {
            return Err(ExecutionError::InputTooLarge {
                size: input.len(),
                limit: MAX_INPUT_SIZE,
            });
        }
        if options.initial_mode >= lexer.modes.len() {
            return Err(ExecutionError::InvalidMode {
                mode: options.initial_mode,
            });
        }

        let widest = lexer.modes.iter().map(|m| m.states.len()).max().unwrap_or(0);
        Ok(Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            mode: options.initial_mode,
            mode_stack: Vec::new(),
            default_channel: options.default_channel,
            emitted: 0,
            current: StateSet::with_capacity(widest),
            next: StateSet::with_capacity(widest),
            lexer,
        })
    }

    pub fn mode(&self) -> usize {
        self.mode
    }

    pub fn mode_name(&self) -> &str {
        &self.lexer.mode_names[self.mode]
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn at_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Next emitted token, or `None` at end of input
    ///
    /// Text accumulated by `more` that is still pending at end of input is
    /// dropped, as no further rule can complete it.
    pub fn next_token(&mut self) -> Result<Option<Token>, ExecutionError> {
        let lexer = Arc::clone(&self.lexer);

        'token: loop {
            if self.at_eof() {
                return Ok(None);
            }
            let start = self.position;
            let (line, column) = (self.line, self.column);
            let mut channel = self.default_channel;

            let token_type = loop {
                if self.at_eof() {
                    return Ok(None);
                }
                let Some(found) = self.match_longest(&lexer) else {
                    return Err(self.recognition_error(start));
                };
                self.advance_to(found.end);

                let rule = &lexer.rules[found.rule];
                let mut token_type = rule.token_type;
                let mut skip = false;
                let mut more = false;
                for action in &rule.alternatives[found.alternative].actions {
                    match *action {
                        LexerAction::Skip => skip = true,
                        LexerAction::More => more = true,
                        LexerAction::Type(t) => token_type = t,
                        LexerAction::Channel(c) => channel = c,
                        LexerAction::Mode(m) => self.mode = m,
                        LexerAction::PushMode(m) => {
                            self.mode_stack.push(self.mode);
                            self.mode = m;
                        }
                        LexerAction::PopMode => {
                            self.mode = self.mode_stack.pop().ok_or(
                                ExecutionError::EmptyModeStack {
                                    line: self.line,
                                    column: self.column,
                                },
                            )?;
                        }
                    }
                }

                if skip {
                    continue 'token;
                }
                if !more {
                    break token_type;
                }
            };

            return self.emit(&lexer, start, line, column, token_type, channel).map(Some);
        }
    }

    /// Drain the remaining input into a token stream
    pub fn all_tokens(&mut self) -> Result<Vec<Token>, ExecutionError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Longest non-empty match from the current position in the current mode
    fn match_longest(&mut self, lexer: &ExecutableLexer) -> Option<Match> {
        let mode: &ExecutableMode = &lexer.modes[self.mode];
        self.current.clear();
        for &entry in mode.start_closure() {
            self.current.insert(entry);
        }

        let mut best = None;
        let mut accepted = vec![false; lexer.rules.len()];
        let mut position = self.position;
        while position < self.input.len() && !self.current.is_empty() {
            let c = self.input[position] as u32;
            self.next.clear();
            accepted.iter_mut().for_each(|a| *a = false);

            for &config in &self.current.members {
                let state = &mode.states[config.state];
                let rule = state.rule;
                let rule_done = rule.is_some_and(|r| accepted[r]);
                // Lower-priority non-greedy paths of a rule that already accepted
                if rule_done && config.non_greedy {
                    continue;
                }
                for transition in &state.transitions {
                    if !transition.matches(c) {
                        continue;
                    }
                    let reached = reach(
                        mode,
                        transition.target,
                        config.non_greedy,
                        rule_done,
                        &mut self.next,
                    );
                    if reached {
                        if let Some(r) = rule {
                            accepted[r] = true;
                        }
                        break;
                    }
                }
            }
            position += 1;

            if let Some(accept) = preferred_accept(mode, &self.next.members) {
                best = Some(Match {
                    end: position,
                    rule: accept.rule,
                    alternative: accept.alternative,
                });
            }

            std::mem::swap(&mut self.current, &mut self.next);
        }
        best
    }

    fn advance_to(&mut self, end: usize) {
        for &c in &self.input[self.position..end] {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.position = end;
    }

    fn recognition_error(&self, start: usize) -> ExecutionError {
        let end = (self.position + 1).min(self.input.len());
        let text: String = self.input[start..end].iter().collect();
        ExecutionError::TokenRecognition {
            text: escape_display(&text),
            line: self.line,
            column: self.column,
        }
    }

    fn emit(
        &mut self,
        lexer: &ExecutableLexer,
        start: usize,
        line: usize,
        column: usize,
        token_type: i32,
        channel: i32,
    ) -> Result<Token, ExecutionError> {
        if self.emitted >= MAX_TOKEN_COUNT {
            return Err(ExecutionError::TokenLimitExceeded {
                limit: MAX_TOKEN_COUNT,
            });
        }
        let token = Token {
            text: self.input[start..self.position].iter().collect(),
            type_name: lexer.vocabulary.type_name(token_type),
            type_id: token_type,
            line,
            column,
            channel,
            token_index: self.emitted,
            start,
            stop: self.position - 1,
        };
        self.emitted += 1;
        Ok(token)
    }
}

/// Add the closure of `target` to `next`; true once the owning rule accepts
///
/// After the rule accepts, the rest of the closure only keeps paths that
/// never passed a non-greedy decision.
fn reach(
    mode: &ExecutableMode,
    target: usize,
    non_greedy: bool,
    mut accepted: bool,
    next: &mut StateSet,
) -> bool {
    for entry in &mode.states[target].closure {
        let config = ClosureEntry {
            state: entry.state,
            non_greedy: non_greedy || entry.non_greedy,
        };
        if mode.states[config.state].accept.is_some() {
            next.insert(config);
            accepted = true;
        } else if !accepted || !config.non_greedy {
            next.insert(config);
        }
    }
    accepted
}

/// Lowest (rule, alternative) among accepting states
fn preferred_accept(mode: &ExecutableMode, states: &[ClosureEntry]) -> Option<Accept> {
    states
        .iter()
        .filter_map(|entry| mode.states[entry.state].accept)
        .min_by_key(|a| (a.rule, a.alternative))
}

fn escape_display(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

impl std::fmt::Debug for LexerInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexerInstance")
            .field("lexer", &self.lexer.lexer_name)
            .field("position", &self.position)
            .field("mode", &self.mode)
            .field("mode_stack", &self.mode_stack)
            .field("emitted", &self.emitted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::test_support::factory;
    use crate::execution::{tokenize, tokenize_with_options};
    use assert_matches::assert_matches;

    fn summary(tokens: &[Token]) -> Vec<(String, String)> {
        tokens
            .iter()
            .map(|t| (t.type_name.clone(), t.text.clone()))
            .collect()
    }

    const WORDS: &str = "lexer grammar Words;\nWORD : ~[ \\t\\r\\n]+ ;\nWS : [ \\t\\r\\n]+ -> skip ;\n";

    #[test]
    fn test_words_with_skipped_whitespace() {
        let tokens = tokenize(&factory(WORDS), "a bb ccc").unwrap();
        let spans: Vec<_> = tokens
            .iter()
            .map(|t| (t.text.as_str(), t.start, t.stop, t.token_index))
            .collect();
        assert_eq!(spans, vec![("a", 0, 0, 0), ("bb", 2, 3, 1), ("ccc", 5, 7, 2)]);
        assert!(tokens.iter().all(|t| t.type_name == "WORD" && t.channel == 0));
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(tokenize(&factory(WORDS), "").unwrap().is_empty());
    }

    #[test]
    fn test_longest_match_then_first_rule() {
        let lexer = factory("lexer grammar K;\nIF : 'if' ;\nID : [a-z]+ ;\nWS : ' ' -> skip ;\n");
        let tokens = tokenize(&lexer, "if iff i").unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                ("IF".to_string(), "if".to_string()),
                ("ID".to_string(), "iff".to_string()),
                ("ID".to_string(), "i".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let lexer = factory("lexer grammar L;\nID : [a-z]+ ;\nNL : '\\n' ;\n");
        let tokens = tokenize(&lexer, "ab\ncd\n\nx").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.text.as_str(), t.line, t.column)).collect();
        assert_eq!(
            positions,
            vec![
                ("ab", 1, 0),
                ("\n", 1, 2),
                ("cd", 2, 0),
                ("\n", 2, 2),
                ("\n", 3, 0),
                ("x", 4, 0),
            ]
        );
    }

    #[test]
    fn test_hidden_channel_tokens_are_indexed() {
        let lexer = factory("lexer grammar C;\nID : [a-z]+ ;\nWS : ' '+ -> channel(HIDDEN) ;\n");
        let tokens = tokenize(&lexer, "a  b").unwrap();
        let channels: Vec<_> = tokens.iter().map(|t| (t.token_index, t.channel)).collect();
        assert_eq!(channels, vec![(0, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_more_accumulates_across_modes() {
        let lexer = factory(
            "lexer grammar S;\n\
             OPEN : '\"' -> more, pushMode(STR) ;\n\
             WS : ' ' -> skip ;\n\
             mode STR;\n\
             STRING : '\"' -> popMode ;\n\
             TEXT : ~'\"' -> more ;\n",
        );
        let tokens = tokenize(&lexer, "\"ab\" \"\"").unwrap();
        let spans: Vec<_> = tokens
            .iter()
            .map(|t| (t.type_name.as_str(), t.text.as_str(), t.start, t.stop))
            .collect();
        assert_eq!(
            spans,
            vec![("STRING", "\"ab\"", 0, 3), ("STRING", "\"\"", 5, 6)]
        );
    }

    #[test]
    fn test_pending_more_text_is_dropped_at_eof() {
        let lexer = factory("lexer grammar P;\nA : 'a' ;\nQ : '?' -> more ;\n");
        let tokens = tokenize(&lexer, "a?").unwrap();
        assert_eq!(summary(&tokens), vec![("A".to_string(), "a".to_string())]);
    }

    #[test]
    fn test_pop_mode_on_empty_stack_fails() {
        let lexer = factory("lexer grammar M;\nA : 'a' ;\nCLOSE : ')' -> popMode ;\n");
        assert_matches!(
            tokenize(&lexer, "a)"),
            Err(ExecutionError::EmptyModeStack { line: 1, column: 2 })
        );
    }

    #[test]
    fn test_unmatched_character_is_recognition_error() {
        let lexer = factory("lexer grammar R;\nA : 'a' ;\nNL : '\\n' ;\n");
        let error = tokenize(&lexer, "aa\nab").unwrap_err();
        assert_eq!(
            error,
            ExecutionError::TokenRecognition {
                text: "b".to_string(),
                line: 2,
                column: 1,
            }
        );
        assert_eq!(error.to_string(), "line 2:1 token recognition error at: 'b'");
    }

    #[test]
    fn test_zero_length_matches_are_not_tokens() {
        let lexer = factory("lexer grammar Z;\nAS : 'a'* ;\n");
        assert_eq!(tokenize(&lexer, "aaa").unwrap().len(), 1);
        assert_matches!(
            tokenize(&lexer, "aab"),
            Err(ExecutionError::TokenRecognition { .. })
        );
    }

    #[test]
    fn test_non_greedy_rule_stops_at_first_close() {
        let lexer = factory("lexer grammar N;\nCOMMENT : '/*' .*? '*/' ;\nID : [a-z]+ ;\n");
        let tokens = tokenize(&lexer, "/*a*//*b*/x").unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                ("COMMENT".to_string(), "/*a*/".to_string()),
                ("COMMENT".to_string(), "/*b*/".to_string()),
                ("ID".to_string(), "x".to_string()),
            ]
        );

        let greedy = factory("lexer grammar G;\nCOMMENT : '/*' .* '*/' ;\n");
        assert_eq!(tokenize(&greedy, "/*a*//*b*/").unwrap().len(), 1);
    }

    #[test]
    fn test_non_greedy_loop_keeps_escape_alternative() {
        let lexer = factory("lexer grammar S;\nSTRING : '\"' ( '\\\\\"' | . )*? '\"' ;\nID : [a-z]+ ;\n");
        let tokens = tokenize(&lexer, "\"a\\\"b\"").unwrap();
        assert_eq!(
            summary(&tokens),
            vec![("STRING".to_string(), "\"a\\\"b\"".to_string())]
        );

        // The plain terminator still ends the token at the first quote
        let tokens = tokenize(&lexer, "\"a\"b\"\"").unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                ("STRING".to_string(), "\"a\"".to_string()),
                ("ID".to_string(), "b".to_string()),
                ("STRING".to_string(), "\"\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_greedy_optional_prefers_skipping() {
        let lexer = factory("lexer grammar O;\nAB : 'a' 'b'?? ;\nB : 'b' ;\n");
        let tokens = tokenize(&lexer, "ab").unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                ("AB".to_string(), "a".to_string()),
                ("B".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_type_command_and_declared_tokens() {
        let lexer = factory(
            "lexer grammar T;\ntokens { KEYWORD }\nIF : 'if' -> type(KEYWORD) ;\nID : [a-z]+ ;\n",
        );
        let tokens = tokenize(&lexer, "if").unwrap();
        assert_eq!(tokens[0].type_name, "KEYWORD");
        assert_eq!(tokens[0].type_id, 1);
    }

    #[test]
    fn test_implicit_literal_renders_numeric_code() {
        let lexer = factory("grammar E;\ne : INT '+' INT ;\nINT : [0-9]+ ;\n");
        let tokens = tokenize(&lexer, "1+2").unwrap();
        let types: Vec<_> = tokens.iter().map(|t| (t.type_name.as_str(), t.type_id)).collect();
        assert_eq!(types, vec![("INT", 2), ("1", 1), ("INT", 2)]);
    }

    #[test]
    fn test_case_insensitive_grammar() {
        let lexer = factory(
            "lexer grammar Q;\noptions { caseInsensitive = true; }\nSELECT : 'select' ;\nWS : ' ' -> skip ;\n",
        );
        let tokens = tokenize(&lexer, "SeLeCt select").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.type_name == "SELECT"));
    }

    #[test]
    fn test_offsets_count_code_points() {
        let lexer = factory("lexer grammar U;\nID : ([a-z] | '\u{e9}')+ ;\nWS : ' ' -> skip ;\n");
        let tokens = tokenize(&lexer, "\u{e9}t\u{e9} a").unwrap();
        assert_eq!((tokens[0].start, tokens[0].stop), (0, 2));
        assert_eq!((tokens[1].start, tokens[1].column), (4, 4));
    }

    #[test]
    fn test_options_select_mode_and_channel() {
        let lexer = factory("lexer grammar O;\nA : 'a' ;\nmode INNER;\nB : 'b' ;\n");
        let inner = lexer.lexer().mode_index("INNER").unwrap();
        let options = LexerOptions::default()
            .with_initial_mode(inner)
            .with_default_channel(3);
        let tokens = tokenize_with_options(&lexer, "bb", options).unwrap();
        assert!(tokens.iter().all(|t| t.type_name == "B" && t.channel == 3));
        assert_matches!(tokenize(&lexer, "b"), Err(ExecutionError::TokenRecognition { .. }));
    }

    #[test]
    fn test_stream_invariants() {
        let lexer = factory("lexer grammar I;\nID : [a-z]+ ;\nNUM : [0-9]+ ;\nWS : [ \\n]+ -> channel(HIDDEN) ;\n");
        let tokens = tokenize(&lexer, "abc 12\n x9 y").unwrap();
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.token_index, i);
            assert!(token.start <= token.stop);
            assert!(token.line >= 1);
            assert_ne!(token.type_name, "EOF");
            assert_eq!(token.text.chars().count(), token.len());
        }
    }

    #[test]
    fn test_instance_state_accessors() {
        let lexer = factory("lexer grammar S;\nOPEN : '<' -> pushMode(TAG) ;\nmode TAG;\nNAME : [a-z]+ ;\n");
        let mut instance = lexer.create("<ab", LexerOptions::default()).unwrap();
        assert_eq!(instance.mode_name(), "DEFAULT_MODE");
        instance.next_token().unwrap();
        assert_eq!(instance.mode_name(), "TAG");
        assert_eq!((instance.position(), instance.line(), instance.column()), (1, 1, 1));
        assert_eq!(instance.next_token().unwrap().unwrap().text, "ab");
        assert!(instance.next_token().unwrap().is_none());
    }
}
