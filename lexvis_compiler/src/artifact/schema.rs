//! Serialized lexer artifact
//!
//! `<Name>Lexer.json` is the only thing the runtime needs to execute a lexer:
//! the vocabulary, channel and mode tables, the rule table with resolved
//! commands, and one Thompson NFA per mode.

use serde::{Deserialize, Serialize};

/// Version of the artifact layout. Bumped on any incompatible change.
pub const FORMAT_VERSION: u32 = 2;

/// Name of the grammar compilation tool
pub const TOOL_NAME: &str = "lexgen";

/// Version reported by `lexgen --version` and stamped into artifacts
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Token type of the end-of-file sentinel
pub const EOF_TYPE: i32 = -1;

/// Token type 0 is never assigned
pub const INVALID_TYPE: i32 = 0;

pub const DEFAULT_TOKEN_CHANNEL: i32 = 0;
pub const HIDDEN_CHANNEL: i32 = 1;
pub const DEFAULT_MODE: usize = 0;

/// Highest Unicode scalar value, the upper bound of wildcard and negated sets
pub const MAX_CHAR: u32 = 0x10FFFF;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexerArtifact {
    pub format_version: u32,
    pub tool_version: String,
    pub grammar_name: String,
    pub lexer_name: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub vocabulary: Vocabulary,
    pub channel_names: Vec<String>,
    pub mode_names: Vec<String>,
    pub rules: Vec<RuleInfo>,
    pub modes: Vec<ModeAutomaton>,
}

impl LexerArtifact {
    /// Conventional lexer name for a grammar identifier
    pub fn lexer_name_for(grammar_name: &str) -> String {
        format!("{}Lexer", grammar_name)
    }

    pub fn state_count(&self) -> usize {
        self.modes.iter().map(|m| m.states.len()).sum()
    }
}

/// Mapping from token type codes to display names
///
/// Index 0 is the invalid slot; both vectors have `max_token_type + 1` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub max_token_type: i32,
    pub literal_names: Vec<Option<String>>,
    pub symbolic_names: Vec<Option<String>>,
}

impl Vocabulary {
    pub fn new(literal_names: Vec<Option<String>>, symbolic_names: Vec<Option<String>>) -> Self {
        let len = literal_names.len().max(symbolic_names.len()).max(1);
        let mut literal_names = literal_names;
        let mut symbolic_names = symbolic_names;
        literal_names.resize(len, None);
        symbolic_names.resize(len, None);
        Self {
            max_token_type: (len - 1) as i32,
            literal_names,
            symbolic_names,
        }
    }

    fn slot(token_type: i32) -> Option<usize> {
        usize::try_from(token_type).ok()
    }

    pub fn symbolic_name(&self, token_type: i32) -> Option<&str> {
        if token_type == EOF_TYPE {
            return Some("EOF");
        }
        Self::slot(token_type)
            .and_then(|i| self.symbolic_names.get(i))
            .and_then(|n| n.as_deref())
    }

    pub fn literal_name(&self, token_type: i32) -> Option<&str> {
        Self::slot(token_type)
            .and_then(|i| self.literal_names.get(i))
            .and_then(|n| n.as_deref())
    }

    /// Symbolic name, or the numeric code when the type has none
    pub fn type_name(&self, token_type: i32) -> String {
        self.symbolic_name(token_type)
            .map(str::to_string)
            .unwrap_or_else(|| token_type.to_string())
    }

    pub fn token_type_of(&self, symbolic: &str) -> Option<i32> {
        self.symbolic_names
            .iter()
            .position(|n| n.as_deref() == Some(symbolic))
            .map(|i| i as i32)
    }

    pub fn is_consistent(&self) -> bool {
        self.max_token_type >= 0
            && self.literal_names.len() == self.max_token_type as usize + 1
            && self.symbolic_names.len() == self.max_token_type as usize + 1
    }
}

/// One entry of the rule table, indexed by the `rule` of accepting states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub name: String,
    pub token_type: i32,
    pub mode: usize,
    /// Rule stops at its first accepting position
    pub non_greedy: bool,
    pub alternatives: Vec<AlternativeInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlternativeInfo {
    pub actions: Vec<LexerAction>,
}

/// Resolved lexer command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "camelCase")]
pub enum LexerAction {
    Skip,
    More,
    Type(i32),
    Channel(i32),
    Mode(usize),
    PushMode(usize),
    PopMode,
}

impl std::fmt::Display for LexerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerAction::Skip => write!(f, "skip"),
            LexerAction::More => write!(f, "more"),
            LexerAction::Type(t) => write!(f, "type({})", t),
            LexerAction::Channel(c) => write!(f, "channel({})", c),
            LexerAction::Mode(m) => write!(f, "mode({})", m),
            LexerAction::PushMode(m) => write!(f, "pushMode({})", m),
            LexerAction::PopMode => write!(f, "popMode"),
        }
    }
}

/// Thompson NFA for a single lexer mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeAutomaton {
    pub name: String,
    pub start: usize,
    pub states: Vec<NfaState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfaState {
    /// Rule owning this state; `None` for the mode start state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub epsilon: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<Accept>,
    /// Decision of a non-greedy loop or optional; `epsilon` lists the exit first
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub non_greedy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Sorted, disjoint, inclusive code point ranges
    pub ranges: Vec<(u32, u32)>,
    pub target: usize,
}

impl Transition {
    pub fn matches(&self, c: u32) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < c {
                    std::cmp::Ordering::Less
                } else if lo > c {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accept {
    pub rule: usize,
    pub alternative: usize,
}
