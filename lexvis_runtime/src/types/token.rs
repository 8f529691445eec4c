// ============================================================================
// TOKEN STREAM TYPES
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// One emitted token
///
/// Offsets are code point indices into the input; `stop` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub type_name: String,
    pub type_id: i32,
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
    pub channel: i32,
    pub token_index: usize,
    pub start: usize,
    pub stop: usize,
}

impl Token {
    /// Number of code points covered by the token
    pub fn len(&self) -> usize {
        self.stop + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_default_channel(&self) -> bool {
        self.channel == lexvis_compiler::artifact::schema::DEFAULT_TOKEN_CHANNEL
    }
}

impl fmt::Display for Token {
    /// ANTLR-style rendering: `[@0,0:2='abc',<ID>,1:0]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .text
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        write!(
            f,
            "[@{},{}:{}='{}',<{}>",
            self.token_index, self.start, self.stop, text, self.type_name
        )?;
        if !self.is_default_channel() {
            write!(f, ",channel={}", self.channel)?;
        }
        write!(f, ",{}:{}]", self.line, self.column)
    }
}

/// Ordered token sequence in scan order, EOF excluded
pub type TokenStream = Vec<Token>;
