//! Reserved words of the grammar language
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Lexer,
    Parser,
    Grammar,
    Fragment,
    Mode,
    Import,
    Options,
    Tokens,
    Channels,
    Returns,
    Locals,
    Throws,
    Catch,
    Finally,
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lexer" => Some(Self::Lexer),
            "parser" => Some(Self::Parser),
            "grammar" => Some(Self::Grammar),
            "fragment" => Some(Self::Fragment),
            "mode" => Some(Self::Mode),
            "import" => Some(Self::Import),
            "options" => Some(Self::Options),
            "tokens" => Some(Self::Tokens),
            "channels" => Some(Self::Channels),
            "returns" => Some(Self::Returns),
            "locals" => Some(Self::Locals),
            "throws" => Some(Self::Throws),
            "catch" => Some(Self::Catch),
            "finally" => Some(Self::Finally),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexer => "lexer",
            Self::Parser => "parser",
            Self::Grammar => "grammar",
            Self::Fragment => "fragment",
            Self::Mode => "mode",
            Self::Import => "import",
            Self::Options => "options",
            Self::Tokens => "tokens",
            Self::Channels => "channels",
            Self::Returns => "returns",
            Self::Locals => "locals",
            Self::Throws => "throws",
            Self::Catch => "catch",
            Self::Finally => "finally",
        }
    }

    /// Keywords whose following `{` opens a declaration block rather than an action
    pub fn opens_block(&self) -> bool {
        matches!(self, Self::Options | Self::Tokens | Self::Channels)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
