//! Span-accurate token stream over grammar text
//!
//! Trivia tokens are kept for span bookkeeping; navigation only visits
//! significant tokens.

use crate::tokens::token::Token;
use crate::utils::{Span, Spanned};

pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens including trivia
    all_tokens: Vec<SpannedToken>,
    /// Indices into all_tokens for significant tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.value.is_significant())
            .map(|(i, _)| i)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    pub fn current(&self) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position)
            .and_then(|&original_index| self.all_tokens.get(original_index))
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    /// Span of the current token, or of the last token at end of input
    pub fn current_span(&self) -> Span {
        self.current()
            .or_else(|| self.all_tokens.last())
            .map(|spanned| spanned.span)
            .unwrap_or_else(Span::dummy)
    }

    /// Span of the most recently consumed significant token
    pub fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|p| self.significant_indices.get(p))
            .and_then(|&i| self.all_tokens.get(i))
            .map(|spanned| spanned.span)
            .unwrap_or_else(|| self.current_span())
    }

    /// Peek ahead by n significant tokens (0 = current)
    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&original_index| self.all_tokens.get(original_index))
            .map(|spanned| &spanned.value)
    }

    pub fn advance(&mut self) -> Option<SpannedToken> {
        let current = self.current().cloned();
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        current
    }

    pub fn check(&self, expected: &Token) -> bool {
        self.current_token() == Some(expected)
    }

    pub fn advance_if(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token(), None | Some(Token::Eof))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices
            .iter()
            .filter_map(move |&i| self.all_tokens.get(i))
    }
}
