//! Lexical analyzer for grammar text
//!
//! Produces the full token sequence (trivia included) of a `.g4` file.
//! Literal and character-set escapes are decoded here so later stages only
//! see code points.

use crate::config::compile_time::grammar::{MAX_IDENTIFIER_LENGTH, MAX_LITERAL_LENGTH};
use crate::grammar::ast::CharSetItem;
use crate::grammar::keywords::Keyword;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error, log_success};

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("token recognition error at: '{character}'")]
    InvalidCharacter { character: char, position: Position },

    #[error("unterminated string literal")]
    UnterminatedLiteral { position: Position },

    #[error("unterminated character set")]
    UnterminatedCharSet { position: Position },

    #[error("unterminated block comment")]
    UnterminatedComment { position: Position },

    #[error("unterminated action")]
    UnterminatedAction { position: Position },

    #[error("invalid escape sequence {sequence}")]
    InvalidEscape { sequence: String, position: Position },

    #[error("identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, position: Position },

    #[error("string literal too long: {length} characters (max {MAX_LITERAL_LENGTH})")]
    LiteralTooLong { length: usize, position: Position },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedLiteral { .. } => codes::lexical::UNTERMINATED_LITERAL,
            LexerError::UnterminatedCharSet { .. } => codes::lexical::UNTERMINATED_CHAR_SET,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::UnterminatedAction { .. } => codes::lexical::UNTERMINATED_ACTION,
            LexerError::InvalidEscape { .. } => codes::lexical::INVALID_ESCAPE,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::LiteralTooLong { .. } => codes::lexical::LITERAL_TOO_LONG,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            LexerError::InvalidCharacter { position, .. }
            | LexerError::UnterminatedLiteral { position }
            | LexerError::UnterminatedCharSet { position }
            | LexerError::UnterminatedComment { position }
            | LexerError::UnterminatedAction { position }
            | LexerError::InvalidEscape { position, .. }
            | LexerError::IdentifierTooLong { position, .. }
            | LexerError::LiteralTooLong { position, .. } => *position,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub literal_tokens: usize,
    pub action_tokens: usize,
    pub comment_count: usize,
    pub max_literal_length: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token {
            Token::StringLiteral(value) => {
                self.literal_tokens += 1;
                self.max_literal_length = self.max_literal_length.max(value.chars().count());
            }
            Token::Action(_) | Token::Predicate(_) => self.action_tokens += 1,
            Token::Comment(_) => self.comment_count += 1,
            _ => {}
        }
    }
}

/// Character cursor tracking grammar positions
struct Cursor<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn slice_from(&self, start: Position) -> &'a str {
        &self.source[start.offset..self.pos.offset]
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    /// Last significant token, used to tell declaration blocks from actions
    last_significant: Option<Token>,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            last_significant: None,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();
        self.last_significant = None;

        log_debug!("Starting grammar lexical analysis", "bytes" => source.len());

        let mut cursor = Cursor::new(source);
        cursor.eat('\u{feff}');

        let mut tokens: Vec<SpannedToken> = Vec::new();

        while let Some(ch) = cursor.peek() {
            let start = cursor.pos;
            let token = match self.next_token(&mut cursor, ch) {
                Ok(token) => token,
                Err(error) => {
                    log_error!(error.error_code(), &error.to_string(),
                        span = Span::at(error.position()),
                        "line" => error.position().line,
                        "column" => error.position().column
                    );
                    return Err(error);
                }
            };

            self.metrics.record_token(&token);
            if token.is_significant() {
                self.last_significant = Some(token.clone());
            }
            tokens.push(Spanned::new(token, Span::new(start, cursor.pos)));
        }

        tokens.push(Spanned::new(Token::Eof, Span::at(cursor.pos)));

        log_success!(codes::success::GRAMMAR_LEXED, "Grammar text tokenized",
            "tokens" => self.metrics.total_tokens,
            "literals" => self.metrics.literal_tokens,
            "actions" => self.metrics.action_tokens
        );

        Ok(TokenStream::new(tokens))
    }

    fn next_token(&self, cursor: &mut Cursor<'_>, ch: char) -> Result<Token, LexerError> {
        let start = cursor.pos;

        if ch.is_whitespace() {
            while cursor.peek().is_some_and(char::is_whitespace) {
                cursor.bump();
            }
            return Ok(Token::Whitespace);
        }

        if ch == '/' {
            match cursor.peek_nth(1) {
                Some('/') => return Ok(lex_line_comment(cursor)),
                Some('*') => return lex_block_comment(cursor),
                _ => {}
            }
        }

        if is_identifier_start(ch) {
            return lex_identifier(cursor);
        }

        if ch.is_ascii_digit() {
            let digits_start = cursor.pos;
            while cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                cursor.bump();
            }
            let text = cursor.slice_from(digits_start);
            return text.parse::<i64>().map(Token::Integer).map_err(|_| {
                LexerError::InvalidCharacter {
                    character: ch,
                    position: start,
                }
            });
        }

        match ch {
            '\'' => lex_string_literal(cursor),
            '[' => lex_char_set(cursor),
            '{' => {
                let opens_block = matches!(
                    &self.last_significant,
                    Some(Token::Keyword(keyword)) if keyword.opens_block()
                );
                if opens_block {
                    cursor.bump();
                    Ok(Token::LBrace)
                } else {
                    lex_action(cursor)
                }
            }
            _ => lex_punctuation(cursor, ch),
        }
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_identifier_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn lex_line_comment(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    while cursor.peek().is_some_and(|c| c != '\n') {
        cursor.bump();
    }
    Token::Comment(cursor.slice_from(start).to_string())
}

fn lex_block_comment(cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
    let start = cursor.pos;
    cursor.bump();
    cursor.bump();
    loop {
        match cursor.bump() {
            Some('*') if cursor.peek() == Some('/') => {
                cursor.bump();
                return Ok(Token::Comment(cursor.slice_from(start).to_string()));
            }
            Some(_) => {}
            None => return Err(LexerError::UnterminatedComment { position: start }),
        }
    }
}

fn lex_identifier(cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
    let start = cursor.pos;
    while cursor.peek().is_some_and(is_identifier_continue) {
        cursor.bump();
    }
    let word = cursor.slice_from(start);

    let length = word.chars().count();
    if length > MAX_IDENTIFIER_LENGTH {
        return Err(LexerError::IdentifierTooLong {
            length,
            position: start,
        });
    }

    Ok(match Keyword::from_str(word) {
        Some(keyword) => Token::Keyword(keyword),
        None => Token::Identifier(word.to_string()),
    })
}

fn lex_string_literal(cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
    let start = cursor.pos;
    cursor.bump();

    let mut value = String::new();
    let mut length = 0usize;
    loop {
        match cursor.peek() {
            None | Some('\n') | Some('\r') => {
                return Err(LexerError::UnterminatedLiteral { position: start })
            }
            Some('\'') => {
                cursor.bump();
                break;
            }
            Some('\\') => {
                value.push(lex_escape(cursor, EscapeContext::Literal)?);
            }
            Some(c) => {
                cursor.bump();
                value.push(c);
            }
        }
        length += 1;
        if length > MAX_LITERAL_LENGTH {
            return Err(LexerError::LiteralTooLong {
                length,
                position: start,
            });
        }
    }

    Ok(Token::StringLiteral(value))
}

fn lex_char_set(cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
    let start = cursor.pos;
    cursor.bump();

    let mut items = Vec::new();
    loop {
        let low = match cursor.peek() {
            None => return Err(LexerError::UnterminatedCharSet { position: start }),
            Some(']') => {
                cursor.bump();
                break;
            }
            Some('\\') => lex_escape(cursor, EscapeContext::CharSet)?,
            Some(c) => {
                cursor.bump();
                c
            }
        };

        let is_range = cursor.peek() == Some('-')
            && !matches!(cursor.peek_nth(1), Some(']') | None);
        if is_range {
            cursor.bump();
            let high = match cursor.peek() {
                Some('\\') => lex_escape(cursor, EscapeContext::CharSet)?,
                Some(c) => {
                    cursor.bump();
                    c
                }
                None => return Err(LexerError::UnterminatedCharSet { position: start }),
            };
            items.push(CharSetItem::Range(low, high));
        } else {
            items.push(CharSetItem::Char(low));
        }
    }

    Ok(Token::CharSet(items))
}

#[derive(Clone, Copy, PartialEq)]
enum EscapeContext {
    Literal,
    CharSet,
}

/// Decode one escape sequence; the cursor sits on the backslash
fn lex_escape(cursor: &mut Cursor<'_>, context: EscapeContext) -> Result<char, LexerError> {
    let start = cursor.pos;
    cursor.bump();

    let invalid = |cursor: &Cursor<'_>| LexerError::InvalidEscape {
        sequence: cursor.slice_from(start).to_string(),
        position: start,
    };

    let Some(ch) = cursor.bump() else {
        return Err(invalid(cursor));
    };

    match ch {
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        'b' => Ok('\u{8}'),
        'f' => Ok('\u{c}'),
        '\\' => Ok('\\'),
        '\'' => Ok('\''),
        '"' => Ok('"'),
        ']' | '-' | '[' if context == EscapeContext::CharSet => Ok(ch),
        'u' => {
            let digits: String = if cursor.eat('{') {
                let mut digits = String::new();
                while let Some(c) = cursor.peek() {
                    if c == '}' {
                        break;
                    }
                    cursor.bump();
                    digits.push(c);
                }
                if !cursor.eat('}') || digits.is_empty() || digits.len() > 6 {
                    return Err(invalid(cursor));
                }
                digits
            } else {
                let mut digits = String::new();
                for _ in 0..4 {
                    match cursor.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            cursor.bump();
                            digits.push(c);
                        }
                        _ => return Err(invalid(cursor)),
                    }
                }
                digits
            };

            u32::from_str_radix(&digits, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| invalid(cursor))
        }
        _ => Err(invalid(cursor)),
    }
}

/// `{...}` with nested braces and quoted strings; `{...}?` is a predicate
fn lex_action(cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
    let start = cursor.pos;
    cursor.bump();

    let body_start = cursor.pos;
    let mut depth = 1usize;
    let mut body_end = body_start;

    while depth > 0 {
        match cursor.bump() {
            None => return Err(LexerError::UnterminatedAction { position: start }),
            Some('{') => depth += 1,
            Some('}') => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Some(quote @ ('"' | '\'')) => loop {
                match cursor.bump() {
                    None => return Err(LexerError::UnterminatedAction { position: start }),
                    Some('\\') => {
                        cursor.bump();
                    }
                    Some(c) if c == quote => break,
                    Some(_) => {}
                }
            },
            Some(_) => {}
        }
        body_end = cursor.pos;
    }

    let body = cursor.source[body_start.offset..body_end.offset].to_string();
    if cursor.eat('?') {
        Ok(Token::Predicate(body))
    } else {
        Ok(Token::Action(body))
    }
}

fn lex_punctuation(cursor: &mut Cursor<'_>, ch: char) -> Result<Token, LexerError> {
    let start = cursor.pos;
    cursor.bump();

    let token = match ch {
        ':' => {
            if cursor.eat(':') {
                Token::ColonColon
            } else {
                Token::Colon
            }
        }
        ';' => Token::Semi,
        '|' => Token::Pipe,
        '-' if cursor.eat('>') => Token::Arrow,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '}' => Token::RBrace,
        ',' => Token::Comma,
        '.' => {
            if cursor.eat('.') {
                Token::Range
            } else {
                Token::Dot
            }
        }
        '~' => Token::Tilde,
        '?' => Token::Question,
        '*' => Token::Star,
        '+' => {
            if cursor.eat('=') {
                Token::PlusAssign
            } else {
                Token::Plus
            }
        }
        '=' => Token::Assign,
        '@' => Token::At,
        '#' => Token::Pound,
        '<' => Token::Lt,
        '>' => Token::Gt,
        _ => {
            return Err(LexerError::InvalidCharacter {
                character: ch,
                position: start,
            })
        }
    };

    Ok(token)
}
