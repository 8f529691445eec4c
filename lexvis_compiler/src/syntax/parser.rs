//! Recursive-descent parser for grammar files
//!
//! Lexer rules are parsed in full. Parser rules are skipped token by token,
//! keeping only the string literals they reference.

use crate::config::compile_time::grammar::MAX_PARSE_DEPTH;
use crate::grammar::ast::{
    CommandArgument, Element, ElementKind, GrammarFile, GrammarKind, GrammarOption,
    LexerAlternative, LexerCommand, LexerRule, ParserRule, Quantifier, DEFAULT_MODE_NAME,
};
use crate::grammar::keywords::Keyword;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenStream};
use crate::utils::{Span, Spanned};
use crate::log_debug;

pub struct GrammarParser {
    tokens: TokenStream,
    context_stack: Vec<&'static str>,
    parse_depth: usize,
}

impl GrammarParser {
    pub fn new(tokens: TokenStream) -> Self {
        log_debug!("Creating grammar parser", "tokens" => tokens.len());

        Self {
            tokens,
            context_stack: Vec::new(),
            parse_depth: 0,
        }
    }

    pub fn parse(mut self) -> SyntaxResult<GrammarFile> {
        self.context_stack.push("grammar");

        let mut grammar = GrammarFile {
            kind: GrammarKind::Combined,
            name: None,
            options: Vec::new(),
            tokens: Vec::new(),
            channels: Vec::new(),
            named_actions: Vec::new(),
            modes: Vec::new(),
            lexer_rules: Vec::new(),
            parser_rules: Vec::new(),
        };

        self.parse_header(&mut grammar)?;

        let mut current_mode = DEFAULT_MODE_NAME.to_string();

        while !self.tokens.is_at_end() {
            match self.current() {
                Token::Keyword(Keyword::Options) => {
                    let options = self.parse_options_block()?;
                    grammar.options.extend(options);
                }
                Token::Keyword(Keyword::Tokens) => {
                    let names = self.parse_name_block()?;
                    grammar.tokens.extend(names);
                }
                Token::Keyword(Keyword::Channels) => {
                    let names = self.parse_name_block()?;
                    grammar.channels.extend(names);
                }
                Token::Keyword(Keyword::Import) => {
                    let span = self.tokens.current_span();
                    self.tokens.advance();
                    let name = self.expect_identifier("grammar name")?;
                    return Err(SyntaxError::ImportUnsupported {
                        name: name.value,
                        span,
                    });
                }
                Token::At => {
                    let action = self.parse_named_action()?;
                    grammar.named_actions.push(action);
                }
                Token::Keyword(Keyword::Mode) => {
                    self.tokens.advance();
                    let name = self.expect_identifier("mode name")?;
                    self.expect(&Token::Semi, "';'")?;
                    current_mode = name.value.clone();
                    grammar.modes.push(name);
                }
                Token::Keyword(Keyword::Fragment) => {
                    let rule = self.parse_lexer_rule(&current_mode)?;
                    grammar.lexer_rules.push(rule);
                }
                Token::Identifier(name) if is_token_name(&name) => {
                    let rule = self.parse_lexer_rule(&current_mode)?;
                    grammar.lexer_rules.push(rule);
                }
                Token::Identifier(name) => {
                    let span = self.tokens.current_span();
                    if grammar.kind == GrammarKind::Lexer {
                        return Err(SyntaxError::invalid_construct(
                            &format!("parser rule {} not allowed in lexer grammar", name),
                            span,
                        ));
                    }
                    if current_mode != DEFAULT_MODE_NAME {
                        return Err(SyntaxError::invalid_construct(
                            &format!("parser rule {} not allowed in mode {}", name, current_mode),
                            span,
                        ));
                    }
                    let rule = self.parse_parser_rule()?;
                    grammar.parser_rules.push(rule);
                }
                _ => return Err(self.error_here("rule or declaration")),
            }
        }

        self.context_stack.pop();
        Ok(grammar)
    }

    // ========================================================================
    // HEADER AND DECLARATIONS
    // ========================================================================

    fn parse_header(&mut self, grammar: &mut GrammarFile) -> SyntaxResult<()> {
        let start = self.tokens.current_span();
        match self.current() {
            Token::Keyword(Keyword::Lexer) => {
                self.tokens.advance();
                self.expect(&Token::Keyword(Keyword::Grammar), "'grammar'")?;
                grammar.kind = GrammarKind::Lexer;
            }
            Token::Keyword(Keyword::Parser) => {
                self.tokens.advance();
                self.expect(&Token::Keyword(Keyword::Grammar), "'grammar'")?;
                let name = self.expect_identifier("grammar name")?;
                return Err(SyntaxError::ParserGrammarUnsupported {
                    name: name.value,
                    span: start,
                });
            }
            Token::Keyword(Keyword::Grammar) => {
                self.tokens.advance();
                grammar.kind = GrammarKind::Combined;
            }
            _ => {
                log_debug!("Grammar has no header declaration");
                return Ok(());
            }
        }

        let name = self.expect_identifier("grammar name")?;
        self.expect(&Token::Semi, "';'")?;
        grammar.name = Some(name);
        Ok(())
    }

    /// `options { name = value; ... }`
    fn parse_options_block(&mut self) -> SyntaxResult<Vec<GrammarOption>> {
        self.context_stack.push("options");
        self.tokens.advance();
        self.expect(&Token::LBrace, "'{'")?;

        let mut options = Vec::new();
        while !self.tokens.advance_if(&Token::RBrace) {
            let name = self.expect_identifier("option name")?;
            self.expect(&Token::Assign, "'='")?;
            let value = self.parse_option_value()?;
            self.expect(&Token::Semi, "';'")?;
            options.push(GrammarOption {
                name: name.value,
                value,
                span: name.span,
            });
        }

        self.context_stack.pop();
        Ok(options)
    }

    fn parse_option_value(&mut self) -> SyntaxResult<String> {
        match self.current() {
            Token::Identifier(first) => {
                self.tokens.advance();
                let mut value = first;
                while self.tokens.advance_if(&Token::Dot) {
                    let part = self.expect_identifier("option value")?;
                    value.push('.');
                    value.push_str(&part.value);
                }
                Ok(value)
            }
            Token::StringLiteral(value) | Token::Action(value) => {
                self.tokens.advance();
                Ok(value)
            }
            Token::Integer(n) => {
                self.tokens.advance();
                Ok(n.to_string())
            }
            _ => Err(self.error_here("option value")),
        }
    }

    /// `tokens { A, B }` or `channels { C, D }`
    fn parse_name_block(&mut self) -> SyntaxResult<Vec<Spanned<String>>> {
        self.tokens.advance();
        self.expect(&Token::LBrace, "'{'")?;

        let mut names = Vec::new();
        while !self.tokens.advance_if(&Token::RBrace) {
            names.push(self.expect_identifier("name")?);
            if !self.tokens.advance_if(&Token::Comma) {
                self.expect(&Token::RBrace, "'}'")?;
                break;
            }
        }
        Ok(names)
    }

    /// `@header {...}` or `@lexer::members {...}`
    fn parse_named_action(&mut self) -> SyntaxResult<Spanned<String>> {
        let start = self.tokens.current_span();
        self.tokens.advance();

        let mut name = self.expect_action_name()?;
        if self.tokens.advance_if(&Token::ColonColon) {
            let member = self.expect_action_name()?;
            name = format!("{}::{}", name, member);
        }

        match self.current() {
            Token::Action(_) => {
                self.tokens.advance();
                Ok(Spanned::new(name, start.to(self.tokens.previous_span())))
            }
            _ => Err(self.error_here("action")),
        }
    }

    fn expect_action_name(&mut self) -> SyntaxResult<String> {
        match self.current() {
            Token::Identifier(name) => {
                self.tokens.advance();
                Ok(name)
            }
            Token::Keyword(keyword) => {
                self.tokens.advance();
                Ok(keyword.as_str().to_string())
            }
            _ => Err(self.error_here("action name")),
        }
    }

    // ========================================================================
    // LEXER RULES
    // ========================================================================

    fn parse_lexer_rule(&mut self, mode: &str) -> SyntaxResult<LexerRule> {
        self.context_stack.push("lexer_rule");
        let start = self.tokens.current_span();

        let fragment = self.tokens.advance_if(&Token::Keyword(Keyword::Fragment));
        let name = self.expect_identifier("rule name")?;
        if !is_token_name(&name.value) {
            return Err(SyntaxError::invalid_construct(
                &format!("fragment rule {} must have an uppercase name", name.value),
                name.span,
            ));
        }

        let mut case_insensitive = None;
        if self.tokens.check(&Token::Keyword(Keyword::Options)) {
            for option in self.parse_options_block()? {
                if option.name == "caseInsensitive" {
                    case_insensitive = Some(option.value == "true");
                }
            }
        }

        self.expect(&Token::Colon, "':'")?;

        let mut alternatives = vec![self.parse_lexer_alternative(true)?];
        while self.tokens.advance_if(&Token::Pipe) {
            alternatives.push(self.parse_lexer_alternative(true)?);
        }

        self.expect(&Token::Semi, "';'")?;
        self.context_stack.pop();

        log_debug!("Parsed lexer rule",
            "rule" => name.value.as_str(),
            "alternatives" => alternatives.len(),
            "mode" => mode
        );

        Ok(LexerRule {
            name: name.value,
            fragment,
            mode: mode.to_string(),
            case_insensitive,
            alternatives,
            span: start.to(self.tokens.previous_span()),
        })
    }

    fn parse_lexer_alternative(&mut self, outer: bool) -> SyntaxResult<LexerAlternative> {
        let start = self.tokens.current_span();
        let mut elements = Vec::new();

        while !matches!(
            self.current(),
            Token::Pipe | Token::Semi | Token::RParen | Token::Arrow | Token::Eof
        ) {
            elements.push(self.parse_lexer_element()?);
        }

        let mut commands = Vec::new();
        if self.tokens.check(&Token::Arrow) {
            if !outer {
                return Err(SyntaxError::invalid_construct(
                    "lexer commands are only allowed at the end of an outer alternative",
                    self.tokens.current_span(),
                ));
            }
            self.tokens.advance();
            commands = self.parse_commands()?;
        }

        let span = if elements.is_empty() && commands.is_empty() {
            Span::at(start.start)
        } else {
            start.to(self.tokens.previous_span())
        };

        Ok(LexerAlternative {
            elements,
            commands,
            span,
        })
    }

    fn parse_lexer_element(&mut self) -> SyntaxResult<Element> {
        let start = self.tokens.current_span();

        let kind = match self.current() {
            Token::StringLiteral(_) => self.parse_literal_or_range()?,
            Token::CharSet(items) => {
                self.tokens.advance();
                ElementKind::CharSet(items)
            }
            Token::Dot => {
                self.tokens.advance();
                ElementKind::Wildcard
            }
            Token::Identifier(name) => {
                if matches!(self.tokens.peek_ahead(1), Some(Token::Assign | Token::PlusAssign)) {
                    return Err(SyntaxError::invalid_construct(
                        &format!("label {} assigned in lexer rule", name),
                        start,
                    ));
                }
                if !is_token_name(&name) {
                    return Err(SyntaxError::invalid_construct(
                        &format!("parser rule {} referenced in lexer rule", name),
                        start,
                    ));
                }
                self.tokens.advance();
                ElementKind::RuleRef(name)
            }
            Token::Tilde => {
                self.tokens.advance();
                let operand = self.parse_not_operand()?;
                ElementKind::Not(Box::new(operand))
            }
            Token::LParen => self.parse_block()?,
            Token::Action(_) => {
                self.tokens.advance();
                return Ok(Element::new(ElementKind::Action, start));
            }
            Token::Predicate(_) => {
                self.tokens.advance();
                return Ok(Element::new(ElementKind::Predicate, start));
            }
            _ => return Err(self.error_here("lexer element")),
        };

        let element = Element::new(kind, start.to(self.tokens.previous_span()));
        self.parse_suffix(element)
    }

    /// `?`, `*`, `+`, each optionally followed by `?` for non-greedy
    fn parse_suffix(&mut self, element: Element) -> SyntaxResult<Element> {
        let quantifier = match self.current() {
            Token::Question => Quantifier::Optional,
            Token::Star => Quantifier::ZeroOrMore,
            Token::Plus => Quantifier::OneOrMore,
            _ => return Ok(element),
        };
        self.tokens.advance();
        let greedy = !self.tokens.advance_if(&Token::Question);

        let span = element.span.to(self.tokens.previous_span());
        Ok(Element::new(
            ElementKind::Repeat {
                element: Box::new(element),
                quantifier,
                greedy,
            },
            span,
        ))
    }

    fn parse_literal_or_range(&mut self) -> SyntaxResult<ElementKind> {
        let start = self.tokens.current_span();
        let Some(Token::StringLiteral(low)) = self.tokens.advance().map(|t| t.value) else {
            return Err(self.error_here("string literal"));
        };

        if !self.tokens.advance_if(&Token::Range) {
            return Ok(ElementKind::Literal(low));
        }

        let high = match self.current() {
            Token::StringLiteral(high) => {
                self.tokens.advance();
                high
            }
            _ => return Err(self.error_here("string literal")),
        };

        match (single_char(&low), single_char(&high)) {
            (Some(lo), Some(hi)) => Ok(ElementKind::Range(lo, hi)),
            _ => Err(SyntaxError::invalid_construct(
                "range bounds must be single characters",
                start.to(self.tokens.previous_span()),
            )),
        }
    }

    fn parse_block(&mut self) -> SyntaxResult<ElementKind> {
        self.enter_nested()?;
        self.tokens.advance();

        let mut alternatives = vec![self.parse_lexer_alternative(false)?.elements];
        while self.tokens.advance_if(&Token::Pipe) {
            alternatives.push(self.parse_lexer_alternative(false)?.elements);
        }
        self.expect(&Token::RParen, "')'")?;

        self.parse_depth -= 1;
        Ok(ElementKind::Block(alternatives))
    }

    /// Operand of `~`: literal, range, set, token reference or a parenthesized set
    fn parse_not_operand(&mut self) -> SyntaxResult<Element> {
        let start = self.tokens.current_span();

        let kind = match self.current() {
            Token::StringLiteral(_) => self.parse_literal_or_range()?,
            Token::CharSet(items) => {
                self.tokens.advance();
                ElementKind::CharSet(items)
            }
            Token::Identifier(name) if is_token_name(&name) => {
                self.tokens.advance();
                ElementKind::RuleRef(name)
            }
            Token::LParen => {
                self.enter_nested()?;
                self.tokens.advance();
                let mut alternatives = vec![vec![self.parse_not_operand()?]];
                while self.tokens.advance_if(&Token::Pipe) {
                    alternatives.push(vec![self.parse_not_operand()?]);
                }
                self.expect(&Token::RParen, "')'")?;
                self.parse_depth -= 1;
                ElementKind::Block(alternatives)
            }
            _ => return Err(self.error_here("set element")),
        };

        Ok(Element::new(kind, start.to(self.tokens.previous_span())))
    }

    /// `name`, `name(arg)` separated by commas
    fn parse_commands(&mut self) -> SyntaxResult<Vec<LexerCommand>> {
        let mut commands = Vec::new();

        loop {
            let start = self.tokens.current_span();
            let name = match self.current() {
                Token::Identifier(name) => name,
                Token::Keyword(Keyword::Mode) => Keyword::Mode.as_str().to_string(),
                _ => return Err(self.error_here("lexer command")),
            };
            self.tokens.advance();

            let argument = if self.tokens.advance_if(&Token::LParen) {
                let argument = match self.current() {
                    Token::Identifier(value) => CommandArgument::Name(value),
                    Token::Integer(n) => CommandArgument::Number(n),
                    _ => return Err(self.error_here("command argument")),
                };
                self.tokens.advance();
                self.expect(&Token::RParen, "')'")?;
                Some(argument)
            } else {
                None
            };

            commands.push(LexerCommand {
                name,
                argument,
                span: start.to(self.tokens.previous_span()),
            });

            if !self.tokens.advance_if(&Token::Comma) {
                break;
            }
        }

        Ok(commands)
    }

    // ========================================================================
    // PARSER RULES
    // ========================================================================

    fn parse_parser_rule(&mut self) -> SyntaxResult<ParserRule> {
        self.context_stack.push("parser_rule");
        let start = self.tokens.current_span();
        let name = self.expect_identifier("rule name")?;

        let mut literals = Vec::new();
        let mut seen_colon = false;
        let mut depth = 0usize;

        loop {
            let Some(current) = self.tokens.current().cloned() else {
                return Err(SyntaxError::unexpected_end_of_input(
                    "';'",
                    self.tokens.current_span(),
                ));
            };
            match current.value {
                Token::Eof => {
                    return Err(SyntaxError::unexpected_end_of_input("';'", current.span));
                }
                Token::Colon if !seen_colon => seen_colon = true,
                Token::StringLiteral(value) if seen_colon => {
                    literals.push(Spanned::new(value, current.span));
                }
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::Semi if seen_colon && depth == 0 => {
                    self.tokens.advance();
                    break;
                }
                _ => {}
            }
            self.tokens.advance();
        }

        // exception handlers trail the rule
        loop {
            if self.tokens.advance_if(&Token::Keyword(Keyword::Catch)) {
                if matches!(self.current(), Token::CharSet(_)) {
                    self.tokens.advance();
                }
                self.expect_action()?;
            } else if self.tokens.advance_if(&Token::Keyword(Keyword::Finally)) {
                self.expect_action()?;
            } else {
                break;
            }
        }

        self.context_stack.pop();
        Ok(ParserRule {
            name: name.value,
            literals,
            span: start.to(self.tokens.previous_span()),
        })
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn current(&self) -> Token {
        self.tokens.current_token().cloned().unwrap_or(Token::Eof)
    }

    fn expect(&mut self, expected: &Token, description: &str) -> SyntaxResult<Span> {
        if self.tokens.check(expected) {
            let span = self.tokens.current_span();
            self.tokens.advance();
            Ok(span)
        } else {
            Err(self.error_here(description))
        }
    }

    fn expect_identifier(&mut self, description: &str) -> SyntaxResult<Spanned<String>> {
        match self.current() {
            Token::Identifier(name) => {
                let span = self.tokens.current_span();
                self.tokens.advance();
                Ok(Spanned::new(name, span))
            }
            _ => Err(self.error_here(description)),
        }
    }

    fn expect_action(&mut self) -> SyntaxResult<()> {
        match self.current() {
            Token::Action(_) => {
                self.tokens.advance();
                Ok(())
            }
            _ => Err(self.error_here("action")),
        }
    }

    fn error_here(&self, expected: &str) -> SyntaxError {
        let span = self.tokens.current_span();
        log_debug!("Syntax error context",
            "context" => self.context_stack.join(" > "),
            "expected" => expected
        );
        match self.current() {
            Token::Eof => SyntaxError::unexpected_end_of_input(expected, span),
            found => SyntaxError::unexpected_token(expected, &found.describe(), span),
        }
    }

    fn enter_nested(&mut self) -> SyntaxResult<()> {
        self.parse_depth += 1;
        if self.parse_depth > MAX_PARSE_DEPTH {
            return Err(SyntaxError::MaxRecursionDepth {
                max_depth: MAX_PARSE_DEPTH,
                span: self.tokens.current_span(),
            });
        }
        Ok(())
    }
}

/// Lexer rule names start with an uppercase letter
pub fn is_token_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::CharSetItem;
    use crate::lexical;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> SyntaxResult<GrammarFile> {
        GrammarParser::new(lexical::tokenize(source).unwrap()).parse()
    }

    #[test]
    fn test_lexer_grammar() {
        let grammar = parse(
            "lexer grammar Words;\n\
             WORD : ~[ \\t\\r\\n]+ ;\n\
             WS : [ \\t\\r\\n]+ -> skip ;\n",
        )
        .unwrap();

        assert_eq!(grammar.kind, GrammarKind::Lexer);
        assert_eq!(grammar.name.as_ref().unwrap().value, "Words");
        assert_eq!(grammar.lexer_rules.len(), 2);

        let word = &grammar.lexer_rules[0];
        assert_eq!(word.mode, DEFAULT_MODE_NAME);
        assert_matches!(
            &word.alternatives[0].elements[0].kind,
            ElementKind::Repeat { quantifier: Quantifier::OneOrMore, greedy: true, element }
                if matches!(element.kind, ElementKind::Not(_))
        );

        let ws = &grammar.lexer_rules[1];
        assert_eq!(ws.alternatives[0].commands.len(), 1);
        assert_eq!(ws.alternatives[0].commands[0].name, "skip");
    }

    #[test]
    fn test_combined_grammar_keeps_parser_literals() {
        let grammar = parse(
            "grammar Expr;\n\
             expr : expr '+' term | term ;\n\
             term : INT ('*' INT)* ;\n\
             INT : [0-9]+ ;\n",
        )
        .unwrap();

        assert_eq!(grammar.kind, GrammarKind::Combined);
        assert_eq!(grammar.parser_rules.len(), 2);
        assert_eq!(grammar.parser_rules[0].literals[0].value, "+");
        assert_eq!(grammar.parser_rules[1].literals[0].value, "*");
        assert_matches!(
            &grammar.lexer_rules[0].alternatives[0].elements[0].kind,
            ElementKind::Repeat { element, quantifier: Quantifier::OneOrMore, greedy: true }
                if element.kind == ElementKind::CharSet(vec![CharSetItem::Range('0', '9')])
        );
    }

    #[test]
    fn test_declarations_and_modes() {
        let grammar = parse(
            "lexer grammar Modes;\n\
             options { caseInsensitive = true; }\n\
             tokens { KEYWORD }\n\
             channels { COMMENTS, DIRECTIVES }\n\
             @header { package x; }\n\
             OPEN : '<' -> pushMode(INSIDE) ;\n\
             TEXT : ~'<'+ ;\n\
             mode INSIDE;\n\
             CLOSE : '>' -> popMode ;\n\
             NAME : [a-z]+ -> type(KEYWORD), channel(2) ;\n",
        )
        .unwrap();

        assert!(grammar.case_insensitive());
        assert_eq!(grammar.tokens[0].value, "KEYWORD");
        assert_eq!(grammar.channels.len(), 2);
        assert_eq!(grammar.named_actions[0].value, "header");
        assert_eq!(grammar.modes[0].value, "INSIDE");
        assert_eq!(grammar.lexer_rules[2].mode, "INSIDE");

        let commands = &grammar.lexer_rules[3].alternatives[0].commands;
        assert_eq!(commands[0].name, "type");
        assert_eq!(commands[0].argument, Some(CommandArgument::Name("KEYWORD".into())));
        assert_eq!(commands[1].argument, Some(CommandArgument::Number(2)));
    }

    #[test]
    fn test_non_greedy_and_fragments() {
        let grammar = parse(
            "lexer grammar C;\n\
             COMMENT : '/*' .*? '*/' -> channel(HIDDEN) ;\n\
             fragment DIGIT : '0'..'9' ;\n",
        )
        .unwrap();

        assert_matches!(
            &grammar.lexer_rules[0].alternatives[0].elements[1].kind,
            ElementKind::Repeat { greedy: false, quantifier: Quantifier::ZeroOrMore, .. }
        );
        assert!(grammar.lexer_rules[1].fragment);
        assert_eq!(
            grammar.lexer_rules[1].alternatives[0].elements[0].kind,
            ElementKind::Range('0', '9')
        );
    }

    #[test]
    fn test_missing_header() {
        let grammar = parse("ID : [a-z]+ ;").unwrap();
        assert!(grammar.name.is_none());
        assert_eq!(grammar.lexer_rules.len(), 1);
    }

    #[test]
    fn test_rejected_grammars() {
        assert_matches!(
            parse("parser grammar P; r : 'a' ;"),
            Err(SyntaxError::ParserGrammarUnsupported { name, .. }) if name == "P"
        );
        assert_matches!(
            parse("lexer grammar L; import Common; A : 'a' ;"),
            Err(SyntaxError::ImportUnsupported { name, .. }) if name == "Common"
        );
        assert_matches!(
            parse("lexer grammar L; r : 'a' ;"),
            Err(SyntaxError::InvalidConstruct { .. })
        );
    }

    #[test]
    fn test_syntax_error_position() {
        let error = parse("lexer grammar L;\nA : 'a' \n").unwrap_err();
        assert_matches!(error, SyntaxError::UnexpectedEndOfInput { .. });

        let error = parse("lexer grammar L;\nA 'a' ;\n").unwrap_err();
        assert_eq!(error.to_string(), "syntax error: mismatched input 'a' expecting ':'");
        assert_eq!(error.span().start.line, 2);
        assert_eq!(error.span().start.column, 2);
    }

    #[test]
    fn test_commands_inside_block_rejected() {
        let error = parse("lexer grammar L; A : ('a' -> skip) ;").unwrap_err();
        assert_matches!(error, SyntaxError::InvalidConstruct { .. });
    }
}
