//! Resolution of `->` lexer commands to numeric actions

use super::{symbol_table::SymbolTable, types::SemanticError};
use crate::{
    artifact::schema::LexerAction,
    grammar::ast::{CommandArgument, LexerCommand},
};

/// Resolve the commands of one alternative, pushing errors for bad ones
pub fn resolve_commands(
    commands: &[LexerCommand],
    table: &SymbolTable,
    errors: &mut Vec<SemanticError>,
) -> Vec<LexerAction> {
    let mut actions = Vec::with_capacity(commands.len());
    for command in commands {
        match resolve_command(command, table) {
            Ok(action) => actions.push(action),
            Err(error) => errors.push(error),
        }
    }
    actions
}

fn resolve_command(command: &LexerCommand, table: &SymbolTable) -> Result<LexerAction, SemanticError> {
    let name = command.name.as_str();
    match name {
        "skip" | "more" | "popMode" => {
            if command.argument.is_some() {
                return Err(SemanticError::invalid_command(
                    name,
                    "does not take an argument",
                    command.span,
                ));
            }
            Ok(match name {
                "skip" => LexerAction::Skip,
                "more" => LexerAction::More,
                _ => LexerAction::PopMode,
            })
        }
        "type" => match required_argument(command)? {
            CommandArgument::Name(token) => table
                .token_type(token)
                .map(LexerAction::Type)
                .ok_or_else(|| SemanticError::UndefinedTokenType {
                    name: token.clone(),
                    span: command.span,
                }),
            CommandArgument::Number(n) => to_i32(*n, command).map(LexerAction::Type),
        },
        "channel" => match required_argument(command)? {
            CommandArgument::Name(channel) => table
                .channel(channel)
                .map(LexerAction::Channel)
                .ok_or_else(|| SemanticError::UndefinedChannel {
                    name: channel.clone(),
                    span: command.span,
                }),
            CommandArgument::Number(n) => to_i32(*n, command).map(LexerAction::Channel),
        },
        "mode" | "pushMode" => {
            let mode = match required_argument(command)? {
                CommandArgument::Name(mode) => {
                    table.mode(mode).ok_or_else(|| SemanticError::UndefinedMode {
                        name: mode.clone(),
                        span: command.span,
                    })?
                }
                CommandArgument::Number(n) => usize::try_from(*n)
                    .ok()
                    .filter(|&m| m < table.modes.len())
                    .ok_or_else(|| SemanticError::UndefinedMode {
                        name: n.to_string(),
                        span: command.span,
                    })?,
            };
            Ok(if name == "mode" {
                LexerAction::Mode(mode)
            } else {
                LexerAction::PushMode(mode)
            })
        }
        _ => Err(SemanticError::invalid_command(
            name,
            "does not exist or is not supported",
            command.span,
        )),
    }
}

fn required_argument(command: &LexerCommand) -> Result<&CommandArgument, SemanticError> {
    command.argument.as_ref().ok_or_else(|| {
        SemanticError::invalid_command(&command.name, "requires an argument", command.span)
    })
}

fn to_i32(value: i64, command: &LexerCommand) -> Result<i32, SemanticError> {
    i32::try_from(value)
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| {
            SemanticError::invalid_command(
                &command.name,
                format!("argument {} is out of range", value),
                command.span,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_analysis::symbol_table::build_symbol_table;
    use crate::{lexical::tokenize, syntax::parse_grammar};
    use assert_matches::assert_matches;

    fn resolve(source: &str) -> (Vec<Vec<LexerAction>>, Vec<SemanticError>) {
        let grammar = parse_grammar(tokenize(source).unwrap()).unwrap();
        let mut errors = Vec::new();
        let table = build_symbol_table(&grammar, &mut errors);
        let actions = grammar
            .lexer_rules
            .iter()
            .flat_map(|r| r.alternatives.iter())
            .map(|alt| resolve_commands(&alt.commands, &table, &mut errors))
            .collect();
        (actions, errors)
    }

    #[test]
    fn test_resolves_all_commands() {
        let (actions, errors) = resolve(
            "lexer grammar L;\n\
             channels { COMMENTS }\n\
             tokens { STRING }\n\
             WS : ' ' -> skip ;\n\
             C : '#' ~'\\n'* -> channel(COMMENTS) ;\n\
             H : '%' -> channel(HIDDEN), type(STRING) ;\n\
             OPEN : '\"' -> more, pushMode(STR) ;\n\
             mode STR;\n\
             CLOSE : '\"' -> popMode ;\n\
             ANY : . -> more, mode(DEFAULT_MODE) ;\n",
        );
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(actions[0], vec![LexerAction::Skip]);
        assert_eq!(actions[1], vec![LexerAction::Channel(2)]);
        assert_eq!(actions[2], vec![LexerAction::Channel(1), LexerAction::Type(1)]);
        assert_eq!(actions[3], vec![LexerAction::More, LexerAction::PushMode(1)]);
        assert_eq!(actions[4], vec![LexerAction::PopMode]);
        assert_eq!(actions[5], vec![LexerAction::More, LexerAction::Mode(0)]);
    }

    #[test]
    fn test_undefined_names() {
        let (_, errors) = resolve(
            "lexer grammar L;\nA : 'a' -> channel(NOPE) ;\nB : 'b' -> pushMode(NOWHERE) ;\nC : 'c' -> type(GHOST) ;\n",
        );
        assert_matches!(&errors[0], SemanticError::UndefinedChannel { name, .. } if name == "NOPE");
        assert_matches!(&errors[1], SemanticError::UndefinedMode { name, .. } if name == "NOWHERE");
        assert_matches!(&errors[2], SemanticError::UndefinedTokenType { name, .. } if name == "GHOST");
    }

    #[test]
    fn test_invalid_commands() {
        let (_, errors) = resolve("lexer grammar L;\nA : 'a' -> skip(X) ;\nB : 'b' -> jump ;\nC : 'c' -> mode ;\n");
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| matches!(e, SemanticError::InvalidCommand { .. })));
        assert_eq!(errors[1].to_string(), "lexer command jump does not exist or is not supported");
    }

    #[test]
    fn test_numeric_arguments() {
        let (actions, errors) = resolve("lexer grammar L;\nA : 'a' -> channel(5), type(9) ;\n");
        assert!(errors.is_empty());
        assert_eq!(actions[0], vec![LexerAction::Channel(5), LexerAction::Type(9)]);
    }
}
