//! Consolidated error codes and classification system
//!
//! Single source of truth for every LEXVIS error, warning and success code
//! together with its behavioral metadata. Both the grammar compiler and the
//! tokenization runtime log through these codes.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
}

/// Grammar file handling error codes
pub mod grammar_file {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E006");
    pub const EMPTY_GRAMMAR: Code = Code::new("E007");
    pub const INVALID_ENCODING: Code = Code::new("E008");
    pub const IO_ERROR: Code = Code::new("E009");
    pub const INVALID_IDENTIFIER: Code = Code::new("E010");
}

/// Grammar text lexical error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_LITERAL: Code = Code::new("E021");
    pub const UNTERMINATED_CHAR_SET: Code = Code::new("E022");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E023");
    pub const UNTERMINATED_ACTION: Code = Code::new("E024");
    pub const INVALID_ESCAPE: Code = Code::new("E025");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E026");
    pub const LITERAL_TOO_LONG: Code = Code::new("E027");
}

/// Grammar syntax error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E051");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E052");
    pub const PARSER_GRAMMAR_UNSUPPORTED: Code = Code::new("E053");
    pub const IMPORT_UNSUPPORTED: Code = Code::new("E054");
}

/// Grammar semantic error codes
pub mod semantic {
    use super::Code;

    pub const UNDEFINED_RULE: Code = Code::new("E100");
    pub const DUPLICATE_RULE: Code = Code::new("E101");
    pub const RECURSIVE_RULE: Code = Code::new("E102");
    pub const UNDEFINED_MODE: Code = Code::new("E103");
    pub const UNDEFINED_CHANNEL: Code = Code::new("E104");
    pub const UNDEFINED_TOKEN_TYPE: Code = Code::new("E105");
    pub const INVALID_COMMAND: Code = Code::new("E106");
    pub const INVALID_SET_ELEMENT: Code = Code::new("E107");
    pub const INVALID_RANGE: Code = Code::new("E108");
    pub const TOO_MANY_RULES: Code = Code::new("E109");
    pub const DUPLICATE_DECLARATION: Code = Code::new("E110");
    pub const EMPTY_LITERAL: Code = Code::new("E111");
}

/// Grammar compiler warning codes
pub mod warnings {
    use super::Code;

    pub const NAME_MISMATCH: Code = Code::new("W100");
    pub const IGNORED_ACTION: Code = Code::new("W101");
    pub const COMMAND_ON_FRAGMENT: Code = Code::new("W102");
    pub const EMPTY_MATCH: Code = Code::new("W103");
    pub const IGNORED_OPTION: Code = Code::new("W104");
    pub const NO_LEXER_RULES: Code = Code::new("W105");
    pub const MODES_IN_COMBINED: Code = Code::new("W106");
    pub const WORKSPACE_CLEANUP_FAILED: Code = Code::new("W200");
}

/// Automaton construction error codes
pub mod automaton {
    use super::Code;

    pub const STATE_LIMIT_EXCEEDED: Code = Code::new("E150");
    pub const MODE_LIMIT_EXCEEDED: Code = Code::new("E151");
}

/// Artifact emission error codes
pub mod artifact {
    use super::Code;

    pub const SERIALIZATION_ERROR: Code = Code::new("E160");
    pub const WRITE_ERROR: Code = Code::new("E161");
}

/// Tokenization pipeline error codes
pub mod runtime {
    use super::Code;

    pub const WORKSPACE_ERROR: Code = Code::new("E200");
    pub const INVALID_GRAMMAR: Code = Code::new("E210");
    pub const COMPILATION_FAILED: Code = Code::new("E220");
    pub const COMPILATION_TIMEOUT: Code = Code::new("E221");
    pub const TOOL_UNAVAILABLE: Code = Code::new("E222");
    pub const TOOL_VERSION_MISMATCH: Code = Code::new("E223");
    pub const LOAD_FAILED: Code = Code::new("E230");
    pub const EXECUTION_FAILED: Code = Code::new("E240");
    pub const CONFIGURATION_ERROR: Code = Code::new("E250");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const GRAMMAR_FILE_READ: Code = Code::new("I010");
    pub const GRAMMAR_LEXED: Code = Code::new("I020");
    pub const GRAMMAR_PARSED: Code = Code::new("I040");
    pub const SEMANTIC_ANALYSIS_COMPLETE: Code = Code::new("I070");
    pub const AUTOMATON_BUILT: Code = Code::new("I080");
    pub const ARTIFACT_WRITTEN: Code = Code::new("I090");
    pub const GRAMMAR_COMPILED: Code = Code::new("I095");
    pub const WORKSPACE_OPENED: Code = Code::new("I100");
    pub const WORKSPACE_CLOSED: Code = Code::new("I101");
    pub const GRAMMAR_INGESTED: Code = Code::new("I110");
    pub const LEXER_COMPILED: Code = Code::new("I120");
    pub const LEXER_LOADED: Code = Code::new("I130");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I140");
    pub const REQUEST_COMPLETE: Code = Code::new("I150");
    pub const TOOL_VALIDATED: Code = Code::new("I160");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

type Entry = (
    Code,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

const ENTRIES: &[Entry] = &[
    // System
    (system::INTERNAL_ERROR, "System", Severity::Critical, false, true,
        "Internal invariant violated", "Report the failure with the grammar that triggered it"),
    // Grammar file
    (grammar_file::FILE_NOT_FOUND, "GrammarFile", Severity::High, false, true,
        "Grammar file does not exist", "Verify the grammar path"),
    (grammar_file::FILE_TOO_LARGE, "GrammarFile", Severity::High, false, true,
        "Grammar exceeds the configured size limit", "Reduce the grammar size"),
    (grammar_file::EMPTY_GRAMMAR, "GrammarFile", Severity::High, false, true,
        "Grammar contains no content", "Provide a non-empty grammar"),
    (grammar_file::INVALID_ENCODING, "GrammarFile", Severity::High, false, true,
        "Grammar is not valid UTF-8", "Re-encode the grammar as UTF-8"),
    (grammar_file::IO_ERROR, "GrammarFile", Severity::High, false, true,
        "Grammar file could not be read or written", "Check file permissions and disk space"),
    (grammar_file::INVALID_IDENTIFIER, "GrammarFile", Severity::High, false, true,
        "No valid grammar identifier could be derived", "Add a grammar declaration or rename the file"),
    // Lexical
    (lexical::INVALID_CHARACTER, "Lexical", Severity::High, false, true,
        "Character not valid in grammar text", "Remove or quote the character"),
    (lexical::UNTERMINATED_LITERAL, "Lexical", Severity::High, false, true,
        "String literal is not closed", "Add the closing quote"),
    (lexical::UNTERMINATED_CHAR_SET, "Lexical", Severity::High, false, true,
        "Character set is not closed", "Add the closing bracket"),
    (lexical::UNTERMINATED_COMMENT, "Lexical", Severity::High, false, true,
        "Block comment is not closed", "Add the closing */"),
    (lexical::UNTERMINATED_ACTION, "Lexical", Severity::High, false, true,
        "Action block is not closed", "Balance the braces of the action"),
    (lexical::INVALID_ESCAPE, "Lexical", Severity::High, false, true,
        "Escape sequence is not recognized", "Use a supported escape sequence"),
    (lexical::IDENTIFIER_TOO_LONG, "Lexical", Severity::Medium, false, true,
        "Identifier exceeds the configured length limit", "Shorten the identifier"),
    (lexical::LITERAL_TOO_LONG, "Lexical", Severity::Medium, false, true,
        "Literal exceeds the configured length limit", "Shorten the literal"),
    // Syntax
    (syntax::UNEXPECTED_TOKEN, "Syntax", Severity::High, false, true,
        "Unexpected token in grammar", "Fix the grammar syntax at the reported position"),
    (syntax::UNEXPECTED_END_OF_INPUT, "Syntax", Severity::High, false, true,
        "Grammar ended unexpectedly", "Complete the last rule"),
    (syntax::MAX_RECURSION_DEPTH, "Syntax", Severity::High, false, true,
        "Rule nesting exceeds the configured depth", "Flatten deeply nested groups"),
    (syntax::PARSER_GRAMMAR_UNSUPPORTED, "Syntax", Severity::High, false, true,
        "Parser grammars contain no lexer", "Supply a lexer or combined grammar"),
    (syntax::IMPORT_UNSUPPORTED, "Syntax", Severity::High, false, true,
        "Grammar imports are not supported", "Inline the imported rules"),
    // Semantic
    (semantic::UNDEFINED_RULE, "Semantic", Severity::High, false, true,
        "Reference to an undefined lexer rule", "Define the rule or fix the reference"),
    (semantic::DUPLICATE_RULE, "Semantic", Severity::High, false, true,
        "Rule defined more than once", "Rename or remove the duplicate"),
    (semantic::RECURSIVE_RULE, "Semantic", Severity::High, false, true,
        "Recursive lexer rules cannot be compiled to a finite automaton", "Rewrite the rule without recursion"),
    (semantic::UNDEFINED_MODE, "Semantic", Severity::High, false, true,
        "Command references an undefined mode", "Declare the mode"),
    (semantic::UNDEFINED_CHANNEL, "Semantic", Severity::High, false, true,
        "Command references an undefined channel", "Declare the channel in channels {}"),
    (semantic::UNDEFINED_TOKEN_TYPE, "Semantic", Severity::High, false, true,
        "Command references an undefined token type", "Declare the type in tokens {} or as a rule"),
    (semantic::INVALID_COMMAND, "Semantic", Severity::High, false, true,
        "Unknown or malformed lexer command", "Use a supported lexer command"),
    (semantic::INVALID_SET_ELEMENT, "Semantic", Severity::High, false, true,
        "Element cannot be used in a set or negation", "Negate only single characters, ranges and sets"),
    (semantic::INVALID_RANGE, "Semantic", Severity::High, false, true,
        "Range bounds are invalid", "Use single characters with start <= end"),
    (semantic::TOO_MANY_RULES, "Semantic", Severity::High, false, true,
        "Grammar exceeds the configured rule count", "Split the grammar"),
    (semantic::DUPLICATE_DECLARATION, "Semantic", Severity::Medium, false, true,
        "Token, channel or mode declared more than once", "Remove the duplicate declaration"),
    (semantic::EMPTY_LITERAL, "Semantic", Severity::High, false, true,
        "String literals cannot be empty", "Remove the empty literal"),
    // Warnings
    (warnings::NAME_MISMATCH, "Warning", Severity::Low, true, false,
        "Grammar name differs from the file name", "Rename the file or the grammar"),
    (warnings::IGNORED_ACTION, "Warning", Severity::Low, true, false,
        "Embedded action or predicate ignored", "Remove target-language code from the grammar"),
    (warnings::COMMAND_ON_FRAGMENT, "Warning", Severity::Low, true, false,
        "Commands on fragment rules have no effect", "Move the command to a non-fragment rule"),
    (warnings::EMPTY_MATCH, "Warning", Severity::Low, true, false,
        "Rule can match the empty string", "Require at least one character"),
    (warnings::IGNORED_OPTION, "Warning", Severity::Low, true, false,
        "Grammar option ignored", "Remove unsupported options"),
    (warnings::NO_LEXER_RULES, "Warning", Severity::Low, true, false,
        "Grammar defines no lexer rules", "Add lexer rules"),
    (warnings::MODES_IN_COMBINED, "Warning", Severity::Low, true, false,
        "Lexical modes declared in a combined grammar", "Move the lexer rules into a lexer grammar"),
    (warnings::WORKSPACE_CLEANUP_FAILED, "Warning", Severity::Low, true, false,
        "Workspace directory could not be removed", "Remove the directory manually"),
    // Automaton
    (automaton::STATE_LIMIT_EXCEEDED, "Automaton", Severity::High, false, true,
        "Automaton exceeds the configured state limit", "Simplify the grammar"),
    (automaton::MODE_LIMIT_EXCEEDED, "Automaton", Severity::High, false, true,
        "Grammar declares too many modes", "Reduce the number of modes"),
    // Artifact
    (artifact::SERIALIZATION_ERROR, "Artifact", Severity::Critical, false, true,
        "Artifact could not be serialized", "Report the failure"),
    (artifact::WRITE_ERROR, "Artifact", Severity::High, false, true,
        "Artifact could not be written", "Check the output directory"),
    // Runtime
    (runtime::WORKSPACE_ERROR, "Runtime", Severity::High, true, true,
        "Workspace could not be allocated", "Check the workspace base directory"),
    (runtime::INVALID_GRAMMAR, "Runtime", Severity::Medium, true, true,
        "Grammar upload rejected", "Fix the uploaded grammar"),
    (runtime::COMPILATION_FAILED, "Runtime", Severity::Medium, true, true,
        "Grammar compilation failed", "Read the tool diagnostics"),
    (runtime::COMPILATION_TIMEOUT, "Runtime", Severity::High, true, true,
        "Grammar compilation exceeded its time limit", "Simplify the grammar or raise the timeout"),
    (runtime::TOOL_UNAVAILABLE, "Runtime", Severity::Critical, false, true,
        "Grammar compilation tool could not be run", "Check the configured tool path"),
    (runtime::TOOL_VERSION_MISMATCH, "Runtime", Severity::Critical, false, true,
        "Grammar compilation tool reports an unexpected version", "Install the expected tool version"),
    (runtime::LOAD_FAILED, "Runtime", Severity::High, true, true,
        "Compiled lexer could not be loaded", "Recompile the grammar"),
    (runtime::EXECUTION_FAILED, "Runtime", Severity::Medium, true, true,
        "Tokenization failed", "Check the input against the grammar"),
    (runtime::CONFIGURATION_ERROR, "Runtime", Severity::Critical, false, true,
        "Service configuration is invalid", "Fix the configuration"),
    // Success
    (success::SYSTEM_INITIALIZATION_COMPLETED, "Success", Severity::Low, true, false,
        "Logging system initialized", ""),
    (success::GRAMMAR_FILE_READ, "Success", Severity::Low, true, false,
        "Grammar file read", ""),
    (success::GRAMMAR_LEXED, "Success", Severity::Low, true, false,
        "Grammar text tokenized", ""),
    (success::GRAMMAR_PARSED, "Success", Severity::Low, true, false,
        "Grammar parsed", ""),
    (success::SEMANTIC_ANALYSIS_COMPLETE, "Success", Severity::Low, true, false,
        "Grammar analysis completed", ""),
    (success::AUTOMATON_BUILT, "Success", Severity::Low, true, false,
        "Automaton constructed", ""),
    (success::ARTIFACT_WRITTEN, "Success", Severity::Low, true, false,
        "Artifact written", ""),
    (success::GRAMMAR_COMPILED, "Success", Severity::Low, true, false,
        "Grammar compiled", ""),
    (success::WORKSPACE_OPENED, "Success", Severity::Low, true, false,
        "Workspace opened", ""),
    (success::WORKSPACE_CLOSED, "Success", Severity::Low, true, false,
        "Workspace closed", ""),
    (success::GRAMMAR_INGESTED, "Success", Severity::Low, true, false,
        "Grammar ingested", ""),
    (success::LEXER_COMPILED, "Success", Severity::Low, true, false,
        "Lexer compiled", ""),
    (success::LEXER_LOADED, "Success", Severity::Low, true, false,
        "Lexer loaded", ""),
    (success::TOKENIZATION_COMPLETE, "Success", Severity::Low, true, false,
        "Tokenization completed", ""),
    (success::REQUEST_COMPLETE, "Success", Severity::Low, true, false,
        "Request completed", ""),
    (success::TOOL_VALIDATED, "Success", Severity::Low, true, false,
        "Compilation tool validated", ""),
];

/// Get the global error registry
pub fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        ENTRIES
            .iter()
            .map(|(code, category, severity, recoverable, halt, description, action)| {
                (
                    code.as_str(),
                    ErrorMetadata::new(
                        code.as_str(),
                        category,
                        *severity,
                        *recoverable,
                        *halt,
                        description,
                        action,
                    ),
                )
            })
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .filter(|action| !action.is_empty())
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
