use crate::logging::codes;

/// Check that every code the compiler emits is registered with metadata
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating compiler pipeline configuration");

    let required = [
        codes::grammar_file::FILE_NOT_FOUND,
        codes::grammar_file::INVALID_ENCODING,
        codes::grammar_file::INVALID_IDENTIFIER,
        codes::lexical::INVALID_CHARACTER,
        codes::syntax::UNEXPECTED_TOKEN,
        codes::semantic::UNDEFINED_RULE,
        codes::semantic::RECURSIVE_RULE,
        codes::warnings::EMPTY_MATCH,
        codes::automaton::STATE_LIMIT_EXCEEDED,
        codes::artifact::WRITE_ERROR,
        codes::success::GRAMMAR_COMPILED,
    ];

    for code in &required {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("code {} has no registered metadata", code));
        }
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Compiler pipeline validated",
        "codes_checked" => required.len()
    );
    Ok(())
}
