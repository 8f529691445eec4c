pub mod engine;

pub use engine::{ExecutionError, LexerInstance};

use crate::resolution::{LexerFactory, LexerOptions};
use crate::types::TokenStream;

/// Run a fresh lexer instance over `input` until end of input
pub fn tokenize(factory: &LexerFactory, input: &str) -> Result<TokenStream, ExecutionError> {
    tokenize_with_options(factory, input, LexerOptions::default())
}

pub fn tokenize_with_options(
    factory: &LexerFactory,
    input: &str,
    options: LexerOptions,
) -> Result<TokenStream, ExecutionError> {
    factory.create(input, options)?.all_tokens()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::resolution::{load_artifact, LexerFactory, ResolutionScope};
    use lexvis_compiler::compile_source;
    use lexvis_compiler::config::runtime::CompilerPreferences;

    /// Compile `grammar` in memory and resolve it into a factory
    pub fn factory(grammar: &str) -> LexerFactory {
        let compiled = compile_source(grammar, Some("Test"), &CompilerPreferences::default())
            .unwrap_or_else(|e| panic!("grammar failed to compile: {}", e));
        let lexer_name = compiled.artifact.lexer_name.clone();
        let mut scope = ResolutionScope::new("test");
        load_artifact(compiled.artifact, &lexer_name, &mut scope).unwrap()
    }
}
