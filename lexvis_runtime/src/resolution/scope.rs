//! Per-request registry of resolved lexers
//!
//! Units are keyed `<Identifier>Lexer#<request-id>`, so two requests compiling
//! grammars with the same name can never observe each other's lexer. The
//! scope lives exactly as long as its request.

use super::automaton::ExecutableLexer;
use super::error::LoadError;
use lexvis_compiler::log_debug;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ResolutionScope {
    request_id: String,
    units: HashMap<String, Arc<ExecutableLexer>>,
}

impl ResolutionScope {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            units: HashMap::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn key_for(&self, lexer_name: &str) -> String {
        format!("{}#{}", lexer_name, self.request_id)
    }

    /// Register a resolved lexer under its request-unique key
    pub fn register(&mut self, lexer: ExecutableLexer) -> Result<(String, Arc<ExecutableLexer>), LoadError> {
        let key = self.key_for(&lexer.lexer_name);
        if self.units.contains_key(&key) {
            return Err(LoadError::DuplicateUnit { key });
        }
        let unit = Arc::new(lexer);
        self.units.insert(key.clone(), Arc::clone(&unit));
        Ok((key, unit))
    }

    pub fn get(&self, key: &str) -> Option<Arc<ExecutableLexer>> {
        self.units.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Drop for ResolutionScope {
    fn drop(&mut self) {
        if !self.units.is_empty() {
            log_debug!("Resolution scope discarded",
                "request_id" => &self.request_id,
                "units" => self.units.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::automaton::{resolve, validate};
    use assert_matches::assert_matches;
    use lexvis_compiler::compile_source;
    use lexvis_compiler::config::runtime::CompilerPreferences;

    fn resolved(grammar: &str, lexer: &str) -> ExecutableLexer {
        let artifact = compile_source(grammar, None, &CompilerPreferences::default())
            .unwrap()
            .artifact;
        validate(&artifact, lexer).unwrap();
        resolve(artifact)
    }

    #[test]
    fn test_keys_are_request_scoped() {
        let mut first = ResolutionScope::new("req-a");
        let mut second = ResolutionScope::new("req-b");

        let (key_a, _) = first.register(resolved("lexer grammar G;\nA : 'a' ;\n", "GLexer")).unwrap();
        let (key_b, _) = second.register(resolved("lexer grammar G;\nB : 'b' ;\n", "GLexer")).unwrap();

        assert_eq!(key_a, "GLexer#req-a");
        assert_eq!(key_b, "GLexer#req-b");
        assert!(first.get(&key_b).is_none());
        assert_eq!(first.get(&key_a).unwrap().rules[0].name, "A");
        assert_eq!(second.get(&key_b).unwrap().rules[0].name, "B");
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut scope = ResolutionScope::new("req");
        scope.register(resolved("lexer grammar G;\nA : 'a' ;\n", "GLexer")).unwrap();
        assert_matches!(
            scope.register(resolved("lexer grammar G;\nA : 'a' ;\n", "GLexer")),
            Err(LoadError::DuplicateUnit { .. })
        );
        assert_eq!(scope.len(), 1);
    }
}
