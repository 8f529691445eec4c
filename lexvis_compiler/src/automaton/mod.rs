//! Lexer automaton construction

pub mod builder;
pub mod charset;

pub use builder::{build_automata, AutomatonError, AutomatonOutput};
pub use charset::CharSet;
