pub mod automaton;
pub mod error;
pub mod loader;
pub mod scope;

pub use automaton::{ClosureEntry, ExecState, ExecutableLexer, ExecutableMode};
pub use error::LoadError;
pub use loader::{load, load_artifact, LexerFactory, LexerOptions};
pub use scope::ResolutionScope;
