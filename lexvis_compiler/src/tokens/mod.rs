//! Token model for grammar text

pub mod token;
pub mod token_stream;

pub use token::{escape_literal, Token};
pub use token_stream::{SpannedToken, TokenStream};
