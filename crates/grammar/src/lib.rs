//! Pattern grammars and the recursive tokenizer.
//!
//! A [`Grammar`] is an ordered map from token type to alternative [`Rule`]s.
//! The tokenizer applies the rules in order and re-tokenizes matched text
//! with nested grammars, producing a [`TokenStream`] tree that always
//! concatenates back to its input.
//!
//! # Architecture
//!
//! * [`pattern`]: compiled patterns, flags, and rules
//! * [`grammar`]: ordered grammars and grammar references
//! * [`compose`]: `extend`, `insert_before`, and nested-path edits
//! * [`tokenize`]: the tokenizer and its scope for id references
//! * [`token`]: token trees, rendering, and golden-test form
//! * [`embed`]: templated and inline-tag embedding
//! * [`options`]: per-call budget, loadable from TOML

pub mod compose;
pub mod embed;
pub mod error;
pub mod grammar;
pub mod options;
pub mod pattern;
pub mod token;
pub mod tokenize;

pub use compose::PathSegment;
pub use error::{ComposeError, ConfigError, PatternError, TimeoutCause, TokenizeError};
pub use grammar::{Embedding, Grammar, Inside, IntoRules};
pub use options::TokenizeOptions;
pub use pattern::{Aliases, Flags, Pattern, Rule};
pub use token::{Content, Node, Token, TokenStream};
pub use tokenize::{GrammarScope, Tokenizer};

/// Tokenizes `text` with `grammar` under default options.
///
/// Id references cannot be resolved here; use a [`Tokenizer`] with a scope
/// (or a resolved language) for grammars that have them.
pub fn tokenize(text: &str, grammar: &Grammar) -> Result<TokenStream, TokenizeError> {
	Tokenizer::new().tokenize(text, grammar)
}
