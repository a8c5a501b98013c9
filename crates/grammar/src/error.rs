use thiserror::Error;

/// A pattern source that failed to compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pattern `{source_text}`: {message}")]
pub struct PatternError {
	/// The pattern source as written by the grammar author.
	pub source_text: String,
	/// Compiler diagnostic.
	pub message: String,
}

/// Errors raised by grammar composition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
	/// `insert_before` named an anchor key the target grammar does not have.
	#[error("anchor `{anchor}` not found in grammar")]
	InvalidAnchor { anchor: String },
	/// A nested grammar path did not lead to an inline grammar.
	#[error("no inline grammar at `{path}`")]
	InvalidPath { path: String },
	/// A pattern built during composition failed to compile.
	#[error(transparent)]
	Pattern(#[from] PatternError),
}

/// Why a tokenize call ran out of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
	/// The per-call match attempt budget was spent.
	Attempts,
	/// The per-call wall-clock deadline passed.
	Deadline,
	/// A single pattern exceeded its backtracking limit.
	Backtracking,
}

impl std::fmt::Display for TimeoutCause {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Attempts => write!(f, "attempt budget"),
			Self::Deadline => write!(f, "deadline"),
			Self::Backtracking => write!(f, "backtrack limit"),
		}
	}
}

/// Errors that abort a tokenize call.
///
/// Both variants are recoverable: callers may retry with a larger budget or
/// fall back to treating the text as plain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
	/// A pattern could not finish within the configured budget.
	#[error("pattern timeout in `{token_type}` after {attempts} attempts ({cause})")]
	PatternTimeout {
		token_type: String,
		attempts: u64,
		cause: TimeoutCause,
	},
	/// Nested `inside` grammars recursed deeper than allowed.
	#[error("grammar nesting exceeded {limit} levels")]
	DepthExceeded { limit: usize },
}

/// Invalid tokenizer configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("invalid tokenize options: {0}")]
	Parse(#[from] toml::de::Error),
}
