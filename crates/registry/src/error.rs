use hue_grammar::{ComposeError, PatternError, TokenizeError};

/// Errors a component factory can return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
	#[error(transparent)]
	Pattern(#[from] PatternError),

	#[error(transparent)]
	Compose(#[from] ComposeError),

	/// The factory asked for a language it did not declare as a dependency,
	/// or an optional one that is not registered.
	#[error("`{0}` is not an available dependency")]
	MissingDependency(String),
}

/// Registry error, local to a single lookup.
///
/// A failed resolution leaves the caches of unrelated ids untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("unknown language `{0}`")]
	UnknownLanguage(String),

	#[error("`{id}` requires unregistered `{dependency}`")]
	UnknownDependency { id: String, dependency: String },

	/// Load order contains a cycle; the first id is repeated at the end.
	#[error("dependency cycle: {}", cycle.join(" -> "))]
	CyclicDependency { cycle: Vec<String> },

	#[error("failed to build `{id}`: {source}")]
	Build { id: String, source: BuildError },

	#[error(transparent)]
	Tokenize(#[from] TokenizeError),
}
