//! Resolved languages: a grammar plus everything it refers to by id.

use std::sync::Arc;

use hue_grammar::{Grammar, GrammarScope, TokenStream, TokenizeError, TokenizeOptions, Tokenizer};
use rustc_hash::FxHashMap;

/// Grammars reachable from a language, keyed by the id each reference uses.
pub(crate) type Scope = FxHashMap<String, Arc<Grammar>>;

/// An immutable, resolved language.
///
/// Every `ById` reference, `rest` link, and embedding host reachable from the
/// root grammar was bound when the language was resolved, so tokenizing never
/// goes back to the registry. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Language {
	id: Arc<str>,
	grammar: Arc<Grammar>,
	scope: Arc<Scope>,
	options: TokenizeOptions,
}

impl Language {
	pub(crate) fn new(id: &str, grammar: Arc<Grammar>, scope: Scope, options: TokenizeOptions) -> Self {
		Self {
			id: id.into(),
			grammar,
			scope: Arc::new(scope),
			options,
		}
	}

	/// Canonical id of the root component.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn grammar(&self) -> &Arc<Grammar> {
		&self.grammar
	}

	pub fn options(&self) -> &TokenizeOptions {
		&self.options
	}

	/// True when `id` was bound while resolving this language.
	pub fn binds(&self, id: &str) -> bool {
		self.scope.contains_key(id)
	}

	/// Bound reference ids, sorted.
	pub fn bound_ids(&self) -> Vec<&str> {
		let mut ids: Vec<&str> = self.scope.keys().map(String::as_str).collect();
		ids.sort_unstable();
		ids
	}

	pub fn tokenizer(&self) -> Tokenizer<'_> {
		Tokenizer::with_scope(self.scope.as_ref()).with_options(self.options)
	}

	pub fn tokenize(&self, text: &str) -> Result<TokenStream, TokenizeError> {
		self.tokenizer().tokenize(text, &self.grammar)
	}

	/// Tokenizes under different limits than the registry's.
	pub fn tokenize_with(&self, text: &str, options: TokenizeOptions) -> Result<TokenStream, TokenizeError> {
		self.tokenizer().with_options(options).tokenize(text, &self.grammar)
	}

	pub(crate) fn scope_ids(&self) -> impl Iterator<Item = &str> + '_ {
		self.scope.keys().map(String::as_str)
	}
}

impl GrammarScope for Language {
	fn lookup(&self, id: &str) -> Option<&Grammar> {
		self.scope.lookup(id)
	}
}
