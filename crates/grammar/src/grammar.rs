//! Ordered grammars and the references between them.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::{Iter, Keys};

use crate::pattern::Rule;

/// Grammar used to tokenize the text of a matched token.
#[derive(Debug, Clone, PartialEq)]
pub enum Inside {
	/// A grammar owned by the enclosing rule.
	Inline(Arc<Grammar>),
	/// Another component's grammar, bound when the language is resolved.
	ById(String),
}

impl Inside {
	pub fn id(id: impl Into<String>) -> Self {
		Self::ById(id.into())
	}
}

impl From<Grammar> for Inside {
	fn from(grammar: Grammar) -> Self {
		Self::Inline(Arc::new(grammar))
	}
}

impl From<Arc<Grammar>> for Inside {
	fn from(grammar: Arc<Grammar>) -> Self {
		Self::Inline(grammar)
	}
}

/// How a grammar's text is handed to another language before tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embedding {
	/// Template constructs are tokenized by this grammar, everything between
	/// them by `host`.
	Templated { host: String },
}

/// Anything that can stand in for the rule list of one token type.
pub trait IntoRules {
	fn into_rules(self) -> Vec<Rule>;
}

impl IntoRules for Rule {
	fn into_rules(self) -> Vec<Rule> {
		vec![self]
	}
}

impl IntoRules for Vec<Rule> {
	fn into_rules(self) -> Vec<Rule> {
		self
	}
}

impl<const N: usize> IntoRules for [Rule; N] {
	fn into_rules(self) -> Vec<Rule> {
		self.into()
	}
}

/// Ordered mapping from token type to its alternative rules.
///
/// Entry order is priority: the tokenizer tries earlier entries first, and
/// composition keeps that order except where it explicitly splices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
	entries: IndexMap<String, Vec<Rule>>,
	rest: Option<Inside>,
	embedding: Option<Embedding>,
}

impl Grammar {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder form of [`insert`](Self::insert).
	pub fn with(mut self, token_type: impl Into<String>, rules: impl IntoRules) -> Self {
		self.insert(token_type, rules);
		self
	}

	/// Sets the rules for `token_type`.
	///
	/// An existing key keeps its position; a new key goes last.
	pub fn insert(&mut self, token_type: impl Into<String>, rules: impl IntoRules) -> Option<Vec<Rule>> {
		self.entries.insert(token_type.into(), rules.into_rules())
	}

	/// Removes `token_type`, keeping the order of the remaining entries.
	pub fn remove(&mut self, token_type: &str) -> Option<Vec<Rule>> {
		self.entries.shift_remove(token_type)
	}

	pub fn get(&self, token_type: &str) -> Option<&[Rule]> {
		self.entries.get(token_type).map(Vec::as_slice)
	}

	pub fn get_mut(&mut self, token_type: &str) -> Option<&mut Vec<Rule>> {
		self.entries.get_mut(token_type)
	}

	pub fn contains(&self, token_type: &str) -> bool {
		self.entries.contains_key(token_type)
	}

	pub fn position(&self, token_type: &str) -> Option<usize> {
		self.entries.get_index_of(token_type)
	}

	pub fn keys(&self) -> Keys<'_, String, Vec<Rule>> {
		self.entries.keys()
	}

	pub fn iter(&self) -> Iter<'_, String, Vec<Rule>> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Grammar whose entries are merged in (with `extend` semantics) at
	/// tokenize time. Lets a nested grammar recurse into its own language.
	pub fn rest(&self) -> Option<&Inside> {
		self.rest.as_ref()
	}

	pub fn with_rest(mut self, rest: impl Into<Inside>) -> Self {
		self.rest = Some(rest.into());
		self
	}

	pub fn set_rest(&mut self, rest: Option<Inside>) {
		self.rest = rest;
	}

	pub fn embedding(&self) -> Option<&Embedding> {
		self.embedding.as_ref()
	}

	pub fn with_embedding(mut self, embedding: Embedding) -> Self {
		self.embedding = Some(embedding);
		self
	}

	pub fn set_embedding(&mut self, embedding: Option<Embedding>) {
		self.embedding = embedding;
	}

	/// Every component id this grammar refers to, nested inline grammars
	/// included, in first-seen order without duplicates.
	pub fn references(&self) -> Vec<&str> {
		let mut out = Vec::new();
		self.collect_references(&mut out);
		out
	}

	fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
		fn push<'a>(id: &'a str, out: &mut Vec<&'a str>) {
			if !out.contains(&id) {
				out.push(id);
			}
		}
		if let Some(Embedding::Templated { host }) = &self.embedding {
			push(host, out);
		}
		match &self.rest {
			Some(Inside::ById(id)) => push(id, out),
			Some(Inside::Inline(g)) => g.collect_references(out),
			None => {}
		}
		for rule in self.entries.values().flatten() {
			match &rule.inside {
				Some(Inside::ById(id)) => push(id, out),
				Some(Inside::Inline(g)) => g.collect_references(out),
				None => {}
			}
		}
	}
}

impl<'a> IntoIterator for &'a Grammar {
	type Item = (&'a String, &'a Vec<Rule>);
	type IntoIter = Iter<'a, String, Vec<Rule>>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

impl<K: Into<String>, R: IntoRules> FromIterator<(K, R)> for Grammar {
	fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
		let mut grammar = Grammar::new();
		for (k, r) in iter {
			grammar.insert(k, r);
		}
		grammar
	}
}
