//! Grammar composition.
//!
//! Every operation here returns a new [`Grammar`] and leaves its input
//! untouched. Nested inline grammars are shared through `Arc` and copied on
//! write, so consumers of the original never observe a change.

use std::fmt;
use std::sync::Arc;

use crate::error::ComposeError;
use crate::grammar::{Grammar, Inside};

/// One step of a path into nested grammars: the `inside` of rule `index`
/// under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
	pub key: String,
	pub index: usize,
}

impl PathSegment {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			index: 0,
		}
	}

	/// Selects the `index`-th alternative rule under the key.
	pub fn nth(mut self, index: usize) -> Self {
		self.index = index;
		self
	}
}

impl From<&str> for PathSegment {
	fn from(key: &str) -> Self {
		Self::new(key)
	}
}

impl fmt::Display for PathSegment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.index == 0 {
			write!(f, "{}", self.key)
		} else {
			write!(f, "{}[{}]", self.key, self.index)
		}
	}
}

fn display_path(path: &[PathSegment]) -> String {
	path.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(".")
}

impl Grammar {
	/// Copies `self` and applies `overrides`.
	///
	/// Keys already present are replaced at their current position; new keys
	/// are appended in the order `overrides` lists them.
	pub fn extend(&self, overrides: Grammar) -> Grammar {
		let mut out = self.clone();
		for (key, rules) in overrides.iter() {
			out.insert(key.clone(), rules.clone());
		}
		if let Some(rest) = overrides.rest() {
			out.set_rest(Some(rest.clone()));
		}
		if let Some(embedding) = overrides.embedding() {
			out.set_embedding(Some(embedding.clone()));
		}
		out
	}

	/// Copies `self` with `entries` spliced in immediately before `anchor`.
	///
	/// A key of `entries` that already exists elsewhere is moved rather than
	/// duplicated, so dependents can re-prioritize inherited rules.
	pub fn insert_before(&self, anchor: &str, entries: Grammar) -> Result<Grammar, ComposeError> {
		if !self.contains(anchor) {
			return Err(ComposeError::InvalidAnchor {
				anchor: anchor.to_string(),
			});
		}

		let mut out = Grammar::new();
		for (key, rules) in self.iter() {
			if key == anchor {
				for (new_key, new_rules) in entries.iter() {
					out.insert(new_key.clone(), new_rules.clone());
				}
			}
			if !entries.contains(key) {
				out.insert(key.clone(), rules.clone());
			}
		}
		out.set_rest(self.rest().cloned());
		out.set_embedding(self.embedding().cloned());
		Ok(out)
	}

	/// [`insert_before`](Self::insert_before) applied to the inline grammar at
	/// `path`.
	pub fn insert_before_in(
		&self,
		path: &[PathSegment],
		anchor: &str,
		entries: Grammar,
	) -> Result<Grammar, ComposeError> {
		self.update_in(path, |nested| nested.insert_before(anchor, entries))
	}

	/// Copies `self` without `token_type`.
	pub fn without(&self, token_type: &str) -> Grammar {
		let mut out = self.clone();
		out.remove(token_type);
		out
	}

	/// Replaces the inline grammar at `path` with `f(grammar)`.
	///
	/// An empty path applies `f` to `self`. Every grammar on the way down is
	/// copied; anything not on the path stays shared with the original.
	pub fn update_in<F>(&self, path: &[PathSegment], f: F) -> Result<Grammar, ComposeError>
	where
		F: FnOnce(&Grammar) -> Result<Grammar, ComposeError>,
	{
		let Some((head, tail)) = path.split_first() else {
			return f(self);
		};

		let invalid = || ComposeError::InvalidPath {
			path: display_path(path),
		};
		let rule = self
			.get(&head.key)
			.and_then(|rules| rules.get(head.index))
			.ok_or_else(invalid)?;
		let Some(Inside::Inline(nested)) = &rule.inside else {
			return Err(invalid());
		};

		let replaced = nested.update_in(tail, f)?;
		let mut out = self.clone();
		if let Some(rules) = out.get_mut(&head.key) {
			rules[head.index].inside = Some(Inside::Inline(Arc::new(replaced)));
		}
		Ok(out)
	}

	/// Looks up the inline grammar at `path`.
	pub fn nested(&self, path: &[PathSegment]) -> Option<&Grammar> {
		let Some((head, tail)) = path.split_first() else {
			return Some(self);
		};
		match &self.get(&head.key)?.get(head.index)?.inside {
			Some(Inside::Inline(nested)) => nested.nested(tail),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests;
