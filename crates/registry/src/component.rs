//! Language components: a grammar source plus the ids it depends on.

use std::fmt;
use std::sync::Arc;

use hue_grammar::Grammar;
use rustc_hash::FxHashMap;

use crate::error::BuildError;

/// Builds a component's grammar from its loaded dependencies.
pub type Factory = Arc<dyn Fn(&Context<'_>) -> Result<Grammar, BuildError> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Source {
	Static(Arc<Grammar>),
	Factory(Factory),
}

/// A named language definition.
///
/// ```ignore
/// Component::new("firestore-security-rules")
/// 	.require("clike")
/// 	.factory(|cx| {
/// 		let grammar = cx.extend("clike", overrides)?.without("class-name");
/// 		Ok(grammar.insert_before("keyword", paths)?)
/// 	})
/// ```
#[derive(Clone)]
pub struct Component {
	id: String,
	aliases: Vec<String>,
	require: Vec<String>,
	optional: Vec<String>,
	pub(crate) source: Source,
	embedded_in: Option<String>,
	inline_into: Vec<(String, String)>,
}

impl Component {
	/// A component with an empty grammar.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			aliases: Vec::new(),
			require: Vec::new(),
			optional: Vec::new(),
			source: Source::Static(Arc::new(Grammar::new())),
			embedded_in: None,
			inline_into: Vec::new(),
		}
	}

	pub fn alias(mut self, alias: impl Into<String>) -> Self {
		self.aliases.push(alias.into());
		self
	}

	/// Declares a dependency that must be registered and is loaded first.
	pub fn require(mut self, id: impl Into<String>) -> Self {
		let id = id.into();
		if !self.require.contains(&id) {
			self.require.push(id);
		}
		self
	}

	/// Declares a dependency that is loaded first when registered and skipped
	/// otherwise.
	pub fn optional(mut self, id: impl Into<String>) -> Self {
		let id = id.into();
		if !self.optional.contains(&id) {
			self.optional.push(id);
		}
		self
	}

	pub fn grammar(mut self, grammar: Grammar) -> Self {
		self.source = Source::Static(Arc::new(grammar));
		self
	}

	/// Builds the grammar lazily, on first lookup.
	pub fn factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&Context<'_>) -> Result<Grammar, BuildError> + Send + Sync + 'static,
	{
		self.source = Source::Factory(Arc::new(factory));
		self
	}

	/// Marks this component's grammar as a template language whose remaining
	/// text is tokenized by `host`. Implies `require(host)`.
	pub fn embedded_in(mut self, host: impl Into<String>) -> Self {
		let host = host.into();
		self = self.require(host.clone());
		self.embedded_in = Some(host);
		self
	}

	/// Hands the body of `<tag>` elements in `host` to this component.
	///
	/// The host picks the patch up when it is built; no dependency is added
	/// in either direction.
	pub fn inline_into(mut self, host: impl Into<String>, tag: impl Into<String>) -> Self {
		self.inline_into.push((host.into(), tag.into()));
		self
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn aliases(&self) -> &[String] {
		&self.aliases
	}

	pub fn requires(&self) -> &[String] {
		&self.require
	}

	pub fn optionals(&self) -> &[String] {
		&self.optional
	}

	pub fn embedding_host(&self) -> Option<&str> {
		self.embedded_in.as_deref()
	}

	/// `(host, tag)` pairs this component embeds into.
	pub fn inline_targets(&self) -> &[(String, String)] {
		&self.inline_into
	}

	/// Required then optional dependencies, in declaration order.
	pub(crate) fn dependencies(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
		self.require
			.iter()
			.map(|d| (d.as_str(), true))
			.chain(self.optional.iter().map(|d| (d.as_str(), false)))
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("id", &self.id)
			.field("aliases", &self.aliases)
			.field("require", &self.require)
			.field("optional", &self.optional)
			.field(
				"source",
				&match self.source {
					Source::Static(_) => "static",
					Source::Factory(_) => "factory",
				},
			)
			.field("embedded_in", &self.embedded_in)
			.field("inline_into", &self.inline_into)
			.finish()
	}
}

/// What a factory sees while its component is being built.
///
/// Only the component's declared dependencies are reachable, under the
/// names they were declared with and under their canonical ids.
pub struct Context<'a> {
	pub(crate) id: &'a str,
	pub(crate) deps: &'a FxHashMap<String, Arc<Grammar>>,
}

impl Context<'_> {
	/// Id of the component being built.
	pub fn id(&self) -> &str {
		self.id
	}

	/// A loaded dependency, or `None` when it is undeclared or an optional
	/// dependency that is not registered.
	pub fn language(&self, id: &str) -> Option<Arc<Grammar>> {
		self.deps.get(id).cloned()
	}

	pub fn require(&self, id: &str) -> Result<Arc<Grammar>, BuildError> {
		self.language(id)
			.ok_or_else(|| BuildError::MissingDependency(id.to_string()))
	}

	/// `base_id`'s grammar with `overrides` applied.
	pub fn extend(&self, base_id: &str, overrides: Grammar) -> Result<Grammar, BuildError> {
		Ok(self.require(base_id)?.extend(overrides))
	}

	/// A copy of `target_id`'s grammar with `entries` spliced before `anchor`.
	pub fn insert_before(&self, target_id: &str, anchor: &str, entries: Grammar) -> Result<Grammar, BuildError> {
		Ok(self.require(target_id)?.insert_before(anchor, entries)?)
	}
}
