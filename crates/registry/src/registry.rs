//! Component registry with lazy grammar materialization.
//!
//! # Purpose
//!
//! Own the canonical grammar of every registered language, build it on first
//! use from its dependencies, and hand out immutable snapshots.
//!
//! # Mental model
//!
//! * Registration only stores a [`Component`]; nothing is built.
//! * A grammar lookup computes the dependency-first load order of the id,
//!   then builds every missing grammar in that order. Each factory sees only
//!   its declared dependencies through a [`Context`].
//! * Resolving a [`Language`] additionally binds every id the grammar refers
//!   to (`inside` references, `rest` links, embedding hosts), transitively.
//!   Reference cycles are fine there; only load-order cycles are errors.
//!
//! # Invariants
//!
//! * Cached grammars are never mutated; composition always copies.
//! * Re-registering an id drops every cached grammar built from it and every
//!   language that bound it.
//! * A failed lookup leaves unrelated cache entries untouched.
//!
//! # Concurrency & ordering
//!
//! * State lives behind one `RwLock`. Cache hits take the read lock;
//!   registration and cache misses take the write lock.
//! * Load order is deterministic: required dependencies, then optional ones,
//!   each in declaration order.
//! * Inline-tag contributors are applied to their host sorted by id.

use std::sync::Arc;

use hue_grammar::{Embedding, Grammar, TokenStream, TokenizeOptions, Tokenizer, embed};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

use crate::component::{Component, Context, Source};
use crate::error::{BuildError, RegistryError};
use crate::language::{Language, Scope};

/// Key inline-tag rules are spliced in front of.
const INLINE_ANCHOR: &str = "cdata";

/// Registry of language components.
///
/// Shareable across threads; every method takes `&self`.
#[derive(Debug, Default)]
pub struct Registry {
	state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
	components: FxHashMap<String, Component>,
	/// Alias to canonical id.
	aliases: FxHashMap<String, String>,
	grammars: FxHashMap<String, Arc<Grammar>>,
	languages: FxHashMap<String, Language>,
	options: TokenizeOptions,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry whose languages tokenize under `options`.
	pub fn with_options(options: TokenizeOptions) -> Self {
		Self {
			state: RwLock::new(State {
				options,
				..State::default()
			}),
		}
	}

	pub fn options(&self) -> TokenizeOptions {
		self.state.read().options
	}

	/// Changes the options of languages resolved from now on.
	pub fn set_options(&self, options: TokenizeOptions) {
		let mut state = self.state.write();
		state.options = options;
		state.languages.clear();
	}

	/// Stores `component`, replacing any previous definition of its id, and
	/// invalidates everything built from it.
	pub fn register(&self, component: Component) {
		self.state.write().register(component);
	}

	/// True when `id` names a registered component or alias.
	pub fn contains(&self, id: &str) -> bool {
		self.state.read().canonical(id).is_some()
	}

	/// The id `id` refers to, following aliases.
	pub fn canonical_id(&self, id: &str) -> Option<String> {
		self.state.read().canonical(id).map(str::to_string)
	}

	/// Registered component ids, sorted.
	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.state.read().components.keys().cloned().collect();
		ids.sort_unstable();
		ids
	}

	pub fn component(&self, id: &str) -> Option<Component> {
		let state = self.state.read();
		state.canonical(id).and_then(|id| state.components.get(id)).cloned()
	}

	/// The materialized grammar of `id`, building it and its dependencies if
	/// needed.
	pub fn grammar(&self, id: &str) -> Result<Arc<Grammar>, RegistryError> {
		{
			let state = self.state.read();
			if let Some(canonical) = state.canonical(id)
				&& let Some(grammar) = state.grammars.get(canonical)
			{
				return Ok(grammar.clone());
			}
		}
		let mut state = self.state.write();
		let canonical = state.require_canonical(id)?;
		state.grammar(&canonical)
	}

	/// The resolved language of `id`.
	pub fn resolve(&self, id: &str) -> Result<Language, RegistryError> {
		{
			let state = self.state.read();
			if let Some(canonical) = state.canonical(id)
				&& let Some(language) = state.languages.get(canonical)
			{
				return Ok(language.clone());
			}
		}
		let mut state = self.state.write();
		let canonical = state.require_canonical(id)?;
		state.resolve(&canonical)
	}

	/// Dependency-first order of the closure of `ids` (required and registered
	/// optional dependencies), without building anything.
	pub fn load_order(&self, ids: &[&str]) -> Result<Vec<String>, RegistryError> {
		self.state.read().load_order(ids)
	}

	/// Tokenizes `text` as language `id`.
	pub fn tokenize(&self, text: &str, id: &str) -> Result<TokenStream, RegistryError> {
		Ok(self.resolve(id)?.tokenize(text)?)
	}

	/// Tokenizes `text` with an ad-hoc grammar, binding its id references
	/// against this registry.
	pub fn tokenize_grammar(&self, text: &str, grammar: &Grammar) -> Result<TokenStream, RegistryError> {
		let (scope, options) = {
			let mut state = self.state.write();
			let mut scope = Scope::default();
			state.bind(grammar, &mut scope)?;
			(scope, state.options)
		};
		Ok(Tokenizer::with_scope(&scope)
			.with_options(options)
			.tokenize(text, grammar)?)
	}
}

impl State {
	fn canonical<'a>(&'a self, id: &'a str) -> Option<&'a str> {
		if self.components.contains_key(id) {
			Some(id)
		} else {
			self.aliases.get(id).map(String::as_str)
		}
	}

	fn require_canonical(&self, id: &str) -> Result<String, RegistryError> {
		self.canonical(id)
			.map(str::to_string)
			.ok_or_else(|| RegistryError::UnknownLanguage(id.to_string()))
	}

	fn register(&mut self, component: Component) {
		let id = component.id().to_string();
		let aliases = component.aliases().to_vec();
		let previous = self.components.insert(id.clone(), component);

		self.aliases.retain(|_, target| *target != id);
		for alias in aliases {
			if let Some(other) = self.aliases.insert(alias.clone(), id.clone())
				&& other != id
			{
				warn!(alias = %alias, previous = %other, id = %id, "alias reassigned");
			}
		}

		let mut seeds = vec![id.clone()];
		if let Some(previous) = previous {
			seeds.extend(previous.inline_targets().iter().map(|(host, _)| host.clone()));
		}
		self.invalidate(seeds);
		debug!(id = %id, "component registered");
	}

	/// Drops cached grammars built from any of `seeds` and languages that
	/// bound one of them.
	fn invalidate(&mut self, seeds: Vec<String>) {
		let mut dirty: FxHashSet<String> = FxHashSet::default();
		let mut pending = seeds;
		while let Some(next) = pending.pop() {
			let next = self.canonical(&next).map(str::to_string).unwrap_or(next);
			if !dirty.insert(next.clone()) {
				continue;
			}
			for component in self.components.values() {
				if component
					.dependencies()
					.any(|(dep, _)| self.canonical(dep) == Some(next.as_str()))
				{
					pending.push(component.id().to_string());
				}
			}
			if let Some(component) = self.components.get(&next) {
				pending.extend(component.inline_targets().iter().map(|(host, _)| host.clone()));
			}
		}

		let before = self.grammars.len();
		self.grammars.retain(|id, _| !dirty.contains(id));
		let stale: Vec<String> = self
			.languages
			.iter()
			.filter(|(_, language)| {
				language
					.scope_ids()
					.any(|bound| dirty.contains(bound) || self.canonical(bound).is_some_and(|c| dirty.contains(c)))
			})
			.map(|(id, _)| id.clone())
			.collect();
		for id in &stale {
			self.languages.remove(id);
		}
		if before != self.grammars.len() || !stale.is_empty() {
			debug!(
				grammars = before - self.grammars.len(),
				languages = stale.len(),
				"invalidated cached builds"
			);
		}
	}

	fn load_order(&self, ids: &[&str]) -> Result<Vec<String>, RegistryError> {
		let mut order = Vec::new();
		let mut done = FxHashSet::default();
		let mut stack = Vec::new();
		for id in ids {
			let id = self
				.canonical(id)
				.ok_or_else(|| RegistryError::UnknownLanguage(id.to_string()))?;
			self.visit(id, &mut stack, &mut done, &mut order)?;
		}
		Ok(order)
	}

	fn visit(
		&self,
		id: &str,
		stack: &mut Vec<String>,
		done: &mut FxHashSet<String>,
		order: &mut Vec<String>,
	) -> Result<(), RegistryError> {
		if done.contains(id) {
			return Ok(());
		}
		if let Some(at) = stack.iter().position(|s| s == id) {
			let mut cycle = stack[at..].to_vec();
			cycle.push(id.to_string());
			return Err(RegistryError::CyclicDependency { cycle });
		}
		let component = self
			.components
			.get(id)
			.ok_or_else(|| RegistryError::UnknownLanguage(id.to_string()))?;

		stack.push(id.to_string());
		for (dep, required) in component.dependencies() {
			match self.canonical(dep) {
				Some(dep_id) => self.visit(dep_id, stack, done, order)?,
				None if required => {
					return Err(RegistryError::UnknownDependency {
						id: id.to_string(),
						dependency: dep.to_string(),
					});
				}
				None => trace!(id, dependency = dep, "optional dependency not registered"),
			}
		}
		stack.pop();

		done.insert(id.to_string());
		order.push(id.to_string());
		Ok(())
	}

	fn grammar(&mut self, id: &str) -> Result<Arc<Grammar>, RegistryError> {
		if let Some(grammar) = self.grammars.get(id) {
			return Ok(grammar.clone());
		}
		for dep in self.load_order(&[id])? {
			if !self.grammars.contains_key(&dep) {
				self.build(&dep)?;
			}
		}
		self.grammars
			.get(id)
			.cloned()
			.ok_or_else(|| RegistryError::UnknownLanguage(id.to_string()))
	}

	/// Builds `id`, whose dependencies must already be cached.
	fn build(&mut self, id: &str) -> Result<(), RegistryError> {
		let component = self
			.components
			.get(id)
			.cloned()
			.ok_or_else(|| RegistryError::UnknownLanguage(id.to_string()))?;
		let failed = |source: BuildError| RegistryError::Build {
			id: id.to_string(),
			source,
		};

		let mut deps = FxHashMap::default();
		for (dep, _) in component.dependencies() {
			if let Some(dep_id) = self.canonical(dep)
				&& let Some(grammar) = self.grammars.get(dep_id)
			{
				deps.insert(dep.to_string(), grammar.clone());
				deps.insert(dep_id.to_string(), grammar.clone());
			}
		}

		let mut grammar = match &component.source {
			Source::Static(grammar) => grammar.as_ref().clone(),
			Source::Factory(factory) => factory(&Context { id, deps: &deps }).map_err(failed)?,
		};

		if let Some(host) = component.embedding_host() {
			let host = self.canonical(host).unwrap_or(host).to_string();
			grammar.set_embedding(Some(Embedding::Templated { host }));
		}
		for (contributor, tag) in self.inline_contributors(id) {
			let entries = embed::inline_tag(&tag, &contributor).map_err(|e| failed(e.into()))?;
			grammar = grammar
				.insert_before(INLINE_ANCHOR, entries)
				.map_err(|e| failed(e.into()))?;
			trace!(host = id, contributor = %contributor, tag = %tag, "inline embedding applied");
		}

		debug!(id, entries = grammar.len(), "grammar built");
		self.grammars.insert(id.to_string(), Arc::new(grammar));
		Ok(())
	}

	/// `(contributor id, tag)` for every component that embeds into `host`,
	/// sorted by contributor id.
	fn inline_contributors(&self, host: &str) -> Vec<(String, String)> {
		let mut out = Vec::new();
		for component in self.components.values() {
			for (target, tag) in component.inline_targets() {
				if self.canonical(target) == Some(host) {
					out.push((component.id().to_string(), tag.clone()));
				}
			}
		}
		out.sort();
		out
	}

	fn resolve(&mut self, id: &str) -> Result<Language, RegistryError> {
		if let Some(language) = self.languages.get(id) {
			return Ok(language.clone());
		}
		let root = self.grammar(id)?;
		let mut scope = Scope::default();
		scope.insert(id.to_string(), root.clone());
		self.bind(&root, &mut scope)?;

		let language = Language::new(id, root, scope, self.options);
		debug!(id, bound = ?language.bound_ids(), "language resolved");
		self.languages.insert(id.to_string(), language.clone());
		Ok(language)
	}

	/// Adds every grammar reachable by id from `grammar` to `scope`.
	fn bind(&mut self, grammar: &Grammar, scope: &mut Scope) -> Result<(), RegistryError> {
		let mut pending: Vec<String> = grammar.references().into_iter().map(str::to_string).collect();
		while let Some(name) = pending.pop() {
			if scope.contains_key(&name) {
				continue;
			}
			let Some(dep_id) = self.canonical(&name).map(str::to_string) else {
				warn!(reference = %name, "reference to unregistered language left unbound");
				continue;
			};
			let bound = self.grammar(&dep_id)?;
			pending.extend(bound.references().into_iter().map(str::to_string));
			if dep_id != name {
				scope.insert(dep_id, bound.clone());
			}
			scope.insert(name, bound);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
