//! The recursive tokenizer.
//!
//! # Mental model
//!
//! The text starts as one unclassified segment. Token types are tried in
//! grammar order, and each rule of a type in declaration order, against every
//! segment that is still unclassified. A match splits its segment into
//! `before`, the token, and `after`; the remainders stay eligible for every
//! later rule.
//!
//! Greedy rules search the whole text instead of one segment. Their match must
//! begin in unclassified text but may run over tokens committed earlier in
//! the pass. Those tokens are dissolved and the rules before the greedy one
//! are re-run over the affected region (a rematch), stopping at the rule that
//! caused it.
//!
//! # Invariants
//!
//! - The output always concatenates back to the input.
//! - Empty matches never produce a token.
//! - Every regex call is charged against the per-call budget.

mod segments;

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use self::segments::{HEAD, SegId, Segments, TAIL};
use crate::embed;
use crate::error::{TimeoutCause, TokenizeError};
use crate::grammar::{Embedding, Grammar, Inside};
use crate::options::TokenizeOptions;
use crate::pattern::{Hit, Rule};
use crate::token::{Content, Token, TokenStream};

/// Deadline is checked once per this many attempts.
const DEADLINE_STRIDE: u64 = 64;

/// Resolves `Inside::ById` references and embedding hosts.
pub trait GrammarScope {
	fn lookup(&self, id: &str) -> Option<&Grammar>;
}

/// The empty scope: every id reference stays unresolved.
impl GrammarScope for () {
	fn lookup(&self, _id: &str) -> Option<&Grammar> {
		None
	}
}

impl<S: BuildHasher> GrammarScope for HashMap<String, Arc<Grammar>, S> {
	fn lookup(&self, id: &str) -> Option<&Grammar> {
		self.get(id).map(|g| g.as_ref())
	}
}

/// Tokenizes text against grammars, resolving id references through a scope.
#[derive(Clone, Copy)]
pub struct Tokenizer<'s> {
	scope: &'s dyn GrammarScope,
	options: TokenizeOptions,
}

impl Tokenizer<'static> {
	/// A tokenizer with default options and no scope.
	pub fn new() -> Self {
		Self {
			scope: &(),
			options: TokenizeOptions::default(),
		}
	}
}

impl Default for Tokenizer<'static> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'s> Tokenizer<'s> {
	pub fn with_scope(scope: &'s dyn GrammarScope) -> Self {
		Self {
			scope,
			options: TokenizeOptions::default(),
		}
	}

	pub fn with_options(mut self, options: TokenizeOptions) -> Self {
		self.options = options;
		self
	}

	pub fn options(&self) -> &TokenizeOptions {
		&self.options
	}

	pub fn tokenize(&self, text: &str, grammar: &Grammar) -> Result<TokenStream, TokenizeError> {
		Run::new(self.scope, &self.options).tokenize(text, grammar, 0)
	}
}

/// A rematch in progress: which rule triggered it and how far it must scan.
struct Rematch {
	cause: (usize, usize),
	reach: usize,
}

/// State of one tokenize call.
pub(crate) struct Run<'s> {
	scope: &'s dyn GrammarScope,
	max_attempts: Option<u64>,
	deadline: Option<Instant>,
	max_depth: usize,
	attempts: u64,
}

impl<'s> Run<'s> {
	fn new(scope: &'s dyn GrammarScope, options: &TokenizeOptions) -> Self {
		Self {
			scope,
			max_attempts: options.max_attempts,
			deadline: options.deadline.map(|d| Instant::now() + d),
			max_depth: options.max_depth,
			attempts: 0,
		}
	}

	/// Tokenizes `text`, handing it to the embedding bridge when `grammar`
	/// declares a host.
	pub(crate) fn tokenize(
		&mut self,
		text: &str,
		grammar: &Grammar,
		depth: usize,
	) -> Result<TokenStream, TokenizeError> {
		if depth > self.max_depth {
			return Err(TokenizeError::DepthExceeded {
				limit: self.max_depth,
			});
		}
		if let Some(Embedding::Templated { host }) = grammar.embedding() {
			let scope = self.scope;
			match scope.lookup(host) {
				Some(host_grammar) => {
					return embed::tokenize_templated(self, text, grammar, host_grammar, depth);
				}
				None => warn!(host = %host, "embedding host not in scope; tokenizing template only"),
			}
		}
		self.tokenize_plain(text, grammar, depth)
	}

	/// Tokenizes `text` with `grammar` alone, ignoring any embedding.
	pub(crate) fn tokenize_plain(
		&mut self,
		text: &str,
		grammar: &Grammar,
		depth: usize,
	) -> Result<TokenStream, TokenizeError> {
		let scope = self.scope;
		let rest = match grammar.rest() {
			None => None,
			Some(Inside::Inline(rest)) => Some(rest.as_ref()),
			Some(Inside::ById(id)) => {
				let found = scope.lookup(id);
				if found.is_none() {
					warn!(id = %id, "rest grammar not in scope");
				}
				found
			}
		};
		let entries = merged_entries(grammar, rest);

		let mut segs = Segments::new(text.len());
		self.match_grammar(text, &mut segs, &entries, HEAD, 0, None, depth)?;
		Ok(segs.into_stream(text))
	}

	#[allow(clippy::too_many_arguments)]
	fn match_grammar(
		&mut self,
		text: &str,
		segs: &mut Segments,
		entries: &[(&str, &[Rule])],
		start: SegId,
		start_pos: usize,
		mut rematch: Option<&mut Rematch>,
		depth: usize,
	) -> Result<(), TokenizeError> {
		for (ki, &(kind, rules)) in entries.iter().enumerate() {
			for (ri, rule) in rules.iter().enumerate() {
				if let Some(r) = rematch.as_deref()
					&& r.cause == (ki, ri)
				{
					return Ok(());
				}

				let mut node = segs.next(start);
				let mut pos = start_pos;
				while node != TAIL {
					if let Some(r) = rematch.as_deref()
						&& pos >= r.reach
					{
						break;
					}
					// Runaway splitting guard.
					if segs.count() > text.len() {
						return Ok(());
					}
					if segs.is_token(node) {
						pos += segs.len_of(node);
						node = segs.next(node);
						continue;
					}

					let mut remove_count = 1;
					let (from, to, span_end);
					if rule.greedy {
						let Some(hit) = self.find(kind, rule, text, pos)? else {
							break;
						};
						from = hit.start;
						to = hit.end;

						let mut p = pos + segs.len_of(node);
						while from >= p && node != TAIL {
							node = segs.next(node);
							p += segs.len_of(node);
						}
						if node == TAIL {
							break;
						}
						p -= segs.len_of(node);
						pos = p;
						if segs.is_token(node) {
							pos += segs.len_of(node);
							node = segs.next(node);
							continue;
						}

						let mut k = node;
						while k != TAIL && (p < to || !segs.is_token(k)) {
							remove_count += 1;
							p += segs.len_of(k);
							k = segs.next(k);
						}
						remove_count -= 1;
						span_end = p;
					} else {
						let seg_end = pos + segs.len_of(node);
						let Some(hit) = self.find(kind, rule, &text[pos..seg_end], 0)? else {
							pos = seg_end;
							node = segs.next(node);
							continue;
						};
						from = pos + hit.start;
						to = pos + hit.end;
						span_end = seg_end;
					}

					let reach = span_end;
					if let Some(r) = rematch.as_deref_mut()
						&& reach > r.reach
					{
						r.reach = reach;
					}

					let mut remove_from = segs.prev(node);
					if from > pos {
						remove_from = segs.add_after(remove_from, from - pos, None);
						pos = from;
					}
					segs.remove_after(remove_from, remove_count);

					let token = Token {
						kind: kind.to_string(),
						content: self.content(&text[from..to], rule, depth)?,
						alias: rule.alias.clone(),
					};
					node = segs.add_after(remove_from, to - from, Some(token));
					if span_end > to {
						segs.add_after(node, span_end - to, None);
					}

					if remove_count > 1 {
						trace!(token_type = kind, start = from, reach, "greedy match dissolved tokens; rematching");
						let mut nested = Rematch {
							cause: (ki, ri),
							reach,
						};
						let start = segs.prev(node);
						self.match_grammar(text, segs, entries, start, pos, Some(&mut nested), depth)?;
						if let Some(r) = rematch.as_deref_mut()
							&& nested.reach > r.reach
						{
							r.reach = nested.reach;
						}
					}

					pos += segs.len_of(node);
					node = segs.next(node);
				}
			}
		}
		Ok(())
	}

	/// Token content: the matched text, re-tokenized when the rule has `inside`.
	fn content(&mut self, matched: &str, rule: &Rule, depth: usize) -> Result<Content, TokenizeError> {
		let scope = self.scope;
		let grammar = match &rule.inside {
			None => return Ok(Content::Text(matched.to_string())),
			Some(Inside::Inline(grammar)) => grammar.as_ref(),
			Some(Inside::ById(id)) => match scope.lookup(id) {
				Some(grammar) => grammar,
				None => {
					warn!(id = %id, "grammar reference not in scope; leaving token content as text");
					return Ok(Content::Text(matched.to_string()));
				}
			},
		};
		let stream = self.tokenize(matched, grammar, depth + 1)?;
		Ok(Content::simplified(stream))
	}

	/// First non-empty match of `rule` in `hay` at or after `from`.
	///
	/// An empty match resumes the search one character after where it began.
	fn find(&mut self, kind: &str, rule: &Rule, hay: &str, mut from: usize) -> Result<Option<Hit>, TokenizeError> {
		loop {
			self.charge(kind)?;
			let hit = match rule.pattern.find_at(hay, from, rule.lookbehind) {
				Ok(hit) => hit,
				Err(error) => {
					debug!(token_type = kind, pattern = rule.pattern.source(), %error, "match attempt aborted");
					return Err(self.timeout(kind, TimeoutCause::Backtracking));
				}
			};
			match hit {
				None => return Ok(None),
				Some(hit) if hit.end > hit.start => return Ok(Some(hit)),
				Some(hit) => {
					let Some(c) = hay[hit.raw_start..].chars().next() else {
						return Ok(None);
					};
					from = hit.raw_start + c.len_utf8();
				}
			}
		}
	}

	fn charge(&mut self, kind: &str) -> Result<(), TokenizeError> {
		self.attempts += 1;
		if let Some(max) = self.max_attempts
			&& self.attempts > max
		{
			return Err(self.timeout(kind, TimeoutCause::Attempts));
		}
		if let Some(deadline) = self.deadline
			&& self.attempts % DEADLINE_STRIDE == 1
			&& Instant::now() >= deadline
		{
			return Err(self.timeout(kind, TimeoutCause::Deadline));
		}
		Ok(())
	}

	fn timeout(&self, kind: &str, cause: TimeoutCause) -> TokenizeError {
		debug!(token_type = kind, attempts = self.attempts, %cause, "tokenize budget exhausted");
		TokenizeError::PatternTimeout {
			token_type: kind.to_string(),
			attempts: self.attempts,
			cause,
		}
	}
}

/// Grammar entries with `rest` merged in: keys present in both take the rest
/// rules in place, keys only in `rest` follow in its order.
fn merged_entries<'g>(grammar: &'g Grammar, rest: Option<&'g Grammar>) -> Vec<(&'g str, &'g [Rule])> {
	let mut out: Vec<(&str, &[Rule])> = grammar
		.iter()
		.map(|(key, rules)| {
			let rules = rest.and_then(|r| r.get(key)).unwrap_or(rules.as_slice());
			(key.as_str(), rules)
		})
		.collect();
	if let Some(rest) = rest {
		out.extend(
			rest.iter()
				.filter(|(key, _)| !grammar.contains(key))
				.map(|(key, rules)| (key.as_str(), rules.as_slice())),
		);
	}
	out
}

#[cfg(test)]
mod tests;
