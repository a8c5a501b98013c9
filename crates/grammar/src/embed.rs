//! Embedding one language's tokens inside another's.
//!
//! Two forms are supported:
//!
//! - **Templated**: a grammar carrying [`Embedding::Templated`] recognises
//!   template constructs (`<% %>`, `{{ }}`, ...). Those are tokenized first
//!   and swapped for placeholders, the host tokenizes what remains, and the
//!   template tokens are put back where the placeholders ended up.
//! - **Inline tag**: [`inline_tag`] builds the rule a host splices in so that
//!   the body of an element such as `<style>` is tokenized by another
//!   language.
//!
//! [`Embedding::Templated`]: crate::Embedding::Templated

use tracing::warn;

use crate::error::{PatternError, TokenizeError};
use crate::grammar::{Grammar, Inside};
use crate::pattern::Rule;
use crate::token::{Content, Node, Token, TokenStream};
use crate::tokenize::Run;

/// Placeholder text standing in for the `n`-th template token.
pub fn placeholder(n: usize) -> String {
	format!("___PLACEHOLDER_{n}___")
}

pub(crate) fn tokenize_templated(
	run: &mut Run<'_>,
	text: &str,
	template: &Grammar,
	host: &Grammar,
	depth: usize,
) -> Result<TokenStream, TokenizeError> {
	let template_stream = run.tokenize_plain(text, template, depth)?;
	if template_stream.tokens().next().is_none() {
		return run.tokenize(text, host, depth + 1);
	}

	let Some((host_text, mut slots)) = substitute(text, &template_stream) else {
		warn!("no unambiguous placeholder names; using template tokens only");
		return Ok(template_stream);
	};

	let host_stream = run.tokenize(&host_text, host, depth + 1)?;
	let restored = slots.restore_stream(host_stream);
	if slots.next < slots.names.len() {
		warn!(
			placeholders = slots.names.len(),
			restored = slots.next,
			"host grammar split a template placeholder; using template tokens only"
		);
		return Ok(template_stream);
	}
	if restored.text() != text {
		warn!("restored stream does not reproduce the input; using template tokens only");
		return Ok(template_stream);
	}
	Ok(restored)
}

/// Rounds of fresh placeholder names tried before giving up on the host.
const SUBSTITUTE_ATTEMPTS: usize = 16;

/// Swaps every template token for a placeholder name.
///
/// Each name occurs exactly once in the returned host text, at the spot of
/// its token. Input text ending in a partial placeholder can otherwise spell
/// out a name together with the placeholder that follows it.
fn substitute(text: &str, template_stream: &TokenStream) -> Option<(String, Slots)> {
	let mut counter = 0;
	for _ in 0..SUBSTITUTE_ATTEMPTS {
		let mut slots = Slots::default();
		let mut offsets = Vec::new();
		let mut host_text = String::with_capacity(text.len());
		for node in template_stream {
			match node {
				Node::Text(plain) => host_text.push_str(plain),
				Node::Token(token) => {
					let name = loop {
						let name = placeholder(counter);
						counter += 1;
						if !text.contains(&name) {
							break name;
						}
					};
					offsets.push(host_text.len());
					host_text.push_str(&name);
					slots.names.push(name);
					slots.tokens.push(Some(token.clone()));
				}
			}
		}

		if slots
			.names
			.iter()
			.zip(&offsets)
			.all(|(name, &at)| occurs_only_at(&host_text, name, at))
		{
			return Some((host_text, slots));
		}
	}
	None
}

/// `needle` starts at `at` and nowhere else, overlapping matches included.
fn occurs_only_at(haystack: &str, needle: &str, at: usize) -> bool {
	haystack.find(needle) == Some(at) && !haystack[at + 1..].contains(needle)
}

/// Template tokens waiting to be put back, in document order.
#[derive(Default)]
struct Slots {
	names: Vec<String>,
	tokens: Vec<Option<Token>>,
	next: usize,
}

impl Slots {
	fn restore_stream(&mut self, stream: TokenStream) -> TokenStream {
		let mut out = TokenStream::new();
		for node in stream {
			match node {
				Node::Text(text) => self.restore_text(&text, &mut out),
				Node::Token(mut token) => {
					token.content = self.restore_content(token.content);
					out.push(Node::Token(token));
				}
			}
		}
		out
	}

	fn restore_content(&mut self, content: Content) -> Content {
		match content {
			Content::Text(text) => {
				let mut out = TokenStream::new();
				self.restore_text(&text, &mut out);
				Content::simplified(out)
			}
			Content::Stream(stream) => Content::Stream(self.restore_stream(stream)),
		}
	}

	fn restore_text(&mut self, mut text: &str, out: &mut TokenStream) {
		while let Some(name) = self.names.get(self.next)
			&& let Some(at) = text.find(name.as_str())
		{
			out.push_text(&text[..at]);
			if let Some(token) = self.tokens[self.next].take() {
				out.push(Node::Token(token));
			}
			text = &text[at + name.len()..];
			self.next += 1;
		}
		out.push_text(text);
	}
}

/// The grammar entry a host splices in (before its `cdata` entry) to hand the
/// body of `<tag>` elements to `language`.
///
/// The rule is greedy and case-insensitive. CDATA sections in the body are
/// kept as `included-cdata` tokens whose payload is tokenized by the embedded
/// language as well.
pub fn inline_tag(tag: &str, language: &str) -> Result<Grammar, PatternError> {
	let escaped = fancy_regex::escape(tag);
	let body = format!(
		r"(<{escaped}[^>]*>)(?:<!\[CDATA\[(?:[^\]]|\](?!\]>))*\]\]>|(?!<!\[CDATA\[)[\s\S])*?(?=</{escaped}>)"
	);
	let key = format!("language-{language}");

	let included = Grammar::new()
		.with(
			key.clone(),
			Rule::nocase(r"(^<!\[CDATA\[)[\s\S]+?(?=\]\]>$)")?
				.lookbehind()
				.inside(Inside::id(language)),
		)
		.with("cdata", Rule::nocase(r"^<!\[CDATA\[|\]\]>$")?);
	let inside = Grammar::new()
		.with(
			"included-cdata",
			Rule::nocase(r"<!\[CDATA\[[\s\S]*?\]\]>")?.inside(included),
		)
		.with(key, Rule::new(r"[\s\S]+")?.inside(Inside::id(language)));

	Ok(Grammar::new().with(
		tag,
		Rule::nocase(&body)?.lookbehind().greedy().inside(inside),
	))
}
