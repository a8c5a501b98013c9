//! Token trees: the output of the tokenizer.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::pattern::Aliases;

/// A classified span of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
	/// Token type, i.e. the grammar key that produced it.
	#[serde(rename = "type")]
	pub kind: String,
	pub content: Content,
	#[serde(skip_serializing_if = "Aliases::is_empty")]
	pub alias: Aliases,
}

/// Body of a token: raw text, or the nested tree of an `inside` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
	Text(String),
	Stream(TokenStream),
}

/// One element of a [`TokenStream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
	Text(String),
	Token(Token),
}

/// Ordered text and tokens that concatenate back to the tokenized input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenStream(Vec<Node>);

impl Token {
	pub fn new(kind: impl Into<String>, content: Content) -> Self {
		Self {
			kind: kind.into(),
			content,
			alias: Aliases::new(),
		}
	}

	/// True when the token's type or one of its aliases is `name`.
	pub fn is(&self, name: &str) -> bool {
		self.kind == name || self.alias.iter().any(|a| a == name)
	}

	/// Source text covered by the token.
	pub fn text(&self) -> String {
		self.content.text()
	}

	fn write_text(&self, out: &mut String) {
		self.content.write_text(out);
	}
}

impl Content {
	pub fn text(&self) -> String {
		let mut out = String::new();
		self.write_text(&mut out);
		out
	}

	fn write_text(&self, out: &mut String) {
		match self {
			Self::Text(text) => out.push_str(text),
			Self::Stream(stream) => stream.write_text(out),
		}
	}

	/// Nested stream, if the token was re-tokenized.
	pub fn as_stream(&self) -> Option<&TokenStream> {
		match self {
			Self::Stream(stream) => Some(stream),
			Self::Text(_) => None,
		}
	}

	/// Collapses a stream holding a single text leaf into plain text.
	pub(crate) fn simplified(stream: TokenStream) -> Self {
		let mut nodes = stream.0;
		if nodes.is_empty() {
			return Self::Text(String::new());
		}
		if nodes.len() == 1
			&& matches!(nodes[0], Node::Text(_))
			&& let Some(Node::Text(text)) = nodes.pop()
		{
			return Self::Text(text);
		}
		Self::Stream(TokenStream(nodes))
	}
}

impl Node {
	pub fn text(&self) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::Token(token) => token.text(),
		}
	}

	pub fn as_token(&self) -> Option<&Token> {
		match self {
			Self::Token(token) => Some(token),
			Self::Text(_) => None,
		}
	}
}

impl TokenStream {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a node, merging it into a preceding text node when both are text.
	pub fn push(&mut self, node: Node) {
		match (self.0.last_mut(), node) {
			(_, Node::Text(text)) if text.is_empty() => {}
			(Some(Node::Text(last)), Node::Text(text)) => last.push_str(&text),
			(_, node) => self.0.push(node),
		}
	}

	pub fn push_text(&mut self, text: &str) {
		if text.is_empty() {
			return;
		}
		match self.0.last_mut() {
			Some(Node::Text(last)) => last.push_str(text),
			_ => self.0.push(Node::Text(text.to_string())),
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.0
	}

	pub fn into_nodes(self) -> Vec<Node> {
		self.0
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Node> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Top-level tokens, skipping plain text.
	pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
		self.0.iter().filter_map(Node::as_token)
	}

	/// Concatenated leaf text of the whole tree.
	pub fn text(&self) -> String {
		let mut out = String::new();
		self.write_text(&mut out);
		out
	}

	fn write_text(&self, out: &mut String) {
		for node in &self.0 {
			match node {
				Node::Text(text) => out.push_str(text),
				Node::Token(token) => token.write_text(out),
			}
		}
	}

	/// Golden-test form: tokens become `[type, content]`, whitespace-only
	/// strings are dropped.
	pub fn to_simplified(&self) -> Value {
		Value::Array(simplify_nodes(&self.0))
	}
}

fn simplify_nodes(nodes: &[Node]) -> Vec<Value> {
	nodes
		.iter()
		.filter(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()))
		.map(|node| match node {
			Node::Text(text) => Value::String(text.clone()),
			Node::Token(token) => {
				let content = match &token.content {
					Content::Text(text) => Value::String(text.clone()),
					Content::Stream(stream) => Value::Array(simplify_nodes(stream.nodes())),
				};
				Value::Array(vec![Value::String(token.kind.clone()), content])
			}
		})
		.collect()
}

impl FromIterator<Node> for TokenStream {
	fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
		let mut stream = TokenStream::new();
		for node in iter {
			stream.push(node);
		}
		stream
	}
}

impl<'a> IntoIterator for &'a TokenStream {
	type Item = &'a Node;
	type IntoIter = std::slice::Iter<'a, Node>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl IntoIterator for TokenStream {
	type Item = Node;
	type IntoIter = std::vec::IntoIter<Node>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Structural rendering, one node per line:
///
/// ```text
/// tag [
///   punctuation "<"
///   attr-name "href"
/// ]
/// function (builtin) "allow"
/// "plain text"
/// ```
impl fmt::Display for TokenStream {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_nodes(f, &self.0, 0)
	}
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[Node], depth: usize) -> fmt::Result {
	for node in nodes {
		write!(f, "{:width$}", "", width = depth * 2)?;
		match node {
			Node::Text(text) => writeln!(f, "{text:?}")?,
			Node::Token(token) => {
				write!(f, "{}", token.kind)?;
				if !token.alias.is_empty() {
					write!(f, " ({})", token.alias.join(", "))?;
				}
				match &token.content {
					Content::Text(text) => writeln!(f, " {text:?}")?,
					Content::Stream(stream) => {
						writeln!(f, " [")?;
						write_nodes(f, stream.nodes(), depth + 1)?;
						writeln!(f, "{:width$}]", "", width = depth * 2)?;
					}
				}
			}
		}
	}
	Ok(())
}
