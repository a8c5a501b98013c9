//! Doubly linked segment list over the text being tokenized.
//!
//! Text segments only record their length: the list always concatenates to
//! the input, so a segment starting at byte `pos` covers `text[pos..pos + len]`.
//! Removed nodes stay in the arena unlinked.

use crate::token::{Node, Token, TokenStream};

pub(super) type SegId = usize;

pub(super) const HEAD: SegId = 0;
pub(super) const TAIL: SegId = 1;

struct Seg {
	len: usize,
	token: Option<Token>,
	prev: SegId,
	next: SegId,
}

pub(super) struct Segments {
	arena: Vec<Seg>,
	linked: usize,
}

impl Segments {
	/// A list holding one unclassified segment of `len` bytes (none when empty).
	pub(super) fn new(len: usize) -> Self {
		let sentinel = |prev, next| Seg {
			len: 0,
			token: None,
			prev,
			next,
		};
		let mut segs = Self {
			arena: vec![sentinel(HEAD, TAIL), sentinel(HEAD, TAIL)],
			linked: 0,
		};
		if len > 0 {
			segs.add_after(HEAD, len, None);
		}
		segs
	}

	pub(super) fn next(&self, id: SegId) -> SegId {
		self.arena[id].next
	}

	pub(super) fn prev(&self, id: SegId) -> SegId {
		self.arena[id].prev
	}

	pub(super) fn len_of(&self, id: SegId) -> usize {
		self.arena[id].len
	}

	pub(super) fn is_token(&self, id: SegId) -> bool {
		self.arena[id].token.is_some()
	}

	/// Number of linked segments.
	pub(super) fn count(&self) -> usize {
		self.linked
	}

	pub(super) fn add_after(&mut self, after: SegId, len: usize, token: Option<Token>) -> SegId {
		let next = self.arena[after].next;
		let id = self.arena.len();
		self.arena.push(Seg {
			len,
			token,
			prev: after,
			next,
		});
		self.arena[after].next = id;
		self.arena[next].prev = id;
		self.linked += 1;
		id
	}

	/// Unlinks up to `count` segments following `from`.
	pub(super) fn remove_after(&mut self, from: SegId, count: usize) {
		let mut next = self.arena[from].next;
		let mut removed = 0;
		while removed < count && next != TAIL {
			self.arena[next].token = None;
			next = self.arena[next].next;
			removed += 1;
		}
		self.arena[from].next = next;
		self.arena[next].prev = from;
		self.linked -= removed;
	}

	/// Converts the list into a stream, merging adjacent unclassified text.
	pub(super) fn into_stream(mut self, text: &str) -> TokenStream {
		let mut stream = TokenStream::new();
		let mut id = self.arena[HEAD].next;
		let mut pos = 0;
		while id != TAIL {
			let seg = &mut self.arena[id];
			match seg.token.take() {
				Some(token) => stream.push(Node::Token(token)),
				None => stream.push_text(&text[pos..pos + seg.len]),
			}
			pos += seg.len;
			id = seg.next;
		}
		stream
	}
}
