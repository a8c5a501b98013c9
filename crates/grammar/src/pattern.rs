//! Pattern rules: a compiled regex plus the matching flags the tokenizer honours.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use fancy_regex::{Regex, RegexBuilder};
use smallvec::SmallVec;

use crate::error::PatternError;
use crate::grammar::Inside;

/// Backtracking steps a single match attempt may take before it is abandoned.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

bitflags! {
	/// Regex flags, applied as inline flags when the pattern is compiled.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Flags: u8 {
		/// `(?i)`
		const CASE_INSENSITIVE = 1 << 0;
		/// `(?m)`: `^` and `$` match at line boundaries.
		const MULTI_LINE = 1 << 1;
		/// `(?s)`: `.` matches line terminators.
		const DOT_ALL = 1 << 2;
	}
}

impl Flags {
	fn prefix(self) -> String {
		if self.is_empty() {
			return String::new();
		}
		let mut out = String::from("(?");
		if self.contains(Self::CASE_INSENSITIVE) {
			out.push('i');
		}
		if self.contains(Self::MULTI_LINE) {
			out.push('m');
		}
		if self.contains(Self::DOT_ALL) {
			out.push('s');
		}
		out.push(')');
		out
	}
}

/// A compiled, position-independent pattern.
///
/// The tokenizer decides where a search starts; authors never deal with
/// global or sticky state. Cloning is cheap.
#[derive(Clone)]
pub struct Pattern {
	regex: Arc<Regex>,
	source: Arc<str>,
	flags: Flags,
}

/// A single successful match attempt, in byte offsets of the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Hit {
	/// Where the whole regex match began (before look-behind trimming).
	pub raw_start: usize,
	/// Token start after look-behind trimming.
	pub start: usize,
	pub end: usize,
}

impl Pattern {
	/// Compiles `source` with no flags.
	pub fn new(source: &str) -> Result<Self, PatternError> {
		Self::compile(source, Flags::empty())
	}

	/// Compiles `source` case-insensitively.
	pub fn nocase(source: &str) -> Result<Self, PatternError> {
		Self::compile(source, Flags::CASE_INSENSITIVE)
	}

	pub fn compile(source: &str, flags: Flags) -> Result<Self, PatternError> {
		Self::compile_with_limit(source, flags, DEFAULT_BACKTRACK_LIMIT)
	}

	/// Compiles with an explicit backtracking limit per match attempt.
	pub fn compile_with_limit(
		source: &str,
		flags: Flags,
		backtrack_limit: usize,
	) -> Result<Self, PatternError> {
		let full = format!("{}{}", flags.prefix(), source);
		let regex = RegexBuilder::new(&full)
			.backtrack_limit(backtrack_limit)
			.build()
			.map_err(|e| PatternError {
				source_text: source.to_string(),
				message: e.to_string(),
			})?;
		Ok(Self {
			regex: Arc::new(regex),
			source: source.into(),
			flags,
		})
	}

	/// Pattern source without the flag prefix.
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn flags(&self) -> Flags {
		self.flags
	}

	/// Runs one match attempt starting at byte offset `pos` of `text`.
	///
	/// `^` still only matches at offset 0, and assertions such as `\b` see
	/// the characters before `pos`. With `lookbehind`, the first capture
	/// group is cut from the front of the hit.
	pub(crate) fn find_at(
		&self,
		text: &str,
		pos: usize,
		lookbehind: bool,
	) -> Result<Option<Hit>, fancy_regex::Error> {
		let Some(caps) = self.regex.captures_from_pos(text, pos)? else {
			return Ok(None);
		};
		let Some(whole) = caps.get(0) else {
			return Ok(None);
		};
		let mut start = whole.start();
		if lookbehind && let Some(context) = caps.get(1) {
			start += context.as_str().len();
		}
		Ok(Some(Hit {
			raw_start: whole.start(),
			start: start.min(whole.end()),
			end: whole.end(),
		}))
	}
}

impl fmt::Debug for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.flags.is_empty() {
			write!(f, "/{}/", self.source)
		} else {
			write!(f, "/{}/{:?}", self.source, self.flags)
		}
	}
}

impl PartialEq for Pattern {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source && self.flags == other.flags
	}
}

/// Alias list attached to a rule and copied onto every token it produces.
pub type Aliases = SmallVec<[String; 1]>;

/// One alternative of a token type: a pattern plus how its matches are treated.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
	pub pattern: Pattern,
	/// The first capture group is leading context, not token content.
	pub lookbehind: bool,
	/// Search the whole buffer and extend across earlier provisional tokens.
	pub greedy: bool,
	pub alias: Aliases,
	/// Grammar used to re-tokenize the matched text.
	pub inside: Option<Inside>,
}

impl Rule {
	pub fn new(source: &str) -> Result<Self, PatternError> {
		Pattern::new(source).map(Self::from)
	}

	pub fn nocase(source: &str) -> Result<Self, PatternError> {
		Pattern::nocase(source).map(Self::from)
	}

	pub fn with_flags(source: &str, flags: Flags) -> Result<Self, PatternError> {
		Pattern::compile(source, flags).map(Self::from)
	}

	pub fn lookbehind(mut self) -> Self {
		self.lookbehind = true;
		self
	}

	pub fn greedy(mut self) -> Self {
		self.greedy = true;
		self
	}

	pub fn alias(mut self, alias: impl Into<String>) -> Self {
		self.alias.push(alias.into());
		self
	}

	pub fn inside(mut self, inside: impl Into<Inside>) -> Self {
		self.inside = Some(inside.into());
		self
	}
}

impl From<Pattern> for Rule {
	fn from(pattern: Pattern) -> Self {
		Self {
			pattern,
			lookbehind: false,
			greedy: false,
			alias: Aliases::new(),
			inside: None,
		}
	}
}
