//! Tokenizer budget.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Match attempts allowed per tokenize call unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1 << 24;

/// Nesting depth of `inside` grammars allowed per tokenize call.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits that bound a single tokenize call.
///
/// Loadable from TOML:
///
/// ```toml
/// max_attempts = 100000
/// deadline_ms = 250
/// max_depth = 32
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizeOptions {
	/// Regex match attempts across the whole call. `None` disables the check.
	pub max_attempts: Option<u64>,
	/// Wall-clock budget for the whole call.
	#[serde(rename = "deadline_ms", with = "millis")]
	pub deadline: Option<Duration>,
	pub max_depth: usize,
}

impl Default for TokenizeOptions {
	fn default() -> Self {
		Self {
			max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
			deadline: None,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

impl TokenizeOptions {
	/// No attempt budget and no deadline; only the depth limit applies.
	pub fn unbounded() -> Self {
		Self {
			max_attempts: None,
			deadline: None,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}

	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
		self.max_attempts = Some(max_attempts);
		self
	}

	pub fn with_deadline(mut self, deadline: Duration) -> Self {
		self.deadline = Some(deadline);
		self
	}

	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
		Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
	}
}
