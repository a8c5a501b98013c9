//! Comma-separated values (RFC 4180).

use hue_grammar::{Grammar, Rule};
use hue_registry::{BuildError, Component};

pub fn component() -> Component {
	Component::new("csv").factory(|_| grammar())
}

fn grammar() -> Result<Grammar, BuildError> {
	Ok(Grammar::new()
		.with("value", Rule::new(r#"[^\r\n,"]+|"(?:[^"]|"")*"(?!")"#)?)
		.with("punctuation", Rule::new(",")?))
}

#[cfg(test)]
mod tests {
	use hue_registry::Registry;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_quoted_field_keeps_commas() {
		let registry = Registry::new();
		registry.register(component());

		assert_eq!(
			registry.tokenize("a,\"b,\"\"c\"\"\"\n1", "csv").unwrap().to_simplified(),
			json!([
				["value", "a"],
				["punctuation", ","],
				["value", "\"b,\"\"c\"\"\""],
				["value", "1"]
			])
		);
	}
}
