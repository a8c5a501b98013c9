//! Embedded JavaScript templates.
//!
//! Template tags are tokenized first; the remaining markup is tokenized by
//! the host and the tags are put back where they were.

use hue_grammar::{Grammar, Inside, Rule};
use hue_registry::{BuildError, Component};

pub fn component() -> Component {
	Component::new("ejs")
		.alias("eta")
		.require("javascript")
		.embedded_in("markup")
		.factory(|_| grammar())
}

fn grammar() -> Result<Grammar, BuildError> {
	Ok(Grammar::new()
		.with("ejs-comment", Rule::new(r"<%#[\s\S]*?%>")?.greedy())
		.with("escape", Rule::new("<%%|%%>")?.greedy())
		.with(
			"ejs",
			Rule::new(r"<%(?![%#])[\s\S]*?%>")?.greedy().inside(
				Grammar::new()
					.with(
						"delimiter",
						Rule::new(r"^<%[-_=]?|[-_]?%>$")?.alias("punctuation"),
					)
					.with(
						"language-javascript",
						Rule::new(r"[\s\S]+")?.inside(Inside::id("javascript")),
					),
			),
		))
}
