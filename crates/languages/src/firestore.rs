//! Cloud Firestore security rules.

use hue_grammar::{Grammar, Rule};
use hue_registry::{BuildError, Component, Context};

pub fn component() -> Component {
	Component::new("firestore-security-rules")
		.require("clike")
		.factory(grammar)
}

fn grammar(cx: &Context<'_>) -> Result<Grammar, BuildError> {
	let base = cx
		.extend(
			"clike",
			Grammar::new()
				.with("comment", Rule::new(r"//.*")?)
				.with(
					"keyword",
					Rule::new(r"\b(?:allow|function|if|match|null|return|rules_version|service)\b")?,
				)
				.with("operator", Rule::new(r"&&|\|\||[<>!=]=?|[-+*/%]|\b(?:in|is)\b")?),
		)?
		.without("class-name");

	let variable = Grammar::new()
		.with("operator", Rule::new("=")?)
		.with("keyword", Rule::new(r"\*\*")?)
		.with("punctuation", Rule::new(r"[.$(){}]")?);

	Ok(base.insert_before(
		"keyword",
		Grammar::new()
			.with(
				"path",
				Rule::new(
					r"(^|[\s(),])(?:/(?:[\w\x{A0}-\x{FFFF}]+|\{[\w\x{A0}-\x{FFFF}]+(?:=\*\*)?\}|\$\([\w\x{A0}-\x{FFFF}.]+\)))+",
				)?
				.lookbehind()
				.greedy()
				.inside(
					Grammar::new()
						.with(
							"variable",
							Rule::new(r"\{[\w\x{A0}-\x{FFFF}]+(?:=\*\*)?\}|\$\([\w\x{A0}-\x{FFFF}.]+\)")?.inside(variable),
						)
						.with("punctuation", Rule::new("/")?),
				),
			)
			.with(
				"method",
				Rule::new(r"(\ballow\s+)[a-z]+(?:\s*,\s*[a-z]+)*(?=\s*[:;])")?
					.lookbehind()
					.alias("builtin")
					.inside(Grammar::new().with("punctuation", Rule::new(",")?)),
			),
	)?)
}
