//! Haml templates with embedded Ruby.
//!
//! `:filter` blocks get a dedicated rule for every filter whose language is
//! loaded when the grammar is built.

use hue_grammar::{Grammar, Inside, Rule};
use hue_registry::{BuildError, Component, Context};
use tracing::trace;

/// Filter name and the language its body is written in.
const FILTERS: &[(&str, &str)] = &[
	("css", "css"),
	("coffee", "coffeescript"),
	("erb", "erb"),
	("javascript", "javascript"),
	("less", "less"),
	("markdown", "markdown"),
	("ruby", "ruby"),
	("scss", "scss"),
	("textile", "textile"),
];

/// Line start plus indentation, captured as group 2.
const LINE: &str = r"((?:^|\r?\n|\r)([\t ]*))";

pub fn component() -> Component {
	let mut component = Component::new("haml").require("ruby");
	for optional in [
		"css",
		"css-extras",
		"coffeescript",
		"erb",
		"javascript",
		"less",
		"markdown",
		"scss",
		"textile",
	] {
		component = component.optional(optional);
	}
	component.factory(grammar)
}

fn grammar(cx: &Context<'_>) -> Result<Grammar, BuildError> {
	let ruby = || Inside::id("ruby");
	let filter_name = || Rule::new(r"^:[\w-]+").map(|rule| rule.alias("symbol"));

	let attributes = [
		Rule::new(r"(^|[^#])\{(?:\{[^}]+\}|[^{}])+\}")?
			.lookbehind()
			.inside(ruby()),
		Rule::new(r"\([^)]+\)")?.inside(
			Grammar::new()
				.with(
					"attr-value",
					Rule::new(r#"(=\s*)(?:"(?:\\.|[^\\"\r\n])*"|[^)\s]+)"#)?.lookbehind(),
				)
				.with("attr-name", Rule::new(r"[\w:-]+(?=\s*!?=|\s*[,)])")?)
				.with("punctuation", Rule::new(r"[=(),]")?),
		),
		Rule::new(r"\[[^\]]+\]")?.inside(ruby()),
	];

	let base = Grammar::new()
		.with(
			"multiline-comment",
			Rule::new(r"((?:^|\r?\n|\r)([\t ]*))(?:/|-#).*(?:(?:\r?\n|\r)\2[\t ].+)*")?
				.lookbehind()
				.alias("comment"),
		)
		.with(
			"multiline-code",
			[
				Rule::new(
					r"((?:^|\r?\n|\r)([\t ]*)(?:[~-]|[&!]?=)).*,[\t ]*(?:(?:\r?\n|\r)\2[\t ].*,[\t ]*)*(?:(?:\r?\n|\r)\2[\t ].+)",
				)?
				.lookbehind()
				.inside(ruby()),
				Rule::new(r"((?:^|\r?\n|\r)([\t ]*)(?:[~-]|[&!]?=)).*\|[\t ]*(?:(?:\r?\n|\r)\2[\t ].*\|[\t ]*)*")?
					.lookbehind()
					.inside(ruby()),
			],
		)
		.with(
			"filter",
			Rule::new(&filter_pattern(r"[\w-]+"))?
				.lookbehind()
				.inside(Grammar::new().with("filter-name", filter_name()?)),
		)
		.with(
			"markup",
			Rule::new(r"((?:^|\r?\n|\r)[\t ]*)<.+")?
				.lookbehind()
				.inside(Inside::id("markup")),
		)
		.with("doctype", Rule::new(r"((?:^|\r?\n|\r)[\t ]*)!!!(?: .+)?")?.lookbehind())
		.with(
			"tag",
			Rule::new(
				r"((?:^|\r?\n|\r)[\t ]*)[%.#][\w\-#.]*[\w\-](?:\([^)]+\)|\{(?:\{[^}]+\}|[^{}])+\}|\[[^\]]+\])*[/<>]*",
			)?
			.lookbehind()
			.inside(
				Grammar::new()
					.with("attributes", attributes)
					.with("punctuation", Rule::new("[<>]")?),
			),
		)
		.with(
			"code",
			Rule::new(r"((?:^|\r?\n|\r)[\t ]*(?:[~-]|[&!]?=)).+")?
				.lookbehind()
				.inside(ruby()),
		)
		.with(
			"interpolation",
			Rule::new(r"#\{[^}]+\}")?.inside(
				Grammar::new()
					.with("delimiter", Rule::new(r"^#\{|\}$")?.alias("punctuation"))
					.with("ruby", Rule::new(r"[\s\S]+")?.inside(ruby())),
			),
		)
		.with(
			"punctuation",
			Rule::new(r"((?:^|\r?\n|\r)[\t ]*)[~=\-&!]+")?.lookbehind(),
		);

	let mut filters = Grammar::new();
	for &(filter, language) in FILTERS {
		if cx.language(language).is_none() {
			trace!(filter, language, "haml filter skipped");
			continue;
		}
		let body = Grammar::new().with("filter-name", filter_name()?).with(
			"text",
			Rule::new(r"[\s\S]+")?
				.alias(language)
				.alias(format!("language-{language}"))
				.inside(Inside::id(language)),
		);
		filters.insert(
			format!("filter-{filter}"),
			Rule::new(&filter_pattern(&fancy_regex::escape(filter)))?
				.lookbehind()
				.inside(body),
		);
	}

	Ok(base.insert_before("filter", filters)?)
}

/// An indented `:name` block: the filter line plus every deeper or blank line.
fn filter_pattern(name: &str) -> String {
	[
		LINE,
		":",
		name,
		r"(?:(?:\r?\n|\r)(?:\2[\t ].+|\s*?(?=\r?\n|\r)))+",
	]
	.concat()
}
