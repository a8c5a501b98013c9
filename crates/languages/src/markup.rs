//! HTML, XML, and SVG markup.
//!
//! Other components hand `<style>` and `<script>` bodies to themselves with
//! [`Component::inline_into`]; those rules land in front of `cdata`.

use hue_grammar::{Grammar, Inside, Rule};
use hue_registry::{BuildError, Component};

pub fn component() -> Component {
	Component::new("markup")
		.alias("html")
		.alias("xml")
		.alias("svg")
		.alias("mathml")
		.factory(|_| grammar())
}

fn grammar() -> Result<Grammar, BuildError> {
	let namespace = || Rule::new(r"^[^\s>/:]+:");

	let doctype = Grammar::new()
		.with(
			"internal-subset",
			Rule::new(r"(^[^\[]*\[)[\s\S]+(?=\]>$)")?
				.lookbehind()
				.greedy()
				.inside(Inside::id("markup")),
		)
		.with("string", Rule::new(r#""[^"]*"|'[^']*'"#)?.greedy())
		.with("punctuation", Rule::new(r"^<!|>$|[\[\]]")?)
		.with("doctype-tag", Rule::nocase(r"^DOCTYPE")?)
		.with("name", Rule::new(r#"[^\s<>'"]+"#)?);

	let tag = Grammar::new()
		.with(
			"tag",
			Rule::new(r"^</?[^\s>/]+")?.inside(
				Grammar::new()
					.with("punctuation", Rule::new(r"^</?")?)
					.with("namespace", namespace()?),
			),
		)
		.with(
			"attr-value",
			Rule::new(r#"=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+)"#)?.inside(Grammar::new().with(
				"punctuation",
				[
					Rule::new(r"^=")?.alias("attr-equals"),
					Rule::new(r#"^(\s*)["']|["']$"#)?.lookbehind(),
				],
			)),
		)
		.with("punctuation", Rule::new(r"/?>")?)
		.with(
			"attr-name",
			Rule::new(r"[^\s>/]+")?.inside(Grammar::new().with("namespace", namespace()?)),
		);

	Ok(Grammar::new()
		.with("comment", Rule::new(r"<!--(?:(?!<!--)[\s\S])*?-->")?.greedy())
		.with("prolog", Rule::new(r"<\?[\s\S]+?\?>")?.greedy())
		.with(
			"doctype",
			Rule::nocase(
				r#"<!DOCTYPE(?:[^>"'\[\]]|"[^"]*"|'[^']*')+(?:\[(?:[^<"'\]]|"[^"]*"|'[^']*'|<(?!!--)|<!--(?:[^-]|-(?!->))*-->)*\]\s*)?>"#,
			)?
			.greedy()
			.inside(doctype),
		)
		.with("cdata", Rule::nocase(r"<!\[CDATA\[[\s\S]*?\]\]>")?.greedy())
		.with(
			"tag",
			Rule::new(
				r#"</?(?!\d)[^\s>/=$<%]+(?:\s(?:\s*[^\s>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+(?=[\s>]))|(?=[\s/>])))+)?\s*/?>"#,
			)?
			.greedy()
			.inside(tag),
		)
		.with(
			"entity",
			[
				Rule::nocase(r"&[\da-z]{1,8};")?.alias("named-entity"),
				Rule::nocase(r"&#x?[\da-f]{1,8};")?,
			],
		))
}
