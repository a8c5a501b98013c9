//! Cascading style sheets.

use hue_grammar::{Grammar, Inside, Rule};
use hue_registry::{BuildError, Component};

const STRING: &str = r#"(?:"(?:\\(?:\r\n|[\s\S])|[^"\\\r\n])*"|'(?:\\(?:\r\n|[\s\S])|[^'\\\r\n])*')"#;

pub fn component() -> Component {
	Component::new("css")
		.inline_into("markup", "style")
		.factory(|_| grammar())
}

fn grammar() -> Result<Grammar, BuildError> {
	let atrule = Grammar::new()
		.with("rule", Rule::new(r"^@[\w-]+")?)
		.with(
			"selector-function-argument",
			Rule::new(r"(\bselector\s*\(\s*(?![\s)]))(?:[^()\s]|\s+(?![\s)])|\((?:[^()]|\([^()]*\))*\))+(?=\s*\))")?
				.lookbehind()
				.alias("selector"),
		)
		.with(
			"keyword",
			Rule::new(r"(^|[^\w-])(?:and|not|only|or)(?![\w-])")?.lookbehind(),
		)
		.with_rest(Inside::id("css"));

	let url = Grammar::new()
		.with("function", Rule::nocase(r"^url")?)
		.with("punctuation", Rule::new(r"^\(|\)$")?)
		.with("string", Rule::new(&format!("^{STRING}$"))?.alias("url"));

	Ok(Grammar::new()
		.with("comment", Rule::new(r"/\*[\s\S]*?\*/")?)
		.with(
			"atrule",
			Rule::new(&format!(r#"@[\w-](?:[^;{{\s"']|\s+(?!\s)|{STRING})*?(?:;|(?=\s*\{{))"#))?.inside(atrule),
		)
		.with(
			"url",
			Rule::nocase(&format!(r#"\burl\((?:{STRING}|(?:[^\\\r\n()"']|\\[\s\S])*)\)"#))?
				.greedy()
				.inside(url),
		)
		.with(
			"selector",
			Rule::new(&format!(r#"(^|[{{}}\s])[^{{}}\s](?:[^{{}};"'\s]|\s+(?![\s{{])|{STRING})*(?=\s*\{{)"#))?
				.lookbehind(),
		)
		.with("string", Rule::new(STRING)?.greedy())
		.with(
			"property",
			Rule::nocase(r"(^|[^-\w\x{A0}-\x{FFFF}])(?!\s)[-_a-z\x{A0}-\x{FFFF}](?:(?!\s)[-\w\x{A0}-\x{FFFF}])*(?=\s*:)")?
				.lookbehind(),
		)
		.with("important", Rule::nocase(r"!important\b")?)
		.with(
			"function",
			Rule::nocase(r"(^|[^-a-z0-9])[-a-z0-9]+(?=\()")?.lookbehind(),
		)
		.with("punctuation", Rule::new(r"[(){};:,]")?))
}
