//! Shared base for C-family grammars.

use hue_grammar::{Grammar, Rule};
use hue_registry::{BuildError, Component};

pub fn component() -> Component {
	Component::new("clike").factory(|_| grammar())
}

fn grammar() -> Result<Grammar, BuildError> {
	Ok(Grammar::new()
		.with(
			"comment",
			[
				Rule::new(r"(^|[^\\])/\*[\s\S]*?(?:\*/|$)")?.lookbehind().greedy(),
				Rule::new(r"(^|[^\\:])//.*")?.lookbehind().greedy(),
			],
		)
		.with(
			"string",
			Rule::new(r#"(["'])(?:\\(?:\r\n|[\s\S])|(?!\1)[^\\\r\n])*\1"#)?.greedy(),
		)
		.with(
			"class-name",
			Rule::nocase(r"(\b(?:class|extends|implements|instanceof|interface|new|trait)\s+|\bcatch\s+\()[\w.\\]+")?
				.lookbehind()
				.inside(Grammar::new().with("punctuation", Rule::new(r"[.\\]")?)),
		)
		.with(
			"keyword",
			Rule::new(
				r"\b(?:break|catch|continue|do|else|finally|for|function|if|in|instanceof|new|null|return|throw|try|while)\b",
			)?,
		)
		.with("boolean", Rule::new(r"\b(?:false|true)\b")?)
		.with("function", Rule::new(r"\b\w+(?=\()")?)
		.with(
			"number",
			Rule::nocase(r"\b0x[\da-f]+\b|(?:\b\d+(?:\.\d*)?|\B\.\d+)(?:e[+-]?\d+)?")?,
		)
		.with(
			"operator",
			Rule::new(r"[<>]=?|[!=]=?=?|--?|\+\+?|&&?|\|\|?|[?*/~^%]")?,
		)
		.with("punctuation", Rule::new(r"[{}\[\];(),.:]")?))
}
