//! JavaScript, layered on `clike`.

use hue_grammar::{Flags, Grammar, Inside, Rule};
use hue_registry::{BuildError, Component, Context};

/// Identifier start followed by identifier parts.
const IDENT: &str = r"(?!\s)[_$a-zA-Z\x{A0}-\x{FFFF}](?:(?!\s)[$\w\x{A0}-\x{FFFF}])*";

const KEYWORDS: &str = r#"(^|[^.]|\.\.\.\s*)\b(?:as|assert(?=\s*\{)|async(?=\s*(?:function\b|\(|[$\w\x{A0}-\x{FFFF}]|$))|await|break|case|class|const|continue|debugger|default|delete|do|else|enum|export|extends|finally(?=\s*(?:\{|$))|for|from(?=\s*(?:['"]|$))|function|(?:get|set)(?=\s*(?:[#\[$\w\x{A0}-\x{FFFF}]|$))|if|implements|import|in|instanceof|interface|let|new|null|of|package|private|protected|public|return|static|super|switch|this|throw|try|typeof|undefined|var|void|while|with|yield)\b"#;

const NUMBER: &str = concat!(
	r"(^|[^\w$])(?:NaN|Infinity",
	r"|0[bB][01]+(?:_[01]+)*n?",
	r"|0[oO][0-7]+(?:_[0-7]+)*n?",
	r"|0[xX][\dA-Fa-f]+(?:_[\dA-Fa-f]+)*n?",
	r"|\d+(?:_\d+)*n",
	r"|(?:\d+(?:_\d+)*(?:\.(?:\d+(?:_\d+)*)?)?|\.\d+(?:_\d+)*)(?:[Ee][+-]?\d+(?:_\d+)*)?",
	r")(?![\w$])",
);

const REGEX: &str = concat!(
	r#"((?:^|[^$\w\x{A0}-\x{FFFF}."'\])\s]|\b(?:return|yield))\s*)"#,
	r"/(?:\[(?:[^\]\\\r\n]|\\.)*\]|\\.|[^/\\\[\r\n])+/[dgimyusv]{0,7}",
	r"(?=(?:\s|/\*(?:[^*]|\*(?!/))*\*/)*(?:$|[\r\n,.;:})\]]|//))",
);

const INTERPOLATION: &str = r"((?:^|[^\\])(?:\\{2})*)\$\{(?:[^{}]|\{(?:[^{}]|\{[^}]*\})*\})+\}";

pub fn component() -> Component {
	Component::new("javascript")
		.alias("js")
		.require("clike")
		.inline_into("markup", "script")
		.factory(grammar)
}

fn grammar(cx: &Context<'_>) -> Result<Grammar, BuildError> {
	let class_name = Grammar::new().with("punctuation", Rule::new(r"[.\\]")?);
	let base = cx.extend(
		"clike",
		Grammar::new()
			.with(
				"class-name",
				[
					Rule::new(r"(\b(?:class|extends|implements|instanceof|interface|new)\s+)[\w.\\]+")?
						.lookbehind()
						.inside(class_name),
					Rule::new(&[r"(^|[^$\w\x{A0}-\x{FFFF}])", IDENT, r"(?=\.(?:constructor|prototype))"].concat())?
						.lookbehind(),
				],
			)
			.with(
				"keyword",
				[
					Rule::new(r"((?:^|\})\s*)catch\b")?.lookbehind(),
					Rule::new(KEYWORDS)?.lookbehind(),
				],
			)
			.with(
				"function",
				Rule::new(&["#?", IDENT, r"(?=\s*(?:\.\s*(?:apply|bind|call)\s*)?\()"].concat())?,
			)
			.with("number", Rule::new(NUMBER)?.lookbehind())
			.with(
				"operator",
				Rule::new(r"--|\+\+|\*\*=?|=>|&&=?|\|\|=?|[!=]==|<<=?|>>>?=?|[-+*/%&|^!=<>]=?|\.{3}|\?\?=?|\?\.?|[~:]")?,
			),
	)?;

	let regex = Grammar::new()
		.with(
			"regex-source",
			Rule::new(r"^(/)[\s\S]+(?=/[a-z]*$)")?
				.lookbehind()
				.alias("language-regex"),
		)
		.with("regex-delimiter", Rule::new(r"^/|/$")?)
		.with("regex-flags", Rule::new(r"^[a-z]+$")?);

	let with_keywords = base.insert_before(
		"keyword",
		Grammar::new()
			.with("regex", Rule::new(REGEX)?.lookbehind().greedy().inside(regex))
			.with(
				"function-variable",
				Rule::new(
					&[
						"#?",
						IDENT,
						r"(?=\s*[=:]\s*(?:async\s*)?(?:\bfunction\b|(?:\((?:[^()]|\([^()]*\))*\)|",
						IDENT,
						r")\s*=>))",
					]
					.concat(),
				)?
				.alias("function"),
			)
			.with("constant", Rule::new(r"\b[A-Z](?:[A-Z_]|\dx?)*\b")?),
	)?;

	let interpolation = Grammar::new()
		.with(
			"interpolation-punctuation",
			Rule::new(r"^\$\{|\}$")?.alias("punctuation"),
		)
		.with_rest(Inside::id("javascript"));
	let template = Grammar::new()
		.with("template-punctuation", Rule::new(r"^`|`$")?.alias("string"))
		.with(
			"interpolation",
			Rule::new(INTERPOLATION)?.lookbehind().inside(interpolation),
		)
		.with("string", Rule::new(r"[\s\S]+")?);

	let with_strings = with_keywords.insert_before(
		"string",
		Grammar::new()
			.with("hashbang", Rule::new(r"^#!.*")?.greedy().alias("comment"))
			.with(
				"template-string",
				Rule::new(r"`(?:\\[\s\S]|\$\{(?:[^{}]|\{(?:[^{}]|\{[^}]*\})*\})+\}|(?!\$\{)[^\\`])*`")?
					.greedy()
					.inside(template),
			)
			.with(
				"string-property",
				Rule::with_flags(
					r#"((?:^|[,{])[ \t]*)(["'])(?:\\(?:\r\n|[\s\S])|(?!\2)[^\\\r\n])*\2(?=\s*:)"#,
					Flags::MULTI_LINE,
				)?
				.lookbehind()
				.greedy()
				.alias("property"),
			),
	)?;

	Ok(with_strings.insert_before(
		"operator",
		Grammar::new().with(
			"literal-property",
			Rule::with_flags(&[r"((?:^|[,{])[ \t]*)", IDENT, r"(?=\s*:)"].concat(), Flags::MULTI_LINE)?
				.lookbehind()
				.alias("property"),
		),
	)?)
}
