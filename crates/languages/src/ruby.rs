//! Ruby, layered on `clike`.

use hue_grammar::{Flags, Grammar, Inside, Rule};
use hue_registry::{BuildError, Component, Context};

pub fn component() -> Component {
	Component::new("ruby")
		.alias("rb")
		.require("clike")
		.factory(grammar)
}

/// `#{...}` inside strings, regexes, and command literals.
fn interpolation() -> Result<Rule, BuildError> {
	Ok(Rule::new(r"((?:^|[^\\])(?:\\{2})*)#\{(?:[^{}]|\{[^{}]*\})*\}")?
		.lookbehind()
		.inside(
			Grammar::new()
				.with(
					"content",
					Rule::new(r"^(#\{)[\s\S]+(?=\}$)")?
						.lookbehind()
						.inside(Inside::id("ruby")),
				)
				.with("delimiter", Rule::new(r"^#\{|\}$")?.alias("punctuation")),
		))
}

fn grammar(cx: &Context<'_>) -> Result<Grammar, BuildError> {
	let base = cx
		.extend(
			"clike",
			Grammar::new()
				.with(
					"comment",
					Rule::with_flags(r"#.*|^=begin\s[\s\S]*?^=end", Flags::MULTI_LINE)?.greedy(),
				)
				.with(
					"class-name",
					Rule::new(r"(\b(?:class|module)\s+|\bcatch\s+\()[\w.\\]+|\b[A-Z_]\w*(?=\s*\.\s*new\b)")?
						.lookbehind()
						.inside(Grammar::new().with("punctuation", Rule::new(r"[.\\]")?)),
				)
				.with(
					"keyword",
					Rule::new(
						r"\b(?:BEGIN|END|alias|and|begin|break|case|class|def|define_method|defined|do|each|else|elsif|end|ensure|extend|for|if|in|include|module|new|next|nil|not|or|prepend|private|protected|public|raise|redo|require|rescue|retry|return|self|super|then|throw|undef|unless|until|when|while|yield)\b",
					)?,
				)
				.with(
					"operator",
					Rule::new(r"\.{2,3}|&\.|===|<?=>|[!=]?~|(?:&&|\|\||<<|>>|\*\*|[+\-*/%<>!^&|=])=?|[?:]")?,
				)
				.with("punctuation", Rule::new(r"[(){}\[\].,;]")?),
		)?
		.without("function");

	let with_operators = base.insert_before(
		"operator",
		Grammar::new().with("double-colon", Rule::new("::")?.alias("punctuation")),
	)?;

	let with_keywords = with_operators.insert_before(
		"keyword",
		Grammar::new()
			.with(
				"regex-literal",
				Rule::new(r"(^|[^/])/(?!/)(?:\[[^\r\n\]]+\]|\\.|[^\[/\\\r\n])+/[egimnosux]{0,6}(?=\s*(?:$|[\r\n,.;})#]))")?
					.lookbehind()
					.greedy()
					.inside(
						Grammar::new()
							.with("interpolation", interpolation()?)
							.with("regex", Rule::new(r"[\s\S]+")?),
					),
			)
			.with("variable", Rule::new(r"[@$]+[a-zA-Z_]\w*(?:[?!]|\b)")?)
			.with(
				"symbol",
				[
					Rule::new(r#"(^|[^:]):(?:"(?:\\.|[^"\\\r\n])*"|'(?:\\.|[^'\\\r\n])*')"#)?
						.lookbehind()
						.greedy(),
					Rule::new(r"(^|[^:]):[a-zA-Z_]\w*(?:[?!]|\b)")?.lookbehind(),
				],
			)
			.with(
				"method-definition",
				Rule::new(r"(\bdef\s+)\w+(?:\s*\.\s*\w+)?")?.lookbehind().inside(
					Grammar::new()
						.with("function", Rule::new(r"\b\w+$")?)
						.with("keyword", Rule::new(r"^self\b")?)
						.with("class-name", Rule::new(r"^\w+")?)
						.with("punctuation", Rule::new(r"\.")?),
				),
			),
	)?;

	// String literals go first so `#{` inside them is not taken for a comment.
	let with_strings = with_keywords
		.insert_before(
			"comment",
			Grammar::new()
				.with(
					"string-literal",
					Rule::new(r#"("|')(?:#\{[^}]+\}|#(?!\{)|\\(?:\r\n|[\s\S])|(?!\1)[^\\#\r\n])*\1"#)?
						.greedy()
						.inside(
							Grammar::new()
								.with("interpolation", interpolation()?)
								.with("string", Rule::new(r"[\s\S]+")?),
						),
				)
				.with(
					"command-literal",
					Rule::new(r"`(?:#\{[^}]+\}|#(?!\{)|\\(?:\r\n|[\s\S])|[^\\`#\r\n])*`")?
						.greedy()
						.inside(
							Grammar::new()
								.with("interpolation", interpolation()?)
								.with("command", Rule::new(r"[\s\S]+")?.alias("string")),
						),
				),
		)?
		.without("string");

	Ok(with_strings.insert_before(
		"number",
		Grammar::new()
			.with(
				"builtin",
				Rule::new(
					r"\b(?:Array|Bignum|Binding|Class|Continuation|Dir|Exception|FalseClass|File|Fixnum|Float|Hash|IO|Integer|MatchData|Method|Module|NilClass|Numeric|Object|Proc|Range|Regexp|Stat|String|Struct|Symbol|TMS|Thread|ThreadGroup|Time|TrueClass)\b",
				)?,
			)
			.with("constant", Rule::new(r"\b[A-Z][A-Z0-9_]*(?:[?!]|\b)")?),
	)?)
}
