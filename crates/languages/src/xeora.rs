//! Xeora web framework templates, layered on `markup`.

use hue_grammar::{Grammar, PathSegment, Rule};
use hue_registry::{BuildError, Component, Context};

const ARGUMENTS: &str = r"(?:,(?:(?:@[-#]*\w+\.[\w+.]\.*)*\|)*(?:(?:[\w+]|[-#*.~^]+[\w+]|=\S)(?:[^$=]|=+[^=])*=*|(?:@[-#]*\w+\.[\w+.]\.*)+(?:(?:[\w+]|[-#*~^][-#*.~^]*[\w+]|=\S)(?:[^$=]|=+[^=])*=*)?)?)?";

pub fn component() -> Component {
	Component::new("xeora")
		.alias("xeoracube")
		.require("markup")
		.factory(grammar)
}

fn punctuation(pattern: &str) -> Result<Grammar, BuildError> {
	Ok(Grammar::new().with("punctuation", Rule::new(pattern)?))
}

/// Punctuation of directive heads, with `#<digit>` markers tagged.
fn directive_punctuation() -> Result<Rule, BuildError> {
	Ok(Rule::new(r"\$(?:\w:|C(?:\[|#\d))?|[{:\[\]]")?
		.inside(Grammar::new().with("tag", Rule::new(r"#\d")?)))
}

fn grammar(cx: &Context<'_>) -> Result<Grammar, BuildError> {
	let variable_inside = || -> Result<Grammar, BuildError> {
		Ok(Grammar::new()
			.with("punctuation", Rule::new(r"[$.]")?)
			.with("operator", Rule::new(r"#+|[-+*~=^@]")?))
	};
	let argument = Rule::new(r"(?:[,|])@?(?:#+|[-+*~=^])?[\w.]+")?.inside(
		Grammar::new()
			.with("punctuation", Rule::new(r"[,.|]")?)
			.with("operator", Rule::new(r"#+|[-+*~=^@]")?),
	);

	let xeora = cx.extend(
		"markup",
		Grammar::new()
			.with(
				"constant",
				Rule::new(r"\$(?:DomainContents|PageRenderDuration)\$")?.inside(punctuation(r"\$")?),
			)
			.with(
				"variable",
				Rule::new(r"\$@?(?:#+|[-+*~=^])?[\w.]+\$")?.inside(variable_inside()?),
			)
			.with(
				"function-inline",
				Rule::new(&[r"\$F:[-\w.]+\?[-\w.]+", ARGUMENTS, r"\$"].concat())?
					.alias("function")
					.inside(
						Grammar::new()
							.with("variable", argument.clone())
							.with("punctuation", Rule::new(r"\$\w:|[$:?.,|]")?),
					),
			)
			.with(
				"function-block",
				Rule::new(&[r"\$XF:\{[-\w.]+\?[-\w.]+", ARGUMENTS, r"\}:XF\$"].concat())?
					.alias("function")
					.inside(punctuation(r"[$:{}?.,|]")?),
			)
			.with(
				"directive-inline",
				Rule::new(r"\$\w(?:#\d+\+?)?(?:\[[-\w.]+\])?:[-/\w.]+\$")?
					.alias("function")
					.inside(Grammar::new().with("punctuation", directive_punctuation()?)),
			)
			.with(
				"directive-block-open",
				Rule::new(r"\$\w+:\{|\$\w(?:#\d+\+?)?(?:\[[-\w.]+\])?:[-\w.]+:\{(?:![A-Z]+)?")?
					.alias("function")
					.inside(
						Grammar::new()
							.with("punctuation", directive_punctuation()?)
							.with(
								"attribute",
								Rule::new(r"![A-Z]+$")?
									.alias("keyword")
									.inside(punctuation("!")?),
							),
					),
			)
			.with(
				"directive-block-separator",
				Rule::new(r"\}:[-\w.]+:\{")?
					.alias("function")
					.inside(punctuation(r"[:{}]")?),
			)
			.with(
				"directive-block-close",
				Rule::new(r"\}:[-\w.]+\$")?
					.alias("function")
					.inside(punctuation(r"[:{}$]")?),
			),
	)?;

	Ok(xeora.insert_before_in(
		&[PathSegment::new("function-block")],
		"punctuation",
		Grammar::new().with("variable", argument),
	)?)
}
