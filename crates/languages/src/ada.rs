use hue_grammar::{Grammar, Rule};
use hue_registry::{BuildError, Component};

pub fn component() -> Component {
	Component::new("ada").factory(|_| grammar())
}

fn grammar() -> Result<Grammar, BuildError> {
	Ok(Grammar::new()
		.with("comment", Rule::new("--.*")?)
		.with("string", Rule::new(r#""(?:""|[^"\r\f\n])*""#)?)
		.with(
			"number",
			[
				Rule::nocase(r"\b\d(?:_?\d)*#[\dA-F](?:_?[\dA-F])*(?:\.[\dA-F](?:_?[\dA-F])*)?#(?:E[+-]?\d(?:_?\d)*)?")?,
				Rule::nocase(r"\b\d(?:_?\d)*(?:\.\d(?:_?\d)*)?(?:E[+-]?\d(?:_?\d)*)?\b")?,
			],
		)
		.with("attribute", Rule::new(r"\b'\w+")?.alias("attr-name"))
		.with(
			"keyword",
			Rule::nocase(
				r"\b(?:abort|abs|abstract|accept|access|aliased|all|and|array|at|begin|body|case|constant|declare|delay|delta|digits|do|else|elsif|end|entry|exception|exit|for|function|generic|goto|if|in|interface|is|limited|loop|mod|new|not|null|of|or|others|out|overriding|package|pragma|private|procedure|protected|raise|range|record|rem|renames|requeue|return|reverse|select|separate|some|subtype|synchronized|tagged|task|terminate|then|type|until|use|when|while|with|xor)\b",
			)?,
		)
		.with("boolean", Rule::nocase(r"\b(?:false|true)\b")?)
		.with("operator", Rule::new(r"<[=>]?|>=?|=>?|:=|/=?|\*\*?|[&+-]")?)
		.with("punctuation", Rule::new(r"\.\.?|[,;():]")?)
		.with("char", Rule::new("'.'")?)
		.with("variable", Rule::nocase(r"\b[a-z](?:\w)*\b")?))
}
