use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

use super::*;

fn rule(src: &str) -> Rule {
	Rule::new(src).unwrap()
}

fn run(text: &str, grammar: &Grammar) -> TokenStream {
	Tokenizer::new().tokenize(text, grammar).unwrap()
}

#[test]
fn test_greedy_comment_runs_to_end_of_line() {
	let grammar = Grammar::new()
		.with("comment", rule("--.*").greedy())
		.with("number", rule(r"\d+"));

	insta::assert_snapshot!(run("1 -- 2 -- 3", &grammar).to_string(), @r#"
	number "1"
	" "
	comment "-- 2 -- 3"
	"#);
}

#[test]
fn test_greedy_dissolves_earlier_tokens() {
	let grammar = Grammar::new()
		.with("number", rule(r"\d+"))
		.with("comment", rule(r"/\*[\s\S]*?\*/").greedy());

	assert_eq!(
		run("1 /* 2 */ 3", &grammar).to_simplified(),
		json!([["number", "1"], ["comment", "/* 2 */"], ["number", "3"]])
	);
}

#[test]
fn test_greedy_rematches_exposed_remainder() {
	let grammar = Grammar::new()
		.with("word", rule("[a-z]+"))
		.with("string", rule("'[a-z]").greedy());

	assert_eq!(
		run("'ab", &grammar).to_simplified(),
		json!([["string", "'a"], ["word", "b"]])
	);
}

#[test]
fn test_greedy_never_starts_inside_token() {
	let grammar = Grammar::new()
		.with("string", rule(r#""[^"]*""#))
		.with("comment", rule("#.*").greedy());

	assert_eq!(
		run(r#"x "a#b""#, &grammar).to_simplified(),
		json!(["x ", ["string", "\"a#b\""]])
	);
}

#[test]
fn test_lookbehind_context_stays_text() {
	let grammar = Grammar::new().with("variable", rule(r"(^|[^\\])\$\w+").lookbehind());

	let out = run("a$x", &grammar);
	assert_eq!(out.to_simplified(), json!(["a", ["variable", "$x"]]));
	assert_eq!(run(r"\$x", &grammar).to_simplified(), json!([r"\$x"]));
}

#[rstest]
#[case::empty_pattern("bab", "a*", json!(["b", ["x", "a"], "b"]))]
#[case::emptied_by_lookbehind("ac", "(a)b?", json!(["ac"]))]
#[case::multibyte("é é", "a?", json!(["é é"]))]
fn test_empty_matches_are_skipped(#[case] text: &str, #[case] pattern: &str, #[case] expected: serde_json::Value) {
	let grammar = Grammar::new().with("x", Rule::new(pattern).unwrap().lookbehind());
	assert_eq!(run(text, &grammar).to_simplified(), expected);
}

#[test]
fn test_inside_builds_nested_tree() {
	let grammar = Grammar::new().with(
		"tag",
		rule("<[^>]+>").inside(Grammar::new().with("punctuation", rule("[<>/]"))),
	);

	insta::assert_snapshot!(run("a<b/>", &grammar).to_string(), @r#"
	"a"
	tag [
	  punctuation "<"
	  "b"
	  punctuation "/"
	  punctuation ">"
	]
	"#);
}

#[test]
fn test_single_text_content_is_plain() {
	let grammar = Grammar::new().with(
		"word",
		rule("[a-z]+").alias("identifier").inside(Grammar::new().with("digit", rule(r"\d"))),
	);
	let out = run("abc", &grammar);
	let token = out.tokens().next().unwrap();

	assert_eq!(token.content, Content::Text("abc".into()));
	assert!(token.is("identifier"));
}

#[test]
fn test_id_reference_resolves_through_scope() {
	let scope: HashMap<String, Arc<Grammar>> =
		HashMap::from([("num".to_string(), Arc::new(Grammar::new().with("number", rule(r"\d+"))))]);
	let grammar = Grammar::new().with("block", rule(r"\[[^\]]*\]").inside(Inside::id("num")));

	let out = Tokenizer::with_scope(&scope).tokenize("[1,2]", &grammar).unwrap();
	assert_eq!(
		out.to_simplified(),
		json!([["block", ["[", ["number", "1"], ",", ["number", "2"], "]"]]])
	);

	let unresolved = run("[1,2]", &grammar);
	assert_eq!(unresolved.to_simplified(), json!([["block", "[1,2]"]]));
}

#[test]
fn test_rest_merges_into_nested_grammar() {
	let interpolation = Grammar::new()
		.with("punctuation", rule(r"^\{|\}$"))
		.with_rest(Grammar::new().with("number", rule(r"\d+")));
	let grammar = Grammar::new().with("interpolation", rule(r"\{[^}]*\}").inside(interpolation));

	assert_eq!(
		run("x{12}", &grammar).to_simplified(),
		json!(["x", ["interpolation", [["punctuation", "{"], ["number", "12"], ["punctuation", "}"]]]])
	);
}

#[test]
fn test_rest_overrides_keys_in_place() {
	let grammar = Grammar::new()
		.with("a", rule("a"))
		.with("b", rule("b"))
		.with_rest(Grammar::new().with("a", rule("ab")).with("c", rule("c")));
	let rest = grammar.rest().and_then(|r| match r {
		Inside::Inline(g) => Some(g.as_ref()),
		Inside::ById(_) => None,
	});

	let keys: Vec<_> = merged_entries(&grammar, rest).iter().map(|(k, rules)| (*k, rules[0].pattern.source())).collect();
	assert_eq!(keys, [("a", "ab"), ("b", "b"), ("c", "c")]);
	assert_eq!(run("abc", &grammar).to_simplified(), json!([["a", "ab"], ["c", "c"]]));
}

#[test]
fn test_attempt_budget() {
	let grammar = Grammar::new().with("a", rule("a")).with("b", rule("b"));
	let err = Tokenizer::new()
		.with_options(TokenizeOptions::default().with_max_attempts(1))
		.tokenize("ab", &grammar)
		.unwrap_err();

	assert_eq!(
		err,
		TokenizeError::PatternTimeout {
			token_type: "a".into(),
			attempts: 2,
			cause: TimeoutCause::Attempts,
		}
	);
}

#[test]
fn test_deadline() {
	let grammar = Grammar::new().with("a", rule("a"));
	let err = Tokenizer::new()
		.with_options(TokenizeOptions::unbounded().with_deadline(Duration::ZERO))
		.tokenize("aaa", &grammar)
		.unwrap_err();

	assert!(matches!(
		err,
		TokenizeError::PatternTimeout {
			cause: TimeoutCause::Deadline,
			..
		}
	));
}

#[test]
fn test_self_reference_hits_depth_limit() {
	let scope: HashMap<String, Arc<Grammar>> = HashMap::from([(
		"paren".to_string(),
		Arc::new(Grammar::new().with("group", rule(r"\(.*\)").inside(Inside::id("paren")))),
	)]);
	let grammar = scope["paren"].clone();

	let err = Tokenizer::with_scope(&scope)
		.with_options(TokenizeOptions::default().with_max_depth(3))
		.tokenize("(x)", &grammar)
		.unwrap_err();
	assert_eq!(err, TokenizeError::DepthExceeded { limit: 3 });
}

#[test]
fn test_empty_input() {
	let grammar = Grammar::new().with("x", rule("x"));
	assert!(run("", &grammar).is_empty());
}

fn mixed_grammar() -> Grammar {
	Grammar::new()
		.with("comment", rule(r"/\*[\s\S]*?(?:\*/|$)").greedy())
		.with("string", rule(r#"(["'])(?:\\.|(?!\1)[^\\\r\n])*\1"#).greedy())
		.with("variable", rule(r"(^|[^\\])\$\w+").lookbehind())
		.with(
			"tag",
			rule("<[^>]*>").inside(Grammar::new().with("punctuation", rule("[<>/]"))),
		)
		.with("number", rule(r"\b\d+\b"))
		.with("word", [rule("[a-z]+"), rule("[A-Z]+").alias("constant")])
}

proptest! {
	#[test]
	fn tokenize_preserves_text(text in r#"[a-zA-Z0-9 <>/*$\\'"\né]{0,48}"#) {
		let out = run(&text, &mixed_grammar());
		prop_assert_eq!(out.text(), text);
	}

	#[test]
	fn tokenize_never_emits_empty_tokens(text in r#"[a-z0-9 /*$'"]{0,32}"#) {
		let out = run(&text, &mixed_grammar());
		prop_assert!(out.tokens().all(|t| !t.text().is_empty()));
		prop_assert!(out.iter().all(|n| !n.text().is_empty()));
	}
}
