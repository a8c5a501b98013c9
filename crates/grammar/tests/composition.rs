//! Composition changes tokenization only through rule order.
#![allow(unused_crate_dependencies)]

use hue_grammar::{Grammar, PathSegment, Rule, tokenize};
use pretty_assertions::assert_eq;
use serde_json::json;

fn rule(src: &str) -> Rule {
	Rule::new(src).unwrap()
}

fn base() -> Grammar {
	Grammar::new()
		.with("comment", rule(r"//.*").greedy())
		.with("keyword", rule(r"\b(?:if|let)\b"))
		.with("number", rule(r"\b\d+\b"))
		.with("punctuation", rule(r"[{}();]"))
}

#[test]
fn test_insert_before_takes_priority() {
	let derived = base()
		.insert_before(
			"keyword",
			Grammar::new().with("constant", rule(r"\b[A-Z]+\b")),
		)
		.unwrap()
		.extend(Grammar::new().with("keyword", rule(r"\b(?:if|let|LET)\b")));

	assert_eq!(
		tokenize("LET x", &derived).unwrap().to_simplified(),
		json!([["constant", "LET"], " x"])
	);
	assert_eq!(
		tokenize("LET x", &base()).unwrap().to_simplified(),
		json!(["LET x"])
	);
}

#[test]
fn test_moved_key_changes_winner() {
	let grammar = Grammar::new()
		.with("word", rule(r"\w+"))
		.with("number", rule(r"\d+"));
	let reordered = grammar
		.insert_before("word", Grammar::new().with("number", rule(r"\d+")))
		.unwrap();

	assert_eq!(tokenize("42", &grammar).unwrap().to_simplified(), json!([["word", "42"]]));
	assert_eq!(tokenize("42", &reordered).unwrap().to_simplified(), json!([["number", "42"]]));
}

#[test]
fn test_nested_insertion_is_visible_only_in_copy() {
	let call = Grammar::new().with(
		"call",
		rule(r"\w+\([^)]*\)").inside(Grammar::new().with("punctuation", rule("[()]"))),
	);
	let with_args = call
		.insert_before_in(
			&[PathSegment::new("call")],
			"punctuation",
			Grammar::new().with("number", rule(r"\d+")),
		)
		.unwrap();

	assert_eq!(
		tokenize("f(1)", &with_args).unwrap().to_simplified(),
		json!([["call", ["f", ["punctuation", "("], ["number", "1"], ["punctuation", ")"]]]])
	);
	assert_eq!(
		tokenize("f(1)", &call).unwrap().to_simplified(),
		json!([["call", ["f", ["punctuation", "("], "1", ["punctuation", ")"]]]])
	);
}
