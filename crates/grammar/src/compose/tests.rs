use pretty_assertions::assert_eq;

use super::*;
use crate::pattern::Rule;

fn rule(src: &str) -> Rule {
	Rule::new(src).unwrap()
}

fn order(g: &Grammar) -> Vec<&str> {
	g.keys().map(String::as_str).collect()
}

fn base() -> Grammar {
	Grammar::new()
		.with("x", rule("x"))
		.with("a", rule("a"))
		.with("y", rule("y"))
}

#[test]
fn test_extend_replaces_in_place() {
	let base = base();
	let out = base.extend(Grammar::new().with("a", rule("r1")));

	assert_eq!(order(&out), ["x", "a", "y"]);
	assert_eq!(out.get("a").unwrap()[0].pattern.source(), "r1");
	assert_eq!(base.get("a").unwrap()[0].pattern.source(), "a");
}

#[test]
fn test_extend_appends_new_keys() {
	let out = base().extend(Grammar::new().with("z", rule("r2")));
	assert_eq!(order(&out), ["x", "a", "y", "z"]);
}

#[test]
fn test_insert_before_moves_existing_key() {
	let base = Grammar::new().with("y", rule("y")).with("x", rule("x"));
	let out = base.insert_before("y", Grammar::new().with("x", rule("r3"))).unwrap();

	assert_eq!(order(&out), ["x", "y"]);
	assert_eq!(out.get("x").unwrap()[0].pattern.source(), "r3");
	assert_eq!(order(&base), ["y", "x"]);
}

#[test]
fn test_insert_before_keeps_key_already_in_front() {
	let base = Grammar::new().with("x", rule("x")).with("y", rule("y"));
	let out = base.insert_before("y", Grammar::new().with("x", rule("r3"))).unwrap();
	assert_eq!(order(&out), ["x", "y"]);
}

#[test]
fn test_insert_before_splices_several_in_order() {
	let out = base()
		.insert_before("a", Grammar::new().with("p", rule("p")).with("q", rule("q")))
		.unwrap();
	assert_eq!(order(&out), ["x", "p", "q", "a", "y"]);
}

#[test]
fn test_insert_before_missing_anchor() {
	let err = base().insert_before("nope", Grammar::new()).unwrap_err();
	assert_eq!(
		err,
		ComposeError::InvalidAnchor {
			anchor: "nope".into()
		}
	);
}

#[test]
fn test_insert_before_nested_is_copy_on_write() {
	let inner = Grammar::new().with("punctuation", rule("[.]"));
	let base = Grammar::new().with("block", rule("b+").inside(inner));

	let out = base
		.insert_before_in(
			&["block".into()],
			"punctuation",
			Grammar::new().with("variable", rule("v")),
		)
		.unwrap();

	let nested = out.nested(&["block".into()]).unwrap();
	assert_eq!(order(nested), ["variable", "punctuation"]);
	assert_eq!(order(base.nested(&["block".into()]).unwrap()), ["punctuation"]);
}

#[test]
fn test_nested_path_through_id_link_is_invalid() {
	let base = Grammar::new().with("code", rule(".+").inside(Inside::id("ruby")));
	let err = base
		.insert_before_in(&["code".into()], "x", Grammar::new())
		.unwrap_err();
	assert!(matches!(err, ComposeError::InvalidPath { .. }));
}

#[test]
fn test_nested_path_selects_alternative() {
	let base = Grammar::new().with(
		"attributes",
		vec![
			rule("a").inside(Grammar::new().with("one", rule("1"))),
			rule("b").inside(Grammar::new().with("two", rule("2"))),
		],
	);
	let path = [PathSegment::new("attributes").nth(1)];
	let out = base.update_in(&path, |g| Ok(g.without("two"))).unwrap();

	assert!(out.nested(&path).unwrap().is_empty());
	assert_eq!(order(out.nested(&["attributes".into()]).unwrap()), ["one"]);
}

#[test]
fn test_without_preserves_order() {
	assert_eq!(order(&base().without("a")), ["x", "y"]);
}
