use std::sync::atomic::{AtomicUsize, Ordering};

use hue_grammar::{Inside, Rule};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use super::*;

fn rule(src: &str) -> Rule {
	Rule::new(src).unwrap()
}

fn leaf(id: &str, key: &str, pattern: &str) -> Component {
	Component::new(id).grammar(Grammar::new().with(key, rule(pattern)))
}

fn keys(grammar: &Grammar) -> Vec<&str> {
	grammar.keys().map(String::as_str).collect()
}

fn counting(id: &str, counter: &'static AtomicUsize) -> Component {
	Component::new(id).factory(move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(Grammar::new().with("word", rule(r"\w+")))
	})
}

#[test]
fn test_alias_names_canonical_grammar() {
	let registry = Registry::new();
	registry.register(leaf("javascript", "keyword", r"\bvar\b").alias("js"));

	let by_id = registry.grammar("javascript").unwrap();
	let by_alias = registry.grammar("js").unwrap();
	assert!(Arc::ptr_eq(&by_id, &by_alias));
	assert_eq!(registry.canonical_id("js").as_deref(), Some("javascript"));
	assert_eq!(registry.resolve("js").unwrap().id(), "javascript");
}

#[test]
fn test_factory_runs_lazily_once() {
	static BUILDS: AtomicUsize = AtomicUsize::new(0);
	let registry = Registry::new();
	registry.register(counting("lazy", &BUILDS));
	assert_eq!(BUILDS.load(Ordering::SeqCst), 0);

	registry.grammar("lazy").unwrap();
	registry.grammar("lazy").unwrap();
	registry.resolve("lazy").unwrap();
	assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unknown_language() {
	let registry = Registry::new();
	assert_eq!(
		registry.grammar("nope").unwrap_err(),
		RegistryError::UnknownLanguage("nope".into())
	);
}

#[test]
fn test_unknown_required_dependency() {
	let registry = Registry::new();
	registry.register(Component::new("ejs").require("markup"));

	assert_eq!(
		registry.grammar("ejs").unwrap_err(),
		RegistryError::UnknownDependency {
			id: "ejs".into(),
			dependency: "markup".into(),
		}
	);
}

#[test]
fn test_cycle_is_reported() {
	let registry = Registry::new();
	registry.register(Component::new("a").require("b"));
	registry.register(Component::new("b").require("c"));
	registry.register(Component::new("c").require("a"));

	assert_eq!(
		registry.grammar("a").unwrap_err(),
		RegistryError::CyclicDependency {
			cycle: vec!["a".into(), "b".into(), "c".into(), "a".into()],
		}
	);
}

#[test]
fn test_optional_dependency_is_best_effort() {
	let registry = Registry::new();
	registry.register(
		Component::new("haml")
			.require("ruby")
			.optional("css")
			.factory(|cx| {
				let mut grammar = Grammar::new().with("ruby", rule("=.*").inside(Inside::id("ruby")));
				if cx.language("css").is_some() {
					grammar.insert("css", rule(":css").inside(Inside::id("css")));
				}
				Ok(grammar)
			}),
	);
	registry.register(leaf("ruby", "symbol", r":\w+"));

	assert_eq!(keys(&registry.grammar("haml").unwrap()), ["ruby"]);
	assert_eq!(registry.load_order(&["haml"]).unwrap(), ["ruby", "haml"]);

	registry.register(leaf("css", "property", r"[a-z-]+(?=:)"));
	assert_eq!(keys(&registry.grammar("haml").unwrap()), ["ruby", "css"]);
	assert_eq!(registry.load_order(&["haml"]).unwrap(), ["ruby", "css", "haml"]);
}

#[test]
fn test_factory_sees_only_declared_dependencies() {
	let registry = Registry::new();
	registry.register(leaf("clike", "keyword", r"\bif\b"));
	registry.register(Component::new("sneaky").factory(|cx| Ok((*cx.require("clike")?).clone())));

	assert_eq!(
		registry.grammar("sneaky").unwrap_err(),
		RegistryError::Build {
			id: "sneaky".into(),
			source: BuildError::MissingDependency("clike".into()),
		}
	);
	registry.grammar("clike").unwrap();
}

#[test]
fn test_context_composes_dependencies() {
	let registry = Registry::new();
	registry.register(
		Component::new("clike").grammar(
			Grammar::new()
				.with("comment", rule("//.*"))
				.with("class-name", rule(r"\b[A-Z]\w*"))
				.with("keyword", rule(r"\bif\b")),
		),
	);
	registry.register(Component::new("rules").require("clike").factory(|cx| {
		let grammar = cx
			.extend("clike", Grammar::new().with("keyword", rule(r"\ballow\b")))?
			.without("class-name");
		Ok(grammar.insert_before("keyword", Grammar::new().with("path", rule(r"/\w+")))?)
	}));

	assert_eq!(keys(&registry.grammar("rules").unwrap()), ["comment", "path", "keyword"]);
	assert_eq!(
		keys(&registry.grammar("clike").unwrap()),
		["comment", "class-name", "keyword"]
	);
}

#[test]
fn test_insert_before_with_missing_anchor_fails_build() {
	let registry = Registry::new();
	registry.register(leaf("base", "a", "a"));
	registry.register(
		Component::new("derived")
			.require("base")
			.factory(|cx| cx.insert_before("base", "missing", Grammar::new())),
	);

	assert!(matches!(
		registry.grammar("derived").unwrap_err(),
		RegistryError::Build {
			source: BuildError::Compose(_),
			..
		}
	));
}

#[test]
fn test_reregistration_invalidates_dependents() {
	static DERIVED: AtomicUsize = AtomicUsize::new(0);
	let registry = Registry::new();
	registry.register(leaf("base", "a", "a"));
	registry.register(Component::new("derived").require("base").factory(|cx| {
		DERIVED.fetch_add(1, Ordering::SeqCst);
		cx.extend("base", Grammar::new().with("b", rule("b")))
	}));
	registry.register(leaf("unrelated", "x", "x"));

	let old = registry.grammar("derived").unwrap();
	let unrelated = registry.grammar("unrelated").unwrap();
	registry.register(leaf("base", "z", "z"));

	let new = registry.grammar("derived").unwrap();
	assert_eq!(keys(&old), ["a", "b"]);
	assert_eq!(keys(&new), ["z", "b"]);
	assert_eq!(DERIVED.load(Ordering::SeqCst), 2);
	assert!(Arc::ptr_eq(&unrelated, &registry.grammar("unrelated").unwrap()));
}

#[test]
fn test_reregistration_invalidates_bound_languages() {
	let registry = Registry::new();
	registry.register(leaf("num", "number", r"\d+"));
	registry.register(
		Component::new("list").grammar(Grammar::new().with("item", rule(r"\[[^\]]*\]").inside(Inside::id("num")))),
	);

	assert_eq!(
		registry.tokenize("[1]", "list").unwrap().to_simplified(),
		json!([["item", ["[", ["number", "1"], "]"]]])
	);
	registry.register(leaf("num", "digit", r"\d"));
	assert_eq!(
		registry.tokenize("[1]", "list").unwrap().to_simplified(),
		json!([["item", ["[", ["digit", "1"], "]"]]])
	);
}

#[test]
fn test_resolve_binds_references_transitively() {
	let registry = Registry::new();
	registry.register(leaf("c", "c", "c"));
	registry.register(
		Component::new("b").grammar(Grammar::new().with("b", rule("b+").inside(Inside::id("c")))),
	);
	registry.register(
		Component::new("a").grammar(
			Grammar::new()
				.with("a", rule(r"(\().*(?=\))").lookbehind().inside(Inside::id("a")))
				.with("b", rule("b").inside(Inside::id("b"))),
		),
	);

	let language = registry.resolve("a").unwrap();
	assert_eq!(language.bound_ids(), ["a", "b", "c"]);
	assert_eq!(
		language.tokenize("((x))").unwrap().to_simplified(),
		json!(["(", ["a", ["(", ["a", "x"], ")"]], ")"])
	);
}

#[test]
fn test_unregistered_reference_stays_text() {
	let registry = Registry::new();
	registry.register(
		Component::new("a").grammar(Grammar::new().with("code", rule("`[^`]*`").inside(Inside::id("ghost")))),
	);

	assert_eq!(
		registry.tokenize("`x`", "a").unwrap().to_simplified(),
		json!([["code", "`x`"]])
	);
}

#[test]
fn test_inline_embedding_patches_host() {
	let registry = Registry::new();
	registry.register(
		Component::new("markup").grammar(
			Grammar::new()
				.with("comment", rule("<!--[\\s\\S]*?-->"))
				.with("cdata", Rule::nocase(r"<!\[CDATA\[[\s\S]*?\]\]>").unwrap())
				.with("tag", rule(r"</?[a-z]+[^>]*>")),
		),
	);
	registry.register(leaf("css", "property", r"[a-z-]+(?=\s*:)").inline_into("markup", "style"));
	registry.register(leaf("js", "number", r"\d+").inline_into("markup", "script"));

	let markup = registry.grammar("markup").unwrap();
	assert_eq!(keys(&markup), ["comment", "style", "script", "cdata", "tag"]);
	assert_eq!(
		registry.tokenize("<style>a{b:c}</style>", "markup").unwrap().to_simplified(),
		json!([
			["tag", "<style>"],
			["style", [["language-css", ["a{", ["property", "b"], ":c}"]]]],
			["tag", "</style>"]
		])
	);

	registry.register(leaf("css", "property", "x"));
	assert_eq!(
		keys(&registry.grammar("markup").unwrap()),
		["comment", "script", "cdata", "tag"]
	);
}

#[test]
fn test_templated_embedding_requires_host() {
	let registry = Registry::new();
	let template = leaf("tpl", "tpl", r"\{\{[\s\S]*?\}\}").embedded_in("html");
	assert_eq!(template.requires(), ["html"]);
	registry.register(template);
	registry.register(leaf("markup", "tag", "<[^>]*>").alias("html"));

	assert_eq!(
		registry.grammar("tpl").unwrap().embedding(),
		Some(&Embedding::Templated {
			host: "markup".into()
		})
	);
	assert_eq!(
		registry.tokenize("<b>{{x}}</b>", "tpl").unwrap().to_simplified(),
		json!([["tag", "<b>"], ["tpl", "{{x}}"], ["tag", "</b>"]])
	);
}

#[rstest]
#[case::single(&["d"], &["a", "b", "c", "d"])]
#[case::shared(&["c", "b"], &["a", "c", "b"])]
#[case::alias(&["bee"], &["a", "b"])]
fn test_load_order(#[case] roots: &[&str], #[case] expected: &[&str]) {
	let registry = Registry::new();
	registry.register(Component::new("a"));
	registry.register(Component::new("b").require("a").alias("bee"));
	registry.register(Component::new("c").require("a"));
	registry.register(Component::new("d").require("b").optional("c").optional("zzz"));

	assert_eq!(registry.load_order(roots).unwrap(), expected);
}

#[test]
fn test_tokenize_grammar_binds_adhoc_references() {
	let registry = Registry::new();
	registry.register(leaf("num", "number", r"\d+"));
	let grammar = Grammar::new().with("group", rule(r"\(.*?\)").inside(Inside::id("num")));

	assert_eq!(
		registry.tokenize_grammar("(1)", &grammar).unwrap().to_simplified(),
		json!([["group", ["(", ["number", "1"], ")"]]])
	);
}

#[test]
fn test_options_apply_to_resolved_languages() {
	let registry = Registry::with_options(TokenizeOptions::default().with_max_attempts(1));
	registry.register(Component::new("ab").grammar(Grammar::new().with("a", rule("a")).with("b", rule("b"))));

	assert!(matches!(
		registry.tokenize("ab", "ab").unwrap_err(),
		RegistryError::Tokenize(_)
	));
	registry.set_options(TokenizeOptions::default());
	assert!(registry.tokenize("ab", "ab").is_ok());
}

#[test]
fn test_concurrent_resolution() {
	static BUILDS: AtomicUsize = AtomicUsize::new(0);
	let registry = Registry::new();
	registry.register(counting("shared", &BUILDS));

	std::thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				let out = registry.tokenize("hello world", "shared").unwrap();
				assert_eq!(out.text(), "hello world");
			});
		}
	});
	assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
}
