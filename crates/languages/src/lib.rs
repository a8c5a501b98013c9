//! Bundled language components.
//!
//! # Languages
//!
//! * `markup` (`html`, `xml`, `svg`, `mathml`), `css`, `clike`
//! * `javascript` (`js`) and `ruby` (`rb`), both layered on `clike`
//! * `ada`, `csv`
//! * `ejs` (`eta`), templated over `markup`
//! * `haml`, `xeora` (`xeoracube`), `firestore-security-rules`
//!
//! `css` and `javascript` also take over `<style>` and `<script>` bodies in
//! `markup`.

use hue_registry::{Component, Registry};
use tracing::debug;

mod ada;
mod clike;
mod css;
mod csv;
mod ejs;
mod firestore;
mod haml;
mod javascript;
mod markup;
mod ruby;
mod xeora;

/// Every bundled component, dependencies first.
pub fn builtins() -> Vec<Component> {
	vec![
		markup::component(),
		css::component(),
		clike::component(),
		javascript::component(),
		ruby::component(),
		ada::component(),
		csv::component(),
		ejs::component(),
		firestore::component(),
		haml::component(),
		xeora::component(),
	]
}

/// Registers [`builtins`] into `registry`, replacing same-named components.
pub fn register_builtins(registry: &Registry) {
	let components = builtins();
	let count = components.len();
	for component in components {
		registry.register(component);
	}
	debug!(count, "builtin languages registered");
}

/// A fresh registry holding the bundled languages.
pub fn registry() -> Registry {
	let registry = Registry::new();
	register_builtins(&registry);
	registry
}
