//! Language components and their registry.
//!
//! A [`Component`] names a grammar, the ids it depends on, and how it embeds
//! into other languages. The [`Registry`] stores components, builds their
//! grammars lazily in dependency order, and resolves [`Language`] snapshots
//! whose id references are all bound.
//!
//! ```ignore
//! let registry = Registry::new();
//! registry.register(Component::new("csv").grammar(csv_grammar));
//! let tokens = registry.tokenize("a,b", "csv")?;
//! ```

mod component;
mod error;
mod language;
mod registry;

pub use component::{Component, Context, Factory};
pub use error::{BuildError, RegistryError};
pub use language::Language;
pub use registry::Registry;
