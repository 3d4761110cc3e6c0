//! Sluice - Filter Pipeline Expressions
//!
//! Compiles expressions such as `person.name | upper | append:"!"` into an
//! immutable [`Expression`], and renders them against a [`Store`].
//!
//! ```
//! use sluice::{Engine, Store};
//!
//! let engine = Engine::default();
//! let expression = engine.compile("person.name").unwrap();
//! let store = Store::new().with_must("person", serde_json::json!({"name": "taylor"}));
//!
//! assert_eq!(engine.render(&expression, &store).unwrap(), "taylor");
//! ```
mod compile;
mod engine;
mod log;
mod pipe;
mod region;
mod render;
mod resolve;
mod store;
mod value;

pub mod filter;

pub use compile::{compile, tree, Expression, Parser};
pub use engine::Engine;
pub use log::{Error, Fault, Notice};
pub use region::Region;
pub use render::{render, Renderer};
pub use store::Store;
pub use value::{Object, Value};

/// Create a new [`Engine`] with no filters registered.
///
/// Shorthand for [`Engine::default`].
pub fn default() -> Engine {
    Engine::default()
}
