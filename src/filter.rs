//! Contains the `Filter` trait and other types useful for creating and using filters.
//!
//! A filter is any type which implements the [`Filter`][`crate::filter::Filter`] trait.
//! You can assign a filter to an [`Engine`][`crate::Engine`] with the
//! [`add_filter`][`crate::Engine::add_filter()`] method, and it will be available in any
//! expression compiled by that engine.
//!
//! Given this expression:
//!
//! ```html
//! name | append:"!" | upper
//! ```
//!
//! The "name" value is not quoted, and so it is perceived to be a variable and not a
//! literal string. Upon rendering this expression, Sluice will search the
//! [`Store`][`crate::Store`] for "name" and use that value as the input for the first
//! filter in the chain.
//!
//! The pipe "|" denotes that the following identifier is the name of a filter.
//! Sluice will search for a filter with the name of "append" and execute it with
//! whatever "name" evaluated to.
//!
//! A filter receives at most one argument, introduced by a colon. The argument
//! may be a quoted string literal, a number, a boolean, or another variable
//! path that is resolved against the same store when the expression is
//! rendered.
//!
//! Each filter is registered together with a [`FilterSpec`] describing its
//! call contract. The compiler checks every expression against the contract,
//! so a filter body never sees an argument shape it did not declare.
//!
//! # Examples
//!
//! We'll create a filter that allows us to access the
//! [`to_lowercase`](https://doc.rust-lang.org/std/primitive.str.html#method.to_lowercase)
//! function available in the standard library.
//!
//! You can either create a struct and implement the trait on that, or just create
//! a function matching the trait signature. Sluice will accept both.
//!
//! Here we use a function:
//!
//! ```rust
//! use sluice::{
//!     filter::{Arity, Error, FilterSpec},
//!     Store, Value,
//! };
//!
//! fn to_lowercase(value: &Value, _: Option<&Value>) -> Result<Value, Error> {
//!     match value {
//!         Value::String(string) => Ok(Value::from(string.to_lowercase())),
//!         _ => Err(Error::build("filter `to_lowercase` requires string input")
//!             .with_help("use quotes to coerce data to string")),
//!     }
//! }
//!
//! let engine = sluice::default()
//!     .with_filter_must("to_lowercase", FilterSpec::new(Arity::None), to_lowercase);
//!
//! let expression = engine.compile("name | to_lowercase");
//!
//! let result = engine.render(
//!     &expression.unwrap(),
//!     &Store::new().with_must("name", "TAYLOR"),
//! );
//!
//! assert_eq!(result.unwrap(), "taylor");
//! ```
//!
//! If you return an [`Error`][`crate::filter::Error`] in your filter without using the
//! [`with_visual`][`crate::filter::Error::with_visual`] method to set your own
//! visualization, Sluice will automatically generate one that points to the filter.

pub mod serde {
    //! Contains types from `serde_json`.
    pub use serde_json::*;
}
pub mod visual {
    //! Contains the `Visual` trait and different types which implement `Visual`.
    pub use crate::log::{Pointer, Visual};
}

pub use crate::{log::Error, region::Region};

use crate::value::Value;

/// Describes a type which can be used to transform the value flowing through
/// an expression.
pub trait Filter: Sync + Send {
    /// Execute the filter with the given input and return a new Value as output.
    ///
    /// The input may be the invalid sentinel when an earlier part of the
    /// expression failed to resolve, unless the filter's [`FilterSpec`] is
    /// marked to short circuit. The argument, when present, may be the
    /// invalid sentinel for the same reason.
    fn apply(&self, input: &Value, argument: Option<&Value>) -> Result<Value, Error>;
}

/// Allows assignment of any function matching the signature of `apply` as a `Filter`
/// to `Engine`, instead of requiring a struct be created.
impl<F> Filter for F
where
    F: Fn(&Value, Option<&Value>) -> Result<Value, Error> + Sync + Send,
{
    fn apply(&self, input: &Value, argument: Option<&Value>) -> Result<Value, Error> {
        self(input, argument)
    }
}

/// The number of arguments a filter accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    /// The filter accepts no argument.
    None,
    /// The filter may be called with or without an argument.
    Optional,
    /// The filter requires an argument.
    Required,
}

/// The call contract of a registered filter.
///
/// The compiler validates every use of a filter against its `FilterSpec`
/// before the expression is accepted, so a mismatched argument shape is a
/// compile error and never reaches a render.
///
/// # Examples
///
/// ```
/// use sluice::filter::{Arity, FilterSpec};
///
/// let spec = FilterSpec::new(Arity::Optional)
///     .safe()
///     .legacy_without_argument();
///
/// assert_eq!(spec.get_arity(), Arity::Optional);
/// assert!(spec.is_safe());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// The number of arguments the filter accepts.
    arity: Arity,
    /// When true, the filter output needs no escaping consideration.
    safe: bool,
    /// When true, the filter is skipped instead of invoked when the value
    /// flowing into it is the invalid sentinel.
    short_circuit: bool,
    /// When true, calling the filter without an argument is a legacy shape
    /// and compilation collects a deprecation notice.
    legacy_without_argument: bool,
}

impl FilterSpec {
    /// Create a new [`FilterSpec`] with the given [`Arity`].
    pub fn new(arity: Arity) -> Self {
        Self {
            arity,
            safe: false,
            short_circuit: false,
            legacy_without_argument: false,
        }
    }

    /// Mark the filter output as needing no escaping consideration.
    ///
    /// The flag is carried for the surrounding output-safety system; this
    /// crate stores it and nothing more.
    pub fn safe(mut self) -> Self {
        self.safe = true;

        self
    }

    /// Skip the filter instead of invoking it when the value flowing into
    /// it is the invalid sentinel.
    pub fn short_circuit(mut self) -> Self {
        self.short_circuit = true;

        self
    }

    /// Mark a call without an argument as a legacy shape.
    ///
    /// Compiling such a call collects a deprecation
    /// [`Notice`][`crate::Notice`] on the expression. It never blocks
    /// compilation.
    pub fn legacy_without_argument(mut self) -> Self {
        self.legacy_without_argument = true;

        self
    }

    /// Return the [`Arity`] of the filter.
    pub fn get_arity(&self) -> Arity {
        self.arity
    }

    /// Return true when the filter output needs no escaping consideration.
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// Return true when the filter is skipped on invalid input.
    pub fn short_circuits(&self) -> bool {
        self.short_circuit
    }

    /// Return true when calling the filter without an argument is a legacy
    /// shape.
    pub fn is_legacy_without_argument(&self) -> bool {
        self.legacy_without_argument
    }
}
