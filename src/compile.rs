mod lex;
mod parse;

pub mod tree;

pub use parse::Parser;
pub use tree::Expression;

use crate::{log::Error, Engine};

/// Compile an [`Expression`] from the given text.
///
/// Provides a shortcut to quickly compile an `Expression` without creating
/// an `Engine`. The default engine has no filters, so an expression that
/// uses one reports an unknown filter; create an [`Engine`][`crate::Engine`]
/// and register the filters to compile filtered pipelines.
///
/// # Examples
///
/// ```
/// use sluice::compile;
///
/// let expression = compile("person.name");
/// assert!(expression.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Expression, Error> {
    Parser::new(text, &Engine::default()).compile(None)
}
