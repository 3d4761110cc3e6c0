use crate::{
    compile::tree::{Base, Expression},
    log::{error_write, Error, INVALID_FILTER},
    pipe::Pipe,
    resolve::resolve_path,
    store::Store,
    value::Value,
    Engine,
};

/// Render a compiled [`Expression`].
///
/// Provides a shortcut to quickly render an `Expression` when no custom
/// filters or configuration are needed.
///
/// You may also prefer to create an [`Engine`][`crate::Engine`] if you
/// intend to use filters in your expressions, or want to configure the
/// invalid text.
///
/// # Examples
///
/// ```
/// use sluice::{compile, render, Store};
///
/// let expression = compile("name");
/// assert!(expression.is_ok());
///
/// let output = render(&expression.unwrap(), &Store::new().with_must("name", "taylor"));
/// assert_eq!(output.unwrap(), "taylor");
/// ```
pub fn render(expression: &Expression, store: &Store) -> Result<String, Error> {
    Renderer::new(&Engine::default(), expression, store).render()
}

/// Executes the filter pipeline of a compiled [`Expression`].
pub struct Renderer<'engine, 'store> {
    /// An engine containing any registered filters and the invalid text.
    engine: &'engine Engine,
    /// The expression being rendered.
    expression: &'engine Expression,
    /// The Store that the expression is rendered against.
    store: &'store Store,
}

impl<'engine, 'store> Renderer<'engine, 'store> {
    /// Create a new Renderer.
    pub fn new(
        engine: &'engine Engine,
        expression: &'engine Expression,
        store: &'store Store,
    ) -> Self {
        Renderer {
            engine,
            expression,
            store,
        }
    }

    /// Evaluate the [`Expression`] and return the final pipeline value.
    ///
    /// The base is resolved first, then every filter is applied in order,
    /// each receiving the value produced so far. A value that failed to
    /// resolve flows through the pipeline as [`Value::Invalid`]; filters
    /// still run on it unless their contract short circuits, since a
    /// filter may have defined behavior for invalid input.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] in these cases:
    ///
    /// - Resolving the base or an argument surfaces a fault that is not
    ///   silent.
    /// - A filter named by the expression is not registered on the engine.
    /// - Executing a [`Filter`][`crate::filter::Filter`] returns an
    ///   `Error` itself.
    pub fn evaluate(&self) -> Result<Value, Error> {
        let source = self.expression.get_source();
        let mut value = self.evaluate_base(&self.expression.base)?;

        for step in &self.expression.filters {
            let name = step.name.literal(source);
            let filter = self.engine.get_filter(name).ok_or_else(|| {
                Error::build(INVALID_FILTER)
                    .with_pointer(source, step.name)
                    .with_help(format!(
                        "expression wants to use the `{name}` filter, but a filter with that \
                        name was not found in this engine, did you add the filter to the engine \
                        with `.add_filter` or `.add_filter_must`?"
                    ))
            })?;

            let argument = match &step.argument {
                Some(base) => Some(self.evaluate_base(base)?),
                None => None,
            };

            if value.is_invalid() && step.spec.short_circuits() {
                continue;
            }

            value = filter
                .apply(&value, argument.as_ref())
                .map_err(|e| e.with_pointer(source, step.name))?;
        }

        Ok(value)
    }

    /// Render the [`Expression`] stored inside the [`Renderer`].
    ///
    /// A final pipeline value of [`Value::Invalid`] renders as the
    /// engine's configured invalid text instead of the sentinel itself.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when evaluation fails, or writing the rendered
    /// value to the buffer fails.
    pub fn render(&self) -> Result<String, Error> {
        let value = self.evaluate()?;
        if value.is_invalid() {
            return Ok(self.engine.get_invalid_text().to_owned());
        }

        let mut buffer = String::new();
        Pipe::new(&mut buffer)
            .write_value(&value)
            .map_err(|_| error_write())?;

        Ok(buffer)
    }

    /// Evaluate a [`Base`] to return a [`Value`].
    ///
    /// A literal produces its stored value; a variable is resolved against
    /// the store, which may quietly produce [`Value::Invalid`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when resolution surfaces a fault that is not
    /// silent.
    fn evaluate_base(&self, base: &Base) -> Result<Value, Error> {
        match base {
            Base::Literal(literal) => Ok(literal.value.clone()),
            Base::Variable(variable) => {
                resolve_path(self.expression.get_source(), &variable.path, self.store)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use crate::{
        engine::Engine,
        filter::{Arity, FilterSpec},
        log::{Error, Fault},
        store::Store,
        value::{Object, Value},
    };
    use std::fmt::{Display, Formatter};

    #[test]
    fn test_render_variable() {
        let engine = get_test_engine();
        let result = engine.render(
            &engine.compile_must("name"),
            &Store::new().with_must("name", "taylor"),
        );

        assert_eq!(result.unwrap(), "taylor");
    }

    #[test]
    fn test_filters_apply_left_to_right() {
        let engine = get_test_engine();
        let result = engine.render(
            &engine.compile_must("sentence | upper | lower"),
            &Store::new().with_must("sentence", "Writing Templates Is The Greatest!"),
        );

        assert_eq!(result.unwrap(), "writing templates is the greatest!");
    }

    #[test]
    fn test_literal_base_feeds_pipeline() {
        let engine = get_test_engine();
        let result = engine.render(&engine.compile_must("\"Loud\" | upper"), &Store::new());

        assert_eq!(result.unwrap(), "LOUD");
    }

    #[test]
    fn test_empty_string_base_is_not_missing() {
        let engine = get_test_engine();
        let result = engine.render(
            &engine.compile_must("\"\" | default_if_none:\"was none\""),
            &Store::new(),
        );

        assert_eq!(result.unwrap(), "");
    }

    #[test]
    fn test_string_argument_carries_unescaped_text() {
        let engine = get_test_engine();
        let store = Store::new().with_must("var", ());

        let expression = engine.compile_must(r#"var | default_if_none:" endquote\" hah""#);
        assert_eq!(engine.render(&expression, &store).unwrap(), r#" endquote" hah"#);

        let expression = engine.compile_must(r#"var | default_if_none:"foo\bar""#);
        assert_eq!(engine.render(&expression, &store).unwrap(), r"foo\bar");

        let expression = engine.compile_must(r#"var | default_if_none:"foo\now""#);
        assert_eq!(engine.render(&expression, &store).unwrap(), r"foo\now");
    }

    #[test]
    fn test_variable_argument() {
        let engine = get_test_engine();
        let result = engine.render(
            &engine.compile_must("var | default_if_none:var2"),
            &Store::new().with_must("var", ()).with_must("var2", "happy"),
        );

        assert_eq!(result.unwrap(), "happy");
    }

    #[test]
    fn test_missing_root_renders_invalid_text() {
        let engine = get_test_engine();
        let expression = engine.compile_must("missing");

        assert_eq!(engine.render(&expression, &Store::new()).unwrap(), "");

        let loud = get_test_engine().with_invalid_text("INVALID");
        let expression = loud.compile_must("missing");
        assert_eq!(loud.render(&expression, &Store::new()).unwrap(), "INVALID");
    }

    #[test]
    fn test_invalid_flows_through_filters() {
        // The `upper` fixture passes the sentinel through untouched, so
        // the final value is still invalid and renders as the configured
        // text.
        let engine = get_test_engine().with_invalid_text("INVALID");
        let expression = engine.compile_must("missing | upper");

        assert_eq!(engine.render(&expression, &Store::new()).unwrap(), "INVALID");
    }

    #[test]
    fn test_short_circuit_skips_invocation() {
        // `strict` errors when invoked at all, but its contract short
        // circuits on invalid input, so the render succeeds.
        let engine = get_test_engine();
        let expression = engine.compile_must("missing | strict");

        assert_eq!(engine.render(&expression, &Store::new()).unwrap(), "");
    }

    #[test]
    fn test_invalid_argument_does_not_abort() {
        let engine = get_test_engine();
        let expression = engine.compile_must("var | default_if_none:missing");
        let result = engine.render(&expression, &Store::new().with_must("var", ()));

        // The argument failed to resolve, so the filter returned the
        // sentinel and the render substituted the invalid text.
        assert_eq!(result.unwrap(), "");
    }

    #[test]
    fn test_silent_fault_renders_invalid_text() {
        let engine = get_test_engine();
        let expression = engine.compile_must("account.closed_quietly");
        let result = engine.render(&expression, &account_store());

        assert_eq!(result.unwrap(), "");
    }

    #[test]
    fn test_loud_fault_aborts_render() {
        let engine = get_test_engine();
        let expression = engine.compile_must("account.closed_loudly");
        let result = engine.render(&expression, &account_store());

        assert!(result.is_err());
    }

    #[test]
    fn test_render_scalars() {
        let engine = get_test_engine();
        let store = Store::new()
            .with_must("count", 10)
            .with_must("ratio", 2.5)
            .with_must("flag", true);

        assert_eq!(engine.render(&engine.compile_must("count"), &store).unwrap(), "10");
        assert_eq!(engine.render(&engine.compile_must("ratio"), &store).unwrap(), "2.5");
        assert_eq!(engine.render(&engine.compile_must("flag"), &store).unwrap(), "true");
    }

    #[test]
    fn test_renderer_direct() {
        let engine = get_test_engine();
        let expression = engine.compile_must("name | upper");
        let store = Store::new().with_must("name", "taylor");
        let result = Renderer::new(&engine, &expression, &store).evaluate();

        assert_eq!(result.unwrap(), Value::from("TAYLOR"));
    }

    /// Return a new Engine equipped with test filters.
    fn get_test_engine() -> Engine {
        Engine::default()
            .with_filter_must("upper", FilterSpec::new(Arity::None), upper)
            .with_filter_must("lower", FilterSpec::new(Arity::None), lower)
            .with_filter_must(
                "default_if_none",
                FilterSpec::new(Arity::Required),
                default_if_none,
            )
            .with_filter_must(
                "strict",
                FilterSpec::new(Arity::None).short_circuit(),
                strict,
            )
    }

    /// Return a Store holding an Account object under "account".
    fn account_store() -> Store {
        Store::new().with_value("account", Value::from_object(Account))
    }

    /// Uppercase the given value, passing anything else through.
    fn upper(value: &Value, _: Option<&Value>) -> Result<Value, Error> {
        match value {
            Value::String(string) => Ok(Value::from(string.to_uppercase())),
            other => Ok(other.clone()),
        }
    }

    /// Lowercase the given value, passing anything else through.
    fn lower(value: &Value, _: Option<&Value>) -> Result<Value, Error> {
        match value {
            Value::String(string) => Ok(Value::from(string.to_lowercase())),
            other => Ok(other.clone()),
        }
    }

    /// Replace a null input with the argument.
    fn default_if_none(value: &Value, argument: Option<&Value>) -> Result<Value, Error> {
        match value {
            Value::Null => Ok(argument.cloned().unwrap_or(Value::Null)),
            other => Ok(other.clone()),
        }
    }

    /// A Filter that refuses to run at all.
    fn strict(_: &Value, _: Option<&Value>) -> Result<Value, Error> {
        Err(Error::build("filter `strict` should have been skipped"))
    }

    /// An Object used to test fault handling during a render.
    #[derive(Debug)]
    struct Account;

    impl Object for Account {
        fn has_attribute(&self, name: &str) -> bool {
            matches!(name, "closed_quietly" | "closed_loudly")
        }

        fn attribute(&self, name: &str) -> Result<Value, Box<dyn Fault>> {
            match name {
                "closed_quietly" => Err(Box::new(Closed { silent: true })),
                "closed_loudly" => Err(Box::new(Closed { silent: false })),
                _ => unreachable!("attribute is only called after has_attribute"),
            }
        }
    }

    /// A Fault raised by the Account object.
    #[derive(Debug)]
    struct Closed {
        silent: bool,
    }

    impl Display for Closed {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "account is closed")
        }
    }

    impl Fault for Closed {
        fn is_silent(&self) -> bool {
            self.silent
        }
    }
}
