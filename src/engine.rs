use crate::{
    compile::{Expression, Parser},
    filter::{Filter, FilterSpec},
    log::{error_missing_expression, Error, INVALID_FILTER},
    render::Renderer,
    store::Store,
    value::Value,
};
use std::collections::HashMap;

/// Facilitates compiling and rendering expressions, and provides storage
/// for filters.
///
/// The engine is the registry the compiler validates filter names and
/// call shapes against, and the place render-time filter functions come
/// from. Register every filter once at startup, then share the engine
/// freely; compilation and rendering never mutate it.
pub struct Engine {
    /// Filters that this engine is aware of, with their call contracts.
    filters: HashMap<String, (FilterSpec, Box<dyn Filter>)>,
    /// Compiled expressions stored by name.
    expressions: HashMap<String, Expression>,
    /// Text rendered in place of a value that failed to resolve.
    invalid_text: String,
}

impl Engine {
    /// Create a new instance of [`Engine`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text rendered in place of a value that failed to resolve.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::{Engine, Store};
    ///
    /// let engine = Engine::default().with_invalid_text("INVALID");
    /// let expression = engine.compile_must("missing");
    ///
    /// let result = engine.render(&expression, &Store::new());
    /// assert_eq!(result.unwrap(), "INVALID");
    /// ```
    pub fn with_invalid_text<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.invalid_text = text.into();
        self
    }

    /// Return the text rendered in place of a value that failed to resolve.
    #[inline]
    pub fn get_invalid_text(&self) -> &str {
        &self.invalid_text
    }

    /// Compile a new [`Expression`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which most likely means
    /// the source contains invalid syntax, or uses a filter in a way this
    /// engine does not recognize.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Engine;
    ///
    /// let engine = Engine::default();
    /// let expression = engine.compile("person.name");
    /// assert!(expression.is_ok());
    /// ```
    #[inline]
    pub fn compile(&self, text: &str) -> Result<Expression, Error> {
        Parser::new(text, self).compile(None)
    }

    /// Compile a new [`Expression`].
    ///
    /// # Panics
    ///
    /// Panics when compilation fails, which most likely means the source
    /// contains invalid syntax, or uses a filter in a way this engine does
    /// not recognize.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Engine;
    ///
    /// let engine = Engine::default();
    /// let expression = engine.compile_must("person.name");
    /// ```
    #[inline]
    pub fn compile_must(&self, text: &str) -> Expression {
        self.compile(text).unwrap()
    }

    /// Evaluate an [`Expression`] with the given [`Store`] and return the
    /// final pipeline value.
    ///
    /// The returned value may be [`Value::Invalid`] when resolution failed
    /// quietly; [`render`][`Engine::render`] substitutes the engine's
    /// invalid text for it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a [`Filter`] returns an `Error` itself, or
    /// a context object surfaces a fault that is not silent.
    #[inline]
    pub fn evaluate(&self, expression: &Expression, store: &Store) -> Result<Value, Error> {
        Renderer::new(self, expression, store).evaluate()
    }

    /// Render an [`Expression`] with the given [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering fails, which may happen when a
    /// [`Filter`] returns an `Error` itself, or a context object surfaces
    /// a fault that is not silent.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::{Engine, Store};
    ///
    /// let engine = Engine::default();
    /// let expression = engine.compile_must("name");
    /// let result = engine.render(&expression, &Store::new().with_must("name", "taylor"));
    ///
    /// assert_eq!(result.unwrap(), "taylor")
    /// ```
    #[inline]
    pub fn render(&self, expression: &Expression, store: &Store) -> Result<String, Error> {
        Renderer::new(self, expression, store).render()
    }

    /// Render the [`Expression`] stored under the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no expression with the given name exists
    /// in the engine, or when rendering it fails.
    pub fn render_named(&self, name: &str, store: &Store) -> Result<String, Error> {
        match self.get_expression(name) {
            Some(expression) => self.render(expression, store),
            None => Err(error_missing_expression(name)),
        }
    }

    /// Compile and store a new [`Expression`] with the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an `Expression` with the given name
    /// already exists, or when compilation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Engine;
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_expression("greeting", "person.name");
    /// assert!(result.is_ok());
    ///
    /// let second = engine.add_expression("greeting", "person.name");
    /// assert!(second.is_err());
    /// ```
    pub fn add_expression(&mut self, name: &str, text: &str) -> Result<(), Error> {
        if self.expressions.contains_key(name) {
            return Err(Error::build(format!(
                "expression with name `{name}` already exists in engine, \
                overwrite it with `.add_expression_must`"
            )));
        }

        let expression = Parser::new(text, self)
            .compile(Some(name))
            .map_err(|e| e.with_name(name))?;

        self.expressions.insert(name.to_owned(), expression);
        Ok(())
    }

    /// Compile and store a new [`Expression`] with the given name.
    ///
    /// If an `Expression` with the given name already exists in the
    /// [`Engine`], it is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails.
    pub fn add_expression_must(&mut self, name: &str, text: &str) -> Result<(), Error> {
        let expression = Parser::new(text, self)
            .compile(Some(name))
            .map_err(|e| e.with_name(name))?;

        self.expressions.insert(name.to_owned(), expression);
        Ok(())
    }

    /// Return the named [`Expression`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Engine;
    ///
    /// let mut engine = Engine::default();
    /// engine.add_expression("greeting", "person.name").unwrap();
    ///
    /// let expression = engine.get_expression("greeting");
    /// assert!(expression.is_some());
    /// ```
    pub fn get_expression(&self, name: &str) -> Option<&Expression> {
        self.expressions.get(name)
    }

    /// Add a [`Filter`] with the given [`FilterSpec`].
    ///
    /// # Errors
    ///
    /// If a `Filter` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::{
    ///     filter::{Arity, Error, FilterSpec},
    ///     Engine, Store, Value,
    /// };
    ///
    /// fn to_lowercase(value: &Value, _: Option<&Value>) -> Result<Value, Error> {
    ///     match value {
    ///         Value::String(string) => Ok(Value::from(string.to_lowercase())),
    ///         _ => Err(Error::build("filter `to_lowercase` requires string input")
    ///            .with_help("use quotes to coerce data to string")
    ///         ),
    ///     }
    /// }
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_filter("to_lowercase", FilterSpec::new(Arity::None), to_lowercase);
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn add_filter<T>(&mut self, name: &str, spec: FilterSpec, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        if self.filters.contains_key(name) {
            return Err(Error::build(INVALID_FILTER).with_help(format!(
                "filter with name `{name}` already exists in engine, \
                overwrite it with `.add_filter_must`"
            )));
        }
        self.filters
            .insert(name.to_owned(), (spec, Box::new(filter)));
        Ok(())
    }

    /// Add a [`Filter`] with the given [`FilterSpec`].
    ///
    /// If a `Filter` with the given name already exists in the [`Engine`],
    /// it is overwritten.
    #[inline]
    pub fn add_filter_must<T>(&mut self, name: &str, spec: FilterSpec, filter: T)
    where
        T: Filter + 'static,
    {
        self.filters
            .insert(name.to_owned(), (spec, Box::new(filter)));
    }

    /// Add a [`Filter`] with the given [`FilterSpec`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// If a `Filter` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    #[inline]
    pub fn with_filter<T>(mut self, name: &str, spec: FilterSpec, filter: T) -> Result<Self, Error>
    where
        T: Filter + 'static,
    {
        self.add_filter(name, spec, filter)?;
        Ok(self)
    }

    /// Add a [`Filter`] with the given [`FilterSpec`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// If a `Filter` with the given name already exists in the engine, it
    /// is overwritten.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::{
    ///     filter::{Arity, Error, FilterSpec},
    ///     Engine, Value,
    /// };
    ///
    /// fn to_lowercase(value: &Value, _: Option<&Value>) -> Result<Value, Error> {
    ///     match value {
    ///         Value::String(string) => Ok(Value::from(string.to_lowercase())),
    ///         _ => Err(Error::build("filter `to_lowercase` requires string input")),
    ///     }
    /// }
    ///
    /// let engine = Engine::default()
    ///     .with_filter_must("to_lowercase", FilterSpec::new(Arity::None), to_lowercase);
    /// ```
    #[inline]
    pub fn with_filter_must<T>(mut self, name: &str, spec: FilterSpec, filter: T) -> Self
    where
        T: Filter + 'static,
    {
        self.add_filter_must(name, spec, filter);
        self
    }

    /// Return the filter with the given name, if it exists in the Engine.
    #[inline]
    pub fn get_filter(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|(_, filter)| filter.as_ref())
    }

    /// Return the [`FilterSpec`] registered under the given name, if any.
    #[inline]
    pub fn get_filter_spec(&self, name: &str) -> Option<&FilterSpec> {
        self.filters.get(name).map(|(spec, _)| spec)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            filters: HashMap::new(),
            expressions: HashMap::new(),
            invalid_text: String::new(),
        }
    }
}
