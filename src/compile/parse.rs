use crate::{
    compile::{
        lex::{is_ident, Lexer},
        tree::{Base, Expression, FilterStep, Literal, Variable},
    },
    engine::Engine,
    filter::Arity,
    log::{
        error_eof, Error, Notice, INVALID_ARGUMENT, INVALID_FILTER, INVALID_FILTER_NAME,
        INVALID_SYNTAX, UNEXPECTED_CHARACTER,
    },
    region::Region,
    value::Value,
};
use serde_json::Number;

/// Compiles expression text into an [`Expression`].
///
/// The parser validates as it goes. Filter names are checked against the
/// identifier class and then against the filters registered on the engine,
/// and every argument is checked against the call contract the name
/// resolved to, so a successfully compiled `Expression` is never partially
/// valid.
pub struct Parser<'source, 'engine> {
    /// Lexer used to read pieces of the source text.
    lexer: Lexer<'source>,
    /// The engine whose registered filters the expression is validated
    /// against.
    engine: &'engine Engine,
    /// Non-fatal diagnostics collected during compilation.
    notices: Vec<Notice>,
}

impl<'source, 'engine> Parser<'source, 'engine> {
    /// Create a new Parser from the given string.
    #[inline]
    pub fn new(source: &'source str, engine: &'engine Engine) -> Self {
        Self {
            lexer: Lexer::new(source),
            engine,
            notices: vec![],
        }
    }

    /// Compile the expression.
    ///
    /// Returns a new [`Expression`], which can be rendered with some Store
    /// data to receive output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source contains invalid syntax, names
    /// a filter not registered on the engine, or calls a filter with an
    /// argument shape its contract does not accept.
    pub fn compile(mut self, name: Option<&str>) -> Result<Expression, Error> {
        self.lexer.skip_whitespace();
        let base = self.parse_base()?;

        let mut filters = vec![];
        loop {
            self.lexer.skip_whitespace();
            if self.lexer.at_end() {
                break;
            }
            if !self.lexer.take('|') {
                return Err(self
                    .error_at_cursor(UNEXPECTED_CHARACTER)
                    .with_help("expected `|` or end of expression"));
            }

            filters.push(self.parse_filter()?);
        }

        Ok(Expression {
            source: self.lexer.source.to_owned(),
            name: name.map(str::to_owned),
            base,
            filters,
            notices: self.notices,
        })
    }

    /// Parse a filter step.
    ///
    /// Assumes the cursor sits after a pipe. The name is validated against
    /// the identifier class before the engine is consulted, so an illegal
    /// character is always reported as such and never as a missing filter.
    fn parse_filter(&mut self) -> Result<FilterStep, Error> {
        self.lexer.skip_whitespace();
        if self.lexer.at_end() {
            return Err(error_eof(self.lexer.source).with_help("expected a filter name after `|`"));
        }

        let name = self.lexer.lex_name();
        if name.begin == name.end {
            return Err(self
                .error_at_cursor(UNEXPECTED_CHARACTER)
                .with_help("expected a filter name after `|`"));
        }

        let text = name.literal(self.lexer.source);
        if let Some((offset, char)) = text.char_indices().find(|(_, c)| !is_ident(*c)) {
            let begin = name.begin + offset;

            return Err(Error::build(INVALID_FILTER_NAME)
                .with_pointer(self.lexer.source, begin..begin + char.len_utf8())
                .with_help(format!(
                    "character `{char}` is not allowed in filter names"
                )));
        }

        let spec = match self.engine.get_filter_spec(text) {
            Some(spec) => *spec,
            None => {
                return Err(Error::build(INVALID_FILTER)
                    .with_pointer(self.lexer.source, name)
                    .with_help(format!(
                        "expression wants to use the `{text}` filter, but a filter with that \
                        name was not found in this engine, did you add the filter to the engine \
                        with `.add_filter` or `.add_filter_must`?"
                    )))
            }
        };

        let argument = if self.lexer.take(':') {
            Some(self.parse_argument()?)
        } else {
            None
        };

        match spec.get_arity() {
            Arity::Required if argument.is_none() => {
                return Err(Error::build(INVALID_ARGUMENT)
                    .with_pointer(self.lexer.source, name)
                    .with_help(format!("filter `{text}` requires an argument")))
            }
            Arity::None if argument.is_some() => {
                return Err(Error::build(INVALID_ARGUMENT)
                    .with_pointer(
                        self.lexer.source,
                        argument.as_ref().unwrap().get_region(),
                    )
                    .with_help(format!("filter `{text}` does not accept an argument")))
            }
            Arity::Optional if argument.is_none() && spec.is_legacy_without_argument() => {
                self.notices.push(
                    Notice::build("deprecated filter call").with_help(format!(
                        "calling filter `{text}` without an argument is deprecated, \
                        pass the argument explicitly"
                    )),
                );
            }
            _ => {}
        }

        let region = match &argument {
            Some(base) => name.combine(base.get_region()),
            None => name,
        };

        Ok(FilterStep {
            name,
            argument,
            spec,
            region,
        })
    }

    /// Parse a Base.
    ///
    /// A Base may be returned as a Literal or Variable based on the value.
    ///
    /// ## Literal
    ///
    /// "hello world"
    ///
    /// 'hello world'
    ///
    /// -1000
    ///
    /// 10.2
    ///
    /// true
    ///
    /// ## Variable
    ///
    /// person.name
    fn parse_base(&mut self) -> Result<Base, Error> {
        match self.lexer.peek() {
            None => {
                Err(error_eof(self.lexer.source).with_help("expected a literal or a variable"))
            }
            Some('"') | Some('\'') => {
                let (string, region) = self.lexer.lex_quoted()?;

                Ok(Base::Literal(Literal {
                    value: Value::String(string),
                    region,
                }))
            }
            Some(_) => {
                let region = self.lexer.lex_bare();
                if region.begin == region.end {
                    return Err(self
                        .error_at_cursor(UNEXPECTED_CHARACTER)
                        .with_help("expected a literal or a variable"));
                }

                self.classify_bare(region)
            }
        }
    }

    /// Parse a filter argument.
    ///
    /// The argument begins immediately after the colon; whitespace between
    /// the colon and the argument is not accepted.
    fn parse_argument(&mut self) -> Result<Base, Error> {
        match self.lexer.peek() {
            None => Err(error_eof(self.lexer.source).with_help("expected an argument after `:`")),
            Some('"') | Some('\'') => {
                let (string, region) = self.lexer.lex_quoted()?;

                Ok(Base::Literal(Literal {
                    value: Value::String(string),
                    region,
                }))
            }
            Some(_) => {
                let region = self.lexer.lex_bare();
                if region.begin == region.end {
                    return Err(self
                        .error_at_cursor(INVALID_ARGUMENT)
                        .with_help("expected an argument after `:`"));
                }

                self.classify_bare(region)
            }
        }
    }

    /// Classify a bare token as a literal or a variable path.
    ///
    /// A token that reads as a number in full becomes a numeric literal,
    /// `true` and `false` become boolean literals, and everything else
    /// must be a valid dotted path.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the token is neither a literal nor a
    /// valid path.
    fn classify_bare(&self, region: Region) -> Result<Base, Error> {
        let text = region.literal(self.lexer.source);
        match text {
            "true" => {
                return Ok(Base::Literal(Literal {
                    value: Value::Bool(true),
                    region,
                }))
            }
            "false" => {
                return Ok(Base::Literal(Literal {
                    value: Value::Bool(false),
                    region,
                }))
            }
            _ => {}
        }

        let first = text
            .chars()
            .next()
            .expect("bare token should never be empty");
        if matches!(first, '+' | '-' | '0'..='9') {
            let window = text.strip_prefix('+').unwrap_or(text);
            if let Ok(number) = window.parse::<Number>() {
                return Ok(Base::Literal(Literal {
                    value: Value::Number(number),
                    region,
                }));
            }
        }

        let mut path = vec![];
        let mut begin = region.begin;
        for segment in text.split('.') {
            let end = begin + segment.len();
            if segment.is_empty() || segment.chars().any(|c| !is_ident(c)) {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(self.lexer.source, region)
                    .with_help(
                        "expected a literal such as `\"text\"` or `10`, or a variable path \
                        such as `one.two`",
                    ));
            }
            path.push(Region::new(begin..end));
            begin = end + 1;
        }

        Ok(Base::Variable(Variable { path }))
    }

    /// Return an [`Error`] pointing at the character under the cursor.
    fn error_at_cursor(&self, reason: &str) -> Error {
        let begin = self.lexer.cursor;
        let end = self
            .lexer
            .peek()
            .map(|c| begin + c.len_utf8())
            .unwrap_or(begin);

        Error::build(reason).with_pointer(self.lexer.source, begin..end)
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        compile::tree::{Base, Expression},
        engine::Engine,
        filter::{Arity, Error, FilterSpec},
        value::Value,
    };

    #[test]
    fn test_parse_plain_variable() {
        let expression = compile("person.name").unwrap();

        match &expression.base {
            Base::Variable(variable) => assert_eq!(variable.path.len(), 2),
            _ => panic!("dotted token should parse as a variable"),
        }
        assert!(expression.filters.is_empty());
    }

    #[test]
    fn test_parse_full_pipeline() {
        let expression = compile("name | append:\"!\" | upper").unwrap();

        assert_eq!(expression.filters.len(), 2);
        assert!(expression.filters[0].argument.is_some());
        assert!(expression.filters[1].argument.is_none());
    }

    #[test]
    fn test_spaces_around_pipe_are_insignificant() {
        let left = compile("name|upper").unwrap();

        assert_eq!(left, compile("name |upper").unwrap());
        assert_eq!(left, compile("name| upper").unwrap());
        assert_eq!(left, compile("  name  |  upper  ").unwrap());
    }

    #[test]
    fn test_unknown_filter() {
        let result = compile("name | does_not_exist");

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid filter"));
    }

    #[test]
    fn test_illegal_name_reported_before_lookup() {
        // `fil(ter)` is not registered either, but the illegal character
        // is reported on its own.
        let result = compile("name | fil(ter)");

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid filter name"));
    }

    #[test]
    fn test_required_argument_missing() {
        let result = compile("name | append");

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid argument"));
    }

    #[test]
    fn test_forbidden_argument_supplied() {
        let result = compile("name | upper:\"x\"");

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid argument"));
    }

    #[test]
    fn test_optional_argument_omitted() {
        let expression = compile("flag | yesno").unwrap();

        assert!(expression.filters[0].argument.is_none());
        assert!(expression.get_notices().is_empty());
    }

    #[test]
    fn test_legacy_shape_collects_notice() {
        let engine = get_test_engine();
        let expression = Parser::new("value | currency", &engine)
            .compile(None)
            .unwrap();

        assert_eq!(expression.get_notices().len(), 1);
        assert!(Parser::new("value | currency:\"usd\"", &engine)
            .compile(None)
            .unwrap()
            .get_notices()
            .is_empty());
    }

    #[test]
    fn test_empty_string_argument() {
        let expression = compile("items | append:\"\"").unwrap();

        match &expression.filters[0].argument {
            Some(Base::Literal(literal)) => assert_eq!(literal.value, Value::from("")),
            _ => panic!("empty quoted argument should be an empty string literal"),
        }
    }

    #[test]
    fn test_delimiter_escape_is_decoded() {
        let expression = compile(r#"name | append:" endquote\" hah""#).unwrap();

        match &expression.filters[0].argument {
            Some(Base::Literal(literal)) => {
                assert_eq!(literal.value, Value::from(r#" endquote" hah"#))
            }
            _ => panic!("quoted argument should be a string literal"),
        }
    }

    #[test]
    fn test_other_escapes_are_verbatim() {
        let foo_bar = compile(r#"name | append:"foo\bar""#).unwrap();
        match &foo_bar.filters[0].argument {
            Some(Base::Literal(literal)) => assert_eq!(literal.value, Value::from(r"foo\bar")),
            _ => panic!("quoted argument should be a string literal"),
        }

        let foo_now = compile(r#"name | append:"foo\now""#).unwrap();
        match &foo_now.filters[0].argument {
            Some(Base::Literal(literal)) => assert_eq!(literal.value, Value::from(r"foo\now")),
            _ => panic!("quoted argument should be a string literal"),
        }
    }

    #[test]
    fn test_pipe_inside_quotes_is_not_a_split_point() {
        let expression = compile(r#"name | append:"a|b" | upper"#).unwrap();

        assert_eq!(expression.filters.len(), 2);
    }

    #[test]
    fn test_numeric_argument() {
        let expression = compile("name | append:-10.5").unwrap();

        match &expression.filters[0].argument {
            Some(Base::Literal(literal)) => {
                assert_eq!(literal.value, Value::Number("-10.5".parse().unwrap()))
            }
            _ => panic!("numeric argument should be a number literal"),
        }
    }

    #[test]
    fn test_variable_argument() {
        let expression = compile("name | append:other.name").unwrap();

        match &expression.filters[0].argument {
            Some(Base::Variable(variable)) => assert_eq!(variable.path.len(), 2),
            _ => panic!("bare argument should be a variable path"),
        }
    }

    #[test]
    fn test_literal_bases() {
        assert!(matches!(
            compile("\"text\"").unwrap().base,
            Base::Literal(_)
        ));
        assert!(matches!(compile("10.5").unwrap().base, Base::Literal(_)));
        assert!(matches!(compile("true").unwrap().base, Base::Literal(_)));
    }

    #[test]
    fn test_malformed_base() {
        assert!(compile("").is_err());
        assert!(compile("   ").is_err());
        assert!(compile("one..two").is_err());
        assert!(compile(".leading").is_err());
        assert!(compile("trailing.").is_err());
        assert!(compile("-name").is_err());
    }

    #[test]
    fn test_unterminated_string() {
        assert!(compile(r#""name"#).is_err());
        assert!(compile(r#"name | append:"x"#).is_err());
    }

    #[test]
    fn test_dangling_pipe() {
        assert!(compile("name |").is_err());
        assert!(compile("name || upper").is_err());
    }

    #[test]
    fn test_missing_argument_after_colon() {
        assert!(compile("name | append:").is_err());
        assert!(compile("name | append: \"x\"").is_err());
    }

    #[test]
    fn test_trailing_garbage() {
        assert!(compile("name upper").is_err());
        assert!(compile("name | upper lower").is_err());
        assert!(compile("name | append:\"x\"y").is_err());
    }

    #[test]
    fn test_compiled_name_is_kept() {
        let engine = get_test_engine();
        let expression = Parser::new("name", &engine).compile(Some("greeting")).unwrap();

        assert_eq!(expression.get_name(), Some("greeting"));
    }

    /// Compile the given text against the test engine.
    fn compile(text: &str) -> Result<Expression, Error> {
        Parser::new(text, &get_test_engine()).compile(None)
    }

    /// Return a new Engine equipped with test filters.
    fn get_test_engine() -> Engine {
        Engine::default()
            .with_filter_must("upper", FilterSpec::new(Arity::None), pass)
            .with_filter_must("append", FilterSpec::new(Arity::Required), pass)
            .with_filter_must("yesno", FilterSpec::new(Arity::Optional), pass)
            .with_filter_must(
                "currency",
                FilterSpec::new(Arity::Optional).legacy_without_argument(),
                pass,
            )
    }

    /// A Filter used to test compilation. Returns its input unchanged.
    fn pass(value: &Value, _: Option<&Value>) -> Result<Value, Error> {
        Ok(value.clone())
    }
}
