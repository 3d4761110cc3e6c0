use crate::{
    log::{Error, INVALID_SYNTAX},
    region::Region,
};

/// Provides methods to read pieces of an expression from the source text.
///
/// The grammar of an expression is small enough that the [`Lexer`] does not
/// produce a token stream. The parser asks for exactly the piece it expects
/// next, and the `Lexer` advances its cursor over that piece.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given source.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Return true when the cursor has consumed all of the source.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.cursor >= self.source.len()
    }

    /// Return the next character without advancing the cursor.
    pub fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    /// Advance the cursor past the next character when it matches.
    ///
    /// Returns true when the character was consumed.
    pub fn take(&mut self, expect: char) -> bool {
        match self.peek() {
            Some(char) if char == expect => {
                self.cursor += char.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// Advance the cursor past any whitespace.
    pub fn skip_whitespace(&mut self) {
        let remaining = &self.source[self.cursor..];
        self.cursor += remaining.len() - remaining.trim_start().len();
    }

    /// Read a quoted string literal and return its unescaped text.
    ///
    /// The literal is delimited by the character at the cursor, which may
    /// be a single or double quote. Within the literal, a backslash
    /// followed by the delimiter unescapes to the delimiter; every other
    /// backslash is kept verbatim together with the character after it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the literal is not terminated before the
    /// end of the source.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is not on a quote character.
    pub fn lex_quoted(&mut self) -> Result<(String, Region), Error> {
        let from = self.cursor;
        let mut iter = self.source[from..].char_indices().map(|(d, c)| (from + d, c));
        let (_, delimiter) = iter.next().expect("lex_quoted requires a quote at the cursor");
        let mut string = String::new();

        while let Some((index, char)) = iter.next() {
            match char {
                c if c == delimiter => {
                    // Add the character length to comply with string slice
                    // semantics.
                    let to = index + c.len_utf8();
                    self.cursor = to;

                    return Ok((string, (from..to).into()));
                }
                '\\' => match iter.next() {
                    Some((_, next)) if next == delimiter => string.push(delimiter),
                    Some((_, next)) => {
                        string.push('\\');
                        string.push(next);
                    }
                    None => break,
                },
                c => string.push(c),
            }
        }

        Err(Error::build(INVALID_SYNTAX)
            .with_pointer(self.source, from..from + delimiter.len_utf8())
            .with_help(format!(
                "this might be an undelimited string, try closing it with `{delimiter}`"
            )))
    }

    /// Read a bare token and return its [`Region`].
    ///
    /// A bare token is a run of identifier characters and periods, with an
    /// optional leading sign, and is classified by the parser as a number,
    /// a boolean, or a variable path. The returned `Region` is empty when
    /// the cursor is not on a bare token.
    pub fn lex_bare(&mut self) -> Region {
        let from = self.cursor;

        for (index, char) in self.source[from..].char_indices().map(|(d, c)| (from + d, c)) {
            let accept = if index == from {
                matches!(char, '+' | '-' | '.') || is_ident(char)
            } else {
                char == '.' || is_ident(char)
            };
            if !accept {
                self.cursor = index;

                return (from..index).into();
            }
        }
        self.cursor = self.source.len();

        (from..self.source.len()).into()
    }

    /// Read a filter name and return its [`Region`].
    ///
    /// The name is the run of characters up to the next whitespace, colon,
    /// pipe, or the end of the source. No character validation happens
    /// here; the parser checks the run against the identifier class so it
    /// can report the exact illegal character.
    pub fn lex_name(&mut self) -> Region {
        let from = self.cursor;

        for (index, char) in self.source[from..].char_indices().map(|(d, c)| (from + d, c)) {
            if char.is_whitespace() || matches!(char, ':' | '|') {
                self.cursor = index;

                return (from..index).into();
            }
        }
        self.cursor = self.source.len();

        (from..self.source.len()).into()
    }
}

/// Return true if the given character is a recognized identifier character,
/// meaning '_' or an `xid_continue`.
pub(crate) fn is_ident(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::Lexer;

    #[test]
    fn test_lex_quoted() {
        let mut lexer = Lexer::new(r#""name" | upper"#);
        let (string, region) = lexer.lex_quoted().unwrap();

        assert_eq!(string, "name");
        assert_eq!(region, (0..6).into());
        assert_eq!(lexer.cursor, 6);
    }

    #[test]
    fn test_lex_quoted_single() {
        let mut lexer = Lexer::new("'it is'");
        let (string, _) = lexer.lex_quoted().unwrap();

        assert_eq!(string, "it is");
    }

    #[test]
    fn test_lex_quoted_delimiter_escape() {
        let mut lexer = Lexer::new(r#"" endquote\" hah""#);
        let (string, _) = lexer.lex_quoted().unwrap();

        assert_eq!(string, r#" endquote" hah"#);
    }

    #[test]
    fn test_lex_quoted_other_escapes_verbatim() {
        let mut lexer = Lexer::new(r#""foo\bar""#);
        assert_eq!(lexer.lex_quoted().unwrap().0, r"foo\bar");

        let mut lexer = Lexer::new(r#""foo\now""#);
        assert_eq!(lexer.lex_quoted().unwrap().0, r"foo\now");

        let mut lexer = Lexer::new(r#""foo\\x""#);
        assert_eq!(lexer.lex_quoted().unwrap().0, r"foo\\x");
    }

    #[test]
    fn test_lex_quoted_opposite_quote_is_plain() {
        let mut lexer = Lexer::new(r#""it's""#);
        assert_eq!(lexer.lex_quoted().unwrap().0, "it's");
    }

    #[test]
    fn test_lex_quoted_unterminated() {
        let mut lexer = Lexer::new(r#""name"#);
        assert!(lexer.lex_quoted().is_err());

        // A trailing escape pair cannot terminate the literal.
        let mut lexer = Lexer::new(r#""name\""#);
        assert!(lexer.lex_quoted().is_err());
    }

    #[test]
    fn test_lex_bare() {
        let mut lexer = Lexer::new("person.name | upper");
        let region = lexer.lex_bare();

        assert_eq!(region, (0..11).into());
        assert_eq!(lexer.cursor, 11);
    }

    #[test]
    fn test_lex_bare_sign_only_leads() {
        let mut lexer = Lexer::new("-12.5|round");
        assert_eq!(lexer.lex_bare(), (0..5).into());

        let mut lexer = Lexer::new("a-b");
        assert_eq!(lexer.lex_bare(), (0..1).into());
    }

    #[test]
    fn test_lex_bare_empty() {
        let mut lexer = Lexer::new("|upper");
        let region = lexer.lex_bare();

        assert_eq!(region.begin, region.end);
        assert_eq!(lexer.cursor, 0);
    }

    #[test]
    fn test_lex_name() {
        let mut lexer = Lexer::new("append:\"!\"");
        assert_eq!(lexer.lex_name(), (0..6).into());

        let mut lexer = Lexer::new("upper | lower");
        assert_eq!(lexer.lex_name(), (0..5).into());

        let mut lexer = Lexer::new("fil(ter)");
        assert_eq!(lexer.lex_name(), (0..8).into());
    }

    #[test]
    fn test_skip_whitespace() {
        let mut lexer = Lexer::new("   name");
        lexer.skip_whitespace();

        assert_eq!(lexer.cursor, 3);
    }

    #[test]
    fn test_take() {
        let mut lexer = Lexer::new("|upper");

        assert!(lexer.take('|'));
        assert!(!lexer.take('|'));
        assert_eq!(lexer.cursor, 1);
    }
}
