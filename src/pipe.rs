use crate::value::Value;
use std::fmt::{Arguments, Display, Result, Write};

/// Wraps some underlying buffer by providing methods that write rendered
/// values to it in different formats.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// The Pipe will handle formatting the value. The invalid sentinel
    /// writes nothing; the caller decides what text stands in for it.
    ///
    /// # Errors
    ///
    /// The Pipe supports all Value types, so the only error that will
    /// be returned is propagated from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::Invalid => Ok(()),
            Value::Null => self.write_null(),
            Value::String(string) => self.write_str(string),
            Value::List(items) => self.write_list(items),
            Value::Map(entries) => self.write_map(entries),
            Value::Object(object) => write!(self.buffer, "{:?}", object),
            _ => self.write_display(value),
        }
    }

    /// Write the value to the buffer using the Display implementation.
    fn write_display(&mut self, value: &Value) -> Result {
        match value {
            Value::Bool(bool) => self.display(bool),
            Value::Number(number) => self.display(number),
            _ => Ok(()),
        }
    }

    /// Write the given displayable data to the buffer.
    fn display(&mut self, value: impl Display) -> Result {
        write!(self.buffer, "{}", value)
    }

    /// Write the literal text "null" to the buffer.
    fn write_null(&mut self) -> Result {
        write!(self.buffer, "null")
    }

    /// Write the value to the buffer as a comma separated list surrounded
    /// by brackets.
    fn write_list(&mut self, items: &[Value]) -> Result {
        write!(self.buffer, "[")?;
        let mut iter = items.iter();
        if let Some(item) = iter.next() {
            self.write_value(item)?;
            for item in iter {
                write!(self.buffer, ", ")?;
                self.write_value(item)?;
            }
        }
        write!(self.buffer, "]")
    }

    /// Write the value to the buffer as key/value pairs surrounded by
    /// curly braces.
    fn write_map(
        &mut self,
        entries: &std::collections::BTreeMap<String, Value>,
    ) -> Result {
        write!(self.buffer, "{{")?;
        let mut iter = entries.iter();
        if let Some((key, value)) = iter.next() {
            write!(self.buffer, "{}: ", key)?;
            self.write_value(value)?;
            for (key, value) in iter {
                write!(self.buffer, ", {}: ", key)?;
                self.write_value(value)?;
            }
        }
        write!(self.buffer, "}}")
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}

#[cfg(test)]
mod tests {
    use super::Pipe;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_write_scalars() {
        assert_eq!(written(&Value::from("text")), "text");
        assert_eq!(written(&Value::from(10_i64)), "10");
        assert_eq!(written(&Value::Bool(false)), "false");
        assert_eq!(written(&Value::Null), "null");
    }

    #[test]
    fn test_write_invalid_is_empty() {
        assert_eq!(written(&Value::Invalid), "");
    }

    #[test]
    fn test_write_list() {
        let value = Value::from(json!(["a", 1, true]));

        assert_eq!(written(&value), "[a, 1, true]");
    }

    #[test]
    fn test_write_map() {
        let value = Value::from(json!({"one": 1, "two": "2"}));

        assert_eq!(written(&value), "{one: 1, two: 2}");
    }

    /// Write the value through a Pipe and return the buffer.
    fn written(value: &Value) -> String {
        let mut buffer = String::new();
        Pipe::new(&mut buffer).write_value(value).unwrap();

        buffer
    }
}
