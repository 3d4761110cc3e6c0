use super::Error;

pub const UNEXPECTED_CHARACTER: &str = "unexpected character";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_FILTER: &str = "invalid filter";
pub const INVALID_FILTER_NAME: &str = "invalid filter name";
pub const INVALID_ARGUMENT: &str = "invalid argument";

/// Return an [`Error`] explaining that the end of the expression was not
/// expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::build(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional text, is the expression complete?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure").with_help("failed to write rendered value, are you low on memory?")
}

/// Return an [`Error`] describing a missing expression.
pub fn error_missing_expression(name: &str) -> Error {
    Error::build("missing expression").with_help(format!(
        "expression `{}` not found in engine, add it with `.add_expression`",
        name
    ))
}
