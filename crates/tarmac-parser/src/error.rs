use std::fmt;

use serde::Serialize;

/// A parse error with the source line it occurred on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, line: u32) -> Self {
        Self { kind, line }
    }
}

/// The specific kind of parse error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParseErrorKind {
    /// A closing delimiter appeared with no matching opener.
    UnexpectedCloser(String),
    /// A closing delimiter did not match the innermost open one.
    MismatchedCloser { expected: String, found: String },
    /// An opening delimiter was never closed.
    UnclosedDelimiter(String),
    /// Tokens after the final period, or a file with no period at all.
    UnterminatedForm,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCloser(c) => write!(f, "unexpected '{c}'"),
            Self::MismatchedCloser { expected, found } => {
                write!(f, "expected '{expected}' but found '{found}'")
            }
            Self::UnclosedDelimiter(o) => write!(f, "unclosed '{o}'"),
            Self::UnterminatedForm => write!(f, "form is not terminated by '.'"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {}
