use std::fmt;

use serde::Serialize;
use tarmac_common::error::LexError;
use tarmac_parser::error::ParseError;

/// An error from the end-to-end formatting pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormatError {
    /// The input did not tokenize; surfaced unchanged.
    Lex(LexError),
    /// The input did not parse; surfaced unchanged.
    Parse(ParseError),
    /// The produced output failed to parse or was not equivalent to the
    /// input, so the formatter is presumed to have corrupted the program.
    /// Both byte sequences are kept for off-line diffing; nothing is
    /// written.
    CheckFailed {
        path: Option<String>,
        original: String,
        produced: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::CheckFailed { path: Some(p), .. } => {
                write!(f, "formatting would change what '{p}' means; refusing")
            }
            Self::CheckFailed { path: None, .. } => {
                write!(f, "formatting would change what the code means; refusing")
            }
        }
    }
}

impl std::error::Error for FormatError {}

impl From<LexError> for FormatError {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}

impl From<ParseError> for FormatError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}
