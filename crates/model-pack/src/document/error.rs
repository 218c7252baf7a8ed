//! Document builder/parser error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON at byte {0}")]
    Invalid(usize),
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    #[error("trailing data at byte {0}")]
    TrailingData(usize),
    #[error("expected {expected}, current token is {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },
    #[error("number `{0}` does not fit the requested type")]
    NumberRange(String),
    #[error("builder misuse: {0}")]
    Builder(&'static str),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}
