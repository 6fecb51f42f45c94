//! Error types for Marshal decoding.

use std::fmt;

/// Error type for Marshal decoding operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A coercion accessor was called against an incompatible kind.
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },
    /// The buffer ran out mid-value, or a back-reference index addressed
    /// beyond the table built so far.
    Incomplete,
    /// A tag byte outside the supported alphabet (`l` bignum, `o`/`u`/`U`
    /// user objects, `/` regexp, `c`/`m` class refs, ...).
    UnsupportedTag(u8),
    /// A float literal that `f64` parsing rejected.
    InvalidFloat(String),
    /// String payload is not valid UTF-8.
    InvalidUtf8,
    /// f64 is NaN or Infinity (not representable in JSON).
    NonFiniteFloat(f64),
    /// The object graph contains a `@` cycle, which JSON cannot express.
    RecursiveObject,
    /// Failed to serialize to JSON.
    JsonSerialize(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedKind { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Error::Incomplete => write!(f, "incomplete data"),
            Error::UnsupportedTag(t) => write!(f, "unsupported tag byte {t:#04x}"),
            Error::InvalidFloat(text) => write!(f, "invalid float literal {text:?}"),
            Error::InvalidUtf8 => write!(f, "invalid UTF-8 in string payload"),
            Error::NonFiniteFloat(n) => write!(f, "cannot encode non-finite float {n} as JSON"),
            Error::RecursiveObject => write!(f, "object graph contains a reference cycle"),
            Error::JsonSerialize(msg) => write!(f, "JSON serialize error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for Marshal decoding operations.
pub type Result<T> = std::result::Result<T, Error>;
