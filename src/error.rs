//! Central error types for the ViewState codec.
//!
//! The parser itself never fails for in-band malformations: unknown tags,
//! truncated bodies and unresolvable references all produce well-formed
//! sentinel values. `Error` is reserved for the outer boundaries: input that
//! is not Base64, empty input, the JSON editor surface, and the internal
//! conditions that abort a structured parse and hand control to the
//! content extractor.

use core::fmt;

/// All error conditions surfaced by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Input could not be Base64-decoded, even after URL-decoding.
    BadBase64(String),
    /// Input was empty, or decoded to a zero-length octet buffer.
    EmptyInput,
    /// A strict read ran past the end of the octet buffer.
    ///
    /// Intern: bricht den strukturierten Parse ab und aktiviert den
    /// Fallback-Extraktor. Erreicht den Aufrufer nie direkt.
    UnexpectedEof { offset: usize },
    /// A variable-length integer used more than 5 octets (shift >= 35).
    VarintOverflow { offset: usize },
    /// Structured parsing failed and the content extractor found nothing
    /// readable either.
    Unparseable,
    /// The JSON editor surface received unparseable JSON.
    BadJson {
        message: String,
        line: usize,
        column: usize,
    },
    /// Encode was requested without any value to encode.
    NothingToEncode,
    /// An IO error in the CLI front-end.
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadBase64(detail) => {
                if detail.is_empty() {
                    write!(f, "invalid Base64 input")
                } else {
                    write!(f, "invalid Base64 input: {detail}")
                }
            }
            Self::EmptyInput => write!(f, "empty ViewState data"),
            Self::UnexpectedEof { offset } => {
                write!(f, "unexpected end of stream at offset {offset}")
            }
            Self::VarintOverflow { offset } => {
                write!(f, "7-bit encoded integer too long at offset {offset}")
            }
            Self::Unparseable => write!(f, "not a parseable LosFormatter stream"),
            Self::BadJson { message, line, column } => {
                write!(f, "invalid JSON at line {line}, column {column}: {message}")
            }
            Self::NothingToEncode => write!(f, "No data to encode"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// User-facing remediation hint for input-shaped failures.
    ///
    /// Die UI zeigt diesen Text direkt unter der Fehlermeldung an.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::BadBase64(_) | Self::EmptyInput | Self::Unparseable => Some(
                "Make sure the input is a valid Base64-encoded ASP.NET ViewState string",
            ),
            _ => None,
        }
    }

    /// True when the condition should abort the structured parse and hand
    /// control to the content extractor instead of failing the decode.
    pub(crate) fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof { .. } | Self::VarintOverflow { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
