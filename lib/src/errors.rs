use thiserror::Error;

/// Error returned while building a [`crate::Regexp`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern is not a valid regular expression.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The pattern is valid, but uses a construct that the matching
    /// engines can't express (e.g. half word boundaries or CRLF anchors).
    #[error("unsupported construct: {0}")]
    Unsupported(String),

    /// The compiled program exceeds the configured size limit.
    #[error("compiled regexp exceeds the size limit ({limit} bytes)")]
    TooLarge {
        /// Size limit in bytes.
        limit: usize,
    },
}
