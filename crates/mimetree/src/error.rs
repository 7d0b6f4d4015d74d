//! Error types for MIME tree operations.

/// Result type alias for MIME tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME tree error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Destination buffer cannot hold the serialized output.
    #[error("Output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the operation would have written.
        needed: usize,
        /// Bytes the caller provided.
        available: usize,
    },

    /// A header field line is missing its CRLF terminator.
    #[error("Unterminated header field")]
    UnterminatedField,

    /// Missing boundary parameter on a multipart entity.
    #[error("Missing boundary parameter on multipart entity")]
    MissingBoundary,
}
