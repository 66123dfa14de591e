use thiserror::Error;

/// The result type returned from the library.
pub type Result<T> = std::result::Result<T, PipeviewError>;

/// The error type returned from the library.
///
/// The stream wrappers themselves speak [`std::io::Error`] so that source errors reach the consumer unchanged; this
/// type covers opening downloads and managing relay threads.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipeviewError {
    /// An HTTP request failed.
    #[error("The HTTP request failed with status code {0}. Body: {1}")]
    RequestFailed(
        /// The response's status code.
        u16,
        /// The response's body.
        String,
    ),
    /// The source URL is using an unsupported URL scheme.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedUrlScheme(
        /// The invalid scheme from the URL.
        String,
    ),
    /// The path in a `file://` source URL is invalid.
    #[error("Invalid file path: {0}")]
    InvalidFilePath(
        /// The file path from the URL.
        String,
    ),
    /// The `Content-Length` header of a response was not a number.
    #[error("Invalid content length: {0}")]
    InvalidLength(#[from] std::num::ParseIntError),
    /// A relay's background thread panicked.
    #[error("The relay thread panicked")]
    Panicked,

    /// Transparent wrapper for an [IO error](std::io::Error).
    #[error(transparent)]
    IO(#[from] std::io::Error),
    /// Transparent wrapper for an [`ureq` error](ureq::Error).
    #[error(transparent)]
    HTTP(#[from] ureq::Error),
    /// Transparent wrapper for an [URL parsing error](url::ParseError).
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
