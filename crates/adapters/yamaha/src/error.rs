//! Receiver adapter error types.

use std::time::Duration;

use avsync_domain::error::CommunicationError;

/// Errors specific to the receiver adapter.
#[derive(Debug, thiserror::Error)]
pub enum YamahaError {
    /// The HTTP exchange did not finish within the client timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The HTTP client failed (connect, send, or read).
    #[error("HTTP request failed")]
    Http(#[source] reqwest::Error),

    /// The receiver answered with a non-success status.
    #[error("receiver answered with HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The request document could not be serialised.
    #[error("failed to encode request")]
    Encode(#[source] xmltree::Error),

    /// The response body is not well-formed XML.
    #[error("failed to parse response")]
    Parse(#[source] xmltree::ParseError),

    /// A required element is missing from the response.
    #[error("response is missing element '{0}'")]
    MissingElement(&'static str),

    /// A numeric element holds something that is not a number.
    #[error("invalid number '{0}' in response")]
    InvalidNumber(String),

    /// The receiver returned a non-zero `RC` code.
    #[error("receiver rejected the request with code {0}")]
    Rejected(String),
}

impl From<YamahaError> for CommunicationError {
    fn from(err: YamahaError) -> Self {
        match err {
            YamahaError::Timeout(after) => Self::Timeout(after),
            YamahaError::Rejected(code) => Self::Rejected { code },
            YamahaError::Parse(source) => Self::MalformedResponse(source.to_string()),
            err @ (YamahaError::MissingElement(_) | YamahaError::InvalidNumber(_)) => {
                Self::MalformedResponse(err.to_string())
            }
            other => Self::Transport(Box::new(other)),
        }
    }
}
