use thiserror::Error;

/// A convenience `Result` alias using [`ChatdeckError`].
pub type ChatdeckResult<T> = Result<T, ChatdeckError>;

/// Top-level error type for the chatdeck crates.
#[derive(Error, Debug)]
pub enum ChatdeckError {
    /// The completion endpoint answered with a non-success status.
    ///
    /// `message` is the `error` field of the response body when one could be
    /// decoded, otherwise `"Unknown error"`.
    #[error("Upstream error {status}: {message}")]
    Upstream {
        /// HTTP status code of the response.
        status: u16,
        /// Error text reported by the endpoint.
        message: String,
    },

    /// The completion endpoint could not be reached at all.
    #[error("Network error: {0}")]
    Network(String),

    /// The completion endpoint answered but the body was unusable.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error related to session persistence or lookup.
    #[error("Session error: {0}")]
    Session(String),

    /// The persistent store could not be used.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A speech capability is missing or failed.
    #[error("Speech error: {0}")]
    Speech(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatdeckError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
