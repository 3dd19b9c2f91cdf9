use chatdeck_core::ChatdeckError;
use serde::{Deserialize, Serialize};

/// Why a completion request failed, as far as the user needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// HTTP 429.
    RateLimited,
    /// HTTP 401 or 403.
    Unauthorized,
    /// Any 5xx status.
    Server,
    /// The endpoint could not be reached.
    Network,
    /// Other statuses and unusable response bodies.
    Other,
}

impl FailureKind {
    /// Classifies an error by its status code or variant, never by its text.
    pub fn classify(err: &ChatdeckError) -> Self {
        match err {
            ChatdeckError::Upstream { status: 429, .. } => Self::RateLimited,
            ChatdeckError::Upstream {
                status: 401 | 403, ..
            } => Self::Unauthorized,
            ChatdeckError::Upstream { status, .. } if (500..600).contains(status) => {
                Self::Server
            }
            ChatdeckError::Network(_) => Self::Network,
            _ => Self::Other,
        }
    }

    /// The user-facing sentence shown ahead of the fallback reply.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::RateLimited => "Rate limit exceeded. Please wait a moment and try again.",
            Self::Unauthorized => "Authentication error. Please check the API configuration.",
            Self::Server => "Server error. Please try again later.",
            Self::Network => "Network error. Please check your connection and try again.",
            Self::Other => "Sorry, I encountered an error. Please try again.",
        }
    }
}
