use thiserror::Error;

/// Why a short code could not be resolved. The `Display` text is shown to
/// the visitor.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid URL code format. Codes may only contain letters and digits.")]
    InvalidCode,

    #[error("Cannot reach the server. Check your internet connection.")]
    Unreachable(#[source] reqwest::Error),

    #[error("URL not found. Make sure the URL code is still valid.")]
    NotFound,

    #[error("URL has expired and can no longer be accessed.")]
    Expired,

    #[error("Server error: {status} {reason}")]
    Server { status: u16, reason: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("The server returned an unreadable response.")]
    InvalidResponse,
}

impl ResolveError {
    pub const DEFAULT_REJECTION: &'static str = "Failed to fetch URL data";

    pub fn rejected(message: Option<String>) -> Self {
        ResolveError::Rejected {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_REJECTION.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        assert!(ResolveError::NotFound.to_string().contains("not found"));
        assert!(ResolveError::Expired.to_string().contains("expired"));
        assert_eq!(
            ResolveError::Server {
                status: 500,
                reason: "Internal Server Error".to_string()
            }
            .to_string(),
            "Server error: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_rejection_fallback() {
        assert_eq!(
            ResolveError::rejected(None).to_string(),
            ResolveError::DEFAULT_REJECTION
        );
        assert_eq!(
            ResolveError::rejected(Some(" ".to_string())).to_string(),
            ResolveError::DEFAULT_REJECTION
        );
        assert_eq!(
            ResolveError::rejected(Some("Link disabled".to_string())).to_string(),
            "Link disabled"
        );
    }
}
