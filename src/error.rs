use thiserror::Error;

/// Errors that can end a crawl session
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The browser could not be launched
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Connecting to a running browser failed
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// A tab could not be created, found or closed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Navigation did not happen or did not complete
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The links of the current page could not be enumerated
    #[error("Failed to extract links: {0}")]
    LinkExtractionFailed(String),

    /// A script evaluated in the page failed
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// Configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The boundary answered with a reply that is not valid for the request
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// No link could be selected and there is no page to fall back to
    #[error("Nothing left to crawl from the home page ({remaining} unvisited links are unreachable)")]
    Stranded { remaining: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stranded_message_mentions_remaining() {
        let err = CrawlError::Stranded { remaining: 4 };
        assert!(err.to_string().contains("4 unvisited links"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: CrawlError = parse.unwrap_err().into();
        assert!(matches!(err, CrawlError::Json(_)));
    }
}
