use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Request to {url} failed with status {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("No anchor titled '{0}' on the ETF index page")]
    MissingCategoryAnchor(String),

    #[error("Unexpected page structure at {url}: {reason}")]
    UnexpectedPage { url: String, reason: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid chart layout: {0}")]
    InvalidLayout(String),

    #[error("Font not available at {0}")]
    MissingFont(String),
}
