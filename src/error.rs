use thiserror::Error;

/// Error types for the AdSmart keyword pipeline
#[derive(Error, Debug)]
pub enum AdSmartError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file: {path}")]
    InvalidConfig { path: String },

    // Network errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpRequest { url: String, status: u16 },

    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    // Scraping errors
    #[error("Scraping error: {message}")]
    Scraping { message: String },

    #[error("Selector failed: {selector} on {url}")]
    SelectorFailed { selector: String, url: String },

    // Keyword research errors
    #[error("Keyword research error: {message}")]
    Research { message: String },

    #[error("Search API error: {message}")]
    SearchApi { message: String },

    // Classification errors
    #[error("Classification unavailable: {message}")]
    ClassificationUnavailable { message: String },

    #[error("LLM processing error: {message}")]
    Llm { message: String },

    // Export errors
    #[error("Export error: {message}")]
    Export { message: String },

    #[error("File write failed: {path}")]
    FileWrite { path: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AdSmartError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Create a scraping error
    pub fn scraping(message: impl Into<String>) -> Self {
        Self::Scraping { message: message.into() }
    }

    /// Create a keyword research error
    pub fn research(message: impl Into<String>) -> Self {
        Self::Research { message: message.into() }
    }

    /// Create a classification-unavailable error
    pub fn classification(message: impl Into<String>) -> Self {
        Self::ClassificationUnavailable { message: message.into() }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm { message: message.into() }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export { message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Recoverable: the pipeline retries or degrades instead of aborting
            Self::Network { .. }
            | Self::HttpRequest { .. }
            | Self::Timeout { .. }
            | Self::SearchApi { .. }
            | Self::ClassificationUnavailable { .. }
            | Self::Llm { .. } => true,

            // Non-recoverable: the caller must fix the input
            Self::Configuration { .. } | Self::InvalidConfig { .. } => false,

            _ => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } | Self::InvalidConfig { .. } => "configuration",
            Self::Network { .. } | Self::HttpRequest { .. } | Self::Timeout { .. } => "network",
            Self::Scraping { .. } | Self::SelectorFailed { .. } => "scraping",
            Self::Research { .. } | Self::SearchApi { .. } => "research",
            Self::ClassificationUnavailable { .. } | Self::Llm { .. } => "classification",
            Self::Export { .. } | Self::FileWrite { .. } => "export",
            Self::Internal { .. } => "internal",
        }
    }

    /// Get suggested retry delay for recoverable errors
    pub fn retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            Self::Network { .. } => Some(std::time::Duration::from_secs(5)),
            Self::HttpRequest { .. } => Some(std::time::Duration::from_secs(10)),
            Self::Timeout { .. } => Some(std::time::Duration::from_secs(15)),
            Self::SearchApi { .. } => Some(std::time::Duration::from_secs(1)),
            _ => None,
        }
    }
}

/// Result type alias for the AdSmart pipeline
pub type AdSmartResult<T> = std::result::Result<T, AdSmartError>;

impl From<anyhow::Error> for AdSmartError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal { message: err.to_string() }
    }
}
