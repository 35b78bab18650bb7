use thiserror::Error;

/// Main error type for resource operations
#[derive(Debug, Error)]
pub enum RestError {
    /// A required descriptor field is absent or empty
    #[error("resource {resource}: missing required attribute `{field}`")]
    MissingAttribute { resource: String, field: String },

    /// The operation cannot be satisfied in the current context
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Response status is not in the resource's valid status codes
    #[error("unexpected status {status} for {resource} at {url} (expected one of {expected:?})")]
    UnexpectedStatus {
        resource: String,
        status: u16,
        expected: Vec<u16>,
        url: String,
    },

    /// Ambiguous or contradictory resource configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl RestError {
    /// Create a new missing attribute error
    pub fn missing(resource: impl Into<String>, field: impl Into<String>) -> Self {
        RestError::MissingAttribute {
            resource: resource.into(),
            field: field.into(),
        }
    }

    /// Create a new invalid operation error
    pub fn invalid(message: impl Into<String>) -> Self {
        RestError::InvalidOperation(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        RestError::Configuration(message.into())
    }

    /// Check if this error comes from descriptor validation
    pub fn is_missing_attribute(&self) -> bool {
        matches!(self, RestError::MissingAttribute { .. })
    }

    /// Check if this error is an invalid operation
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, RestError::InvalidOperation(_))
    }

    /// Check if this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, RestError::Configuration(_))
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Get the HTTP status code if the error carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::UnexpectedStatus { status, .. } => Some(*status),
            RestError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, RestError>;
