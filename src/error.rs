use thiserror::Error;

/// Unified error type for release-train operations
#[derive(Error, Debug)]
pub enum ReleaseTrainError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(
        "Merge conflict while merging '{head}' into '{base}'. \
         This can happen if there was a hotfix release in between; resolve it manually and re-run"
    )]
    Conflict { base: String, head: String },

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error(
        "Destination '{0}' already exists. Specify a non-existing path or use --force"
    )]
    DestinationExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-train
pub type Result<T> = std::result::Result<T, ReleaseTrainError>;

impl ReleaseTrainError {
    /// Create a format error for a malformed version, tag or branch string
    pub fn format(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Format(msg.into())
    }

    /// Create a provider error with context
    pub fn provider(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Provider(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ReleaseTrainError::NotFound(msg.into())
    }

    /// Create a workflow (invariant violation) error
    pub fn workflow(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Workflow(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Config(msg.into())
    }

    pub fn credentials(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Credentials(msg.into())
    }

    /// True for a merge conflict, which needs a human to resolve
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReleaseTrainError::Conflict { .. })
    }
}
