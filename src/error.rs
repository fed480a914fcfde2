use thiserror::Error;

/// Unified error type for git-publisher operations
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    /// For `BuildContext::environment` implementations that cannot capture
    /// the build environment. The publisher logs it and carries on.
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-publisher
pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        PublishError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        PublishError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        PublishError::Remote(msg.into())
    }

    /// Create an environment capture error with context
    pub fn environment(msg: impl Into<String>) -> Self {
        PublishError::Environment(msg.into())
    }
}

impl From<toml::de::Error> for PublishError {
    fn from(err: toml::de::Error) -> Self {
        PublishError::Config(format!("invalid TOML: {}", err))
    }
}

impl From<toml::ser::Error> for PublishError {
    fn from(err: toml::ser::Error) -> Self {
        PublishError::Config(format!("cannot serialize configuration: {}", err))
    }
}
