use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopicListError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Favorite is not available for this page")]
    FavoriteUnavailable,

    #[error("Fatal error: {0}")]
    Fatal(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TopicListError {
    /// Failures a favorite mutation is expected to hit in the field.
    /// Everything else is a bug and must not be masked by a rollback.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TopicListError::Connection(_) | TopicListError::Remote(_))
    }
}

pub type Result<T> = std::result::Result<T, TopicListError>;
