use thiserror::Error;

/// Reasons an exercise configuration is rejected at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid exercise json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("option {0:?} appears more than once")]
    DuplicateOption(String),
    #[error("{sentences} sentences but {answers} correct answers")]
    SentenceCountMismatch { sentences: usize, answers: usize },
    #[error("exercise has no blanks")]
    NoSlots,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
