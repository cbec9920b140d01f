#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Carries what was looked up, e.g. "Note" or "Subject".
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("reqwest error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
