use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication required. Run `refile auth <token>` first.")]
    NotAuthenticated,

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Folder listing failed: {0}")]
    Fetch(String),

    #[error("Move rejected: {0}")]
    Move(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Rate limited. Try again later.")]
    RateLimited,

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
