use thiserror::Error;
use tokio_rusqlite::rusqlite;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("game not found")]
    GameNotFound,

    #[error("review not found")]
    ReviewNotFound,

    #[error("{0}")]
    Constraint(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
