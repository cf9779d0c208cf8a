//! Error types for the footy-odds engine

use thiserror::Error;


pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("active weights sum to {sum}, expected 1.0 ± 1e-6")]
    WeightSum { sum: f64 },

    #[error("unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("team not found: {name}")]
    TeamNotFound { name: String },

    #[error("team name '{name}' is ambiguous: {candidates:?}")]
    AmbiguousTeam { name: String, candidates: Vec<String> },

    #[error("competition not found: {name}")]
    CompetitionNotFound { name: String },

    #[error("insufficient coverage for {team}: missing {missing:?}")]
    InsufficientCoverage { team: String, missing: Vec<String> },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("internal invariant violated: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Storage {
            message: err.to_string(),
        }
    }
}
