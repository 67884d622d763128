//! Error types for Tripcraft

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Bad local input. Never reaches the network.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Unknown entry or plan id, surfaced verbatim from the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success response or transport failure from an external service.
    #[error("Service error: {0}")]
    Service(String),

    /// The generation service answered but its output could not be parsed
    /// into a plan. Carries the raw payload so callers can distinguish this
    /// from a plain service failure.
    #[error("AI output could not be parsed: {message}")]
    MalformedPlan { message: String, raw: String },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
