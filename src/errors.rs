// src/errors.rs

use thiserror::Error;

pub type LoupeResult<T> = Result<T, LoupeError>;

/// Errors surfaced to the UI loop.
///
/// Filter pattern syntax errors are deliberately absent: a filter is
/// compiled with `Regex::new` at the input site and the `regex::Error`
/// is shown there before the buffer ever sees it.
#[derive(Debug, Error)]
pub enum LoupeError {
    #[error("no records loaded yet")]
    EmptyBuffer,

    #[error("gateway error: {message}")]
    Gateway { message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoupeError {
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
