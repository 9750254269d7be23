// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

use crate::document::SelectorError;

#[derive(Error, Debug)]
pub enum WatchdomError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WatchdomError>;
