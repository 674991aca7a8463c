//! Ingestion error types

use thiserror::Error;
use wattwise_common::errors::AppError;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Unknown provider slug: {0}")]
    UnknownProvider(String),

    #[error("Invalid record from {slug}: {message}")]
    InvalidRecord { slug: String, message: String },

    #[error("Scrape task failed: {0}")]
    Task(String),
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::UnknownProvider(slug) => AppError::UnknownProvider { slug },
            IngestionError::InvalidRecord { slug, message } => {
                AppError::InvalidScrapeData { slug, message }
            }
            other => AppError::Internal {
                message: other.to_string(),
            },
        }
    }
}
