//! Error types for WattWise services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request errors (1xxx)
    MissingHeader,
    InvalidFormat,
    NoProvidersRequested,
    UnknownProvider,

    // Authentication errors (2xxx)
    InvalidApiKey,

    // Resource errors (4xxx)
    NotFound,
    PlanNotFound,
    ProviderNotFound,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Scrape errors (8xxx)
    InvalidScrapeData,
    ScrapeTimeout,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Request (1xxx)
            ErrorCode::MissingHeader => 1002,
            ErrorCode::InvalidFormat => 1003,
            ErrorCode::NoProvidersRequested => 1004,
            ErrorCode::UnknownProvider => 1005,

            // Auth (2xxx)
            ErrorCode::InvalidApiKey => 2002,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::PlanNotFound => 4002,
            ErrorCode::ProviderNotFound => 4003,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // Scrapes (8xxx)
            ErrorCode::InvalidScrapeData => 8001,
            ErrorCode::ScrapeTimeout => 8002,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Missing required header: {header}")]
    MissingHeader { header: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("No providers requested")]
    NoProvidersRequested,

    #[error("Unknown provider slug: {slug}")]
    UnknownProvider { slug: String },

    // Authentication errors
    #[error("Invalid API key")]
    InvalidApiKey,

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Plan not found")]
    PlanNotFound { id: i32 },

    #[error("Provider not found: {slug}")]
    ProviderNotFound { slug: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Scrape errors
    #[error("Scraped data for {slug} is invalid: {message}")]
    InvalidScrapeData { slug: String, message: String },

    #[error("Scrape of {slug} timed out after {timeout_secs}s")]
    ScrapeTimeout { slug: String, timeout_secs: u64 },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingHeader { .. } => ErrorCode::MissingHeader,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::NoProvidersRequested => ErrorCode::NoProvidersRequested,
            AppError::UnknownProvider { .. } => ErrorCode::UnknownProvider,
            AppError::InvalidApiKey => ErrorCode::InvalidApiKey,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::PlanNotFound { .. } => ErrorCode::PlanNotFound,
            AppError::ProviderNotFound { .. } => ErrorCode::ProviderNotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::InvalidScrapeData { .. } => ErrorCode::InvalidScrapeData,
            AppError::ScrapeTimeout { .. } => ErrorCode::ScrapeTimeout,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidFormat { .. } |
            AppError::NoProvidersRequested |
            AppError::UnknownProvider { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,

            // 404 Not Found
            AppError::NotFound { .. } |
            AppError::PlanNotFound { .. } |
            AppError::ProviderNotFound { .. } => StatusCode::NOT_FOUND,

            // 422 Unprocessable Entity
            AppError::MissingHeader { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            AppError::Database(_) |
            AppError::DatabaseConnection { .. } |
            AppError::Internal { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::InvalidScrapeData { .. } => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            AppError::ScrapeTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
///
/// `detail` carries the human-readable message at the top level, which is
/// what existing API clients read.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            detail: message.clone(),
            error: ErrorDetails { code, message },
        };

        (status, Json(body)).into_response()
    }
}

// Extractor rejections keep the structured error body

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidFormat {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidFormat {
            message: rejection.body_text(),
        }
    }
}
