//! API key extractor for protected endpoints

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppState;
use wattwise_common::{auth::verify_api_key, errors::AppError};

/// Proof that the request carried the configured API key
///
/// Rejects with 422 when the header is absent and 401 when it does not match.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;

        // A header that is not valid UTF-8 is present but cannot match
        let presented = parts
            .headers
            .get(auth.api_key_header.as_str())
            .map(|value| value.to_str().unwrap_or_default());

        verify_api_key(presented, &auth.api_key_header, &auth.api_key)?;
        Ok(ApiKey)
    }
}
