//! Error types.
//!
//! `ProviderError` covers everything that can go wrong talking to an
//! upstream API. `ApiError` is what handlers return; it renders as a JSON
//! `{ "error": ... }` body with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single upstream provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode upstream response: {0}")]
    Decode(String),

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ProviderError {
    /// Builds a `Status` error from a non-success response, consuming its body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ProviderError::Status { status, body }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Upstream service error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
