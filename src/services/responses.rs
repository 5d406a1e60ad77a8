// src/services/responses.rs
//! Response envelope and error mapping for the HTTP API.
//!
//! Every endpoint answers with `{ "success": bool, "data"?: ..., "error"?: "..." }`.
//! Business outcomes (unprocessable certificate, low confidence) are
//! `success: false` with status 200; only malformed requests and upstream or
//! storage failures change the status code.

use crate::registry::listings_client::RegistryError;
use crate::storage::listing_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

/// JSON envelope shared by all endpoints.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful outcome carrying `data`.
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Negative business outcome that still carries its details.
    pub fn rejected(data: T) -> Self {
        ApiResponse {
            success: false,
            data: Some(data),
            error: None,
        }
    }

    /// Negative outcome described by a message only.
    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Errors that end a request with a non-200 status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing file upload")]
    MissingFile,

    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Registry(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Registry(RegistryError::Status { status: upstream, .. }) => {
                error!("registry rejected listings request with {}: {}", upstream, self)
            }
            ApiError::Registry(_) | ApiError::Store(_) => error!("request failed: {}", self),
            _ => warn!("rejected request ({}): {}", status, self),
        }

        (status, Json(ApiResponse::<()>::failure(self.to_string()))).into_response()
    }
}
