use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use super::json_response;
use super::payload::ValidationError;
use crate::access::FeatureKey;
use crate::core::ComputationError;
use crate::portfolio::HoldingsStoreError;

/// Failures of the simulation routes, rendered as `{"error": {code, message, details}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required.")]
    Unauthorized,
    #[error("Access forbidden.")]
    Forbidden { feature: FeatureKey },
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<Value>,
    },
    #[error("Not found")]
    NotFound,
    #[error("Simulation failed.")]
    Computation(#[from] ComputationError),
    #[error("Internal error.")]
    Holdings(#[from] HoldingsStoreError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    code: &'static str,
    message: String,
    details: Option<&'a Value>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Computation(_) | ApiError::Holdings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Computation(_) | ApiError::Holdings(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest {
            details: Some(json!({ "field": err.field })),
            message: err.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::BadRequest { details, .. } => details.clone(),
            ApiError::Forbidden { feature } => {
                Some(json!({ "feature": feature, "label": feature.label() }))
            }
            _ => None,
        };

        match &self {
            // Handlers log these with the request context.
            ApiError::Computation(_) => {}
            ApiError::Holdings(source) => {
                error!(error = %source, "holdings lookup failed");
            }
            other => {
                warn!(code = other.code(), message = %other, "request rejected");
            }
        }

        json_response(
            status,
            ErrorBody {
                error: ErrorPayload {
                    code: self.code(),
                    message: self.to_string(),
                    details: details.as_ref(),
                },
            },
        )
    }
}
