//! Unified error handling for the dashboard API.
//!
//! Every error renders as `{"error": "<message>"}`. Client-caused backend
//! failures pass the backend's own message through so the dashboard can show
//! it; database and internal details are never exposed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use vendor_hub_core::VendorId;

use crate::ai::AiError;
use crate::backend::BackendError;
use crate::db::RepositoryError;
use crate::geocoding::GeocodingError;
use crate::services::ServiceError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Backend call failed outside a service.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A service rejected the request or its backend call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Geocoding lookup failed.
    #[error("Geocoding error: {0}")]
    Geocoding(#[from] GeocodingError),

    /// AI helper failed.
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(e) => backend_status(e),
            Self::Service(e) => service_status(e),
            Self::Geocoding(e) => match e {
                GeocodingError::InvalidCoordinates(_) => StatusCode::BAD_REQUEST,
                GeocodingError::NoAddress { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Ai(e) => match e {
                AiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Backend(e) | Self::Service(ServiceError::Backend(e)) if e.is_server_error() => {
                "Backend service error".to_string()
            }
            Self::Geocoding(e)
                if !matches!(
                    e,
                    GeocodingError::InvalidCoordinates(_) | GeocodingError::NoAddress { .. }
                ) =>
            {
                "Geocoding service unavailable".to_string()
            }
            Self::Ai(AiError::InvalidInput(message)) => message.clone(),
            Self::Ai(_) => "AI service error".to_string(),
            Self::Backend(e) | Self::Service(ServiceError::Backend(e)) => e.to_string(),
            Self::Service(e) => e.to_string(),
            Self::Geocoding(e) => e.to_string(),
            Self::NotFound(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::BadRequest(m) => m.clone(),
        }
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Api { status, .. } if (400..500).contains(status) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Backend(e) => backend_status(e),
        ServiceError::Validation(_) | ServiceError::Coupon(_) => StatusCode::BAD_REQUEST,
        ServiceError::Transition(_)
        | ServiceError::QueueNotReady { .. }
        | ServiceError::OrderClosed(..) => StatusCode::CONFLICT,
        ServiceError::OrderNotInStore(_) => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        } else if status != StatusCode::NOT_FOUND {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from the signed-in vendor.
pub fn set_sentry_user(vendor: VendorId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(vendor.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
