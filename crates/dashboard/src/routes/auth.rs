//! Sign-in and sign-out.
//!
//! Credentials are checked by the backend; the dashboard only keeps the
//! resulting access token in the server-side session.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use vendor_hub_core::{Email, VendorId};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalVendorAuth, RequireVendorAuth, clear_current_vendor, set_current_vendor};
use crate::models::CurrentVendor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/api/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in vendor as shown to the client. The token stays server-side.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: VendorId,
    pub email: Email,
}

impl From<&CurrentVendor> for MeResponse {
    fn from(vendor: &CurrentVendor) -> Self {
        Self {
            id: vendor.id,
            email: vendor.email.clone(),
        }
    }
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<MeResponse>, AppError> {
    let email = Email::parse(&body.email)
        .map_err(|_| AppError::BadRequest("Enter a valid email address".to_string()))?;
    if body.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let auth = state.backend().sign_in(&email, &body.password).await?;
    let vendor = CurrentVendor::from(&auth);
    set_current_vendor(&session, &vendor)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(vendor.id, Some(vendor.email.as_str()));

    tracing::info!(vendor_id = %vendor.id, "Vendor signed in");
    Ok(Json(MeResponse::from(&vendor)))
}

/// POST /auth/logout
///
/// Always clears the local session; a failed backend sign-out is only logged.
async fn logout(
    State(state): State<AppState>,
    OptionalVendorAuth(vendor): OptionalVendorAuth,
    session: Session,
) -> impl IntoResponse {
    if let Some(vendor) = vendor
        && let Err(e) = state.backend().sign_out(&vendor.token()).await
    {
        tracing::warn!(error = %e, vendor_id = %vendor.id, "Backend sign-out failed");
    }
    if let Err(e) = clear_current_vendor(&session).await {
        tracing::warn!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    StatusCode::NO_CONTENT
}

/// GET /api/me
async fn me(RequireVendorAuth(vendor): RequireVendorAuth) -> Json<MeResponse> {
    Json(MeResponse::from(&vendor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::backend::MemoryBackend;
    use crate::routes::test_support::{app, json, send, sign_in};

    #[tokio::test]
    async fn test_api_requires_sign_in() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = send(&app, "GET", "/api/me", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "Not signed in");
    }

    #[tokio::test]
    async fn test_login_me_logout() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let cookie = sign_in(&app, &backend).await;

        let response = send(&app, "GET", "/api/me", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json(response).await["email"].as_str().unwrap().ends_with("@shop.vn"));

        let response = send(&app, "POST", "/auth/logout", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", "/api/me", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let body = serde_json::json!({ "email": "nobody@shop.vn", "password": "nope" });
        let response = send(&app, "POST", "/auth/login", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = serde_json::json!({ "email": "not-an-email", "password": "x" });
        let response = send(&app, "POST", "/auth/login", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
