//! Authentication extractors for vendor routes.
//!
//! The signed-in vendor lives in the server-side session. Handlers that need
//! one take [`RequireVendorAuth`]; the dashboard is a JSON API, so a missing
//! session is always a 401 rather than a redirect.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentVendor, session_keys};

/// Extractor that requires a signed-in vendor.
///
/// ```rust,ignore
/// async fn list_stores(RequireVendorAuth(vendor): RequireVendorAuth) -> impl IntoResponse {
///     format!("Hello, {}!", vendor.email)
/// }
/// ```
pub struct RequireVendorAuth(pub CurrentVendor);

/// Rejection when no vendor is signed in.
#[derive(Debug)]
pub struct VendorAuthRejection;

impl IntoResponse for VendorAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Not signed in" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireVendorAuth
where
    S: Send + Sync,
{
    type Rejection = VendorAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(VendorAuthRejection)?;

        let vendor: CurrentVendor = session
            .get(session_keys::CURRENT_VENDOR)
            .await
            .ok()
            .flatten()
            .ok_or(VendorAuthRejection)?;

        Ok(Self(vendor))
    }
}

/// Extractor that optionally gets the signed-in vendor.
pub struct OptionalVendorAuth(pub Option<CurrentVendor>);

impl<S> FromRequestParts<S> for OptionalVendorAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let vendor = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentVendor>(session_keys::CURRENT_VENDOR)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(vendor))
    }
}

/// Store the signed-in vendor in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_vendor(
    session: &Session,
    vendor: &CurrentVendor,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_VENDOR, vendor).await
}

/// Sign the vendor out of the session.
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear_current_vendor(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
