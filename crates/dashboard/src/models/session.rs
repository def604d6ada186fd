//! Session-related types for vendor authentication.

use serde::{Deserialize, Serialize};

use vendor_hub_core::{Email, VendorId};

use crate::backend::AccessToken;

/// The signed-in user returned by the backend's auth endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: VendorId,
    pub email: Email,
}

/// A successful password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: AccessToken,
    #[serde(default)]
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Session-stored vendor identity.
///
/// The backend access token is kept server-side in the session store so that
/// every backend call is made as the vendor and row-level security applies.
/// `Debug` redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentVendor {
    pub id: VendorId,
    pub email: Email,
    access_token: String,
}

impl CurrentVendor {
    #[must_use]
    pub fn new(id: VendorId, email: Email, access_token: &AccessToken) -> Self {
        Self {
            id,
            email,
            access_token: access_token.expose().to_string(),
        }
    }

    /// The bearer token for backend calls made on this vendor's behalf.
    #[must_use]
    pub fn token(&self) -> AccessToken {
        AccessToken::new(self.access_token.clone())
    }
}

impl From<&AuthSession> for CurrentVendor {
    fn from(session: &AuthSession) -> Self {
        Self::new(
            session.user.id,
            session.user.email.clone(),
            &session.access_token,
        )
    }
}

impl std::fmt::Debug for CurrentVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentVendor")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for vendor authentication data.
pub mod keys {
    /// Key for storing the current signed-in vendor.
    pub const CURRENT_VENDOR: &str = "current_vendor";
}
