//! The signed-in vendor's notification inbox.

use tracing::instrument;

use vendor_hub_core::{NotificationId, VendorId};

use super::ServiceError;
use crate::backend::{AccessToken, Backend};
use crate::models::Notification;

pub struct NotificationService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
    user: VendorId,
}

impl<'a> NotificationService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, token: &'a AccessToken, user: VendorId) -> Self {
        Self {
            backend,
            token,
            user,
        }
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn list(&self, unread_only: bool) -> Result<Vec<Notification>, ServiceError> {
        Ok(self
            .backend
            .list_notifications(self.token, self.user.as_uuid(), unread_only)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn unread_count(&self) -> Result<usize, ServiceError> {
        Ok(self.list(true).await?.len())
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the notification is not the
    /// vendor's or the write fails.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_read(&self, id: NotificationId) -> Result<Notification, ServiceError> {
        Ok(self.backend.mark_notification_read(self.token, id).await?)
    }

    /// Returns how many notifications were unread.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the write fails.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn mark_all_read(&self) -> Result<usize, ServiceError> {
        let changed = self
            .backend
            .mark_all_notifications_read(self.token, self.user.as_uuid())
            .await?;
        tracing::debug!(changed, "Notifications marked read");
        Ok(changed)
    }
}
