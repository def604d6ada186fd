//! Customer reviews and vendor replies.

use tracing::instrument;

use vendor_hub_core::{ReviewId, StoreId};

use super::{ServiceError, ValidationError};
use crate::backend::{AccessToken, Backend};
use crate::models::Review;

/// Longest reply a vendor may post, in characters.
pub const MAX_REPLY_LENGTH: usize = 1000;

pub struct ReviewService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, token: &'a AccessToken) -> Self {
        Self { backend, token }
    }

    /// Reviews of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn list(&self, store: StoreId) -> Result<Vec<Review>, ServiceError> {
        Ok(self.backend.list_reviews(self.token, store).await?)
    }

    /// Post (or replace) the vendor's reply to a review.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a blank or over-long reply
    /// - `ServiceError::Backend` if the review is not visible or the write fails
    #[instrument(skip(self, reply), fields(review_id = %id))]
    pub async fn reply(&self, id: ReviewId, reply: &str) -> Result<Review, ServiceError> {
        let reply = validate_reply(reply)?;
        let review = self.backend.reply_to_review(self.token, id, reply).await?;
        tracing::info!("Review replied");
        Ok(review)
    }
}

fn validate_reply(reply: &str) -> Result<&str, ValidationError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(ValidationError::new("reply", "cannot be blank"));
    }
    if reply.chars().count() > MAX_REPLY_LENGTH {
        return Err(ValidationError::new(
            "reply",
            format!("must be at most {MAX_REPLY_LENGTH} characters"),
        ));
    }
    Ok(reply)
}
