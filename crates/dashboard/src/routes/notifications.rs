//! Notification inbox of the signed-in vendor.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use vendor_hub_core::NotificationId;

use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::models::Notification;
use crate::services::NotificationService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_read))
        .route("/api/notifications/read-all", post(mark_all_read))
}

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Serialize)]
pub struct Inbox {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: usize,
}

/// GET /api/notifications?unread=
async fn list_notifications(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Inbox>, AppError> {
    let token = vendor.token();
    let service = NotificationService::new(state.backend(), &token, vendor.id);
    let notifications = service.list(query.unread).await?;
    let unread_count = if query.unread {
        notifications.len()
    } else {
        notifications.iter().filter(|n| !n.is_read).count()
    };
    Ok(Json(Inbox {
        notifications,
        unread_count,
    }))
}

/// POST /api/notifications/{id}/read
async fn mark_read(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let token = vendor.token();
    let service = NotificationService::new(state.backend(), &token, vendor.id);
    Ok(Json(service.mark_read(id).await?))
}

/// POST /api/notifications/read-all
async fn mark_all_read(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
) -> Result<Json<MarkedRead>, AppError> {
    let token = vendor.token();
    let service = NotificationService::new(state.backend(), &token, vendor.id);
    let updated = service.mark_all_read().await?;
    Ok(Json(MarkedRead { updated }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::Utc;
    use uuid::Uuid;
    use vendor_hub_core::{NotificationId, NotificationKind};

    use crate::backend::MemoryBackend;
    use crate::models::Notification;
    use crate::routes::test_support::{app, json, send, sign_in};

    fn unread(user: Uuid) -> Notification {
        Notification {
            id: NotificationId::random(),
            user_id: user,
            title: "New review".to_string(),
            message: "A customer rated your store 5 stars.".to_string(),
            kind: NotificationKind::Success,
            is_read: false,
            link: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_inbox_read_all() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let cookie = sign_in(&app, &backend).await;
        let me = json(send(&app, "GET", "/api/me", Some(&cookie), None).await).await;
        let vendor: Uuid = me["id"].as_str().unwrap().parse().unwrap();
        backend.seed_notification(unread(vendor)).await;
        backend.seed_notification(unread(vendor)).await;

        let response = send(&app, "GET", "/api/notifications", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let inbox = json(response).await;
        assert_eq!(inbox["unread_count"], 2);
        assert_eq!(inbox["notifications"].as_array().unwrap().len(), 2);

        let response = send(&app, "POST", "/api/notifications/read-all", Some(&cookie), None).await;
        assert_eq!(json(response).await["updated"], 2);

        let response = send(&app, "GET", "/api/notifications?unread=true", Some(&cookie), None).await;
        assert_eq!(json(response).await["unread_count"], 0);
    }
}
