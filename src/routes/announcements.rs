use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth::OperatorAuth,
    models::announcement::{Announcement, AnnouncementDraft},
    AppState,
};

/// GET /announcements — full current set, unsorted.
pub async fn list_announcements(
    State(state): State<AppState>,
    _auth: OperatorAuth,
) -> Json<Vec<Announcement>> {
    Json(state.announcements.list().await)
}

/// POST /announcements — validate and store a new announcement.
pub async fn create_announcement(
    State(state): State<AppState>,
    _auth: OperatorAuth,
    Json(draft): Json<AnnouncementDraft>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    let announcement = state.announcements.create(draft).await?;
    info!(
        id = %announcement.id,
        severity = ?announcement.severity,
        "Announcement created"
    );
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// DELETE /announcements/{id} — idempotent: unknown ids also return 204.
pub async fn delete_announcement(
    State(state): State<AppState>,
    _auth: OperatorAuth,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.announcements.delete(id).await {
        info!(%id, "Announcement deleted");
    } else {
        debug!(%id, "Delete for unknown announcement id");
    }
    StatusCode::NO_CONTENT
}
