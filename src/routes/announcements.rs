use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::announcement::{Announcement, AnnouncementDto, CreateAnnouncementRequest},
    models::auth::AuthenticatedAdmin,
    services::events::{self, BoardEvent},
    AppState,
};

/// GET /announcements — public endpoint, newest first.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementDto>>, (StatusCode, Json<Value>)> {
    let rows = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    Ok(Json(rows.into_iter().map(AnnouncementDto::from).collect()))
}

/// POST /announcements — the server assigns the id and timestamp.
pub async fn create_announcement(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementDto>), (StatusCode, Json<Value>)> {
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Title and content are required" })),
        ));
    }

    let row = sqlx::query_as::<_, Announcement>(
        "INSERT INTO announcements (kind, title, content, question_number)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(body.kind.to_string())
    .bind(body.title.trim())
    .bind(body.content.trim())
    .bind(body.question_number)
    .fetch_one(&state.db)
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    events::publish(&state.redis, &BoardEvent::AnnouncementAdded { id: row.id }).await;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// DELETE /announcements/{id} — idempotent; deleting an absent id is a no-op.
pub async fn delete_announcement(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    if result.rows_affected() > 0 {
        events::publish(&state.redis, &BoardEvent::AnnouncementDeleted { id }).await;
    }

    Ok(Json(json!({ "ok": true })))
}
