use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::announcement::{Announcement, AnnouncementDto},
    models::auth::AuthenticatedAdmin,
    models::exam::{Exam, EXAM_DOC_ID},
    models::preset::{ApplyPresetRequest, CapturePresetRequest, Preset, PresetRow},
    services::events::{self, BoardEvent},
    services::presets,
    AppState,
};

fn internal(e: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
}

/// GET /presets
pub async fn list_presets(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<Json<Vec<Preset>>, (StatusCode, Json<Value>)> {
    let rows = sqlx::query_as::<_, PresetRow>("SELECT * FROM presets ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await
        .map_err(internal)?;

    Ok(Json(rows.into_iter().map(Preset::from).collect()))
}

/// POST /presets/capture — snapshot the current exam + announcements as a
/// reusable template with relative offsets.
pub async fn capture_preset(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CapturePresetRequest>,
) -> Result<(StatusCode, Json<Preset>), (StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "Preset name is required" }))));
    }

    let exam = sqlx::query_as::<_, Exam>("SELECT * FROM exams WHERE id = $1")
        .bind(EXAM_DOC_ID)
        .fetch_optional(&state.db)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, Json(json!({ "error": "No exam is configured" }))))?;

    let announcements: Vec<AnnouncementDto> = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(internal)?
    .into_iter()
    .map(AnnouncementDto::from)
    .collect();

    let draft = presets::capture(body.name.trim(), &exam, &announcements);
    let templates = serde_json::to_value(&draft.announcements).unwrap_or_else(|_| json!([]));

    let row = sqlx::query_as::<_, PresetRow>(
        "INSERT INTO presets (name, exam_name, subject, duration_minutes, early_exit_minutes, announcements)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&draft.name)
    .bind(&draft.exam_name)
    .bind(&draft.subject)
    .bind(draft.duration_minutes)
    .bind(draft.early_exit_minutes)
    .bind(templates)
    .fetch_one(&state.db)
    .await
    .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// POST /presets/{id}/apply — materialize the preset into the singleton exam.
/// The anchor is the currently configured start time when an exam exists,
/// otherwise now; either way truncated to the minute. Bundled announcements
/// are appended additively, each freshly timestamped.
pub async fn apply_preset(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<ApplyPresetRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let preset: Preset = sqlx::query_as::<_, PresetRow>("SELECT * FROM presets WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, Json(json!({ "error": "Preset not found" }))))?
        .into();

    let current = sqlx::query_as::<_, Exam>("SELECT * FROM exams WHERE id = $1")
        .bind(EXAM_DOC_ID)
        .fetch_optional(&state.db)
        .await
        .map_err(internal)?;

    let anchor = current.map(|e| e.start_time).unwrap_or_else(Utc::now);
    let window = presets::apply(&preset, anchor);

    let exam = sqlx::query_as::<_, Exam>(
        "INSERT INTO exams (id, name, subject, start_time, end_time, early_exit_time, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW())
         ON CONFLICT (id) DO UPDATE
         SET name = EXCLUDED.name, subject = EXCLUDED.subject,
             start_time = EXCLUDED.start_time, end_time = EXCLUDED.end_time,
             early_exit_time = EXCLUDED.early_exit_time, updated_at = NOW()
         RETURNING *",
    )
    .bind(EXAM_DOC_ID)
    .bind(&preset.exam_name)
    .bind(&preset.subject)
    .bind(window.start_time)
    .bind(window.end_time)
    .bind(window.early_exit_time)
    .fetch_one(&state.db)
    .await
    .map_err(internal)?;

    let mut appended = 0;
    if body.include_announcements {
        for template in &preset.announcements {
            sqlx::query(
                "INSERT INTO announcements (kind, title, content, question_number)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(template.kind.to_string())
            .bind(&template.title)
            .bind(&template.content)
            .bind(template.question_number)
            .execute(&state.db)
            .await
            .map_err(internal)?;
            appended += 1;
        }
    }

    events::publish(&state.redis, &BoardEvent::PresetApplied { id }).await;

    Ok(Json(json!({
        "exam": exam,
        "announcements_appended": appended,
    })))
}

/// DELETE /presets/{id} — idempotent.
pub async fn delete_preset(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    sqlx::query("DELETE FROM presets WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(internal)?;

    Ok(Json(json!({ "ok": true })))
}
