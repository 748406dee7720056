use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    models::auth::AuthenticatedAdmin,
    models::exam::{Exam, SaveExamRequest, EXAM_DOC_ID},
    services::events::{self, BoardEvent},
    AppState,
};

/// GET /exam — public endpoint, returns the current exam or null.
pub async fn get_exam(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let row = sqlx::query_as::<_, Exam>("SELECT * FROM exams WHERE id = $1")
        .bind(EXAM_DOC_ID)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    match row {
        Some(exam) => Ok(Json(serde_json::to_value(exam).unwrap_or(Value::Null))),
        None => Ok(Json(Value::Null)),
    }
}

/// PUT /exam — overwrite the singleton exam document.
pub async fn save_exam(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<SaveExamRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "Exam name is required" }))));
    }
    if let Err(msg) = body.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))));
    }

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
    .bind(&body.name)
    .bind(&body.subject)
    .bind(body.start_time)
    .bind(body.end_time)
    .bind(body.early_exit_time)
    .fetch_one(&state.db)
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    events::publish(&state.redis, &BoardEvent::ExamUpdated).await;

    Ok(Json(serde_json::to_value(exam).unwrap_or(Value::Null)))
}
