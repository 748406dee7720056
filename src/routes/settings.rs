use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    models::auth::AuthenticatedAdmin,
    models::settings::{DisplaySettings, UpdateSettingsRequest},
    services::events::{self, BoardEvent},
    AppState,
};

/// GET /settings — public; display clients need the server defaults before
/// resolving their local overrides.
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<DisplaySettings>, (StatusCode, Json<Value>)> {
    let row: Option<(f64, f64)> = sqlx::query_as(
        "SELECT clock_size, font_scale FROM app_settings WHERE id = 'app'",
    )
    .fetch_optional(&state.db)
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    let settings = row
        .map(|(clock_size, font_scale)| DisplaySettings { clock_size, font_scale })
        .unwrap_or_default();
    Ok(Json(settings))
}

/// PUT /settings — update the server-wide display defaults.
pub async fn update_settings(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<DisplaySettings>, (StatusCode, Json<Value>)> {
    let settings = DisplaySettings {
        clock_size: body.clock_size,
        font_scale: body.font_scale,
    };
    if let Err(msg) = settings.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))));
    }

    sqlx::query(
        "UPDATE app_settings SET clock_size = $1, font_scale = $2, updated_at = NOW() WHERE id = 'app'",
    )
    .bind(settings.clock_size)
    .bind(settings.font_scale)
    .execute(&state.db)
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?;

    events::publish(&state.redis, &BoardEvent::SettingsUpdated).await;

    Ok(Json(settings))
}
