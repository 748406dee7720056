use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::admin::{AddAdminRequest, Admin},
    models::auth::AuthenticatedAdmin,
    services::auth::{check_removal, AccessError},
    AppState,
};

fn internal(e: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
}

/// GET /admins
pub async fn list_admins(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<Json<Vec<Admin>>, (StatusCode, Json<Value>)> {
    let rows = sqlx::query_as::<_, Admin>("SELECT * FROM admins ORDER BY added_at")
        .fetch_all(&state.db)
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

/// POST /admins — register an admin email; re-adding overwrites the name.
pub async fn add_admin(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(body): Json<AddAdminRequest>,
) -> Result<(StatusCode, Json<Admin>), (StatusCode, Json<Value>)> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "Email is required" }))));
    }
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&email)
        .to_string();
    let added_by = admin.email.unwrap_or_else(|| "shared-password".into());

    let row = sqlx::query_as::<_, Admin>(
        "INSERT INTO admins (email, name, added_by)
         VALUES ($1, $2, $3)
         ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
         RETURNING *",
    )
    .bind(&email)
    .bind(&name)
    .bind(&added_by)
    .fetch_one(&state.db)
    .await
    .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /admins/{email} — the acting admin can never remove themself.
pub async fn remove_admin(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(email): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let target = email.trim().to_lowercase();
    let actor = admin.email.map(|e| e.to_lowercase());
    if let Err(AccessError::SelfRemoval) = check_removal(actor.as_deref(), &target) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": AccessError::SelfRemoval.to_string() })),
        ));
    }

    sqlx::query("DELETE FROM admins WHERE email = $1")
        .bind(&target)
        .execute(&state.db)
        .await
        .map_err(internal)?;

    Ok(Json(json!({ "ok": true })))
}
