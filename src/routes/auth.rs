use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    models::auth::{
        AuthenticatedAdmin, EntryMethod, LoginRequest, LoginResponse, PasswordLoginRequest,
        SetAdminPasswordRequest,
    },
    services::auth::{
        decide_email_access, decide_password_access, hash_admin_password, issue_access_token,
        verify_identity_token, AccessError, EmailAccess,
    },
    AppState,
};

fn internal(e: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
}

/// POST /auth/login — identity path. The identity provider's token is
/// verified, then the registry decides: an empty registry bootstraps the
/// principal as the first admin, otherwise membership is required.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<Value>)> {
    let principal = verify_identity_token(&body.id_token, &state.config.identity_secret)
        .map_err(|_| (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid identity token" }))))?;
    let email = principal.email.trim().to_lowercase();

    let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(&state.db)
        .await
        .map_err(internal)?;
    let is_registered: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1)")
            .bind(&email)
            .fetch_one(&state.db)
            .await
            .map_err(internal)?;

    let access = decide_email_access(admin_count, is_registered).map_err(|e| {
        (StatusCode::FORBIDDEN, Json(json!({ "error": e.to_string() })))
    })?;

    let bootstrapped = access == EmailAccess::Bootstrap;
    if bootstrapped {
        sqlx::query("INSERT INTO admins (email, name, added_by) VALUES ($1, $2, $1)")
            .bind(&email)
            .bind(&principal.name)
            .execute(&state.db)
            .await
            .map_err(internal)?;
        info!("Bootstrapped first admin: {}", email);
    }

    let access_token = issue_access_token(
        Some(&email),
        &principal.name,
        EntryMethod::Identity,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .map_err(internal)?;

    Ok(Json(LoginResponse {
        access_token,
        email: Some(email),
        name: principal.name,
        entry: EntryMethod::Identity,
        bootstrapped,
    }))
}

/// POST /auth/password — shared-password path. Denied whenever no password
/// has been configured; no lockout, every attempt is independent.
pub async fn password_login(
    State(state): State<AppState>,
    Json(body): Json<PasswordLoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<Value>)> {
    let stored_hash: Option<String> =
        sqlx::query_scalar("SELECT admin_password_hash FROM app_settings WHERE id = 'app'")
            .fetch_optional(&state.db)
            .await
            .map_err(internal)?
            .flatten();

    decide_password_access(stored_hash.as_deref(), &body.password).map_err(|e| {
        let status = match e {
            AccessError::PasswordNotConfigured => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        };
        (status, Json(json!({ "error": e.to_string() })))
    })?;

    let access_token = issue_access_token(
        None,
        "Shared password",
        EntryMethod::Password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .map_err(internal)?;

    Ok(Json(LoginResponse {
        access_token,
        email: None,
        name: "Shared password".into(),
        entry: EntryMethod::Password,
        bootstrapped: false,
    }))
}

/// GET /auth/me
pub async fn me(admin: AuthenticatedAdmin) -> Json<Value> {
    Json(json!({
        "email": admin.email,
        "name": admin.name,
        "entry": admin.entry,
    }))
}

/// GET /auth/admin-password — reports only whether one is configured.
pub async fn admin_password_status(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let stored_hash: Option<String> =
        sqlx::query_scalar("SELECT admin_password_hash FROM app_settings WHERE id = 'app'")
            .fetch_optional(&state.db)
            .await
            .map_err(internal)?
            .flatten();

    Ok(Json(json!({ "configured": stored_hash.is_some() })))
}

/// PUT /auth/admin-password — set the shared admin password (stored hashed).
pub async fn set_admin_password(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<SetAdminPasswordRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.password.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "Password is required" }))));
    }

    let hash = hash_admin_password(&body.password).map_err(internal)?;
    sqlx::query("UPDATE app_settings SET admin_password_hash = $1, updated_at = NOW() WHERE id = 'app'")
        .bind(&hash)
        .execute(&state.db)
        .await
        .map_err(internal)?;

    Ok(Json(json!({ "ok": true })))
}
