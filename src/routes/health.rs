use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /health — probes both backing stores; the board is degraded without
/// either (no data, or no live propagation).
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db = sqlx::query("SELECT 1").execute(&state.db).await;

    let mut redis_conn = state.redis.clone();
    let redis: Result<String, _> = redis::cmd("PING").query_async(&mut redis_conn).await;

    match (&db, &redis) {
        (Ok(_), Ok(_)) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected", "redis": "connected" })),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "db": db.err().map(|e| e.to_string()).unwrap_or_else(|| "connected".into()),
                "redis": redis.err().map(|e| e.to_string()).unwrap_or_else(|| "connected".into()),
            })),
        ),
    }
}
