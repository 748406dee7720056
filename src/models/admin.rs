use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub email: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
    pub added_by: String,
}

#[derive(Debug, Deserialize)]
pub struct AddAdminRequest {
    pub email: String,
    /// Falls back to the email when omitted.
    pub name: Option<String>,
}
