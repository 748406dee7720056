use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::announcement::AnnouncementKind;

/// Announcement template bundled in a preset — no id or timestamp, those are
/// assigned when the preset is applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetAnnouncement {
    pub kind: AnnouncementKind,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_number: Option<i32>,
}

/// DB row struct — bundled announcements are stored as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct PresetRow {
    pub id: Uuid,
    pub name: String,
    pub exam_name: String,
    pub subject: String,
    pub duration_minutes: i64,
    pub early_exit_minutes: Option<i64>,
    pub announcements: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: Uuid,
    pub name: String,
    pub exam_name: String,
    pub subject: String,
    pub duration_minutes: i64,
    pub early_exit_minutes: Option<i64>,
    pub announcements: Vec<PresetAnnouncement>,
    pub created_at: DateTime<Utc>,
}

impl From<PresetRow> for Preset {
    fn from(row: PresetRow) -> Self {
        // A malformed template list reads as empty rather than failing the load.
        let announcements = serde_json::from_value(row.announcements).unwrap_or_default();
        Self {
            id: row.id,
            name: row.name,
            exam_name: row.exam_name,
            subject: row.subject,
            duration_minutes: row.duration_minutes,
            early_exit_minutes: row.early_exit_minutes,
            announcements,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CapturePresetRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyPresetRequest {
    /// Append the preset's bundled announcements (additive, never a replace).
    #[serde(default)]
    pub include_announcements: bool,
}
