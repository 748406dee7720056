use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    Info,
    Warning,
    Correction,
}

impl std::fmt::Display for AnnouncementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnnouncementKind::Info => "info",
            AnnouncementKind::Warning => "warning",
            AnnouncementKind::Correction => "correction",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AnnouncementKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AnnouncementKind::Info),
            "warning" => Ok(AnnouncementKind::Warning),
            "correction" => Ok(AnnouncementKind::Correction),
            _ => Err(anyhow::anyhow!("Unknown announcement kind: {s}")),
        }
    }
}

/// DB row struct — kind is fetched as TEXT and parsed into the enum for DTOs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub question_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementDto {
    pub id: Uuid,
    pub kind: AnnouncementKind,
    pub title: String,
    pub content: String,
    pub question_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementDto {
    fn from(a: Announcement) -> Self {
        Self {
            id: a.id,
            kind: a.kind.parse().unwrap_or(AnnouncementKind::Info),
            title: a.title,
            content: a.content,
            question_number: a.question_number,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub kind: AnnouncementKind,
    pub title: String,
    pub content: String,
    pub question_number: Option<i32>,
}
