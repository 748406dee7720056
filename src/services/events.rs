//! Board change events fanned out over Redis pub/sub. Every mutation
//! publishes one event; connected display clients re-fetch the named
//! resource and replace their state wholesale.

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const BOARD_CHANNEL: &str = "board:events";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BoardEvent {
    ExamUpdated,
    AnnouncementAdded { id: Uuid },
    AnnouncementDeleted { id: Uuid },
    SettingsUpdated,
    PresetApplied { id: Uuid },
}

/// Best-effort publish: a fan-out failure is logged but never fails the
/// mutation that triggered it.
pub async fn publish(redis: &MultiplexedConnection, event: &BoardEvent) {
    let payload = match serde_json::to_string(event) {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not serialize board event: {}", e);
            return;
        }
    };
    let mut conn = redis.clone();
    if let Err(e) = conn.publish::<_, _, i64>(BOARD_CHANNEL, payload).await {
        warn!("Could not publish board event: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tags() {
        let json = serde_json::to_value(&BoardEvent::ExamUpdated).unwrap();
        assert_eq!(json["type"], "exam_updated");

        let id = Uuid::new_v4();
        let json = serde_json::to_value(&BoardEvent::AnnouncementDeleted { id }).unwrap();
        assert_eq!(json["type"], "announcement_deleted");
        assert_eq!(json["payload"]["id"], id.to_string());
    }

    #[test]
    fn events_round_trip() {
        let id = Uuid::new_v4();
        for event in [
            BoardEvent::ExamUpdated,
            BoardEvent::AnnouncementAdded { id },
            BoardEvent::SettingsUpdated,
            BoardEvent::PresetApplied { id },
        ] {
            let raw = serde_json::to_string(&event).unwrap();
            let back: BoardEvent = serde_json::from_str(&raw).unwrap();
            assert_eq!(back, event);
        }
    }
}
