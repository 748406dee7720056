use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// There is exactly one exam per deployment; saves always target this row.
pub const EXAM_DOC_ID: &str = "current";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exam {
    #[serde(skip_serializing)]
    pub id: String,
    pub name: String,
    pub subject: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub early_exit_time: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SaveExamRequest {
    pub name: String,
    pub subject: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub early_exit_time: Option<DateTime<Utc>>,
}

impl SaveExamRequest {
    /// Temporal sanity: the countdown engine assumes start < end and, when set,
    /// start <= early_exit <= end.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.start_time >= self.end_time {
            return Err("start_time must be before end_time");
        }
        if let Some(early) = self.early_exit_time {
            if early < self.start_time || early > self.end_time {
                return Err("early_exit_time must fall between start_time and end_time");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, h, m, 0).unwrap()
    }

    fn request(start: DateTime<Utc>, end: DateTime<Utc>, early: Option<DateTime<Utc>>) -> SaveExamRequest {
        SaveExamRequest {
            name: "Final".into(),
            subject: "Data Structures".into(),
            start_time: start,
            end_time: end,
            early_exit_time: early,
        }
    }

    #[test]
    fn accepts_well_ordered_times() {
        assert!(request(at(10, 0), at(12, 0), Some(at(11, 0))).validate().is_ok());
        assert!(request(at(10, 0), at(12, 0), None).validate().is_ok());
    }

    #[test]
    fn rejects_start_not_before_end() {
        assert!(request(at(12, 0), at(10, 0), None).validate().is_err());
        assert!(request(at(10, 0), at(10, 0), None).validate().is_err());
    }

    #[test]
    fn rejects_early_exit_outside_window() {
        assert!(request(at(10, 0), at(12, 0), Some(at(9, 59))).validate().is_err());
        assert!(request(at(10, 0), at(12, 0), Some(at(12, 1))).validate().is_err());
        // Boundaries are allowed.
        assert!(request(at(10, 0), at(12, 0), Some(at(10, 0))).validate().is_ok());
        assert!(request(at(10, 0), at(12, 0), Some(at(12, 0))).validate().is_ok());
    }
}
