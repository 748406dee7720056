//! Preset transformation: capture the current exam + announcements into a
//! relative template, and materialize a template back into concrete
//! timestamps against an anchor instant.

use chrono::{DateTime, Duration, Utc};

use crate::models::announcement::AnnouncementDto;
use crate::models::exam::Exam;
use crate::models::preset::{Preset, PresetAnnouncement};

/// A preset before it has an id, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDraft {
    pub name: String,
    pub exam_name: String,
    pub subject: String,
    pub duration_minutes: i64,
    pub early_exit_minutes: Option<i64>,
    pub announcements: Vec<PresetAnnouncement>,
}

/// Concrete exam window computed from a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub early_exit_time: Option<DateTime<Utc>>,
}

fn round_minutes(d: Duration) -> i64 {
    (d.num_seconds() as f64 / 60.0).round() as i64
}

/// Capture a preset from the live exam state. Announcement ids and timestamps
/// are stripped; they are regenerated when the preset is applied.
pub fn capture(name: &str, exam: &Exam, announcements: &[AnnouncementDto]) -> PresetDraft {
    PresetDraft {
        name: name.to_string(),
        exam_name: exam.name.clone(),
        subject: exam.subject.clone(),
        duration_minutes: round_minutes(exam.end_time - exam.start_time),
        early_exit_minutes: exam
            .early_exit_time
            .map(|t| round_minutes(t - exam.start_time)),
        announcements: announcements
            .iter()
            .map(|a| PresetAnnouncement {
                kind: a.kind,
                title: a.title.clone(),
                content: a.content.clone(),
                question_number: a.question_number,
            })
            .collect(),
    }
}

/// Truncate to the whole minute, flooring toward the past.
pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp() - t.timestamp().rem_euclid(60);
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(t)
}

/// Materialize a preset's relative offsets against an anchor instant.
pub fn apply(preset: &Preset, anchor: DateTime<Utc>) -> AppliedWindow {
    let base = truncate_to_minute(anchor);
    AppliedWindow {
        start_time: base,
        end_time: base + Duration::minutes(preset.duration_minutes),
        early_exit_time: preset
            .early_exit_minutes
            .map(|m| base + Duration::minutes(m)),
    }
}

/// Compact duration label: "2h 30m", "2h", "45m"; zero renders as "0m".
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, h, m, 0).unwrap()
    }

    fn exam(start: DateTime<Utc>, end: DateTime<Utc>, early: Option<DateTime<Utc>>) -> Exam {
        Exam {
            id: "current".into(),
            name: "Final".into(),
            subject: "Data Structures".into(),
            start_time: start,
            end_time: end,
            early_exit_time: early,
            updated_at: at(9, 0),
        }
    }

    fn preset(duration: i64, early: Option<i64>) -> Preset {
        Preset {
            id: Uuid::new_v4(),
            name: "Standard final".into(),
            exam_name: "Final".into(),
            subject: "Data Structures".into(),
            duration_minutes: duration,
            early_exit_minutes: early,
            announcements: vec![],
            created_at: at(9, 0),
        }
    }

    #[test]
    fn capture_computes_relative_offsets() {
        let draft = capture("Standard final", &exam(at(10, 0), at(12, 0), Some(at(11, 0))), &[]);
        assert_eq!(draft.duration_minutes, 120);
        assert_eq!(draft.early_exit_minutes, Some(60));
    }

    #[test]
    fn capture_without_early_exit() {
        let draft = capture("p", &exam(at(10, 0), at(11, 30), None), &[]);
        assert_eq!(draft.duration_minutes, 90);
        assert_eq!(draft.early_exit_minutes, None);
    }

    #[test]
    fn capture_strips_announcement_identity() {
        let announcements = vec![AnnouncementDto {
            id: Uuid::new_v4(),
            kind: crate::models::announcement::AnnouncementKind::Correction,
            title: "Correction".into(),
            content: "Question 5 is replaced.".into(),
            question_number: Some(5),
            created_at: at(10, 15),
        }];
        let draft = capture("p", &exam(at(10, 0), at(12, 0), None), &announcements);
        assert_eq!(
            draft.announcements,
            vec![PresetAnnouncement {
                kind: crate::models::announcement::AnnouncementKind::Correction,
                title: "Correction".into(),
                content: "Question 5 is replaced.".into(),
                question_number: Some(5),
            }]
        );
    }

    #[test]
    fn capture_rounds_to_nearest_minute() {
        let start = at(10, 0);
        let end = start + Duration::seconds(90 * 60 + 29);
        assert_eq!(capture("p", &exam(start, end, None), &[]).duration_minutes, 90);
        let end = start + Duration::seconds(90 * 60 + 31);
        assert_eq!(capture("p", &exam(start, end, None), &[]).duration_minutes, 91);
    }

    #[test]
    fn apply_reanchors_the_window() {
        let window = apply(&preset(120, Some(60)), at(9, 0));
        assert_eq!(window.start_time, at(9, 0));
        assert_eq!(window.end_time, at(11, 0));
        assert_eq!(window.early_exit_time, Some(at(10, 0)));
    }

    #[test]
    fn apply_truncates_anchor_to_the_minute() {
        let anchor = Utc.with_ymd_and_hms(2026, 6, 15, 9, 0, 42).unwrap();
        let window = apply(&preset(60, None), anchor);
        assert_eq!(window.start_time, at(9, 0));
        assert_eq!(window.end_time, at(10, 0));
        assert_eq!(window.early_exit_time, None);
    }

    #[test]
    fn capture_then_apply_round_trips() {
        let draft = capture("p", &exam(at(10, 0), at(12, 0), Some(at(11, 0))), &[]);
        let mut p = preset(draft.duration_minutes, draft.early_exit_minutes);
        p.announcements = draft.announcements;
        let window = apply(&p, at(9, 0));
        assert_eq!(window.start_time, at(9, 0));
        assert_eq!(window.end_time, at(11, 0));
        assert_eq!(window.early_exit_time, Some(at(10, 0)));
    }

    #[test]
    fn duration_labels() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(150), "2h 30m");
    }
}
