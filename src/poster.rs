//! Poster records: immutable snapshots of the documents in the event store.
//!
//! A `Poster` is produced whole by [`crate::ingest`], passed by value through
//! the feed pipeline, and discarded after each render cycle. All dates are
//! naive calendar dates; all times are naive wall-clock times.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// How often a repeating poster recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl Frequency {
    /// Parse one of the closed set of store literals. Anything else is
    /// `None`, which downstream treats as "never occurs".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "bi-weekly" => Some(Frequency::BiWeekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// When a poster's event happens: exactly one of a single date or a
/// recurrence. The date fields are `Option` because a malformed date string
/// degrades to "absent" at ingestion instead of failing the record; such
/// posters are simply excluded from date-sensitive views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// One-off event on a single calendar date.
    Single { date: Option<NaiveDate> },

    /// Recurring event. `anchor` is the recurrence's own start date (the
    /// store's `next_occurring_date`); no occurrence exists before it.
    Repeating {
        anchor: Option<NaiveDate>,
        /// `None` when the stored frequency was outside the known set.
        frequency: Option<Frequency>,
        /// Empty means every day the frequency permits.
        days_of_week: Vec<Weekday>,
    },
}

/// Who a poster is attributed to in the UI: the free-text organizer when
/// present, otherwise the uploading account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution<'a> {
    Organizer(&'a str),
    Uploader(&'a str),
    Unknown,
}

/// A normalized event poster.
///
/// `location`, `category` and `tags` carry set semantics (deduplicated
/// case-insensitively at ingestion); the original spellings are kept for
/// display.
#[derive(Debug, Clone, PartialEq)]
pub struct Poster {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: Vec<String>,
    pub category: Vec<String>,
    pub tags: Vec<String>,
    pub organizer: Option<String>,
    pub uploaded_by: Option<String>,
    pub schedule: Schedule,
    /// Co-present with `end_time` or absent (enforced at ingestion).
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Explicit ordering override; falls back to the schedule's own date.
    pub sort_date: Option<NaiveDate>,
    /// Creation timestamp, used as the ordering tie-break.
    pub created_at: DateTime<Utc>,
    /// Carried opaquely for the rendering layer.
    pub image_url: Option<String>,
}

impl Poster {
    pub fn is_repeating(&self) -> bool {
        matches!(self.schedule, Schedule::Repeating { .. })
    }

    /// The date used for ordering and default past-event exclusion: the
    /// explicit `sort_date` override when present, otherwise the poster's own
    /// single or anchor date. `None` sorts as the earliest possible date.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.sort_date.or(match &self.schedule {
            Schedule::Single { date } => *date,
            Schedule::Repeating { anchor, .. } => *anchor,
        })
    }

    pub fn attribution(&self) -> Attribution<'_> {
        match (&self.organizer, &self.uploaded_by) {
            (Some(organizer), _) => Attribution::Organizer(organizer),
            (None, Some(uploader)) => Attribution::Uploader(uploader),
            (None, None) => Attribution::Unknown,
        }
    }
}
