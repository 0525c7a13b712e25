//! Snapshot ingestion: normalizing raw store documents into [`Poster`]s.
//!
//! Legacy records may carry `location`, `category` or `tags` as a single
//! (possibly comma-separated) string instead of an array. This module is the
//! one place that duality is resolved; everything downstream assumes set
//! semantics. Malformed dates, times, frequencies and weekday names degrade
//! to "absent" with a warning rather than failing the record.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde_json::Value;
use tracing::warn;

use crate::error::{IngestError, IngestResult};
use crate::poster::{Frequency, Poster, Schedule};

/// Build one poster from its document id and raw JSON fields.
///
/// Only structural problems are errors (no id, no title, not an object);
/// everything else is normalized leniently.
pub fn poster_from_document(id: &str, doc: &Value) -> IngestResult<Poster> {
    if !doc.is_object() {
        return Err(IngestError::NotAnObject);
    }
    if id.trim().is_empty() {
        return Err(IngestError::MissingField("id"));
    }
    let title = string_field(doc, "title").ok_or(IngestError::MissingField("title"))?;

    let repeating = doc
        .get("repeating")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let schedule = if repeating {
        let frequency = match doc.get("frequency").and_then(Value::as_str) {
            Some(raw) => {
                let parsed = Frequency::parse(raw);
                if parsed.is_none() {
                    warn!(poster = id, frequency = raw, "unknown frequency; poster will never occur");
                }
                parsed
            }
            None => None,
        };
        Schedule::Repeating {
            anchor: date_field(doc, "next_occurring_date", id),
            frequency,
            days_of_week: weekday_set(doc.get("days_of_week"), id),
        }
    } else {
        Schedule::Single {
            date: date_field(doc, "single_event_date", id),
        }
    };

    let mut start_time = time_field(doc, "start_time", id);
    let mut end_time = time_field(doc, "end_time", id);
    if start_time.is_some() != end_time.is_some() {
        warn!(poster = id, "start_time and end_time must be co-present; ignoring the lone value");
        start_time = None;
        end_time = None;
    }

    Ok(Poster {
        id: id.to_string(),
        title,
        description: string_field(doc, "description").unwrap_or_default(),
        location: string_set(doc.get("location")),
        category: string_set(doc.get("category")),
        tags: string_set(doc.get("tags")),
        organizer: string_field(doc, "organizer"),
        uploaded_by: string_field(doc, "uploaded_by"),
        schedule,
        start_time,
        end_time,
        sort_date: date_field(doc, "sort_date", id),
        created_at: created_at_field(doc),
        image_url: string_field(doc, "image_url"),
    })
}

/// Ingest a whole store snapshot: a JSON array of documents, each carrying
/// its `id` alongside its fields. Structurally unusable records are skipped
/// with a warning rather than failing the snapshot; relative order is kept.
pub fn posters_from_snapshot(snapshot: &Value) -> Vec<Poster> {
    let Some(docs) = snapshot.as_array() else {
        warn!("snapshot is not an array; ignoring");
        return Vec::new();
    };

    let mut posters = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc.get("id").and_then(Value::as_str).unwrap_or_default();
        match poster_from_document(id, doc) {
            Ok(poster) => posters.push(poster),
            Err(err) => warn!(poster = id, %err, "skipping unusable record"),
        }
    }
    posters
}

/// Distinct lowercase tags across a collection, most-used first; ties keep
/// first-seen order. Feeds the tag filter dropdown.
pub fn tag_catalog(posters: &[Poster]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for poster in posters {
        for tag in &poster.tags {
            let tag = tag.to_lowercase();
            match counts.iter_mut().find(|(seen, _)| *seen == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag, 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(tag, _)| tag).collect()
}

fn string_field(doc: &Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Accept an array of strings or a single (comma-separated) string and
/// normalize to a deduplicated set. First spelling wins on case collisions.
fn string_set(value: Option<&Value>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    {
        let mut push = |raw: &str| {
            for part in raw.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let lower = part.to_lowercase();
                if !out.iter().any(|seen| seen.to_lowercase() == lower) {
                    out.push(part.to_string());
                }
            }
        };

        match value {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Some(s) = item.as_str() {
                        push(s);
                    }
                }
            }
            Some(Value::String(s)) => push(s),
            _ => {}
        }
    }
    out
}

fn weekday_set(value: Option<&Value>, poster: &str) -> Vec<Weekday> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for item in items {
        let Some(name) = item.as_str() else { continue };
        match name.parse::<Weekday>() {
            Ok(day) if !out.contains(&day) => out.push(day),
            Ok(_) => {}
            Err(_) => warn!(poster, day = name, "unknown weekday name; ignoring"),
        }
    }
    out
}

fn date_field(doc: &Value, key: &str, poster: &str) -> Option<NaiveDate> {
    let raw = doc.get(key)?.as_str()?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(poster, field = key, value = raw, "unparseable date; treating as absent");
            None
        }
    }
}

fn time_field(doc: &Value, key: &str, poster: &str) -> Option<NaiveTime> {
    let raw = doc.get(key)?.as_str()?;
    match NaiveTime::parse_from_str(raw, "%H:%M") {
        Ok(time) => Some(time),
        Err(_) => {
            warn!(poster, field = key, value = raw, "unparseable time; treating as absent");
            None
        }
    }
}

fn created_at_field(doc: &Value) -> DateTime<Utc> {
    doc.get("created_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
