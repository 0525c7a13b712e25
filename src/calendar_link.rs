//! Google Calendar export links.
//!
//! Builds a template link against Google's public event-creation endpoint for
//! one poster instance, suitable for a QR code or a direct click. Repeating
//! posters are exported as a single instance (their next occurrence) with a
//! recurrence note in the details.

use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use url::Url;

use crate::poster::{Poster, Schedule};
use crate::recurrence;

const RENDER_ENDPOINT: &str = "https://www.google.com/calendar/render";

/// [`google_calendar_url`] with the system-local time zone, for production
/// callers.
pub fn google_calendar_url_local(poster: &Poster, today: NaiveDate) -> Option<String> {
    google_calendar_url(poster, today, &Local)
}

/// Build the export link for a poster, or `None` when no instance date
/// resolves (not an error: the UI simply omits the calendar section).
///
/// `tz` is the zone the poster's wall-clock times are interpreted in before
/// converting to the UTC timestamps Google expects; it is a parameter so the
/// output is deterministic under test.
pub fn google_calendar_url<Tz: TimeZone>(
    poster: &Poster,
    today: NaiveDate,
    tz: &Tz,
) -> Option<String> {
    let instance = instance_date(poster, today)?;

    let dates = match (poster.start_time, poster.end_time) {
        (Some(start), Some(end)) => {
            let start = to_google_timestamp(instance, start, tz)?;
            let end = to_google_timestamp(instance, end, tz)?;
            format!("{start}/{end}")
        }
        // All-day instance; Google treats the end date as exclusive
        _ => all_day_range(instance),
    };

    let details = match &poster.schedule {
        Schedule::Repeating { frequency, .. } => {
            let frequency = frequency.map_or("repeating", |f| f.as_str());
            format!("{}\n\n(Recurring: {})", poster.description, frequency)
        }
        Schedule::Single { .. } => poster.description.clone(),
    };
    let location = poster.location.join(", ");

    let mut url = Url::parse(RENDER_ENDPOINT).ok()?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("action", "TEMPLATE");
        query.append_pair("text", &poster.title);
        query.append_pair("dates", &dates);
        if !details.is_empty() {
            query.append_pair("details", &details);
        }
        if !location.is_empty() {
            query.append_pair("location", &location);
        }
    }

    Some(url.into())
}

/// The single concrete date representing the poster for export: its own
/// single date, else the recurrence anchor, else the next occurrence after
/// `today`.
fn instance_date(poster: &Poster, today: NaiveDate) -> Option<NaiveDate> {
    match &poster.schedule {
        Schedule::Single { date } => *date,
        Schedule::Repeating { anchor, .. } => {
            anchor.or_else(|| recurrence::next_occurrence(poster, today))
        }
    }
}

/// Local wall-clock date+time as a compact UTC timestamp (`YYYYMMDDTHHMMSSZ`).
/// A wall-clock time that does not exist in `tz` (DST gap) yields `None`.
fn to_google_timestamp<Tz: TimeZone>(
    date: NaiveDate,
    time: NaiveTime,
    tz: &Tz,
) -> Option<String> {
    let local = tz.from_local_datetime(&date.and_time(time)).earliest()?;
    Some(local.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string())
}

fn all_day_range(date: NaiveDate) -> String {
    let end = date.succ_opt().unwrap_or(date);
    format!("{}/{}", date.format("%Y%m%d"), end.format("%Y%m%d"))
}
