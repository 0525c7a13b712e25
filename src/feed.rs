//! The event feed pipeline: filtering and ordering of poster collections.
//!
//! The pipeline is re-run in full whenever the collection or any criterion
//! changes. It never mutates its input; each run produces a fresh derived
//! collection for the rendering layer.

use chrono::NaiveDate;
use tracing::debug;

use crate::poster::{Poster, Schedule};
use crate::recurrence;

/// Filter criteria for one feed render. Empty criteria are pass-through;
/// `category` additionally treats the literal "All" as pass-through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    /// Show only posters active on this exact date (suppresses the default
    /// past-event exclusion).
    pub date: Option<NaiveDate>,
    /// Keep posters whose location set intersects (case-insensitive).
    pub locations: Vec<String>,
    /// Keep posters whose tag set intersects (case-insensitive).
    pub tags: Vec<String>,
    /// Case-insensitive substring over title and description.
    pub search: String,
    /// Keep posters whose category set contains this value exactly.
    pub category: String,
}

/// Reduce a collection to the posters a user should see, ordered
/// chronologically. Stages apply in a fixed order; `today` is the reference
/// date for default past-event exclusion.
pub fn visible_posters(posters: &[Poster], filter: &FeedFilter, today: NaiveDate) -> Vec<Poster> {
    let mut current: Vec<&Poster> = posters.iter().collect();

    // Exclude past events unless an explicit date was requested
    if filter.date.is_none() {
        current.retain(|poster| has_future_instance(poster, today));
    }

    if !filter.category.is_empty() && filter.category != "All" {
        current.retain(|poster| poster.category.iter().any(|c| c == &filter.category));
    }

    if let Some(date) = filter.date {
        current.retain(|poster| active_on(poster, date));
    }

    if !filter.search.is_empty() {
        let needle = filter.search.to_lowercase();
        current.retain(|poster| {
            poster.title.to_lowercase().contains(&needle)
                || poster.description.to_lowercase().contains(&needle)
        });
    }

    if !filter.locations.is_empty() {
        current.retain(|poster| intersects_ci(&poster.location, &filter.locations));
    }

    if !filter.tags.is_empty() {
        current.retain(|poster| intersects_ci(&poster.tags, &filter.tags));
    }

    debug!(
        total = posters.len(),
        visible = current.len(),
        "feed pipeline run"
    );

    let mut visible: Vec<Poster> = current.into_iter().cloned().collect();
    sort_posters(&mut visible);
    visible
}

/// Stable chronological ordering: effective date ascending, then creation
/// timestamp ascending to break ties. Posters with no parseable effective
/// date sort as the earliest possible date rather than erroring.
pub fn sort_posters(posters: &mut [Poster]) {
    posters.sort_by_key(|poster| {
        (
            poster.effective_date().unwrap_or(NaiveDate::MIN),
            poster.created_at,
        )
    });
}

/// Whether the poster still has a visible instance on or after `today`.
fn has_future_instance(poster: &Poster, today: NaiveDate) -> bool {
    match &poster.schedule {
        Schedule::Repeating { .. } => recurrence::next_occurrence(poster, today).is_some(),
        Schedule::Single { date } => date.is_some_and(|d| d >= today),
    }
}

/// Whether the poster is active on an explicitly requested date.
fn active_on(poster: &Poster, date: NaiveDate) -> bool {
    match &poster.schedule {
        Schedule::Repeating { .. } => recurrence::occurs_on(poster, date),
        Schedule::Single { date: single } => *single == Some(date),
    }
}

fn intersects_ci(have: &[String], wanted: &[String]) -> bool {
    wanted.iter().any(|w| {
        let w = w.to_lowercase();
        have.iter().any(|h| h.to_lowercase() == w)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poster::Frequency;
    use chrono::{DateTime, TimeZone, Utc, Weekday};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn poster(id: &str, schedule: Schedule) -> Poster {
        Poster {
            id: id.to_string(),
            title: format!("Poster {id}"),
            description: String::new(),
            location: vec![],
            category: vec![],
            tags: vec![],
            organizer: None,
            uploaded_by: None,
            schedule,
            start_time: None,
            end_time: None,
            sort_date: None,
            created_at: DateTime::UNIX_EPOCH,
            image_url: None,
        }
    }

    fn single(id: &str, date: NaiveDate) -> Poster {
        poster(id, Schedule::Single { date: Some(date) })
    }

    fn ids(posters: &[Poster]) -> Vec<&str> {
        posters.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_view_drops_past_events() {
        let today = ymd(2024, 6, 1);
        let posters = vec![
            single("past", ymd(2024, 5, 31)),
            single("today", today),
            single("future", ymd(2024, 6, 10)),
        ];

        let visible = visible_posters(&posters, &FeedFilter::default(), today);
        assert_eq!(ids(&visible), vec!["today", "future"]);
    }

    #[test]
    fn test_default_view_drops_repeating_with_no_future_instance() {
        let today = ymd(2024, 6, 1);
        let dead = poster(
            "dead",
            Schedule::Repeating {
                anchor: Some(ymd(2024, 1, 1)),
                frequency: None, // unknown frequency: never occurs
                days_of_week: vec![],
            },
        );
        let alive = poster(
            "alive",
            Schedule::Repeating {
                anchor: Some(ymd(2024, 1, 1)),
                frequency: Some(Frequency::Weekly),
                days_of_week: vec![Weekday::Mon],
            },
        );

        let visible = visible_posters(&[dead, alive], &FeedFilter::default(), today);
        assert_eq!(ids(&visible), vec!["alive"]);
    }

    #[test]
    fn test_default_view_drops_single_poster_with_unparseable_date() {
        let today = ymd(2024, 6, 1);
        let broken = poster("broken", Schedule::Single { date: None });
        let visible = visible_posters(&[broken], &FeedFilter::default(), today);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_explicit_date_includes_past_events() {
        let today = ymd(2024, 6, 1);
        let posters = vec![
            single("match", ymd(2020, 5, 5)),
            single("other", ymd(2020, 5, 6)),
        ];
        let filter = FeedFilter {
            date: Some(ymd(2020, 5, 5)),
            ..FeedFilter::default()
        };

        let visible = visible_posters(&posters, &filter, today);
        assert_eq!(
            ids(&visible),
            vec!["match"],
            "pastness relative to today must not matter for an explicit date"
        );
    }

    #[test]
    fn test_explicit_date_matches_repeating_occurrences() {
        let today = ymd(2024, 6, 1);
        let weekly = poster(
            "weekly",
            Schedule::Repeating {
                anchor: Some(ymd(2024, 1, 1)),
                frequency: Some(Frequency::Weekly),
                days_of_week: vec![Weekday::Mon],
            },
        );
        let filter = FeedFilter {
            date: Some(ymd(2024, 1, 8)),
            ..FeedFilter::default()
        };
        assert_eq!(ids(&visible_posters(&[weekly.clone()], &filter, today)), vec!["weekly"]);

        let miss = FeedFilter {
            date: Some(ymd(2024, 1, 9)),
            ..FeedFilter::default()
        };
        assert!(visible_posters(&[weekly], &miss, today).is_empty());
    }

    #[test]
    fn test_category_all_passes_everything() {
        let today = ymd(2024, 6, 1);
        let mut a = single("a", ymd(2024, 6, 2));
        a.category = vec!["Music".to_string()];
        let b = single("b", ymd(2024, 6, 3));

        let all = FeedFilter {
            category: "All".to_string(),
            ..FeedFilter::default()
        };
        assert_eq!(ids(&visible_posters(&[a.clone(), b.clone()], &all, today)).len(), 2);

        let music = FeedFilter {
            category: "Music".to_string(),
            ..FeedFilter::default()
        };
        assert_eq!(ids(&visible_posters(&[a, b], &music, today)), vec!["a"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_description() {
        let today = ymd(2024, 6, 1);
        let mut a = single("a", ymd(2024, 6, 2));
        a.title = "Jazz Night".to_string();
        let mut b = single("b", ymd(2024, 6, 3));
        b.description = "free jazz for everyone".to_string();
        let c = single("c", ymd(2024, 6, 4));

        let filter = FeedFilter {
            search: "JAZZ".to_string(),
            ..FeedFilter::default()
        };
        assert_eq!(ids(&visible_posters(&[a, b, c], &filter, today)), vec!["a", "b"]);
    }

    #[test]
    fn test_location_and_tag_intersection_case_insensitive() {
        let today = ymd(2024, 6, 1);
        let mut a = single("a", ymd(2024, 6, 2));
        a.location = vec!["Main Hall".to_string()];
        a.tags = vec!["Free-Food".to_string()];
        let mut b = single("b", ymd(2024, 6, 3));
        b.location = vec!["Library".to_string()];
        b.tags = vec!["study".to_string()];

        let by_location = FeedFilter {
            locations: vec!["main hall".to_string()],
            ..FeedFilter::default()
        };
        assert_eq!(
            ids(&visible_posters(&[a.clone(), b.clone()], &by_location, today)),
            vec!["a"]
        );

        let by_tag = FeedFilter {
            tags: vec!["FREE-FOOD".to_string()],
            ..FeedFilter::default()
        };
        assert_eq!(ids(&visible_posters(&[a, b], &by_tag, today)), vec!["a"]);
    }

    #[test]
    fn test_sort_by_effective_date_then_created_at() {
        let mut early = single("early", ymd(2024, 6, 2));
        early.created_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut tie_older = single("tie_older", ymd(2024, 6, 5));
        tie_older.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut tie_newer = single("tie_newer", ymd(2024, 6, 5));
        tie_newer.created_at = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();

        let mut posters = vec![tie_newer, early, tie_older];
        sort_posters(&mut posters);
        assert_eq!(ids(&posters), vec!["early", "tie_older", "tie_newer"]);
    }

    #[test]
    fn test_sort_date_override_and_missing_date_sentinel() {
        let mut overridden = single("overridden", ymd(2024, 6, 10));
        overridden.sort_date = Some(ymd(2024, 6, 1));
        let plain = single("plain", ymd(2024, 6, 5));
        let dateless = poster("dateless", Schedule::Single { date: None });

        let mut posters = vec![plain, overridden, dateless];
        sort_posters(&mut posters);
        assert_eq!(
            ids(&posters),
            vec!["dateless", "overridden", "plain"],
            "missing dates sort earliest; sort_date beats the event date"
        );
    }

    #[test]
    fn test_input_collection_is_not_mutated() {
        let today = ymd(2024, 6, 1);
        let posters = vec![single("b", ymd(2024, 6, 9)), single("a", ymd(2024, 6, 2))];
        let before = posters.clone();

        let visible = visible_posters(&posters, &FeedFilter::default(), today);
        assert_eq!(posters, before);
        assert_eq!(ids(&visible), vec!["a", "b"], "output is sorted, input is not");
    }
}
