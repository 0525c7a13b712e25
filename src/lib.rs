//! Core feed logic for the campus poster board.
//!
//! This crate holds the part of the board with real semantics:
//! - `poster`: the normalized event record (`Poster`) and its schedule
//! - `ingest`: turning raw document-store snapshots into `Poster`s
//! - `recurrence`: deciding when a repeating poster occurs
//! - `calendar_link`: Google Calendar export links
//! - `feed`: the filter pipeline and chronological ordering
//!
//! Everything here is pure and synchronous: the calling layer owns the
//! current collection and criteria, re-runs the pipeline on every change,
//! and passes "today" in explicitly so results are deterministic.

pub mod calendar_link;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod poster;
pub mod recurrence;

// Re-export the public surface at crate root for convenience
pub use calendar_link::{google_calendar_url, google_calendar_url_local};
pub use error::{IngestError, IngestResult};
pub use feed::{sort_posters, visible_posters, FeedFilter};
pub use ingest::{poster_from_document, posters_from_snapshot, tag_catalog};
pub use poster::*;
pub use recurrence::{next_occurrence, occurs_on};
