//! Domain models for pubscope
//!
//! Publication records and per-article summaries, deserialized from the
//! bundled static JSON and from the summary boundary.

pub mod publication;
pub mod summary;

pub use publication::{Pmid, Publication};
pub use summary::{ArticleSummary, RAW_OUTPUT_SECTION};
