//! pubscope-core: data and view engine for the pubscope publications dashboard
//!
//! This library provides:
//! - The publication and article-summary data model
//! - Filtering and stable multi-field sorting of the publications table
//! - The data view (committed criteria, sort, selection) and the search panel
//! - Tag search-bar parsing
//! - Subject tree and timeline grouping for the presentation components
//! - Section normalization and the summarization prompt
//! - Static data loading and configuration

pub mod config;
pub mod date;
pub mod domain;
pub mod error;
pub mod filter;
pub mod layout;
pub mod panel;
pub mod query;
pub mod sections;
pub mod sort;
pub mod store;
pub mod summaries;
pub mod timeline;
pub mod tree;
pub mod view;

// Re-export main types for convenience
pub use config::{DataConfig, PubscopeConfig, SummaryEndpointConfig, ViewConfig};
pub use date::parse_calendar_day;
pub use domain::{ArticleSummary, Pmid, Publication, RAW_OUTPUT_SECTION};
pub use error::{ConfigError, DataError};
pub use filter::{filter_publications, FilterCriteria, TagLogic};
pub use layout::{Edge, IndentedLayout, LayoutResult, PositionedNode, TreeLayout};
pub use panel::{FilterPanel, PanelKey};
pub use query::{format_search_query, parse_search_query};
pub use sections::{build_prompt, normalize_sections};
pub use sort::{natural_cmp, sort_publications, SortDirection, SortField, SortKey};
pub use store::Dataset;
pub use summaries::{SummaryIndex, SummaryKey};
pub use timeline::{Timeline, YearBucket};
pub use tree::{NodeId, SubjectNode, SubjectTree};
pub use view::{DataView, SelectionListener, ViewSnapshot};
