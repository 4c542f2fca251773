//! The podcast document: field names, validation and the typed model.
//!
//! - **Fields**: modern key names and the legacy `itunes_*` aliases they replace
//! - **Validation**: collects every structural violation before any network work
//! - **Model**: typed [`Channel`] / [`Episode`] built from a validated document
//! - **Dates**: lenient `publication_date` parsing and RFC 2822 rendering
//!
//! # Example
//!
//! ```
//! use podcast_rss_generator::podcast::{validate, Podcast};
//! use serde_json::json;
//!
//! let document = json!({
//!     "metadata": {
//!         "title": "Test Podcast",
//!         "description": "Test description",
//!         "link": "https://example.com",
//!         "rss_feed_url": "https://example.com/feed.xml",
//!         "language": "en-us",
//!         "email": "test@example.com",
//!         "author": "Test Author"
//!     },
//!     "episodes": [{
//!         "title": "Episode 1",
//!         "description": "Test episode",
//!         "publication_date": "2023-01-15T10:00:00Z",
//!         "asset_url": "https://example.com/episode1.mp3"
//!     }]
//! });
//!
//! assert!(validate(&document).is_valid());
//! let podcast = Podcast::from_document(&document).unwrap();
//! assert_eq!(podcast.episodes.len(), 1);
//! ```

mod date;
pub mod fields;
mod model;
mod validate;

pub use date::{format_rfc2822, is_valid_publication_date, parse_publication_date, to_utc};
pub use model::{
    parse_locked, Channel, Episode, EpisodeType, ModelError, Podcast, Transcript, DEFAULT_LANGUAGE,
};
pub use validate::{validate, ValidationReport};
