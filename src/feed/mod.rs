//! Feed assembly: turns a validated podcast document into RSS 2.0 bytes.
//!
//! - **GUIDs**: per-episode identity (asset URL or content hash) and the
//!   URL-derived `podcast:guid`
//! - **Descriptions**: markdown to a `<![CDATA[...]]>` HTML fragment, with a
//!   byte ceiling on the channel description
//! - **Scheduling**: episodes dated in the future are left out
//! - **Writing**: namespaced XML via `quick-xml`
//!
//! # Architecture
//!
//! - [`FeedGenerator`] - validation, scheduling, asset resolution and
//!   serialization wired into one sequential pipeline
//! - [`write_feed`] - pure serializer over already-resolved items
//!
//! # Example
//!
//! ```ignore
//! use podcast_rss_generator::config::{load_document, EngineSettings};
//! use podcast_rss_generator::feed::{FeedGenerator, GenerateOptions};
//!
//! let document = load_document(Path::new("podcast_config.toml"))?;
//! let settings = EngineSettings::from_document(&document)?;
//! let generator = FeedGenerator::from_settings(&settings)?;
//! let feed = generator
//!     .generate_to_path(&document, Path::new("podcast_feed.xml"), GenerateOptions::default())
//!     .await?;
//! ```

mod description;
mod generator;
mod guid;
mod schedule;
mod writer;

pub use description::{format_channel_description, format_description, CHANNEL_DESCRIPTION_LIMIT};
pub use generator::{FeedGenerator, GenerateError, GenerateOptions, GeneratedFeed};
pub use guid::{episode_guid, feed_guid, resolve_feed_guid};
pub use schedule::{is_eligible, Clock, FixedClock, SystemClock};
pub use writer::{write_feed, FeedError, FeedItem, ATOM_NS, GENERATOR, ITUNES_NS, PODCAST_NS};
