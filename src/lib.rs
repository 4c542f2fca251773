//! Podcast RSS 2.0 feed generation.
//!
//! Reads a declarative description of a podcast channel and its episodes,
//! validates it, discovers each published episode's media metadata (size,
//! type, duration, content identity) from the asset URL, and serializes a
//! player-compatible RSS document with the iTunes, Atom and Podcasting 2.0
//! namespaces.
//!
//! - [`config`] - loading the document from TOML or JSON
//! - [`podcast`] - field aliases, validation and the typed model
//! - [`asset`] - HEAD and media probing with retries
//! - [`feed`] - GUIDs, descriptions, scheduling and XML output
//! - [`util`] - shared helpers

pub mod asset;
pub mod config;
pub mod feed;
pub mod podcast;
pub mod util;
