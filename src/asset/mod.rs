//! Asset metadata resolution.
//!
//! For one episode, discovers what the feed's `<enclosure>` and
//! `<itunes:duration>` need from the remote media file:
//!
//! - [`http`] - redirect-following HEAD probe for size, type and identity headers
//! - [`probe`] - external media inspection for stream duration
//! - [`identity`] - content-identity hint extraction from response headers
//! - [`resolver`] - retry orchestration over both probes
//!
//! Both I/O seams are traits so tests can substitute canned responses.

mod http;
mod identity;
mod probe;
mod resolver;

pub use http::{AssetTransport, HeadResponse, ReqwestTransport, TransportError};
pub use identity::ContentHash;
pub use probe::{parse_duration, FfprobeProber, MediaProber, ProbeError};
pub use resolver::AssetResolver;

/// Fallback MIME type when none is known.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Fallback enclosure length when none is known.
pub const FALLBACK_CONTENT_LENGTH: &str = "0";

/// Resolved metadata for one asset. Computed fresh per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub content_length: String,
    pub content_type: String,
    /// Whole seconds; `None` when the media probe could not measure it.
    pub duration: Option<u64>,
    pub content_hash: Option<ContentHash>,
}

impl AssetInfo {
    /// Stand-in used when asset verification is skipped.
    pub fn placeholder() -> Self {
        Self {
            content_length: FALLBACK_CONTENT_LENGTH.to_string(),
            content_type: FALLBACK_CONTENT_TYPE.to_string(),
            duration: None,
            content_hash: None,
        }
    }
}
