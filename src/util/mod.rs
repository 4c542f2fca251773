//! Utility functions shared across the engine.
//!
//! - **URL/email checks**: shape validation for config fields
//! - **Retry**: one backoff policy reused by the HTTP and media probes
//! - **Text**: UTF-8 safe byte truncation and dangling-tag trimming
//! - **Files**: atomic write-and-rename for the emitted feed
//!
//! # Examples
//!
//! ```
//! use podcast_rss_generator::util::{is_valid_url, truncate_to_bytes};
//!
//! assert!(is_valid_url("https://example.com/feed.xml"));
//! assert_eq!(truncate_to_bytes("Hello World", 5), "Hello");
//! ```

mod fs;
mod retry;
mod text;
mod url_validator;

pub use fs::atomic_write;
pub use retry::RetryPolicy;
pub use text::{strip_unterminated_tag, truncate_to_bytes};
pub use url_validator::{is_valid_email, is_valid_url, validate_url, UrlValidationError};
