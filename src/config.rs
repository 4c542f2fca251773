//! Loader for the podcast document (`podcast_config.toml` by default).
//!
//! The document is read into an untyped [`serde_json::Value`] tree so the
//! validator can report on exactly what the operator wrote (strings posing as
//! booleans, missing sections, wrong types) before anything is typed. TOML and
//! JSON are accepted; TOML date-times are flattened to their RFC 3339 text.
//!
//! An optional top-level `[generator]` table carries engine settings.
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::util::RetryPolicy;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read podcast config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in podcast config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON in podcast config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Podcast config too large: {0}")]
    TooLarge(String),

    #[error("Podcast config is empty: {0}")]
    Empty(String),

    #[error("Unsupported podcast config format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid [generator] settings: {0}")]
    Settings(String),
}

// ============================================================================
// Engine Settings
// ============================================================================

/// Engine knobs read from the optional `[generator]` table.
///
/// All fields use `#[serde(default)]`, so any subset can be given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Media inspection program, invoked with a flat stream report request.
    pub ffprobe_path: String,

    /// Per-request timeout for the HEAD probe, in seconds.
    pub request_timeout_secs: u64,

    /// Attempts per asset for both the HEAD probe and the media probe.
    pub max_attempts: u32,

    /// Delay before the first retry, in seconds.
    pub base_delay_secs: u64,

    /// Backoff factor applied after each failed attempt.
    pub backoff_multiplier: u32,

    /// Redirect hops followed before the HEAD probe gives up.
    pub max_redirects: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
            request_timeout_secs: 30,
            max_attempts: 5,
            base_delay_secs: 2,
            backoff_multiplier: 2,
            max_redirects: 10,
        }
    }
}

impl EngineSettings {
    /// Reads the `generator` table from a loaded document, defaulting when absent.
    pub fn from_document(document: &Value) -> Result<Self, ConfigError> {
        match document.get("generator") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(table) => serde_json::from_value(table.clone())
                .map_err(|e| ConfigError::Settings(e.to_string())),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.base_delay_secs),
            self.backoff_multiplier,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Document Loading
// ============================================================================

/// Maximum podcast document size (10 MB).
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["metadata", "episodes", "generator"];

const KNOWN_METADATA_KEYS: &[&str] = &[
    "title",
    "description",
    "link",
    "rss_feed_url",
    "language",
    "email",
    "itunes_email",
    "author",
    "itunes_author",
    "category",
    "itunes_category",
    "image",
    "itunes_image",
    "explicit",
    "itunes_explicit",
    "copyright",
    "podcast_locked",
    "podcast_guid",
    "use_asset_hash_as_guid",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(Format::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }
}

/// Loads a podcast document from disk.
///
/// - Missing file → `Err(ConfigError::Io)`
/// - Empty or whitespace-only file → `Err(ConfigError::Empty)`
/// - Oversized file → `Err(ConfigError::TooLarge)` without reading it
/// - Unknown keys → accepted, logged as warnings
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let format = Format::from_path(path)?;

    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_FILE_SIZE {
        return Err(ConfigError::TooLarge(format!(
            "{} is {} bytes (max {} bytes)",
            path.display(),
            meta.len(),
            MAX_FILE_SIZE
        )));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(ConfigError::Empty(path.display().to_string()));
    }

    let document = match format {
        Format::Toml => parse_toml(&content)?,
        Format::Json => parse_json(&content)?,
    };

    warn_unknown_keys(&document);
    tracing::info!(path = %path.display(), "Loaded podcast config");
    Ok(document)
}

/// Parses TOML text into the untyped document tree.
pub fn parse_toml(content: &str) -> Result<Value, ConfigError> {
    let table: toml::Table = content.parse()?;
    Ok(toml_to_json(toml::Value::Table(table)))
}

/// Parses JSON text into the untyped document tree.
pub fn parse_json(content: &str) -> Result<Value, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        // Dates stay textual so TOML and JSON input validate identically
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

fn warn_unknown_keys(document: &Value) {
    let Some(root) = document.as_object() else {
        return;
    };

    for key in root.keys() {
        if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Unknown top-level key in podcast config, ignoring");
        }
    }

    if let Some(metadata) = root.get("metadata").and_then(Value::as_object) {
        for key in metadata.keys() {
            if !KNOWN_METADATA_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Unknown metadata key in podcast config, ignoring");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
