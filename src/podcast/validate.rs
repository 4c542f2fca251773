//! Structural validation of a podcast document.
//!
//! Runs before any network activity and never short-circuits: every
//! violation is collected so the operator can fix them in one pass. Messages
//! carry the episode (and transcript) number they refer to, 1-based.
use serde_json::{Map, Value};
use std::fmt;

use super::date::is_valid_publication_date;
use super::fields::{self, Field};
use super::model::{parse_locked, EpisodeType};
use crate::util::{is_valid_email, is_valid_url};

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Violations that block generation, in discovery order.
    pub errors: Vec<String>,
    /// Non-fatal findings (entries that will be skipped at generation time).
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The `(ok, errors)` pair.
    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.errors.is_empty(), self.errors)
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("podcast config is valid");
        }
        writeln!(f, "podcast config has {} error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

/// Where a message points to.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Metadata,
    Episode(usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Metadata => f.write_str("Metadata"),
            Scope::Episode(n) => write!(f, "Episode {}", n),
        }
    }
}

/// Validates a loaded podcast document.
///
/// # Examples
///
/// ```
/// use podcast_rss_generator::podcast::validate;
/// use serde_json::json;
///
/// let report = validate(&json!({"episodes": []}));
/// assert!(!report.is_valid());
/// assert!(report.errors.contains(&"Missing required 'metadata' section".to_string()));
/// ```
pub fn validate(document: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(root) = document.as_object() else {
        report.error("Podcast config must be a mapping with 'metadata' and 'episodes' sections");
        return report;
    };

    match root.get("metadata") {
        None | Some(Value::Null) => report.error("Missing required 'metadata' section"),
        Some(Value::Object(metadata)) => validate_metadata(metadata, &mut report),
        Some(_) => report.error("'metadata' section must be a mapping"),
    }

    match root.get("episodes") {
        None | Some(Value::Null) => report.error("Missing required 'episodes' section"),
        Some(Value::Array(episodes)) if !episodes.is_empty() => {
            for (i, episode) in episodes.iter().enumerate() {
                validate_episode(i + 1, episode, &mut report);
            }
        }
        Some(_) => report.error("'episodes' must be a non-empty list"),
    }

    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Podcast config warning");
    }

    report
}

fn validate_metadata(map: &Map<String, Value>, report: &mut ValidationReport) {
    let scope = Scope::Metadata;

    for field in [
        fields::TITLE,
        fields::DESCRIPTION,
        fields::LINK,
        fields::FEED_URL,
        fields::LANGUAGE,
    ] {
        require_string(map, field, scope, report);
    }

    if let Some(email) = require_string(map, fields::EMAIL, scope, report) {
        if !is_valid_email(email) {
            report.error(format!("{}: Invalid email format: '{}'", scope, email));
        }
    }
    require_string(map, fields::AUTHOR, scope, report);

    optional_string(map, fields::CATEGORY, scope, report);
    optional_string(map, fields::COPYRIGHT, scope, report);
    optional_string(map, fields::FEED_GUID, scope, report);
    optional_string(map, fields::IMAGE, scope, report);

    for field in [fields::LINK, fields::FEED_URL, fields::IMAGE] {
        check_url(map, field, scope, report);
    }

    check_bool(map, fields::EXPLICIT, scope, report);
    check_bool(map, fields::USE_HASH_GUID, scope, report);
    if let Some((key, value)) = fields::LOCKED.lookup(map) {
        if parse_locked(value).is_none() {
            report.error(format!(
                "{}: field '{}' must be a boolean or \"yes\"/\"no\", got {}",
                scope, key, value
            ));
        }
    }
}

fn validate_episode(number: usize, episode: &Value, report: &mut ValidationReport) {
    let scope = Scope::Episode(number);

    let Some(map) = episode.as_object() else {
        report.error(format!("{} must be a mapping", scope));
        return;
    };

    require_string(map, fields::TITLE, scope, report);
    require_string(map, fields::DESCRIPTION, scope, report);

    if let Some(date) = require_string(map, fields::PUBLICATION_DATE, scope, report) {
        if !is_valid_publication_date(date) {
            report.error(format!(
                "{}: Invalid publication_date format: '{}'",
                scope, date
            ));
        }
    }

    if require_string(map, fields::ASSET_URL, scope, report).is_some() {
        check_url(map, fields::ASSET_URL, scope, report);
    }

    for field in [fields::EPISODE_NUMBER, fields::SEASON_NUMBER] {
        if let Some((key, value)) = field.lookup(map) {
            if !value.as_u64().is_some_and(|n| n > 0) {
                report.error(format!(
                    "{}: field '{}' must be a positive integer, got {}",
                    scope, key, value
                ));
            }
        }
    }

    if let Some((key, value)) = fields::EPISODE_TYPE.lookup(map) {
        let known = value
            .as_str()
            .is_some_and(|s| s.parse::<EpisodeType>().is_ok());
        if !known {
            let allowed: Vec<&str> = EpisodeType::ALL.iter().map(EpisodeType::as_str).collect();
            report.error(format!(
                "{}: field '{}' must be one of {}, got {}",
                scope,
                key,
                allowed.join(", "),
                value
            ));
        }
    }

    for field in [fields::LINK, fields::IMAGE] {
        optional_string(map, field, scope, report);
        check_url(map, field, scope, report);
    }
    check_bool(map, fields::EXPLICIT, scope, report);
    check_bool(map, fields::USE_HASH_GUID, scope, report);

    if let Some((key, value)) = fields::TRANSCRIPTS.lookup(map) {
        match value.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    validate_transcript(scope, i + 1, entry, report);
                }
            }
            None => report.error(format!("{}: field '{}' must be a list", scope, key)),
        }
    }
}

fn validate_transcript(scope: Scope, number: usize, entry: &Value, report: &mut ValidationReport) {
    let Some(map) = entry.as_object() else {
        report.error(format!("{}: Transcript {} must be a mapping", scope, number));
        return;
    };

    let url = fields::TRANSCRIPT_URL.get(map);
    let mime_type = fields::TRANSCRIPT_TYPE.get(map);

    if url.is_none() || mime_type.is_none() {
        report.warning(format!(
            "{}: Transcript {} is missing 'url' or 'type' and will be skipped",
            scope, number
        ));
    }

    if let Some(url) = url {
        match url.as_str() {
            Some(s) if is_valid_url(s) => {}
            Some(s) => report.error(format!(
                "{}: Transcript {} has invalid URL format: '{}'",
                scope, number, s
            )),
            None => report.error(format!(
                "{}: Transcript {} has invalid URL format: {}",
                scope, number, url
            )),
        }
    }

    for field in [
        fields::TRANSCRIPT_TYPE,
        fields::TRANSCRIPT_LANGUAGE,
        fields::TRANSCRIPT_REL,
    ] {
        if let Some((key, value)) = field.lookup(map) {
            if !value.as_str().is_some_and(|s| !s.trim().is_empty()) {
                report.error(format!(
                    "{}: Transcript {} field '{}' must be a non-empty string",
                    scope, number, key
                ));
            }
        }
    }
}

/// Requires a non-empty string, returning it when valid.
fn require_string<'a>(
    map: &'a Map<String, Value>,
    field: Field,
    scope: Scope,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    match field.lookup(map) {
        None => {
            report.error(format!("{}: missing required field {}", scope, field));
            None
        }
        Some((_, Value::String(s))) if !s.trim().is_empty() => Some(s.as_str()),
        Some((key, _)) => {
            report.error(format!(
                "{}: field '{}' must be a non-empty string",
                scope, key
            ));
            None
        }
    }
}

fn optional_string(map: &Map<String, Value>, field: Field, scope: Scope, report: &mut ValidationReport) {
    if let Some((key, value)) = field.lookup(map) {
        if !value.as_str().is_some_and(|s| !s.trim().is_empty()) {
            report.error(format!(
                "{}: field '{}' must be a non-empty string if present",
                scope, key
            ));
        }
    }
}

/// Checks URL shape when the field holds a string; type errors are reported elsewhere.
fn check_url(map: &Map<String, Value>, field: Field, scope: Scope, report: &mut ValidationReport) {
    if let Some((key, Value::String(url))) = field.lookup(map) {
        if !url.trim().is_empty() && !is_valid_url(url) {
            report.error(format!(
                "{}: Invalid URL format for '{}': '{}'",
                scope, key, url
            ));
        }
    }
}

fn check_bool(map: &Map<String, Value>, field: Field, scope: Scope, report: &mut ValidationReport) {
    if let Some((key, value)) = field.lookup(map) {
        if !value.is_boolean() {
            report.error(format!(
                "{}: field '{}' must be a boolean (true/false), got {}",
                scope, key, value
            ));
        }
    }
}
