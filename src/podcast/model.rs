use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::date::parse_publication_date;
use super::fields::{self, Field};

pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Raised when a document that skipped validation cannot be typed.
///
/// The generator always validates first, so in practice these only surface
/// for callers building a [`Podcast`] directly.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Missing required '{0}' section")]
    MissingSection(&'static str),

    #[error("Missing required {scope} key: {field}")]
    MissingField { scope: String, field: String },

    #[error("Invalid {scope} field '{field}': {reason}")]
    InvalidField {
        scope: String,
        field: String,
        reason: String,
    },
}

/// `itunes:episodeType` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeType {
    Full,
    Trailer,
    Bonus,
}

impl EpisodeType {
    pub const ALL: [EpisodeType; 3] = [EpisodeType::Full, EpisodeType::Trailer, EpisodeType::Bonus];

    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeType::Full => "full",
            EpisodeType::Trailer => "trailer",
            EpisodeType::Bonus => "bonus",
        }
    }
}

impl fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EpisodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown episode type '{}'", s))
    }
}

/// Parses the `podcast_locked` value: a boolean or the literals "yes"/"no".
pub fn parse_locked(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("yes") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("no") => Some(false),
        _ => None,
    }
}

/// Channel-level metadata after alias resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: String,
    /// Markdown source; formatted once at serialization time.
    pub description: String,
    pub link: String,
    pub feed_url: String,
    pub language: String,
    pub email: String,
    pub author: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub explicit: bool,
    pub copyright: Option<String>,
    pub locked: bool,
    /// Pinned feed GUID, if the operator set one.
    pub guid: Option<String>,
    pub use_asset_hash_as_guid: bool,
}

/// A `podcast:transcript` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub url: String,
    pub mime_type: String,
    pub language: Option<String>,
    pub rel: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub publication_date: DateTime<FixedOffset>,
    pub asset_url: String,
    pub episode: Option<u64>,
    pub season: Option<u64>,
    pub episode_type: Option<EpisodeType>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub transcripts: Vec<Transcript>,
    pub explicit: Option<bool>,
    /// Per-episode override of [`Channel::use_asset_hash_as_guid`].
    pub use_asset_hash_as_guid: Option<bool>,
}

impl Episode {
    /// Whether this episode's GUID should come from the asset content hash.
    pub fn uses_hash_guid(&self, channel: &Channel) -> bool {
        self.use_asset_hash_as_guid
            .unwrap_or(channel.use_asset_hash_as_guid)
    }
}

/// The whole typed document: one channel and its episodes in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Podcast {
    pub channel: Channel,
    pub episodes: Vec<Episode>,
}

impl Podcast {
    /// Builds the typed model from a loaded document.
    ///
    /// Transcript entries lacking `url` or `type` are dropped with a warning
    /// rather than failing the build.
    pub fn from_document(document: &Value) -> Result<Self, ModelError> {
        let metadata = document
            .get("metadata")
            .and_then(Value::as_object)
            .ok_or(ModelError::MissingSection("metadata"))?;
        let episodes = document
            .get("episodes")
            .and_then(Value::as_array)
            .ok_or(ModelError::MissingSection("episodes"))?;

        let channel = Channel::from_map(metadata)?;
        let episodes = episodes
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let scope = format!("episode {}", i + 1);
                let map = value.as_object().ok_or_else(|| ModelError::InvalidField {
                    scope: scope.clone(),
                    field: "episodes".to_string(),
                    reason: "entry is not a mapping".to_string(),
                })?;
                Episode::from_map(map, &scope)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { channel, episodes })
    }
}

impl Channel {
    fn from_map(map: &Map<String, Value>) -> Result<Self, ModelError> {
        let scope = "metadata";

        let locked = match fields::LOCKED.get(map) {
            None => false,
            Some(value) => parse_locked(value).ok_or_else(|| ModelError::InvalidField {
                scope: scope.to_string(),
                field: fields::LOCKED.name().to_string(),
                reason: format!("expected a boolean or \"yes\"/\"no\", got {}", value),
            })?,
        };

        Ok(Self {
            title: required_str(map, fields::TITLE, scope)?,
            description: required_str(map, fields::DESCRIPTION, scope)?,
            link: required_str(map, fields::LINK, scope)?,
            feed_url: required_str(map, fields::FEED_URL, scope)?,
            language: optional_str(map, fields::LANGUAGE)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            email: required_str(map, fields::EMAIL, scope)?,
            author: required_str(map, fields::AUTHOR, scope)?,
            category: optional_str(map, fields::CATEGORY),
            image: optional_str(map, fields::IMAGE),
            explicit: fields::EXPLICIT.get_bool(map).unwrap_or(false),
            copyright: optional_str(map, fields::COPYRIGHT),
            locked,
            guid: optional_str(map, fields::FEED_GUID),
            use_asset_hash_as_guid: fields::USE_HASH_GUID.get_bool(map).unwrap_or(false),
        })
    }
}

impl Episode {
    fn from_map(map: &Map<String, Value>, scope: &str) -> Result<Self, ModelError> {
        let raw_date = required_str(map, fields::PUBLICATION_DATE, scope)?;
        let publication_date =
            parse_publication_date(&raw_date).ok_or_else(|| ModelError::InvalidField {
                scope: scope.to_string(),
                field: fields::PUBLICATION_DATE.name().to_string(),
                reason: format!("unparseable date '{}'", raw_date),
            })?;

        let episode_type = match fields::EPISODE_TYPE.get_str(map) {
            None => None,
            Some(raw) => Some(raw.parse::<EpisodeType>().map_err(|reason| ModelError::InvalidField {
                scope: scope.to_string(),
                field: fields::EPISODE_TYPE.name().to_string(),
                reason,
            })?),
        };

        let title = required_str(map, fields::TITLE, scope)?;
        let transcripts = transcripts_from(map, &title);

        Ok(Self {
            title,
            description: required_str(map, fields::DESCRIPTION, scope)?,
            publication_date,
            asset_url: required_str(map, fields::ASSET_URL, scope)?,
            episode: fields::EPISODE_NUMBER.get(map).and_then(Value::as_u64),
            season: fields::SEASON_NUMBER.get(map).and_then(Value::as_u64),
            episode_type,
            link: optional_str(map, fields::LINK),
            image: optional_str(map, fields::IMAGE),
            transcripts,
            explicit: fields::EXPLICIT.get_bool(map),
            use_asset_hash_as_guid: fields::USE_HASH_GUID.get_bool(map),
        })
    }
}

fn transcripts_from(map: &Map<String, Value>, episode_title: &str) -> Vec<Transcript> {
    let Some(entries) = fields::TRANSCRIPTS.get(map).and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let parsed = entry.as_object().and_then(|t| {
                Some(Transcript {
                    url: fields::TRANSCRIPT_URL.get_str(t)?.to_string(),
                    mime_type: fields::TRANSCRIPT_TYPE.get_str(t)?.to_string(),
                    language: optional_str(t, fields::TRANSCRIPT_LANGUAGE),
                    rel: optional_str(t, fields::TRANSCRIPT_REL),
                })
            });
            if parsed.is_none() {
                tracing::warn!(
                    episode = %episode_title,
                    transcript = i + 1,
                    entry = %entry,
                    "Skipping invalid transcript entry (missing url or type)"
                );
            }
            parsed
        })
        .collect()
}

fn required_str(map: &Map<String, Value>, field: Field, scope: &str) -> Result<String, ModelError> {
    field
        .get_str(map)
        .map(str::to_string)
        .ok_or_else(|| ModelError::MissingField {
            scope: scope.to_string(),
            field: field.to_string(),
        })
}

fn optional_str(map: &Map<String, Value>, field: Field) -> Option<String> {
    field
        .get_str(map)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "metadata": {
                "title": "Test Podcast",
                "description": "A podcast about technology & programming.",
                "link": "https://example.com",
                "rss_feed_url": "https://example.com/feed.xml",
                "email": "test@example.com",
                "author": "Test Author",
                "category": "Technology",
                "image": "https://example.com/art.png",
                "explicit": true,
                "podcast_locked": "yes"
            },
            "episodes": [
                {
                    "title": "Episode 1",
                    "description": "Introduction to the podcast.",
                    "publication_date": "2023-01-15T10:00:00Z",
                    "asset_url": "https://example.com/episode1.mp3",
                    "episode": 1,
                    "season": 2,
                    "episode_type": "trailer",
                    "itunes_image": "https://example.com/ep1.png",
                    "transcripts": [
                        {"url": "https://example.com/ep1.vtt", "type": "text/vtt", "language": "en"},
                        {"url": "https://example.com/ep1.srt"}
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_channel_from_modern_keys() {
        let podcast = Podcast::from_document(&document()).unwrap();
        let channel = &podcast.channel;
        assert_eq!(channel.title, "Test Podcast");
        assert_eq!(channel.language, DEFAULT_LANGUAGE);
        assert_eq!(channel.email, "test@example.com");
        assert_eq!(channel.category.as_deref(), Some("Technology"));
        assert!(channel.explicit);
        assert!(channel.locked);
        assert!(channel.guid.is_none());
        assert!(!channel.use_asset_hash_as_guid);
    }

    #[test]
    fn test_channel_from_legacy_keys() {
        let mut doc = document();
        let metadata = doc["metadata"].as_object_mut().unwrap();
        let email = metadata.remove("email").unwrap();
        let author = metadata.remove("author").unwrap();
        let explicit = metadata.remove("explicit").unwrap();
        metadata.insert("itunes_email".into(), email);
        metadata.insert("itunes_author".into(), author);
        metadata.insert("itunes_explicit".into(), explicit);

        let channel = Podcast::from_document(&doc).unwrap().channel;
        assert_eq!(channel.email, "test@example.com");
        assert_eq!(channel.author, "Test Author");
        assert!(channel.explicit);
    }

    #[test]
    fn test_missing_required_legacy_field_names_both() {
        let mut doc = document();
        doc["metadata"].as_object_mut().unwrap().remove("email");

        let err = Podcast::from_document(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required metadata key: 'email' (or legacy 'itunes_email')"
        );
    }

    #[test]
    fn test_episode_fields() {
        let podcast = Podcast::from_document(&document()).unwrap();
        let episode = &podcast.episodes[0];
        assert_eq!(episode.episode, Some(1));
        assert_eq!(episode.season, Some(2));
        assert_eq!(episode.episode_type, Some(EpisodeType::Trailer));
        assert_eq!(episode.image.as_deref(), Some("https://example.com/ep1.png"));
        assert_eq!(episode.link, None);
        assert_eq!(episode.explicit, None);
    }

    #[test]
    fn test_transcript_missing_type_is_dropped() {
        let podcast = Podcast::from_document(&document()).unwrap();
        let transcripts = &podcast.episodes[0].transcripts;
        assert_eq!(transcripts.len(), 1);
        assert_eq!(
            transcripts[0],
            Transcript {
                url: "https://example.com/ep1.vtt".to_string(),
                mime_type: "text/vtt".to_string(),
                language: Some("en".to_string()),
                rel: None,
            }
        );
    }

    #[test]
    fn test_hash_guid_toggle_inherits_from_channel() {
        let mut doc = document();
        doc["metadata"]["use_asset_hash_as_guid"] = json!(true);
        let podcast = Podcast::from_document(&doc).unwrap();
        assert!(podcast.episodes[0].uses_hash_guid(&podcast.channel));

        doc["episodes"][0]["use_asset_hash_as_guid"] = json!(false);
        let podcast = Podcast::from_document(&doc).unwrap();
        assert!(!podcast.episodes[0].uses_hash_guid(&podcast.channel));
    }

    #[test]
    fn test_parse_locked_values() {
        assert_eq!(parse_locked(&json!(true)), Some(true));
        assert_eq!(parse_locked(&json!("no")), Some(false));
        assert_eq!(parse_locked(&json!("YES")), Some(true));
        assert_eq!(parse_locked(&json!("true")), None);
        assert_eq!(parse_locked(&json!(1)), None);
    }

    #[test]
    fn test_episode_type_round_trip_names() {
        for t in EpisodeType::ALL {
            assert_eq!(t.as_str().parse::<EpisodeType>().unwrap(), t);
        }
        assert!("special".parse::<EpisodeType>().is_err());
    }

    #[test]
    fn test_missing_sections() {
        let err = Podcast::from_document(&json!({"episodes": []})).unwrap_err();
        assert!(matches!(err, ModelError::MissingSection("metadata")));
    }
}
