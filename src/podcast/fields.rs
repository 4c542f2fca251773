use serde_json::{Map, Value};
use std::fmt;

/// A config field together with the legacy names it used to be written under.
///
/// Candidates are tried in order; the first key whose value is present and
/// not `null` wins. The modern name is always first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    keys: &'static [&'static str],
}

impl Field {
    pub const fn new(keys: &'static [&'static str]) -> Self {
        Self { keys }
    }

    /// The modern key name.
    pub fn name(&self) -> &'static str {
        self.keys.first().copied().unwrap_or("")
    }

    /// Looks the field up, returning the key that matched and its value.
    pub fn lookup<'a>(&self, map: &'a Map<String, Value>) -> Option<(&'static str, &'a Value)> {
        self.keys.iter().find_map(|key| match map.get(*key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((*key, value)),
        })
    }

    pub fn get<'a>(&self, map: &'a Map<String, Value>) -> Option<&'a Value> {
        self.lookup(map).map(|(_, value)| value)
    }

    pub fn get_str<'a>(&self, map: &'a Map<String, Value>) -> Option<&'a str> {
        self.get(map).and_then(Value::as_str)
    }

    pub fn get_bool(&self, map: &Map<String, Value>) -> Option<bool> {
        self.get(map).and_then(Value::as_bool)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.name())?;
        let legacy = self.keys.get(1..).unwrap_or(&[]);
        if !legacy.is_empty() {
            let names: Vec<String> = legacy.iter().map(|k| format!("'{}'", k)).collect();
            write!(f, " (or legacy {})", names.join(", "))?;
        }
        Ok(())
    }
}

// Channel-level fields
pub const TITLE: Field = Field::new(&["title"]);
pub const DESCRIPTION: Field = Field::new(&["description"]);
pub const LINK: Field = Field::new(&["link"]);
pub const FEED_URL: Field = Field::new(&["rss_feed_url"]);
pub const LANGUAGE: Field = Field::new(&["language"]);
pub const EMAIL: Field = Field::new(&["email", "itunes_email"]);
pub const AUTHOR: Field = Field::new(&["author", "itunes_author"]);
pub const CATEGORY: Field = Field::new(&["category", "itunes_category"]);
pub const IMAGE: Field = Field::new(&["image", "itunes_image"]);
pub const EXPLICIT: Field = Field::new(&["explicit", "itunes_explicit"]);
pub const COPYRIGHT: Field = Field::new(&["copyright"]);
pub const LOCKED: Field = Field::new(&["podcast_locked"]);
pub const FEED_GUID: Field = Field::new(&["podcast_guid"]);
pub const USE_HASH_GUID: Field = Field::new(&["use_asset_hash_as_guid"]);

// Episode-level fields (title, description, link, image, explicit and the
// hash toggle share the channel definitions above)
pub const PUBLICATION_DATE: Field = Field::new(&["publication_date"]);
pub const ASSET_URL: Field = Field::new(&["asset_url"]);
pub const EPISODE_NUMBER: Field = Field::new(&["episode"]);
pub const SEASON_NUMBER: Field = Field::new(&["season"]);
pub const EPISODE_TYPE: Field = Field::new(&["episode_type"]);
pub const TRANSCRIPTS: Field = Field::new(&["transcripts"]);

// Transcript entry fields
pub const TRANSCRIPT_URL: Field = Field::new(&["url"]);
pub const TRANSCRIPT_TYPE: Field = Field::new(&["type"]);
pub const TRANSCRIPT_LANGUAGE: Field = Field::new(&["language"]);
pub const TRANSCRIPT_REL: Field = Field::new(&["rel"]);
