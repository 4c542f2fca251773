use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use thiserror::Error;

use super::description::{format_channel_description, format_description};
use crate::asset::AssetInfo;
use crate::podcast::{format_rfc2822, Channel, Episode};

pub const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const PODCAST_NS: &str = "https://podcastindex.org/namespace/1.0";

/// Value of the channel `<generator>` element.
pub const GENERATOR: &str =
    "Podcast RSS Generator (https://github.com/vpetersson/podcast-rss-generator)";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to write feed XML: {0}")]
    Xml(String),
}

/// One eligible episode with everything resolved for serialization.
#[derive(Debug, Clone)]
pub struct FeedItem<'a> {
    pub episode: &'a Episode,
    pub asset: AssetInfo,
    pub guid: String,
}

/// Serializes a channel and its items into a complete RSS 2.0 document.
///
/// Pure: identical input yields byte-identical output. Items are written in
/// the order given.
pub fn write_feed(
    channel: &Channel,
    feed_guid: &str,
    items: &[FeedItem<'_>],
) -> Result<Vec<u8>, FeedError> {
    let mut w = FeedWriter::new();

    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.start(
        "rss",
        &[
            ("version", "2.0"),
            ("xmlns:itunes", ITUNES_NS),
            ("xmlns:atom", ATOM_NS),
            ("xmlns:podcast", PODCAST_NS),
        ],
    )?;
    w.start("channel", &[])?;

    write_channel_header(&mut w, channel, feed_guid)?;
    for item in items {
        write_item(&mut w, channel, item)?;
    }

    w.end("channel")?;
    w.end("rss")?;

    let mut bytes = w.into_bytes();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_channel_header(
    w: &mut FeedWriter,
    channel: &Channel,
    feed_guid: &str,
) -> Result<(), FeedError> {
    w.text("title", &channel.title)?;
    w.wrapped("description", &format_channel_description(&channel.description))?;
    w.text("language", &channel.language)?;
    w.text("link", &channel.link)?;
    w.text("generator", GENERATOR)?;
    w.empty(
        "atom:link",
        &[
            ("href", channel.feed_url.as_str()),
            ("rel", "self"),
            ("type", "application/rss+xml"),
        ],
    )?;
    w.text("itunes:explicit", yes_no(channel.explicit))?;

    w.start("itunes:owner", &[])?;
    w.text("itunes:email", &channel.email)?;
    w.end("itunes:owner")?;

    w.text("itunes:author", &channel.author)?;
    w.text("itunes:summary", &channel.description)?;

    if let Some(category) = &channel.category {
        w.empty("itunes:category", &[("text", category.as_str())])?;
    }
    if let Some(image) = &channel.image {
        w.empty("itunes:image", &[("href", image.as_str())])?;
    }
    if let Some(copyright) = &channel.copyright {
        w.text("copyright", copyright)?;
    }

    w.text_with(
        "podcast:locked",
        &[("owner", channel.email.as_str())],
        yes_no(channel.locked),
    )?;
    w.text("podcast:guid", feed_guid)?;
    Ok(())
}

fn write_item(w: &mut FeedWriter, channel: &Channel, item: &FeedItem<'_>) -> Result<(), FeedError> {
    let episode = item.episode;

    w.start("item", &[])?;
    w.text("pubDate", &format_rfc2822(&episode.publication_date))?;
    w.text("title", &episode.title)?;
    w.wrapped("description", &format_description(&episode.description))?;
    w.text("guid", &item.guid)?;
    w.empty(
        "enclosure",
        &[
            ("url", episode.asset_url.as_str()),
            ("type", item.asset.content_type.as_str()),
            ("length", item.asset.content_length.as_str()),
        ],
    )?;
    w.text(
        "itunes:explicit",
        yes_no(episode.explicit.unwrap_or(channel.explicit)),
    )?;

    if let Some(duration) = item.asset.duration {
        w.text("itunes:duration", &duration.to_string())?;
    }
    if let Some(number) = episode.episode {
        w.text("itunes:episode", &number.to_string())?;
    }
    if let Some(season) = episode.season {
        w.text("itunes:season", &season.to_string())?;
    }
    if let Some(episode_type) = episode.episode_type {
        w.text("itunes:episodeType", episode_type.as_str())?;
    }

    w.text("link", episode.link.as_deref().unwrap_or(&channel.link))?;
    if let Some(image) = episode.image.as_ref().or(channel.image.as_ref()) {
        w.empty("itunes:image", &[("href", image.as_str())])?;
    }

    for transcript in &episode.transcripts {
        let mut attrs = vec![
            ("url", transcript.url.as_str()),
            ("type", transcript.mime_type.as_str()),
        ];
        if let Some(language) = &transcript.language {
            attrs.push(("language", language.as_str()));
        }
        if let Some(rel) = &transcript.rel {
            attrs.push(("rel", rel.as_str()));
        }
        w.empty("podcast:transcript", &attrs)?;
    }

    w.end("item")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Thin event helpers over an indenting in-memory writer.
struct FeedWriter {
    inner: Writer<Cursor<Vec<u8>>>,
}

impl FeedWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner().into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), FeedError> {
        self.inner
            .write_event(event)
            .map_err(|e| FeedError::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FeedError> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> Result<(), FeedError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FeedError> {
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.event(Event::Empty(element))
    }

    /// `<name>text</name>` with standard escaping.
    fn text(&mut self, name: &str, text: &str) -> Result<(), FeedError> {
        self.text_with(name, &[], text)
    }

    fn text_with(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), FeedError> {
        self.start(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Writes a pre-wrapped `<![CDATA[...]]>` fragment. Only `&` is escaped;
    /// `<` and `>` go out as-is.
    fn wrapped(&mut self, name: &str, fragment: &str) -> Result<(), FeedError> {
        self.start(name, &[])?;
        self.event(Event::Text(BytesText::from_escaped(fragment.replace('&', "&amp;"))))?;
        self.end(name)
    }
}
