//! End-to-end feed generation: document text in, RSS bytes out.
//!
//! Asset probing runs either against canned collaborators or a local
//! `wiremock` server; the media prober is always substituted so the tests do
//! not depend on an installed `ffprobe`. Output is parsed back with `feed-rs`.

use chrono::{TimeZone, Utc};
use podcast_rss_generator::asset::{
    AssetResolver, AssetTransport, HeadResponse, MediaProber, ProbeError, ReqwestTransport,
    TransportError,
};
use podcast_rss_generator::config::parse_toml;
use podcast_rss_generator::feed::{FeedGenerator, FixedClock, GenerateError, GenerateOptions};
use podcast_rss_generator::util::RetryPolicy;
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = r#"
[metadata]
title = "Test Podcast"
description = "A podcast about **technology** & programming."
link = "https://example.com"
rss_feed_url = "https://example.com/feed.xml"
language = "en-us"
itunes_email = "test@example.com"
itunes_author = "Test Author"
category = "Technology"
image = "https://example.com/art.png"
podcast_locked = "yes"

[[episodes]]
title = "Episode 1"
description = "Introduction to the podcast."
publication_date = 2023-01-15T10:00:00Z
asset_url = "https://example.com/episode1.mp3"
episode = 1
season = 1
episode_type = "full"

[[episodes.transcripts]]
url = "https://example.com/episode1.vtt"
type = "text/vtt"
language = "en"

[[episodes.transcripts]]
url = "https://example.com/episode1.srt"

[[episodes]]
title = "Episode 2"
description = "Naive timestamps are UTC."
publication_date = "2024-05-31T23:59:59"
asset_url = "https://example.com/episode2.mp3"
explicit = true

[[episodes]]
title = "Episode 3"
description = "Not out yet."
publication_date = "2024-06-02T00:00:00Z"
asset_url = "https://example.com/episode3.mp3"
"#;

const REPORT: &str = "streams.stream.0.index=0\nstreams.stream.0.duration=\"3541.275283\"\n";

fn now() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
}

struct CannedTransport {
    calls: AtomicUsize,
}

impl AssetTransport for CannedTransport {
    async fn head(&self, url: &str) -> Result<HeadResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("12345678"));
        headers.insert("content-type", HeaderValue::from_static("audio/mpeg"));
        headers.insert("etag", HeaderValue::from_static("\"d41d8cd98f00b204e9800998ecf8427e\""));
        Ok(HeadResponse {
            final_url: url.to_string(),
            headers,
        })
    }
}

struct CannedProber;

impl MediaProber for CannedProber {
    async fn probe(&self, _url: &str) -> Result<String, ProbeError> {
        Ok(REPORT.to_string())
    }
}

fn canned_generator() -> FeedGenerator<CannedTransport, CannedProber, FixedClock> {
    let transport = CannedTransport {
        calls: AtomicUsize::new(0),
    };
    FeedGenerator::new(AssetResolver::new(transport, CannedProber)).with_clock(now())
}

// ============================================================================
// Canned collaborators
// ============================================================================

#[tokio::test]
async fn test_toml_config_to_parsed_feed() {
    let document = parse_toml(CONFIG).unwrap();
    let feed = canned_generator()
        .generate(&document, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(feed.included, 2);
    assert_eq!(feed.skipped, 1);

    let parsed = feed_rs::parser::parse(&feed.xml[..]).unwrap();
    assert_eq!(parsed.title.map(|t| t.content).as_deref(), Some("Test Podcast"));
    assert_eq!(parsed.entries.len(), 2);

    let first = &parsed.entries[0];
    assert_eq!(first.id, "https://example.com/episode1.mp3");
    assert_eq!(first.title.as_ref().map(|t| t.content.as_str()), Some("Episode 1"));
    assert_eq!(
        first.published,
        Some(Utc.with_ymd_and_hms(2023, 1, 15, 10, 0, 0).unwrap())
    );

    let second = &parsed.entries[1];
    assert_eq!(
        second.published,
        Some(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap())
    );
}

#[tokio::test]
async fn test_generated_xml_details() {
    let document = parse_toml(CONFIG).unwrap();
    let feed = canned_generator()
        .generate(&document, GenerateOptions::default())
        .await
        .unwrap();
    let xml = String::from_utf8(feed.xml).unwrap();

    // Legacy keys resolve
    assert!(xml.contains("<itunes:email>test@example.com</itunes:email>"));
    assert!(xml.contains("<itunes:author>Test Author</itunes:author>"));
    assert!(xml.contains("<podcast:locked owner=\"test@example.com\">yes</podcast:locked>"));

    // Markdown is rendered; only '&' is escaped inside the wrapped block
    assert!(xml.contains(
        "<description><![CDATA[<p>A podcast about <strong>technology</strong> &amp; programming.</p>]]></description>"
    ));

    assert!(xml.contains("<pubDate>Sun, 15 Jan 2023 10:00:00 +0000</pubDate>"));
    assert!(xml.contains("<pubDate>Fri, 31 May 2024 23:59:59 +0000</pubDate>"));
    assert!(xml.contains("<itunes:duration>3541</itunes:duration>"));

    // The transcript without a type is dropped, the valid one kept
    assert!(xml.contains(
        "<podcast:transcript url=\"https://example.com/episode1.vtt\" type=\"text/vtt\" language=\"en\"/>"
    ));
    assert!(!xml.contains("episode1.srt"));

    // Episode 2 overrides explicit, falls back to channel artwork
    let episode2 = &xml[xml.find("<title>Episode 2</title>").unwrap()..];
    assert!(episode2.contains("<itunes:explicit>yes</itunes:explicit>"));
    assert!(episode2.contains("<itunes:image href=\"https://example.com/art.png\"/>"));
    assert!(!episode2.contains("<itunes:episode>"));

    assert!(!xml.contains("Episode 3"));
    assert!(feed.feed_guid_generated);
    assert!(xml.contains("<podcast:guid>a22faa1d-2596-5ef3-943c-fe578c2e058c</podcast:guid>"));
}

#[tokio::test]
async fn test_validation_lists_every_violation() {
    let broken = CONFIG
        .replace("itunes_email = \"test@example.com\"", "itunes_email = \"nope\"")
        .replace("https://example.com/episode2.mp3", "episode2.mp3")
        .replace("url = \"https://example.com/episode1.srt\"", "url = \"bad\"\ntype = \"x\"");
    let document = parse_toml(&broken).unwrap();

    let generator = canned_generator();
    let err = generator
        .generate(&document, GenerateOptions::default())
        .await
        .unwrap_err();

    let GenerateError::Invalid(report) = err else {
        panic!("Expected Invalid");
    };
    assert_eq!(report.errors.len(), 3, "{:?}", report.errors);
    assert!(report.errors[0].contains("Invalid email format"));
    assert!(report.errors[1].starts_with("Episode 1: Transcript 2 has invalid URL format"));
    assert!(report.errors[2].starts_with("Episode 2: Invalid URL format"));
}

#[tokio::test]
async fn test_skip_verification_makes_no_requests() {
    let document = parse_toml(CONFIG).unwrap();
    let generator = canned_generator();
    let options = GenerateOptions {
        skip_asset_verification: true,
    };

    let feed = generator.generate(&document, options).await.unwrap();
    let xml = String::from_utf8(feed.xml).unwrap();

    assert!(xml.contains(
        "<enclosure url=\"https://example.com/episode1.mp3\" type=\"application/octet-stream\" length=\"0\"/>"
    ));
    assert!(!xml.contains("itunes:duration"));
    assert_eq!(generator.resolver().transport().calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Real HTTP transport against a local server
// ============================================================================

fn document_for(server: &MockServer, extra_metadata: &str) -> serde_json::Value {
    let config = format!(
        r#"
[metadata]
title = "Mock Podcast"
description = "Served locally."
link = "https://example.com"
rss_feed_url = "https://example.com/feed.xml"
language = "en-us"
email = "test@example.com"
author = "Test Author"
{extra}

[[episodes]]
title = "Episode 1"
description = "Behind a short link."
publication_date = "2023-01-15T10:00:00Z"
asset_url = "{uri}/e/1"
"#,
        extra = extra_metadata,
        uri = server.uri()
    );
    parse_toml(&config).unwrap()
}

fn http_generator() -> FeedGenerator<ReqwestTransport, CannedProber, FixedClock> {
    let transport = ReqwestTransport::new(Duration::from_secs(5), 10).unwrap();
    let resolver = AssetResolver::new(transport, CannedProber)
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10), 2));
    FeedGenerator::new(resolver).with_clock(now())
}

#[tokio::test]
async fn test_http_redirect_retry_and_hash_guid() {
    let mock_server = MockServer::start().await;

    // First hit on the short link fails, the retry is redirected to the file
    Mock::given(method("HEAD"))
        .and(path("/e/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/e/1"))
        .respond_with(
            ResponseTemplate::new(307)
                .insert_header("Location", format!("{}/media/episode1.mp3", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/media/episode1.mp3"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "audio/mpeg")
                .insert_header("ETag", "\"abc\"")
                .insert_header("x-amz-checksum-sha256", "e3b0c44298fc1c149afbf4c8996fb924"),
        )
        .mount(&mock_server)
        .await;

    let document = document_for(&mock_server, "use_asset_hash_as_guid = true");
    let feed = http_generator()
        .generate(&document, GenerateOptions::default())
        .await
        .unwrap();
    let xml = String::from_utf8(feed.xml).unwrap();

    assert!(xml.contains("<guid>sha256:e3b0c44298fc1c149afbf4c8996fb924</guid>"));
    assert!(xml.contains("type=\"audio/mpeg\""));
    // The enclosure keeps the configured URL, not the redirect target
    assert!(xml.contains(&format!("<enclosure url=\"{}/e/1\"", mock_server.uri())));
}

#[tokio::test]
async fn test_http_not_found_aborts_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let document = document_for(&mock_server, "");
    let err = http_generator()
        .generate(&document, GenerateOptions::default())
        .await
        .unwrap_err();

    match err {
        GenerateError::Transport { episode, source } => {
            assert_eq!(episode, "Episode 1");
            assert!(matches!(source, TransportError::HttpStatus(404)));
        }
        e => panic!("Expected Transport, got {:?}", e),
    }
}

#[tokio::test]
async fn test_example_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("podcast_config.example.toml");
    let document = podcast_rss_generator::config::load_document(&path).unwrap();

    let report = podcast_rss_generator::podcast::validate(&document);
    assert!(report.is_valid(), "{}", report);

    let settings = podcast_rss_generator::config::EngineSettings::from_document(&document).unwrap();
    assert_eq!(settings, podcast_rss_generator::config::EngineSettings::default());

    let feed = canned_generator()
        .generate(&document, GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(feed.included, 2);
}
