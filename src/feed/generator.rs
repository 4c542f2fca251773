use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use super::guid::{episode_guid, resolve_feed_guid};
use super::schedule::{is_eligible, Clock, SystemClock};
use super::writer::{write_feed, FeedError, FeedItem};
use crate::asset::{
    AssetInfo, AssetResolver, AssetTransport, FfprobeProber, MediaProber, ReqwestTransport,
    TransportError,
};
use crate::config::EngineSettings;
use crate::podcast::{validate, ModelError, Podcast, ValidationReport};
use crate::util::atomic_write;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The document failed validation; nothing was generated.
    #[error("{0}")]
    Invalid(ValidationReport),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// An eligible episode's asset could not be reached after all retries.
    #[error("Failed to resolve asset for episode '{episode}': {source}")]
    Transport {
        episode: String,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Feed(#[from] FeedError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Use placeholder asset metadata instead of probing asset URLs.
    pub skip_asset_verification: bool,
}

/// Outcome of one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedFeed {
    pub xml: Vec<u8>,
    /// Episodes written as `<item>`s.
    pub included: usize,
    /// Episodes left out because their publication date has not passed yet.
    pub skipped: usize,
    pub feed_guid: String,
    /// True when `podcast_guid` was absent and `feed_guid` was derived from
    /// the feed URL. Operators should pin it.
    pub feed_guid_generated: bool,
}

/// The feed assembly pipeline.
///
/// Episodes are processed one at a time in input order; each asset
/// resolution (including its retry backoff) completes before the next
/// episode starts.
pub struct FeedGenerator<T, P, C = SystemClock> {
    resolver: AssetResolver<T, P>,
    clock: C,
}

impl FeedGenerator<ReqwestTransport, FfprobeProber> {
    /// Production wiring: `reqwest` HEAD probe, `ffprobe`, the system clock.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings.request_timeout(), settings.max_redirects)?;
        let prober = FfprobeProber::new(settings.ffprobe_path.clone());
        let resolver =
            AssetResolver::new(transport, prober).with_retry_policy(settings.retry_policy());
        Ok(Self::new(resolver))
    }
}

impl<T: AssetTransport, P: MediaProber> FeedGenerator<T, P, SystemClock> {
    pub fn new(resolver: AssetResolver<T, P>) -> Self {
        Self {
            resolver,
            clock: SystemClock,
        }
    }
}

impl<T: AssetTransport, P: MediaProber, C: Clock> FeedGenerator<T, P, C> {
    /// Replaces the clock used to decide which episodes are published.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> FeedGenerator<T, P, C2> {
        FeedGenerator {
            resolver: self.resolver,
            clock,
        }
    }

    pub fn resolver(&self) -> &AssetResolver<T, P> {
        &self.resolver
    }

    /// Validates `document` and renders the feed.
    ///
    /// Validation runs to completion first; any error aborts before network
    /// activity. A transport failure on any eligible episode aborts the whole
    /// run since its enclosure cannot be written.
    pub async fn generate(
        &self,
        document: &Value,
        options: GenerateOptions,
    ) -> Result<GeneratedFeed, GenerateError> {
        let report = validate(document);
        if !report.is_valid() {
            return Err(GenerateError::Invalid(report));
        }

        let podcast = Podcast::from_document(document)?;
        let channel = &podcast.channel;

        let (feed_guid, feed_guid_generated) = resolve_feed_guid(channel);
        if feed_guid_generated {
            tracing::info!(
                guid = %feed_guid,
                "podcast_guid not set in metadata; generated one from rss_feed_url. \
                 Set podcast_guid to this value in your config to pin it"
            );
        }

        let now = self.clock.now();
        let mut items = Vec::with_capacity(podcast.episodes.len());
        let mut skipped = 0;

        for episode in &podcast.episodes {
            if !is_eligible(episode, now) {
                tracing::info!(
                    episode = %episode.title,
                    publication_date = %episode.publication_date.to_rfc3339(),
                    "Skipping episode not yet scheduled for release"
                );
                skipped += 1;
                continue;
            }

            tracing::info!(episode = %episode.title, "Processing episode");

            let (asset, guid) = if options.skip_asset_verification {
                tracing::info!(url = %episode.asset_url, "Skipping asset verification");
                (AssetInfo::placeholder(), episode.asset_url.clone())
            } else {
                let asset = self
                    .resolver
                    .resolve(&episode.asset_url)
                    .await
                    .map_err(|source| GenerateError::Transport {
                        episode: episode.title.clone(),
                        source,
                    })?;
                let guid = episode_guid(&episode.asset_url, &asset, episode.uses_hash_guid(channel));
                (asset, guid)
            };

            items.push(FeedItem {
                episode,
                asset,
                guid,
            });
        }

        let xml = write_feed(channel, &feed_guid, &items)?;
        tracing::info!(
            included = items.len(),
            skipped = skipped,
            bytes = xml.len(),
            "Feed generated"
        );

        Ok(GeneratedFeed {
            xml,
            included: items.len(),
            skipped,
            feed_guid,
            feed_guid_generated,
        })
    }

    /// [`generate`](Self::generate), then atomically replace `path` with the
    /// result. On any error the existing file is left untouched.
    pub async fn generate_to_path(
        &self,
        document: &Value,
        path: &Path,
        options: GenerateOptions,
    ) -> anyhow::Result<GeneratedFeed> {
        let feed = self.generate(document, options).await?;
        atomic_write(path, &feed.xml)
            .with_context(|| format!("Failed to write feed to '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "Feed written");
        Ok(feed)
    }
}
