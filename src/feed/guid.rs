use uuid::Uuid;

use crate::asset::AssetInfo;
use crate::podcast::Channel;

/// Chooses an episode's `<guid>`.
///
/// The content-identity hint is used only when `use_hash` is set and the
/// asset actually exposed one; otherwise the asset URL is used verbatim, which
/// keeps GUIDs of already-published episodes unchanged.
pub fn episode_guid(asset_url: &str, asset: &AssetInfo, use_hash: bool) -> String {
    match (&asset.content_hash, use_hash) {
        (Some(hash), true) => {
            tracing::debug!(guid = %hash, "Using content hash for GUID");
            hash.to_string()
        }
        _ => {
            tracing::debug!(guid = %asset_url, "Using asset URL for GUID");
            asset_url.to_string()
        }
    }
}

/// Derives the `podcast:guid` for a feed URL: a name-based (v5) UUID in the
/// URL namespace, so the same URL always yields the same value.
pub fn feed_guid(feed_url: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, feed_url.as_bytes()).to_string()
}

/// The channel's feed GUID and whether it had to be derived.
///
/// A pinned `podcast_guid` always wins.
pub fn resolve_feed_guid(channel: &Channel) -> (String, bool) {
    match &channel.guid {
        Some(guid) => (guid.clone(), false),
        None => (feed_guid(&channel.feed_url), true),
    }
}
