use super::http::{AssetTransport, TransportError};
use super::identity::ContentHash;
use super::probe::{parse_duration, MediaProber, ProbeError};
use super::{AssetInfo, FALLBACK_CONTENT_LENGTH, FALLBACK_CONTENT_TYPE};
use crate::util::RetryPolicy;

/// Resolves [`AssetInfo`] for asset URLs.
///
/// Runs two independent retry loops: the HEAD probe, whose exhaustion fails
/// the resolution, and the media probe against the post-redirect URL, whose
/// exhaustion only drops the duration.
#[derive(Debug, Clone)]
pub struct AssetResolver<T, P> {
    transport: T,
    prober: P,
    transport_retry: RetryPolicy,
    probe_retry: RetryPolicy,
}

impl<T: AssetTransport, P: MediaProber> AssetResolver<T, P> {
    pub fn new(transport: T, prober: P) -> Self {
        Self {
            transport,
            prober,
            transport_retry: RetryPolicy::default(),
            probe_retry: RetryPolicy::default(),
        }
    }

    /// Uses `policy` for both probes.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.transport_retry = policy;
        self.probe_retry = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn resolve(&self, url: &str) -> Result<AssetInfo, TransportError> {
        let response = self
            .transport_retry
            .run(
                "asset HEAD request",
                || self.transport.head(url),
                TransportError::is_retryable,
            )
            .await?;

        if response.final_url != url {
            tracing::debug!(url = %url, final_url = %response.final_url, "Asset URL redirected");
        }

        let duration = match self
            .probe_retry
            .run(
                "media probe",
                || self.prober.probe(&response.final_url),
                ProbeError::is_retryable,
            )
            .await
        {
            Ok(report) => {
                let duration = parse_duration(&report);
                if duration.is_none() {
                    tracing::warn!(url = %response.final_url, "Media probe reported no duration");
                }
                duration
            }
            Err(e) => {
                tracing::warn!(
                    url = %response.final_url,
                    error = %e,
                    "Media probe failed, duration will be omitted"
                );
                None
            }
        };

        Ok(AssetInfo {
            content_length: response
                .content_length()
                .unwrap_or(FALLBACK_CONTENT_LENGTH)
                .to_string(),
            content_type: response
                .content_type()
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string(),
            duration,
            content_hash: ContentHash::from_headers(&response.headers),
        })
    }
}
