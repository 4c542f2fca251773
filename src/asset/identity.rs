use reqwest::header::{HeaderMap, ETAG};
use std::fmt;

/// S3-style full-object checksum.
pub const AMZ_CHECKSUM_SHA256: &str = "x-amz-checksum-sha256";

/// GCS composite hash, e.g. `crc32c=AAAAAA==,md5=1B2M2Y8AsgTpgAmY7PhCfg==`.
pub const GOOG_HASH: &str = "x-goog-hash";

/// A content-identity hint harvested from asset response headers.
///
/// Rendered as `<scheme>:<value>`, which is the exact text used when an
/// episode opts into hash-based GUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentHash {
    Sha256(String),
    Md5(String),
    ETag(String),
}

impl ContentHash {
    pub fn scheme(&self) -> &'static str {
        match self {
            ContentHash::Sha256(_) => "sha256",
            ContentHash::Md5(_) => "md5",
            ContentHash::ETag(_) => "etag",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ContentHash::Sha256(v) | ContentHash::Md5(v) | ContentHash::ETag(v) => v,
        }
    }

    /// Picks the strongest identity available, first match wins:
    /// SHA-256 checksum, then a GCS `md5=` token, then the entity tag.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        if let Some(sha) = header_str(headers, AMZ_CHECKSUM_SHA256) {
            let sha = sha.trim();
            if !sha.is_empty() {
                return Some(ContentHash::Sha256(sha.to_string()));
            }
        }

        // GCS may send several x-goog-hash lines (one per algorithm)
        let md5 = headers
            .get_all(GOOG_HASH)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .find_map(|token| token.trim().strip_prefix("md5="))
            .filter(|v| !v.is_empty());
        if let Some(md5) = md5 {
            return Some(ContentHash::Md5(md5.to_string()));
        }

        header_str(headers, ETAG.as_str())
            .map(|etag| etag.trim_matches(|c: char| c == '"' || c == ' '))
            .filter(|etag| !etag.is_empty())
            .map(|etag| ContentHash::ETag(etag.to_string()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme(), self.value())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
