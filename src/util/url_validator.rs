use thiserror::Error;
use url::Url;

/// Errors that can occur while checking the shape of a URL-valued field.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL parsed but carries no host (e.g. `mailto:` or `file:///`).
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Parses a URL and requires both a scheme and a non-empty host.
///
/// This is a shape check only: no scheme allow-list and no network policy.
/// Feed fields such as `link`, `rss_feed_url`, `image` and episode asset
/// URLs all go through here.
///
/// # Examples
///
/// ```
/// use podcast_rss_generator::util::validate_url;
///
/// let url = validate_url("https://example.com/feed.xml").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// // Missing scheme
/// assert!(validate_url("example.com").is_err());
/// // No host
/// assert!(validate_url("mailto:someone@example.com").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost(url_str.to_owned())),
    }
}

/// Convenience wrapper around [`validate_url`] for validators that only need a yes/no.
pub fn is_valid_url(url_str: &str) -> bool {
    validate_url(url_str).is_ok()
}

/// Loose `local@domain.tld` shape check for the owner email.
///
/// Rejects whitespace, a missing local part, and domains without a dot or
/// with empty labels. Deliverability is not our concern.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
