//! Destination URL validation and canonicalization.

use url::Url;

use crate::error::StoreError;

/// Longest destination URL the schema stores.
pub const MAX_URL_LENGTH: usize = 2048;

/// Validates a link destination and returns its canonical form.
///
/// # Normalization Rules
///
/// 1. Only `http` and `https` are accepted
/// 2. Embedded credentials (`user:pass@host`) are rejected
/// 3. Hostname is lowercased
/// 4. Default ports (80 / 443) and fragments are dropped
/// 5. Path and query are preserved as-is
///
/// # Errors
///
/// Returns [`StoreError::InvalidUrl`] when any rule fails or the result is
/// longer than [`MAX_URL_LENGTH`].
pub fn normalize_url(input: &str) -> Result<String, StoreError> {
    let mut url = Url::parse(input.trim()).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(StoreError::InvalidUrl(format!(
            "scheme '{}' is not allowed, use http or https",
            url.scheme()
        )));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(StoreError::InvalidUrl(
            "credentials in URLs are not allowed".to_string(),
        ));
    }

    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| StoreError::InvalidUrl("URL has no host".to_string()))?;
    url.set_host(Some(&host))
        .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

    url.set_fragment(None);

    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        // Infallible for http(s) URLs with a host.
        let _ = url.set_port(None);
    }

    let normalized = url.to_string();
    if normalized.len() > MAX_URL_LENGTH {
        return Err(StoreError::InvalidUrl(format!(
            "URL is longer than {MAX_URL_LENGTH} characters"
        )));
    }

    Ok(normalized)
}
