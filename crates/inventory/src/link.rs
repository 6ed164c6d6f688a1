//! Deep links to a storage page and the seam for rendering them as a
//! scannable code.

use thiserror::Error;
use url::Url;

use labinv_core::{DomainError, DomainResult, StorageId};

/// Query parameter carrying the storage id in a deep link.
pub const STORAGE_QUERY_PARAM: &str = "storage";

/// `base_url` with `storage={id}` added to its query (percent-encoded).
///
/// Other query parameters and the fragment are kept; an existing `storage`
/// parameter is replaced.
pub fn storage_link(base_url: &str, storage_id: &StorageId) -> DomainResult<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| DomainError::validation(format!("invalid base URL {base_url:?}: {e}")))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(key, _)| key != STORAGE_QUERY_PARAM)
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(STORAGE_QUERY_PARAM, storage_id.as_str());

    Ok(url.into())
}

/// Extract the storage id from a deep link, if it carries one.
pub fn storage_from_link(link: &str) -> Option<StorageId> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == STORAGE_QUERY_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}

#[derive(Debug, Error)]
#[error("code rendering failed: {0}")]
pub struct RenderError(pub String);

/// An encoded image and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCode {
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders a short text payload (a URL) into a scannable image.
pub trait CodeRenderer {
    fn render(&self, payload: &str) -> Result<RenderedCode, RenderError>;

    /// File extension matching the media type, without the dot.
    fn file_extension(&self) -> &'static str;
}
