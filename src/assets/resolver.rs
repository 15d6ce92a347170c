use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::assets::decode::{DecodedImage, decode_image, decode_image_as};
use crate::assets::fetch::{FetchError, ImageFetcher, UrlFetcher};
use crate::assets::reference::{DataUrl, ImageRef, describe_reference};

/// Default time allowed for one resolution attempt.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Why an image reference produced no image.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    #[error("empty image reference")]
    Empty,
    #[error("malformed image reference: {0}")]
    Malformed(String),
    #[error("image load timed out")]
    Timeout,
    #[error("image blocked by cross-origin policy: {0}")]
    CrossOrigin(String),
    #[error("image fetch failed: {0}")]
    Fetch(String),
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// Outcome of resolving one reference. Never an error: failures carry a reason instead.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageResolution {
    Resolved(Arc<DecodedImage>),
    Unresolved(UnresolvedReason),
}

impl ImageResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        match self {
            Self::Resolved(img) => Some(img),
            Self::Unresolved(_) => None,
        }
    }
}

/// Turns template image references into decoded images under a per-attempt deadline.
///
/// Each attempt runs on its own worker thread. When the deadline passes the attempt is
/// abandoned (its thread finishes in the background and the result is dropped). Embedded
/// `data:` references that fail get exactly one lenient re-materialization attempt with a
/// fresh deadline.
#[derive(Clone)]
pub struct ImageResolver {
    fetcher: Arc<dyn ImageFetcher>,
    timeout: Duration,
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::with_default_fetcher(DEFAULT_IMAGE_TIMEOUT, true)
    }
}

impl ImageResolver {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Resolver backed by [`UrlFetcher`].
    pub fn with_default_fetcher(timeout: Duration, allow_remote: bool) -> Self {
        Self::new(Arc::new(UrlFetcher::new(timeout, allow_remote)), timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve with the configured timeout.
    pub fn resolve(&self, reference: &str) -> ImageResolution {
        self.resolve_with_timeout(reference, self.timeout)
    }

    #[tracing::instrument(skip(self, reference), fields(reference = %describe_reference(reference)))]
    pub fn resolve_with_timeout(&self, reference: &str, timeout: Duration) -> ImageResolution {
        let parsed = match ImageRef::parse(reference) {
            Ok(r) => r,
            Err(reason) => {
                if reason != UnresolvedReason::Empty {
                    tracing::warn!(%reason, "image reference rejected");
                }
                return ImageResolution::Unresolved(reason);
            }
        };

        let first = match &parsed {
            ImageRef::Data(data) => {
                let data = data.clone();
                run_with_deadline(timeout, move || decode_declared(&data))
            }
            ImageRef::Remote(url) | ImageRef::File(url) => {
                let fetcher = Arc::clone(&self.fetcher);
                let url = url.clone();
                run_with_deadline(timeout, move || fetch_and_decode(fetcher.as_ref(), &url))
            }
        };

        let reason = match first {
            Ok(img) => {
                tracing::debug!(width = img.width, height = img.height, "image resolved");
                return ImageResolution::Resolved(Arc::new(img));
            }
            Err(reason) => reason,
        };

        if let ImageRef::Data(data) = parsed {
            tracing::debug!(%reason, "embedded image failed, retrying with lenient decode");
            match run_with_deadline(timeout, move || decode_lenient(&data)) {
                Ok(img) => {
                    tracing::debug!(
                        width = img.width,
                        height = img.height,
                        "image resolved on fallback"
                    );
                    return ImageResolution::Resolved(Arc::new(img));
                }
                Err(fallback) => {
                    tracing::debug!(reason = %fallback, "lenient decode failed");
                }
            }
        }

        tracing::warn!(%reason, "image unresolved");
        ImageResolution::Unresolved(reason)
    }
}

fn run_with_deadline<F>(timeout: Duration, attempt: F) -> Result<DecodedImage, UnresolvedReason>
where
    F: FnOnce() -> Result<DecodedImage, UnresolvedReason> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    let spawned = std::thread::Builder::new()
        .name("adforge-image".to_owned())
        .spawn(move || {
            let _ = tx.send(attempt());
        });
    if let Err(e) = spawned {
        return Err(UnresolvedReason::Fetch(format!("spawn image worker: {e}")));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(UnresolvedReason::Timeout),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(UnresolvedReason::Decode("image worker panicked".to_owned()))
        }
    }
}

fn decode_declared(data: &DataUrl) -> Result<DecodedImage, UnresolvedReason> {
    let bytes = data.strict_bytes().map_err(UnresolvedReason::Decode)?;
    decode_image_as(&bytes, &data.mime).map_err(|e| UnresolvedReason::Decode(e.to_string()))
}

fn decode_lenient(data: &DataUrl) -> Result<DecodedImage, UnresolvedReason> {
    let bytes = data.lenient_bytes().map_err(UnresolvedReason::Decode)?;
    decode_image(&bytes).map_err(|e| UnresolvedReason::Decode(e.to_string()))
}

fn fetch_and_decode(
    fetcher: &dyn ImageFetcher,
    url: &url::Url,
) -> Result<DecodedImage, UnresolvedReason> {
    let bytes = fetcher.fetch(url).map_err(|e| match e {
        FetchError::Blocked(msg) => UnresolvedReason::CrossOrigin(msg),
        FetchError::Failed(msg) => UnresolvedReason::Fetch(msg),
    })?;
    decode_image(&bytes).map_err(|e| UnresolvedReason::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
