use std::time::Duration;

/// Failure to obtain image bytes for a URL.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The source refused access (HTTP 401/403, or remote loading disabled).
    #[error("access blocked: {0}")]
    Blocked(String),
    /// Transport or I/O failure.
    #[error("fetch failed: {0}")]
    Failed(String),
}

/// Source of raw image bytes for `http(s)` and `file` URLs.
///
/// The resolver calls this from a worker thread and may abandon the call once its deadline
/// passes, so implementations must be `Send + Sync` and should not hold locks across I/O.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &url::Url) -> Result<Vec<u8>, FetchError>;
}

/// Default fetcher: local files via `std::fs`, remote URLs via a blocking `ureq` agent.
pub struct UrlFetcher {
    agent: ureq::Agent,
    allow_remote: bool,
}

impl std::fmt::Debug for UrlFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlFetcher")
            .field("allow_remote", &self.allow_remote)
            .finish_non_exhaustive()
    }
}

impl UrlFetcher {
    /// `timeout` bounds the whole HTTP exchange so abandoned requests do not linger.
    pub fn new(timeout: Duration, allow_remote: bool) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let agent: ureq::Agent = config.into();
        Self {
            agent,
            allow_remote,
        }
    }

    fn fetch_remote(&self, url: &url::Url) -> Result<Vec<u8>, FetchError> {
        if !self.allow_remote {
            return Err(FetchError::Blocked(format!(
                "remote images are disabled ({})",
                url.host_str().unwrap_or("?")
            )));
        }
        let mut response = self.agent.get(url.as_str()).call().map_err(|e| match e {
            ureq::Error::StatusCode(code @ (401 | 403)) => {
                FetchError::Blocked(format!("server answered HTTP {code}"))
            }
            other => FetchError::Failed(other.to_string()),
        })?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| FetchError::Failed(format!("read response body: {e}")))
    }
}

impl ImageFetcher for UrlFetcher {
    fn fetch(&self, url: &url::Url) -> Result<Vec<u8>, FetchError> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| FetchError::Failed(format!("invalid file url '{url}'")))?;
                std::fs::read(&path)
                    .map_err(|e| FetchError::Failed(format!("read '{}': {e}", path.display())))
            }
            "http" | "https" => self.fetch_remote(url),
            other => Err(FetchError::Failed(format!("unsupported scheme '{other}'"))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
