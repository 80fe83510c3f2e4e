//! Fetching page bodies declared through the `source` front matter key.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a `source` value points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(String),
    Local(PathBuf),
}

impl SourceLocation {
    /// Classify `source`; relative paths resolve against `base_dir`
    pub fn parse(source: &str, base_dir: &Path) -> Self {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            return SourceLocation::Remote(source.to_string());
        }

        let path = Path::new(source.strip_prefix("file://").unwrap_or(source));
        if path.is_absolute() {
            SourceLocation::Local(path.to_path_buf())
        } else {
            SourceLocation::Local(base_dir.join(path))
        }
    }
}

/// Blocking fetcher with a fixed timeout. Failures are not retried.
pub struct SourceFetcher {
    timeout: Duration,
    client: Option<reqwest::blocking::Client>,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: None,
        }
    }

    pub fn fetch(&mut self, location: &SourceLocation) -> Result<String, FetchError> {
        match location {
            SourceLocation::Local(path) => {
                std::fs::read_to_string(path).map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })
            }
            SourceLocation::Remote(url) => self.fetch_remote(url),
        }
    }

    fn fetch_remote(&mut self, url: &str) -> Result<String, FetchError> {
        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        // Built lazily so builds without remote sources never start a client
        let client = match self.client.take() {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(http_error)?,
        };

        tracing::debug!(url, timeout = ?self.timeout, "Fetching page source");
        let result = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(http_error);

        self.client = Some(client);
        result
    }
}
