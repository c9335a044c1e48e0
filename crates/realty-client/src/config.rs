//! Hosted database configuration.

use std::time::Duration;

use crate::error::Error;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`RestStore`](crate::RestStore).
#[derive(Clone)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub project_url: String,

    /// Anonymous API key, sent as `apikey` and bearer token.
    pub anon_key: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl RestConfig {
    /// Create a configuration with the default timeout.
    pub fn new(project_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            anon_key: anon_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base of the REST interface, without trailing slash.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.project_url.trim_end_matches('/'))
    }

    /// Check that the URL is http(s) and the key is non-empty.
    pub fn validate(&self) -> Result<(), Error> {
        let url = self.project_url.trim();
        if url.is_empty() {
            return Err(Error::Config("project url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "project url must be http(s): {}",
                self.project_url
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(Error::Config("anon key is empty".to_string()));
        }
        Ok(())
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("project_url", &self.project_url)
            .field("anon_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
