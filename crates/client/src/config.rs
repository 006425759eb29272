//! Client configuration

use reqwest::Url;

use crate::error::ConfigError;

/// Backend the controller talks to when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Where the document backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    server_url: Url,
}

impl ClientConfig {
    /// Validate and wrap a server URL. Only absolute http(s) URLs are accepted.
    pub fn new(server_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServerUrl {
            url: server_url.to_string(),
            reason,
        };

        let url = Url::parse(server_url.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{other}'"))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self { server_url: url })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Absolute URL for an API path such as `/api/upload`.
    /// Any path prefix on the server URL is kept.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.server_url.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL).expect("default server URL is valid")
    }
}
