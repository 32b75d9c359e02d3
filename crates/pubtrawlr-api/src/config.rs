use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Where the backends live and how to reach them.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the search and identity service.
    pub search_base: String,
    /// Base URL of the chat service.
    pub chat_base: String,
    /// Credential sent to the identity endpoint when fetching a token.
    pub service_key: String,
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let search_base = base_url(&required("PUBTRAWLR_SERVER")?);
        let chat_base = base_url(&required("PUBTRAWLR_CHAT_SERVER")?);
        let service_key = required("PUBTRAWLR_CHAT_SK")?;

        let poll_interval_ms = match lookup("PUBTRAWLR_POLL_INTERVAL_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "PUBTRAWLR_POLL_INTERVAL_MS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            search_base,
            chat_base,
            service_key,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }
}

/// Turn a configured host into a base URL. Bare hosts are served over HTTPS.
pub fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
