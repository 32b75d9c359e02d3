//! HTTP clients for the PubTrawlr search and chat backends.

pub mod auth;
pub mod chatrooms;
pub mod config;
pub mod error;
mod http;
pub mod poll;
pub mod search;

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use pubtrawlr_session::Session;

pub use auth::Authenticator;
pub use chatrooms::ChatroomClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, ApiResultExt};
pub use poll::{PollHandle, PollOutcome, poll_until_complete};
pub use search::SearchClient;

/// All clients wired to one HTTP connection pool and one session.
#[derive(Clone)]
pub struct PubTrawlr {
    http: Client,
    poll_interval: Duration,
    pub auth: Authenticator,
    pub chatrooms: ChatroomClient,
    pub search: SearchClient,
}

impl PubTrawlr {
    pub fn new(config: &ClientConfig, session: Session) -> Self {
        let http = Client::new();
        let auth = Authenticator::new(http.clone(), config, session);
        Self {
            chatrooms: ChatroomClient::new(http.clone(), config, auth.clone()),
            search: SearchClient::new(http.clone(), config),
            auth,
            poll_interval: config.poll_interval,
            http,
        }
    }

    pub fn session(&self) -> &Session {
        self.auth.session()
    }

    /// Poll `endpoint` at the configured interval.
    pub fn poll<F>(&self, endpoint: impl Into<String>, callback: F) -> PollHandle
    where
        F: FnOnce(Value) + Send + 'static,
    {
        self.poll_every(endpoint, self.poll_interval, callback)
    }

    pub fn poll_every<F>(&self, endpoint: impl Into<String>, interval: Duration, callback: F) -> PollHandle
    where
        F: FnOnce(Value) + Send + 'static,
    {
        poll_until_complete(self.http.clone(), endpoint, interval, callback)
    }
}
