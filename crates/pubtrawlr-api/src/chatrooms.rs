use reqwest::{Client, StatusCode};
use tracing::warn;

use pubtrawlr_types::Chatroom;
use pubtrawlr_types::api::{CreateChatroomRequest, RenameChatroomRequest};

use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::http::{dispatch, read_json, reject_unauthorized};

/// CRUD over the chat backend's `/chatroom` collection.
///
/// Every call is made exactly once. A 401 comes back as
/// `ApiError::Unauthorized` and is never retried.
#[derive(Clone)]
pub struct ChatroomClient {
    http: Client,
    base: String,
    auth: Authenticator,
}

impl ChatroomClient {
    pub fn new(http: Client, config: &ClientConfig, auth: Authenticator) -> Self {
        Self {
            http,
            base: config.chat_base.clone(),
            auth,
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Chatroom>> {
        let req = self
            .http
            .get(self.collection_url())
            .headers(self.auth.headers().await);
        let resp = dispatch(req, "GET /chatroom").await?;
        let resp = reject_unauthorized(resp, "GET /chatroom")?;
        read_json(resp).await
    }

    /// Create a chat room. The server assigns the id, so a failed create can
    /// be repeated by the caller.
    pub async fn create(&self, title: &str, search: &str, name: &str) -> ApiResult<Chatroom> {
        let body = CreateChatroomRequest {
            title: title.to_string(),
            search: search.to_string(),
            name: name.to_string(),
        };
        let req = self
            .http
            .post(self.collection_url())
            .headers(self.auth.headers().await)
            .json(&body);
        let resp = dispatch(req, "POST /chatroom").await?;
        let resp = reject_unauthorized(resp, "POST /chatroom")?;
        read_json(resp).await
    }

    /// Delete a chat room. The response body is ignored.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let what = format!("DELETE /chatroom/{}", id);
        let req = self
            .http
            .delete(self.item_url(id))
            .headers(self.auth.headers().await);
        let resp = dispatch(req, &what).await?;
        let resp = reject_unauthorized(resp, &what)?;
        log_unexpected_status(resp.status(), &what);
        Ok(())
    }

    /// Rename a chat room. The response body is ignored.
    pub async fn rename(&self, id: i64, name: &str) -> ApiResult<()> {
        let what = format!("PUT /chatroom/{}", id);
        let body = RenameChatroomRequest {
            name: name.to_string(),
        };
        let req = self
            .http
            .put(self.item_url(id))
            .headers(self.auth.headers().await)
            .json(&body);
        let resp = dispatch(req, &what).await?;
        let resp = reject_unauthorized(resp, &what)?;
        log_unexpected_status(resp.status(), &what);
        Ok(())
    }

    fn collection_url(&self) -> String {
        format!("{}/chatroom", self.base)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/chatroom/{}", self.base, id)
    }
}

fn log_unexpected_status(status: StatusCode, what: &str) {
    if !status.is_success() {
        warn!("{} answered {}", what, status);
    }
}
