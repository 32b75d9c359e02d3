use reqwest::Client;
use serde_json::Value;

use pubtrawlr_types::api::{AutocompleteRequest, SearchRequest};

use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::http::{dispatch, read_json};

/// Unauthenticated calls to the search backend. Results are passed through
/// as raw JSON.
#[derive(Clone)]
pub struct SearchClient {
    http: Client,
    base: String,
}

impl SearchClient {
    pub fn new(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            base: config.search_base.clone(),
        }
    }

    pub async fn autocomplete(&self, query: &str) -> ApiResult<Value> {
        let body = AutocompleteRequest {
            query: query.to_string(),
        };
        let req = self
            .http
            .post(format!("{}/api/autocompletes", self.base))
            .json(&body);
        let resp = dispatch(req, "POST /api/autocompletes").await?;
        read_json(resp).await
    }

    pub async fn search(&self, query: &str) -> ApiResult<Value> {
        let body = SearchRequest {
            search: query.to_string(),
        };
        let req = self
            .http
            .post(format!("{}/v2/search", self.base))
            .json(&body);
        let resp = dispatch(req, "POST /v2/search").await?;
        read_json(resp).await
    }
}
