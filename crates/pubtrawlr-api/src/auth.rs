use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, info, warn};

use pubtrawlr_session::Session;
use pubtrawlr_types::InitResponse;
use pubtrawlr_types::api::ExpiryClaim;

use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::http::{dispatch, read_json};

/// Header carrying the microservice credential on the identity endpoint.
pub const SERVICE_KEY_HEADER: &str = "X-ResearchGPT-Microservice-Id";

/// Obtains bearer tokens and attaches them to outgoing requests.
#[derive(Clone)]
pub struct Authenticator {
    http: Client,
    init_url: String,
    service_key: String,
    session: Session,
}

impl Authenticator {
    pub fn new(http: Client, config: &ClientConfig, session: Session) -> Self {
        Self {
            http,
            init_url: format!("{}/v2/FEinit", config.search_base),
            service_key: config.service_key.clone(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch a fresh token and identity and store both in the session.
    pub async fn try_refresh(&self) -> ApiResult<String> {
        let req = self
            .http
            .get(&self.init_url)
            .header(SERVICE_KEY_HEADER, &self.service_key);
        let resp = dispatch(req, "GET /v2/FEinit").await?;
        let init: InitResponse = read_json(resp).await?;

        let (token, identity) = init.into_parts();
        if let Err(e) = self.session.replace(&token, &identity) {
            warn!("Refreshed token could not be persisted: {}", e);
        }

        info!(user_id = identity.user_id, "Bearer token refreshed");
        Ok(token)
    }

    /// Fetch a fresh token. Any failure is logged and yields an empty token,
    /// which the backend will answer with 401.
    pub async fn refresh(&self) -> String {
        match self.try_refresh().await {
            Ok(token) => token,
            Err(e) => {
                error!("Token refresh failed: {}", e);
                String::new()
            }
        }
    }

    /// Headers for an authenticated JSON request, refreshing the stored token
    /// first if it is missing or expired.
    pub async fn headers(&self) -> HeaderMap {
        let token = match self.session.token() {
            Some(token) if !is_expired(&token, Utc::now().timestamp()) => token,
            Some(_) => {
                debug!("Bearer token expired, refreshing");
                self.refresh().await
            }
            None => {
                debug!("No bearer token stored, refreshing");
                self.refresh().await
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap_or_else(|e| {
            warn!("Bearer token is not a valid header value: {}", e);
            HeaderValue::from_static("Bearer ")
        });
        headers.insert(AUTHORIZATION, bearer);
        headers
    }
}

/// The `exp` claim of a token, in seconds since the epoch. The signature is
/// not checked. Undecodable tokens and tokens without `exp` read as 0.
pub fn token_expiry(token: &str) -> i64 {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.expires_at(),
        Err(e) => {
            debug!("Token could not be decoded, treating as expired: {}", e);
            0
        }
    }
}

/// A token is usable only while its expiry lies after `now`.
pub fn is_expired(token: &str, now: i64) -> bool {
    token_expiry(token) <= now
}
