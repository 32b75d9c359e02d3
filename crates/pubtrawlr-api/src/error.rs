use thiserror::Error;
use tracing::warn;

/// Why a backend call produced no data.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401. The caller should send the user back through
    /// sign-in; the request is not retried.
    #[error("401: Unauthorized")]
    Unauthorized,
    /// The request never produced a response (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// A response arrived but its body was not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Collapse a failed call into an empty value so a view can keep rendering.
pub trait ApiResultExt<T> {
    fn or_empty(self, context: &str) -> T;
}

impl<T: Default> ApiResultExt<T> for ApiResult<T> {
    fn or_empty(self, context: &str) -> T {
        self.unwrap_or_else(|e| {
            warn!("{} failed, continuing with empty result: {}", context, e);
            T::default()
        })
    }
}
