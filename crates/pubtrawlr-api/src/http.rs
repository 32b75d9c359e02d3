use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};

/// Send a request, logging transport failures.
pub(crate) async fn dispatch(req: RequestBuilder, what: &str) -> ApiResult<Response> {
    debug!("{}", what);
    req.send().await.map_err(|e| {
        error!("{} failed: {}", what, e);
        ApiError::Network(e)
    })
}

/// Map a 401 response to `ApiError::Unauthorized`.
pub(crate) fn reject_unauthorized(resp: Response, what: &str) -> ApiResult<Response> {
    if resp.status() == StatusCode::UNAUTHORIZED {
        warn!("{}: 401: Unauthorized", what);
        return Err(ApiError::Unauthorized);
    }
    Ok(resp)
}

/// Decode a response body as JSON, whatever the status code.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
