use serde::{Deserialize, Serialize};

use crate::models::Identity;

// -- Identity --

/// Body of `GET /v2/FEinit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitResponse {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_photo: String,
}

impl InitResponse {
    /// Split into the bearer token and the identity it belongs to.
    pub fn into_parts(self) -> (String, Identity) {
        (
            self.token,
            Identity {
                user_id: self.user_id,
                user_name: self.user_name,
                user_photo: self.user_photo,
            },
        )
    }
}

/// The only claim the client reads from a bearer token. Some issuers write
/// `exp` with a fractional part, so it is read as a float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryClaim {
    #[serde(default)]
    pub exp: Option<f64>,
}

impl ExpiryClaim {
    /// Whole seconds since the epoch; fractions are dropped.
    pub fn expires_at(&self) -> i64 {
        self.exp.map(|exp| exp.floor() as i64).unwrap_or(0)
    }
}

// -- Search --

#[derive(Debug, Serialize, Deserialize)]
pub struct AutocompleteRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search: String,
}

// -- Chatrooms --

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateChatroomRequest {
    pub title: String,
    pub search: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenameChatroomRequest {
    pub name: String,
}
