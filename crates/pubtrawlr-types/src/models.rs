use serde::{Deserialize, Serialize};

/// A chat room as returned by the chat backend. Server-owned; clients only
/// ever hold per-request copies. The default value is the empty room a view
/// falls back to when a create fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chatroom {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub search: String,
}

/// The user the current bearer token was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub user_name: String,
    pub user_photo: String,
}
