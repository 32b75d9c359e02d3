//! In-process stand-in for the search, identity and chat backends.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use pubtrawlr_api::ClientConfig;
use pubtrawlr_api::auth::SERVICE_KEY_HEADER;

pub const SERVICE_KEY: &str = "sk-test";

pub enum PollReply {
    Json(Value),
    Garbage,
}

#[derive(Default)]
pub struct MockState {
    pub init_calls: AtomicUsize,
    pub init_fails: AtomicBool,
    pub init_token: Mutex<String>,
    /// Mint a different token on every identity call instead of `init_token`.
    pub init_unique: AtomicBool,
    pub issued_tokens: Mutex<Vec<String>>,
    pub seen_service_key: Mutex<Option<String>>,

    pub chatroom_calls: AtomicUsize,
    /// Status for chatroom routes; 0 means the route's normal success status.
    pub chatroom_status: AtomicU16,
    pub last_auth: Mutex<Option<String>>,
    pub last_body: Mutex<Option<Value>>,
    pub last_path: Mutex<Option<String>>,

    pub search_calls: Mutex<Vec<(String, Value, Option<String>)>>,

    pub poll_calls: AtomicUsize,
    pub poll_script: Mutex<VecDeque<PollReply>>,
}

impl MockState {
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn chatroom_calls(&self) -> usize {
        self.chatroom_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn set_chatroom_status(&self, status: u16) {
        self.chatroom_status.store(status, Ordering::SeqCst);
    }

    pub fn script_poll(&self, replies: Vec<PollReply>) {
        *self.poll_script.lock().unwrap() = replies.into();
    }

    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }

    fn record_chatroom_call(&self, headers: &HeaderMap, path: String, body: Option<Value>) {
        self.chatroom_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_auth.lock().unwrap() = header_value(headers, header::AUTHORIZATION.as_str());
        *self.last_path.lock().unwrap() = Some(path);
        *self.last_body.lock().unwrap() = body;
    }

    fn chatroom_status_or(&self, normal: StatusCode) -> StatusCode {
        match self.chatroom_status.load(Ordering::SeqCst) {
            0 => normal,
            code => StatusCode::from_u16(code).unwrap(),
        }
    }
}

pub struct MockBackend {
    pub base: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        *state.init_token.lock().unwrap() = mint(now() + 3600);

        let app = Router::new()
            .route("/v2/FEinit", get(fe_init))
            .route("/api/autocompletes", post(autocomplete))
            .route("/v2/search", post(search))
            .route("/chatroom", get(list_chatrooms).post(create_chatroom))
            .route("/chatroom/{id}", put(rename_chatroom).delete(delete_chatroom))
            .route("/jobs/poll", post(poll_job))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> ClientConfig {
        config_for(&self.base)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

pub fn config_for(base: &str) -> ClientConfig {
    ClientConfig {
        search_base: base.to_string(),
        chat_base: base.to_string(),
        service_key: SERVICE_KEY.to_string(),
        poll_interval: Duration::from_millis(20),
    }
}

/// Base URL of a port nothing listens on.
pub async fn dead_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A signed token expiring at `exp`.
pub fn mint(exp: i64) -> String {
    encode(
        &Header::default(),
        &json!({"sub": "42", "exp": exp}),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn fe_init(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let call = state.init_calls.fetch_add(1, Ordering::SeqCst) + 1;
    *state.seen_service_key.lock().unwrap() = header_value(&headers, SERVICE_KEY_HEADER);

    if state.init_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "identity service down").into_response();
    }

    let token = if state.init_unique.load(Ordering::SeqCst) {
        mint(now() + 3600 + call as i64)
    } else {
        state.init_token.lock().unwrap().clone()
    };
    state.issued_tokens.lock().unwrap().push(token.clone());

    Json(json!({
        "token": token,
        "user_id": 42,
        "user_name": "ada",
        "user_photo": "https://img.example/ada.png"
    }))
    .into_response()
}

async fn autocomplete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    state.search_calls.lock().unwrap().push((
        "/api/autocompletes".into(),
        body,
        header_value(&headers, header::AUTHORIZATION.as_str()),
    ));
    Json(json!({"suggestions": [format!("{} cells", query), format!("{} therapy", query)]}))
}

async fn search(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let query = body["search"].as_str().unwrap_or_default().to_string();
    state.search_calls.lock().unwrap().push((
        "/v2/search".into(),
        body,
        header_value(&headers, header::AUTHORIZATION.as_str()),
    ));
    Json(json!({"search": query, "papers": [{"pmid": "36960329"}]}))
}

async fn list_chatrooms(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record_chatroom_call(&headers, "/chatroom".into(), None);
    let status = state.chatroom_status_or(StatusCode::OK);
    if status == StatusCode::UNAUTHORIZED {
        return (status, "Unauthorized").into_response();
    }
    (
        status,
        Json(json!([
            {"id": 1, "name": "Stem cells", "title": "stem cells", "search": "stem cells", "user_id": 42},
            {"id": 2, "name": "CRISPR", "title": "crispr", "search": "crispr cas9", "user_id": 42}
        ])),
    )
        .into_response()
}

async fn create_chatroom(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_chatroom_call(&headers, "/chatroom".into(), Some(body.clone()));
    let status = state.chatroom_status_or(StatusCode::OK);
    if status == StatusCode::UNAUTHORIZED {
        return (status, "Unauthorized").into_response();
    }
    (
        status,
        Json(json!({
            "id": 7,
            "name": body["name"],
            "title": body["title"],
            "search": body["search"]
        })),
    )
        .into_response()
}

async fn delete_chatroom(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    state.record_chatroom_call(&headers, format!("/chatroom/{}", id), None);
    let status = state.chatroom_status_or(StatusCode::OK);
    (status, "<html>not json</html>").into_response()
}

async fn rename_chatroom(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_chatroom_call(&headers, format!("/chatroom/{}", id), Some(body));
    let status = state.chatroom_status_or(StatusCode::OK);
    status.into_response()
}

async fn poll_job(State(state): State<Arc<MockState>>) -> Response {
    state.poll_calls.fetch_add(1, Ordering::SeqCst);
    let reply = state.poll_script.lock().unwrap().pop_front();
    match reply {
        Some(PollReply::Json(value)) => Json(value).into_response(),
        Some(PollReply::Garbage) => (StatusCode::OK, "<<not json>>").into_response(),
        None => Json(json!({"status": "partial"})).into_response(),
    }
}
