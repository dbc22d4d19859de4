//! In-memory imitation of the Signifyd v2 case endpoints.
//!
//! Routes live under `/v2` and require Basic auth with the configured API
//! key as username and an empty password. `POST /echo/cases` reports back
//! what it received so clients can verify their encoding. Any path can be
//! forced to answer with a given status through `Store::fail_path`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct MockCase {
    pub case_id: u64,
    pub order_id: String,
    pub order: Value,
    /// `None` while the provider is still scoring the case.
    pub analysis: Option<Value>,
    pub entries: Vec<Value>,
}

impl MockCase {
    fn view(&self) -> Value {
        json!({
            "caseId": self.case_id,
            "orderId": self.order_id,
            "status": "OPEN",
            "order": self.order,
        })
    }
}

#[derive(Debug)]
pub struct Store {
    cases: BTreeMap<u64, MockCase>,
    next_id: u64,
    failures: HashMap<String, u16>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            cases: BTreeMap::new(),
            next_id: 1,
            failures: HashMap::new(),
        }
    }
}

impl Store {
    /// Add a case for `order_id` and return its id.
    pub fn insert(&mut self, order_id: &str, order: Value) -> u64 {
        let case_id = self.next_id;
        self.next_id += 1;
        self.cases.insert(
            case_id,
            MockCase {
                case_id,
                order_id: order_id.to_string(),
                order,
                analysis: None,
                entries: Vec::new(),
            },
        );
        case_id
    }

    pub fn get(&self, case_id: u64) -> Option<&MockCase> {
        self.cases.get(&case_id)
    }

    pub fn by_order(&self, order_id: &str) -> Option<&MockCase> {
        self.cases.values().find(|c| c.order_id == order_id)
    }

    /// Finish scoring a case. Returns false if the case does not exist.
    pub fn set_analysis(&mut self, case_id: u64, analysis: Value) -> bool {
        match self.cases.get_mut(&case_id) {
            Some(case) => {
                case.analysis = Some(analysis);
                true
            }
            None => false,
        }
    }

    pub fn add_entry(&mut self, case_id: u64, entry: Value) -> bool {
        match self.cases.get_mut(&case_id) {
            Some(case) => {
                case.entries.push(entry);
                true
            }
            None => false,
        }
    }

    /// Answer every request for exactly `path` (e.g. `/v2/cases/1/analysis`)
    /// with `status` and a plain-text body.
    pub fn fail_path(&mut self, path: &str, status: u16) {
        self.failures.insert(path.to_string(), status);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    api_key: Arc<str>,
}

pub fn app(api_key: &str) -> Router {
    app_with_store(api_key, Db::default())
}

/// Router backed by a store the caller keeps a handle to.
pub fn app_with_store(api_key: &str, db: Db) -> Router {
    let state = AppState {
        db,
        api_key: Arc::from(api_key),
    };

    let v2 = Router::new()
        .route("/cases", post(create_case))
        .route("/cases/{case_id}", get(get_case))
        .route("/cases/{case_id}/entries", get(get_case_entries))
        .route("/cases/{case_id}/analysis", get(get_case_analysis))
        .route("/orders/{order_id}/case", get(get_order_case))
        .route("/orders/{order_id}/case/entries", get(get_order_case_entries))
        .route("/orders/{order_id}/case/analysis", get(get_order_case_analysis));

    Router::new()
        .nest("/v2", v2)
        .route("/echo/cases", post(echo_case))
        .layer(middleware::from_fn_with_state(state.clone(), guard))
        .with_state(state)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// Rejects bad credentials and applies injected failures before routing.
async fn guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !authorized(request.headers(), &state.api_key) {
        debug!(path = %request.uri().path(), "rejecting request without valid credentials");
        return error(StatusCode::UNAUTHORIZED, "invalid API key");
    }

    let forced = state.db.read().await.failures.get(request.uri().path()).copied();
    if let Some(code) = forced {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, format!("injected failure {code}")).into_response();
    }

    next.run(request).await
}

/// Basic credentials must be `<api key>:` with an empty password.
fn authorized(headers: &HeaderMap, api_key: &str) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
    else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    match String::from_utf8(decoded) {
        Ok(credentials) => credentials.split_once(':') == Some((api_key, "")),
        Err(_) => false,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "case not found")
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// `orderId` at the top level, or nested under `purchase`.
fn order_id(payload: &Value) -> Option<String> {
    let id = payload
        .get("orderId")
        .or_else(|| payload.get("purchase").and_then(|p| p.get("orderId")))?;
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

async fn create_case(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        return error(StatusCode::BAD_REQUEST, "content-type must be application/json");
    }
    if content_length(&headers) != Some(body.len()) {
        return error(StatusCode::BAD_REQUEST, "content-length does not match body");
    }

    let Ok(payload) = serde_json::from_slice::<Value>(&body) else {
        return error(StatusCode::BAD_REQUEST, "body is not valid JSON");
    };
    let Some(order_id) = order_id(&payload) else {
        return error(StatusCode::BAD_REQUEST, "missing orderId");
    };

    let case_id = state.db.write().await.insert(&order_id, payload);
    info!(case_id, %order_id, "created case");
    (StatusCode::CREATED, Json(json!({ "investigationId": case_id }))).into_response()
}

async fn get_case(State(state): State<AppState>, Path(case_id): Path<u64>) -> Response {
    let db = state.db.read().await;
    db.get(case_id).map_or_else(not_found, |c| Json(c.view()).into_response())
}

async fn get_case_entries(State(state): State<AppState>, Path(case_id): Path<u64>) -> Response {
    let db = state.db.read().await;
    db.get(case_id).map_or_else(not_found, entries)
}

async fn get_case_analysis(State(state): State<AppState>, Path(case_id): Path<u64>) -> Response {
    let db = state.db.read().await;
    db.get(case_id).map_or_else(not_found, analysis)
}

async fn get_order_case(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    let db = state.db.read().await;
    db.by_order(&order_id)
        .map_or_else(not_found, |c| Json(c.view()).into_response())
}

async fn get_order_case_entries(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    let db = state.db.read().await;
    db.by_order(&order_id).map_or_else(not_found, entries)
}

async fn get_order_case_analysis(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    let db = state.db.read().await;
    db.by_order(&order_id).map_or_else(not_found, analysis)
}

fn entries(case: &MockCase) -> Response {
    Json(json!({ "caseId": case.case_id, "entries": case.entries })).into_response()
}

fn analysis(case: &MockCase) -> Response {
    match &case.analysis {
        Some(analysis) => Json(analysis.clone()).into_response(),
        None => (
            StatusCode::ACCEPTED,
            Json(json!({ "caseId": case.case_id, "status": "PROCESSING" })),
        )
            .into_response(),
    }
}

/// Reflects the received request so a client can check its own encoding.
async fn echo_case(headers: HeaderMap, body: Bytes) -> Response {
    let text = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let payload = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    (
        StatusCode::CREATED,
        Json(json!({
            "contentType": text(header::CONTENT_TYPE),
            "contentLength": content_length(&headers),
            "bodyLength": body.len(),
            "authorization": text(header::AUTHORIZATION),
            "accept": text(header::ACCEPT),
            "payload": payload,
        })),
    )
        .into_response()
}
