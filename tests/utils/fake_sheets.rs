//! Local stand-in for the OAuth token endpoint and the Sheets v4 REST API
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use matchlog::store::{SheetsConfig, SheetsRecordStore};

pub const TEST_TOKEN: &str = "test-access-token";
pub const ROSTER_ID: &str = "roster-id";
pub const STATS_ID: &str = "stats-id";
pub const EVENT_SHEET: &str = "Kampdata";

const PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");

// ============================================================================
// Recorded traffic
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn is_append(&self) -> bool {
        self.method == Method::POST && self.path.ends_with(":append")
    }

    pub fn is_add_sheet(&self) -> bool {
        self.method == Method::POST && self.path.ends_with(":batchUpdate")
    }

    pub fn is_update(&self) -> bool {
        self.method == Method::PUT
    }
}

#[derive(Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    token_bodies: Vec<String>,
    // spreadsheet id -> worksheets in tab order
    spreadsheets: HashMap<String, Vec<(String, Vec<Vec<Value>>)>>,
}

impl FakeState {
    fn worksheet(&mut self, spreadsheet: &str, title: &str) -> Option<&mut Vec<Vec<Value>>> {
        self.spreadsheets
            .get_mut(spreadsheet)?
            .iter_mut()
            .find(|(t, _)| t == title)
            .map(|(_, rows)| rows)
    }
}

type SharedFake = Arc<Mutex<FakeState>>;

// ============================================================================
// Server
// ============================================================================

pub struct FakeSheets {
    state: SharedFake,
    addr: SocketAddr,
    key_file: PathBuf,
}

impl FakeSheets {
    /// Serves a roster spreadsheet with a `truppen` worksheet and an empty stats spreadsheet
    pub async fn start(roster_rows: Vec<Vec<&str>>) -> Self {
        // Requests to the local fake must not be routed through a proxy
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        std::env::set_var("no_proxy", "127.0.0.1,localhost");

        let mut state = FakeState::default();
        let roster = roster_rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| json!(c)).collect())
            .collect();
        state
            .spreadsheets
            .insert(ROSTER_ID.to_string(), vec![("truppen".to_string(), roster)]);
        state
            .spreadsheets
            .insert(STATS_ID.to_string(), vec![(EVENT_SHEET.to_string(), Vec::new())]);
        let state = Arc::new(Mutex::new(state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/token", post(token))
            .fallback(sheets_api)
            .with_state(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let key_file = std::env::temp_dir().join(format!("matchlog-service-account-{}.json", addr.port()));
        let key = json!({
            "client_email": "stats@matchlog-test.iam.gserviceaccount.com",
            "private_key": PRIVATE_KEY,
            "token_uri": format!("http://{addr}/token"),
        });
        std::fs::write(&key_file, key.to_string()).unwrap();

        Self {
            state,
            addr,
            key_file,
        }
    }

    pub fn config(&self) -> SheetsConfig {
        SheetsConfig {
            roster_spreadsheet_id: ROSTER_ID.to_string(),
            roster_worksheet: "truppen".to_string(),
            roster_header_rows: 5,
            stats_spreadsheet_id: STATS_ID.to_string(),
            matches_worksheet: "Matches".to_string(),
            service_account_file: self.key_file.clone(),
            api_base: format!("http://{}/v4", self.addr),
        }
    }

    pub fn store(&self) -> SheetsRecordStore {
        SheetsRecordStore::from_config(self.config()).unwrap()
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn token_bodies(&self) -> Vec<String> {
        self.state.lock().await.token_bodies.clone()
    }

    pub async fn titles(&self, spreadsheet: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .spreadsheets
            .get(spreadsheet)
            .map(|sheets| sheets.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn rows(&self, spreadsheet: &str, title: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .await
            .worksheet(spreadsheet, title)
            .cloned()
            .unwrap_or_default()
    }
}

async fn token(State(fake): State<SharedFake>, body: String) -> Json<Value> {
    fake.lock().await.token_bodies.push(body);
    Json(json!({
        "access_token": TEST_TOKEN,
        "expires_in": 3600,
        "token_type": "Bearer",
    }))
}

fn decode(raw: &str) -> String {
    raw.replace("%27", "'")
        .replace("%21", "!")
        .replace("%3A", ":")
        .replace("%20", " ")
}

/// `'Title'!A1:I1` → (`Title`, `A1:I1`)
fn split_range(range: &str) -> Option<(String, String)> {
    let (title, cells) = range.rsplit_once("'!")?;
    let title = title.strip_prefix('\'')?.replace("''", "'");
    Some((title, cells.to_string()))
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": { "code": status.as_u16(), "message": message } })))
}

async fn sheets_api(
    State(fake): State<SharedFake>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let path = decode(uri.path());
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    let mut state = fake.lock().await;
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if authorization.as_deref() != Some(&format!("Bearer {TEST_TOKEN}")) {
        return error(StatusCode::UNAUTHORIZED, "missing or wrong bearer token");
    }
    let Some(rest) = path.strip_prefix("/v4/spreadsheets/") else {
        return error(StatusCode::NOT_FOUND, "unknown endpoint");
    };

    let Some((spreadsheet, range)) = rest.split_once("/values/") else {
        // Spreadsheet-level calls: metadata and batchUpdate
        if let Some(spreadsheet) = rest.strip_suffix(":batchUpdate") {
            let title = body["requests"][0]["addSheet"]["properties"]["title"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let Some(sheets) = state.spreadsheets.get_mut(spreadsheet) else {
                return error(StatusCode::NOT_FOUND, "spreadsheet not found");
            };
            sheets.push((title, Vec::new()));
            return (StatusCode::OK, Json(json!({ "replies": [{}] })));
        }

        let Some(sheets) = state.spreadsheets.get(rest) else {
            return error(StatusCode::NOT_FOUND, "spreadsheet not found");
        };
        let sheets: Vec<Value> = sheets
            .iter()
            .map(|(title, _)| json!({ "properties": { "title": title } }))
            .collect();
        return (StatusCode::OK, Json(json!({ "sheets": sheets })));
    };

    let spreadsheet = spreadsheet.to_string();
    let append = range.ends_with(":append");
    let Some((title, cells)) = split_range(range.trim_end_matches(":append")) else {
        return error(StatusCode::BAD_REQUEST, "Unable to parse range");
    };
    let Some(rows) = state.worksheet(&spreadsheet, &title) else {
        return error(StatusCode::BAD_REQUEST, &format!("Unable to parse range: {title}"));
    };

    let sent: Vec<Vec<Value>> = serde_json::from_value(body["values"].clone()).unwrap_or_default();
    match method {
        Method::GET if cells == "1:1" => {
            let header: Vec<_> = rows.iter().take(1).cloned().collect();
            (StatusCode::OK, Json(json!({ "values": header })))
        }
        Method::GET => (StatusCode::OK, Json(json!({ "values": rows.clone() }))),
        Method::PUT => {
            for (index, row) in sent.into_iter().enumerate() {
                match rows.get_mut(index) {
                    Some(existing) => *existing = row,
                    None => rows.push(row),
                }
            }
            (StatusCode::OK, Json(json!({})))
        }
        Method::POST if append => {
            rows.extend(sent);
            (StatusCode::OK, Json(json!({})))
        }
        _ => error(StatusCode::METHOD_NOT_ALLOWED, "unsupported"),
    }
}
