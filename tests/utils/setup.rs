#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

use matchlog::{AppState, InMemoryRecordStore, Player, RecordStore};

use super::mocks::FlakyStore;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub fn squad() -> Vec<Player> {
    vec![
        Player::new("Anna", "Back", "1"),
        Player::new("Bo", "Keeper", "1"),
        Player::new("Cille", "Fløj", "2"),
    ]
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryRecordStore>,
}

pub struct TestAppBuilder {
    players: Vec<Player>,
    failing_appends: usize,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            players: squad(),
            failing_appends: 0,
        }
    }

    pub fn with_players(mut self, players: Vec<Player>) -> Self {
        self.players = players;
        self
    }

    /// The next `count` event batches fail before reaching the store
    pub fn with_failing_appends(mut self, count: usize) -> Self {
        self.failing_appends = count;
        self
    }

    pub fn build(self) -> TestApp {
        let store = Arc::new(InMemoryRecordStore::with_players(self.players));
        let backing: Arc<dyn RecordStore> = if self.failing_appends > 0 {
            Arc::new(FlakyStore::new(Arc::clone(&store), self.failing_appends))
        } else {
            store.clone()
        };

        let state = AppState::new(backing, Duration::from_secs(600));
        TestApp {
            router: matchlog::router(state),
            store,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    // ========================================================================
    // Wizard actions
    // ========================================================================

    pub async fn create_falcon_match(&self) -> String {
        let (status, view) = self
            .post(
                "/session/match",
                serde_json::json!({"team_number": "1", "date": "2024-03-01", "opponent": "FC Falcon"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{view}");
        view["current_match"]["match_id"].as_str().unwrap().to_string()
    }

    pub async fn select_players(&self, names: &[&str]) -> (StatusCode, Value) {
        self.post("/session/players", serde_json::json!({ "players": names }))
            .await
    }

    /// Arms both slots and registers
    pub async fn record(&self, event_type: &str, player: &str) -> (StatusCode, Value) {
        let (status, _) = self
            .post("/session/event-type", serde_json::json!({ "event_type": event_type }))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = self
            .post("/session/player", serde_json::json!({ "name": player }))
            .await;
        assert_eq!(status, StatusCode::OK);
        self.post_empty("/session/register").await
    }

    pub async fn finish(&self, ours: u32, theirs: u32, mvp: &str, comment: &str) -> (StatusCode, Value) {
        self.post(
            "/session/finish",
            serde_json::json!({"ours": ours, "theirs": theirs, "mvp": mvp, "comment": comment}),
        )
        .await
    }
}
