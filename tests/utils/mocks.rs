#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use matchlog::{Event, InMemoryRecordStore, Match, Player, RecordStore, StoreError};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// In-memory store whose next `failures` event appends fail with a network error
pub struct FlakyStore {
    inner: Arc<InMemoryRecordStore>,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<InMemoryRecordStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }

    fn should_fail(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        self.inner.list_players().await
    }

    async fn append_match(&self, record: &Match) -> Result<(), StoreError> {
        self.inner.append_match(record).await
    }

    async fn append_events(&self, events: &[Event]) -> Result<(), StoreError> {
        if self.should_fail() {
            return Err(StoreError::Network("connection reset".to_string()));
        }
        self.inner.append_events(events).await
    }

    async fn list_matches(&self) -> Result<Vec<Match>, StoreError> {
        self.inner.list_matches().await
    }

    async fn events_for_match(&self, match_id: &str) -> Result<Vec<Event>, StoreError> {
        self.inner.events_for_match(match_id).await
    }
}
