use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{RecordStore, StoreError};
use crate::model::Player;

/// Time-bounded memo of the roster read. Failed reads are not cached.
#[derive(Clone)]
pub struct RosterCache {
    store: Arc<dyn RecordStore>,
    cache: Cache<(), Arc<Vec<Player>>>,
}

impl RosterCache {
    pub fn new(store: Arc<dyn RecordStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { store, cache }
    }

    #[instrument(skip(self))]
    pub async fn players(&self) -> Result<Arc<Vec<Player>>, StoreError> {
        let store = Arc::clone(&self.store);
        self.cache
            .try_get_with((), async move {
                debug!("Roster cache miss, reading from store");
                store.list_players().await.map(Arc::new)
            })
            .await
            .map_err(|err| (*err).clone())
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}
