use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::db::MappingStore;

/// Delete every mapping that has expired by now. Store errors are logged and
/// swallowed so a failing pass never stops the sweeper.
pub async fn sweep_once(store: &dyn MappingStore) -> u64 {
    match store.purge_expired(Utc::now()).await {
        Ok(0) => 0,
        Ok(n) => {
            tracing::info!("Expiry sweep removed {} mapping(s)", n);
            n
        }
        Err(e) => {
            tracing::error!("Expiry sweep failed: {:?}", e);
            0
        }
    }
}

/// Run [`sweep_once`] every `every` for the lifetime of the process.
pub fn spawn_sweeper(store: Arc<dyn MappingStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&*store).await;
        }
    })
}
