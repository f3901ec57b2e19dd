use std::time::Duration;

use crate::backend::BackendClient;
use crate::clock::Clock;
use crate::handlers::records;
use crate::models::RecordStore;

/// Keep the record snapshot warm so the stale fallback has recent data.
pub fn spawn_refresh(backend: BackendClient, store: RecordStore, clock: Clock, every: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match records::refresh(&backend, &store, &clock).await {
                Ok(snapshot) => log::info!(
                    "Background refresh: {} records (generation {})",
                    snapshot.records.len(),
                    snapshot.generation
                ),
                Err(e) => log::error!("Background records refresh failed: {e}"),
            }
        }
    });
}
