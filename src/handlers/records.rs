use actix_web::web;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::backend::{BackendClient, BackendError};
use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::{RecordStore, Snapshot};

/// Records a handler works from, plus whether they are a fallback copy.
pub struct Loaded {
    pub snapshot: Snapshot,
    pub freshness: Freshness,
}

/// Serialized next to list responses so clients can tell live data from a fallback.
#[derive(Debug, Clone, Serialize)]
pub struct Freshness {
    pub fetched_at: DateTime<FixedOffset>,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Fetch every record and install it as the newest snapshot. If a fetch that
/// started later has already landed, that one is returned instead.
pub async fn refresh(
    backend: &BackendClient,
    store: &RecordStore,
    clock: &Clock,
) -> Result<Snapshot, BackendError> {
    let ticket = store.begin_fetch();
    let records = backend.fetch_records().await?;
    if !store.install(ticket, records, clock.now()) {
        log::debug!("A newer records fetch won; serving it");
    }
    store
        .latest()
        .ok_or_else(|| BackendError::Decode("record snapshot missing after install".to_string()))
}

/// Load records for a request. With `fetch` false an existing snapshot is
/// reused as-is. A failed fetch falls back to the last snapshot, flagged stale.
pub async fn load(
    backend: &web::Data<BackendClient>,
    store: &web::Data<RecordStore>,
    clock: &web::Data<Clock>,
    fetch: bool,
) -> Result<Loaded, AppError> {
    if !fetch {
        if let Some(snapshot) = store.latest() {
            return Ok(fresh(snapshot));
        }
    }

    match refresh(backend, store, clock).await {
        Ok(snapshot) => Ok(fresh(snapshot)),
        Err(e) => {
            log::warn!("Records fetch failed: {e}");
            let Some(snapshot) = store.latest() else {
                return Err(e.into());
            };
            let notice = format!(
                "Could not reach the attendance records ({e}). Showing data from {}.",
                snapshot.fetched_at.format("%Y-%m-%d %H:%M")
            );
            let freshness = Freshness {
                fetched_at: snapshot.fetched_at,
                stale: true,
                notice: Some(notice),
            };
            Ok(Loaded { snapshot, freshness })
        }
    }
}

fn fresh(snapshot: Snapshot) -> Loaded {
    let freshness = Freshness {
        fetched_at: snapshot.fetched_at,
        stale: false,
        notice: None,
    };
    Loaded { snapshot, freshness }
}
