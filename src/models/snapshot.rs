use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, FixedOffset};

use super::record::CheckInRecord;

/// The most recent successful fetch of all check-in records.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub fetched_at: DateTime<FixedOffset>,
    pub records: Arc<Vec<CheckInRecord>>,
}

/// Ticket handed out when a fetch starts. Only a fetch holding a newer ticket
/// than the installed snapshot may replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Shared holder of the latest record snapshot.
#[derive(Clone, Default)]
pub struct RecordStore {
    next: Arc<AtomicU64>,
    current: Arc<RwLock<Option<Snapshot>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install the result of a fetch. Returns false (and keeps the current
    /// snapshot) when a later-started fetch has already landed.
    pub fn install(
        &self,
        ticket: FetchTicket,
        records: Vec<CheckInRecord>,
        fetched_at: DateTime<FixedOffset>,
    ) -> bool {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = current.as_ref() {
            if existing.generation >= ticket.0 {
                log::debug!(
                    "Discarding stale records fetch #{} (installed #{})",
                    ticket.0,
                    existing.generation
                );
                return false;
            }
        }
        *current = Some(Snapshot {
            generation: ticket.0,
            fetched_at,
            records: Arc::new(records),
        });
        true
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
