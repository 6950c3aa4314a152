//! Routing statistics counters

use crate::policy::is_automatic;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters updated on every assignment
#[derive(Debug, Default)]
pub struct RoutingStats {
    processed: AtomicU64,
    automatic: AtomicU64,
    manual_review: AtomicU64,
    queued: AtomicU64,
    via_historical: AtomicU64,
    released: AtomicU64,
    decision_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStatsSnapshot {
    pub processed: u64,
    /// Decisions with confidence >= 0.70
    pub automatic: u64,
    /// Decisions where manual review is suggested
    pub manual_review: u64,
    pub queued: u64,
    pub via_historical: u64,
    pub released: u64,
    pub mean_decision_micros: u64,
}

impl RoutingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_assignment(
        &self,
        confidence: f64,
        queued: bool,
        via_historical: bool,
        elapsed: Duration,
    ) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if is_automatic(confidence) {
            self.automatic.fetch_add(1, Ordering::Relaxed);
        } else {
            self.manual_review.fetch_add(1, Ordering::Relaxed);
        }
        if queued {
            self.queued.fetch_add(1, Ordering::Relaxed);
        }
        if via_historical {
            self.via_historical.fetch_add(1, Ordering::Relaxed);
        }
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.decision_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RoutingStatsSnapshot {
        let processed = self.processed.load(Ordering::Relaxed);
        let total_micros = self.decision_micros.load(Ordering::Relaxed);
        RoutingStatsSnapshot {
            processed,
            automatic: self.automatic.load(Ordering::Relaxed),
            manual_review: self.manual_review.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            via_historical: self.via_historical.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            mean_decision_micros: total_micros.checked_div(processed).unwrap_or(0),
        }
    }
}
