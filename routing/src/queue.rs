//! Waiting Queue — append-only record of force-assigned tickets
//!
//! Entries are never removed or reprocessed; operators read the queue and
//! act on it manually.

use crate::error::{Result, RoutingError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub ticket_id: String,
    /// Desk the ticket was force-assigned to
    pub target_desk: String,
    pub timestamp: DateTime<Utc>,
}

/// `ListQueue` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub count: usize,
    pub entries: Vec<QueueEntry>,
}

#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: Mutex<Vec<QueueEntry>>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<QueueEntry>>> {
        self.entries.lock().map_err(|_| RoutingError::LockPoisoned {
            resource: "waiting queue",
        })
    }

    /// Append an entry; duplicates are kept.
    pub fn enqueue(&self, ticket_id: &str, target_desk: &str) -> Result<QueueEntry> {
        let entry = QueueEntry {
            ticket_id: ticket_id.to_string(),
            target_desk: target_desk.to_string(),
            timestamp: Utc::now(),
        };
        let mut entries = self.lock()?;
        entries.push(entry.clone());
        info!(
            ticket_id = %ticket_id,
            desk = %target_desk,
            depth = entries.len(),
            "Ticket added to waiting queue"
        );
        Ok(entry)
    }

    /// All entries in insertion order
    pub fn list(&self) -> Result<Vec<QueueEntry>> {
        Ok(self.lock()?.clone())
    }

    pub fn snapshot(&self) -> Result<QueueSnapshot> {
        let entries = self.list()?;
        Ok(QueueSnapshot {
            count: entries.len(),
            entries,
        })
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_enqueue_preserves_order_and_duplicates() {
        let queue = WaitingQueue::new();
        queue.enqueue("T-1", "Service Desk 1").unwrap();
        queue.enqueue("T-2", "Service Desk 2").unwrap();
        queue.enqueue("T-1", "Service Desk 1").unwrap();

        let snapshot = queue.snapshot().unwrap();
        assert_eq!(snapshot.count, 3);
        let ids: Vec<&str> = snapshot.entries.iter().map(|e| e.ticket_id.as_str()).collect();
        assert_eq!(ids, vec!["T-1", "T-2", "T-1"]);
        assert!(snapshot.entries[0].timestamp <= snapshot.entries[1].timestamp);
    }

    #[test]
    fn test_empty_queue() {
        let queue = WaitingQueue::new();
        assert!(queue.is_empty().unwrap());
        assert_eq!(queue.snapshot().unwrap().count, 0);
    }

    #[test]
    fn test_single_writer_order_under_concurrency() {
        let queue = Arc::new(WaitingQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|w| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        queue.enqueue(&format!("{}-{}", w, i), "SD1").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let entries = queue.list().unwrap();
        assert_eq!(entries.len(), 100);
        for w in 0..4 {
            let seq: Vec<usize> = entries
                .iter()
                .filter_map(|e| e.ticket_id.strip_prefix(&format!("{}-", w)))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..25).collect::<Vec<_>>());
        }
    }
}
