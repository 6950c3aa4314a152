//! Routing event bus
//!
//! Publishes assignment, queueing and release events over a Tokio broadcast
//! channel. Publishing never blocks and never fails; events sent while no
//! one is subscribed are dropped.

use crate::desk::Tier;
use crate::policy::RoutingRule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Everything the routing service announces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutingEvent {
    /// A ticket was placed on a desk below capacity
    TicketAssigned {
        ticket_id: String,
        desk: String,
        tier: Tier,
        rule: RoutingRule,
        utilization_pct: f64,
        timestamp: DateTime<Utc>,
    },

    /// A ticket was force-assigned and recorded in the waiting queue
    TicketQueued {
        ticket_id: String,
        desk: String,
        tier: Tier,
        rule: RoutingRule,
        timestamp: DateTime<Utc>,
    },

    /// A slot was freed on a desk
    LoadReleased {
        desk: String,
        current_load: u32,
        timestamp: DateTime<Utc>,
    },
}

impl RoutingEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TicketAssigned { .. } => "ticket_assigned",
            Self::TicketQueued { .. } => "ticket_queued",
            Self::LoadReleased { .. } => "load_released",
        }
    }

    pub fn desk(&self) -> &str {
        match self {
            Self::TicketAssigned { desk, .. }
            | Self::TicketQueued { desk, .. }
            | Self::LoadReleased { desk, .. } => desk,
        }
    }

    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            Self::TicketAssigned { ticket_id, .. } | Self::TicketQueued { ticket_id, .. } => {
                Some(ticket_id)
            }
            Self::LoadReleased { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::TicketAssigned { timestamp, .. }
            | Self::TicketQueued { timestamp, .. }
            | Self::LoadReleased { timestamp, .. } => *timestamp,
        }
    }
}

/// Broadcast bus for [`RoutingEvent`]s
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<RoutingEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Create a shared reference to this event bus
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all subscribers. Returns the number of receivers.
    pub fn publish(&self, event: RoutingEvent) -> usize {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => {
                debug!(event_type, receivers = count, "Event published");
                count
            }
            Err(_) => {
                debug!(event_type, "Event published (no receivers)");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoutingEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to events matching `filter` only
    pub fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver {
        FilteredReceiver {
            receiver: self.subscribe(),
            filter,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event filter for selective subscription
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub desk: Option<String>,
    pub event_types: Option<Vec<String>>,
}

impl EventFilter {
    /// Create a new empty filter (matches all events)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn desk(mut self, desk: &str) -> Self {
        self.desk = Some(desk.to_string());
        self
    }

    pub fn types(mut self, event_types: Vec<&str>) -> Self {
        self.event_types = Some(event_types.into_iter().map(String::from).collect());
        self
    }

    pub fn matches(&self, event: &RoutingEvent) -> bool {
        if let Some(ref desk) = self.desk {
            if event.desk() != desk {
                return false;
            }
        }
        if let Some(ref types) = self.event_types {
            if !types.iter().any(|t| t == event.event_type()) {
                return false;
            }
        }
        true
    }
}

/// Receiver that only yields events passing its filter
pub struct FilteredReceiver {
    receiver: broadcast::Receiver<RoutingEvent>,
    filter: EventFilter,
}

impl FilteredReceiver {
    pub async fn recv(&mut self) -> Result<RoutingEvent, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }
}
