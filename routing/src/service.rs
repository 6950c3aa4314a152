//! Routing Service — the `AssignTicket` / `GetDeskStatus` / `ListQueue` surface
//!
//! Owns the injected desk registry, the policy engine, the waiting queue,
//! the event bus and the statistics counters.
//!
//! ```text
//! assign_ticket:
//!   registry.transact {            // one critical section
//!       engine.decide(table)
//!       count available desks in the chosen tier
//!       table.increment_load(desk)
//!   }
//!   queue.enqueue (when queued) -> publish event -> record stats
//! ```

use crate::config::RegistryConfig;
use crate::desk::{DeskRegistry, DeskStatus, SharedDeskRegistry};
use crate::error::Result;
use crate::events::{EventBus, EventFilter, FilteredReceiver, RoutingEvent, SharedEventBus};
use crate::policy::{decision_confidence, RoutingInput, RoutingPolicyEngine};
use crate::queue::{QueueSnapshot, WaitingQueue};
use crate::stats::{RoutingStats, RoutingStatsSnapshot};
use crate::ticket::{AssignTicketRequest, RoutingResult};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Separator between trace segments in `RoutingResult::reasoning`
pub const TRACE_SEPARATOR: &str = " | ";

/// Shared reference to a RoutingService
pub type SharedRoutingService = Arc<RoutingService>;

pub struct RoutingService {
    registry: SharedDeskRegistry,
    engine: RoutingPolicyEngine,
    queue: WaitingQueue,
    events: SharedEventBus,
    stats: RoutingStats,
}

impl RoutingService {
    pub fn new(registry: SharedDeskRegistry, engine: RoutingPolicyEngine) -> Self {
        Self {
            registry,
            engine,
            queue: WaitingQueue::new(),
            events: EventBus::new().shared(),
            stats: RoutingStats::new(),
        }
    }

    /// Build registry, rules and tier order from validated configuration
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let registry = DeskRegistry::from_config(config)?.shared();
        let engine = RoutingPolicyEngine::new(config.build_policy()?, config.build_rules());
        Ok(Self::new(registry, engine))
    }

    /// Publish to an existing bus instead of a private one
    pub fn with_event_bus(mut self, events: SharedEventBus) -> Self {
        self.events = events;
        self
    }

    /// Create a shared reference to this service
    pub fn shared(self) -> SharedRoutingService {
        Arc::new(self)
    }

    pub fn registry(&self) -> &SharedDeskRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &RoutingPolicyEngine {
        &self.engine
    }

    /// Decide and reserve a desk for one ticket.
    ///
    /// Saturation is not an error: the ticket is force-assigned and queued.
    /// Only configuration defects, unknown desks and poisoned locks fail.
    pub fn assign_ticket(&self, request: &AssignTicketRequest) -> Result<RoutingResult> {
        let started = Instant::now();
        let input = RoutingInput {
            recommended_tier: request.recommended_tier,
            complexity: request.complexity,
            attention_type: &request.attention_type,
            product: &request.product,
            via_historical_match: request.via_historical,
        };

        let (decision, available) = self.registry.transact(|table| {
            let decision = self.engine.decide(table, &input)?;
            let available = table.available_count(decision.tier);
            table.increment_load(&decision.desk)?;
            Ok((decision, available))
        })?;

        let confidence = decision_confidence(request.complexity_score, available);
        let timestamp = Utc::now();

        if decision.queued {
            self.queue.enqueue(&request.ticket_id, &decision.desk)?;
            warn!(
                ticket_id = %request.ticket_id,
                desk = %decision.desk,
                utilization = decision.utilization_pct,
                "All eligible desks saturated, ticket force-assigned"
            );
            self.events.publish(RoutingEvent::TicketQueued {
                ticket_id: request.ticket_id.clone(),
                desk: decision.desk.clone(),
                tier: decision.tier,
                rule: decision.rule,
                timestamp,
            });
        } else {
            self.events.publish(RoutingEvent::TicketAssigned {
                ticket_id: request.ticket_id.clone(),
                desk: decision.desk.clone(),
                tier: decision.tier,
                rule: decision.rule,
                utilization_pct: decision.utilization_pct,
                timestamp,
            });
        }

        self.stats.record_assignment(
            confidence,
            decision.queued,
            request.via_historical,
            started.elapsed(),
        );
        info!(
            ticket_id = %request.ticket_id,
            desk = %decision.desk,
            tier = %decision.tier,
            rule = %decision.rule,
            utilization = decision.utilization_pct,
            confidence,
            "Ticket assigned"
        );

        let mut trace = request.upstream_trace.clone();
        trace.push(decision.reason);

        Ok(RoutingResult {
            ticket_id: request.ticket_id.clone(),
            assigned_desk: decision.desk,
            assigned_tier: decision.tier,
            queued: decision.queued,
            complexity: request.complexity,
            complexity_score: request.complexity_score,
            estimated_hours: request.estimated_hours,
            time_category: request.effective_time_category(),
            via_historical: request.via_historical,
            resolution_reference: request.resolution_reference.clone(),
            urgency: request.urgency,
            confidence,
            reasoning: trace.join(TRACE_SEPARATOR),
            timestamp,
        })
    }

    /// `GetDeskStatus`
    pub fn desk_status(&self) -> Result<BTreeMap<String, DeskStatus>> {
        self.registry.status()
    }

    /// `ListQueue`
    pub fn list_queue(&self) -> Result<QueueSnapshot> {
        self.queue.snapshot()
    }

    /// Free one slot on `desk` when a ticket is closed. Returns the new load.
    pub fn release_ticket(&self, desk: &str) -> Result<u32> {
        let current_load = self.registry.release_load(desk)?;
        self.stats.record_release();
        self.events.publish(RoutingEvent::LoadReleased {
            desk: desk.to_string(),
            current_load,
            timestamp: Utc::now(),
        });
        info!(desk = %desk, load = current_load, "Desk slot released");
        Ok(current_load)
    }

    pub fn stats(&self) -> RoutingStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoutingEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_filtered(&self, filter: EventFilter) -> FilteredReceiver {
        self.events.subscribe_filtered(filter)
    }
}
