//! Support Desk Routing Core
//!
//! This library provides:
//! - A validated desk registry with capacity-aware load tracking
//! - A deterministic routing policy engine (historical override, specialist
//!   escalation, normal tier order, global saturation fallback)
//! - An append-only waiting queue for force-assigned tickets
//! - The routing service exposing `AssignTicket`, `GetDeskStatus` and
//!   `ListQueue`, plus ticket release, statistics and an event bus
//!
//! Everything here is synchronous and free of network I/O; the async
//! pipeline that gathers upstream signals lives in `desk-agents`.
//!
//! # Usage
//!
//! ```no_run
//! use routing::{AssignTicketRequest, RegistryConfig, RoutingService};
//!
//! let service = RoutingService::from_config(&RegistryConfig::default())?;
//! let result = service.assign_ticket(&AssignTicketRequest::new("INC-1001"))?;
//! println!("{} -> {}", result.ticket_id, result.assigned_desk);
//! # Ok::<(), routing::RoutingError>(())
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod desk;
pub mod error;
pub mod events;
pub mod policy;
pub mod queue;
pub mod rules;
pub mod selector;
pub mod service;
pub mod stats;
pub mod ticket;

pub use config::{DeskConfig, RegistryConfig};
pub use desk::{
    CapacityPolicy, Desk, DeskRegistry, DeskStatus, DeskTable, SharedDeskRegistry, Tier,
};
pub use error::{Result, RoutingError};
pub use events::{EventBus, EventFilter, RoutingEvent, SharedEventBus};
pub use policy::{PolicyConfig, RoutingDecision, RoutingInput, RoutingPolicyEngine, RoutingRule};
pub use queue::{QueueEntry, QueueSnapshot, WaitingQueue};
pub use rules::{ProductRule, ProductRuleTable};
pub use selector::{DeskSelector, ProductMatch};
pub use service::{RoutingService, SharedRoutingService, TRACE_SEPARATOR};
pub use stats::RoutingStatsSnapshot;
pub use ticket::{
    AssignTicketRequest, Complexity, IncidenceType, RoutingResult, TimeCategory, Urgency,
};
