//! Desk agents — async ticket routing pipeline
//!
//! Gathers the upstream signals for a ticket (historical precedent,
//! resolution-time estimate, complexity) from the agent services and hands
//! them to the `routing` core for assignment.

pub mod collaborators;
pub mod config;
pub mod health;
pub mod pipeline;
pub mod urgency;

pub use collaborators::{
    CollaboratorError, Collaborators, ComplexityAssessment, ComplexityEvaluator, Estimate,
    Estimator, Historical, Precedent, TicketFeatures,
};
pub use config::ServiceConfig;
pub use health::{check_agents, AgentHealth, Readiness, ReadinessReport};
pub use pipeline::{PipelineError, PipelineOrchestrator, TicketInput};
pub use urgency::{detect_urgency, enrich_summary};
