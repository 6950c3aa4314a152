//! Collaborator contracts — the Historical, Estimator and Complexity agents
//!
//! Each collaborator is an async trait so the pipeline can run against the
//! HTTP agents in production and against doubles in tests. Every call
//! returns a `Result`; the orchestrator decides what a failure means.
//!
//! ```text
//! Collaborator | Input                       | Default on failure
//! -------------|-----------------------------|-------------------------------
//! Historical   | ticket features             | found = false
//! Estimator    | ticket features             | hours = None, category = None
//! Complexity   | ticket features + hours     | Medium, 50.0, General
//! ```

pub mod http;

pub use http::{AgentEndpoint, HttpComplexity, HttpEstimator, HttpHistorical};

use async_trait::async_trait;
use routing::{Complexity, IncidenceType, Tier, TimeCategory, Urgency};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single collaborator call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Ticket fields every collaborator sees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketFeatures {
    pub ticket_id: String,
    pub incidence_type: IncidenceType,
    pub attention_type: String,
    pub area: String,
    pub product: String,
    /// Summary after enrichment
    pub summary: String,
    pub urgency: Urgency,
}

/// Historical agent answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precedent {
    pub found: bool,
    pub suggested_tier: Option<Tier>,
    pub suggested_desk: Option<String>,
    pub resolution_reference: Option<String>,
    pub reasoning: String,
}

impl Precedent {
    /// No precedent; used when the historical agent is unavailable
    pub fn none() -> Self {
        Self {
            found: false,
            suggested_tier: None,
            suggested_desk: None,
            resolution_reference: None,
            reasoning: String::new(),
        }
    }
}

/// Estimator agent answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
    pub time_category: TimeCategory,
}

/// Complexity agent answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub category: Complexity,
    /// Score in [0, 100]
    pub score: f64,
    pub recommended_tier: Tier,
    pub reasoning: String,
}

impl Default for ComplexityAssessment {
    fn default() -> Self {
        Self {
            category: Complexity::Medium,
            score: 50.0,
            recommended_tier: Tier::General,
            reasoning: String::new(),
        }
    }
}

/// Finds a resolved precedent for a ticket
#[async_trait]
pub trait Historical: Send + Sync {
    async fn consult(&self, ticket: &TicketFeatures) -> Result<Precedent, CollaboratorError>;
}

/// Estimates hours to resolution
#[async_trait]
pub trait Estimator: Send + Sync {
    async fn estimate(&self, ticket: &TicketFeatures) -> Result<Estimate, CollaboratorError>;
}

/// Classifies complexity and recommends a tier
#[async_trait]
pub trait ComplexityEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        ticket: &TicketFeatures,
        estimated_hours: Option<f64>,
    ) -> Result<ComplexityAssessment, CollaboratorError>;
}

/// The three collaborators a pipeline runs against
#[derive(Clone)]
pub struct Collaborators {
    pub historical: Arc<dyn Historical>,
    pub estimator: Arc<dyn Estimator>,
    pub complexity: Arc<dyn ComplexityEvaluator>,
}

impl Collaborators {
    pub fn new(
        historical: Arc<dyn Historical>,
        estimator: Arc<dyn Estimator>,
        complexity: Arc<dyn ComplexityEvaluator>,
    ) -> Self {
        Self {
            historical,
            estimator,
            complexity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Precedent::none();
        assert!(!p.found);
        assert!(p.suggested_desk.is_none());

        let c = ComplexityAssessment::default();
        assert_eq!(c.category, Complexity::Medium);
        assert_eq!(c.score, 50.0);
        assert_eq!(c.recommended_tier, Tier::General);
    }

    #[test]
    fn test_error_display() {
        let err = CollaboratorError::Timeout(Duration::from_secs(8));
        assert_eq!(err.to_string(), "timed out after 8s");
        let err = CollaboratorError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "request failed: connection refused");
    }
}
