//! Pipeline Orchestrator — from raw ticket to routed assignment
//!
//! ```text
//! detect urgency ─► enrich summary ─┬─► Historical ─┐
//!                                   └─► Estimator  ─┴─► Complexity(hours)
//!                                                          │
//!                          RoutingService::assign_ticket ◄─┘
//! ```
//!
//! Every collaborator call is bounded by its own timeout. A failed or timed
//! out call is replaced by its documented default and the substitution is
//! recorded in the trace; collaborator trouble never fails the pipeline.
//!
//! Cancellation is honored until assignment starts. Assignment itself is a
//! single synchronous registry transaction and always runs to completion,
//! so a ticket cancelled afterwards still holds its desk slot.

use crate::collaborators::{
    CollaboratorError, Collaborators, ComplexityAssessment, Estimate, Precedent, TicketFeatures,
};
use crate::urgency::{detect_urgency, enrich_summary};
use routing::{
    AssignTicketRequest, IncidenceType, RoutingError, RoutingResult, SharedRoutingService,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Why a pipeline run produced no result
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pipeline cancelled before assignment")]
    Cancelled,

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// An inbound ticket as submitted by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketInput {
    /// Generated when absent
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub incidence_type: IncidenceType,
    #[serde(default)]
    pub attention_type: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub informer: String,
    #[serde(default)]
    pub impacts_period_close: bool,
    #[serde(default)]
    pub affected_users: u32,
}

/// Raw outcome of the three collaborator calls
struct Signals {
    historical: Result<Precedent, CollaboratorError>,
    estimate: Result<Estimate, CollaboratorError>,
    complexity: Result<ComplexityAssessment, CollaboratorError>,
}

pub struct PipelineOrchestrator {
    service: SharedRoutingService,
    collaborators: Collaborators,
    timeout: Duration,
}

impl PipelineOrchestrator {
    pub fn new(
        service: SharedRoutingService,
        collaborators: Collaborators,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            collaborators,
            timeout,
        }
    }

    pub fn service(&self) -> &SharedRoutingService {
        &self.service
    }

    pub async fn run(&self, ticket: TicketInput) -> Result<RoutingResult, PipelineError> {
        self.run_with_cancel(ticket, &CancellationToken::new()).await
    }

    /// Run the pipeline, aborting in-flight collaborator calls if `cancel`
    /// fires before assignment.
    pub async fn run_with_cancel(
        &self,
        ticket: TicketInput,
        cancel: &CancellationToken,
    ) -> Result<RoutingResult, PipelineError> {
        let ticket_id = ticket
            .ticket_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let urgency = detect_urgency(&ticket.summary, &ticket.detailed_description);
        let features = TicketFeatures {
            ticket_id: ticket_id.clone(),
            incidence_type: ticket.incidence_type,
            attention_type: ticket.attention_type.clone(),
            area: ticket.area.clone(),
            product: ticket.product.clone(),
            summary: enrich_summary(
                &ticket.summary,
                ticket.impacts_period_close,
                ticket.affected_users,
            ),
            urgency,
        };
        info!(ticket_id = %ticket_id, urgency = %urgency, "Pipeline started");

        let signals = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(ticket_id = %ticket_id, "Pipeline cancelled before assignment");
                return Err(PipelineError::Cancelled);
            }
            signals = self.gather(&features) => signals,
        };

        let request = build_request(&ticket, features, signals);
        Ok(self.service.assign_ticket(&request)?)
    }

    async fn gather(&self, features: &TicketFeatures) -> Signals {
        let (historical, estimate) = tokio::join!(
            call(
                "Historical",
                self.timeout,
                self.collaborators.historical.consult(features)
            ),
            call(
                "Estimator",
                self.timeout,
                self.collaborators.estimator.estimate(features)
            ),
        );
        let hours = estimate.as_ref().ok().map(|e| e.hours);
        let complexity = call(
            "Complexity",
            self.timeout,
            self.collaborators.complexity.evaluate(features, hours),
        )
        .await;
        Signals {
            historical,
            estimate,
            complexity,
        }
    }
}

/// Bound one collaborator call by `timeout`
async fn call<T>(
    name: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T, CollaboratorError>>,
) -> Result<T, CollaboratorError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(collaborator = name, error = %e, "Collaborator failed, using default");
            Err(e)
        }
        Err(_) => {
            warn!(
                collaborator = name,
                timeout = ?timeout,
                "Collaborator timed out, using default"
            );
            Err(CollaboratorError::Timeout(timeout))
        }
    }
}

/// Fold collaborator outcomes into the routing request and its trace
fn build_request(
    ticket: &TicketInput,
    features: TicketFeatures,
    signals: Signals,
) -> AssignTicketRequest {
    let mut trace = Vec::with_capacity(4);

    let precedent = match signals.historical {
        Ok(p) => {
            trace.push(historical_segment(&p));
            p
        }
        Err(e) => {
            trace.push(format!("Historical unavailable: {}", e));
            Precedent::none()
        }
    };

    let estimate = match signals.estimate {
        Ok(e) => {
            trace.push(format!(
                "Estimate: {:.1}h ({}) range {:.1}-{:.1}h",
                e.hours, e.time_category, e.min_hours, e.max_hours
            ));
            Some(e)
        }
        Err(e) => {
            trace.push(format!("Estimator unavailable: {}", e));
            None
        }
    };

    let assessment = match signals.complexity {
        Ok(c) => {
            trace.push(complexity_segment(&c));
            c
        }
        Err(e) => {
            trace.push(format!("Complexity unavailable: {}", e));
            ComplexityAssessment::default()
        }
    };

    AssignTicketRequest {
        ticket_id: features.ticket_id,
        incidence_type: features.incidence_type,
        attention_type: features.attention_type,
        area: features.area,
        product: features.product,
        summary: features.summary,
        informer: ticket.informer.clone(),
        urgency: features.urgency,
        estimated_hours: estimate.as_ref().map(|e| e.hours),
        time_category: estimate.as_ref().map(|e| e.time_category),
        complexity: assessment.category,
        complexity_score: assessment.score,
        recommended_tier: assessment.recommended_tier,
        via_historical: precedent.found,
        historical_desk: precedent.suggested_desk,
        resolution_reference: precedent.resolution_reference,
        upstream_trace: trace,
    }
}

fn historical_segment(p: &Precedent) -> String {
    let detail = match (p.found, p.reasoning.is_empty()) {
        (_, false) => p.reasoning.as_str(),
        (true, true) => "precedent found",
        (false, true) => "no precedent",
    };
    match &p.suggested_desk {
        Some(desk) if p.found => format!("Historical: {} (suggested {})", detail, desk),
        _ => format!("Historical: {}", detail),
    }
}

fn complexity_segment(c: &ComplexityAssessment) -> String {
    let mut segment = format!(
        "Complexity: {} (score={:.1}, recommended {})",
        c.category,
        c.score,
        c.recommended_tier.level()
    );
    if !c.reasoning.is_empty() {
        segment.push(' ');
        segment.push_str(&c.reasoning);
    }
    segment
}
