//! Routing Policy — decision types, tier order and decision confidence
//!
//! The engine itself lives in [`engine`]; this module holds the data that
//! flows in and out of it.

pub mod engine;

pub use engine::RoutingPolicyEngine;

use crate::desk::Tier;
use crate::error::{Result, RoutingError};
use crate::ticket::Complexity;
use serde::{Deserialize, Serialize};

/// Confidence at or above which a decision counts as automatic
pub const AUTOMATIC_CONFIDENCE: f64 = 0.70;

/// Tunable policy constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Tiers tried, in order, for tickets not recommended for General
    pub non_general_order: Vec<Tier>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            non_general_order: vec![Tier::Escalation, Tier::General],
        }
    }
}

impl PolicyConfig {
    /// Validate a custom tier order.
    ///
    /// Specialist desks are reached only through product rules, so the
    /// order may list General and Escalation, each at most once.
    pub fn new(non_general_order: Vec<Tier>) -> Result<Self> {
        if non_general_order.is_empty() {
            return Err(RoutingError::configuration("escalation order is empty"));
        }
        for (i, tier) in non_general_order.iter().enumerate() {
            if *tier == Tier::Specialist {
                return Err(RoutingError::configuration(
                    "escalation order must not contain Specialist",
                ));
            }
            if non_general_order[..i].contains(tier) {
                return Err(RoutingError::configuration(format!(
                    "escalation order lists {} twice",
                    tier
                )));
            }
        }
        Ok(Self { non_general_order })
    }
}

/// Engine input distilled from the ticket and upstream signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingInput<'a> {
    pub recommended_tier: Tier,
    pub complexity: Complexity,
    pub attention_type: &'a str,
    pub product: &'a str,
    pub via_historical_match: bool,
}

/// Which branch of the cascade produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingRule {
    /// Historical precedent, placed on General or Escalation
    HistoricalOverride,
    /// Historical precedent with General and Escalation saturated
    HistoricalSaturated,
    /// Specialist recommendation matched an available product desk
    SpecialistProductMatch,
    /// Specialist recommendation fell through to Escalation
    SpecialistEscalationFallback,
    NormalCase,
    /// Every candidate saturated; forced onto a General desk
    GlobalSaturation,
}

impl RoutingRule {
    /// Whether this rule force-assigns and queues the ticket
    pub fn queues(&self) -> bool {
        matches!(self, Self::HistoricalSaturated | Self::GlobalSaturation)
    }
}

impl std::fmt::Display for RoutingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HistoricalOverride => write!(f, "historical override"),
            Self::HistoricalSaturated => write!(f, "historical override (saturated)"),
            Self::SpecialistProductMatch => write!(f, "specialist product match"),
            Self::SpecialistEscalationFallback => write!(f, "specialist escalation fallback"),
            Self::NormalCase => write!(f, "normal case"),
            Self::GlobalSaturation => write!(f, "global saturation fallback"),
        }
    }
}

/// Where a ticket goes and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub tier: Tier,
    pub desk: String,
    pub queued: bool,
    pub rule: RoutingRule,
    /// Utilization of the chosen desk when the decision was made
    pub utilization_pct: f64,
    pub reason: String,
}

/// Confidence of a routing decision.
///
/// Scores near the category boundaries and thin desk availability both
/// lower confidence; the result is rounded to two decimals.
pub fn decision_confidence(complexity_score: f64, available_desks: usize) -> f64 {
    let complexity_factor = if complexity_score < 40.0 || complexity_score > 80.0 {
        0.9
    } else if complexity_score > 45.0 && complexity_score < 75.0 {
        0.7
    } else {
        0.5
    };
    let availability_factor = (available_desks as f64 / 3.0).min(1.0);
    (((complexity_factor + availability_factor) / 2.0) * 100.0).round() / 100.0
}

/// Whether a confidence value qualifies as an automatic decision
pub fn is_automatic(confidence: f64) -> bool {
    confidence >= AUTOMATIC_CONFIDENCE
}
