//! Ticket vocabulary and the `AssignTicket` request/result types
//!
//! Enum variants accept the labels the upstream agents put on the wire
//! (`"alta"`, `"muy_alta"`, `"rapido"`, ...) as serde aliases.

use crate::desk::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complexity category assigned by the complexity classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[serde(alias = "baja")]
    Low,
    #[serde(alias = "media")]
    Medium,
    #[serde(alias = "alta")]
    High,
    #[serde(alias = "muy_alta")]
    VeryHigh,
}

impl Default for Complexity {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very_high"),
        }
    }
}

/// Urgency detected from the ticket text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[serde(alias = "alta")]
    High,
    #[serde(alias = "media")]
    Medium,
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidenceType {
    #[serde(alias = "Incidente", alias = "incidente", alias = "Incidencia")]
    Incident,
    #[serde(alias = "Solicitud", alias = "solicitud", alias = "Requerimiento")]
    Request,
}

impl Default for IncidenceType {
    fn default() -> Self {
        Self::Request
    }
}

impl std::fmt::Display for IncidenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incident => write!(f, "incident"),
            Self::Request => write!(f, "request"),
        }
    }
}

/// Resolution-time bucket
///
/// ```text
/// Category  | Hours
/// ----------|-----------
/// Fast      | < 24
/// Normal    | < 72
/// Slow      | < 168
/// VerySlow  | >= 168
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCategory {
    #[serde(alias = "rapido", alias = "rápido")]
    Fast,
    Normal,
    #[serde(alias = "lento")]
    Slow,
    #[serde(alias = "muy_lento")]
    VerySlow,
}

impl TimeCategory {
    pub fn from_hours(hours: f64) -> Self {
        if hours < 24.0 {
            Self::Fast
        } else if hours < 72.0 {
            Self::Normal
        } else if hours < 168.0 {
            Self::Slow
        } else {
            Self::VerySlow
        }
    }
}

impl std::fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Normal => write!(f, "normal"),
            Self::Slow => write!(f, "slow"),
            Self::VerySlow => write!(f, "very_slow"),
        }
    }
}

fn default_score() -> f64 {
    50.0
}

fn default_tier() -> Tier {
    Tier::General
}

/// Input to `AssignTicket`: the ticket plus every upstream signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignTicketRequest {
    pub ticket_id: String,
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
    pub informer: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub time_category: Option<TimeCategory>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default = "default_score")]
    pub complexity_score: f64,
    #[serde(default = "default_tier")]
    pub recommended_tier: Tier,
    #[serde(default)]
    pub via_historical: bool,
    /// Desk suggested by the historical precedent; informational only
    #[serde(default)]
    pub historical_desk: Option<String>,
    #[serde(default)]
    pub resolution_reference: Option<String>,
    /// Upstream reasoning prepended to the routing reason
    #[serde(default)]
    pub upstream_trace: Vec<String>,
}

impl AssignTicketRequest {
    /// A request with neutral defaults for every upstream signal
    pub fn new(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            incidence_type: IncidenceType::default(),
            attention_type: String::new(),
            area: String::new(),
            product: String::new(),
            summary: String::new(),
            informer: String::new(),
            urgency: Urgency::default(),
            estimated_hours: None,
            time_category: None,
            complexity: Complexity::default(),
            complexity_score: default_score(),
            recommended_tier: default_tier(),
            via_historical: false,
            historical_desk: None,
            resolution_reference: None,
            upstream_trace: Vec::new(),
        }
    }

    pub fn with_complexity(mut self, complexity: Complexity, score: f64, tier: Tier) -> Self {
        self.complexity = complexity;
        self.complexity_score = score;
        self.recommended_tier = tier;
        self
    }

    pub fn with_product(mut self, product: &str, attention_type: &str) -> Self {
        self.product = product.to_string();
        self.attention_type = attention_type.to_string();
        self
    }

    pub fn with_historical(mut self, desk: Option<String>, reference: Option<String>) -> Self {
        self.via_historical = true;
        self.historical_desk = desk;
        self.resolution_reference = reference;
        self
    }

    /// Time category as given, or derived from the estimated hours
    pub fn effective_time_category(&self) -> Option<TimeCategory> {
        self.time_category
            .or_else(|| self.estimated_hours.map(TimeCategory::from_hours))
    }
}

/// Outcome of `AssignTicket`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    pub ticket_id: String,
    pub assigned_desk: String,
    pub assigned_tier: Tier,
    /// Force-assigned beyond nominal capacity and recorded in the waiting queue
    pub queued: bool,
    pub complexity: Complexity,
    pub complexity_score: f64,
    pub estimated_hours: Option<f64>,
    pub time_category: Option<TimeCategory>,
    pub via_historical: bool,
    pub resolution_reference: Option<String>,
    pub urgency: Urgency,
    /// Decision confidence in [0, 1]
    pub confidence: f64,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}
