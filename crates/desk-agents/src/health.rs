//! Collaborator readiness
//!
//! ```text
//! Agent answer          | AgentHealth
//! ----------------------|------------
//! 2xx on /health        | online
//! any other status      | error
//! connect/timeout error | offline
//! ```
//!
//! The pipeline is `ready` only when every agent is online; otherwise it
//! still runs, substituting defaults, and reports `degraded`.

use crate::collaborators::AgentEndpoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentHealth {
    Online,
    Error,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: Readiness,
    pub agents: BTreeMap<String, AgentHealth>,
    pub timestamp: DateTime<Utc>,
}

impl ReadinessReport {
    /// `Ready` when exactly the `expected` agents all report online
    pub fn from_agents(agents: BTreeMap<String, AgentHealth>, expected: usize) -> Self {
        let all_online =
            agents.len() == expected && agents.values().all(|h| *h == AgentHealth::Online);
        Self {
            status: if all_online {
                Readiness::Ready
            } else {
                Readiness::Degraded
            },
            agents,
            timestamp: Utc::now(),
        }
    }
}

/// Check every agent concurrently
pub async fn check_agents(agents: &[(&str, AgentEndpoint)]) -> ReadinessReport {
    let mut checks = JoinSet::new();
    for (name, endpoint) in agents {
        let name = name.to_string();
        let endpoint = endpoint.clone();
        checks.spawn(async move { (name, endpoint.health().await) });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = checks.join_next().await {
        match joined {
            Ok((name, health)) => {
                results.insert(name, health);
            }
            Err(e) => warn!(error = %e, "Health check task failed"),
        }
    }

    let report = ReadinessReport::from_agents(results, agents.len());
    info!(status = ?report.status, agents = report.agents.len(), "Agent readiness checked");
    report
}
