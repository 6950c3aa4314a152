//! Routing Policy Engine — deterministic desk assignment cascade
//!
//! Consumes a [`RoutingInput`] and a locked [`DeskTable`] and produces a
//! [`RoutingDecision`]. The engine never mutates load; the caller reserves
//! the chosen desk inside the same registry transaction.
//!
//! ```text
//! Step | Condition                              | Candidates
//! -----|----------------------------------------|------------------------------
//! 1    | historical precedent                   | General, Escalation, else first General (queued)
//! 2    | Specialist + VeryHigh                  | product desk, else Escalation, else step 3
//! 3    | everything else                        | [General] or the non-General order
//! 4    | nothing available                      | least-loaded General (queued)
//! ```

use super::{PolicyConfig, RoutingDecision, RoutingInput, RoutingRule};
use crate::desk::{Desk, DeskTable, Tier};
use crate::error::{Result, RoutingError};
use crate::rules::ProductRuleTable;
use crate::selector::DeskSelector;
use crate::ticket::Complexity;
use tracing::debug;

/// The routing policy engine
#[derive(Debug, Clone, Default)]
pub struct RoutingPolicyEngine {
    config: PolicyConfig,
    rules: ProductRuleTable,
}

impl RoutingPolicyEngine {
    pub fn new(config: PolicyConfig, rules: ProductRuleTable) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn rules(&self) -> &ProductRuleTable {
        &self.rules
    }

    /// Run the cascade; the first step that yields a desk wins.
    pub fn decide(&self, table: &DeskTable, input: &RoutingInput<'_>) -> Result<RoutingDecision> {
        let selector = DeskSelector::new(table, &self.rules);

        if input.via_historical_match {
            return self.decide_historical(table, &selector);
        }

        let mut detail = String::new();
        if input.recommended_tier == Tier::Specialist && input.complexity == Complexity::VeryHigh {
            match selector.select_by_product_rule(input.product, input.attention_type)? {
                Some(hit) if hit.available => {
                    return Ok(decision(
                        table,
                        RoutingRule::SpecialistProductMatch,
                        hit.desk,
                        format!("product rule '{}' matched", hit.rule.name),
                    ));
                }
                Some(hit) => {
                    detail = format!(
                        "product desk {} saturated at {:.1}%",
                        hit.desk.name,
                        table.policy().utilization(hit.desk)
                    );
                }
                None => detail = "no product rule matched".to_string(),
            }
            if let Some(desk) = selector.select_least_loaded(Tier::Escalation) {
                return Ok(decision(
                    table,
                    RoutingRule::SpecialistEscalationFallback,
                    desk,
                    detail,
                ));
            }
            debug!(detail = %detail, "Specialist fallback found no Escalation desk");
            detail.push_str(", Escalation saturated; ");
        }

        let candidates: &[Tier] = match input.recommended_tier {
            Tier::General => &[Tier::General],
            _ => &self.config.non_general_order,
        };
        for tier in candidates {
            if let Some(desk) = selector.select_least_loaded(*tier) {
                detail.push_str(&format!("recommended {}", input.recommended_tier));
                return Ok(decision(table, RoutingRule::NormalCase, desk, detail));
            }
        }

        let desk = table
            .desks_by_tier(Tier::General)
            .into_iter()
            .next()
            .ok_or_else(no_general_desk)?;
        detail.push_str("no available desk in any candidate tier");
        Ok(decision(table, RoutingRule::GlobalSaturation, desk, detail))
    }

    /// Historical precedent: General, then Escalation, never Specialist
    fn decide_historical(
        &self,
        table: &DeskTable,
        selector: &DeskSelector<'_>,
    ) -> Result<RoutingDecision> {
        for tier in [Tier::General, Tier::Escalation] {
            if let Some(desk) = selector.select_least_loaded(tier) {
                return Ok(decision(
                    table,
                    RoutingRule::HistoricalOverride,
                    desk,
                    "resolved precedent found".to_string(),
                ));
            }
        }
        let desk = table
            .first_of_tier(Tier::General)
            .ok_or_else(no_general_desk)?;
        Ok(decision(
            table,
            RoutingRule::HistoricalSaturated,
            desk,
            "General and Escalation saturated".to_string(),
        ))
    }
}

fn no_general_desk() -> RoutingError {
    RoutingError::configuration("registry has no General desk to fall back on")
}

fn decision(table: &DeskTable, rule: RoutingRule, desk: &Desk, detail: String) -> RoutingDecision {
    let utilization = table.policy().utilization(desk);
    let reason = format!(
        "{}: {}; assigned to {} ({}) at {:.1}% utilization",
        rule, detail, desk.name, desk.tier, utilization
    );
    debug!(
        rule = %rule,
        desk = %desk.name,
        tier = %desk.tier,
        utilization,
        "Routing decision"
    );
    RoutingDecision {
        tier: desk.tier,
        desk: desk.name.clone(),
        queued: rule.queues(),
        rule,
        utilization_pct: utilization,
        reason,
    }
}
