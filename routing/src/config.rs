//! Registry configuration — desks, product rules and routing policy constants
//!
//! Loaded once at startup, either from a TOML file or from the built-in
//! defaults, and validated before any request is served:
//!
//! ```toml
//! availability_threshold = 90.0
//! escalation_order = ["Escalation", "General"]
//!
//! [[desks]]
//! name = "Service Desk 1"
//! specialty = "soporte_general"
//! tier = "General"
//! max_capacity = 20
//!
//! [[product_rules]]
//! name = "sctr"
//! keywords = ["sctr"]
//! desk = "Squad - Mesa SCTR"
//! ```

use crate::desk::{CapacityPolicy, Desk, DeskTable, Tier, DEFAULT_AVAILABILITY_THRESHOLD};
use crate::error::{Result, RoutingError};
use crate::policy::PolicyConfig;
use crate::rules::{
    ProductRule, ProductRuleTable, BILLING_DESK, DIGITAL_DESK, SCTR_DESK, VIDA_LEY_DESK,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Static description of one desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskConfig {
    pub name: String,
    pub specialty: String,
    pub tier: Tier,
    pub max_capacity: u32,
    /// Load carried over at startup
    #[serde(default)]
    pub current_load: u32,
}

impl DeskConfig {
    pub fn new(name: &str, specialty: &str, tier: Tier, max_capacity: u32) -> Self {
        Self {
            name: name.to_string(),
            specialty: specialty.to_string(),
            tier,
            max_capacity,
            current_load: 0,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_AVAILABILITY_THRESHOLD
}

fn default_escalation_order() -> Vec<Tier> {
    PolicyConfig::default().non_general_order
}

/// Complete routing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Desks are available while utilization is strictly below this percent
    #[serde(default = "default_threshold")]
    pub availability_threshold: f64,
    /// Tier order tried for non-General recommendations
    #[serde(default = "default_escalation_order")]
    pub escalation_order: Vec<Tier>,
    pub desks: Vec<DeskConfig>,
    #[serde(default = "ProductRuleTable::default_rules")]
    pub product_rules: Vec<ProductRule>,
}

impl Default for RegistryConfig {
    /// Five General service desks, one Escalation squad and four
    /// Specialist desks covering the default product rules.
    fn default() -> Self {
        fn general(name: &str) -> DeskConfig {
            DeskConfig::new(name, "soporte_general", Tier::General, 20)
        }

        Self {
            availability_threshold: DEFAULT_AVAILABILITY_THRESHOLD,
            escalation_order: default_escalation_order(),
            desks: vec![
                general("Service Desk 1"),
                general("Service Desk 2"),
                general("Service Desk 5"),
                general("Service Desk 6"),
                general("Service Desk 7"),
                DeskConfig::new(
                    "Squad - Mesa Ongoing",
                    "soporte_avanzado",
                    Tier::Escalation,
                    15,
                ),
                DeskConfig::new(VIDA_LEY_DESK, "vida_ley", Tier::Specialist, 10),
                DeskConfig::new(SCTR_DESK, "sctr", Tier::Specialist, 10),
                DeskConfig::new(DIGITAL_DESK, "ecommerce_soat", Tier::Specialist, 10),
                DeskConfig::new(BILLING_DESK, "aplicativos_facturacion", Tier::Specialist, 8),
            ],
            product_rules: ProductRuleTable::default_rules(),
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            desks = config.desks.len(),
            rules = config.product_rules.len(),
            "Loaded desk registry configuration"
        );
        Ok(config)
    }

    /// Check every cross-reference without building anything
    pub fn validate(&self) -> Result<()> {
        let table = self.build_table()?;
        let policy = self.build_policy()?;
        for tier in &policy.non_general_order {
            if table.first_of_tier(*tier).is_none() {
                return Err(RoutingError::configuration(format!(
                    "escalation order lists {} but no {} desk is configured",
                    tier, tier
                )));
            }
        }
        for rule in &self.product_rules {
            if rule.keywords.is_empty() {
                return Err(RoutingError::configuration(format!(
                    "product rule '{}' has no keywords",
                    rule.name
                )));
            }
            // "" is a substring of every text and would match all tickets
            if rule
                .keywords
                .iter()
                .chain(&rule.requires_any)
                .any(|k| k.trim().is_empty())
            {
                return Err(RoutingError::configuration(format!(
                    "product rule '{}' has a blank keyword",
                    rule.name
                )));
            }
            let desk = table.get(&rule.desk).map_err(|_| {
                RoutingError::configuration(format!(
                    "product rule '{}' targets unknown desk '{}'",
                    rule.name, rule.desk
                ))
            })?;
            if desk.tier != Tier::Specialist {
                return Err(RoutingError::configuration(format!(
                    "product rule '{}' targets '{}' which is {} rather than Specialist",
                    rule.name, rule.desk, desk.tier
                )));
            }
        }
        Ok(())
    }

    pub fn capacity_policy(&self) -> Result<CapacityPolicy> {
        CapacityPolicy::new(self.availability_threshold)
    }

    /// Build the validated desk table in configuration order
    pub fn build_table(&self) -> Result<DeskTable> {
        let desks = self
            .desks
            .iter()
            .map(|d| Desk::new(&d.name, &d.specialty, d.tier, d.max_capacity, d.current_load))
            .collect::<Result<Vec<_>>>()?;
        DeskTable::new(desks, self.capacity_policy()?)
    }

    pub fn build_rules(&self) -> ProductRuleTable {
        ProductRuleTable::new(self.product_rules.clone())
    }

    pub fn build_policy(&self) -> Result<PolicyConfig> {
        PolicyConfig::new(self.escalation_order.clone())
    }
}
