//! Desk Selector — least-loaded and product-rule desk lookup
//!
//! Read-only view over a locked [`DeskTable`]. Selection never reserves
//! capacity; the caller increments load in the same critical section.

use crate::desk::{Desk, DeskTable, Tier};
use crate::error::Result;
use crate::rules::{ProductRule, ProductRuleTable};

/// A product rule hit together with its target desk
#[derive(Debug, Clone, Copy)]
pub struct ProductMatch<'a> {
    pub rule: &'a ProductRule,
    pub desk: &'a Desk,
    /// Whether the target desk is below the availability threshold
    pub available: bool,
}

pub struct DeskSelector<'a> {
    table: &'a DeskTable,
    rules: &'a ProductRuleTable,
}

impl<'a> DeskSelector<'a> {
    pub fn new(table: &'a DeskTable, rules: &'a ProductRuleTable) -> Self {
        Self { table, rules }
    }

    /// Least utilized available desk of `tier`, or `None` when all are saturated
    pub fn select_least_loaded(&self, tier: Tier) -> Option<&'a Desk> {
        self.table
            .desks_by_tier(tier)
            .into_iter()
            .find(|d| self.table.is_available(d))
    }

    /// Evaluate the product rule table.
    ///
    /// A matching rule whose desk is not registered is an `UnknownDesk`
    /// error; configuration validation keeps that from happening.
    pub fn select_by_product_rule(
        &self,
        product: &str,
        attention_type: &str,
    ) -> Result<Option<ProductMatch<'a>>> {
        let Some(rule) = self.rules.evaluate(product, attention_type) else {
            return Ok(None);
        };
        let desk = self.table.get(&rule.desk)?;
        Ok(Some(ProductMatch {
            rule,
            desk,
            available: self.table.is_available(desk),
        }))
    }
}
