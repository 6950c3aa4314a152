//! Product rule table — deterministic keyword routing to specialist desks
//!
//! An ordered list of (predicate, desk) pairs. The product tag and the
//! attention-type tag are searched case-insensitively; the first rule whose
//! predicate holds wins.
//!
//! ```text
//! #  Rule      | Matches                                      | Desk
//! ---|---------|----------------------------------------------|-----------------------
//! 1  vida_ley  | "vida ley"                                   | Squad - Mesa Vida Ley
//! 2  sctr      | "sctr"                                       | Squad - Mesa SCTR
//! 3  soat      | "soat" + one of "ecommerce"/"digital"/"web"  | soportedigital
//! 4  digital   | "ecommerce" / "digital" / "web"              | soportedigital
//! 5  billing   | "factura" / "planilla" / "conciliacion"      | soporteapp
//! ```

use serde::{Deserialize, Serialize};

/// Default desk names used by the built-in rule table and registry
pub const VIDA_LEY_DESK: &str = "Squad - Mesa Vida Ley";
pub const SCTR_DESK: &str = "Squad - Mesa SCTR";
pub const DIGITAL_DESK: &str = "soportedigital";
pub const BILLING_DESK: &str = "soporteapp";

const ECOMMERCE_CONTEXT: &[&str] = &["ecommerce", "e-commerce", "digital", "web"];

/// One row of the decision table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRule {
    /// Rule identifier, reported in routing reasons
    pub name: String,
    /// Any of these (lowercase) substrings triggers the rule
    pub keywords: Vec<String>,
    /// When non-empty, one of these must also be present
    #[serde(default)]
    pub requires_any: Vec<String>,
    /// Target desk name
    pub desk: String,
}

impl ProductRule {
    pub fn new(name: &str, keywords: &[&str], desk: &str) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            requires_any: Vec::new(),
            desk: desk.to_string(),
        }
    }

    /// Require one of `context` in addition to a keyword
    pub fn requiring(mut self, context: &[&str]) -> Self {
        self.requires_any = context.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Whether the rule fires for the given lowercase texts.
    ///
    /// Each text is searched on its own so keywords never match across the
    /// boundary between product and attention type.
    pub fn matches(&self, texts: &[&str]) -> bool {
        let contains_any = |needles: &[String]| {
            needles
                .iter()
                .any(|n| texts.iter().any(|t| t.contains(n.as_str())))
        };
        contains_any(&self.keywords)
            && (self.requires_any.is_empty() || contains_any(&self.requires_any))
    }
}

/// Ordered rule table; first match wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRuleTable {
    rules: Vec<ProductRule>,
}

impl ProductRuleTable {
    /// Build a table; keywords are normalized to lowercase.
    pub fn new(rules: Vec<ProductRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.keywords.iter_mut().for_each(|k| *k = k.to_lowercase());
                rule.requires_any.iter_mut().for_each(|k| *k = k.to_lowercase());
                rule
            })
            .collect();
        Self { rules }
    }

    /// Built-in table for the default registry
    pub fn default_rules() -> Vec<ProductRule> {
        vec![
            ProductRule::new("vida_ley", &["vida ley", "vida_ley"], VIDA_LEY_DESK),
            ProductRule::new("sctr", &["sctr"], SCTR_DESK),
            ProductRule::new("soat", &["soat"], DIGITAL_DESK).requiring(ECOMMERCE_CONTEXT),
            ProductRule::new("digital", ECOMMERCE_CONTEXT, DIGITAL_DESK),
            ProductRule::new(
                "billing",
                &["factura", "planilla", "conciliacion", "conciliación"],
                BILLING_DESK,
            ),
        ]
    }

    pub fn rules(&self) -> &[ProductRule] {
        &self.rules
    }

    /// First rule matching the product or attention-type text
    pub fn evaluate(&self, product: &str, attention_type: &str) -> Option<&ProductRule> {
        let product = product.to_lowercase();
        let attention = attention_type.to_lowercase();
        let texts = [product.as_str(), attention.as_str()];
        self.rules.iter().find(|rule| rule.matches(&texts))
    }
}

impl Default for ProductRuleTable {
    fn default() -> Self {
        Self::new(Self::default_rules())
    }
}
