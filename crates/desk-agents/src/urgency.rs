//! Urgency detection and summary enrichment
//!
//! Both run before any collaborator is called. Urgency is a keyword match on
//! the uppercased summary and detailed description; enrichment appends
//! impact markers the downstream agents score on.

use regex::Regex;
use routing::Urgency;
use std::sync::LazyLock;

static URGENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:MUY URGENTE|URGENTE|CR[IÍ]TICO|CA[IÍ]DO|SIN SERVICIO|BLOQUEADO|NO FUNCIONA|EMERGENCIA)\b",
    )
    .expect("URGENCY_PATTERN regex should compile")
});

/// Affected-user count above which a ticket is marked as massive
pub const MASSIVE_IMPACT_USERS: u32 = 10;

/// `High` when the text carries an urgency keyword, `Medium` otherwise
pub fn detect_urgency(summary: &str, description: &str) -> Urgency {
    let text = format!("{} {}", summary, description).to_uppercase();
    if URGENCY_PATTERN.is_match(&text) {
        Urgency::High
    } else {
        Urgency::Medium
    }
}

/// Append impact markers to the summary
pub fn enrich_summary(summary: &str, impacts_period_close: bool, affected_users: u32) -> String {
    let mut enriched = summary.to_string();
    if impacts_period_close {
        enriched.push_str(" IMPACTA AL CIERRE");
    }
    if affected_users > MASSIVE_IMPACT_USERS {
        enriched.push_str(&format!(" {} usuarios afectados masivo", affected_users));
    }
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_detected_case_insensitively() {
        assert_eq!(detect_urgency("Sistema caído", ""), Urgency::High);
        assert_eq!(detect_urgency("sistema caido", ""), Urgency::High);
        assert_eq!(detect_urgency("", "error crítico en emisión"), Urgency::High);
        assert_eq!(detect_urgency("Usuario bloqueado", ""), Urgency::High);
        assert_eq!(detect_urgency("El portal no funciona", ""), Urgency::High);
        assert_eq!(detect_urgency("Muy urgente", ""), Urgency::High);
        assert_eq!(detect_urgency("Local sin servicio", ""), Urgency::High);
    }

    #[test]
    fn test_word_boundaries() {
        // "urgentemente" is not the keyword "urgente"
        assert_eq!(detect_urgency("responder urgentemente", ""), Urgency::Medium);
        assert_eq!(detect_urgency("consulta de póliza", "sin detalle"), Urgency::Medium);
    }

    #[test]
    fn test_keyword_split_across_fields() {
        // summary and description are joined with a space
        assert_eq!(detect_urgency("no", "funciona"), Urgency::High);
    }

    #[test]
    fn test_enrichment() {
        assert_eq!(enrich_summary("Error", false, 0), "Error");
        assert_eq!(enrich_summary("Error", true, 0), "Error IMPACTA AL CIERRE");
        assert_eq!(enrich_summary("Error", false, 10), "Error");
        assert_eq!(
            enrich_summary("Error", true, 25),
            "Error IMPACTA AL CIERRE 25 usuarios afectados masivo"
        );
    }
}
