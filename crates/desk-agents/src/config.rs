//! Service configuration from environment
//!
//! ```text
//! Variable                        | Default
//! --------------------------------|---------------------------
//! DESK_HISTORICAL_URL             | http://localhost:8004
//! DESK_ESTIMATOR_URL              | http://localhost:8005
//! DESK_COMPLEXITY_URL             | http://localhost:8001
//! DESK_COLLABORATOR_TIMEOUT_SECS  | 8
//! DESK_REGISTRY_PATH              | (built-in registry)
//! DESK_AVAILABILITY_THRESHOLD     | (registry value, 90.0)
//! ```

use anyhow::{Context, Result};
use routing::{CapacityPolicy, RegistryConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 8;

/// Runtime configuration for the pipeline and binary
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub historical_url: String,
    pub estimator_url: String,
    pub complexity_url: String,
    /// Per-call collaborator timeout
    pub collaborator_timeout: Duration,
    /// TOML registry file; `None` uses the built-in registry
    pub registry_path: Option<PathBuf>,
    /// Overrides the registry's availability threshold
    pub availability_threshold: Option<f64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            historical_url: "http://localhost:8004".into(),
            estimator_url: "http://localhost:8005".into(),
            complexity_url: "http://localhost:8001".into(),
            collaborator_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            registry_path: None,
            availability_threshold: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// Unset variables fall back to defaults; a set but invalid threshold
    /// is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            historical_url: lookup("DESK_HISTORICAL_URL").unwrap_or(defaults.historical_url),
            estimator_url: lookup("DESK_ESTIMATOR_URL").unwrap_or(defaults.estimator_url),
            complexity_url: lookup("DESK_COMPLEXITY_URL").unwrap_or(defaults.complexity_url),
            collaborator_timeout: timeout_from(
                lookup("DESK_COLLABORATOR_TIMEOUT_SECS"),
                DEFAULT_COLLABORATOR_TIMEOUT_SECS,
            ),
            registry_path: lookup("DESK_REGISTRY_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            availability_threshold: threshold_from(lookup("DESK_AVAILABILITY_THRESHOLD"))?,
        })
    }

    /// Load the registry file (or the built-in registry) and apply overrides
    pub fn registry_config(&self) -> Result<RegistryConfig> {
        let mut config = match &self.registry_path {
            Some(path) => RegistryConfig::load(path)
                .with_context(|| format!("Failed to load registry from {}", path.display()))?,
            None => {
                info!("Using built-in desk registry");
                RegistryConfig::default()
            }
        };
        if let Some(threshold) = self.availability_threshold {
            config.availability_threshold = threshold;
            config
                .validate()
                .context("Invalid DESK_AVAILABILITY_THRESHOLD")?;
        }
        Ok(config)
    }
}

fn threshold_from(value: Option<String>) -> Result<Option<f64>> {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let threshold = raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid DESK_AVAILABILITY_THRESHOLD '{}'", raw))?;
    CapacityPolicy::new(threshold)
        .with_context(|| format!("Invalid DESK_AVAILABILITY_THRESHOLD '{}'", raw))?;
    Ok(Some(threshold))
}

fn timeout_from(value: Option<String>, default_secs: u64) -> Duration {
    let secs = value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.collaborator_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("DESK_HISTORICAL_URL", "http://historico:8004"),
            ("DESK_COLLABORATOR_TIMEOUT_SECS", "3"),
            ("DESK_AVAILABILITY_THRESHOLD", "75.5"),
        ]))
        .unwrap();
        assert_eq!(config.historical_url, "http://historico:8004");
        assert_eq!(config.collaborator_timeout, Duration::from_secs(3));
        assert_eq!(config.availability_threshold, Some(75.5));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        for bad in ["0", "-1", "soon"] {
            let config =
                ServiceConfig::from_lookup(lookup(&[("DESK_COLLABORATOR_TIMEOUT_SECS", bad)]))
                    .unwrap();
            assert_eq!(config.collaborator_timeout, Duration::from_secs(8));
        }
    }

    #[test]
    fn test_invalid_threshold_is_an_error() {
        for bad in ["noventa", "0", "150", "NaN"] {
            let err = ServiceConfig::from_lookup(lookup(&[("DESK_AVAILABILITY_THRESHOLD", bad)]))
                .unwrap_err();
            assert!(
                err.to_string().contains("DESK_AVAILABILITY_THRESHOLD"),
                "{}: {}",
                bad,
                err
            );
        }
        let config = ServiceConfig::from_lookup(lookup(&[("DESK_AVAILABILITY_THRESHOLD", " ")]))
            .unwrap();
        assert_eq!(config.availability_threshold, None);
    }

    #[test]
    fn test_registry_threshold_override() {
        let config = ServiceConfig {
            availability_threshold: Some(50.0),
            ..ServiceConfig::default()
        };
        assert_eq!(config.registry_config().unwrap().availability_threshold, 50.0);

        let config = ServiceConfig {
            availability_threshold: Some(150.0),
            ..ServiceConfig::default()
        };
        assert!(config.registry_config().is_err());
    }

    #[test]
    fn test_registry_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            escalation_order = ["General"]
            product_rules = []

            [[desks]]
            name = "Mesa Unica"
            specialty = "general"
            tier = "N1"
            max_capacity = 3
            "#
        )
        .unwrap();
        let config = ServiceConfig {
            registry_path: Some(file.path().to_path_buf()),
            ..ServiceConfig::default()
        };
        let registry = config.registry_config().unwrap();
        assert_eq!(registry.desks.len(), 1);
        assert_eq!(registry.desks[0].name, "Mesa Unica");
    }

    #[test]
    fn test_missing_registry_file() {
        let config = ServiceConfig {
            registry_path: Some(PathBuf::from("/nonexistent/registry.toml")),
            ..ServiceConfig::default()
        };
        let err = config.registry_config().unwrap_err();
        assert!(err.to_string().contains("Failed to load registry"));
    }
}
