//! Routing error types
//!
//! Only configuration defects and programming errors are represented here.
//! Desk saturation is not an error: the policy engine always resolves it by
//! force-assigning and queueing.

use thiserror::Error;

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can abort a routing request or registry construction
#[derive(Error, Debug)]
pub enum RoutingError {
    /// The desk registry or rule table is invalid. Fatal at startup.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A desk name was referenced that the registry does not know about
    #[error("Unknown desk: {name}")]
    UnknownDesk { name: String },

    /// A thread panicked while holding a registry or queue lock
    #[error("Lock poisoned: {resource}")]
    LockPoisoned { resource: &'static str },

    /// Registry configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Registry configuration file is not valid TOML
    #[error("Invalid registry TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RoutingError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unknown_desk(name: impl Into<String>) -> Self {
        Self::UnknownDesk { name: name.into() }
    }

    /// Whether this error indicates a deployment defect rather than a
    /// request-time condition.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Toml(_) | Self::Io(_))
    }
}
