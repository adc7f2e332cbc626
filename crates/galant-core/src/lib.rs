//! # Galant Core
//!
//! Macro expansion for Galant algorithm files, including:
//! - Delimiter balancing and the parameterized macro protocol
//! - The built-in graph macros and user-defined functions
//! - The leftmost-first expansion driver
//! - Integration of expanded code into a Java class
//!
//! This crate does no I/O beyond loading configuration files; front ends
//! (CLI, REPL, editors) are built on top of it.

#![warn(clippy::all)]

pub mod integrator;
pub mod macros;

use std::path::Path;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use integrator::{CompilationUnit, IntegratorConfig, SourceIntegrator};
pub use macros::{
    Catalog, ExpandedSource, ExpanderConfig, ExpansionSummary, Expander, MacroError, MacroResult,
};

/// Galant core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for Galant core components.
///
/// `RUST_LOG` takes precedence; otherwise core logs at `info`, or `debug`
/// when `debug` is set. Logs go to stderr so expanded code on stdout stays
/// clean. Calling this more than once is harmless.
pub fn init_tracing(debug: bool) {
    let default = if debug {
        "galant_core=debug"
    } else {
        "galant_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Galant configuration, usually read from a JSON file.
///
/// Every field has a default, so a file only needs the settings it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalantConfig {
    /// Expansion limits and delimiters
    pub expander: ExpanderConfig,
    /// Package and imports of generated classes
    pub integrator: IntegratorConfig,
    /// Enable debug logging
    pub debug: bool,
}

impl GalantConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.expander.max_rewrites == 0 {
            return Err(GalantError::Config(
                "expander.max_rewrites must be at least 1".to_string(),
            ));
        }
        if self.integrator.package.trim().is_empty() {
            return Err(GalantError::Config(
                "integrator.package must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Expander configured with these settings
    pub fn expander(&self) -> Expander {
        Expander::new(self.expander.clone())
    }

    /// Integrator configured with these settings
    pub fn integrator(&self) -> SourceIntegrator {
        SourceIntegrator::new(self.integrator.clone())
    }
}

/// Error types for Galant core operations
#[derive(thiserror::Error, Debug)]
pub enum GalantError {
    /// Macro expansion failed
    #[error("{0}")]
    Macro(#[from] MacroError),

    /// Reading a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`GalantConfig`]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values are out of range
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Galant core operations
pub type Result<T> = std::result::Result<T, GalantError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::DelimiterSet;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = GalantConfig::from_json_str(r#"{ "expander": { "max_rewrites": 10 } }"#).unwrap();
        assert_eq!(config.expander.max_rewrites, 10);
        assert_eq!(config.expander.delimiters, DelimiterSet::default());
        assert_eq!(config.integrator, IntegratorConfig::default());
        assert!(!config.debug);
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut config = GalantConfig::default();
        config.integrator.package = "demo".to_string();
        config.expander.delimiters = DelimiterSet::parse("(){}").unwrap();
        let json = config.to_json_string().unwrap();
        assert!(json.contains(r#""delimiters": "(){}""#));
        assert_eq!(GalantConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            GalantConfig::from_json_str(r#"{ "expander": { "delimiters": "((" } }"#),
            Err(GalantError::Json(_))
        ));
        assert!(matches!(
            GalantConfig::from_json_str(r#"{ "expander": { "max_rewrites": 0 } }"#),
            Err(GalantError::Config(_))
        ));
        assert!(matches!(
            GalantConfig::from_json_str("not json"),
            Err(GalantError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("galant.json");
        std::fs::write(&path, r#"{ "debug": true }"#).unwrap();
        assert!(GalantConfig::load(&path).unwrap().debug);
        assert!(matches!(
            GalantConfig::load(dir.path().join("missing.json")),
            Err(GalantError::Io(_))
        ));
    }

    #[test]
    fn test_macro_error_display_is_unchanged() {
        let err: GalantError = MacroError::MissingBlock {
            rule: "for_outgoing".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "malformed macro: for_outgoing: curly braces required");
    }
}
