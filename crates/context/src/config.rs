//! Resolver configuration

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// How the resolver scans declared injections before launching resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Validate every descriptor first; nothing is resolved if one is missing
    #[default]
    Atomic,
    /// Validate while resolving. Slots before the first missing descriptor
    /// have already been resolved when the error is raised, and any promises
    /// they produced are dropped unobserved.
    Interleaved,
}

/// Configuration for [`crate::InjectionResolver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Descriptor validation strategy
    pub scan_mode: ScanMode,
    /// Per-slot trace logging
    pub verbose_logging: bool,
    /// Maximum number of class bindings instantiated inside one another
    pub max_resolution_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::Atomic,
            verbose_logging: cfg!(debug_assertions),
            max_resolution_depth: 50,
        }
    }
}

impl ResolverConfig {
    /// Production preset: atomic scans, quiet
    pub fn production() -> Self {
        Self {
            scan_mode: ScanMode::Atomic,
            verbose_logging: false,
            max_resolution_depth: 25,
        }
    }

    /// Development preset: atomic scans with per-slot tracing
    pub fn development() -> Self {
        Self {
            scan_mode: ScanMode::Atomic,
            verbose_logging: true,
            max_resolution_depth: 100,
        }
    }

    /// Minimal preset for tests
    pub fn minimal() -> Self {
        Self {
            scan_mode: ScanMode::Atomic,
            verbose_logging: false,
            max_resolution_depth: 10,
        }
    }

    pub fn with_scan_mode(mut self, scan_mode: ScanMode) -> Self {
        self.scan_mode = scan_mode;
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// Parse from TOML; missing fields fall back to defaults
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Failed to parse resolver configuration")
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("Failed to serialize resolver configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_atomic() {
        assert_eq!(ResolverConfig::default().scan_mode, ScanMode::Atomic);
        assert!(!ResolverConfig::production().verbose_logging);
        assert!(ResolverConfig::development().verbose_logging);
    }

    #[test]
    fn test_from_toml() -> anyhow::Result<()> {
        let config = ResolverConfig::from_toml_str(
            r#"
            scan_mode = "interleaved"
            verbose_logging = true
            "#,
        )?;
        assert_eq!(config.scan_mode, ScanMode::Interleaved);
        assert!(config.verbose_logging);

        let partial = ResolverConfig::from_toml_str("verbose_logging = false")?;
        assert_eq!(partial.scan_mode, ScanMode::Atomic);
        assert_eq!(partial.max_resolution_depth, 50);
        Ok(())
    }

    #[test]
    fn test_toml_round_trip_preserves_mode() -> anyhow::Result<()> {
        let config = ResolverConfig::minimal().with_scan_mode(ScanMode::Interleaved);
        let parsed = ResolverConfig::from_toml_str(&config.to_toml_string()?)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(ResolverConfig::from_toml_str(r#"scan_mode = "lazy""#).is_err());
    }
}
