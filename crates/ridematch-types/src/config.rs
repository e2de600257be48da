//! Configuration for a matching-engine instance.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{RidematchError, Result, constants};

/// How the distance matrix grows when a new location is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionMode {
    /// Query new→existing and existing→new separately. Exact for
    /// asymmetric travel times.
    #[default]
    Directed,
    /// Query new→existing only and mirror it into the existing→new column.
    /// Saves one oracle request; only valid for symmetric travel times.
    Mirrored,
}

/// Configuration for one matching pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Timeout handed to every distance-oracle request.
    pub oracle_timeout_ms: u64,
    /// Matrix extension strategy.
    pub extension_mode: ExtensionMode,
    /// Number of candidates returned when the host does not ask for a k.
    pub default_top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oracle_timeout_ms: constants::DEFAULT_ORACLE_TIMEOUT_MS,
            extension_mode: ExtensionMode::default(),
            default_top_k: constants::DEFAULT_TOP_K,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document. Omitted fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.oracle_timeout_ms == 0 {
            return Err(RidematchError::Configuration(
                "oracle_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }
}
