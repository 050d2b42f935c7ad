use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::logging::LoggingConfig;
use crate::rollup::RollupSection;
use crate::validate;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RollupConfigRaw {
    #[serde(default)]
    rollup: RollupSection,
    #[serde(default)]
    logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// RollupConfig (resolved, validated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RollupConfig {
    pub rollup: RollupSection,
    pub logging: LoggingConfig,
}

impl RollupConfig {
    /// Read and parse a `rollup.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for RollupConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a validated [`RollupConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: RollupConfigRaw = toml::from_str(toml_str)?;

        let config = RollupConfig {
            rollup: raw.rollup,
            logging: raw.logging,
        };

        validate::validate_rollup(&config.rollup)?;

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
