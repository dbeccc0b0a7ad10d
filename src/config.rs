use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::block::BlockKind;
use crate::error::ConfigError;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

// build.rs rejects a malformed default_config.toml, so the fallback only
// guards against a file that parses as TOML but not as a Config.
static COMPILED_DEFAULT: LazyLock<Config> =
    LazyLock::new(|| toml::from_str(DEFAULT_CONFIG).unwrap_or_default());

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub blocks: BlocksConfig,
    pub list: ListConfig,
}

/// What to do with a known block whose data lacks or mistypes a required field.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvalidBlockPolicy {
    /// Abort the render and return the error.
    #[default]
    Error,
    /// Drop the block and continue with the next one.
    Skip,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BlocksConfig {
    pub on_invalid: InvalidBlockPolicy,
    /// Block type names handled as if no renderer were registered for them.
    pub disabled: Vec<String>,
}

impl BlocksConfig {
    pub fn is_enabled(&self, kind: BlockKind) -> bool {
        !self.disabled.iter().any(|name| name == kind.name())
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ListConfig {
    /// Render `"items": []` as an empty nested list instead of nothing.
    pub empty_wrapper: bool,
}

impl Config {
    /// The defaults shipped in `default_config.toml`.
    pub fn compiled_default() -> Self {
        COMPILED_DEFAULT.clone()
    }

    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a TOML file, surfacing read and parse failures.
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) => {
                debug!(path = %path.display(), error = %e, "config file not read, using defaults");
                Self::compiled_default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Self::compiled_default()
            }
        }
    }
}
