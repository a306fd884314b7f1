use serde::Deserialize;
use std::path::Path;

/// Run parameters for the strata binary. Every field has a default, so an
/// empty file (or no file at all) yields the reference scenario.
#[derive(Deserialize, Debug, PartialEq)]
pub struct StrataConfig {
    /// Items the producer appends, in order, once per round.
    #[serde(default = "defaults::source_items")]
    pub source_items: Vec<String>,
    /// How many times the source sequence is appended.
    #[serde(default = "defaults::rounds")]
    pub rounds: usize,
    /// Number of consumer threads following the log.
    #[serde(default = "defaults::consumers")]
    pub consumers: usize,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn source_items() -> Vec<String> {
        ["Hello", "world", "!!!"].map(str::to_owned).to_vec()
    }

    pub fn rounds() -> usize {
        10_000
    }

    pub fn consumers() -> usize {
        2
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            source_items: defaults::source_items(),
            rounds: defaults::rounds(),
            consumers: defaults::consumers(),
            log_level: defaults::log_level(),
        }
    }
}

impl StrataConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let strata_config: StrataConfig = toml::from_str(&toml_to_str)?;
        Ok(strata_config)
    }
}
