//! Scenario loading errors.

use thiserror::Error;

/// Errors that can occur while loading or building a scenario.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Scenario file could not be read.
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario file is not valid YAML for [`crate::ScenarioConfig`].
    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A numeric setting is outside the range the engine can run with.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
