//! Engine error types

use thiserror::Error;
use tilth_core::SelectorError;
use tilth_platform::PlatformError;

/// Errors raised while configuring or starting the engine
///
/// Once started, the engine does not fail: missing elements disable the
/// feature that needed them.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A configured selector does not parse
    #[error("Invalid selector for {component}: {source}")]
    Selector {
        component: &'static str,
        #[source]
        source: SelectorError,
    },

    /// A configured root margin does not parse
    #[error("Invalid root margin '{0}'")]
    RootMargin(String),

    /// The configured email pattern is not a valid regex
    #[error("Invalid email pattern: {0}")]
    EmailPattern(#[from] regex::Error),

    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be rendered back to TOML
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Host storage failure
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
