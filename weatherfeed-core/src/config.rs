use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::{
    accessor::FeedShape,
    client::{DEFAULT_TIMEOUT, FeedConfig},
    error::ConfigError,
    query::{LocationId, UnitSystem},
};

/// Defaults read from the user's config file.
///
/// Example TOML:
/// ```toml
/// location = "Cologne"   # or a numeric id: location = 667931
/// units = "c"
/// shape = "json"
/// endpoint = "https://query.yahooapis.com/v1/public/yql"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub location: Option<LocationId>,

    /// Unit system token, "c" or "f".
    pub units: Option<String>,

    /// Feed shape, "json" or "xml".
    pub shape: Option<String>,

    pub endpoint: Option<String>,

    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        contents
            .parse()
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherfeed", "weatherfeed")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn unit_system(&self) -> Result<UnitSystem, ConfigError> {
        self.units.as_deref().map_or(Ok(UnitSystem::default()), UnitSystem::try_from)
    }

    pub fn feed_shape(&self) -> Result<FeedShape, ConfigError> {
        self.shape.as_deref().map_or(Ok(FeedShape::default()), FeedShape::try_from)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    /// Validate the tokens and turn them into a client configuration.
    pub fn to_feed_config(&self) -> Result<FeedConfig, ConfigError> {
        Ok(FeedConfig {
            location: self.location.clone(),
            units: self.unit_system()?,
            shape: self.feed_shape()?,
            endpoint: self.endpoint.clone(),
            timeout: self.timeout(),
        })
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
