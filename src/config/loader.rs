//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings and region policy tables from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, RegionPolicy};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml      # Engine settings
/// └── regions/
///     ├── bd.yaml      # Default rules for Bangladesh
///     └── sa.yaml      # Default rules for Saudi Arabia
/// ```
///
/// # Example
///
/// ```no_run
/// use leave_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let policy = loader.region("bd").unwrap();
/// println!("Loaded {} default rules for {}", policy.rules.len(), policy.name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or the `regions` directory is missing
    /// - Any file contains invalid YAML
    /// - The `regions` directory holds no policy files
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let regions = Self::load_regions(&path.join("regions"))?;

        Ok(Self {
            config: EngineConfig::new(settings, regions),
        })
    }

    /// Builds a loader from values already in memory.
    pub fn from_parts(settings: EngineSettings, regions: Vec<RegionPolicy>) -> Self {
        Self {
            config: EngineConfig::new(settings, regions),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all region policy files from the regions directory.
    fn load_regions(regions_dir: &Path) -> EngineResult<Vec<RegionPolicy>> {
        let regions_dir_str = regions_dir.display().to_string();

        let entries = fs::read_dir(regions_dir).map_err(|_| EngineError::ConfigNotFound {
            path: regions_dir_str.clone(),
        })?;

        let mut regions = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: regions_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                regions.push(Self::load_yaml::<RegionPolicy>(&path)?);
            }
        }

        if regions.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no region files found)", regions_dir_str),
            });
        }

        Ok(regions)
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Gets a region policy by its code (case-insensitive).
    ///
    /// Returns [`EngineError::UnknownRegion`] if no table exists for the code.
    pub fn region(&self, code: &str) -> EngineResult<&RegionPolicy> {
        self.config
            .regions()
            .get(&code.to_lowercase())
            .ok_or_else(|| EngineError::UnknownRegion {
                region: code.to_string(),
            })
    }
}
