// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Configuration for geometry assembly and projection

use crate::geometry::BoundingBox;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Squared distance that marks "no projection found yet".
pub const DEFAULT_SENTINEL: f64 = 1e10;

/// Default configuration file looked up by [`SurfConfig::load`].
pub const CONFIG_FILE: &str = "discretesurf.toml";

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfConfig {
    /// Initial squared distance of a fresh projection accumulator
    pub sentinel_distance2: f64,
    /// Restrict spatial indices to elements touching this box
    pub bounding_box: Option<BoundingBox>,
    /// Maximum number of elements per BVH leaf
    pub leaf_size: usize,
    /// Trim and lowercase section names read from mesh files
    pub lowercase_names: bool,
    /// Verbose output
    pub verbose: bool,
}

impl Default for SurfConfig {
    fn default() -> Self {
        Self {
            sentinel_distance2: DEFAULT_SENTINEL,
            bounding_box: None,
            leaf_size: 4,
            lowercase_names: true,
            verbose: false,
        }
    }
}

impl SurfConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SurfConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(sentinel) = std::env::var("DISCRETESURF_SENTINEL") {
            match sentinel.parse() {
                Ok(value) => self.sentinel_distance2 = value,
                Err(_) => log::warn!("Ignoring invalid DISCRETESURF_SENTINEL={}", sentinel),
            }
        }

        if let Ok(leaf_size) = std::env::var("DISCRETESURF_LEAF_SIZE") {
            match leaf_size.parse::<usize>() {
                Ok(value) if value > 0 => self.leaf_size = value,
                _ => log::warn!("Ignoring invalid DISCRETESURF_LEAF_SIZE={}", leaf_size),
            }
        }

        if let Ok(verbose) = std::env::var("DISCRETESURF_VERBOSE") {
            self.verbose = verbose.parse().unwrap_or(false);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Normalize a section name the way names read from mesh files are
    pub fn normalize_name(&self, name: &str) -> String {
        if self.lowercase_names {
            name.trim().to_lowercase()
        } else {
            name.trim().to_string()
        }
    }
}
