//! Replay settings, layered: defaults, then an optional settings file, then
//! `EROSION__*` environment variables (e.g. `EROSION__FRAME_MS=8`).
//! Command-line flags override the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use erosion_core::config::EngineConfig;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReplaySettings {
    /// Spacing of simulated animation frames.
    pub frame_ms: f64,
    /// Directory for the file-backed store. Defaults to the user data dir.
    pub data_dir: Option<PathBuf>,
    /// Targets need explicit `visible` lines; otherwise all count as visible.
    pub observe: bool,
    /// Engine config JSON (camelCase); defaults when absent.
    pub engine_config: Option<PathBuf>,
    /// Wall-clock time the recording started at. Defaults to now.
    pub wall_origin_ms: Option<f64>,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            frame_ms: 16.0,
            data_dir: None,
            observe: false,
            engine_config: None,
            wall_origin_ms: None,
        }
    }
}

impl ReplaySettings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("EROSION").separator("__"))
            .build()
            .context("reading replay settings")?
            .try_deserialize::<Self>()
            .context("decoding replay settings")?;
        Ok(settings)
    }

    /// Data directory, falling back to `<data dir>/landscrap/erosion`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("landscrap")
                .join("erosion")
        })
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        match &self.engine_config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                EngineConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(EngineConfig::default()),
        }
    }
}
