use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::render::GraphStyle;

/// Speed-graph sizing (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Horizontal pixels between consecutive sample points.
    pub line_spacing: u32,
    /// Stroke width / edge margin in pixels.
    pub stroke_width: u32,
    /// Preferred graph height in pixels.
    pub height: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            line_spacing: 6,
            stroke_width: 2,
            height: 80,
        }
    }
}

impl GraphConfig {
    pub fn style(&self) -> GraphStyle {
        GraphStyle {
            line_spacing: self.line_spacing,
            stroke_width: self.stroke_width,
        }
    }
}

/// Global configuration loaded from `~/.config/tmon/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// How often progress is re-estimated, in milliseconds.
    pub refresh_rate_ms: u64,
    /// Number of throughput samples kept for the speed graph.
    pub history_capacity: usize,
    /// Speed-graph sizing; built-in defaults are used if missing.
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 1000,
            history_capacity: 1000,
            graph: GraphConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tmon")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MonitorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MonitorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MonitorConfig = toml::from_str(&data)?;
    Ok(cfg)
}
