use crate::loader::archive::DEFAULT_CHUNK_SIZE;
use crate::model::ConfigError;
use crate::renderer::colors::{Rgb, parse_color};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PLOT_COLOR: &str = "royalblue";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_map_style")]
    pub style: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
            style: default_map_style(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub observations_path: PathBuf,
    pub taxonomy_path: PathBuf,
    pub archive_path: PathBuf,
    pub token_path: PathBuf,
    pub output_dir: PathBuf,
    /// Where the per-species history extract is kept; falls back to `output_dir`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    pub highlight_species: String,
    #[serde(default)]
    pub plot_color: Option<String>,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_history_start")]
    pub history_start_year: i32,
    /// Exclusive.
    #[serde(default = "default_history_end")]
    pub history_end_year: i32,
    #[serde(default = "default_chunk_size")]
    pub archive_chunk_size: usize,
    #[serde(default = "default_rolling_window")]
    pub rolling_window_days: usize,
    #[serde(default)]
    pub map: MapConfig,
}

impl AppConfig {
    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.as_deref().unwrap_or(&self.output_dir)
    }

    pub fn highlight_color(&self) -> Result<Rgb, ConfigError> {
        let name = self.plot_color.as_deref().unwrap_or(DEFAULT_PLOT_COLOR);
        parse_color(name).ok_or_else(|| ConfigError::Invalid(format!("unknown plot color '{}'", name)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.highlight_species.trim().is_empty() {
            return Err(ConfigError::Invalid("highlight_species is empty".into()));
        }
        if self.archive_chunk_size == 0 {
            return Err(ConfigError::Invalid("archive_chunk_size must be positive".into()));
        }
        if self.rolling_window_days == 0 {
            return Err(ConfigError::Invalid("rolling_window_days must be positive".into()));
        }
        if self.history_start_year >= self.history_end_year {
            return Err(ConfigError::Invalid(format!(
                "history window [{}, {}) is empty",
                self.history_start_year, self.history_end_year
            )));
        }
        self.highlight_color()?;
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

fn default_year() -> i32 {
    2022
}

fn default_history_start() -> i32 {
    1970
}

fn default_history_end() -> i32 {
    2023
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_rolling_window() -> usize {
    14
}

fn default_center_lat() -> f64 {
    54.9
}

fn default_center_lon() -> f64 {
    -115.0
}

fn default_zoom() -> f64 {
    4.0
}

fn default_map_style() -> String {
    "light".into()
}
