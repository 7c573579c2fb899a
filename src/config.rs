use serde::Deserialize;
use std::path::{Path, PathBuf};

use tonewave::analysis::AnalysisConfig;
use tonewave::generate::GeneratorConfig;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_filename")]
    pub filename: PathBuf,
    #[serde(default = "default_tempo")]
    pub tempo: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            tempo: default_tempo(),
        }
    }
}

fn default_filename() -> PathBuf { "signal.wav".into() }
fn default_tempo() -> f64 { 100.0 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Explicit path, else `tonewave.toml` in the working directory, else the
/// user's config directory.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("tonewave.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("tonewave").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("tonewave").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
