//! Application settings layered from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::{catalog::SaveFormat, years::DEFAULT_START_YEAR};

/// Directory name under the platform config/data roots.
pub const APP_DIR: &str = "switchlib";
/// Prefix for environment overrides, e.g. `SWITCHLIB_START_YEAR`.
pub const ENV_PREFIX: &str = "SWITCHLIB";

const DEFAULT_CONFIG: &str = r#"# switchlib settings

# Directory the save prompt starts in.
# save_dir = "/home/me/.local/share/switchlib"

# File name suggested by the save prompt.
file_name = "games.json"

# "json" writes the whole list as one JSON array, "text" one summary per line.
format = "json"

# Oldest release year offered in the year selector.
start_year = 2016
"#;

/// Settings used by front ends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the save prompt starts in.
    pub save_dir: PathBuf,
    /// File name suggested by the save prompt.
    pub file_name: String,
    /// Format used when saving the catalog.
    pub format: SaveFormat,
    /// Oldest release year offered for selection.
    pub start_year: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR),
            file_name: "games.json".to_string(),
            format: SaveFormat::Json,
            start_year: DEFAULT_START_YEAR,
        }
    }
}

impl AppConfig {
    /// Load from the default config file plus `SWITCHLIB_*` variables.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let settings = Config::builder()
            .add_source(File::from(path.as_path()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        settings
            .try_deserialize()
            .context("failed to parse settings")
    }

    /// Load from a specific file only, ignoring the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse settings in {}", path.display()))
    }

    /// Suggested destination for a save.
    pub fn save_path(&self) -> PathBuf {
        self.save_dir.join(&self.file_name)
    }
}

/// Location of the settings file under the user's config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Write a commented default settings file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.start_year, 2016);
        assert!(config.save_path().ends_with("switchlib/games.json"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "save_dir = \"/tmp/switch\"\nformat = \"text\"\nstart_year = 2019\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.save_dir, PathBuf::from("/tmp/switch"));
        assert_eq!(config.format, SaveFormat::Text);
        assert_eq!(config.start_year, 2019);
        assert_eq!(config.file_name, "games.json");
        Ok(())
    }

    #[test]
    fn default_file_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.format, SaveFormat::Json);
        assert_eq!(config.start_year, DEFAULT_START_YEAR);

        fs::write(&path, "start_year = 2020\n")?;
        write_default_config(&path)?;
        assert_eq!(AppConfig::load_from(&path)?.start_year, 2020);
        Ok(())
    }
}
