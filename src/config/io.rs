use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const SECTION_KEYS: [&str; 5] = ["content", "playback", "storage", "logging", "keys"];

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

/// Parse either the sectioned layout (`[playback]`, `[keys]`, ...) or a flat
/// list of top-level keys.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let table: toml::Table = toml::from_str(contents).context("Parsing config TOML")?;
    let sectioned = SECTION_KEYS.iter().any(|key| table.contains_key(*key));
    if sectioned {
        let tables: ConfigTables =
            toml::from_str(contents).context("Parsing sectioned config")?;
        Ok(tables.into())
    } else {
        toml::from_str(contents).context("Parsing flat config")
    }
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Serializing config")
}
