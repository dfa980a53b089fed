use crate::models::{CustomData, Livery, LiveryCatalogEntry, MatchMakerConfig, build_liveries};
use crate::services::write_with_backup;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the configuration inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "MatchMaker.yaml";

/// Configuration manager for loading and saving YAML files.
///
/// Manages:
/// - The main config (`MatchMaker.yaml`): paths, rule tables, custom data
/// - Livery catalogs written by the livery scanner
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `MatchMaker.yaml`; created if missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the configuration file.
    ///
    /// # Returns
    /// The loaded configuration, or the stock configuration if the file doesn't exist
    pub fn load_config(&self) -> Result<MatchMakerConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using default configuration",
                self.config_path
            );
            return Ok(MatchMakerConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config = Self::parse_config(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Parse configuration YAML, e.g. text edited in a configuration view
    pub fn parse_config(yaml: &str) -> Result<MatchMakerConfig> {
        let config: MatchMakerConfig =
            serde_yaml_ng::from_str(yaml).context("Invalid configuration YAML")?;
        Ok(config)
    }

    /// Save the configuration file, keeping the previous file as `.bak`.
    pub fn save_config(&self, config: &MatchMakerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        write_with_backup(&self.config_path, &yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Load a livery catalog and apply the custom data overrides.
    pub fn load_liveries(&self, catalog_path: &Utf8Path, custom: &CustomData) -> Result<Vec<Livery>> {
        let file_contents = fs::read_to_string(&catalog_path)
            .with_context(|| format!("Failed to read livery catalog: {}", catalog_path))?;

        let entries: Vec<LiveryCatalogEntry> = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse livery catalog: {}", catalog_path))?;

        tracing::info!(
            "Loaded {} catalog entries from {}",
            entries.len(),
            catalog_path
        );
        Ok(build_liveries(&entries, custom))
    }

    /// Resolve a path relative to the configuration directory
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
