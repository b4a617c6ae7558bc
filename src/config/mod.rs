use crate::models::Preferences;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the importer preferences.
pub const PREFERENCES_FILE: &str = "Importer Preferences.yaml";

/// Prefix of environment variables overriding preferences, e.g. `DOS2DE_DIVINE_PATH`.
pub const ENV_PREFIX: &str = "DOS2DE";

/// Configuration manager for loading and saving the importer preferences.
///
/// Preferences are layered: `Importer Preferences.yaml` in the config
/// directory, then `DOS2DE_*` environment variables on top.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    preferences_path: Utf8PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the preferences file, created if missing
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            preferences_path: config_dir.join(PREFERENCES_FILE),
            config_dir,
            env_prefix: ENV_PREFIX.to_string(),
        })
    }

    /// Use a different environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load the preferences.
    ///
    /// # Returns
    /// The loaded Preferences; defaults plus environment overrides if the file doesn't exist
    pub fn load_preferences(&self) -> Result<Preferences> {
        if !self.preferences_path.exists() {
            tracing::warn!(
                "Preferences file not found at {}, using defaults",
                self.preferences_path
            );
        }

        let settings = Config::builder()
            .add_source(File::new(self.preferences_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(Environment::with_prefix(&self.env_prefix).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read preferences: {}", self.preferences_path))?;

        let preferences: Preferences = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse preferences: {}", self.preferences_path))?;

        tracing::info!("Loaded preferences from {}", self.preferences_path);
        Ok(preferences)
    }

    /// Save the preferences.
    ///
    /// # Arguments
    /// * `preferences` - The Preferences to save
    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(preferences)
            .context("Failed to serialize preferences to YAML")?;

        fs::write(&self.preferences_path, yaml_string)
            .with_context(|| format!("Failed to write preferences: {}", self.preferences_path))?;

        tracing::info!("Saved preferences to {}", self.preferences_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn preferences_path(&self) -> &Utf8Path {
        &self.preferences_path
    }
}
