use crate::models::settings::GridSettings;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "grid.toml";

/// Where grid settings live when no explicit path is given.
pub fn default_settings_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("com", "ScheduleDrag", "ScheduleDrag") {
        dirs.config_dir().join(SETTINGS_FILE)
    } else {
        log::warn!("Unable to resolve project directory; using current dir for grid settings");
        PathBuf::from(SETTINGS_FILE)
    }
}

/// Loads and stores [`GridSettings`] as a TOML file.
pub struct SettingsService {
    path: PathBuf,
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new(default_settings_path())
    }
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current settings
    ///
    /// A missing file yields the defaults. Missing keys take their default
    /// values, so older files keep loading.
    pub fn get(&self) -> Result<GridSettings> {
        if !self.path.exists() {
            log::debug!(
                "No grid settings at {}, using defaults",
                self.path.display()
            );
            return Ok(GridSettings::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: GridSettings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;

        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is unusable.
    pub fn get_or_default(&self) -> GridSettings {
        match self.get() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                GridSettings::default()
            }
        }
    }

    /// Update settings
    pub fn update(&self, settings: &GridSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;

        log::info!("Saved grid settings to {}", self.path.display());
        Ok(())
    }

    /// Reset settings to defaults
    pub fn reset(&self) -> Result<()> {
        self.update(&GridSettings::default())
    }
}
