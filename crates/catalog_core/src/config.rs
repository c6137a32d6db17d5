use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "config.json";
const LOGS_DIR: &str = "logs";

/// Service configuration stored at `~/.catalog/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory report files are generated in. Defaults to the OS temp dir.
    pub export_dir: Option<PathBuf>,
    /// Format token used when a request does not name one.
    pub default_export_format: String,
    /// Base name of the product report file.
    pub product_report_name: String,
    pub log_level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            default_export_format: "xlsx".into(),
            product_report_name: "product_report".into(),
            log_level: "info".into(),
        }
    }
}

impl CatalogConfig {
    /// Returns the base config directory: `~/.catalog/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".catalog"))
    }

    /// Returns the logs directory: `~/.catalog/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join(LOGS_DIR))
    }

    /// Ensures `base` and its logs directory exist.
    pub fn ensure_dirs(base: &Path) -> Result<()> {
        for dir in [base.to_path_buf(), base.join(LOGS_DIR)] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads `~/.catalog/config.json`, creating a default one if missing.
    pub fn load() -> Result<Self> {
        Self::load_in(&Self::base_dir()?)
    }

    /// Loads `config.json` from `base`, creating the directory layout and a
    /// default file if missing.
    pub fn load_in(base: &Path) -> Result<Self> {
        Self::ensure_dirs(base)?;
        Self::load_from_path(&base.join(CONFIG_FILE))
    }

    /// Load config from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Directory reports are generated in.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
