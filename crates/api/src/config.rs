use anyhow::{Context, Result};
use graph::{LabelPolicy, MissingTargets, PresenterOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use store::ListingLimits;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub saves_root: PathBuf,
    pub listing: ListingLimits,
    pub presenter: PresenterOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            // The generators write next to the web app, one level up.
            saves_root: PathBuf::from("../saves"),
            listing: ListingLimits::default(),
            presenter: PresenterOptions::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file named by `SAVES_CONFIG`, then `SAVES_*` variables.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("SAVES_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SAVES_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(root) = lookup("SAVES_ROOT") {
            self.saves_root = PathBuf::from(root);
        }
        if let Some(depth) = lookup("SAVES_MAX_DEPTH") {
            self.listing.max_depth = depth
                .parse()
                .with_context(|| format!("SAVES_MAX_DEPTH is not a number: {}", depth))?;
        }
        if let Some(files) = lookup("SAVES_MAX_FILES") {
            self.listing.max_files = files
                .parse()
                .with_context(|| format!("SAVES_MAX_FILES is not a number: {}", files))?;
        }
        if let Some(labels) = lookup("SAVES_LABELS") {
            self.presenter.labels = labels.parse::<LabelPolicy>().map_err(anyhow::Error::msg)?;
        }
        if let Some(missing) = lookup("SAVES_MISSING") {
            self.presenter.missing_targets =
                missing.parse::<MissingTargets>().map_err(anyhow::Error::msg)?;
        }
        if let Some(format) = lookup("SAVES_LOG_FORMAT") {
            self.logging.format = match format.as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => anyhow::bail!("Unknown SAVES_LOG_FORMAT: {}", other),
            };
        }
        if let Some(level) = lookup("SAVES_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }
}
