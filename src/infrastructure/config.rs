//! Application configuration
//!
//! Configuration is plain data with sensible defaults; it can be loaded from
//! and saved to a JSON file. Nothing in the core reads configuration
//! ambiently; the session receives one `AppConfig` at construction.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::sanitize::{DEFAULT_IDENTIFIER_LIMIT, DEFAULT_TEXT_LIMIT};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bounds applied during sanitization.
    pub limits: LimitsConfig,

    /// Cart persistence settings.
    pub storage: StorageConfig,

    /// Where the autoload pipeline looks for data files.
    pub sources: SourceConfig,
}

/// Bounds applied to untrusted input values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters kept in free-text values.
    pub max_text_len: usize,

    /// Maximum characters kept in identifiers.
    pub max_identifier_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_len: DEFAULT_TEXT_LIMIT,
            max_identifier_len: DEFAULT_IDENTIFIER_LIMIT,
        }
    }
}

/// Lifetime of persisted cart state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    /// Survives only the current session (temp-dir backed). The default.
    Session,
    /// Survives restarts (platform data dir).
    Durable,
}

/// Cart persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub scope: StorageScope,

    /// Fixed key the cart snapshot is stored under.
    pub cart_key: String,

    /// Explicit storage directory; overrides the scope-derived default.
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scope: StorageScope::Session,
            cart_key: "mini_shop_cart_v1".to_string(),
            directory: None,
        }
    }
}

/// Data file locations used by the autoload pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base directory or URL prefix the file names below are joined to.
    pub base: String,
    pub workbook_file: String,
    pub filter_file: String,
    pub product_file: String,
    pub service_file: String,
}

impl SourceConfig {
    /// Join a file name onto the base, for both URL and path style bases.
    pub fn location(&self, file: &str) -> String {
        let base = self.base.trim_end_matches('/');
        if base.is_empty() {
            file.to_string()
        } else {
            format!("{base}/{file}")
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base: "data".to_string(),
            workbook_file: "app-data.xlsx".to_string(),
            filter_file: "filter.csv".to_string(),
            product_file: "produkte.csv".to_string(),
            service_file: "services.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, creating it with defaults when
    /// missing.
    pub async fn load_or_create(path: &Path) -> Result<Self> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(path).await?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Persist configuration as pretty-printed JSON.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        tokio::fs::write(path, raw)
            .await
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
