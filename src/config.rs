use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::Catalog;
use crate::store::DEFAULT_STORAGE_KEY;

const APP_NAME: &str = "learnpath";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding progress. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// JSON curriculum file. The bundled curriculum is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Key the progress record is stored under.
    pub storage_key: String,
    /// Port for the HTTP API.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            catalog_path: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Load configuration from the user's config directory, then apply
    /// `LEARNPATH_*` environment overrides.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable ports are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("LEARNPATH_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("LEARNPATH_CATALOG") {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(key) = lookup("LEARNPATH_STORAGE_KEY").filter(|k| !k.trim().is_empty()) {
            self.storage_key = key;
        }
        if let Some(port) = lookup("LEARNPATH_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid LEARNPATH_PORT: {}", port),
            }
        }
        self
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Build the catalog. Invalid curricula are fatal.
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> Result<Database> {
        let db = match &self.database_path {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "port": 8080 }"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("LEARNPATH_DB", "/tmp/progress.db"),
            ("LEARNPATH_STORAGE_KEY", "alt-key"),
            ("LEARNPATH_PORT", "4100"),
        ]));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/progress.db")));
        assert_eq!(config.storage_key, "alt-key");
        assert_eq!(config.port, 4100);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("LEARNPATH_PORT", "not-a-port"),
            ("LEARNPATH_STORAGE_KEY", "  "),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn builtin_catalog_without_path() {
        let catalog = AppConfig::default().load_catalog().unwrap();
        assert!(!catalog.modules().is_empty());
    }
}
