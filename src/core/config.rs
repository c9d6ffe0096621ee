use crate::core::analytics::DEFAULT_UPCOMING_LIMIT;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Remote,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LocalStoreConfig {
    /// Overrides the default data directory.
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteStoreConfig {
    #[serde(default = "RemoteStoreConfig::default_base_url")]
    pub base_url: String,
    pub project_id: String,
    #[serde(default = "RemoteStoreConfig::default_collection")]
    pub collection: String,
    pub api_key: Option<String>,
    #[serde(default = "RemoteStoreConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "RemoteStoreConfig::default_retries")]
    pub retries: usize,
    #[serde(default = "RemoteStoreConfig::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl RemoteStoreConfig {
    fn default_base_url() -> String {
        "https://firestore.googleapis.com/v1".to_string()
    }

    fn default_collection() -> String {
        "subscriptions".to_string()
    }

    fn default_timeout_secs() -> u64 {
        10
    }

    fn default_retries() -> usize {
        2
    }

    fn default_retry_delay_ms() -> u64 {
        500
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub local: LocalStoreConfig,
    pub remote: Option<RemoteStoreConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub currency: String,
    #[serde(default = "AppConfig::default_upcoming_limit")]
    pub upcoming_limit: usize,
    #[serde(default = "AppConfig::default_seed_demo_data")]
    pub seed_demo_data: bool,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    fn default_upcoming_limit() -> usize {
        DEFAULT_UPCOMING_LIMIT
    }

    fn default_seed_demo_data() -> bool {
        true
    }

    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "subtrack", "subtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Directory of the local store: the configured override or the project data dir.
    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.storage.local.path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "subtrack", "subtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("subscriptions"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "USD"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.upcoming_limit, 5);
        assert!(config.seed_demo_data);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert!(config.storage.local.path.is_none());
        assert!(config.storage.remote.is_none());

        let yaml_str_with_storage = r#"
currency: "EUR"
upcoming_limit: 3
seed_demo_data: false
storage:
  backend: remote
  local:
    path: "/tmp/subtrack"
  remote:
    project_id: "subscription-demo"
    api_key: "secret"
        "#;
        let config: AppConfig = serde_yaml::from_str(yaml_str_with_storage).unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.upcoming_limit, 3);
        assert!(!config.seed_demo_data);
        assert_eq!(config.storage.backend, StorageBackend::Remote);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/subtrack")
        );

        let remote = config.storage.remote.unwrap();
        assert_eq!(remote.base_url, "https://firestore.googleapis.com/v1");
        assert_eq!(remote.project_id, "subscription-demo");
        assert_eq!(remote.collection, "subscriptions");
        assert_eq!(remote.api_key.as_deref(), Some("secret"));
        assert_eq!(remote.timeout_secs, 10);
        assert_eq!(remote.retries, 2);
        assert_eq!(remote.retry_delay_ms, 500);
    }

    #[test]
    fn test_memory_backend() {
        let yaml_str = r#"
currency: "USD"
storage:
  backend: memory
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let yaml_str = r#"
currency: "USD"
storage:
  backend: floppy
"#;
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = AppConfig::load_from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
