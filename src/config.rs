use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Settings for addressing the remote document store
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub project: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("FIRESTORE_API_KEY".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project: String::new(),
            database: default_database(),
            collection: default_collection(),
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl StoreConfig {
    /// Resolve the bearer key from config or environment. `None` means
    /// unauthenticated, which is fine against a local emulator.
    pub fn resolve_api_key(&self) -> Option<String> {
        // Direct key takes priority
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }

        if let Some(env_var) = &self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }

        None
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default paths.
    /// Priority: local (.roster/config.local.toml) > project
    /// (.roster/config.toml) > user (~/.roster/config.toml), starting
    /// from built-in defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".roster").join("config.toml");
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = Path::new(".roster").join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        // Local overrides, expected to be gitignored
        let local_config = Path::new(".roster").join("config.local.toml");
        if local_config.exists() {
            config.merge(Self::load_from(&local_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority for
    /// every field it sets away from the defaults).
    pub fn merge(&mut self, other: Config) {
        let defaults = StoreConfig::default();
        if other.store.base_url != defaults.base_url {
            self.store.base_url = other.store.base_url;
        }
        if !other.store.project.is_empty() {
            self.store.project = other.store.project;
        }
        if other.store.database != defaults.database {
            self.store.database = other.store.database;
        }
        if other.store.collection != defaults.collection {
            self.store.collection = other.store.collection;
        }
        if other.store.api_key.is_some() {
            self.store.api_key = other.store.api_key;
        }
        if other.store.api_key_env != defaults.api_key_env {
            self.store.api_key_env = other.store.api_key_env;
        }
        if other.sessions_dir.is_some() {
            self.sessions_dir = other.sessions_dir;
        }
    }

    /// Validate the merged configuration, collecting every problem
    /// rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.store.base_url.is_empty() {
            errors.push(ValidationError {
                field: "store.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.store.project.is_empty() {
            errors.push(ValidationError {
                field: "store.project".to_string(),
                message: "no project configured; set --project or [store] project".to_string(),
            });
        }
        if self.store.database.is_empty() {
            errors.push(ValidationError {
                field: "store.database".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.store.collection.is_empty() || self.store.collection.contains('/') {
            errors.push(ValidationError {
                field: "store.collection".to_string(),
                message: "must be a single non-empty path segment".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.base_url, "https://firestore.googleapis.com/v1");
        assert_eq!(config.store.database, "(default)");
        assert_eq!(config.store.collection, "users");
        assert!(config.store.project.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
sessions_dir = "/tmp/sessions"

[store]
project = "demo-project"
collection = "people"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.store.project, "demo-project");
        assert_eq!(config.store.collection, "people");
        // Unset fields keep their defaults
        assert_eq!(config.store.database, "(default)");
        assert_eq!(config.sessions_dir, Some(PathBuf::from("/tmp/sessions")));
    }

    #[test]
    fn test_merge_priority() {
        let mut base = Config::default();
        base.store.project = "user-level".to_string();
        base.store.collection = "people".to_string();

        let mut overlay = Config::default();
        overlay.store.project = "project-level".to_string();

        base.merge(overlay);
        assert_eq!(base.store.project, "project-level");
        // Overlay left collection at the default, so the base value survives
        assert_eq!(base.store.collection, "people");
    }

    #[test]
    fn test_validate_requires_project() {
        let config = Config::default();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("project"));
    }

    #[test]
    fn test_validate_collection_shape() {
        let mut config = Config::default();
        config.store.project = "demo".to_string();
        config.store.collection = "a/b".to_string();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("collection"));
    }

    #[test]
    fn test_resolve_api_key_direct_wins() {
        let store = StoreConfig {
            api_key: Some("direct-key".to_string()),
            api_key_env: Some("ROSTER_TEST_UNSET_VAR".to_string()),
            ..StoreConfig::default()
        };
        assert_eq!(store.resolve_api_key(), Some("direct-key".to_string()));
    }

    #[test]
    fn test_resolve_api_key_none() {
        let store = StoreConfig {
            api_key_env: Some("ROSTER_TEST_UNSET_VAR".to_string()),
            ..StoreConfig::default()
        };
        assert_eq!(store.resolve_api_key(), None);
    }
}
