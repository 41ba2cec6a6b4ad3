//! Cart configuration.

use crate::error::CartError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use turbo_session::{Store, StoreSession, DEFAULT_NAMESPACE};

/// Cart configuration file.
///
/// ```toml
/// namespace = "_cart"
/// key_prefix = "cart"
/// restore = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Session namespace cart data is kept under.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Prefix of the session key a cart is stored under.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Whether building a cart loads its stored items.
    #[serde(default)]
    pub restore: bool,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_key_prefix() -> String {
    crate::cart::CART_KEY_PREFIX.to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            key_prefix: default_key_prefix(),
            restore: false,
        }
    }
}

impl CartConfig {
    /// Load config from a file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                CartError::ConfigError(format!(
                    "Failed to parse JSON config {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            Self::from_toml_str(&content)?
        };

        tracing::debug!(path = %path.display(), "loaded cart config");
        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CartError> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CartError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content).map_err(|e| {
            CartError::ConfigError(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Open a session on `store` in the configured namespace.
    pub fn session<S: Store>(&self, store: S) -> Result<StoreSession<S>, CartError> {
        Ok(StoreSession::with_namespace(store, self.namespace.clone())?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_session::{MemoryStore, Session};

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.namespace, "_cart");
        assert_eq!(config.key_prefix, "cart");
        assert!(!config.restore);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(CartConfig::from_toml_str("").unwrap(), CartConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = CartConfig::from_toml_str("namespace = \"_shop\"\nrestore = true\n").unwrap();
        assert_eq!(config.namespace, "_shop");
        assert_eq!(config.key_prefix, "cart");
        assert!(config.restore);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            CartConfig::from_toml_str("restore = \"yes\""),
            Err(CartError::ConfigError(_))
        ));
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        let config = CartConfig {
            namespace: "_shop".to_string(),
            key_prefix: "basket".to_string(),
            restore: true,
        };

        config.save(&path).unwrap();
        assert_eq!(CartConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"key_prefix": "basket"}"#).unwrap();

        let config = CartConfig::load(&path).unwrap();
        assert_eq!(config.key_prefix, "basket");
        assert_eq!(config.namespace, "_cart");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CartConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CartError::ConfigError(_))));
    }

    #[test]
    fn test_session_uses_namespace() {
        let config = CartConfig {
            namespace: "_shop".to_string(),
            ..CartConfig::default()
        };
        let session = config.session(MemoryStore::new()).unwrap();
        assert_eq!(session.namespace(), "_shop");
    }
}
