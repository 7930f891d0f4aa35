//! Resolver configuration.
//!
//! Provides [`ResolverConfig`], loaded from a TOML file, environment
//! variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit config path
//! 2. `SHAPESHIFT_CONFIG` environment variable
//! 3. XDG default: `~/.config/shapeshift/config.toml`
//! 4. Built-in defaults
//!
//! Environment variables prefixed with `SHAPESHIFT_` override file values
//! (`SHAPESHIFT_LOG_MISSES=true`).
//!
//! # Example
//!
//! ```toml
//! cache_instances = true
//! log_misses = false
//! ```

use confyg::{Confygery, env};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SHAPESHIFT_CONFIG";

/// Settings for a converter resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Keep activated converter instances and reuse them for later calls
    /// with the same source and result types.
    #[serde(deserialize_with = "flag")]
    pub cache_instances: bool,

    /// Log resolution misses at `debug` level instead of `trace`.
    #[serde(deserialize_with = "flag")]
    pub log_misses: bool,
}

/// Accepts a TOML boolean or its string spelling. `confyg` hands
/// environment values over as strings.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(de::Error::invalid_value(
                Unexpected::Str(&text),
                &"a boolean or one of true/false/1/0/yes/no/on/off",
            )),
        },
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_instances: true,
            log_misses: false,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("loading resolver config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let env_opts = env::Options::with_top_level("SHAPESHIFT");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Resolve the config file path from explicit path, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("shapeshift").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Disable the instance cache.
    pub fn without_cache(mut self) -> Self {
        self.cache_instances = false;
        self
    }

    /// Log resolution misses at `debug` level.
    pub fn with_miss_logging(mut self) -> Self {
        self.log_misses = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    // Tests touching the process environment run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets or removes an environment variable, restoring it on drop.
    struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.prev {
                Some(ref val) => unsafe { std::env::set_var(&self.key, val) },
                None => unsafe { std::env::remove_var(&self.key) },
            }
        }
    }

    #[test]
    fn test_resolver_config_default() {
        let config = ResolverConfig::default();
        assert!(config.cache_instances);
        assert!(!config.log_misses);
    }

    #[test]
    fn test_resolver_config_builders() {
        let config = ResolverConfig::default().without_cache().with_miss_logging();
        assert!(!config.cache_instances);
        assert!(config.log_misses);
    }

    #[test]
    fn test_resolver_config_from_toml() {
        let config = ResolverConfig::from_toml_str(
            r#"
                cache_instances = false
                log_misses = true
            "#,
        )
        .unwrap();
        assert!(!config.cache_instances);
        assert!(config.log_misses);
    }

    #[test]
    fn test_resolver_config_from_partial_toml() {
        let config = ResolverConfig::from_toml_str("log_misses = true").unwrap();
        assert!(config.cache_instances);
        assert!(config.log_misses);
    }

    #[test]
    fn test_resolver_config_from_invalid_toml() {
        let err = ResolverConfig::from_toml_str("cache_instances = \"often\"").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_resolver_config_to_toml() {
        let config = ResolverConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("cache_instances = true"));
        assert!(toml_str.contains("log_misses = false"));

        let parsed = ResolverConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_resolver_config_load_from_file() {
        let _lock = env_lock();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cache_instances = false\n").unwrap();

        let config = ResolverConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert!(!config.cache_instances);
        assert!(!config.log_misses);
    }

    #[test]
    fn test_resolver_config_load_defaults() {
        let _lock = env_lock();
        let config = ResolverConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_resolver_config_load_env_overlay() {
        let _lock = env_lock();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cache_instances = true\nlog_misses = false\n").unwrap();

        let _misses = EnvGuard::new("SHAPESHIFT_LOG_MISSES", "true");
        let _cache = EnvGuard::new("SHAPESHIFT_CACHE_INSTANCES", "False");
        let config = ResolverConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert!(config.log_misses);
        assert!(!config.cache_instances);
    }

    #[test]
    fn test_resolver_config_load_env_without_file() {
        let _lock = env_lock();
        let _cache = EnvGuard::new("SHAPESHIFT_CACHE_INSTANCES", "false");
        let config = ResolverConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert!(!config.cache_instances);
        assert!(!config.log_misses);
    }

    #[test]
    fn test_resolver_config_load_env_invalid_flag() {
        let _lock = env_lock();
        let _misses = EnvGuard::new("SHAPESHIFT_LOG_MISSES", "sometimes");
        let err = ResolverConfig::load(Some("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_resolver_config_from_string_flags() {
        let config =
            ResolverConfig::from_toml_str("cache_instances = \"no\"\nlog_misses = \"1\"").unwrap();
        assert!(!config.cache_instances);
        assert!(config.log_misses);
    }

    #[test]
    fn test_resolver_config_resolve_config_path_env() {
        let _lock = env_lock();
        let _guard = EnvGuard::new(CONFIG_ENV_VAR, "/env/config.toml");
        let path = ResolverConfig::resolve_config_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/config.toml")));
    }

    #[test]
    fn test_resolver_config_resolve_config_path_default() {
        let _lock = env_lock();
        let _guard = EnvGuard::remove(CONFIG_ENV_VAR);
        let path = ResolverConfig::resolve_config_path(None);
        assert_eq!(path, ResolverConfig::default_config_path());
    }

    #[test]
    fn test_resolver_config_resolve_config_path_explicit() {
        let path = ResolverConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_resolver_config_default_config_path() {
        if let Some(path) = ResolverConfig::default_config_path() {
            let p = path.to_string_lossy();
            assert!(p.contains("shapeshift"));
            assert!(p.ends_with("config.toml"));
        }
    }
}
