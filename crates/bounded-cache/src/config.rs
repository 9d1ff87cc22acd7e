//! Cache configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Default entry-count bound
pub const DEFAULT_MAX_COUNT: usize = 1024;

/// Construction-time cache bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries kept after a push
    pub max_count: usize,
    /// Approximate byte budget (`None` or 0 disables memory eviction)
    pub max_memory: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            max_memory: None,
        }
    }
}

impl CacheConfig {
    /// Count-bounded config
    pub fn new(max_count: usize) -> Self {
        Self {
            max_count,
            max_memory: None,
        }
    }

    /// Count- and memory-bounded config
    pub fn with_memory_limit(max_count: usize, max_memory: usize) -> Self {
        Self {
            max_count,
            max_memory: Some(max_memory),
        }
    }

    /// Memory budget in bytes, if memory eviction is enabled
    pub fn memory_budget(&self) -> Option<usize> {
        self.max_memory.filter(|&budget| budget > 0)
    }

    /// Check that the config describes a usable cache
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_count == 0 {
            return Err(CacheError::ZeroMaxCount);
        }
        Ok(())
    }

    /// Load a config from an optional file, overridden by environment
    /// variables named `{prefix}_MAX_COUNT` and `{prefix}_MAX_MEMORY`.
    ///
    /// Missing keys fall back to [`CacheConfig::default`].
    pub fn load(prefix: &str, file: Option<&Path>) -> Result<Self, CacheError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        let config: CacheConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_memory_budget() {
        assert_eq!(CacheConfig::new(4).memory_budget(), None);
        assert_eq!(CacheConfig::with_memory_limit(4, 0).memory_budget(), None);
        assert_eq!(CacheConfig::with_memory_limit(4, 64).memory_budget(), Some(64));
    }

    #[test]
    fn test_validate() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(matches!(
            CacheConfig::new(0).validate(),
            Err(CacheError::ZeroMaxCount)
        ));
    }

    #[test]
    fn test_load_defaults() {
        let config = CacheConfig::load("BOUNDED_CACHE_TEST_UNSET", None).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_load_from_env() {
        std::env::set_var("BOUNDED_CACHE_TEST_ENV_MAX_COUNT", "16");
        std::env::set_var("BOUNDED_CACHE_TEST_ENV_MAX_MEMORY", "4096");

        let config = CacheConfig::load("BOUNDED_CACHE_TEST_ENV", None).unwrap();
        assert_eq!(config, CacheConfig::with_memory_limit(16, 4096));
    }

    #[test]
    fn test_load_file_then_env() {
        let path = std::env::temp_dir().join(format!(
            "bounded-cache-test-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "max_count = 8\nmax_memory = 256\n").unwrap();
        std::env::set_var("BOUNDED_CACHE_TEST_FILE_MAX_COUNT", "32");

        let config = CacheConfig::load("BOUNDED_CACHE_TEST_FILE", Some(path.as_path())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.max_count, 32);
        assert_eq!(config.memory_budget(), Some(256));
    }

    #[test]
    fn test_load_rejects_zero_count() {
        std::env::set_var("BOUNDED_CACHE_TEST_ZERO_MAX_COUNT", "0");
        assert!(matches!(
            CacheConfig::load("BOUNDED_CACHE_TEST_ZERO", None),
            Err(CacheError::ZeroMaxCount)
        ));
    }
}
