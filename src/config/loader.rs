//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and `CHECKLIST__*` environment
//! overrides using the `config` crate, then validates the result.

use super::error::{ConfigResult, ConfigurationError};
use super::StoreConfig;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "CHECKLIST_CONFIG_PATH";

/// Prefix of environment overrides (`CHECKLIST__CACHE__ENABLED=true`)
pub const ENV_PREFIX: &str = "CHECKLIST";

/// File looked up when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "config/checklist-store.toml";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: PathBuf,
    file_required: bool,
    read_environment: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for the file named by `CHECKLIST_CONFIG_PATH`, falling back to the
    /// optional default file
    pub fn new() -> Self {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::with_file(path),
            _ => Self {
                file: PathBuf::from(DEFAULT_CONFIG_FILE),
                file_required: false,
                read_environment: true,
            },
        }
    }

    /// Loader for an explicit file, which must exist
    pub fn with_file(path: impl AsRef<Path>) -> Self {
        Self {
            file: path.as_ref().to_path_buf(),
            file_required: true,
            read_environment: true,
        }
    }

    /// Ignore process environment overrides
    pub fn without_environment(mut self) -> Self {
        self.read_environment = false;
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn load(&self) -> ConfigResult<StoreConfig> {
        let source_name = self.file.display().to_string();

        let mut builder = Config::builder().add_source(
            File::from(self.file.as_path())
                .format(FileFormat::Toml)
                .required(self.file_required),
        );

        if self.read_environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let settings = builder
            .build()
            .map_err(|e| ConfigurationError::load_error(&source_name, e))?;

        let mut config: StoreConfig = settings
            .try_deserialize()
            .map_err(ConfigurationError::deserialization_error)?;

        if self.read_environment {
            if let Ok(url) = env::var("DATABASE_URL") {
                if !url.trim().is_empty() {
                    config.database.url = url;
                }
            }
        }

        if config
            .cache
            .password
            .as_deref()
            .is_some_and(|p| p.is_empty())
        {
            config.cache.password = None;
        }

        config.validate()?;

        debug!(
            source = %source_name,
            config = %config.sanitized(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let loader = ConfigLoader {
            file: PathBuf::from("does/not/exist.toml"),
            file_required: false,
            read_environment: false,
        };
        assert_eq!(loader.load().unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = ConfigLoader::with_file("does/not/exist.toml")
            .without_environment()
            .load();
        assert!(matches!(result, Err(ConfigurationError::LoadError { .. })));
    }

    #[test]
    fn test_load_from_toml_file() {
        let file = write_config(
            r#"
            [database]
            url = "postgresql://checklist:pw@db:5432/checklist_db"
            statement_timeout_ms = 2500

            [database.pool]
            max_connections = 25

            [cache]
            enabled = true
            endpoints = ["redis-1:6379", "redis-2:6379"]
            password = "secret"
            database = 2
            entity_ttl_seconds = 600
            list_ttl_seconds = 30

            [logging]
            level = "debug"
            format = "json"
            "#,
        );

        let config = ConfigLoader::with_file(file.path())
            .without_environment()
            .load()
            .unwrap();

        assert_eq!(config.database.statement_timeout(), Duration::from_millis(2500));
        assert_eq!(config.database.pool.max_connections, 25);
        assert_eq!(config.database.pool.min_connections, 1);
        assert!(config.cache.is_active());
        assert_eq!(config.cache.endpoints.len(), 2);
        assert_eq!(config.cache.password.as_deref(), Some("secret"));
        assert_eq!(config.cache.database, 2);
        assert_eq!(config.cache.entity_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache.list_ttl(), Duration::from_secs(30));
        assert_eq!(config.logging.format, super::super::LogFormat::Json);
    }

    #[test]
    fn test_comma_separated_endpoints() {
        let file = write_config(
            r#"
            [cache]
            enabled = true
            endpoints = "redis-1:6379, redis-2:6379,,redis-3:6379"
            "#,
        );

        let config = ConfigLoader::with_file(file.path())
            .without_environment()
            .load()
            .unwrap();

        assert_eq!(
            config.cache.endpoints,
            vec!["redis-1:6379", "redis-2:6379", "redis-3:6379"]
        );
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let file = write_config(
            r#"
            [cache]
            entity_ttl_seconds = 30
            list_ttl_seconds = 60
            "#,
        );

        let result = ConfigLoader::with_file(file.path())
            .without_environment()
            .load();
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_empty_password_is_none() {
        let file = write_config(
            r#"
            [cache]
            password = ""
            "#,
        );

        let config = ConfigLoader::with_file(file.path())
            .without_environment()
            .load()
            .unwrap();
        assert!(config.cache.password.is_none());
    }
}
