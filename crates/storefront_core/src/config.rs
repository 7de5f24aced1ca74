//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! db_path = "storefront.sqlite3"
//! log_level = "info"
//! log_dir = "/var/log/storefront"
//!
//! [report]
//! greeting_name = "Mosh"
//! limit = 5
//! ```
//!
//! `${VAR}` references inside string values are replaced from the
//! environment after parsing, so comments are never expanded.
//! Relative paths resolve against the absolute directory of the config file.

use crate::logging::{default_log_level, normalize_level};
use crate::report::{DEFAULT_GREETING_NAME, DEFAULT_RECENT_ORDER_LIMIT};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "storefront.sqlite3";

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("environment variable `{0}` referenced by config is not set")]
    MissingEnvVar(String),
    #[error("invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReportConfig {
    pub greeting_name: String,
    /// Maximum number of orders shown.
    pub limit: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            greeting_name: DEFAULT_GREETING_NAME.to_string(),
            limit: DEFAULT_RECENT_ORDER_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Loads and validates a config file, resolving relative paths against
    /// its directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        // A bare file name has an empty parent.
        let absolute = std::fs::canonicalize(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = absolute.parent().unwrap_or_else(|| Path::new("/"));
        Ok(config.resolve_paths(base_dir))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut document = toml::Value::Table(toml::from_str::<toml::Table>(content)?);
        substitute_env_vars(&mut document)?;
        let config: Self = document.try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "db_path",
                message: "cannot be empty".to_string(),
            });
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid {
            field: "log_level",
            message: err.to_string(),
        })?;
        if self.report.greeting_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "report.greeting_name",
                message: "cannot be blank".to_string(),
            });
        }
        Ok(())
    }

    /// Rebases relative `db_path` and `log_dir` onto `base_dir`.
    pub fn resolve_paths(mut self, base_dir: &Path) -> Self {
        if self.db_path.is_relative() {
            self.db_path = base_dir.join(&self.db_path);
        }
        if let Some(log_dir) = self.log_dir.as_mut() {
            if log_dir.is_relative() {
                *log_dir = base_dir.join(&*log_dir);
            }
        }
        self
    }
}

fn substitute_env_vars(value: &mut toml::Value) -> Result<(), ConfigError> {
    match value {
        toml::Value::String(text) => *text = substitute_in_str(text)?,
        toml::Value::Array(items) => {
            for item in items {
                substitute_env_vars(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                substitute_env_vars(item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn substitute_in_str(content: &str) -> Result<String, ConfigError> {
    let mut missing = None;
    let replaced = ENV_VAR_RE.replace_all(content, |caps: &Captures<'_>| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(ConfigError::MissingEnvVar(name)),
        None => Ok(replaced.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig};
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_config_uses_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.report.greeting_name, "Mosh");
        assert_eq!(config.report.limit, 5);
    }

    #[test]
    fn report_section_overrides_defaults() {
        let config = StoreConfig::from_toml_str(
            r#"
            db_path = "shop.db"
            log_level = "warn"

            [report]
            greeting_name = "Ada"
            limit = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("shop.db"));
        assert_eq!(config.report.greeting_name, "Ada");
        assert_eq!(config.report.limit, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = StoreConfig::from_toml_str("database = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_log_level_is_invalid() {
        let err = StoreConfig::from_toml_str("log_level = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "log_level", .. }));
    }

    #[test]
    fn unset_env_var_is_reported() {
        let err =
            StoreConfig::from_toml_str("db_path = \"${STOREFRONT_TEST_UNSET_VAR_91}\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "STOREFRONT_TEST_UNSET_VAR_91"));
    }

    #[test]
    fn env_vars_in_comments_are_ignored() {
        let config = StoreConfig::from_toml_str(
            "# db_path = \"${STOREFRONT_TEST_UNSET_VAR_92}\"\nlog_level = \"warn\"",
        )
        .unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn env_vars_expand_inside_nested_strings() {
        std::env::set_var("STOREFRONT_TEST_GREETING_93", "Grace");
        let config = StoreConfig::from_toml_str(
            "[report]\ngreeting_name = \"Hello ${STOREFRONT_TEST_GREETING_93}\"",
        )
        .unwrap();
        assert_eq!(config.report.greeting_name, "Hello Grace");
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let config = StoreConfig::from_toml_str("log_dir = \"logs\"")
            .unwrap()
            .resolve_paths(Path::new("/srv/shop"));
        assert_eq!(config.db_path, PathBuf::from("/srv/shop/storefront.sqlite3"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/srv/shop/logs")));
    }
}
