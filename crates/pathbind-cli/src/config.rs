//! Configuration management for the CLI
//!
//! Configuration is read from the first file found in:
//! - the `--config` argument (or `PATHBIND_CONFIG`)
//! - `.pathbind.{toml,yaml,json}` in the working directory
//! - `<config_dir>/pathbind/config.{toml,yaml,json}`
//!
//! Missing sections fall back to their defaults.

use crate::cli::{ConfigFormat, DumpForm};
use crate::error::{Error, Result};
use pathbind_core::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Binding defaults
    pub binding: BindingConfig,

    /// Path settings
    pub paths: PathConfig,

    /// Input reading
    pub input: InputConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no `-v` flag is given
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

/// Defaults for the bind command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Use strict coercion
    pub strict: bool,

    /// Leave null fields out of the output
    pub exclude_none: bool,

    /// Serialized form printed by `bind`
    pub form: DumpForm,
}

/// Path configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory searched for schemas given by bare name
    pub schemas_dir: Option<PathBuf>,
}

/// Input reading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Attempts made to read an input document
    pub retries: u32,

    /// Delay before the first retry, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            strict: false,
            exclude_none: false,
            form: DumpForm::Mapping,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl InputConfig {
    /// Retry policy used when reading input documents
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries).with_initial_delay(Duration::from_millis(self.retry_delay_ms))
    }
}

impl Config {
    /// Load configuration from a file, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match extension(path) {
            Some("toml") => toml::from_str(&content)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "toml, yaml or json".to_string(),
                })
            }
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Configuration file paths checked by [`Config::load`], in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = ["toml", "yaml", "json"]
            .iter()
            .map(|ext| PathBuf::from(format!(".pathbind.{}", ext)))
            .collect();

        if let Some(dir) = Self::user_config_dir() {
            for ext in ["toml", "yaml", "json"] {
                paths.push(dir.join(format!("config.{}", ext)));
            }
        }

        paths
    }

    /// Directory holding the user configuration file
    pub fn user_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pathbind"))
    }

    /// Resolve a schema argument: existing paths are used as given, bare
    /// names are looked up under `paths.schemas_dir`
    pub fn schema_path(&self, schema: &Path) -> PathBuf {
        if schema.exists() || schema.components().count() > 1 {
            return schema.to_path_buf();
        }

        if let Some(dir) = &self.paths.schemas_dir {
            let candidates = [
                dir.join(schema),
                dir.join(schema).with_extension("yaml"),
                dir.join(schema).with_extension("yml"),
                dir.join(schema).with_extension("json"),
            ];
            if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
                return found;
            }
        }

        schema.to_path_buf()
    }

    /// Render the configuration in the given format
    pub fn render(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    /// Save configuration to a file, choosing the format by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = match extension(path) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        };
        let content = self.render(format)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.format, "human");
        assert_eq!(config.binding.form, DumpForm::Mapping);
        assert!(!config.binding.strict);
        assert_eq!(config.input.retries, 3);
        assert!(config.paths.schemas_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[binding]\nstrict = true\nform = \"display\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.binding.strict);
        assert_eq!(config.binding.form, DumpForm::Display);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_yaml_and_json_files() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("config.yaml");
        std::fs::write(&yaml, "paths:\n  schemas_dir: /srv/schemas\n").unwrap();
        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"input": {"retries": 5}}"#).unwrap();

        assert_eq!(
            Config::from_file(&yaml).unwrap().paths.schemas_dir,
            Some(PathBuf::from("/srv/schemas"))
        );
        let from_json = Config::from_file(&json).unwrap();
        assert_eq!(from_json.input.retries, 5);
        assert_eq!(from_json.input.retry_delay_ms, 100);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "x=1").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(Error::InvalidFormat { .. })
        ));
        assert!(matches!(
            Config::from_file(&dir.path().join("missing.toml")),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.binding.exclude_none = true;
        config.paths.schemas_dir = Some(dir.path().to_path_buf());

        for name in ["saved.toml", "saved.yaml", "saved.json"] {
            let path = dir.path().join("nested").join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_schema_path_lookup() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("orders.yaml"), "records: []").unwrap();

        let mut config = Config::default();
        config.paths.schemas_dir = Some(dir.path().to_path_buf());

        assert_eq!(
            config.schema_path(Path::new("orders")),
            dir.path().join("orders.yaml")
        );
        assert_eq!(
            config.schema_path(Path::new("unknown")),
            PathBuf::from("unknown")
        );
    }

    #[test]
    fn test_retry_policy_from_input_config() {
        let policy = InputConfig { retries: 4, retry_delay_ms: 20 }.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.initial_delay, Duration::from_millis(20));
    }
}
