use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "pk-tracker.json";
pub const DEFAULT_DATABASE_PATH: &str = "pk-tracker.db";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub research_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub database_path: PathBuf,
    /// Program and leading arguments; empty when research is not configured.
    pub research_command: Vec<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `path`, or `pk-tracker.json` in the current directory if present.
    ///
    /// An explicit path must exist; the implicit file is optional.
    pub fn resolve(path: Option<&Path>) -> Result<ResolvedConfig, CliError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| CliError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| CliError::ConfigParse(err.to_string()))?;

        tracing::debug!(path = %config_path.display(), "loaded config");
        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CliError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(CliError::ConfigParse(format!(
                "unsupported schema_version {}",
                schema_version
            )));
        }

        Ok(ResolvedConfig {
            schema_version,
            database_path: config
                .database_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            research_command: config.research_command.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.database_path, PathBuf::from("pk-tracker.db"));
        assert!(resolved.research_command.is_empty());
    }

    #[test]
    fn reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(
            &path,
            r#"{"database_path": "data/pk.db", "research_command": ["notify-research", "--new-chat"]}"#,
        )
        .unwrap();

        let resolved = ConfigLoader::resolve(Some(&path)).unwrap();
        assert_eq!(resolved.database_path, PathBuf::from("data/pk.db"));
        assert_eq!(resolved.research_command, vec!["notify-research", "--new-chat"]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::resolve(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, CliError::ConfigRead(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ConfigLoader::resolve(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::ConfigParse(_)));
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let config = Config {
            schema_version: Some(2),
            ..Default::default()
        };
        assert!(ConfigLoader::resolve_config(config).is_err());
    }
}
