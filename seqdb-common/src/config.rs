//! Configuration loading and path resolution
//!
//! Values are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::codec::KeywordEncoding;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SEQDB_CONFIG";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV_VAR: &str = "SEQDB_DATA_DIR";

/// Default database file name inside the data directory
pub const DEFAULT_DATABASE_FILE: &str = "seqs.sqlite3";

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Stats file column positions (0-based)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatsColumns {
    pub inceval_column: usize,
    pub logeval_column: usize,
}

impl Default for StatsColumns {
    fn default() -> Self {
        Self {
            inceval_column: 3,
            logeval_column: 4,
        }
    }
}

/// Dump file names inside the source directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceFiles {
    pub names: String,
    pub authors: String,
    pub comments: String,
    pub formulas: String,
    pub keywords: String,
    pub programs: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            names: "names".to_string(),
            authors: "authors".to_string(),
            comments: "comments".to_string(),
            formulas: "formulas".to_string(),
            keywords: "keywords".to_string(),
            programs: "programs".to_string(),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub programs_dir: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub keyword_encoding: KeywordEncoding,
    pub batch_size: Option<usize>,
    pub worker_threads: Option<usize>,
    pub logging: LoggingConfig,
    pub stats: StatsColumns,
    pub sources: SourceFiles,
}

impl TomlConfig {
    /// Parse a config file; missing or malformed files are errors
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the explicit file if given, else the first platform config file found, else defaults
    ///
    /// An explicit path that does not exist is an error; absent default files are not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        match default_config_file() {
            Some(path) => {
                debug!("Loading config file: {}", path.display());
                Self::load(&path)
            }
            None => {
                debug!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// First existing platform config file (`~/.config/seqdb/config.toml`, then `/etc/seqdb/config.toml`)
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("seqdb").join("config.toml"));
    let system_config = PathBuf::from("/etc/seqdb/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|p| p.exists())
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("seqdb"))
        .unwrap_or_else(|| PathBuf::from("./seqdb_data"))
}

/// Resolve a path setting: CLI argument, then environment variable, then TOML value, then default
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.stats.inceval_column, 3);
        assert_eq!(config.sources.names, "names");
        assert_eq!(config.keyword_encoding, KeywordEncoding::Bitmask);
    }

    #[test]
    fn test_partial_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            data_dir = "/srv/seqdb"
            keyword_encoding = "text"
            batch_size = 250

            [stats]
            logeval_column = 7

            [sources]
            names = "names.txt"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/seqdb")));
        assert_eq!(config.keyword_encoding, KeywordEncoding::Text);
        assert_eq!(config.batch_size, Some(250));
        assert_eq!(config.stats.inceval_column, 3);
        assert_eq!(config.stats.logeval_column, 7);
        assert_eq!(config.sources.names, "names.txt");
        assert_eq!(config.sources.authors, "authors");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "batch_size = \"many\"").unwrap();
        assert!(matches!(TomlConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_config_env_var_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqdb.toml");
        std::fs::write(&path, "batch_size = 42").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &path);
        let config = TomlConfig::load_or_default(None);
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.unwrap().batch_size, Some(42));
    }

    #[test]
    #[serial]
    fn test_resolve_path_priority() {
        let var = "SEQDB_TEST_RESOLVE_PATH";
        std::env::remove_var(var);
        let default = || PathBuf::from("/default");

        assert_eq!(resolve_path(None, var, None, default), PathBuf::from("/default"));
        assert_eq!(
            resolve_path(None, var, Some(Path::new("/toml")), default),
            PathBuf::from("/toml")
        );

        std::env::set_var(var, "/env");
        assert_eq!(
            resolve_path(None, var, Some(Path::new("/toml")), default),
            PathBuf::from("/env")
        );
        assert_eq!(
            resolve_path(Some(Path::new("/cli")), var, Some(Path::new("/toml")), default),
            PathBuf::from("/cli")
        );
        std::env::remove_var(var);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let result = TomlConfig::load_or_default(Some(Path::new("/nonexistent/seqdb.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
