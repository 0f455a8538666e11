// Configuration loading and parsing (bigboard.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataConfig,
    pub storage: StorageConfig,
    pub summary: SummaryConfig,
    pub board: BoardConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    /// Location of the SQLite report database.
    ///
    /// An explicit `storage.db_path` wins. Otherwise the platform data
    /// directory is used, and `bigboard.db` in the working directory when no
    /// home directory can be determined.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.db_path {
            return PathBuf::from(path);
        }
        directories::ProjectDirs::from("", "", "bigboard")
            .map(|dirs| dirs.data_dir().join("bigboard.db"))
            .unwrap_or_else(|| PathBuf::from("bigboard.db"))
    }
}

// ---------------------------------------------------------------------------
// bigboard.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire bigboard.toml file.
#[derive(Debug, Clone, Deserialize)]
struct BigboardFile {
    data: DataConfig,
    storage: StorageConfig,
    summary: SummaryConfig,
    #[serde(default)]
    board: BoardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the bundled JSON dataset (bios, rankings, measurements, logs).
    pub dataset_path: String,
}

/// Which key-value backend holds persisted scouting reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageKind,
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Where generated report summaries come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryProvider {
    /// POST the report to an external `/summary` endpoint.
    Endpoint,
    /// Call the Claude Messages API directly.
    Claude,
    /// Only the built-in rule-based summary.
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    pub provider: SummaryProvider,
    /// Base URL of the summary service, e.g. `http://127.0.0.1:5000`.
    #[serde(default)]
    pub endpoint: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// `"average"` or the name of a scout ranking column.
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
        }
    }
}

fn default_sort() -> String {
    "average".to_string()
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/bigboard.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; call `ensure_config_files` first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let settings_path = config_dir.join("bigboard.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: BigboardFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        data: settings.data,
        storage: settings.storage,
        summary: settings.summary,
        board: settings.board,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy every file in `defaults/` that is missing from `config/`.
/// Returns the copied paths. `.example` templates are skipped.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.dataset_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.dataset_path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.summary.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "summary.max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.summary.provider == SummaryProvider::Endpoint {
        let missing = config
            .summary
            .endpoint
            .as_deref()
            .map_or(true, |e| e.trim().is_empty());
        if missing {
            return Err(ConfigError::ValidationError {
                field: "summary.endpoint".into(),
                message: "required when provider = \"endpoint\"".into(),
            });
        }
    }

    if config.board.default_sort.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "board.default_sort".into(),
            message: "must be \"average\" or a scout name".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// Fresh scratch directory with `config/` created.
    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(format!("bigboard_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        tmp
    }

    fn write_settings(tmp: &Path, replace: Option<(&str, &str)>) {
        let text = fs::read_to_string(project_root().join("defaults/bigboard.toml")).unwrap();
        let text = match replace {
            Some((from, to)) => {
                assert!(text.contains(from), "defaults should contain {from:?}");
                text.replace(from, to)
            }
            None => text,
        };
        fs::write(tmp.join("config/bigboard.toml"), text).unwrap();
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = scratch("valid");
        write_settings(&tmp, None);

        let config = load_config_from(&tmp).expect("should load valid config");
        assert_eq!(config.data.dataset_path, "data/project_data.json");
        assert_eq!(config.storage.backend, StorageKind::Sqlite);
        assert_eq!(config.storage.db_path.as_deref(), Some("bigboard.db"));
        assert_eq!(config.summary.provider, SummaryProvider::Endpoint);
        assert_eq!(
            config.summary.endpoint.as_deref(),
            Some("http://127.0.0.1:5000")
        );
        assert_eq!(config.summary.max_tokens, 300);
        assert_eq!(config.board.default_sort, "average");
        assert!(config.credentials.anthropic_api_key.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_with_api_key() {
        let tmp = scratch("creds");
        write_settings(&tmp, None);
        fs::write(
            tmp.join("config/credentials.toml"),
            "anthropic_api_key = \"sk-ant-test-key\"\n",
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("should load with credentials.toml");
        assert_eq!(
            config.credentials.anthropic_api_key.as_deref(),
            Some("sk-ant-test-key")
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn board_section_is_optional() {
        let tmp = scratch("no_board");
        write_settings(&tmp, Some(("[board]\ndefault_sort = \"average\"\n", "")));

        let config = load_config_from(&tmp).expect("board section should default");
        assert_eq!(config.board.default_sort, "average");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let tmp = scratch("zero_tokens");
        write_settings(&tmp, Some(("max_tokens = 300", "max_tokens = 0")));

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "summary.max_tokens"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_endpoint_provider_without_endpoint() {
        let tmp = scratch("no_endpoint");
        write_settings(
            &tmp,
            Some(("endpoint = \"http://127.0.0.1:5000\"\n", "")),
        );

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "summary.endpoint"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn local_provider_needs_no_endpoint() {
        let tmp = scratch("local_provider");
        let text = fs::read_to_string(project_root().join("defaults/bigboard.toml"))
            .unwrap()
            .replace("provider = \"endpoint\"", "provider = \"local\"")
            .replace("endpoint = \"http://127.0.0.1:5000\"\n", "");
        fs::write(tmp.join("config/bigboard.toml"), text).unwrap();

        let config = load_config_from(&tmp).expect("local provider should load");
        assert_eq!(config.summary.provider, SummaryProvider::Local);
        assert!(config.summary.endpoint.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_dataset_path() {
        let tmp = scratch("empty_dataset");
        write_settings(
            &tmp,
            Some(("dataset_path = \"data/project_data.json\"", "dataset_path = \"  \"")),
        );

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "data.dataset_path"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_storage_backend_is_parse_error() {
        let tmp = scratch("bad_backend");
        write_settings(&tmp, Some(("backend = \"sqlite\"", "backend = \"redis\"")));

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("bigboard.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_settings() {
        let tmp = scratch("missing_settings");

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("bigboard.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_db_path_wins() {
        let tmp = scratch("db_path");
        write_settings(&tmp, Some(("db_path = \"bigboard.db\"", "db_path = \"/tmp/reports.db\"")));

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/reports.db"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn omitted_db_path_falls_back_to_data_dir() {
        let tmp = scratch("db_path_default");
        write_settings(&tmp, Some(("db_path = \"bigboard.db\"\n", "")));

        let config = load_config_from(&tmp).unwrap();
        assert!(config.storage.db_path.is_none());
        assert!(config.db_path().ends_with("bigboard.db"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_examples() {
        let tmp = std::env::temp_dir().join(format!("bigboard_ensure_{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        fs::copy(
            project_root().join("defaults/bigboard.toml"),
            defaults_dir.join("bigboard.toml"),
        )
        .unwrap();
        fs::write(
            defaults_dir.join("credentials.toml.example"),
            "anthropic_api_key = \"sk-ant-...\"\n",
        )
        .unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config/bigboard.toml").exists());
        assert!(!tmp.join("config/credentials.toml.example").exists());

        // Second run leaves the existing file alone.
        fs::write(tmp.join("config/bigboard.toml"), "# custom\n").unwrap();
        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        assert_eq!(
            fs::read_to_string(tmp.join("config/bigboard.toml")).unwrap(),
            "# custom\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join(format!("bigboard_both_missing_{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
