//! Global wedplan configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COLLECTION, DEFAULT_DEBOUNCE, DEFAULT_DOCUMENT_ID};
use crate::error::{WeddingError, WeddingResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/wedplan";
static DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
static DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Environment overrides look like `WEDPLAN__GOOGLE__GEMINI_API_KEY`.
static ENV_PREFIX: &str = "WEDPLAN";
static ENV_SEPARATOR: &str = "__";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_document_id() -> String {
    DEFAULT_DOCUMENT_ID.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

/// Configuration at ~/.config/wedplan/config.toml, overlaid by `WEDPLAN__*`
/// environment variables.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WedplanConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_document_id")]
    pub document_id: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub google: GoogleConfig,
}

/// Where the wedding document is kept.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// JSON file under `data_dir`.
    Local {
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
    /// Process-local; nothing survives exit. Useful for trying things out.
    Memory,
    Firestore {
        project_id: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_collection")]
        collection: String,
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl StoreConfig {
    pub fn poll_interval(&self) -> Duration {
        match self {
            StoreConfig::Local { poll_interval_ms }
            | StoreConfig::Firestore {
                poll_interval_ms, ..
            } => Duration::from_millis(*poll_interval_ms),
            StoreConfig::Memory => Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GoogleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,

    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            storage_bucket: None,
            calendar_id: default_calendar_id(),
        }
    }
}

impl Default for WedplanConfig {
    fn default() -> Self {
        WedplanConfig {
            data_dir: default_data_dir(),
            document_id: default_document_id(),
            debounce_ms: default_debounce_ms(),
            store: StoreConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl WedplanConfig {
    pub fn config_path() -> WeddingResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WeddingError::Config("Could not determine config directory".into()))?
            .join("wedplan");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented config file on
    /// first run.
    pub fn load() -> WeddingResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may be missing) plus the environment.
    pub fn load_from(path: &Path) -> WeddingResult<Self> {
        let config: WedplanConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| WeddingError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| WeddingError::Config(e.to_string()))?;

        if config.debounce_ms == 0 {
            return Err(WeddingError::Config(
                "debounce_ms must be greater than zero".into(),
            ));
        }

        Ok(config)
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> WeddingResult<()> {
        let contents = format!(
            "\
# wedplan configuration

# Where the local wedding document is stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Which wedding document to open:
# document_id = \"{DEFAULT_DOCUMENT_ID}\"

# Quiet period after the last edit before saving, in milliseconds:
# debounce_ms = {debounce}

# Document store. Default is a local JSON file:
# [store]
# backend = \"local\"
# poll_interval_ms = {DEFAULT_POLL_INTERVAL_MS}
#
# Or a Firestore document (collection \"{DEFAULT_COLLECTION}\"):
# [store]
# backend = \"firestore\"
# project_id = \"my-wedding\"
# api_key = \"...\"

# Google services. Secrets can also come from the environment,
# e.g. WEDPLAN__GOOGLE__GEMINI_API_KEY.
# [google]
# gemini_model = \"{DEFAULT_GEMINI_MODEL}\"
# storage_bucket = \"my-wedding.appspot.com\"
# calendar_id = \"{DEFAULT_CALENDAR_ID}\"
",
            debounce = default_debounce_ms(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeddingError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| WeddingError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WedplanConfig::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.document_id, "default-wedding");
        assert_eq!(config.debounce(), Duration::from_millis(1000));
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.google.calendar_id, "primary");
    }

    #[test]
    fn test_generated_default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        WedplanConfig::create_default_config(&path).unwrap();

        let config = WedplanConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("~/.local/share/wedplan"));
        assert_eq!(config.google.gemini_model, "gemini-2.0-flash");
    }

    #[test]
    fn test_reads_firestore_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
document_id = "ana-y-luis"
debounce_ms = 250

[store]
backend = "firestore"
project_id = "boda"
"#,
        )
        .unwrap();

        let config = WedplanConfig::load_from(&path).unwrap();
        assert_eq!(config.document_id, "ana-y-luis");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(
            config.store,
            StoreConfig::Firestore {
                project_id: "boda".into(),
                api_key: None,
                collection: "weddings".into(),
                poll_interval_ms: 2000,
            }
        );
    }

    #[test]
    fn test_zero_debounce_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "debounce_ms = 0\n").unwrap();

        assert!(matches!(
            WedplanConfig::load_from(&path),
            Err(WeddingError::Config(_))
        ));
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let config = WedplanConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
