//! Runtime configuration.
//!
//! Layering, lowest to highest priority:
//! 1. `PublishConfig::default()`
//! 2. optional JSON config file (`PublishConfig::from_file`)
//! 3. environment (`PublishConfig::apply_env`)
//! 4. command line flags (applied by the binary)
//!
//! Business logic only ever sees the finished value.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, DEFAULT_SLUG_MAX_LEN, QuotaPolicy, StatusFill, StoreLayout};

/// Environment variable holding the generation service credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const STORE_PATH_ENV: &str = "SCRIBE_STORE_PATH";
pub const OUTPUT_DIR_ENV: &str = "SCRIBE_OUTPUT_DIR";
pub const MODEL_ENV: &str = "SCRIBE_MODEL";
pub const SLUG_MAX_LEN_ENV: &str = "SCRIBE_SLUG_MAX_LEN";

/// On-disk format of the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    Csv,
    Json,
}

impl StoreFormat {
    /// Guess from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(StoreFormat::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(StoreFormat::Json)
        } else {
            None
        }
    }
}

/// Credential for the generation service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Base URL of the REST API.
    pub endpoint: String,
    pub model: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Everything a run needs to know, injected at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub store_path: PathBuf,

    /// `None` means: decide from the store file extension.
    pub store_format: Option<StoreFormat>,

    pub output_dir: PathBuf,
    pub layout: StoreLayout,
    pub slug_max_len: usize,
    pub status_fill: StatusFill,
    pub quota: QuotaPolicy,
    pub generator: GeneratorSettings,

    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/questions.csv"),
            store_format: None,
            output_dir: PathBuf::from("_posts"),
            layout: StoreLayout::default(),
            slug_max_len: DEFAULT_SLUG_MAX_LEN,
            status_fill: StatusFill::default(),
            quota: QuotaPolicy::default(),
            generator: GeneratorSettings::default(),
            api_key: None,
        }
    }
}

impl PublishConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from an environment lookup.
    ///
    /// Takes the lookup as a function so tests don't touch the process
    /// environment. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(STORE_PATH_ENV) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(dir) = get(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(model) = get(MODEL_ENV) {
            self.generator.model = model;
        }
        if let Some(len) = get(SLUG_MAX_LEN_ENV) {
            self.slug_max_len = len
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("slug_max_len", format!("{len:?}: {e}")))?;
        }
        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = Some(ApiKey::new(key.trim()));
        }
        Ok(())
    }

    /// `apply_env` against the real process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    pub fn resolved_store_format(&self) -> Result<StoreFormat, ConfigError> {
        self.store_format
            .or_else(|| StoreFormat::from_path(&self.store_path))
            .ok_or_else(|| ConfigError::UnknownStoreFormat(self.store_path.clone()))
    }

    /// Fail-fast check before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;
        self.resolved_store_format()?;
        if !self.store_path.is_file() {
            return Err(ConfigError::StoreNotFound(self.store_path.clone()));
        }
        Ok(())
    }

    /// `validate` minus everything about the store file.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        if self.slug_max_len == 0 {
            return Err(ConfigError::invalid("slug_max_len", "must be at least 1"));
        }
        if self.layout.question_field.is_empty() || self.layout.status_field.is_empty() {
            return Err(ConfigError::invalid("layout", "field names must not be empty"));
        }
        if self.layout.question_field == self.layout.status_field {
            return Err(ConfigError::invalid(
                "layout",
                "question and status fields must differ",
            ));
        }
        if self.generator.model.trim().is_empty() {
            return Err(ConfigError::invalid("generator.model", "must not be empty"));
        }
        if self.generator.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "generator.timeout_secs",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&ApiKey, ConfigError> {
        self.api_key
            .as_ref()
            .ok_or(ConfigError::MissingCredential(API_KEY_ENV))
    }
}
