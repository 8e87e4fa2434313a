//! Errors - エラー型と分類
//!
//! # 分類
//! - **起動時（fatal）**: ConfigError, StoreError → run 全体を中断
//! - **レコード単位（non-fatal）**: GenerationError, WriteError → そのレコードだけ諦めて次へ

use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration problems. Raised before any work happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("record store not found: {}", .0.display())]
    StoreNotFound(PathBuf),

    #[error("cannot tell store format from {}; use a .csv or .json file or set store_format", .0.display())]
    UnknownStoreFormat(PathBuf),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Record store could not be read or rewritten.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed json in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has no {field} field", .path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("{} row {row}: {reason}", .path.display())]
    Malformed {
        path: PathBuf,
        row: usize,
        reason: String,
    },
}

/// The generation service did not produce an article.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("response contained no text")]
    EmptyResponse,

    #[error("generator unavailable: {0}")]
    Unavailable(String),
}

/// The article could not be written.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors of a run. Per-record errors never end up here.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no generator configured; set {}", crate::config::API_KEY_ENV)]
    NoGenerator,
}
