//! Domain model (records, publish state, quota, articles, errors).

pub mod article;
pub mod errors;
pub mod ids;
pub mod quota;
pub mod record;
pub mod state;

pub use article::{Article, DEFAULT_SLUG_MAX_LEN, article_file_name, slugify, strip_fences};
pub use errors::{ConfigError, GenerationError, PublishError, StoreError, WriteError};
pub use ids::RunId;
pub use quota::QuotaPolicy;
pub use record::{Record, RecordSet, StoreLayout};
pub use state::{PublishStatus, StatusFill};
