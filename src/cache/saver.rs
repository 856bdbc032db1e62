//! Cache saver abstraction
//!
//! The step hands a single [`SaveCacheRequest`] to a [`CacheSaver`] and does
//! not care how the archive is produced or where it ends up. Keeping this
//! boundary a trait lets tests substitute a recording saver and lets the
//! storage backend change without touching the step.

use crate::error::StepResult;
use async_trait::async_trait;
use serde::Serialize;

/// Everything a saver needs to archive a set of paths under a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveCacheRequest {
    /// Identifier of the step issuing the request, used in error context
    pub step_id: String,

    /// Verbose logging requested by the step input
    pub verbose: bool,

    /// Cache key, possibly still containing unresolved template placeholders
    pub key: String,

    /// Paths to archive; `~` prefixes are expanded by the saver
    pub paths: Vec<String>,

    /// Whether the key fully determines the archived content. A unique key
    /// that already exists in the store does not need to be saved again.
    pub is_key_unique: bool,

    /// Compression level for the archive, 1 (fastest) to 19 (smallest)
    pub compression_level: u8,
}

/// A storage backend capable of saving one cache entry
#[async_trait]
pub trait CacheSaver: Send + Sync {
    /// Archive the requested paths under the requested key
    async fn save(&self, request: &SaveCacheRequest) -> StepResult<()>;
}
