//! Local content-addressed cache store
//!
//! The default saver backend. Entries are addressed by the SHA-256 digest of
//! their resolved key: `<digest>.tar.zst` holds the archive and
//! `<digest>.json` the entry metadata. Both are written to temp files and
//! renamed into place, so an entry never appears half-written.

use crate::cache::keys::{self, TemplateContext};
use crate::cache::paths;
use crate::cache::saver::{CacheSaver, SaveCacheRequest};
use crate::error::{StepError, StepResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment variable overriding the store location
pub const STORE_DIR_ENV: &str = "CACHE_STORE_DIR";

/// Metadata stored next to each archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Resolved cache key the entry was saved under
    pub key: String,

    /// Archived paths, after tilde expansion
    pub paths: Vec<String>,

    /// Compression level the archive was created with
    pub compression_level: u8,

    /// Size of the compressed archive
    pub size_bytes: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Cache store rooted at a local directory
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the store at its default location
    ///
    /// `CACHE_STORE_DIR` overrides the location; otherwise the store lives
    /// in the user's cache directory.
    pub fn open_default() -> Self {
        if let Ok(dir) = std::env::var(STORE_DIR_ENV) {
            return Self::new(dir);
        }
        let root = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("save-dart-cache");
        Self::new(root)
    }

    /// Get the store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn archive_path(&self, digest: &str) -> PathBuf {
        self.root.join(format!("{digest}.tar.zst"))
    }

    fn metadata_path(&self, digest: &str) -> PathBuf {
        self.root.join(format!("{digest}.json"))
    }

    /// Stream a tar of the given paths through a zstd encoder into `dest`
    async fn write_archive(
        &self,
        archive_paths: &[PathBuf],
        level: u8,
        dest: &Path,
    ) -> StepResult<u64> {
        debug!("Executing: tar -P -cf - {:?}", archive_paths);

        let mut cmd = Command::new("tar");
        cmd.arg("-P").arg("-cf").arg("-");
        for path in archive_paths {
            cmd.arg(path);
        }

        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StepError::command_failed("tar", e))?;

        let mut stdout = child.stdout.take().ok_or_else(|| StepError::ArchiveCreate {
            reason: "failed to capture tar output".to_string(),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| StepError::ArchiveCreate {
            reason: "failed to capture tar diagnostics".to_string(),
        })?;

        // Drain stderr concurrently so a chatty tar cannot block on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let tmp = dest.with_extension("zst.tmp");
        let file = std::fs::File::create(&tmp)
            .map_err(|e| StepError::io(format!("creating {}", tmp.display()), e))?;
        let mut encoder = zstd::stream::Encoder::new(file, i32::from(level))
            .map_err(|e| StepError::io("initializing zstd encoder", e))?;

        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = stdout
                .read(&mut buf)
                .await
                .map_err(|e| StepError::io("reading tar output", e))?;
            if n == 0 {
                break;
            }
            encoder
                .write_all(&buf[..n])
                .map_err(|e| StepError::io(format!("writing {}", tmp.display()), e))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| StepError::command_failed("tar", e))?;
        let stderr_buf = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let _ = std::fs::remove_file(&tmp);
            return Err(StepError::ArchiveCreate {
                reason: format!(
                    "tar exited with {}: {}",
                    status,
                    String::from_utf8_lossy(&stderr_buf).trim()
                ),
            });
        }

        encoder
            .finish()
            .map_err(|e| StepError::io("finishing zstd stream", e))?;

        tokio::fs::rename(&tmp, dest)
            .await
            .map_err(|e| StepError::io(format!("renaming {} into place", tmp.display()), e))?;

        let size = tokio::fs::metadata(dest)
            .await
            .map_err(|e| StepError::io(format!("reading size of {}", dest.display()), e))?
            .len();
        Ok(size)
    }

    async fn write_metadata(&self, digest: &str, metadata: &EntryMetadata) -> StepResult<()> {
        let path = self.metadata_path(digest);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StepError::io(format!("writing {}", tmp.display()), e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StepError::io(format!("renaming {} into place", tmp.display()), e))?;
        Ok(())
    }
}

#[async_trait]
impl CacheSaver for LocalStore {
    async fn save(&self, request: &SaveCacheRequest) -> StepResult<()> {
        let workdir = std::env::current_dir()
            .map_err(|e| StepError::io("getting current directory", e))?;
        let key = keys::resolve(&request.key, &TemplateContext::for_host(workdir))?;
        info!("Cache key: {key}");

        let mut existing = Vec::new();
        for raw in &request.paths {
            let path = paths::expand(raw)?;
            if path.exists() {
                existing.push(path);
            } else {
                warn!("Cache path does not exist, skipping: {}", path.display());
            }
        }
        if existing.is_empty() {
            warn!("No cache paths exist, nothing to save");
            return Ok(());
        }

        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        let archive = self.archive_path(&digest);
        if request.is_key_unique && archive.exists() {
            info!("Cache entry already exists for key {key}, skipping save");
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StepError::io(format!("creating store {}", self.root.display()), e))?;

        let size_bytes = self
            .write_archive(&existing, request.compression_level, &archive)
            .await?;

        let metadata = EntryMetadata {
            key,
            paths: existing
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            compression_level: request.compression_level,
            size_bytes,
            created_at: Utc::now(),
        };
        self.write_metadata(&digest, &metadata).await?;

        info!("Cache saved: {}", format_bytes(size_bytes));
        Ok(())
    }
}
