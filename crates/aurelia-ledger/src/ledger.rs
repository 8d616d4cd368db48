//! JSON-document ledger persistence.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::fs;
use tokio::sync::Mutex;

use aurelia_core::constants::LEDGER_ID_PREFIX;
use aurelia_core::models::{MediaEntry, MediaLedgerDocument, NewMediaEntry};

const ID_TOKEN_LEN: usize = 6;

/// Ledger operation errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed ledger document: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Selector for `remove`: exactly one of entry id or storage key.
#[derive(Debug, Clone)]
pub enum RemoveSelector {
    ById(String),
    ByKey(String),
}

/// Result of a `remove` call.
#[derive(Debug, Clone, Copy)]
pub struct RemoveOutcome {
    pub removed: usize,
    pub remaining: usize,
}

/// Media ledger backed by a single JSON document.
///
/// All mutations run load → mutate → persist under the write lock; reads go
/// straight to the file (the atomic rename in `persist` keeps them
/// consistent).
pub struct MediaLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MediaLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MediaLedger {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document; a missing file is an empty ledger.
    pub async fn load(&self) -> LedgerResult<MediaLedgerDocument> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(MediaLedgerDocument::empty());
        }
        let data = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Append entries, generating an id and `uploaded_at` for each, and
    /// persist the full document. Returns the created records.
    pub async fn append(&self, entries: Vec<NewMediaEntry>) -> LedgerResult<Vec<MediaEntry>> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load().await?;
        let mut created = Vec::with_capacity(entries.len());

        for entry in entries {
            let record = MediaEntry {
                id: generate_entry_id(),
                product_id: entry.product_id,
                url: entry.url,
                s3_key: entry.s3_key,
                original_filename: entry.original_filename,
                mime_type: entry.mime_type,
                file_size: entry.file_size,
                is_webp: entry.is_webp,
                uploaded_at: Utc::now(),
            };
            doc.entries.push(record.clone());
            created.push(record);
        }

        self.persist(&mut doc).await?;

        tracing::info!(
            added = created.len(),
            total = doc.entries.len(),
            path = %self.path.display(),
            "Ledger entries appended"
        );

        Ok(created)
    }

    /// List entries, optionally filtered by exact `product_id`, in insertion
    /// order. Returns the page and the total count after filtering.
    pub async fn list(
        &self,
        product_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> LedgerResult<(Vec<MediaEntry>, usize)> {
        let doc = self.load().await?;

        let filtered: Vec<MediaEntry> = match product_id {
            Some(pid) => doc
                .entries
                .into_iter()
                .filter(|e| e.product_id.as_deref() == Some(pid))
                .collect(),
            None => doc.entries,
        };

        let total = filtered.len();
        let page = filtered.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    /// Remove all entries matching the selector and persist. Matching
    /// nothing is not an error: the outcome simply reports zero removed.
    pub async fn remove(&self, selector: RemoveSelector) -> LedgerResult<RemoveOutcome> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load().await?;
        let initial = doc.entries.len();

        match &selector {
            RemoveSelector::ById(id) => doc.entries.retain(|e| &e.id != id),
            RemoveSelector::ByKey(key) => doc.entries.retain(|e| &e.s3_key != key),
        }

        let removed = initial - doc.entries.len();
        let remaining = doc.entries.len();

        if removed > 0 {
            self.persist(&mut doc).await?;
        }

        tracing::info!(
            selector = ?selector,
            removed,
            remaining,
            "Ledger entries removed"
        );

        Ok(RemoveOutcome { removed, remaining })
    }

    /// Write the document to a sibling temp file and rename it into place.
    async fn persist(&self, doc: &mut MediaLedgerDocument) -> LedgerResult<()> {
        doc.updated_at = Utc::now();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(doc)?;

        let tmp_path = self.path.with_extension(format!("tmp-{}", random_token()));
        fs::write(&tmp_path, &data).await?;
        fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

/// Generate a ledger entry id: `media_{unix_millis}_{token}`.
///
/// The token comes from a CSPRNG, so ids stay unique even under
/// same-millisecond concurrent appends.
fn generate_entry_id() -> String {
    format!(
        "{}_{}_{}",
        LEDGER_ID_PREFIX,
        Utc::now().timestamp_millis(),
        random_token()
    )
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_TOKEN_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}
