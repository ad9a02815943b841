use std::sync::Arc;

use crate::config::SpoolConfig;
use crate::encode::Encoder;
use crate::error::{Result, SpoolError};
use crate::sequence::FileSequence;
use crate::store::JobStore;

/// What a successful submission hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReceipt {
    pub id: u64,
    /// Artifact locator, e.g. `3.png`
    pub filename: String,
    /// Content locator, e.g. `3.txt`
    pub content_filename: String,
}

/// Snapshot returned by the latest-job query.
///
/// `available=false` with `exists=true` means the counter has advanced but
/// the blobs have not all landed yet (a submission in flight, or one that
/// failed after reserving its id). Pollers should retry rather than error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestJob {
    pub exists: bool,
    pub id: Option<u64>,
    pub available: bool,
}

impl LatestJob {
    pub fn none() -> Self {
        Self {
            exists: false,
            id: None,
            available: false,
        }
    }
}

/// The job sequencing and hand-off pipeline: assigns each submission a
/// durable increasing identity, persists content and artifact, and answers
/// the polling query the display surface drives itself from.
pub struct PrintSpooler {
    sequence: FileSequence,
    store: JobStore,
    encoder: Arc<dyn Encoder>,
}

impl PrintSpooler {
    /// Open the spooler over the config's data directory, creating the
    /// layout if this is the first run.
    pub fn open(config: &SpoolConfig, encoder: Arc<dyn Encoder>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            sequence: FileSequence::new(config.counter_file()),
            store: JobStore::open(config.content_dir(), config.qr_dir())?,
            encoder,
        })
    }

    /// Accept a print job.
    ///
    /// Validation happens before an identity is consumed; an empty or
    /// whitespace-only payload never advances the counter. If persistence
    /// fails after the identity was reserved, that identity is permanently
    /// skipped rather than reused, and the incomplete job stays invisible
    /// to the query side (`available=false`).
    pub fn submit(&self, content: &str) -> Result<JobReceipt> {
        if content.trim().is_empty() {
            return Err(SpoolError::EmptyContent);
        }

        let id = self.sequence.next()?;
        self.store.put_content(id, content)?;

        let artifact = self.encoder.encode(content)?;
        self.store.put_artifact(id, &artifact)?;

        let receipt = JobReceipt {
            id,
            filename: JobStore::artifact_filename(id),
            content_filename: JobStore::content_filename(id),
        };
        tracing::info!(job_id = id, filename = %receipt.filename, "Print job accepted");
        Ok(receipt)
    }

    /// The newest known job identity and whether its blobs are readable.
    /// Read-only; safe to poll at arbitrary frequency.
    pub fn latest(&self) -> LatestJob {
        let id = self.sequence.current();
        if id == 0 {
            return LatestJob::none();
        }
        LatestJob {
            exists: true,
            id: Some(id),
            available: self.store.exists(id),
        }
    }

    pub fn content(&self, id: u64) -> Result<String> {
        self.store.content(id)
    }

    pub fn artifact(&self, id: u64) -> Result<Vec<u8>> {
        self.store.artifact(id)
    }

    pub fn exists(&self, id: u64) -> bool {
        self.store.exists(id)
    }
}
