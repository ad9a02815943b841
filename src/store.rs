use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpoolError};

/// On-disk store for job content and encoded artifacts, addressed by job id.
///
/// Layout: `<content_dir>/<id>.txt` and `<qr_dir>/<id>.png`. Every write
/// lands in a `.tmp` sibling first and is published with `fs::rename`, so a
/// reader can never observe a half-written blob. A job exists from the query
/// side's perspective only once both blobs are present.
#[derive(Debug)]
pub struct JobStore {
    content_dir: PathBuf,
    qr_dir: PathBuf,
}

impl JobStore {
    /// Open the store, creating its directories if needed.
    pub fn open(content_dir: impl Into<PathBuf>, qr_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            content_dir: content_dir.into(),
            qr_dir: qr_dir.into(),
        };
        fs::create_dir_all(&store.content_dir)?;
        fs::create_dir_all(&store.qr_dir)?;
        Ok(store)
    }

    pub fn content_filename(id: u64) -> String {
        format!("{id}.txt")
    }

    pub fn artifact_filename(id: u64) -> String {
        format!("{id}.png")
    }

    fn content_path(&self, id: u64) -> PathBuf {
        self.content_dir.join(Self::content_filename(id))
    }

    fn artifact_path(&self, id: u64) -> PathBuf {
        self.qr_dir.join(Self::artifact_filename(id))
    }

    /// Persist the raw text payload for a job. Identities are never reused,
    /// so no two writers ever race on the same path.
    pub fn put_content(&self, id: u64, content: &str) -> Result<()> {
        write_atomic(&self.content_path(id), content.as_bytes())
    }

    /// Persist the encoded artifact for a job.
    pub fn put_artifact(&self, id: u64, artifact: &[u8]) -> Result<()> {
        write_atomic(&self.artifact_path(id), artifact)
    }

    pub fn content(&self, id: u64) -> Result<String> {
        match fs::read_to_string(self.content_path(id)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SpoolError::JobNotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn artifact(&self, id: u64) -> Result<Vec<u8>> {
        match fs::read(self.artifact_path(id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SpoolError::JobNotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// True only when both the content and the artifact have been published.
    pub fn exists(&self, id: u64) -> bool {
        self.content_path(id).exists() && self.artifact_path(id).exists()
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
