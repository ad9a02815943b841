use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// Durable monotonic job-identity counter backed by a single file.
///
/// The value on disk is the identity of the most recently reserved job, or
/// zero if none exists. `next()` is the only mutating path and serializes
/// concurrent callers: two submissions can never observe or persist the same
/// identity. An identity is considered spent only once the new value has been
/// durably published, so a failed write never leaks an id to the caller.
///
/// A missing or unparseable counter file reads as zero rather than erroring;
/// the original deployment bootstrapped itself the same way.
#[derive(Debug)]
pub struct FileSequence {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSequence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Reserve and return the next job identity.
    ///
    /// Read-increment-write runs under the mutex as a single critical
    /// section, and the new value is published with a tmp-file rename so a
    /// crash mid-write leaves the old value intact.
    pub fn next(&self) -> Result<u64> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let next = read_value(&self.path) + 1;

        let tmp = self.path.with_extension("txt.tmp");
        fs::write(&tmp, next.to_string())?;
        fs::rename(&tmp, &self.path)?;

        Ok(next)
    }

    /// The most recently reserved identity, or zero if none. Read-only and
    /// safe to call at arbitrary frequency; read failures degrade to zero.
    pub fn current(&self) -> u64 {
        read_value(&self.path)
    }
}

fn read_value(path: &Path) -> u64 {
    match fs::read_to_string(path) {
        Ok(raw) => raw.trim().parse().unwrap_or(0),
        Err(_) => 0,
    }
}
