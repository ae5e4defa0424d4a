//! Filesystem persistence for derived feed artifacts.
//!
//! One JSON file per artifact inside a single output directory, replaced
//! wholesale on every successful round. The payload lands in a temp file
//! first and is renamed over the target, so a concurrent reader always
//! sees either the old document or the new one, never a torn mix.

mod error;

pub use error::WriteError;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use sheetfeed_core::Artifact;

/// Distinguishes temp files of concurrent writes to the same artifact.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory artifacts are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one artifact's JSON file.
    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    /// Serialize `value` as pretty JSON and replace the artifact file.
    pub fn write<T: Serialize>(&self, artifact: Artifact, value: &T) -> Result<(), WriteError> {
        let json = serde_json::to_string_pretty(value)?;
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".{}.{seq}.tmp", artifact.file_name()));
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, self.path(artifact)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Read an artifact file back as a string. Used by diagnostics and
    /// tests; consumers normally fetch artifacts over `/data`.
    pub fn read_to_string(&self, artifact: Artifact) -> Result<String, WriteError> {
        Ok(fs::read_to_string(self.path(artifact))?)
    }
}
