//! Scratch directory for staged schema copies
//!
//! Generators read schema documents from disk. When a run edits a document
//! first (merged validation logic, stripped annotations) the edited copy is
//! staged here and the directory is removed when the run ends.

use std::path::{Path, PathBuf};

use metadata_core::SchemaDocument;
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PipelineError, Result};
use crate::linkml::write_document;

/// Process-lifetime scratch space owned by one run
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("metadata-automation-")
            .tempdir()
            .map_err(|e| PipelineError::io(std::env::temp_dir(), e))?;
        debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self { dir })
    }

    /// Root of the scratch directory
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copy every YAML document under `root` into the scratch directory
    ///
    /// Returns the number of files copied. A missing `root` copies nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked or a file cannot be copied.
    pub fn mirror(&self, root: &Path) -> Result<usize> {
        if !root.is_dir() {
            return Ok(0);
        }
        let mut copied = 0;
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                PipelineError::io(path, std::io::Error::other(e.to_string()))
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "yaml") {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let target = self.dir.path().join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
            }
            std::fs::copy(path, &target).map_err(|e| PipelineError::io(path, e))?;
            copied += 1;
        }
        debug!(root = %root.display(), copied, "mirrored schema documents");
        Ok(copied)
    }

    /// Stage a document under a path relative to the scratch root
    ///
    /// Staging keeps the relative layout so `../` imports between staged
    /// documents keep resolving.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn stage(&self, relative: &Path, document: &SchemaDocument) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        write_document(document, &path)?;
        Ok(path)
    }
}
