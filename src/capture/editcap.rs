//! External annotation utility wrapper
//!
//! Attaches per-frame comments to a working copy of the capture via editcap.
//! The original capture file is never modified; each annotation writes a
//! fresh file and renames it over the working copy so an interrupted run
//! never leaves a truncated file behind.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Result, S7TraceError};

/// Working copy of a capture file accepting per-frame comments
#[derive(Debug)]
pub struct CaptureAnnotator {
    working_copy: PathBuf,
}

impl CaptureAnnotator {
    /// Duplicate the original capture into a working copy
    ///
    /// Refuses a working-copy path that resolves to the original capture:
    /// copying a file onto itself truncates it, and the original must never
    /// be modified.
    pub fn create(original: &Path, working_copy: &Path) -> Result<CaptureAnnotator> {
        if working_copy.exists() {
            let original_real = std::fs::canonicalize(original)?;
            let working_real = std::fs::canonicalize(working_copy)?;
            if original_real == working_real {
                return Err(S7TraceError::ExternalTool(format!(
                    "refusing to annotate in place: {} and {} are the same file",
                    original.display(),
                    working_copy.display()
                )));
            }
        }

        std::fs::copy(original, working_copy).map_err(|e| {
            S7TraceError::ExternalTool(format!(
                "failed to duplicate {} to {}: {}",
                original.display(),
                working_copy.display(),
                e
            ))
        })?;
        debug!("working copy created at {}", working_copy.display());
        Ok(CaptureAnnotator {
            working_copy: working_copy.to_path_buf(),
        })
    }

    /// Attach a text comment to one frame of the working copy
    pub fn comment(&self, frame_number: u64, text: &str) -> Result<()> {
        let staged = self.working_copy.with_extension("tmp");

        let output = Command::new("editcap")
            .arg("-a")
            .arg(format!("{frame_number}:{text}"))
            .arg(&self.working_copy)
            .arg(&staged)
            .output()
            .map_err(|e| {
                S7TraceError::ExternalTool(format!("failed to start editcap: {e}"))
            })?;

        if !output.status.success() {
            let _ = std::fs::remove_file(&staged);
            return Err(S7TraceError::ExternalTool(format!(
                "editcap exited with {} while annotating frame {}: {}",
                output.status,
                frame_number,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        std::fs::rename(&staged, &self.working_copy)?;
        Ok(())
    }

    /// Path of the annotated working copy
    pub fn path(&self) -> &Path {
        &self.working_copy
    }
}
