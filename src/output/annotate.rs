//! Capture annotation renderer
//!
//! Emits one text comment per frame into a working copy of the capture:
//! the resolved variable name, or a fixed marker for traffic the mapping
//! does not describe.

use std::path::Path;

use crate::capture::editcap::CaptureAnnotator;
use crate::engine::FrameRecord;
use crate::error::Result;

/// Comment attached to frames whose variable could not be resolved
pub const UNKNOWN_COMMENT: &str = "Unknown S7COMM device.";

/// Per-frame comment renderer backed by the external annotation utility
pub struct Annotator {
    capture: CaptureAnnotator,
}

impl Annotator {
    /// Duplicate the original capture and prepare it for annotation
    pub fn new(original: &Path, working_copy: &Path) -> Result<Annotator> {
        Ok(Annotator {
            capture: CaptureAnnotator::create(original, working_copy)?,
        })
    }

    /// Attach this record's comment to its frame in the working copy
    pub fn render(&self, record: &FrameRecord) -> Result<()> {
        let comment = record
            .variable
            .as_ref()
            .map(|v| v.name.as_str())
            .unwrap_or(UNKNOWN_COMMENT);
        self.capture.comment(record.number, comment)
    }

    /// Path of the annotated working copy
    pub fn path(&self) -> &Path {
        self.capture.path()
    }
}
