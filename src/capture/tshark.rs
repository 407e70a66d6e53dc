//! External capture decoder wrapper
//!
//! Spawns tshark in fields mode filtered to S7COMM traffic and streams its
//! per-frame output lines. Lines that cannot be structured are counted and
//! skipped, never fatal.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use tracing::warn;

use super::{RawFrame, TSHARK_FIELDS};
use crate::error::{Result, S7TraceError};

/// Streaming iterator over the decoded frames of one capture file
#[derive(Debug)]
pub struct FrameStream {
    child: Child,
    reader: BufReader<ChildStdout>,
    /// Drains the decoder's stderr while stdout is being consumed; a child
    /// blocked on a full stderr pipe would otherwise stall the whole run
    stderr_drain: Option<JoinHandle<String>>,
    skipped: usize,
}

impl FrameStream {
    /// Start the external decoder on a capture file
    pub fn open(capture: &Path) -> Result<FrameStream> {
        let mut command = Command::new("tshark");
        command
            .arg("-r")
            .arg(capture)
            .args(["-Y", "s7comm", "-T", "fields"])
            .args(["-E", "separator=/t", "-E", "occurrence=f"]);
        for field in TSHARK_FIELDS {
            command.args(["-e", field]);
        }

        Self::spawn(command).map_err(|e| match e {
            S7TraceError::ExternalTool(msg) => S7TraceError::ExternalTool(format!(
                "{} (capture: {})",
                msg,
                capture.display()
            )),
            other => other,
        })
    }

    fn spawn(mut command: Command) -> Result<FrameStream> {
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                S7TraceError::ExternalTool(format!("failed to start decoder: {e}"))
            })?;

        // Piped stdout is always present after a successful spawn
        let stdout = child.stdout.take().ok_or_else(|| {
            S7TraceError::ExternalTool("decoder stdout unavailable".to_string())
        })?;

        let stderr_drain = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text);
                text
            })
        });

        Ok(FrameStream {
            child,
            reader: BufReader::new(stdout),
            stderr_drain,
            skipped: 0,
        })
    }

    /// Frames the decoder emitted but this tool could not structure
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Wait for the decoder to exit and return the skipped-frame count
    ///
    /// Must be called after the stream is exhausted; a non-zero decoder exit
    /// is an external-tool failure.
    pub fn finish(mut self) -> Result<usize> {
        let stderr_text = self
            .stderr_drain
            .take()
            .and_then(|drain| drain.join().ok())
            .unwrap_or_default();

        let status = self.child.wait()?;
        if !status.success() {
            return Err(S7TraceError::ExternalTool(format!(
                "decoder exited with {}: {}",
                status,
                stderr_text.trim()
            )));
        }
        Ok(self.skipped)
    }
}

impl Iterator for FrameStream {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {},
                Err(e) => {
                    warn!("failed to read from decoder: {e}");
                    return None;
                },
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            match RawFrame::from_field_line(line) {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    self.skipped += 1;
                    warn!("skipping unparseable frame line: {e}");
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    }

    #[test]
    fn test_stream_survives_chatty_stderr() {
        // Emits well past one pipe buffer of stderr before the first stdout
        // line; the run must not stall on the full pipe
        let script = r#"
awk 'BEGIN { for (i = 0; i < 20000; i++) print "noisy decoder warning" > "/dev/stderr" }'
printf '7\tt\te\tr\t\t\t\t\t\t\t\t\t\t\t\t\t\t\t\n'
"#;
        let mut stream = FrameStream::spawn(shell(script)).unwrap();
        let frames: Vec<RawFrame> = (&mut stream).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].number, 7);
        assert_eq!(stream.finish().unwrap(), 0);
    }

    #[test]
    fn test_failed_decoder_reports_stderr() {
        let mut stream =
            FrameStream::spawn(shell("echo decode failure >&2; exit 2")).unwrap();
        assert!((&mut stream).next().is_none());
        let err = stream.finish().unwrap_err();
        assert!(err.to_string().contains("decode failure"));
    }

    #[test]
    fn test_unparseable_lines_counted() {
        let script = r#"
echo garbage
printf '3\tt\te\tr\t\t\t\t\t\t\t\t\t\t\t\t\t\t\t\n'
"#;
        let mut stream = FrameStream::spawn(shell(script)).unwrap();
        let frames: Vec<RawFrame> = (&mut stream).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(stream.finish().unwrap(), 1);
    }

    #[test]
    fn test_missing_decoder_is_external_tool_error() {
        let err =
            FrameStream::spawn(Command::new("s7trace-no-such-decoder")).unwrap_err();
        assert!(matches!(err, S7TraceError::ExternalTool(_)));
    }
}
