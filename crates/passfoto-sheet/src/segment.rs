// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subject segmentation capability.
//
// Background removal is an optional, external concern: a capability that
// either exists (an external process speaking PNG on stdin/stdout, e.g.
// `rembg i - -`) or does not. The variant is selected once at startup and
// threaded through the pipeline; the pipeline never probes per call.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument};

/// Why a segmentation call produced no usable mask.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// No capability was configured — the identity no-op variant.
    #[error("no segmentation capability configured")]
    Unavailable,

    /// The external segmenter did not answer within the deadline. The call
    /// fails closed: the child process is killed and the pipeline continues
    /// without isolation.
    #[error("segmenter did not answer within {0:?}")]
    TimedOut(Duration),

    /// The segmenter ran but failed (bad exit status, broken pipe, empty
    /// output).
    #[error("segmenter failed: {0}")]
    Failed(String),
}

/// A capability that turns an encoded raster into the same raster with an
/// alpha channel marking the foreground subject.
pub trait Segmenter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Given PNG bytes, return PNG bytes with a foreground alpha mask, or
    /// signal why that was not possible.
    fn segment(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError>;
}

/// The "absent" variant: always reports the capability as unavailable.
pub struct NoSegmenter;

impl Segmenter for NoSegmenter {
    fn name(&self) -> &str {
        "none"
    }

    fn segment(&self, _png: &[u8]) -> Result<Vec<u8>, SegmentError> {
        Err(SegmentError::Unavailable)
    }
}

/// The "available" variant: pipes the image through an external process.
///
/// The process receives PNG bytes on stdin and must write PNG bytes with an
/// alpha channel to stdout. Anything on stderr is captured for diagnostics.
pub struct CommandSegmenter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSegmenter {
    /// Default deadline for the external process.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Segmenter for CommandSegmenter {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self, png), fields(program = %self.program, data_len = png.len()))]
    fn segment(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                SegmentError::Failed(format!("could not start {}: {}", self.program, err))
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SegmentError::Failed("child stdin unavailable".into()));
        };
        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SegmentError::Failed("child stdout unavailable".into()));
        };
        let stderr = child.stderr.take();

        // Feed stdin from its own thread so a child that writes before
        // consuming all input cannot deadlock against us.
        let payload = png.to_vec();
        thread::spawn(move || {
            let _ = stdin.write_all(&payload);
            // stdin drops here, closing the pipe.
        });

        let (out_tx, out_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let result = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = out_tx.send(result);
        });

        let (err_tx, err_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut diag = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut diag);
            }
            let _ = err_tx.send(diag);
        });

        match out_rx.recv_timeout(self.timeout) {
            Ok(Ok(bytes)) => {
                let status = child.wait().map_err(|err| {
                    SegmentError::Failed(format!("waiting for {}: {}", self.program, err))
                })?;
                if !status.success() {
                    let diag = err_rx
                        .recv_timeout(Duration::from_millis(200))
                        .unwrap_or_default();
                    return Err(SegmentError::Failed(format!(
                        "{} exited with {}: {}",
                        self.program,
                        status,
                        diag.trim()
                    )));
                }
                if bytes.is_empty() {
                    return Err(SegmentError::Failed(format!(
                        "{} produced no output",
                        self.program
                    )));
                }
                debug!(bytes = bytes.len(), "segmenter returned a mask");
                Ok(bytes)
            }
            Ok(Err(err)) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(SegmentError::Failed(format!(
                    "reading segmenter output: {err}"
                )))
            }
            Err(_) => {
                // Fail closed: kill the straggler so it cannot outlive the
                // request.
                let _ = child.kill();
                let _ = child.wait();
                Err(SegmentError::TimedOut(self.timeout))
            }
        }
    }
}

// -- Tests --------------------------------------------------------------------
