// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Passfoto.
//
// Only fatal pipeline failures live here. Recoverable stage failures
// (orientation metadata, subject isolation, cover-fit) are absorbed at the
// stage with a warning and reported through `StageOutcome` instead.

use thiserror::Error;

/// Top-level error type for all Passfoto operations.
#[derive(Debug, Error)]
pub enum PassfotoError {
    /// The source image could not be decoded. Fatal: no partial output.
    #[error("could not decode source image: {0}")]
    Decode(String),

    /// Slot composition failed unexpectedly. The scale-to-fit fallback
    /// inside composition is not an error — only its own failure is.
    #[error("slot composition failed: {0}")]
    Composition(String),

    /// Final serialization of the sheet failed.
    #[error("could not encode output sheet: {0}")]
    Encoding(String),

    /// The caller supplied a configuration the pipeline must not run with.
    #[error("invalid sheet configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration file error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PassfotoError>;
