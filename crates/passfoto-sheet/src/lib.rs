// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// passfoto-sheet — Sheet generation for the Passfoto passport-photo tool.
//
// Provides the grid layout solver, slot composition (cover-fit plus border),
// sheet rendering with dashed cut guides, background normalization
// (orientation correction and optional subject isolation), and output
// encoding. `pipeline::generate_sheet` ties the stages together.

pub mod compose;
pub mod encode;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod segment;

// Re-export the primary entry points so callers can use
// `passfoto_sheet::generate_sheet` etc.
pub use layout::{Layout, solve};
pub use pipeline::{RenderedSheet, generate_sheet};
pub use segment::{CommandSegmenter, NoSegmenter, SegmentError, Segmenter};
