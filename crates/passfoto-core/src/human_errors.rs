// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every fatal pipeline error is mapped to plain English with a clear
// suggestion, so the calling boundary never shows a generic failure that
// hides which stage broke.

use crate::error::PassfotoError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must change something (pick another file, fix a setting).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives presentation).
    pub severity: Severity,
}

/// Convert a `PassfotoError` into a `HumanError` with a distinct message per
/// failure stage.
pub fn humanize_error(err: &PassfotoError) -> HumanError {
    match err {
        PassfotoError::Decode(_) => HumanError {
            message: "This photo can't be read.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first, then load it again.".into(),
            severity: Severity::ActionRequired,
        },

        PassfotoError::Composition(detail) => HumanError {
            message: "The photo couldn't be fitted into the sheet.".into(),
            suggestion: format!("Try a different photo or the default layout settings. ({detail})"),
            severity: Severity::Permanent,
        },

        PassfotoError::Encoding(detail) => HumanError {
            message: "The finished sheet couldn't be saved.".into(),
            suggestion: format!("Try PNG output instead of JPEG. ({detail})"),
            severity: Severity::Permanent,
        },

        PassfotoError::Config(detail) => HumanError {
            message: "One of the layout settings isn't usable.".into(),
            suggestion: format!("Check the grid, paper, and quality values, then try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PassfotoError::Io(detail) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the file path and permissions. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PassfotoError::Serialization(detail) => HumanError {
            message: "The configuration file isn't valid.".into(),
            suggestion: format!("Fix the JSON in the config file or remove it to use defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_fatal_stage_gets_a_distinct_message() {
        let errors = [
            PassfotoError::Decode("bad magic".into()),
            PassfotoError::Composition("empty slot".into()),
            PassfotoError::Encoding("jpeg failed".into()),
            PassfotoError::Config("cols = 0".into()),
        ];
        let messages: Vec<String> = errors
            .iter()
            .map(|e| humanize_error(e).message)
            .collect();

        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b, "two error kinds share the same user-facing message");
            }
        }
    }

    #[test]
    fn suggestions_carry_the_technical_detail() {
        let err = PassfotoError::Config("grid must have at least one column".into());
        let human = humanize_error(&err);
        assert!(human.suggestion.contains("grid must have at least one column"));
    }
}
