// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for whoever presents results to the user.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Nothing here is retriable without the user changing something first.

use crate::error::PagestackError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it (remove a broken image, add images, fix a setting).
    ActionRequired,
    /// Another conversion is running; wait for it to finish.
    Busy,
    /// Something we cannot fix from here.
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

/// Convert a `PagestackError` into a `HumanError`.
pub fn humanize_error(err: &PagestackError) -> HumanError {
    match err {
        PagestackError::Validation(detail) => HumanError {
            message: format!("\"{detail}\" is not a PNG or JPEG image."),
            suggestion: "Only PNG and JPEG images can be added. Convert the file first.".into(),
            severity: Severity::ActionRequired,
        },

        PagestackError::Decode { asset, .. } => HumanError {
            message: format!("We couldn't read the image \"{asset}\"."),
            suggestion: "The file may be damaged. Remove it or replace it, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        PagestackError::ImageError(_) => HumanError {
            message: "One of the images couldn't be read.".into(),
            suggestion: "Check that every file opens in an image viewer, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        PagestackError::EmptyInput => HumanError {
            message: "There are no images to convert.".into(),
            suggestion: "Add at least one image first.".into(),
            severity: Severity::ActionRequired,
        },

        PagestackError::ConversionInProgress => HumanError {
            message: "A PDF is already being made.".into(),
            suggestion: "Wait for it to finish before starting another.".into(),
            severity: Severity::Busy,
        },

        PagestackError::Serialization(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "Try removing the most recently added image. If it keeps happening, report it.".into(),
            severity: Severity::Permanent,
        },

        PagestackError::InvalidPolicy(detail) => HumanError {
            message: "The page settings don't work together.".into(),
            suggestion: format!("Adjust the page settings: {detail}."),
            severity: Severity::ActionRequired,
        },

        PagestackError::Config(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the settings file is valid JSON.".into(),
            severity: Severity::ActionRequired,
        },

        PagestackError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file couldn't be found.".into(),
                suggestion: "Check the file name and location.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We don't have permission to use that file.".into(),
                suggestion: "Choose a different folder or check the file permissions.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Something went wrong reading or writing a file.".into(),
                suggestion: "Make sure the disk has free space and try again.".into(),
                severity: Severity::Permanent,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failure_names_the_image() {
        let err = PagestackError::Decode {
            asset: "holiday.jpg".into(),
            reason: "truncated".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("holiday.jpg"));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn concurrent_conversion_is_busy() {
        let human = humanize_error(&PagestackError::ConversionInProgress);
        assert_eq!(human.severity, Severity::Busy);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = PagestackError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn encoder_failure_is_permanent() {
        let human = humanize_error(&PagestackError::Serialization("empty output".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
