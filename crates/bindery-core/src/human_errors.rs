// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the presentation layer.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the UI presents it.

use crate::error::BinderyError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary problem; trying again may work.
    Transient,
    /// User must do something (pick images, choose another page).
    ActionRequired,
    /// Cannot be fixed by retrying: damaged content, corrupt storage.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "Try again" button makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `BinderyError` into a `HumanError`.
pub fn humanize_error(err: &BinderyError) -> HumanError {
    match err {
        // -- Assembly --
        BinderyError::EmptyInput => HumanError {
            message: "No images were selected.".into(),
            suggestion: "Choose at least one image to create a document.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BinderyError::InvalidIndex { page_count, .. } => HumanError {
            message: "That page doesn't exist.".into(),
            suggestion: format!("This document has {page_count} pages. Pick one of those."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BinderyError::LastPageRejected => HumanError {
            message: "A document needs at least one page.".into(),
            suggestion: "To get rid of this page, delete the whole document instead.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BinderyError::EmptySources | BinderyError::MergeSelectionTooSmall { .. } => HumanError {
            message: "Not enough documents selected to merge.".into(),
            suggestion: "Select two or more documents, then merge again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BinderyError::DocumentNotFound(_) => HumanError {
            message: "That document is no longer available.".into(),
            suggestion: "It may have been deleted. Refresh the list and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BinderyError::InvalidDocument(_) => HumanError {
            message: "This document is damaged.".into(),
            suggestion: "Its pages are out of order or missing. Try creating it again from the original images.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Encoding / export --
        BinderyError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BinderyError::PdfError(_) | BinderyError::ExportFailed(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "One or more pages may be damaged. Try removing the affected pages and export again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Storage --
        BinderyError::Database(_) => HumanError {
            message: "The app's data storage had a problem.".into(),
            suggestion: "Try closing and reopening the app. Your saved documents should still be there.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BinderyError::IntegrityMismatch { .. } => HumanError {
            message: "A saved page has been changed since it was stored.".into(),
            suggestion: "The stored copy doesn't match the original. Recreate the document from the original images.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BinderyError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to use that location.".into(),
                    suggestion: "Check the folder permissions, or pick a different export folder in Settings.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        BinderyError::Serialization(_) | BinderyError::Task(_) => HumanError {
            message: "The app had an internal problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
