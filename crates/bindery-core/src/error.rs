// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bindery.

use thiserror::Error;

use crate::types::DocumentId;

/// Top-level error type for all Bindery operations.
#[derive(Debug, Error)]
pub enum BinderyError {
    // -- Assembly engine --
    #[error("no images provided for document creation")]
    EmptyInput,

    #[error("page index {index} out of range (document has {page_count} pages)")]
    InvalidIndex { index: usize, page_count: usize },

    #[error("cannot delete the last remaining page of a document")]
    LastPageRejected,

    #[error("no documents provided for merging")]
    EmptySources,

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    // -- Library --
    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),

    #[error("merging needs at least two documents, {selected} selected")]
    MergeSelectionTooSmall { selected: usize },

    // -- Encoding / export --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("export failed: {0}")]
    ExportFailed(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Scheduling --
    #[error("background task failed: {0}")]
    Task(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BinderyError>;
