// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator interfaces consumed around the assembly engine: image
// encoding, persistence, and export. Implementations live in other crates.

use crate::error::Result;
use crate::types::{Document, DocumentId, PageId, Quality};

/// Turns a raw image (any supported container format) into page bytes.
///
/// Encoding must be deterministic for identical input and quality.
pub trait PageEncoder: Send + Sync {
    fn encode(&self, raw_image: &[u8], quality: Quality) -> Result<Vec<u8>>;
}

/// Durable storage of documents keyed by identity.
///
/// Implementations are synchronous. In an async context, call them from
/// `tokio::task::spawn_blocking`.
pub trait DocumentStore: Send {
    /// Insert or fully replace a document. The stored page set is replaced
    /// atomically: readers see either the old pages or the new ones.
    fn upsert(&mut self, document: &Document) -> Result<()>;

    /// All documents, newest first.
    fn fetch_all(&self) -> Result<Vec<Document>>;

    /// A single document, or `None` if it does not exist.
    fn get(&self, id: DocumentId) -> Result<Option<Document>>;

    /// Remove a document and its pages. Deleting an absent id is a no-op.
    fn delete(&mut self, id: DocumentId) -> Result<()>;
}

/// Renders a document's pages into a single exportable artifact.
pub trait DocumentExporter: Send + Sync {
    fn export(&self, document: &Document) -> Result<ExportedDocument>;
}

/// Output of a successful export.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// Serialised artifact bytes.
    pub bytes: Vec<u8>,
    /// Number of pages present in the artifact.
    pub page_count: usize,
    /// Pages left out because their content could not be decoded.
    pub skipped: Vec<PageId>,
}
