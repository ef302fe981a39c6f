// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspector: open a PDF with `lopdf` and report on its page tree. Used
// to check exported files before they are handed to the caller.

use std::path::Path;

use bindery_core::error::{BinderyError, Result};
use lopdf::{Document, Object};
use tracing::{debug, instrument};

/// Read-only view over a parsed PDF.
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    /// Parse a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            BinderyError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Parse a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            BinderyError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Number of pages in the page tree.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height in points of page `page_number` (1-indexed), taken
    /// from its /MediaBox.
    pub fn page_size_pt(&self, page_number: u32) -> Result<(f32, f32)> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or_else(|| {
            BinderyError::PdfError(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;

        let page = self
            .document
            .get_dictionary(page_id)
            .map_err(|err| BinderyError::PdfError(format!("page {page_number}: {err}")))?;

        let media_box = page
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .map_err(|err| BinderyError::PdfError(format!("page {page_number} /MediaBox: {err}")))?;

        let coords = media_box
            .iter()
            .map(|value| value.as_float())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|err| BinderyError::PdfError(format!("page {page_number} /MediaBox: {err}")))?;

        match coords.as_slice() {
            [x0, y0, x1, y1] => Ok(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => Err(BinderyError::PdfError(format!(
                "page {page_number} /MediaBox has {} entries",
                coords.len()
            ))),
        }
    }
}
