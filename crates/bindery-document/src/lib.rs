// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bindery-document: page encoding and PDF export for Bindery.
//
// Provides the JPEG page encoder used when documents are built from images,
// the PDF exporter that renders a document's pages into a single file, and a
// small `lopdf`-based inspector used to check exported output.

pub mod image;
pub mod pdf;

// Re-export the primary structs so callers can use `bindery_document::PdfExporter` etc.
pub use crate::image::encoder::JpegPageEncoder;
pub use crate::pdf::exporter::PdfExporter;
pub use crate::pdf::inspector::PdfInspector;
