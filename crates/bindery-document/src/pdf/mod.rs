// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: rendering documents to PDF and inspecting the result.

pub mod exporter;
pub mod inspector;

pub use exporter::{PdfExporter, export_to_dir};
pub use inspector::PdfInspector;
