// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bindery: document model, assembly engine, and error definitions shared
// across all crates. Nothing in this crate performs I/O.

pub mod assembly;
pub mod config;
pub mod error;
pub mod gateway;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, ExportPolicy, PageSizing};
pub use error::{BinderyError, Result};
pub use gateway::{DocumentExporter, DocumentStore, ExportedDocument, PageEncoder};
pub use types::*;
