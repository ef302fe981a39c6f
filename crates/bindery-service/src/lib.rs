// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bindery-service: the async entry point a presentation layer talks to.
//
// Wires the assembly engine to the JPEG encoder, the PDF exporter and the
// SQLite store, and owns the data directory and config file.

pub mod services;
pub mod telemetry;

pub use services::library::LibraryService;
