// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bindery-store: durable document storage.
//
// Documents and their pages live in a local SQLite database. Every page row
// carries a SHA-256 checksum of its content that is verified when the page is
// loaded back.

pub mod integrity;
pub mod sqlite;

pub use integrity::{page_checksum, verify_page_checksum};
pub use sqlite::SqliteDocumentStore;
