// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SQLite-backed document store.
//
// Schema:
//   documents(id TEXT PK, name TEXT, created_at TEXT)  -- RFC 3339, nanoseconds
//   pages(document_id TEXT FK, id TEXT, position INTEGER,
//         content BLOB, content_hash TEXT)            -- PK(document_id, id),
//                                                     -- UNIQUE(document_id, position)
//
// Page ids only need to be unique within their document.
//
// `created_at` is written with a fixed number of fractional digits so that
// ordering the text column is chronological.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use bindery_core::error::{BinderyError, Result};
use bindery_core::{Document, DocumentId, DocumentStore, Page, PageId};

use crate::integrity::{page_checksum, verify_page_checksum};

const CREATE_TABLES_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS documents_by_created_at ON documents (created_at);
    CREATE TABLE IF NOT EXISTS pages (
        document_id TEXT NOT NULL REFERENCES documents (id) ON DELETE CASCADE,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        content BLOB NOT NULL,
        content_hash TEXT NOT NULL,
        PRIMARY KEY (document_id, id),
        UNIQUE (document_id, position)
    );
"#;

/// Map a `rusqlite::Error` into `BinderyError::Database`, prefixed with what
/// was being attempted.
fn db_err(context: &'static str) -> impl Fn(rusqlite::Error) -> BinderyError {
    move |e| BinderyError::Database(format!("{context}: {e}"))
}

/// Document store backed by a single SQLite connection.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively. In an async context, wrap calls in `tokio::task::spawn_blocking`.
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Open (or create) the document database at `path`.
    ///
    /// Applies WAL journal mode so readers are not blocked by a writer and
    /// creates the tables if they do not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err("open"))?;

        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(db_err("WAL pragma"))?;

        Self::prepare(&conn)?;
        info!("document database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("open in-memory"))?;
        Self::prepare(&conn)?;
        debug!("in-memory document database opened");
        Ok(Self { conn })
    }

    fn prepare(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(db_err("foreign_keys pragma"))?;
        conn.execute_batch(CREATE_TABLES_SQL)
            .map_err(db_err("create tables"))
    }

    /// Load the pages of one document in position order, verifying each
    /// page's checksum.
    fn load_pages(conn: &Connection, id: DocumentId) -> Result<Vec<Page>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, position, content, content_hash
                 FROM pages WHERE document_id = ?1 ORDER BY position ASC",
            )
            .map_err(db_err("prepare load pages"))?;

        let rows = stmt
            .query_map(params![id.to_string()], |row| {
                Ok((
                    parse_uuid(row, 0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(db_err("query pages"))?;

        let mut pages = Vec::new();
        for row in rows {
            let (page_id, position, content, content_hash) = row.map_err(db_err("page row"))?;
            verify_page_checksum(&content, &content_hash)?;
            pages.push(Page::new(PageId(page_id), content, position));
        }
        Ok(pages)
    }

    fn load_headers(
        conn: &Connection,
        filter: Option<DocumentId>,
    ) -> Result<Vec<(DocumentId, String, DateTime<Utc>)>> {
        type Header = (DocumentId, String, DateTime<Utc>);
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Header> {
            Ok((
                DocumentId(parse_uuid(row, 0)?),
                row.get::<_, String>(1)?,
                parse_timestamp(row, 2)?,
            ))
        };

        let headers = match filter {
            Some(id) => conn
                .prepare("SELECT id, name, created_at FROM documents WHERE id = ?1")
                .map_err(db_err("prepare get document"))?
                .query_map(params![id.to_string()], map_row)
                .map_err(db_err("query document"))?
                .collect::<rusqlite::Result<Vec<_>>>(),
            None => conn
                .prepare(
                    "SELECT id, name, created_at FROM documents
                     ORDER BY created_at DESC, id DESC",
                )
                .map_err(db_err("prepare fetch all"))?
                .query_map([], map_row)
                .map_err(db_err("query documents"))?
                .collect::<rusqlite::Result<Vec<_>>>(),
        };

        headers.map_err(db_err("document row"))
    }

    fn load_documents(&self, filter: Option<DocumentId>) -> Result<Vec<Document>> {
        // One read transaction so a document and its pages come from the
        // same snapshot.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(db_err("begin read"))?;

        let mut documents = Vec::new();
        for (id, name, created_at) in Self::load_headers(&tx, filter)? {
            let pages = Self::load_pages(&tx, id)?;
            documents.push(Document::from_parts(id, name, created_at, pages)?);
        }

        tx.commit().map_err(db_err("end read"))?;
        Ok(documents)
    }
}

impl DocumentStore for SqliteDocumentStore {
    #[instrument(skip(self, document), fields(document_id = %document.id(), pages = document.page_count()))]
    fn upsert(&mut self, document: &Document) -> Result<()> {
        document.validate()?;

        let document_id = document.id().to_string();
        let tx = self.conn.transaction().map_err(db_err("begin upsert"))?;

        tx.execute(
            "INSERT INTO documents (id, name, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET name = excluded.name",
            params![
                document_id,
                document.persisted_name(),
                format_timestamp(document.created_at()),
            ],
        )
        .map_err(db_err("upsert document"))?;

        tx.execute(
            "DELETE FROM pages WHERE document_id = ?1",
            params![document_id],
        )
        .map_err(db_err("clear pages"))?;

        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO pages (id, document_id, position, content, content_hash)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(db_err("prepare insert page"))?;

            for page in document.pages() {
                insert
                    .execute(params![
                        page.id().to_string(),
                        document_id,
                        page.position(),
                        page.content(),
                        page_checksum(page.content()),
                    ])
                    .map_err(db_err("insert page"))?;
            }
        }

        tx.commit().map_err(db_err("commit upsert"))?;
        info!("document saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn fetch_all(&self) -> Result<Vec<Document>> {
        let documents = self.load_documents(None)?;
        debug!(count = documents.len(), "fetched all documents");
        Ok(documents)
    }

    #[instrument(skip(self), fields(document_id = %id))]
    fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        Ok(self.load_documents(Some(id))?.into_iter().next())
    }

    #[instrument(skip(self), fields(document_id = %id))]
    fn delete(&mut self, id: DocumentId) -> Result<()> {
        let id = id.to_string();
        let tx = self.conn.transaction().map_err(db_err("begin delete"))?;

        tx.execute("DELETE FROM pages WHERE document_id = ?1", params![id])
            .map_err(db_err("delete pages"))?;
        let removed = tx
            .execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(db_err("delete document"))?;

        tx.commit().map_err(db_err("commit delete"))?;
        debug!(removed, "document delete applied");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Column conversion
// ---------------------------------------------------------------------------

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a UUID column. A malformed value surfaces as a conversion error
/// rather than a panic.
fn parse_uuid(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(index)?;
    Uuid::parse_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
