// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document library service. Owns the gateways and runs the assembly engine
// against them.
//
// The SQLite store is `Send` but not `Sync`, so it sits behind
// `Arc<Mutex<>>`. Image encoding, PDF rendering and database access all run
// on tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use bindery_core::assembly;
use bindery_core::error::{BinderyError, Result};
use bindery_core::{AppConfig, Document, DocumentExporter, DocumentId, DocumentStore, PageEncoder};
use bindery_document::pdf::export_to_dir;
use bindery_document::{JpegPageEncoder, PdfExporter};
use bindery_store::SqliteDocumentStore;
use tracing::{info, instrument, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "documents.db";
const EXPORTS_DIR: &str = "exports";

/// Handle to the document library.
///
/// All fields are Arc-wrapped, so clones are cheap and share state.
#[derive(Clone)]
pub struct LibraryService {
    store: Arc<Mutex<Box<dyn DocumentStore>>>,
    encoder: Arc<dyn PageEncoder>,
    exporter: Arc<dyn DocumentExporter>,
    config: Arc<Mutex<AppConfig>>,
    data_dir: PathBuf,
}

impl LibraryService {
    /// Initialise the library. Call once at startup.
    ///
    /// Resolves the data directory, loads `config.json` (defaults if absent
    /// or unreadable) and opens `documents.db`. The encoder size limit, page
    /// sizing and export policy are fixed here; later `save_config` calls
    /// take effect on the next `init`.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising library service");

        let config = load_config(&dir).unwrap_or_default();
        let store = SqliteDocumentStore::open(dir.join(DATABASE_FILE))?;

        let service = Self::with_components(
            Box::new(store),
            Arc::new(JpegPageEncoder::from_config(&config)),
            Arc::new(PdfExporter::from_config(&config)),
            config,
            dir,
        );
        info!("library service initialised");
        Ok(service)
    }

    /// A library backed by an in-memory database. Config and exports still
    /// live under `data_dir`.
    pub fn in_memory(config: AppConfig, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = SqliteDocumentStore::open_in_memory()?;
        Ok(Self::with_components(
            Box::new(store),
            Arc::new(JpegPageEncoder::from_config(&config)),
            Arc::new(PdfExporter::from_config(&config)),
            config,
            data_dir.into(),
        ))
    }

    /// Assemble a service from explicit gateways.
    pub fn with_components(
        store: Box<dyn DocumentStore>,
        encoder: Arc<dyn PageEncoder>,
        exporter: Arc<dyn DocumentExporter>,
        config: AppConfig,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            encoder,
            exporter,
            config: Arc::new(Mutex::new(config)),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -- Config ---------------------------------------------------------------

    /// Current configuration snapshot.
    pub fn config(&self) -> Result<AppConfig> {
        Ok(lock(&self.config, "config")?.clone())
    }

    /// Replace the configuration and write it to `config.json`.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *lock(&self.config, "config")? = config.clone();
        persist_config(&self.data_dir, config)
    }

    // -- Building -------------------------------------------------------------

    /// Encode `images` and build a new document from them. The result is
    /// not persisted; pass it to [`Self::save_document`] to keep it.
    #[instrument(skip(self, images), fields(images = images.len()))]
    pub async fn create_document(&self, images: Vec<Vec<u8>>, name: &str) -> Result<Document> {
        let quality = self.config()?.jpeg_quality;
        let encoder = Arc::clone(&self.encoder);
        let name = name.to_string();

        let document =
            blocking(move || assembly::build(&images, &name, encoder.as_ref(), quality)).await?;

        info!(document_id = %document.id(), pages = document.page_count(), "document built");
        Ok(document)
    }

    // -- Library --------------------------------------------------------------

    /// Insert or replace `document`. A blank name is stored, and returned,
    /// as the untitled default.
    #[instrument(skip(self, document), fields(document_id = %document.id()))]
    pub async fn save_document(&self, document: Document) -> Result<Document> {
        let document = document.normalized();
        self.with_store(move |store| {
            store.upsert(&document)?;
            Ok(document)
        })
        .await
    }

    /// Every stored document, newest first.
    pub async fn documents(&self) -> Result<Vec<Document>> {
        self.with_store(|store| store.fetch_all()).await
    }

    /// The stored document with `id`.
    pub async fn document(&self, id: DocumentId) -> Result<Document> {
        self.with_store(move |store| store.get(id)?.ok_or(BinderyError::DocumentNotFound(id)))
            .await
    }

    /// Remove a document and its pages. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub async fn delete_document(&self, id: DocumentId) -> Result<()> {
        self.with_store(move |store| store.delete(id)).await?;
        info!(document_id = %id, "document deleted");
        Ok(())
    }

    // -- Editing --------------------------------------------------------------

    /// Delete the page at `index` and save the result.
    #[instrument(skip(self, document), fields(document_id = %document.id()))]
    pub async fn remove_page(&self, document: &Document, index: usize) -> Result<Document> {
        let updated = assembly::delete_page(document, index)?;
        self.save_document(updated).await
    }

    /// Move the page at `from` to `to` and save the result.
    #[instrument(skip(self, document), fields(document_id = %document.id()))]
    pub async fn move_page(&self, document: &Document, from: usize, to: usize) -> Result<Document> {
        let updated = assembly::move_page(document, from, to)?;
        self.save_document(updated).await
    }

    /// Rename `document` and save the result.
    #[instrument(skip(self, document), fields(document_id = %document.id()))]
    pub async fn rename_document(&self, document: &Document, name: &str) -> Result<Document> {
        self.save_document(assembly::rename(document, name)).await
    }

    /// Merge the stored documents `ids`, oldest first, into a new saved
    /// document. The sources stay in the library.
    #[instrument(skip(self, ids), fields(selected = ids.len()))]
    pub async fn merge_documents(&self, ids: &[DocumentId], name: &str) -> Result<Document> {
        let mut selected = ids.to_vec();
        selected.sort();
        selected.dedup();
        if selected.len() < 2 {
            return Err(BinderyError::MergeSelectionTooSmall {
                selected: selected.len(),
            });
        }

        let sources = self
            .with_store(move |store| {
                selected
                    .iter()
                    .map(|&id| store.get(id)?.ok_or(BinderyError::DocumentNotFound(id)))
                    .collect::<Result<Vec<_>>>()
            })
            .await?;

        let merged = assembly::merge_chronological(&sources, name)?;
        info!(
            document_id = %merged.id(),
            sources = sources.len(),
            pages = merged.page_count(),
            "documents merged"
        );
        self.save_document(merged).await
    }

    // -- Export ---------------------------------------------------------------

    /// Render `document` to PDF and write it into the export directory.
    /// Returns the written path.
    #[instrument(skip(self, document), fields(document_id = %document.id()))]
    pub async fn export_document(&self, document: &Document) -> Result<PathBuf> {
        let dir = self.export_dir()?;
        let exporter = Arc::clone(&self.exporter);
        let document = document.clone();

        blocking(move || export_to_dir(exporter.as_ref(), &document, &dir)).await
    }

    fn export_dir(&self) -> Result<PathBuf> {
        Ok(self
            .config()?
            .export_dir
            .unwrap_or_else(|| self.data_dir.join(EXPORTS_DIR)))
    }

    /// Run `f` against the store on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn DocumentStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        blocking(move || {
            let mut guard = lock(&store, "store")?;
            f(&mut **guard)
        })
        .await
    }
}

// -- Helpers ------------------------------------------------------------------

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BinderyError::Task(format!("blocking task failed: {e}")))?
}

fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| BinderyError::Task(format!("{name} lock poisoned")))
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), "ignoring unreadable config: {e}");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use bindery_core::{ExportPolicy, Quality};
    use bindery_document::PdfInspector;
    use chrono::{TimeZone, Utc};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    use super::*;

    fn service() -> (LibraryService, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = LibraryService::in_memory(AppConfig::default(), dir.path()).expect("service");
        (service, dir)
    }

    fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([shade, shade, shade]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    /// A stored-ready document with raw page contents and a fixed creation
    /// time.
    fn stamped(name: &str, contents: &[&[u8]], seconds: i64) -> Document {
        let built = assembly::assemble(contents.iter().map(|c| c.to_vec()).collect(), name)
            .expect("assemble");
        Document::from_parts(
            built.id(),
            built.name(),
            Utc.timestamp_opt(seconds, 0).unwrap(),
            built.pages().to_vec(),
        )
        .expect("valid parts")
    }

    fn contents(document: &Document) -> Vec<Vec<u8>> {
        document.pages().iter().map(|p| p.content().to_vec()).collect()
    }

    #[tokio::test]
    async fn create_document_encodes_without_saving() {
        let (service, _dir) = service();
        let document = service
            .create_document(vec![png(20, 10, 10), png(10, 20, 200)], "Receipts")
            .await
            .expect("create");

        assert_eq!(document.name(), "Receipts");
        assert_eq!(document.page_count(), 2);
        assert_eq!(&document.pages()[0].content()[..2], &[0xFF, 0xD8]);
        assert!(service.documents().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn create_document_rejects_empty_and_bad_input() {
        let (service, _dir) = service();

        let empty = service.create_document(Vec::new(), "Empty").await;
        assert!(matches!(empty, Err(BinderyError::EmptyInput)));

        let garbage = service
            .create_document(vec![png(4, 4, 0), b"not an image".to_vec()], "Bad")
            .await;
        assert!(matches!(garbage, Err(BinderyError::ImageError(_))));
    }

    #[tokio::test]
    async fn save_normalizes_blank_names() {
        let (service, _dir) = service();
        let document = assembly::rename(&stamped("x", &[b"a"], 10), "   ");

        let saved = service.save_document(document.clone()).await.expect("save");
        assert_eq!(saved.name(), bindery_core::UNTITLED_DOCUMENT_NAME);

        let loaded = service.document(document.id()).await.expect("load");
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn documents_are_listed_newest_first() {
        let (service, _dir) = service();
        let older = stamped("older", &[b"a"], 100);
        let newer = stamped("newer", &[b"b"], 200);
        service.save_document(older.clone()).await.expect("save");
        service.save_document(newer.clone()).await.expect("save");

        let ids: Vec<DocumentId> = service
            .documents()
            .await
            .expect("list")
            .iter()
            .map(Document::id)
            .collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let (service, _dir) = service();
        let id = DocumentId::new();
        assert!(matches!(
            service.document(id).await,
            Err(BinderyError::DocumentNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn delete_document_removes_it() {
        let (service, _dir) = service();
        let document = stamped("gone", &[b"a", b"b"], 1);
        service.save_document(document.clone()).await.expect("save");

        service.delete_document(document.id()).await.expect("delete");
        service.delete_document(document.id()).await.expect("delete again");
        assert!(service.documents().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn remove_page_persists_and_guards_last_page() {
        let (service, _dir) = service();
        let document = stamped("pages", &[b"a", b"b"], 1);
        service.save_document(document.clone()).await.expect("save");

        let updated = service.remove_page(&document, 0).await.expect("remove");
        assert_eq!(contents(&updated), vec![b"b".to_vec()]);
        assert_eq!(service.document(document.id()).await.expect("load"), updated);

        let last = service.remove_page(&updated, 0).await;
        assert!(matches!(last, Err(BinderyError::LastPageRejected)));
        assert_eq!(service.document(document.id()).await.expect("load"), updated);
    }

    #[tokio::test]
    async fn move_and_rename_are_persisted() {
        let (service, _dir) = service();
        let document = stamped("draft", &[b"a", b"b", b"c"], 1);
        service.save_document(document.clone()).await.expect("save");

        let moved = service.move_page(&document, 2, 0).await.expect("move");
        assert_eq!(
            contents(&moved),
            vec![b"c".to_vec(), b"a".to_vec(), b"b".to_vec()]
        );

        let renamed = service.rename_document(&moved, "Final").await.expect("rename");
        let loaded = service.document(document.id()).await.expect("load");
        assert_eq!(loaded.name(), "Final");
        assert_eq!(loaded, renamed);
        assert_eq!(loaded.created_at(), document.created_at());
    }

    #[tokio::test]
    async fn merge_orders_sources_oldest_first_and_keeps_them() {
        let (service, _dir) = service();
        let older = stamped("older", &[b"o1", b"o2"], 100);
        let newer = stamped("newer", &[b"n1"], 200);
        service.save_document(older.clone()).await.expect("save");
        service.save_document(newer.clone()).await.expect("save");

        let merged = service
            .merge_documents(&[newer.id(), older.id()], "")
            .await
            .expect("merge");

        assert_eq!(merged.name(), assembly::MERGED_DOCUMENT_NAME);
        assert_eq!(
            contents(&merged),
            vec![b"o1".to_vec(), b"o2".to_vec(), b"n1".to_vec()]
        );
        assert_eq!(service.documents().await.expect("list").len(), 3);
        assert_eq!(service.document(merged.id()).await.expect("load"), merged);
    }

    #[tokio::test]
    async fn merge_needs_two_distinct_existing_documents() {
        let (service, _dir) = service();
        let document = stamped("solo", &[b"a"], 1);
        service.save_document(document.clone()).await.expect("save");

        let duplicate = service
            .merge_documents(&[document.id(), document.id()], "x")
            .await;
        assert!(matches!(
            duplicate,
            Err(BinderyError::MergeSelectionTooSmall { selected: 1 })
        ));

        let missing = DocumentId::new();
        let unknown = service.merge_documents(&[document.id(), missing], "x").await;
        assert!(matches!(
            unknown,
            Err(BinderyError::DocumentNotFound(id)) if id == missing
        ));
        assert_eq!(service.documents().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn export_writes_pdf_into_data_dir() {
        let (service, dir) = service();
        let document = service
            .create_document(vec![png(30, 40, 50), png(40, 30, 150)], "Scan: 1/2")
            .await
            .expect("create");

        let path = service.export_document(&document).await.expect("export");

        assert_eq!(path, dir.path().join(EXPORTS_DIR).join("Scan_ 1_2.pdf"));
        let inspector = PdfInspector::open(&path).expect("parse exported pdf");
        assert_eq!(inspector.page_count(), 2);
    }

    #[tokio::test]
    async fn export_honours_configured_directory_and_policy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exports = dir.path().join("elsewhere");
        let config = AppConfig {
            export_dir: Some(exports.clone()),
            export_policy: ExportPolicy::Lenient,
            ..AppConfig::default()
        };
        let service = LibraryService::in_memory(config, dir.path()).expect("service");

        let good = service
            .create_document(vec![png(10, 10, 90)], "Mixed")
            .await
            .expect("create");
        let pages: Vec<Vec<u8>> = vec![contents(&good).remove(0), b"broken".to_vec()];
        let mixed = assembly::assemble(pages, "Mixed").expect("assemble");

        let path = service.export_document(&mixed).await.expect("export");
        assert!(path.starts_with(&exports));
        assert_eq!(PdfInspector::open(&path).expect("parse").page_count(), 1);
    }

    #[tokio::test]
    async fn strict_export_fails_on_bad_page() {
        let (service, dir) = service();
        let document = assembly::assemble(vec![b"broken".to_vec()], "Broken").expect("assemble");

        let result = service.export_document(&document).await;
        assert!(matches!(result, Err(BinderyError::ExportFailed(_))));
        assert!(!dir.path().join(EXPORTS_DIR).join("Broken.pdf").exists());
    }

    #[tokio::test]
    async fn saved_config_is_reloaded() {
        let (service, dir) = service();
        let config = AppConfig {
            jpeg_quality: Quality::new(0.4),
            max_page_dimension: None,
            ..AppConfig::default()
        };

        service.save_config(&config).expect("save config");

        assert_eq!(service.config().expect("config"), config);
        assert_eq!(load_config(dir.path()), Some(config));
    }

    #[test]
    fn unreadable_config_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").expect("write");
        assert_eq!(load_config(dir.path()), None);
    }
}
