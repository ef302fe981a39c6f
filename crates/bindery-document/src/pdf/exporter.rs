// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF exporter: render a document's pages into one PDF using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::{Path, PathBuf};

use bindery_core::error::{BinderyError, Result};
use bindery_core::{
    AppConfig, Document, DocumentExporter, ExportPolicy, ExportedDocument, PageSizing,
};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::pdf::inspector::PdfInspector;

/// Resolution images are placed at when pages use a fixed paper size.
const PAPER_IMAGE_DPI: f32 = 150.0;

const MM_PER_INCH: f32 = 25.4;
const PT_PER_INCH: f32 = 72.0;

/// Renders documents to PDF, one PDF page per document page in position
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter {
    sizing: PageSizing,
    policy: ExportPolicy,
}

impl PdfExporter {
    pub fn new(sizing: PageSizing, policy: ExportPolicy) -> Self {
        Self { sizing, policy }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.page_sizing, config.export_policy)
    }

    /// Render `document` into PDF bytes.
    ///
    /// Page content is decoded with the `image` crate. Under
    /// `ExportPolicy::Strict` the first undecodable page aborts the export;
    /// under `ExportPolicy::Lenient` it is skipped and reported in
    /// [`ExportedDocument::skipped`]. Either way an export with no rendered
    /// pages fails with `ExportFailed`, and the serialised output is re-read
    /// to confirm its page count.
    #[instrument(skip_all, fields(document_id = %document.id(), pages = document.page_count()))]
    pub fn render(&self, document: &Document) -> Result<ExportedDocument> {
        let title = document.persisted_name();
        info!(sizing = ?self.sizing, policy = ?self.policy, title, "Exporting document to PDF");

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(document.page_count());
        let mut skipped = Vec::new();

        for page in document.pages() {
            let decoded = match ::image::load_from_memory(page.content()) {
                Ok(decoded) => decoded,
                Err(err) => match self.policy {
                    ExportPolicy::Strict => {
                        return Err(BinderyError::ExportFailed(format!(
                            "page {} could not be decoded: {}",
                            page.position() + 1,
                            err
                        )));
                    }
                    ExportPolicy::Lenient => {
                        warn!(
                            page = page.position() + 1,
                            page_id = %page.id(),
                            %err,
                            "Skipping undecodable page"
                        );
                        skipped.push(page.id());
                        continue;
                    }
                },
            };

            let width = decoded.width();
            let height = decoded.height();
            let raw = RawImage {
                pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let placement = place_image(self.sizing, width, height);
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(placement.offset_x_pt)),
                    translate_y: Some(Pt(placement.offset_y_pt)),
                    scale_x: Some(placement.scale),
                    scale_y: Some(placement.scale),
                    dpi: Some(placement.dpi),
                    rotate: None,
                },
            }];

            debug!(
                position = page.position(),
                page_w_mm = placement.page_width_mm,
                page_h_mm = placement.page_height_mm,
                scale = placement.scale,
                "Image placed on page"
            );
            pages.push(PdfPage::new(
                Mm(placement.page_width_mm),
                Mm(placement.page_height_mm),
                ops,
            ));
        }

        if pages.is_empty() {
            return Err(BinderyError::ExportFailed(
                "no page of the document could be rendered".into(),
            ));
        }

        let rendered = pages.len();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "printpdf reported warnings");
        }

        let written = PdfInspector::from_bytes(&bytes)
            .map_err(|err| BinderyError::ExportFailed(format!("output is not readable: {err}")))?
            .page_count();
        if written != rendered {
            return Err(BinderyError::ExportFailed(format!(
                "output has {written} pages, expected {rendered}"
            )));
        }

        info!(rendered, skipped = skipped.len(), bytes = bytes.len(), "PDF export complete");
        Ok(ExportedDocument {
            bytes,
            page_count: rendered,
            skipped,
        })
    }
}

impl DocumentExporter for PdfExporter {
    fn export(&self, document: &Document) -> Result<ExportedDocument> {
        self.render(document)
    }
}

/// Export `document` through `exporter` and write it to
/// `<dir>/<document name>.pdf`, replacing any file already there. Returns the
/// written path.
#[instrument(skip(exporter, document), fields(document_id = %document.id(), dir = %dir.display()))]
pub fn export_to_dir<E>(exporter: &E, document: &Document, dir: &Path) -> Result<PathBuf>
where
    E: DocumentExporter + ?Sized,
{
    let exported = exporter.export(document)?;
    if !exported.skipped.is_empty() {
        warn!(skipped = exported.skipped.len(), "export left out undecodable pages");
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(pdf_file_name(document));
    std::fs::write(&path, &exported.bytes)?;

    info!(pages = exported.page_count, "Wrote PDF to {}", path.display());
    Ok(path)
}

// -- Page geometry ------------------------------------------------------------

/// Where and how large an image sits on its PDF page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    page_width_mm: f32,
    page_height_mm: f32,
    offset_x_pt: f32,
    offset_y_pt: f32,
    scale: f32,
    dpi: f32,
}

/// Compute page size and image transform for an image of
/// `width_px` x `height_px` under `sizing`.
fn place_image(sizing: PageSizing, width_px: u32, height_px: u32) -> Placement {
    match sizing {
        PageSizing::MatchImage { dpi } => {
            let dpi = if dpi > 0.0 { dpi } else { PAPER_IMAGE_DPI };
            Placement {
                page_width_mm: width_px as f32 / dpi * MM_PER_INCH,
                page_height_mm: height_px as f32 / dpi * MM_PER_INCH,
                offset_x_pt: 0.0,
                offset_y_pt: 0.0,
                scale: 1.0,
                dpi,
            }
        }
        PageSizing::Paper {
            paper_size,
            margin_mm,
        } => {
            let (w_mm, h_mm) = paper_size.dimensions_mm();
            let (page_w_mm, page_h_mm) = (w_mm as f32, h_mm as f32);
            let margin_mm = margin_mm.clamp(0.0, page_w_mm.min(page_h_mm) / 2.0);

            let usable_w_pt = Mm(page_w_mm - 2.0 * margin_mm).into_pt().0;
            let usable_h_pt = Mm(page_h_mm - 2.0 * margin_mm).into_pt().0;

            // Native size at the placement DPI.
            let img_w_pt = width_px.max(1) as f32 / PAPER_IMAGE_DPI * PT_PER_INCH;
            let img_h_pt = height_px.max(1) as f32 / PAPER_IMAGE_DPI * PT_PER_INCH;

            // Scale to fit while preserving aspect ratio; do not upscale.
            let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt).min(1.0);

            // Centre the image on the page.
            let margin_pt = Mm(margin_mm).into_pt().0;
            Placement {
                page_width_mm: page_w_mm,
                page_height_mm: page_h_mm,
                offset_x_pt: margin_pt + (usable_w_pt - img_w_pt * scale) / 2.0,
                offset_y_pt: margin_pt + (usable_h_pt - img_h_pt * scale) / 2.0,
                scale,
                dpi: PAPER_IMAGE_DPI,
            }
        }
    }
}

/// File name an exported `document` is written under: its persisted name,
/// made filesystem-safe, with a `.pdf` extension.
fn pdf_file_name(document: &Document) -> String {
    format!("{}.pdf", sanitize_file_name(document.persisted_name()))
}

/// Make a document name safe to use as a file name on common filesystems.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}
