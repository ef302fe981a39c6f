// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: documents, pages, and the values that describe them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BinderyError, Result};

/// Name persisted for a document whose display name is blank.
pub const UNTITLED_DOCUMENT_NAME: &str = "Untitled Document";

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a page. Never reassigned once minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a document: opaque encoded image bytes plus its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id: PageId,
    content: Vec<u8>,
    position: u32,
}

impl Page {
    /// Reconstitute a page from stored parts. Positions are only checked once
    /// the page is placed inside a [`Document`].
    pub fn new(id: PageId, content: Vec<u8>, position: u32) -> Self {
        Self {
            id,
            content,
            position,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// Encoded image bytes. The core never decodes them.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

/// A named, timestamped, ordered collection of pages with a stable identity.
///
/// Pages are always held in `position` order and positions are always
/// `0..page_count`. The only ways to obtain a `Document` are the functions in
/// [`crate::assembly`] and the validating [`Document::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    name: String,
    created_at: DateTime<Utc>,
    pages: Vec<Page>,
}

impl Document {
    /// Rebuild a document from stored parts, e.g. rows loaded from a database.
    ///
    /// Pages may arrive in any order; they are sorted by position and the
    /// result must satisfy every document invariant, otherwise
    /// `BinderyError::InvalidDocument` is returned.
    pub fn from_parts(
        id: DocumentId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        mut pages: Vec<Page>,
    ) -> Result<Self> {
        pages.sort_by_key(Page::position);
        let document = Self {
            id,
            name: name.into(),
            created_at,
            pages,
        };
        document.validate()?;
        Ok(document)
    }

    /// Construct without validation. Callers inside the crate must hand over
    /// pages that already carry contiguous positions.
    pub(crate) fn from_renumbered(
        id: DocumentId,
        name: String,
        created_at: DateTime<Utc>,
        pages: Vec<Page>,
    ) -> Self {
        debug_assert!(
            pages
                .iter()
                .enumerate()
                .all(|(index, page)| page.position as usize == index)
        );
        Self {
            id,
            name,
            created_at,
            pages,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Pages in position order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Content of the first page, used for previews.
    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.pages.first().map(Page::content)
    }

    /// Whether the display name is blank (a valid transient state).
    pub fn is_unnamed(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// The name written to persistent storage: the display name, or
    /// [`UNTITLED_DOCUMENT_NAME`] when it is blank.
    pub fn persisted_name(&self) -> &str {
        if self.is_unnamed() {
            UNTITLED_DOCUMENT_NAME
        } else {
            &self.name
        }
    }

    /// Return this document with its name replaced by [`Self::persisted_name`].
    pub fn normalized(mut self) -> Self {
        if self.is_unnamed() {
            self.name = UNTITLED_DOCUMENT_NAME.to_string();
        }
        self
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            page_count: self.pages.len(),
        }
    }

    /// Check the document invariants: at least one page, positions exactly
    /// `0..page_count` in order, and no page id used twice.
    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(BinderyError::InvalidDocument(format!(
                "document {} has no pages",
                self.id
            )));
        }

        let mut seen = HashSet::with_capacity(self.pages.len());
        for (index, page) in self.pages.iter().enumerate() {
            if page.position as usize != index {
                return Err(BinderyError::InvalidDocument(format!(
                    "document {} has page at position {} where {} was expected",
                    self.id, page.position, index
                )));
            }
            if !seen.insert(page.id) {
                return Err(BinderyError::InvalidDocument(format!(
                    "document {} contains page {} twice",
                    self.id, page.id
                )));
            }
        }
        Ok(())
    }
}

/// Lightweight listing entry for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub page_count: usize,
}

/// Lossy compression hint on a 0.0–1.0 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub const DEFAULT: Quality = Quality(0.7);

    /// Clamp `value` into 0.0–1.0. NaN falls back to [`Quality::DEFAULT`].
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self::DEFAULT
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// JPEG encoder quality (1-100).
    pub fn jpeg_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(position: u32, content: &[u8]) -> Page {
        Page::new(PageId::new(), content.to_vec(), position)
    }

    #[test]
    fn from_parts_sorts_pages_by_position() {
        let document = Document::from_parts(
            DocumentId::new(),
            "Receipts",
            Utc::now(),
            vec![page(2, b"c"), page(0, b"a"), page(1, b"b")],
        )
        .expect("valid parts");

        let contents: Vec<&[u8]> = document.pages().iter().map(Page::content).collect();
        assert_eq!(contents, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
        assert_eq!(document.thumbnail(), Some(&b"a"[..]));
    }

    #[test]
    fn from_parts_rejects_gaps_and_duplicates() {
        let gap = Document::from_parts(
            DocumentId::new(),
            "gap",
            Utc::now(),
            vec![page(0, b"a"), page(2, b"b")],
        );
        assert!(matches!(gap, Err(BinderyError::InvalidDocument(_))));

        let duplicate = Document::from_parts(
            DocumentId::new(),
            "dup",
            Utc::now(),
            vec![page(0, b"a"), page(0, b"b")],
        );
        assert!(matches!(duplicate, Err(BinderyError::InvalidDocument(_))));
    }

    #[test]
    fn from_parts_rejects_repeated_page_id() {
        let id = PageId::new();
        let result = Document::from_parts(
            DocumentId::new(),
            "twice",
            Utc::now(),
            vec![Page::new(id, b"a".to_vec(), 0), Page::new(id, b"b".to_vec(), 1)],
        );
        assert!(matches!(result, Err(BinderyError::InvalidDocument(_))));
    }

    #[test]
    fn from_parts_rejects_empty_page_set() {
        let result = Document::from_parts(DocumentId::new(), "empty", Utc::now(), Vec::new());
        assert!(matches!(result, Err(BinderyError::InvalidDocument(_))));
    }

    #[test]
    fn blank_name_is_normalized() {
        let document =
            Document::from_parts(DocumentId::new(), "   ", Utc::now(), vec![page(0, b"a")])
                .expect("valid parts");
        assert!(document.is_unnamed());
        assert_eq!(document.persisted_name(), UNTITLED_DOCUMENT_NAME);

        let id = document.id();
        let normalized = document.normalized();
        assert_eq!(normalized.name(), UNTITLED_DOCUMENT_NAME);
        assert_eq!(normalized.id(), id);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(Quality::new(1.7).value(), 1.0);
        assert_eq!(Quality::new(-0.2).jpeg_quality(), 1);
        assert_eq!(Quality::new(f32::NAN), Quality::DEFAULT);
        assert_eq!(Quality::DEFAULT.jpeg_quality(), 70);
    }

    #[test]
    fn quality_deserializes_through_clamp() {
        let quality: Quality = serde_json::from_str("3.5").expect("parse");
        assert_eq!(quality.value(), 1.0);
        assert_eq!(serde_json::to_string(&Quality::new(0.5)).expect("ser"), "0.5");
    }
}
