// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly engine: build documents from images, delete and move pages,
// rename, and merge documents.
//
// Every function here is pure: it borrows its inputs and returns a new
// `Document` value. Inputs are never modified, and validation happens before
// any page is copied, so a failed call has no observable effect.

use chrono::{DateTime, Utc};

use crate::error::{BinderyError, Result};
use crate::gateway::PageEncoder;
use crate::types::{Document, DocumentId, Page, PageId, Quality};

/// Name given to a merged document when the caller leaves it blank.
pub const MERGED_DOCUMENT_NAME: &str = "Merged Document";

/// Generated name for a newly built document whose requested name is blank.
pub fn default_document_name(now: DateTime<Utc>) -> String {
    format!("Document {}", now.format("%Y-%m-%d %H:%M"))
}

/// Encode each image in order and assemble the results into a new document.
///
/// Fails with `EmptyInput` before touching the encoder when `images` is
/// empty. An encoder failure is returned as-is and no document is produced.
pub fn build<I, E>(images: I, name: &str, encoder: &E, quality: Quality) -> Result<Document>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
    E: PageEncoder + ?Sized,
{
    let images: Vec<I::Item> = images.into_iter().collect();
    if images.is_empty() {
        return Err(BinderyError::EmptyInput);
    }

    let contents = images
        .iter()
        .map(|image| encoder.encode(image.as_ref(), quality))
        .collect::<Result<Vec<_>>>()?;

    assemble(contents, name)
}

/// Assemble already-encoded page contents into a new document. Page `i` of
/// the result holds `contents[i]`.
pub fn assemble(contents: Vec<Vec<u8>>, name: &str) -> Result<Document> {
    if contents.is_empty() {
        return Err(BinderyError::EmptyInput);
    }

    let pages = contents
        .into_iter()
        .enumerate()
        .map(|(index, content)| Page::new(PageId::new(), content, index as u32))
        .collect();

    let now = Utc::now();
    let name = if name.trim().is_empty() {
        default_document_name(now)
    } else {
        name.to_string()
    };

    Ok(Document::from_renumbered(
        DocumentId::new(),
        name,
        now,
        pages,
    ))
}

/// Remove the page at `index` and renumber the rest.
///
/// The last page of a document can never be removed (`LastPageRejected`);
/// otherwise an index past the end is `InvalidIndex`. Identity, name, and
/// creation time carry over to the returned document.
pub fn delete_page(document: &Document, index: usize) -> Result<Document> {
    let page_count = document.page_count();
    if page_count <= 1 {
        return Err(BinderyError::LastPageRejected);
    }
    if index >= page_count {
        return Err(BinderyError::InvalidIndex { index, page_count });
    }

    let mut pages = document.pages().to_vec();
    pages.remove(index);
    renumber(&mut pages);

    Ok(rebuilt(document, document.name().to_string(), pages))
}

/// Move the page at `from` so that it ends up at index `to`, renumbering
/// every page. Page identities are unchanged.
pub fn move_page(document: &Document, from: usize, to: usize) -> Result<Document> {
    let page_count = document.page_count();
    for index in [from, to] {
        if index >= page_count {
            return Err(BinderyError::InvalidIndex { index, page_count });
        }
    }

    let mut pages = document.pages().to_vec();
    let page = pages.remove(from);
    pages.insert(to, page);
    renumber(&mut pages);

    Ok(rebuilt(document, document.name().to_string(), pages))
}

/// Return the document under a new display name. A blank name is allowed
/// here and normalized when the document is persisted.
pub fn rename(document: &Document, name: &str) -> Document {
    rebuilt(document, name.to_string(), document.pages().to_vec())
}

/// Merge `sources` into a brand-new document, in exactly the order given.
///
/// Pages are concatenated source by source, each source in position order.
/// Every page gets a freshly minted id and the positions run contiguously
/// across the whole result. Sources are left untouched.
pub fn merge(sources: &[Document], name: &str) -> Result<Document> {
    merge_ordered(sources.iter(), name)
}

/// Merge `sources` oldest first: sorted by creation time ascending, ties
/// broken by document id, then merged as in [`merge`].
pub fn merge_chronological(sources: &[Document], name: &str) -> Result<Document> {
    let mut ordered: Vec<&Document> = sources.iter().collect();
    ordered.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
    merge_ordered(ordered.into_iter(), name)
}

fn merge_ordered<'a>(
    sources: impl ExactSizeIterator<Item = &'a Document>,
    name: &str,
) -> Result<Document> {
    if sources.len() == 0 {
        return Err(BinderyError::EmptySources);
    }

    let pages: Vec<Page> = sources
        .flat_map(|source| source.pages())
        .enumerate()
        .map(|(index, page)| Page::new(PageId::new(), page.content().to_vec(), index as u32))
        .collect();

    let name = if name.trim().is_empty() {
        MERGED_DOCUMENT_NAME.to_string()
    } else {
        name.to_string()
    };

    Ok(Document::from_renumbered(
        DocumentId::new(),
        name,
        Utc::now(),
        pages,
    ))
}

fn renumber(pages: &mut [Page]) {
    for (index, page) in pages.iter_mut().enumerate() {
        page.set_position(index as u32);
    }
}

fn rebuilt(document: &Document, name: String, pages: Vec<Page>) -> Document {
    Document::from_renumbered(document.id(), name, document.created_at(), pages)
}
