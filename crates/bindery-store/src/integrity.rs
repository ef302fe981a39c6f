// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page checksums. Each stored page row carries the SHA-256 of its content,
// checked again when the page is read back.

use bindery_core::error::BinderyError;
use sha2::{Digest, Sha256};

/// SHA-256 of `content` as lowercase hex, the form kept in `pages.content_hash`.
pub fn page_checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Check page content against the checksum it was stored with.
/// A mismatch carries both digests in `IntegrityMismatch`.
pub fn verify_page_checksum(content: &[u8], stored: &str) -> Result<(), BinderyError> {
    let actual = page_checksum(content);
    if actual != stored {
        return Err(BinderyError::IntegrityMismatch {
            expected: stored.to_owned(),
            actual,
        });
    }
    Ok(())
}
