// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{PaperSize, Quality};

/// How exported PDF pages are sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageSizing {
    /// Each page takes the dimensions of its image rendered at `dpi`.
    MatchImage { dpi: f32 },
    /// Every page uses `paper_size`; images are centred inside the margins
    /// and scaled down to fit (never up).
    Paper { paper_size: PaperSize, margin_mm: f32 },
}

impl Default for PageSizing {
    fn default() -> Self {
        Self::MatchImage { dpi: 150.0 }
    }
}

/// What the exporter does with a page whose content cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPolicy {
    /// Abort the whole export on the first bad page.
    #[default]
    Strict,
    /// Skip bad pages; fail only when no page renders.
    Lenient,
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Compression hint applied when images are encoded into pages.
    pub jpeg_quality: Quality,
    /// Images larger than this (in either dimension, pixels) are downscaled
    /// before encoding. `None` keeps the original size.
    pub max_page_dimension: Option<u32>,
    /// Page geometry for PDF export.
    pub page_sizing: PageSizing,
    /// Handling of undecodable pages during export.
    pub export_policy: ExportPolicy,
    /// Where exported PDFs are written. Defaults to `<data dir>/exports`.
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::DEFAULT,
            // A4 at 300 dpi on the long edge.
            max_page_dimension: Some(3508),
            page_sizing: PageSizing::default(),
            export_policy: ExportPolicy::Strict,
            export_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "export_policy": "Lenient" }"#).expect("parse");
        assert_eq!(config.export_policy, ExportPolicy::Lenient);
        assert_eq!(config.jpeg_quality, Quality::DEFAULT);
        assert_eq!(config.page_sizing, PageSizing::default());
    }

    #[test]
    fn round_trips_through_json() {
        let config = AppConfig {
            jpeg_quality: Quality::new(0.4),
            max_page_dimension: None,
            page_sizing: PageSizing::Paper {
                paper_size: PaperSize::Letter,
                margin_mm: 12.0,
            },
            export_policy: ExportPolicy::Lenient,
            export_dir: Some(PathBuf::from("/tmp/out")),
        };
        let json = serde_json::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, config);
    }
}
