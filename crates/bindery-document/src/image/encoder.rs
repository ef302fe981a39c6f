// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JPEG page encoder: decodes a picked image, downscales oversized ones, and
// re-encodes them as JPEG page content using the `image` crate.

use ::image::imageops::FilterType;
use ::image::DynamicImage;
use bindery_core::error::{BinderyError, Result};
use bindery_core::{AppConfig, PageEncoder, Quality};
use tracing::{debug, instrument};

/// Encodes raw images (JPEG, PNG, TIFF, ...) into JPEG page bytes.
///
/// Output is deterministic for identical input, quality, and size limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegPageEncoder {
    /// Longest allowed edge in pixels; larger images are downscaled.
    max_dimension: Option<u32>,
}

impl JpegPageEncoder {
    pub fn new(max_dimension: Option<u32>) -> Self {
        Self { max_dimension }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_page_dimension)
    }

    /// Shrink `image` to fit within `max_dimension` on both edges, preserving
    /// aspect ratio with Lanczos3 filtering. Images already within bounds
    /// are returned untouched.
    fn fit(&self, image: DynamicImage) -> DynamicImage {
        let Some(max) = self.max_dimension else {
            return image;
        };
        if max == 0 || (image.width() <= max && image.height() <= max) {
            return image;
        }

        let resized = image.resize(max, max, FilterType::Lanczos3);
        debug!(
            from_w = image.width(),
            from_h = image.height(),
            new_w = resized.width(),
            new_h = resized.height(),
            "Downscaled page image"
        );
        resized
    }
}

impl PageEncoder for JpegPageEncoder {
    #[instrument(skip(self, raw_image), fields(raw_len = raw_image.len(), quality = quality.value()))]
    fn encode(&self, raw_image: &[u8], quality: Quality) -> Result<Vec<u8>> {
        let decoded = ::image::load_from_memory(raw_image).map_err(|err| {
            BinderyError::ImageError(format!("failed to decode image: {}", err))
        })?;

        let fitted = self.fit(decoded);
        let rgb = fitted.to_rgb8();

        let mut buffer = Vec::new();
        let encoder = ::image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut buffer,
            quality.jpeg_quality(),
        );
        rgb.write_with_encoder(encoder).map_err(|err| {
            BinderyError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;

        debug!(
            width = rgb.width(),
            height = rgb.height(),
            encoded_len = buffer.len(),
            "Page image encoded"
        );
        Ok(buffer)
    }
}
