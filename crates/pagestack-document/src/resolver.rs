// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dimension resolution — read an image's pixel width and height from its
// encoded bytes without decoding the pixel data.
//
// Resolution is synchronous and CPU-bound; async callers run it on a blocking
// pool. It knows nothing about where the image sits in a collection.

use std::io::Cursor;

use ::image::{ImageFormat, ImageReader};
use pagestack_core::PixelSize;
use pagestack_core::error::{PagestackError, Result};
use tracing::{debug, instrument};

/// Produces the pixel dimensions of an encoded image.
pub trait DimensionResolver: Send + Sync {
    /// Decode just enough of `bytes` to learn the image's dimensions.
    fn resolve(&self, bytes: &[u8]) -> Result<PixelSize>;
}

/// Header-only resolver backed by the `image` crate.
///
/// The format is sniffed from the content rather than trusted from the
/// declared MIME type, so a mislabelled GIF fails here instead of later in
/// the PDF writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDimensionResolver;

impl DimensionResolver for ImageDimensionResolver {
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn resolve(&self, bytes: &[u8]) -> Result<PixelSize> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| PagestackError::ImageError(format!("failed to read image: {err}")))?;

        match reader.format() {
            Some(ImageFormat::Png | ImageFormat::Jpeg) => {}
            Some(other) => {
                return Err(PagestackError::ImageError(format!(
                    "unsupported image format {other:?}"
                )));
            }
            None => {
                return Err(PagestackError::ImageError(
                    "unrecognised image data".into(),
                ));
            }
        }

        let (width, height) = reader.into_dimensions().map_err(|err| {
            PagestackError::ImageError(format!("failed to read image header: {err}"))
        })?;

        if width == 0 || height == 0 {
            return Err(PagestackError::ImageError(format!(
                "image has no pixels ({width}x{height})"
            )));
        }

        debug!(width, height, "Dimensions resolved");
        Ok(PixelSize::new(width, height))
    }
}
