// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster preparation — decode an encoded image into 8-bit RGB pixels that
// `printpdf` can embed. Transparent pixels are composited onto white so a
// transparent PNG prints the way it looks on screen rather than on black.

use ::image::{DynamicImage, Rgb, RgbImage};
use pagestack_core::PixelSize;
use pagestack_core::error::{PagestackError, Result};
use printpdf::{RawImage, RawImageData, RawImageFormat};
use tracing::{debug, instrument};

/// Decoded RGB pixel data for one image.
pub struct RasterImage {
    image: RgbImage,
}

impl RasterImage {
    /// Decode raw encoded bytes (PNG or JPEG).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = ::image::load_from_memory(data).map_err(|err| {
            PagestackError::ImageError(format!("failed to decode image: {err}"))
        })?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            has_alpha = decoded.color().has_alpha(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(decoded))
    }

    /// Wrap an already-decoded `DynamicImage`, flattening any alpha channel.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let image = if image.color().has_alpha() {
            flatten_onto_white(&image)
        } else {
            image.to_rgb8()
        };
        Self { image }
    }

    /// Pixel dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.image.width(), self.image.height())
    }

    /// Colour of one pixel, for inspection.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Convert into the raw image structure `printpdf` embeds as an XObject.
    pub fn into_raw_image(self) -> RawImage {
        let width = self.image.width() as usize;
        let height = self.image.height() as usize;
        RawImage {
            pixels: RawImageData::U8(self.image.into_raw()),
            width,
            height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        }
    }
}

/// Alpha-composite every pixel over an opaque white background.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let ::image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
