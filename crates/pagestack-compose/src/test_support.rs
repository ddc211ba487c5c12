// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the store and converter tests.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use pagestack_core::error::Result;
use pagestack_core::{IncomingImage, PixelSize};
use pagestack_document::{DimensionResolver, ImageDimensionResolver};

/// Encode a blank image of the given size.
pub(crate) fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encoding test image");
    buffer
}

pub(crate) fn png(name: &str, width: u32, height: u32) -> IncomingImage {
    IncomingImage::new(name, "image/png", image_bytes(width, height, ImageFormat::Png))
}

pub(crate) fn jpeg(name: &str, width: u32, height: u32) -> IncomingImage {
    IncomingImage::new(name, "image/jpeg", image_bytes(width, height, ImageFormat::Jpeg))
}

/// Bytes that claim to be a PNG but are not.
pub(crate) fn broken_png(name: &str) -> IncomingImage {
    IncomingImage::new(name, "image/png", b"\x89PNG\r\n\x1a\nnot really".to_vec())
}

/// Header resolver that sleeps first and counts how often it runs.
pub(crate) struct SlowResolver {
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowResolver {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DimensionResolver for SlowResolver {
    fn resolve(&self, bytes: &[u8]) -> Result<PixelSize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        ImageDimensionResolver.resolve(bytes)
    }
}
