// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Pagestack: asset identity, image kinds, pixel and
// paper geometry.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Unique identifier for an image asset.
///
/// Assigned once at insertion and never derived from the asset's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported input image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Canonical MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Parse a declared MIME type. Parameters (`; charset=...`) and case are
    /// ignored; the non-standard `image/jpg` is accepted as JPEG.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Infer the kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape when strictly wider than tall; squares are portrait.
    pub fn from_dimensions(width: f32, height: f32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

/// Decoded pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_dimensions(self.width as f32, self.height as f32)
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Unit a page layout is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageUnit {
    /// PDF points, 1/72 inch.
    Pt,
    /// Millimetres.
    Mm,
}

impl PageUnit {
    /// Convert a length in this unit to PDF points.
    pub fn to_points(&self, value: f32) -> f32 {
        match self {
            Self::Pt => value,
            Self::Mm => value * 72.0 / 25.4,
        }
    }

    /// Convert a length in this unit to millimetres.
    pub fn to_millimetres(&self, value: f32) -> f32 {
        match self {
            Self::Pt => value * 25.4 / 72.0,
            Self::Mm => value,
        }
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
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in millimetres for the requested orientation. Landscape
    /// puts the longer edge horizontally.
    pub fn oriented_mm(&self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        let (short, long) = (w.min(h) as f32, w.max(h) as f32);
        match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// A file handed to the store for ingestion, before validation.
#[derive(Debug, Clone)]
pub struct IncomingImage {
    /// Original filename, for diagnostics.
    pub display_name: String,
    /// Declared MIME type (e.g. from the browser or file extension).
    pub mime_type: String,
    /// Raw encoded bytes.
    pub bytes: Vec<u8>,
}

impl IncomingImage {
    pub fn new(
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// One ingested image plus its metadata.
#[derive(Clone)]
pub struct ImageAsset {
    pub id: AssetId,
    pub kind: ImageKind,
    /// Encoded image data, shared between snapshots without copying.
    pub bytes: Arc<[u8]>,
    pub display_name: String,
    /// SHA-256 of the encoded bytes, hex encoded.
    pub content_hash: String,
    pub added_at: DateTime<Utc>,
    /// Pixel dimensions, `None` until resolved.
    pub dimensions: Option<PixelSize>,
}

impl ImageAsset {
    /// Build a fresh, unresolved asset with a new id.
    pub fn new(display_name: impl Into<String>, kind: ImageKind, bytes: Vec<u8>) -> Self {
        let content_hash = hex::encode(Sha256::digest(&bytes));
        Self {
            id: AssetId::new(),
            kind,
            bytes: Arc::from(bytes),
            display_name: display_name.into(),
            content_hash,
            added_at: Utc::now(),
            dimensions: None,
        }
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("bytes_len", &self.bytes.len())
            .field("display_name", &self.display_name)
            .field("content_hash", &self.content_hash)
            .field("added_at", &self.added_at)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_parsing_accepts_jpg_alias_and_parameters() {
        assert_eq!(ImageKind::from_mime_type("image/png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_mime_type("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime_type("image/jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime_type("IMAGE/PNG; q=1"), Some(ImageKind::Png));
    }

    #[test]
    fn mime_parsing_rejects_other_types() {
        assert_eq!(ImageKind::from_mime_type("image/gif"), None);
        assert_eq!(ImageKind::from_mime_type("application/pdf"), None);
        assert_eq!(ImageKind::from_mime_type(""), None);
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("webp"), None);
    }

    #[test]
    fn square_is_portrait() {
        assert_eq!(PixelSize::new(500, 500).orientation(), Orientation::Portrait);
        assert_eq!(PixelSize::new(501, 500).orientation(), Orientation::Landscape);
        assert_eq!(PixelSize::new(499, 500).orientation(), Orientation::Portrait);
    }

    #[test]
    fn landscape_paper_swaps_edges() {
        assert_eq!(PaperSize::A4.oriented_mm(Orientation::Portrait), (210.0, 297.0));
        assert_eq!(PaperSize::A4.oriented_mm(Orientation::Landscape), (297.0, 210.0));
    }

    #[test]
    fn fresh_assets_have_distinct_ids_and_stable_hash() {
        let a = ImageAsset::new("a.png", ImageKind::Png, vec![1, 2, 3]);
        let b = ImageAsset::new("b.png", ImageKind::Png, vec![1, 2, 3]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.content_hash.len(), 64);
        assert!(a.dimensions.is_none());
    }

    #[test]
    fn millimetres_convert_to_points() {
        assert!((PageUnit::Mm.to_points(25.4) - 72.0).abs() < 1e-4);
        assert_eq!(PageUnit::Pt.to_points(10.0), 10.0);
        assert!((PageUnit::Pt.to_millimetres(72.0) - 25.4).abs() < 1e-4);
    }
}
