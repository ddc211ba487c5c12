// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — build one PDF page per image using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: images are registered on the
// document as XObjects, pages are `PdfPage` structs holding `Vec<Op>`
// operation lists, and the whole document is serialised via
// `PdfDocument::save()`.

use std::sync::Arc;

use pagestack_core::error::{PagestackError, Result};
use pagestack_core::{AssetId, LayoutPolicy, PixelSize};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, XObjectTransform};
use tracing::{debug, info, instrument, warn};

use crate::image::RasterImage;
use crate::layout::{PageLayout, compute_layout};

/// An asset whose dimensions are known, ready to become a page.
#[derive(Clone)]
pub struct ResolvedAsset {
    pub id: AssetId,
    pub display_name: String,
    pub bytes: Arc<[u8]>,
    pub size: PixelSize,
}

/// What ended up on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSummary {
    pub asset: AssetId,
    pub layout: PageLayout,
}

/// Builds documents with one image per page, in the order given.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new("Merged Images")
    }
}

impl DocumentAssembler {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Lay out and place every asset, strictly in order.
    ///
    /// The first asset creates the document; each asset gets exactly one
    /// page. If any image fails to decode the partially built document is
    /// dropped and the error names the asset.
    #[instrument(skip_all, fields(assets = assets.len(), mode = ?policy.mode))]
    pub fn build(&self, assets: &[ResolvedAsset], policy: &LayoutPolicy) -> Result<AssembledDocument> {
        if assets.is_empty() {
            return Err(PagestackError::EmptyInput);
        }

        info!(title = %self.title, "Assembling document");

        let mut doc: Option<PdfDocument> = None;
        let mut pages: Vec<PdfPage> = Vec::with_capacity(assets.len());
        let mut summaries: Vec<PageSummary> = Vec::with_capacity(assets.len());

        for (index, asset) in assets.iter().enumerate() {
            let layout = compute_layout(asset.size, policy);

            let raster = RasterImage::from_bytes(&asset.bytes)
                .map_err(|err| err.for_asset(&asset.display_name))?;
            let decoded = raster.size();
            if decoded != asset.size {
                warn!(
                    asset = %asset.display_name,
                    resolved = %asset.size,
                    %decoded,
                    "Decoded size differs from resolved size"
                );
            }

            let doc = doc.get_or_insert_with(|| PdfDocument::new(&self.title));
            let xobject_id = doc.add_image(&raster.into_raw_image());

            let (page_w_mm, page_h_mm) = layout.page_size_mm();
            let placement = layout.placement_pt();

            // At 72 dpi one pixel is one point, so the scale maps pixels
            // straight onto the placement rectangle.
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(placement.x)),
                    translate_y: Some(Pt(placement.y)),
                    scale_x: Some(placement.width / decoded.width as f32),
                    scale_y: Some(placement.height / decoded.height as f32),
                    dpi: Some(72.0),
                    rotate: None,
                },
            }];

            pages.push(PdfPage::new(Mm(page_w_mm), Mm(page_h_mm), ops));
            summaries.push(PageSummary {
                asset: asset.id,
                layout,
            });

            debug!(
                page = index + 1,
                asset = %asset.display_name,
                page_w_mm,
                page_h_mm,
                orientation = ?layout.orientation,
                "Page added"
            );
        }

        let doc = doc.ok_or(PagestackError::EmptyInput)?;
        Ok(AssembledDocument {
            doc,
            pages,
            summaries,
        })
    }
}

/// A fully assembled document that has not been serialised yet.
pub struct AssembledDocument {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    summaries: Vec<PageSummary>,
}

impl AssembledDocument {
    pub fn page_count(&self) -> usize {
        self.summaries.len()
    }

    /// Per-page layout, in page order.
    pub fn pages(&self) -> &[PageSummary] {
        &self.summaries
    }

    /// Serialise to PDF bytes. Consumes the document.
    #[instrument(skip_all, fields(pages = self.summaries.len()))]
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        let Self { mut doc, pages, .. } = self;
        doc.with_pages(pages);

        // Images are embedded at their full pixel size, never resampled.
        let options = PdfSaveOptions {
            image_optimization: None,
            ..PdfSaveOptions::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&options, &mut warnings);

        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "PDF serialised with warnings");
            for warning in &warnings {
                debug!(msg = %warning.msg, "PDF warning");
            }
        }
        if output.is_empty() {
            return Err(PagestackError::Serialization(
                "encoder produced no output".into(),
            ));
        }

        info!(bytes = output.len(), "Document serialised");
        Ok(output)
    }
}
