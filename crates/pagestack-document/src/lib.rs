// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagestack-document — Turning ordered images into PDF pages.
//
// Provides the page layout policy (exact-fit and contain-fit), image
// dimension resolution from encoded bytes, raster preparation for embedding,
// and the document assembler that writes one page per image with `printpdf`.

pub mod image;
pub mod layout;
pub mod pdf;
pub mod resolver;

// Re-export the primary items so callers can use `pagestack_document::DocumentAssembler` etc.
pub use layout::{PageLayout, Placement, compute_layout};
pub use pdf::assembler::{AssembledDocument, DocumentAssembler, PageSummary, ResolvedAsset};
pub use resolver::{DimensionResolver, ImageDimensionResolver};
