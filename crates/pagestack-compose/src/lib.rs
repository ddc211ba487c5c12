// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagestack-compose — The ordered image collection and the conversion that
// turns it into a PDF.
//
// `AssetStore` owns page order and membership and resolves image dimensions
// in the background; `Converter` snapshots the store, waits for every
// dimension, and hands the ordered images to the document assembler.

pub mod converter;
pub mod store;

#[cfg(test)]
mod test_support;

pub use converter::{ConvertedDocument, Converter};
pub use store::{AssetStore, IngestReport};
