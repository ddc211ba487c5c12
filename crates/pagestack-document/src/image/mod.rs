// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding encoded images into raster data ready for a PDF page.

pub mod raster;

pub use raster::RasterImage;
