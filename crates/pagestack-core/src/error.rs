// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagestack.

use thiserror::Error;

/// Top-level error type for all Pagestack operations.
#[derive(Debug, Error)]
pub enum PagestackError {
    // -- Ingestion --
    #[error("unsupported image type: {0}")]
    Validation(String),

    // -- Decoding --
    #[error("could not read image \"{asset}\": {reason}")]
    Decode { asset: String, reason: String },

    /// Decode failure reported by a component that does not know which asset
    /// it was working on. Callers wrap it into `Decode`.
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Conversion --
    #[error("no images to convert")]
    EmptyInput,

    #[error("a conversion is already running for this collection")]
    ConversionInProgress,

    #[error("PDF encoding failed: {0}")]
    Serialization(String),

    // -- Configuration --
    #[error("invalid layout policy: {0}")]
    InvalidPolicy(String),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PagestackError {
    /// Attach an asset name to an asset-less decode failure.
    ///
    /// Every other variant is returned unchanged.
    pub fn for_asset(self, asset: &str) -> Self {
        match self {
            Self::ImageError(reason) => Self::Decode {
                asset: asset.to_string(),
                reason,
            },
            other => other,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagestackError>;
