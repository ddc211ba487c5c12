// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout policy and composer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PagestackError, Result};
use crate::{Orientation, PaperSize};

/// Suggested file name for the merged document.
pub const DEFAULT_FILE_NAME: &str = "merged-images.pdf";

/// How each image is turned into a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Page is sized exactly to the image; no margins.
    #[default]
    ExactFit,
    /// Fixed paper size; image scaled down to fit within margins and centred.
    ContainFit,
}

/// Parameters for the page layout computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPolicy {
    pub mode: LayoutMode,
    /// Output units per inch for ExactFit. 72 yields PDF points.
    pub output_dpi: f32,
    /// Assumed resolution of the source pixels.
    pub source_dpi: f32,
    /// Page size for ContainFit.
    pub paper_size: PaperSize,
    /// Page orientation for ContainFit. ExactFit derives it from the image.
    pub orientation: Orientation,
    /// Margin on every edge for ContainFit, in millimetres.
    pub margin_mm: f32,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            mode: LayoutMode::ExactFit,
            output_dpi: 72.0,
            source_dpi: 96.0,
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: 10.0,
        }
    }
}

impl LayoutPolicy {
    /// One page per image, sized to the image.
    pub fn exact_fit() -> Self {
        Self::default()
    }

    /// Fixed paper with the image contained within `margin_mm`.
    pub fn contain_fit(paper_size: PaperSize, orientation: Orientation, margin_mm: f32) -> Self {
        Self {
            mode: LayoutMode::ContainFit,
            paper_size,
            orientation,
            margin_mm,
            ..Self::default()
        }
    }

    /// Reject parameter combinations the layout math cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(self.output_dpi.is_finite() && self.output_dpi > 0.0) {
            return Err(PagestackError::InvalidPolicy(format!(
                "output DPI must be positive, got {}",
                self.output_dpi
            )));
        }
        if !(self.source_dpi.is_finite() && self.source_dpi > 0.0) {
            return Err(PagestackError::InvalidPolicy(format!(
                "source DPI must be positive, got {}",
                self.source_dpi
            )));
        }
        if self.mode == LayoutMode::ContainFit {
            if !(self.margin_mm.is_finite() && self.margin_mm >= 0.0) {
                return Err(PagestackError::InvalidPolicy(format!(
                    "margin must be zero or positive, got {}",
                    self.margin_mm
                )));
            }
            let (w, h) = self.paper_size.oriented_mm(self.orientation);
            if 2.0 * self.margin_mm >= w.min(h) {
                return Err(PagestackError::InvalidPolicy(format!(
                    "margin of {}mm leaves no printable area on a {}x{}mm page",
                    self.margin_mm, w, h
                )));
            }
        }
        Ok(())
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub layout: LayoutPolicy,
    /// Suggested file name returned with the document bytes.
    pub file_name: String,
    /// Title embedded in the PDF metadata.
    pub title: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            layout: LayoutPolicy::default(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            title: "Merged Images".to_string(),
        }
    }
}

impl ComposerConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}
