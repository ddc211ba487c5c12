// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their mapping onto `ComposerConfig`.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use pagestack_core::error::Result;
use pagestack_core::{ComposerConfig, ImageKind, LayoutMode, Orientation, PaperSize};

/// Merge PNG and JPEG images into one PDF, one image per page, in the order given.
#[derive(Debug, Parser)]
#[command(name = "pagestack", version, about)]
pub struct Args {
    /// Images to merge, in page order.
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Where to write the PDF. Defaults to the configured file name.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page layout mode.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Paper size for contain mode.
    #[arg(long, value_enum)]
    pub paper: Option<PaperArg>,

    /// Use landscape paper in contain mode.
    #[arg(long, conflicts_with = "portrait")]
    pub landscape: bool,

    /// Use portrait paper in contain mode.
    #[arg(long)]
    pub portrait: bool,

    /// Margin in millimetres for contain mode.
    #[arg(long)]
    pub margin: Option<f32>,

    /// Assumed resolution of the source images.
    #[arg(long)]
    pub source_dpi: Option<f32>,

    /// Output units per inch for exact mode (72 = PDF points).
    #[arg(long)]
    pub output_dpi: Option<f32>,

    /// Title stored in the PDF metadata.
    #[arg(long)]
    pub title: Option<String>,

    /// JSON settings file used as the base for every option above.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Each page is exactly the size of its image.
    Exact,
    /// Fixed paper, image scaled down and centred within the margins.
    Contain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaperArg {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Exact => Self::ExactFit,
            ModeArg::Contain => Self::ContainFit,
        }
    }
}

impl From<PaperArg> for PaperSize {
    fn from(paper: PaperArg) -> Self {
        match paper {
            PaperArg::A4 => Self::A4,
            PaperArg::A3 => Self::A3,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl Args {
    /// Start from the config file (or defaults) and apply explicit flags.
    pub fn composer_config(&self) -> Result<ComposerConfig> {
        let mut config = match &self.config {
            Some(path) => ComposerConfig::load(path)?,
            None => ComposerConfig::default(),
        };

        let layout = &mut config.layout;
        if let Some(mode) = self.mode {
            layout.mode = mode.into();
        }
        if let Some(paper) = self.paper {
            layout.paper_size = paper.into();
        }
        if self.landscape {
            layout.orientation = Orientation::Landscape;
        } else if self.portrait {
            layout.orientation = Orientation::Portrait;
        }
        if let Some(margin) = self.margin {
            layout.margin_mm = margin;
        }
        if let Some(dpi) = self.source_dpi {
            layout.source_dpi = dpi;
        }
        if let Some(dpi) = self.output_dpi {
            layout.output_dpi = dpi;
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }

        config.layout.validate()?;
        Ok(config)
    }
}

/// MIME type declared for a file, inferred from its extension.
pub fn mime_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageKind::from_extension)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream")
}
