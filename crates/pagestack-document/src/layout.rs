// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout policy — pure geometry mapping an image's pixel dimensions and
// a `LayoutPolicy` to a page size, orientation, and placement rectangle.
//
// ExactFit pages are expressed in PDF points, ContainFit pages in millimetres
// (paper sizes are defined in millimetres). Placement offsets are measured
// from the lower-left corner of the page, matching PDF user space.

use pagestack_core::{LayoutMode, LayoutPolicy, Orientation, PageUnit, PixelSize};

/// Millimetres per inch.
const MM_PER_INCH: f32 = 25.4;

/// Rectangle an image occupies on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Computed geometry for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub unit: PageUnit,
    pub page_width: f32,
    pub page_height: f32,
    pub orientation: Orientation,
    pub placement: Placement,
}

impl PageLayout {
    /// Page size in PDF points.
    pub fn page_size_pt(&self) -> (f32, f32) {
        (
            self.unit.to_points(self.page_width),
            self.unit.to_points(self.page_height),
        )
    }

    /// Page size in millimetres.
    pub fn page_size_mm(&self) -> (f32, f32) {
        (
            self.unit.to_millimetres(self.page_width),
            self.unit.to_millimetres(self.page_height),
        )
    }

    /// Placement rectangle in PDF points.
    pub fn placement_pt(&self) -> Placement {
        Placement {
            x: self.unit.to_points(self.placement.x),
            y: self.unit.to_points(self.placement.y),
            width: self.unit.to_points(self.placement.width),
            height: self.unit.to_points(self.placement.height),
        }
    }
}

/// Compute the page layout for an image of `size` pixels.
///
/// The policy is assumed to have passed `LayoutPolicy::validate`.
pub fn compute_layout(size: PixelSize, policy: &LayoutPolicy) -> PageLayout {
    match policy.mode {
        LayoutMode::ExactFit => exact_fit(size, policy),
        LayoutMode::ContainFit => contain_fit(size, policy),
    }
}

fn exact_fit(size: PixelSize, policy: &LayoutPolicy) -> PageLayout {
    let factor = policy.output_dpi / policy.source_dpi;
    let page_width = size.width as f32 * factor;
    let page_height = size.height as f32 * factor;

    PageLayout {
        unit: PageUnit::Pt,
        page_width,
        page_height,
        orientation: Orientation::from_dimensions(page_width, page_height),
        placement: Placement {
            x: 0.0,
            y: 0.0,
            width: page_width,
            height: page_height,
        },
    }
}

fn contain_fit(size: PixelSize, policy: &LayoutPolicy) -> PageLayout {
    let (page_width, page_height) = policy.paper_size.oriented_mm(policy.orientation);
    let margin = policy.margin_mm;
    let box_width = page_width - 2.0 * margin;
    let box_height = page_height - 2.0 * margin;

    // Binding constraint is whichever axis leaves less room per pixel.
    let fit_scale = (box_width / size.width.max(1) as f32).min(box_height / size.height.max(1) as f32);
    // Never enlarge beyond the image's natural size at the source resolution.
    let natural_scale = MM_PER_INCH / policy.source_dpi;
    let scale = fit_scale.min(natural_scale);

    let placed_width = (size.width as f32 * scale).min(box_width);
    let placed_height = (size.height as f32 * scale).min(box_height);

    PageLayout {
        unit: PageUnit::Mm,
        page_width,
        page_height,
        orientation: policy.orientation,
        placement: Placement {
            x: (page_width - placed_width) / 2.0,
            y: (page_height - placed_height) / 2.0,
            width: placed_width,
            height: placed_height,
        },
    }
}
