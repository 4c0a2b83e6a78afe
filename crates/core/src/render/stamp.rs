//! Stamp image detection.
//!
//! Ledger templates embed the company stamp as an ordinary picture, with no
//! tag marking it as such. A picture is treated as a stamp when its anchor
//! lies in one of the configured regions, or when its bounding box spans one
//! of the configured size bands. The match is approximate: a logo that lands
//! in a stamp region is removed too.

use billflow_shared::config::ExcelLayoutConfig;
use billflow_shared::types::{GridRegion, SizeBand};

/// Two-cell anchor of a drawing, in zero-based grid markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingAnchor {
    /// Column of the top-left marker.
    pub from_col: u32,
    /// Row of the top-left marker.
    pub from_row: u32,
    /// Column of the bottom-right marker.
    pub to_col: u32,
    /// Row of the bottom-right marker.
    pub to_row: u32,
}

impl DrawingAnchor {
    /// Creates an anchor from its markers.
    #[must_use]
    pub const fn new(from_col: u32, from_row: u32, to_col: u32, to_row: u32) -> Self {
        Self {
            from_col,
            from_row,
            to_col,
            to_row,
        }
    }

    /// Columns spanned by the bounding box.
    #[must_use]
    pub fn col_span(&self) -> u32 {
        self.to_col.saturating_sub(self.from_col)
    }

    /// Rows spanned by the bounding box.
    #[must_use]
    pub fn row_span(&self) -> u32 {
        self.to_row.saturating_sub(self.from_row)
    }
}

/// Region and size-band classifier for stamp pictures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampHeuristic {
    regions: Vec<GridRegion>,
    bands: Vec<SizeBand>,
}

impl StampHeuristic {
    /// Creates a heuristic from explicit regions and bands.
    #[must_use]
    pub fn new(regions: Vec<GridRegion>, bands: Vec<SizeBand>) -> Self {
        Self { regions, bands }
    }

    /// Creates the heuristic configured for the ledger layout.
    #[must_use]
    pub fn from_layout(layout: &ExcelLayoutConfig) -> Self {
        Self::new(layout.stamp_regions.clone(), layout.stamp_size_bands.clone())
    }

    /// Returns true if the drawing looks like a stamp.
    #[must_use]
    pub fn is_stamp(&self, anchor: &DrawingAnchor) -> bool {
        let in_region = self
            .regions
            .iter()
            .any(|region| region.contains(anchor.from_col, anchor.from_row));
        let in_band = self
            .bands
            .iter()
            .any(|band| band.matches(anchor.col_span(), anchor.row_span()));
        in_region || in_band
    }
}
