//! Spreadsheet layout geometry.
//!
//! Drawing anchors in `.xlsx` files use zero-based column/row markers, while
//! cell addresses are one-based. `GridRegion` and `SizeBand` describe drawing
//! geometry (zero-based); `HeaderCell` addresses a cell (one-based).

use serde::{Deserialize, Serialize};

/// Rectangular area of the drawing grid, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRegion {
    /// First column (zero-based).
    pub from_col: u32,
    /// First row (zero-based).
    pub from_row: u32,
    /// Last column (zero-based).
    pub to_col: u32,
    /// Last row (zero-based).
    pub to_row: u32,
}

impl GridRegion {
    /// Creates a region from its corner markers.
    #[must_use]
    pub const fn new(from_col: u32, from_row: u32, to_col: u32, to_row: u32) -> Self {
        Self {
            from_col,
            from_row,
            to_col,
            to_row,
        }
    }

    /// Returns true if the marker lies inside the region.
    #[must_use]
    pub fn contains(&self, col: u32, row: u32) -> bool {
        (self.from_col..=self.to_col).contains(&col) && (self.from_row..=self.to_row).contains(&row)
    }
}

/// Range of bounding-box spans, measured in grid columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBand {
    /// Minimum column span (inclusive).
    pub min_cols: u32,
    /// Maximum column span (inclusive).
    pub max_cols: u32,
    /// Minimum row span (inclusive).
    pub min_rows: u32,
    /// Maximum row span (inclusive).
    pub max_rows: u32,
}

impl SizeBand {
    /// Creates a size band.
    #[must_use]
    pub const fn new(min_cols: u32, max_cols: u32, min_rows: u32, max_rows: u32) -> Self {
        Self {
            min_cols,
            max_cols,
            min_rows,
            max_rows,
        }
    }

    /// Returns true if a bounding box of the given span falls in this band.
    #[must_use]
    pub fn matches(&self, col_span: u32, row_span: u32) -> bool {
        (self.min_cols..=self.max_cols).contains(&col_span)
            && (self.min_rows..=self.max_rows).contains(&row_span)
    }
}

/// A header cell filled from a scalar placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    /// Column (one-based).
    pub column: u32,
    /// Row (one-based).
    pub row: u32,
    /// Placeholder name resolved against the scalar context.
    pub placeholder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_contains_is_inclusive() {
        let region = GridRegion::new(2, 3, 4, 6);
        assert!(region.contains(2, 3));
        assert!(region.contains(4, 6));
        assert!(region.contains(3, 5));
        assert!(!region.contains(1, 3));
        assert!(!region.contains(5, 6));
        assert!(!region.contains(3, 7));
    }

    #[test]
    fn test_size_band_matches() {
        let band = SizeBand::new(1, 2, 3, 5);
        assert!(band.matches(1, 3));
        assert!(band.matches(2, 5));
        assert!(!band.matches(0, 4));
        assert!(!band.matches(2, 6));
    }
}
