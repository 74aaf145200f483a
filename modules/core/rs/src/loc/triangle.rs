use std::fmt::Display;
use std::ops::Range;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// One of the two halves of a contact matrix relative to its main diagonal.
/// The main diagonal itself belongs to both halves.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Triangle {
    /// Cells (i, j) with i >= j. Stripes grow downwards from the diagonal.
    Lower,
    /// Cells (i, j) with i <= j. Stripes grow upwards from the diagonal.
    Upper,
}

impl Triangle {
    /// Short tag used in logs and result files.
    pub fn tag(&self) -> &'static str {
        match self {
            Triangle::Lower => "LT",
            Triangle::Upper => "UT",
        }
    }

    /// Distance from the main diagonal if the cell (row, col) belongs to this half.
    #[inline(always)]
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        match self {
            Triangle::Lower => row.checked_sub(col),
            Triangle::Upper => col.checked_sub(row),
        }
    }

    /// Row of the cell located `offset` bins away from the diagonal in the given column.
    /// Returns None if the row falls outside of [0, nrows).
    #[inline(always)]
    pub fn row(&self, col: usize, offset: usize, nrows: usize) -> Option<usize> {
        match self {
            Triangle::Lower => col.checked_add(offset).filter(|row| *row < nrows),
            Triangle::Upper => col.checked_sub(offset).filter(|row| *row < nrows),
        }
    }

    /// Rows of the cells located [0, height) bins away from the diagonal in the given column.
    /// Rows above the matrix are dropped, rows below it are not (the caller knows the shape).
    pub fn band(&self, col: usize, height: usize) -> Range<usize> {
        match self {
            Triangle::Lower => col..col + height,
            Triangle::Upper => (col + 1).saturating_sub(height)..col + 1,
        }
    }
}

impl Display for Triangle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_display() {
        assert_eq!(format!("{}", Triangle::Lower), "LT");
        assert_eq!(format!("{}", Triangle::Upper), "UT");
    }

    #[test]
    fn test_triangle_geometry() {
        assert_eq!(Triangle::Lower.offset(5, 2), Some(3));
        assert_eq!(Triangle::Lower.offset(2, 5), None);
        assert_eq!(Triangle::Upper.offset(2, 5), Some(3));
        assert_eq!(Triangle::Upper.offset(4, 4), Some(0));
        assert_eq!(Triangle::Lower.offset(4, 4), Some(0));

        assert_eq!(Triangle::Lower.row(2, 3, 10), Some(5));
        assert_eq!(Triangle::Lower.row(8, 3, 10), None);
        assert_eq!(Triangle::Upper.row(5, 3, 10), Some(2));
        assert_eq!(Triangle::Upper.row(2, 3, 10), None);
    }

    #[test]
    fn test_triangle_band() {
        for (triangle, col, height, expected) in [
            (Triangle::Lower, 4, 3, 4..7),
            (Triangle::Lower, 4, 1, 4..5),
            (Triangle::Upper, 4, 3, 2..5),
            (Triangle::Upper, 1, 5, 0..2),
        ] {
            let band = triangle.band(col, height);
            assert_eq!(band, expected, "{triangle} {col} {height}");
            // Same cells as walking the offsets one by one
            let rows = (0..height)
                .filter_map(|offset| triangle.row(col, offset, 100))
                .collect::<Vec<_>>();
            assert!(rows.iter().all(|row| band.contains(row)));
            assert_eq!(rows.len(), band.len());
        }
    }
}
