use crate::error::{MarginalError, Result};

/// Row-major arrangement of marginal panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub panels: usize,
    pub nrows: usize,
    pub ncols: usize,
}

impl GridLayout {
    /// As many rows as needed for `panels` at up to `ncols` per row.
    pub fn new(panels: usize, ncols: usize) -> Result<Self> {
        if panels == 0 {
            return Err(MarginalError::EmptyGrid);
        }
        if ncols == 0 {
            return Err(MarginalError::ZeroColumns);
        }
        let ncols = ncols.min(panels);
        Ok(Self {
            panels,
            nrows: panels.div_ceil(ncols),
            ncols,
        })
    }

    /// Fixed shape; fails if the grid has fewer cells than panels.
    pub fn with_shape(panels: usize, nrows: usize, ncols: usize) -> Result<Self> {
        if panels == 0 {
            return Err(MarginalError::EmptyGrid);
        }
        if ncols == 0 {
            return Err(MarginalError::ZeroColumns);
        }
        let layout = Self { panels, nrows, ncols };
        let capacity = layout.capacity();
        if capacity < panels {
            return Err(MarginalError::GridTooSmall { panels, capacity });
        }
        Ok(layout)
    }

    pub fn capacity(&self) -> usize {
        self.nrows * self.ncols
    }

    /// Panel indices of each row; the last row may be short.
    pub fn rows(&self) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
        (0..self.nrows)
            .map(|r| (r * self.ncols)..((r + 1) * self.ncols).min(self.panels))
            .filter(|range| !range.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_round_up() {
        let g = GridLayout::new(7, 3).unwrap();
        assert_eq!((g.nrows, g.ncols), (3, 3));
        assert_eq!(g.capacity(), 9);
        let rows: Vec<_> = g.rows().collect();
        assert_eq!(rows, vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn test_columns_capped_by_panels() {
        let g = GridLayout::new(2, 5).unwrap();
        assert_eq!((g.nrows, g.ncols), (1, 2));
    }

    #[test]
    fn test_invalid_grids() {
        assert!(matches!(GridLayout::new(0, 3), Err(MarginalError::EmptyGrid)));
        assert!(matches!(GridLayout::new(3, 0), Err(MarginalError::ZeroColumns)));
        assert!(matches!(
            GridLayout::with_shape(7, 2, 3),
            Err(MarginalError::GridTooSmall { panels: 7, capacity: 6 })
        ));
    }

    #[test]
    fn test_explicit_shape_with_spare_cells() {
        let g = GridLayout::with_shape(4, 2, 3).unwrap();
        let rows: Vec<_> = g.rows().collect();
        assert_eq!(rows, vec![0..3, 3..4]);
    }
}
