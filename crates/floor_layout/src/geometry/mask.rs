//! Boolean raster masks over the floor-plan pixel grid.
//!
//! A [`GridMask`] marks each pixel as set (walkable / placeable) or unset (obstacle /
//! forbidden). Masks are row-major with the origin at pixel `(0, 0)` and are treated as
//! immutable once handed to [`crate::geometry::GeometryIndex`].
use crate::error::{Error, Result};

/// Row-major boolean grid with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl GridMask {
    /// Create a mask from row-major cell values.
    pub fn new(width: usize, height: usize, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != width * height {
            return Err(Error::InvalidConfig(format!(
                "mask data has {} cells, expected {width}x{height}",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a mask with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    /// Create a mask by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Dimensions as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell value, or `false` outside the grid.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return false;
        }
        self.cells[(y as usize) * self.width + x as usize]
    }

    /// Number of set cells.
    pub fn count_set(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Errors with [`Error::ShapeMismatch`] unless `other` has the same dimensions.
    pub fn ensure_same_shape(&self, other: &GridMask) -> Result<()> {
        if self.size() != other.size() {
            return Err(Error::ShapeMismatch {
                expected: self.size(),
                found: other.size(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_wrong_cell_count() {
        let err = GridMask::new(2, 2, vec![true; 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn get_is_false_outside_bounds() {
        let mask = GridMask::filled(3, 2, true);
        assert!(mask.get(0, 0));
        assert!(mask.get(2, 1));
        assert!(!mask.get(-1, 0));
        assert!(!mask.get(3, 0));
        assert!(!mask.get(0, 2));
    }

    #[test]
    fn from_fn_is_row_major() {
        let mask = GridMask::from_fn(3, 2, |x, y| x == 2 && y == 0);
        assert_eq!(mask.as_slice(), &[false, false, true, false, false, false]);
        assert_eq!(mask.count_set(), 1);
    }

    #[test]
    fn shape_check_reports_both_sizes() {
        let a = GridMask::filled(4, 2, true);
        let b = GridMask::filled(2, 4, true);
        match a.ensure_same_shape(&b) {
            Err(Error::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, (4, 2));
                assert_eq!(found, (2, 4));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
