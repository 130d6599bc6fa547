use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order, so
/// iterating the cells walks row `y = 0` left to right, then row `y = 1`, and
/// so on. Used for rendered boards and for observation planes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator is called once per cell, in row-major order, with that
    /// cell's position.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(Position { x, y }));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn position_to_index(&self, position: Position) -> Option<usize> {
        if self.is_valid(position) {
            Some(position.y * self.width + position.x)
        } else {
            None
        }
    }

    /// Checks if the position is within the grid boundaries on both axes.
    #[inline]
    pub fn is_valid(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Returns an iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() panics on zero
        self.cells.chunks(self.width.max(1))
    }

    /// Returns a slice containing all cells in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Converts the grid into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Position) -> &Self::Output {
        match self.position_to_index(index) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                index, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, index: Position) -> &mut Self::Output {
        let width = self.width;
        let height = self.height;
        match self.position_to_index(index) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                index, width, height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_generator_is_row_major() {
        let grid = Grid::from_generator(3, 2, |p| p.y * 10 + p.x);
        assert_eq!(grid.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.to_rows(), vec![vec![0, 1, 2], vec![10, 11, 12]]);
        assert_eq!(grid[Position::new(2, 1)], 12);
    }

    #[test]
    fn test_is_valid_requires_both_axes() {
        let grid: Grid<u8> = Grid::new(3, 2);
        assert!(grid.is_valid(Position::new(2, 1)));
        // In range on one axis only.
        assert!(!grid.is_valid(Position::new(3, 0)));
        assert!(!grid.is_valid(Position::new(0, 2)));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds_panics() {
        let grid: Grid<u8> = Grid::new(2, 2);
        let _cell: u8 = grid[Position::new(2, 0)];
    }
}
