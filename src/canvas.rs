// font-atlas/src/canvas.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! In-memory pixel grids for glyph rasterization and the distance transform.

use std::mem;

use crate::error::AtlasError;

/// Coverage value of a pixel inside a glyph.
pub const FOREGROUND: u8 = 0xff;

/// Coverage value of a pixel outside every glyph.
pub const BACKGROUND: u8 = 0x00;

/// A rectangular grid of values stored row by row in one flat buffer.
///
/// Cells are addressed by `(row, col)`. The checked accessors return `None` outside the grid;
/// the indexing operators panic like slice indexing does.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    cells: Vec<T>,
    width: usize,
    height: usize,
}

/// A bilevel coverage raster: every pixel is either `FOREGROUND` or `BACKGROUND`.
pub type Canvas = Grid<u8>;

impl<T> Grid<T>
where
    T: Clone,
{
    /// Creates a grid with every cell set to `fill`.
    ///
    /// Fails with `AtlasError::Allocation` instead of aborting when the buffer cannot be
    /// allocated; working grids for a large atlas run to hundreds of megabytes.
    pub fn try_new(width: usize, height: usize, fill: T) -> Result<Grid<T>, AtlasError> {
        let len = width.checked_mul(height).ok_or(AtlasError::Allocation { bytes: usize::MAX })?;
        let bytes = len.saturating_mul(mem::size_of::<T>());
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| AtlasError::Allocation { bytes })?;
        cells.resize(len, fill);
        Ok(Grid {
            cells,
            width,
            height,
        })
    }
}

impl<T> Grid<T> {
    /// Wraps an existing row-major buffer. Returns `None` if the length does not match.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Option<Grid<T>> {
        if width.checked_mul(height)? != cells.len() {
            return None;
        }
        Some(Grid {
            cells,
            width,
            height,
        })
    }

    /// The number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts `(row, col)` to an offset into the flat buffer, or `None` if out of bounds.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.height && col < self.width {
            Some(row * self.width + col)
        } else {
            None
        }
    }

    /// Returns a reference to a cell, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.index_of(row, col).map(|index| &self.cells[index])
    }

    /// Returns a mutable reference to a cell, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        match self.index_of(row, col) {
            Some(index) => Some(&mut self.cells[index]),
            None => None,
        }
    }

    /// Returns one row of the grid.
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Returns one row of the grid, mutably.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        &mut self.cells[row * self.width..(row + 1) * self.width]
    }

    /// The flat row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// The flat row-major buffer, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Consumes the grid and returns its flat row-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(col < self.width, "column {} out of bounds", col);
        &self.cells[row * self.width + col]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(col < self.width, "column {} out of bounds", col);
        &mut self.cells[row * self.width + col]
    }
}

impl Canvas {
    /// Creates a blank square coverage canvas.
    #[inline]
    pub fn blank(resolution: usize) -> Result<Canvas, AtlasError> {
        Grid::try_new(resolution, resolution, BACKGROUND)
    }

    /// Returns true if the pixel is at or above the foreground threshold.
    #[inline]
    pub fn is_foreground(&self, row: usize, col: usize, threshold: u8) -> bool {
        self[(row, col)] >= threshold
    }
}
