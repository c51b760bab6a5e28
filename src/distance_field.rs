// font-atlas/src/distance_field.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Signed distance fields from bilevel coverage, using the dead reckoning transform.
//!
//! Every pixel tracks the nearest border point found so far. Two raster scans propagate those
//! points to neighbors, and each time a pixel adopts a neighbor's point its distance is recomputed
//! exactly instead of accumulating chamfer steps, which keeps the error bounded.
//!
//! The result is squashed to 8 bits with a logistic curve: deep inside a glyph maps to 255, far
//! outside maps to 0, and the outline itself sits at the mid-value.

use log::debug;
use pathfinder_geometry::vector::Vector2F;
use rayon::prelude::*;
use std::f32::consts::SQRT_2;

use crate::canvas::{Canvas, Grid};
use crate::error::AtlasError;

/// Propagation cost to a 4-connected neighbor.
const ORTHOGONAL_COST: f32 = 1.0;
/// Propagation cost to a diagonal neighbor.
const DIAGONAL_COST: f32 = SQRT_2;

/// Default coverage value at or above which a pixel counts as inside a glyph.
pub const DEFAULT_FOREGROUND_THRESHOLD: u8 = 0x7f;

/// The encoded value of a pixel that lies exactly on an outline.
pub const BOUNDARY_VALUE: u8 = 128;

/// Converts coverage rasters into signed distance fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceFieldGenerator {
    foreground_threshold: u8,
}

impl Default for DistanceFieldGenerator {
    fn default() -> DistanceFieldGenerator {
        DistanceFieldGenerator::new(DEFAULT_FOREGROUND_THRESHOLD)
    }
}

impl DistanceFieldGenerator {
    /// Creates a generator that treats coverage values at or above `foreground_threshold` as
    /// inside.
    #[inline]
    pub fn new(foreground_threshold: u8) -> DistanceFieldGenerator {
        DistanceFieldGenerator {
            foreground_threshold,
        }
    }

    /// Computes the signed distance, in pixels, from every pixel to the nearest outline pixel.
    ///
    /// Distances are negative inside glyphs, positive outside, and exactly zero on the boundary.
    /// The one-pixel frame of the canvas never takes part in propagation.
    pub fn signed_distances(&self, coverage: &Canvas) -> Result<Grid<f32>, AtlasError> {
        let (width, height) = (coverage.width(), coverage.height());
        // Farther than any two points of the canvas can be from each other.
        let sentinel = (width + height) as f32 + 1.0;

        let mut distances = Grid::try_new(width, height, sentinel)?;
        let mut nearest = Grid::try_new(width, height, Vector2F::zero())?;
        debug!("distance field: {}x{} working buffers allocated", width, height);

        self.seed_boundary(coverage, &mut distances, &mut nearest);
        if width < 3 || height < 3 {
            return Ok(distances);
        }
        forward_pass(&mut distances, &mut nearest);
        backward_pass(&mut distances, &mut nearest);
        self.apply_sign(coverage, &mut distances);
        Ok(distances)
    }

    /// Squashes signed distances into bytes with `round(255 / (1 + e^distance))`.
    pub fn encode(&self, distances: &Grid<f32>) -> Result<Grid<u8>, AtlasError> {
        let mut encoded = Grid::try_new(distances.width(), distances.height(), 0u8)?;
        encoded
            .as_mut_slice()
            .par_iter_mut()
            .zip(distances.as_slice().par_iter())
            .for_each(|(byte, &distance)| *byte = encode_distance(distance));
        Ok(encoded)
    }

    /// Runs the whole transform: signed distances, then encoding.
    pub fn generate(&self, coverage: &Canvas) -> Result<Grid<u8>, AtlasError> {
        let distances = self.signed_distances(coverage)?;
        self.encode(&distances)
    }

    /// Returns true if an interior pixel's classification differs from one of its 4-connected
    /// neighbors.
    pub fn is_boundary(&self, coverage: &Canvas, row: usize, col: usize) -> bool {
        let (width, height) = (coverage.width(), coverage.height());
        if row == 0 || col == 0 || row + 1 >= height || col + 1 >= width {
            return false;
        }
        let threshold = self.foreground_threshold;
        let here = coverage.is_foreground(row, col, threshold);
        here != coverage.is_foreground(row - 1, col, threshold)
            || here != coverage.is_foreground(row + 1, col, threshold)
            || here != coverage.is_foreground(row, col - 1, threshold)
            || here != coverage.is_foreground(row, col + 1, threshold)
    }

    fn seed_boundary(
        &self,
        coverage: &Canvas,
        distances: &mut Grid<f32>,
        nearest: &mut Grid<Vector2F>,
    ) {
        let width = coverage.width();
        if width == 0 {
            return;
        }
        distances
            .as_mut_slice()
            .par_chunks_mut(width)
            .zip(nearest.as_mut_slice().par_chunks_mut(width))
            .enumerate()
            .for_each(|(row, (distance_row, nearest_row))| {
                for col in 0..width {
                    if self.is_boundary(coverage, row, col) {
                        distance_row[col] = 0.0;
                        nearest_row[col] = Vector2F::new(col as f32, row as f32);
                    }
                }
            });
    }

    fn apply_sign(&self, coverage: &Canvas, distances: &mut Grid<f32>) {
        let threshold = self.foreground_threshold;
        distances
            .as_mut_slice()
            .par_iter_mut()
            .zip(coverage.as_slice().par_iter())
            .for_each(|(distance, &value)| {
                if value >= threshold && *distance != 0.0 {
                    *distance = -*distance;
                }
            });
    }
}

/// Maps a signed distance to a byte: large negative distances approach 255, large positive ones
/// approach 0, and zero maps to `BOUNDARY_VALUE`.
#[inline]
pub fn encode_distance(distance: f32) -> u8 {
    let value = (255.0 / (1.0 + distance.exp())).round();
    value.max(0.0).min(255.0) as u8
}

/// Adopts the neighbor's border point if the neighbor, plus the step to reach it, is closer.
#[inline]
fn relax(
    distances: &mut Grid<f32>,
    nearest: &mut Grid<Vector2F>,
    here: (usize, usize),
    neighbor: (usize, usize),
    cost: f32,
) {
    if distances[neighbor] + cost < distances[here] {
        let point = nearest[neighbor];
        nearest[here] = point;
        let position = Vector2F::new(here.1 as f32, here.0 as f32);
        distances[here] = (position - point).length();
    }
}

/// Top to bottom, left to right, looking at the already visited upper-left, up, upper-right and
/// left neighbors.
fn forward_pass(distances: &mut Grid<f32>, nearest: &mut Grid<Vector2F>) {
    let (width, height) = (distances.width(), distances.height());
    for row in 1..height - 1 {
        for col in 1..width - 1 {
            let here = (row, col);
            relax(distances, nearest, here, (row - 1, col - 1), DIAGONAL_COST);
            relax(distances, nearest, here, (row - 1, col), ORTHOGONAL_COST);
            relax(distances, nearest, here, (row - 1, col + 1), DIAGONAL_COST);
            relax(distances, nearest, here, (row, col - 1), ORTHOGONAL_COST);
        }
    }
}

/// Bottom to top, right to left, looking at the right, lower-left, down and lower-right
/// neighbors.
fn backward_pass(distances: &mut Grid<f32>, nearest: &mut Grid<Vector2F>) {
    let (width, height) = (distances.width(), distances.height());
    for row in (1..height - 1).rev() {
        for col in (1..width - 1).rev() {
            let here = (row, col);
            relax(distances, nearest, here, (row, col + 1), ORTHOGONAL_COST);
            relax(distances, nearest, here, (row + 1, col - 1), DIAGONAL_COST);
            relax(distances, nearest, here, (row + 1, col), ORTHOGONAL_COST);
            relax(distances, nearest, here, (row + 1, col + 1), DIAGONAL_COST);
        }
    }
}
