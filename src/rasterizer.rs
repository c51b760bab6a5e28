// font-atlas/src/rasterizer.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bilevel ("black-and-white") glyph rasterization into a coverage canvas.
//!
//! Each pixel is either entirely on or off: a pixel is foreground when its center lies inside
//! the outline under the nonzero winding rule. The distance transform wants a hard edge, so there
//! is no antialiasing here.

use float_ord::FloatOrd;
use pathfinder_geometry::line_segment::LineSegment2F;
use pathfinder_geometry::transform2d::Transform2F;
use pathfinder_geometry::vector::Vector2F;

use crate::canvas::{Canvas, FOREGROUND};
use crate::error::GlyphLoadingError;
use crate::handle::FontHandle;
use crate::outline::Outline;

/// Fills glyph outlines into a shared coverage canvas.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphRasterizer;

#[derive(Clone, Copy)]
struct Crossing {
    x: f32,
    winding: i32,
}

impl GlyphRasterizer {
    /// Creates a new rasterizer.
    #[inline]
    pub fn new() -> GlyphRasterizer {
        GlyphRasterizer
    }

    /// Rasterizes one glyph with its origin (on the baseline) at `origin`, in canvas pixels.
    ///
    /// Returns `false` without touching the canvas if the glyph has no outline.
    pub fn rasterize_glyph<F>(
        &self,
        canvas: &mut Canvas,
        font: &F,
        glyph_id: u32,
        point_size: f32,
        origin: Vector2F,
    ) -> Result<bool, GlyphLoadingError>
    where
        F: FontHandle,
    {
        let transform = Transform2F::from_translation(origin);
        match font.outline_path(glyph_id, point_size, transform)? {
            Some(outline) => {
                self.fill_outline(canvas, &outline);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fills an outline that is already in canvas coordinates. Anything outside the canvas is
    /// clipped.
    pub fn fill_outline(&self, canvas: &mut Canvas, outline: &Outline) {
        let edges: Vec<LineSegment2F> = outline
            .flatten()
            .into_iter()
            .filter(|edge| edge.from().y() != edge.to().y())
            .collect();
        if edges.is_empty() {
            return;
        }

        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for edge in &edges {
            min_y = min_y.min(edge.from().y()).min(edge.to().y());
            max_y = max_y.max(edge.from().y()).max(edge.to().y());
        }
        let height = canvas.height() as f32;
        let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
        let end_row = ((max_y - 0.5).ceil().max(0.0).min(height)) as usize;

        let mut crossings = Vec::new();
        for row in first_row..end_row {
            let sample_y = row as f32 + 0.5;
            crossings.clear();
            for edge in &edges {
                let (from, to) = (edge.from(), edge.to());
                let (top, bottom, winding) = if from.y() < to.y() {
                    (from, to, 1)
                } else {
                    (to, from, -1)
                };
                // Half-open so a vertex shared by two edges is counted once.
                if sample_y < top.y() || sample_y >= bottom.y() {
                    continue;
                }
                let t = (sample_y - top.y()) / (bottom.y() - top.y());
                let x = top.x() + (bottom.x() - top.x()) * t;
                crossings.push(Crossing { x, winding });
            }
            crossings.sort_by_key(|crossing| FloatOrd(crossing.x));
            self.fill_span_row(canvas, row, &crossings);
        }
    }

    fn fill_span_row(&self, canvas: &mut Canvas, row: usize, crossings: &[Crossing]) {
        let width = canvas.width() as f32;
        let pixels = canvas.row_mut(row);
        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].winding;
            if winding == 0 {
                continue;
            }
            // Pixel `col` is covered when its center `col + 0.5` lies in `[left, right)`.
            let start = (pair[0].x - 0.5).ceil().max(0.0).min(width) as usize;
            let end = (pair[1].x - 0.5).ceil().max(0.0).min(width) as usize;
            for pixel in &mut pixels[start..end.max(start)] {
                *pixel = FOREGROUND;
            }
        }
    }
}
