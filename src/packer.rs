// font-atlas/src/packer.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Chooses a point size at which a whole font fits a square canvas, then lays the glyphs out on
//! shelves and rasterizes them into the canvas.
//!
//! The size search is a heuristic. It predicts the area the font needs from an exemplar string
//! and scans in whole point steps; if the prediction was optimistic, packing fails with
//! `AtlasOverflow` rather than silently dropping glyphs.

use float_ord::FloatOrd;
use log::{debug, info, warn};
use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::vector::Vector2F;

use crate::atlas::GlyphDescriptor;
use crate::canvas::Canvas;
use crate::error::AtlasError;
use crate::handle::FontHandle;
use crate::rasterizer::GlyphRasterizer;

/// A mix of tall, deep, wide and narrow glyphs whose average footprint stands in for the whole
/// font.
pub const EXEMPLAR_STRING: &str = "{ÇºOJMQYZa@jmqyw";

/// The narrow glyph whose advance sets the gap left between packed glyphs.
pub const MARGIN_REFERENCE: &str = "!";

/// Default cap on the number of one-point steps the size search may take.
pub const DEFAULT_MAX_SIZE_STEPS: u32 = 4096;

/// Predicted footprint of an average glyph at some point size, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeEstimate {
    /// Average glyph width and line height, rounded up.
    pub glyph_size: Vector2F,
    /// Gap kept between neighboring glyphs, rounded up.
    pub margin: f32,
}

/// The shelf packing position. Only lives for the duration of one pack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackingCursor {
    /// Left edge of the next glyph's cell.
    pub origin_x: f32,
    /// Baseline of the current shelf.
    pub origin_y: f32,
    /// Lowest ink edge placed on the current shelf so far.
    pub current_row_max_y: f32,
}

/// Sizes and packs fonts into a square canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasPacker {
    canvas_size: u32,
    max_size_steps: u32,
    grow_point_size: bool,
}

impl AtlasPacker {
    /// Creates a packer for a `canvas_size × canvas_size` canvas.
    #[inline]
    pub fn new(canvas_size: u32) -> AtlasPacker {
        AtlasPacker {
            canvas_size,
            max_size_steps: DEFAULT_MAX_SIZE_STEPS,
            grow_point_size: true,
        }
    }

    /// Caps the number of one-point steps the size search may take before giving up.
    #[inline]
    pub fn with_max_size_steps(mut self, max_size_steps: u32) -> AtlasPacker {
        self.max_size_steps = max_size_steps;
        self
    }

    /// Whether the size search may go above the nominal size.
    #[inline]
    pub fn with_grow_point_size(mut self, grow_point_size: bool) -> AtlasPacker {
        self.grow_point_size = grow_point_size;
        self
    }

    /// The side length of the canvas, in pixels.
    #[inline]
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Measures the exemplar string and the margin reference at `point_size`.
    pub fn estimate<F>(&self, font: &F, point_size: f32) -> SizeEstimate
    where
        F: FontHandle,
    {
        let exemplar = font.measure_string(EXEMPLAR_STRING, point_size);
        let exemplar_len = EXEMPLAR_STRING.chars().count() as f32;
        let margin = font.measure_string(MARGIN_REFERENCE, point_size).x().ceil();
        SizeEstimate {
            glyph_size: Vector2F::new(
                (exemplar.x() / exemplar_len).ceil(),
                exemplar.y().ceil(),
            ),
            margin,
        }
    }

    /// Predicts whether every glyph of the font fits the canvas at `point_size`.
    pub fn is_likely_to_fit<F>(&self, font: &F, point_size: f32) -> bool
    where
        F: FontHandle,
    {
        let canvas_area = self.canvas_size as f32 * self.canvas_size as f32;
        let estimate = self.estimate(font, point_size);
        let estimated_area = (estimate.glyph_size.x() + estimate.margin)
            * (estimate.glyph_size.y() + estimate.margin)
            * font.glyph_count() as f32;
        estimated_area < canvas_area
    }

    /// Finds the largest whole-step point size, starting from `nominal_point_size`, that is
    /// predicted to fit.
    ///
    /// Scans up while the font fits, then back down until it fits again. Fails with
    /// `AtlasOverflow` if the scan runs past the step cap or reaches zero.
    pub fn point_size_that_fits<F>(
        &self,
        font: &F,
        nominal_point_size: f32,
    ) -> Result<f32, AtlasError>
    where
        F: FontHandle,
    {
        if !(nominal_point_size > 0.0) || !nominal_point_size.is_finite() {
            return Err(AtlasError::InvalidConfig("nominal point size must be positive"));
        }
        if font.glyph_count() == 0 {
            return Ok(nominal_point_size);
        }

        let mut fitted_size = nominal_point_size;
        let mut steps = 0;
        if self.grow_point_size {
            while self.is_likely_to_fit(font, fitted_size) {
                fitted_size += 1.0;
                steps += 1;
                if steps > self.max_size_steps {
                    return Err(AtlasError::AtlasOverflow {
                        reason: format!(
                            "size search did not converge within {} steps",
                            self.max_size_steps
                        ),
                    });
                }
            }
        }
        while !self.is_likely_to_fit(font, fitted_size) {
            fitted_size -= 1.0;
            steps += 1;
            if fitted_size <= 0.0 || steps > self.max_size_steps {
                return Err(AtlasError::AtlasOverflow {
                    reason: format!(
                        "no point size fits {} glyphs in a {}px canvas",
                        font.glyph_count(),
                        self.canvas_size
                    ),
                });
            }
        }
        info!(
            "fitted point size {} (nominal {}) after {} steps",
            fitted_size, nominal_point_size, steps
        );
        Ok(fitted_size)
    }

    /// Lays every glyph out on shelves at `point_size`, rasterizes it into `canvas`, and returns
    /// one descriptor per glyph in ascending glyph ID order.
    ///
    /// Glyphs without ink get a zero-sized rectangle at the origin. A glyph whose bounds cannot be
    /// measured is left out, so later lookups for it fail with `MissingGlyph`.
    pub fn pack<F>(
        &self,
        font: &F,
        point_size: f32,
        canvas: &mut Canvas,
        rasterizer: &GlyphRasterizer,
    ) -> Result<Vec<GlyphDescriptor>, AtlasError>
    where
        F: FontHandle,
    {
        let canvas_size = self.canvas_size as f32;
        let glyph_count = font.glyph_count();
        let margin = self.estimate(font, point_size).margin;

        let bounds: Vec<Option<RectF>> = (0..glyph_count)
            .map(|glyph_id| match font.measure_bounds(glyph_id, point_size) {
                Ok(bounds) => Some(bounds),
                Err(error) => {
                    warn!("glyph {} has no measurable bounds: {}", glyph_id, error);
                    None
                }
            })
            .collect();

        // Shelves are spaced so that even the tallest glyph clears the one above.
        let tallest_ink = bounds
            .iter()
            .flatten()
            .map(|bounds| FloatOrd(-bounds.min_y()))
            .max()
            .map_or(0.0, |FloatOrd(top)| top);
        let shelf_ascent = font.ascent(point_size).max(tallest_ink).ceil();

        let mut cursor = PackingCursor {
            origin_x: 0.0,
            origin_y: shelf_ascent,
            current_row_max_y: shelf_ascent,
        };
        let mut descriptors = Vec::with_capacity(glyph_count as usize);

        for (glyph_id, bounds) in (0..glyph_count).zip(bounds) {
            let bounds = match bounds {
                Some(bounds) => bounds,
                None => continue,
            };

            if cursor.origin_x > 0.0 && cursor.origin_x + bounds.width() + margin > canvas_size {
                cursor.origin_x = 0.0;
                cursor.origin_y = cursor.current_row_max_y + margin + shelf_ascent;
                cursor.current_row_max_y = cursor.origin_y;
                debug!("glyph {}: new shelf at baseline {}", glyph_id, cursor.origin_y);
            }
            if bounds.width() + margin > canvas_size {
                return Err(AtlasError::AtlasOverflow {
                    reason: format!("glyph {} is wider than the canvas", glyph_id),
                });
            }

            let pen = Vector2F::new(
                cursor.origin_x - bounds.min_x() + margin * 0.5,
                cursor.origin_y + margin * 0.5,
            );
            let ink = RectF::new(pen + bounds.origin(), bounds.size());
            if ink.max_y() > canvas_size {
                return Err(AtlasError::AtlasOverflow {
                    reason: format!(
                        "glyph {} of {} does not fit at {}pt",
                        glyph_id, glyph_count, point_size
                    ),
                });
            }
            cursor.current_row_max_y = cursor.current_row_max_y.max(ink.max_y());

            let has_ink = bounds.width() > 0.0 && bounds.height() > 0.0;
            let rect = if has_ink {
                rasterizer
                    .rasterize_glyph(canvas, font, glyph_id, point_size, pen)
                    .map_err(|_| AtlasError::MissingGlyph(glyph_id))?;
                ink
            } else {
                RectF::new(Vector2F::zero(), Vector2F::zero())
            };
            descriptors.push(GlyphDescriptor::from_canvas_rect(glyph_id, rect, canvas_size));

            cursor.origin_x += bounds.width() + margin;
        }

        debug!(
            "packed {} of {} glyphs, last shelf ends at {}",
            descriptors.len(),
            glyph_count,
            cursor.current_row_max_y
        );
        Ok(descriptors)
    }
}
