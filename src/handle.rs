// font-atlas/src/handle.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Provides a common interface to whatever supplies glyph outlines and metrics.
//!
//! The atlas never talks to a particular font library. Anything that can report glyph bounds,
//! outlines and a handful of font-wide metrics can be baked.

use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::transform2d::Transform2F;
use pathfinder_geometry::vector::Vector2F;

use crate::error::GlyphLoadingError;
use crate::metrics::Metrics;
use crate::outline::{Outline, OutlineBuilder, OutlineSink};

/// The capabilities of a font that the atlas baker and the text layout need.
///
/// Required methods work in font units with the origin at the baseline and the Y axis pointing
/// up. The provided methods convert to pixels at a point size, with the Y axis pointing down.
pub trait FontHandle {
    /// Returns the name of the font family.
    fn family_name(&self) -> String;

    /// Returns the number of glyphs in the font.
    ///
    /// Glyph IDs range from 0 inclusive to this value exclusive.
    fn glyph_count(&self) -> u32;

    /// Retrieves various metrics that apply to the entire font.
    fn metrics(&self) -> Metrics;

    /// Returns the usual glyph ID for a Unicode character.
    ///
    /// Be careful with this function; typographically correct character-to-glyph mapping must be
    /// done using a *shaper*. This is only useful for best-effort cases like measuring an
    /// exemplar string.
    fn glyph_for_char(&self, character: char) -> Option<u32>;

    /// Returns the distance from the origin of the glyph with the given ID to the next, in font
    /// units.
    fn advance(&self, glyph_id: u32) -> Result<Vector2F, GlyphLoadingError>;

    /// Returns the ink boundaries of a glyph in font units. The origin of the coordinate space is
    /// at the bottom left.
    ///
    /// Glyphs without ink, such as the space, report a zero-sized rectangle.
    fn typographic_bounds(&self, glyph_id: u32) -> Result<RectF, GlyphLoadingError>;

    /// Sends the vector path for a glyph to a sink, in font units.
    ///
    /// Glyphs without ink send nothing.
    fn outline<S>(&self, glyph_id: u32, sink: &mut S) -> Result<(), GlyphLoadingError>
    where
        S: OutlineSink;

    /// Returns the ascent in pixels at the given point size.
    #[inline]
    fn ascent(&self, point_size: f32) -> f32 {
        let metrics = self.metrics();
        metrics.ascent * metrics.scale_for(point_size)
    }

    /// Returns the descent in pixels at the given point size, as a positive distance below the
    /// baseline.
    #[inline]
    fn descent(&self, point_size: f32) -> f32 {
        let metrics = self.metrics();
        -metrics.descent * metrics.scale_for(point_size)
    }

    /// Returns the pixel boundaries of a glyph's ink at the given point size, relative to its
    /// origin on the baseline. The Y axis points down, so ink above the baseline has a negative
    /// Y coordinate.
    fn measure_bounds(&self, glyph_id: u32, point_size: f32) -> Result<RectF, GlyphLoadingError> {
        let typographic_bounds = self.typographic_bounds(glyph_id)?;
        let scaled = typographic_bounds * self.metrics().scale_for(point_size);

        // Translate the origin to "origin is top left" coordinate system.
        let new_origin = Vector2F::new(scaled.origin_x(), -scaled.origin_y() - scaled.height());
        Ok(RectF::new(new_origin, scaled.size()))
    }

    /// Returns the outline of a glyph scaled to the given point size, flipped so the Y axis
    /// points down, and then mapped through `transform`.
    ///
    /// Returns `None` for glyphs without ink.
    fn outline_path(
        &self,
        glyph_id: u32,
        point_size: f32,
        transform: Transform2F,
    ) -> Result<Option<Outline>, GlyphLoadingError> {
        let mut builder = OutlineBuilder::new();
        self.outline(glyph_id, &mut builder)?;
        let mut outline = builder.into_outline();
        if outline.is_empty() {
            return Ok(None);
        }
        let scale = self.metrics().scale_for(point_size);
        let to_pixels = Transform2F::from_scale(Vector2F::new(scale, -scale));
        outline.transform(&(transform * to_pixels));
        Ok(Some(outline))
    }

    /// Measures a string laid out on one line with nominal advances, in pixels.
    ///
    /// The width is the sum of the advances; characters the font cannot map fall back to glyph 0.
    /// The height is one line height.
    fn measure_string(&self, text: &str, point_size: f32) -> Vector2F {
        let metrics = self.metrics();
        let scale = metrics.scale_for(point_size);
        let width: f32 = text
            .chars()
            .map(|character| {
                let glyph_id = self.glyph_for_char(character).unwrap_or(0);
                self.advance(glyph_id).map(|advance| advance.x()).unwrap_or(0.0)
            })
            .sum();
        Vector2F::new(width * scale, metrics.line_height() * scale)
    }
}
