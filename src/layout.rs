// font-atlas/src/layout.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Best-effort line layout, enough to put a string on screen with an atlas.
//!
//! This maps characters to glyphs one to one and uses nominal advances. It does no shaping, no
//! kerning and no bidirectional reordering; real text should come from a shaper.

use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::vector::Vector2F;

use crate::handle::FontHandle;
use crate::mesh::PlacedGlyph;

/// Lays `text` out left to right inside `rect`, starting at its top-left corner.
///
/// Lines break at `'\n'` and wherever the next glyph would cross the right edge. Layout stops at
/// the first line whose descent would cross the bottom edge. Glyphs without ink take up space but
/// are not placed.
pub fn lay_out_text<F>(font: &F, text: &str, point_size: f32, rect: RectF) -> Vec<PlacedGlyph>
where
    F: FontHandle,
{
    let metrics = font.metrics();
    let scale = metrics.scale_for(point_size);
    let line_height = metrics.line_height() * scale;
    let ascent = font.ascent(point_size);
    let descent = font.descent(point_size);

    let mut placed = Vec::new();
    let mut pen = Vector2F::new(rect.min_x(), rect.min_y() + ascent);
    if pen.y() + descent > rect.max_y() {
        return placed;
    }

    for character in text.chars() {
        if character == '\n' {
            pen = Vector2F::new(rect.min_x(), pen.y() + line_height);
            if pen.y() + descent > rect.max_y() {
                break;
            }
            continue;
        }

        let glyph_id = font.glyph_for_char(character).unwrap_or(0);
        let advance = font
            .advance(glyph_id)
            .map_or(0.0, |advance| advance.x() * scale);

        if pen.x() > rect.min_x() && pen.x() + advance > rect.max_x() {
            pen = Vector2F::new(rect.min_x(), pen.y() + line_height);
            if pen.y() + descent > rect.max_y() {
                break;
            }
        }

        if let Ok(bounds) = font.measure_bounds(glyph_id, point_size) {
            if bounds.width() > 0.0 && bounds.height() > 0.0 {
                placed.push(PlacedGlyph {
                    glyph_id,
                    bounds: RectF::new(pen + bounds.origin(), bounds.size()),
                });
            }
        }
        pen = pen + Vector2F::new(advance, 0.0);
    }

    placed
}
