// font-atlas/src/loaders/ttf.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A pure-Rust loader for TrueType and OpenType fonts, built on `ttf-parser`.

use log::debug;
use pathfinder_geometry::line_segment::LineSegment2F;
use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::vector::Vector2F;
use std::fmt::{self, Debug, Formatter};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use ttf_parser::{name_id, Face, GlyphId};

use crate::error::{FontLoadingError, GlyphLoadingError};
use crate::handle::FontHandle;
use crate::metrics::Metrics;
use crate::outline::OutlineSink;

/// A loaded TrueType or OpenType font.
///
/// The font data is shared, so clones are cheap and the font can be sent to a bake worker.
#[derive(Clone)]
pub struct Font {
    font_data: Arc<Vec<u8>>,
    font_index: u32,
    family_name: String,
    glyph_count: u32,
    metrics: Metrics,
}

impl Font {
    /// Loads a font from raw font data (the contents of a `.ttf`/`.otf`/etc. file).
    ///
    /// If the data represents a collection (`.ttc`/`.otc`/etc.), `font_index` specifies the index
    /// of the font to load from it. If the data represents a single font, pass 0 for `font_index`.
    pub fn from_bytes(font_data: Arc<Vec<u8>>, font_index: u32) -> Result<Font, FontLoadingError> {
        let (family_name, glyph_count, metrics) = {
            let face = Face::parse(&font_data, font_index).map_err(|_| FontLoadingError::Parse)?;
            let family_name = face
                .names()
                .into_iter()
                .filter(|name| name.name_id == name_id::FAMILY)
                .find_map(|name| name.to_string())
                .unwrap_or_default();
            let metrics = Metrics {
                units_per_em: face.units_per_em() as u32,
                ascent: face.ascender() as f32,
                descent: face.descender() as f32,
                line_gap: face.line_gap() as f32,
            };
            (family_name, face.number_of_glyphs() as u32, metrics)
        };
        debug!("loaded {} with {} glyphs", family_name, glyph_count);

        Ok(Font {
            font_data,
            font_index,
            family_name,
            glyph_count,
            metrics,
        })
    }

    /// Loads a font from the path to a `.ttf`/`.otf`/etc. file.
    ///
    /// If the file is a collection (`.ttc`/`.otc`/etc.), `font_index` specifies the index of the
    /// font to load from it. If the file represents a single font, pass 0 for `font_index`.
    pub fn from_path<P>(path: P, font_index: u32) -> Result<Font, FontLoadingError>
    where
        P: AsRef<Path>,
    {
        let font_data = fs::read(path)?;
        Font::from_bytes(Arc::new(font_data), font_index)
    }

    /// Returns the raw font data this font was loaded from.
    #[inline]
    pub fn font_data(&self) -> &Arc<Vec<u8>> {
        &self.font_data
    }

    /// Returns the name of the font family.
    #[inline]
    pub fn family_name(&self) -> String {
        self.family_name.clone()
    }

    /// Returns the number of glyphs in the font.
    #[inline]
    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Retrieves various metrics that apply to the entire font.
    #[inline]
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Returns the usual glyph ID for a Unicode character.
    pub fn glyph_for_char(&self, character: char) -> Option<u32> {
        let face = self.face().ok()?;
        face.glyph_index(character).map(|glyph| glyph.0 as u32)
    }

    /// Returns the distance from the origin of the glyph with the given ID to the next, in font
    /// units.
    pub fn advance(&self, glyph_id: u32) -> Result<Vector2F, GlyphLoadingError> {
        let glyph = self.glyph(glyph_id)?;
        let face = self.face()?;
        let advance = face
            .glyph_hor_advance(glyph)
            .ok_or(GlyphLoadingError::NoSuchGlyph)?;
        Ok(Vector2F::new(advance as f32, 0.0))
    }

    /// Returns the boundaries of a glyph in font units.
    pub fn typographic_bounds(&self, glyph_id: u32) -> Result<RectF, GlyphLoadingError> {
        let glyph = self.glyph(glyph_id)?;
        let face = self.face()?;
        Ok(match face.glyph_bounding_box(glyph) {
            Some(bounds) => RectF::from_points(
                Vector2F::new(bounds.x_min as f32, bounds.y_min as f32),
                Vector2F::new(bounds.x_max as f32, bounds.y_max as f32),
            ),
            None => RectF::new(Vector2F::zero(), Vector2F::zero()),
        })
    }

    /// Sends the vector path for a glyph to a sink.
    pub fn outline<S>(&self, glyph_id: u32, sink: &mut S) -> Result<(), GlyphLoadingError>
    where
        S: OutlineSink,
    {
        let glyph = self.glyph(glyph_id)?;
        let face = self.face()?;
        let mut adapter = SinkAdapter { sink };
        // Glyphs without ink have no outline; that is not an error.
        face.outline_glyph(glyph, &mut adapter);
        Ok(())
    }

    fn face(&self) -> Result<Face<'_>, GlyphLoadingError> {
        Face::parse(&self.font_data, self.font_index).map_err(|_| GlyphLoadingError::NoSuchGlyph)
    }

    fn glyph(&self, glyph_id: u32) -> Result<GlyphId, GlyphLoadingError> {
        if glyph_id >= self.glyph_count {
            return Err(GlyphLoadingError::NoSuchGlyph);
        }
        Ok(GlyphId(glyph_id as u16))
    }
}

impl FontHandle for Font {
    #[inline]
    fn family_name(&self) -> String {
        self.family_name()
    }

    #[inline]
    fn glyph_count(&self) -> u32 {
        self.glyph_count()
    }

    #[inline]
    fn metrics(&self) -> Metrics {
        self.metrics()
    }

    #[inline]
    fn glyph_for_char(&self, character: char) -> Option<u32> {
        self.glyph_for_char(character)
    }

    #[inline]
    fn advance(&self, glyph_id: u32) -> Result<Vector2F, GlyphLoadingError> {
        self.advance(glyph_id)
    }

    #[inline]
    fn typographic_bounds(&self, glyph_id: u32) -> Result<RectF, GlyphLoadingError> {
        self.typographic_bounds(glyph_id)
    }

    #[inline]
    fn outline<S>(&self, glyph_id: u32, sink: &mut S) -> Result<(), GlyphLoadingError>
    where
        S: OutlineSink,
    {
        self.outline(glyph_id, sink)
    }
}

impl Debug for Font {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        self.family_name.fmt(fmt)
    }
}

struct SinkAdapter<'a, S> {
    sink: &'a mut S,
}

impl<'a, S> ttf_parser::OutlineBuilder for SinkAdapter<'a, S>
where
    S: OutlineSink,
{
    fn move_to(&mut self, x: f32, y: f32) {
        self.sink.move_to(Vector2F::new(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.sink.line_to(Vector2F::new(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.sink
            .quadratic_curve_to(Vector2F::new(x1, y1), Vector2F::new(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let ctrl = LineSegment2F::new(Vector2F::new(x1, y1), Vector2F::new(x2, y2));
        self.sink.cubic_curve_to(ctrl, Vector2F::new(x, y));
    }

    fn close(&mut self) {
        self.sink.close();
    }
}
