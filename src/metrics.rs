// font-atlas/src/metrics.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Various metrics that apply to the entire font.

/// Various metrics that apply to the entire font.
///
/// All values are in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    /// The number of font units per em.
    ///
    /// Font sizes are usually expressed in pixels per em; e.g. `12px` means 12 pixels per em.
    pub units_per_em: u32,

    /// The maximum amount the font rises above the baseline, in font units.
    pub ascent: f32,

    /// The maximum amount the font descends below the baseline, in font units.
    ///
    /// NB: This is typically a negative value to match the definition of `sTypoDescender` in the
    /// `OS/2` table in the OpenType specification.
    pub descent: f32,

    /// Distance between baselines, in font units.
    pub line_gap: f32,
}

impl Metrics {
    /// Returns the factor that converts font units to pixels at the given point size.
    #[inline]
    pub fn scale_for(&self, point_size: f32) -> f32 {
        point_size / self.units_per_em.max(1) as f32
    }

    /// Returns the distance between successive baselines, in font units.
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}
