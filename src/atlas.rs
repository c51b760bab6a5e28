// font-atlas/src/atlas.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The baked atlas: a signed distance field texture plus the glyph rectangles inside it.

use image::{GrayImage, ImageResult};
use log::info;
use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::vector::Vector2F;
use std::path::Path;
use std::sync::Arc;

use crate::canvas::Canvas;
use crate::distance_field::{DistanceFieldGenerator, DEFAULT_FOREGROUND_THRESHOLD};
use crate::downsample::Downsampler;
use crate::error::AtlasError;
use crate::handle::FontHandle;
use crate::packer::{AtlasPacker, DEFAULT_MAX_SIZE_STEPS};
use crate::rasterizer::GlyphRasterizer;

/// Default side length of the canvas glyphs are rasterized and transformed in.
pub const DEFAULT_WORKING_RESOLUTION: u32 = 4096;

/// Default side length of the texture that is kept and shipped.
pub const DEFAULT_STORAGE_RESOLUTION: u32 = 2048;

/// Settings for one atlas bake.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasConfig {
    /// Side length of the square canvas glyphs are rasterized into.
    pub working_resolution: u32,
    /// Side length of the square texture the distance field is resampled to.
    pub storage_resolution: u32,
    /// Coverage value at or above which a pixel counts as inside a glyph.
    pub foreground_threshold: u8,
    /// Cap on the number of one-point steps the size search may take.
    pub max_size_steps: u32,
    /// Whether the size search may pick a size above the nominal one.
    pub grow_point_size: bool,
}

impl Default for AtlasConfig {
    fn default() -> AtlasConfig {
        AtlasConfig {
            working_resolution: DEFAULT_WORKING_RESOLUTION,
            storage_resolution: DEFAULT_STORAGE_RESOLUTION,
            foreground_threshold: DEFAULT_FOREGROUND_THRESHOLD,
            max_size_steps: DEFAULT_MAX_SIZE_STEPS,
            grow_point_size: true,
        }
    }
}

impl AtlasConfig {
    /// Returns a config with the given working and storage resolutions and default everything
    /// else.
    pub fn with_resolutions(working_resolution: u32, storage_resolution: u32) -> AtlasConfig {
        AtlasConfig {
            working_resolution,
            storage_resolution,
            ..AtlasConfig::default()
        }
    }

    /// Sets the foreground threshold.
    #[inline]
    pub fn with_foreground_threshold(mut self, foreground_threshold: u8) -> AtlasConfig {
        self.foreground_threshold = foreground_threshold;
        self
    }

    /// Sets the size search step cap.
    #[inline]
    pub fn with_max_size_steps(mut self, max_size_steps: u32) -> AtlasConfig {
        self.max_size_steps = max_size_steps;
        self
    }

    /// Sets whether the size search may grow past the nominal size.
    #[inline]
    pub fn with_grow_point_size(mut self, grow_point_size: bool) -> AtlasConfig {
        self.grow_point_size = grow_point_size;
        self
    }

    /// Checks that a bake with this config can make sense.
    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.working_resolution < 3 || self.storage_resolution < 3 {
            return Err(AtlasError::InvalidConfig("resolutions must be at least 3 pixels"));
        }
        if self.storage_resolution > self.working_resolution {
            return Err(AtlasError::InvalidConfig(
                "storage resolution must not exceed working resolution",
            ));
        }
        if self.max_size_steps == 0 {
            return Err(AtlasError::InvalidConfig("the size search needs at least one step"));
        }
        Ok(())
    }
}

/// Where one glyph lives in the atlas, in normalized texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphDescriptor {
    /// The glyph ID in the font.
    pub glyph_id: u32,
    /// Top-left corner, each component in `[0, 1]`.
    pub top_left_uv: Vector2F,
    /// Bottom-right corner, each component in `[0, 1]` and no less than `top_left_uv`.
    pub bottom_right_uv: Vector2F,
}

impl GlyphDescriptor {
    /// Normalizes a rectangle in canvas pixels by the canvas side length.
    pub fn from_canvas_rect(glyph_id: u32, rect: RectF, canvas_size: f32) -> GlyphDescriptor {
        let normalize = |point: Vector2F| {
            let point = point * (1.0 / canvas_size);
            Vector2F::new(point.x().max(0.0).min(1.0), point.y().max(0.0).min(1.0))
        };
        GlyphDescriptor {
            glyph_id,
            top_left_uv: normalize(rect.origin()),
            bottom_right_uv: normalize(Vector2F::new(rect.max_x(), rect.max_y())),
        }
    }

    /// True for glyphs without ink, such as the space.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.top_left_uv.x() >= self.bottom_right_uv.x()
            || self.top_left_uv.y() >= self.bottom_right_uv.y()
    }
}

/// A baked font atlas. Immutable once built, and cheap to clone and share between threads.
#[derive(Clone, Debug, PartialEq)]
pub struct FontAtlas {
    font_family: String,
    nominal_point_size: f32,
    fitted_point_size: f32,
    storage_resolution: u32,
    glyph_descriptors: Arc<[GlyphDescriptor]>,
    texture: Arc<[u8]>,
}

impl FontAtlas {
    /// Rasterizes every glyph of `font`, computes the distance field, and downsamples it.
    ///
    /// This is a long, run-to-completion computation; a default config allocates several hundred
    /// megabytes of working buffers.
    pub fn bake<F>(
        font: &F,
        nominal_point_size: f32,
        config: &AtlasConfig,
    ) -> Result<FontAtlas, AtlasError>
    where
        F: FontHandle,
    {
        config.validate()?;
        let font_family = font.family_name();
        info!(
            "baking {} at {}pt into {}px (working {}px)",
            font_family, nominal_point_size, config.storage_resolution, config.working_resolution
        );

        let packer = AtlasPacker::new(config.working_resolution)
            .with_max_size_steps(config.max_size_steps)
            .with_grow_point_size(config.grow_point_size);
        let fitted_point_size = packer.point_size_that_fits(font, nominal_point_size)?;

        let mut canvas = Canvas::blank(config.working_resolution as usize)?;
        let glyph_descriptors =
            packer.pack(font, fitted_point_size, &mut canvas, &GlyphRasterizer::new())?;

        let field = DistanceFieldGenerator::new(config.foreground_threshold).generate(&canvas)?;
        drop(canvas);
        let texture = Downsampler::new().downsample(field, config.storage_resolution)?;

        info!("baked {} with {} glyphs", font_family, glyph_descriptors.len());
        FontAtlas::from_parts(
            font_family,
            nominal_point_size,
            fitted_point_size,
            config.storage_resolution,
            glyph_descriptors,
            texture,
        )
    }

    /// Assembles an atlas from already computed parts, as when restoring from a cache.
    ///
    /// The texture must hold exactly `storage_resolution²` bytes and the descriptors must be in
    /// strictly ascending glyph ID order.
    pub fn from_parts(
        font_family: String,
        nominal_point_size: f32,
        fitted_point_size: f32,
        storage_resolution: u32,
        glyph_descriptors: Vec<GlyphDescriptor>,
        texture: Vec<u8>,
    ) -> Result<FontAtlas, AtlasError> {
        let expected_len = (storage_resolution as usize).checked_mul(storage_resolution as usize);
        if expected_len != Some(texture.len()) {
            return Err(AtlasError::InvalidConfig(
                "texture size does not match storage resolution",
            ));
        }
        if glyph_descriptors
            .windows(2)
            .any(|pair| pair[0].glyph_id >= pair[1].glyph_id)
        {
            return Err(AtlasError::InvalidConfig("glyph descriptors are not in ascending order"));
        }
        Ok(FontAtlas {
            font_family,
            nominal_point_size,
            fitted_point_size,
            storage_resolution,
            glyph_descriptors: glyph_descriptors.into(),
            texture: texture.into(),
        })
    }

    /// The family name of the baked font.
    #[inline]
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// The point size the bake was requested at.
    #[inline]
    pub fn nominal_point_size(&self) -> f32 {
        self.nominal_point_size
    }

    /// The point size glyphs were actually rasterized at.
    #[inline]
    pub fn fitted_point_size(&self) -> f32 {
        self.fitted_point_size
    }

    /// Side length of the square texture.
    #[inline]
    pub fn storage_resolution(&self) -> u32 {
        self.storage_resolution
    }

    /// All descriptors in ascending glyph ID order.
    #[inline]
    pub fn glyph_descriptors(&self) -> &[GlyphDescriptor] {
        &self.glyph_descriptors
    }

    /// Single-channel 8-bit texels, row by row, `storage_resolution` on a side.
    #[inline]
    pub fn texture_bytes(&self) -> &[u8] {
        &self.texture
    }

    /// Looks up the descriptor for a glyph.
    pub fn glyph_descriptor(&self, glyph_id: u32) -> Result<&GlyphDescriptor, AtlasError> {
        self.glyph_descriptors
            .binary_search_by_key(&glyph_id, |descriptor| descriptor.glyph_id)
            .map(|index| &self.glyph_descriptors[index])
            .map_err(|_| AtlasError::MissingGlyph(glyph_id))
    }

    /// Copies the texture into a grayscale image, mostly for looking at it.
    pub fn to_image(&self) -> Option<GrayImage> {
        GrayImage::from_raw(
            self.storage_resolution,
            self.storage_resolution,
            self.texture.to_vec(),
        )
    }

    /// Writes the texture to a PNG file.
    pub fn save_png<P>(&self, path: P) -> ImageResult<()>
    where
        P: AsRef<Path>,
    {
        match self.to_image() {
            Some(image) => image.save(path),
            None => Err(image::ImageError::Parameter(
                image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ),
            )),
        }
    }
}
