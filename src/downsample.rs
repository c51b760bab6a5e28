// font-atlas/src/downsample.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resamples the working-resolution distance field down to the shipped texture size.
//!
//! Baking at a multiple of the storage resolution and filtering down gives cleaner edges than
//! baking at storage resolution directly.

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::canvas::Grid;
use crate::error::AtlasError;

/// Downsamples square single-channel fields with a Lanczos (windowed sinc) filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Downsampler {
    filter: FilterType,
}

impl Default for Downsampler {
    fn default() -> Downsampler {
        Downsampler {
            filter: FilterType::Lanczos3,
        }
    }
}

impl Downsampler {
    /// Creates a downsampler with the default high quality filter.
    #[inline]
    pub fn new() -> Downsampler {
        Downsampler::default()
    }

    /// Resamples `field` to `resolution × resolution` and returns the row-major bytes.
    ///
    /// A field that is already the requested size is returned unchanged.
    pub fn downsample(&self, field: Grid<u8>, resolution: u32) -> Result<Vec<u8>, AtlasError> {
        let (width, height) = (field.width() as u32, field.height() as u32);
        if width == resolution && height == resolution {
            return Ok(field.into_vec());
        }
        let source = GrayImage::from_raw(width, height, field.into_vec())
            .ok_or(AtlasError::InvalidConfig("distance field is not a whole image"))?;
        let resized = imageops::resize(&source, resolution, resolution, self.filter);
        Ok(resized.into_raw())
    }
}
