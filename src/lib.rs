// font-atlas/src/lib.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `font-atlas` bakes every glyph of a font into one signed distance field texture and builds
//! quad meshes that draw text out of it.
//!
//! A bake runs in stages: `AtlasPacker` picks a point size and places glyphs on shelves,
//! `GlyphRasterizer` fills their outlines into a large bilevel canvas, `DistanceFieldGenerator`
//! turns the canvas into a distance field, and `Downsampler` shrinks it to the shipped
//! resolution. The result is a `FontAtlas`, which is immutable and can be cached with
//! `AtlasCache` or handed between threads with `AtlasPublisher`. `TextMeshBuilder` then turns
//! laid out glyphs into vertex and index buffers.
//!
//! Fonts are anything implementing `FontHandle`. With the default `loader-ttf` feature,
//! `loaders::ttf::Font` reads TrueType and OpenType files.

#![warn(missing_docs)]

pub mod atlas;
pub mod cache;
pub mod canvas;
pub mod distance_field;
pub mod downsample;
pub mod error;
pub mod handle;
pub mod layout;
pub mod loaders;
pub mod mesh;
pub mod metrics;
pub mod outline;
pub mod packer;
pub mod publish;
pub mod rasterizer;

pub use crate::atlas::{AtlasConfig, FontAtlas, GlyphDescriptor};
pub use crate::cache::{AtlasCache, CacheKey, CacheOutcome};
pub use crate::distance_field::DistanceFieldGenerator;
pub use crate::downsample::Downsampler;
pub use crate::error::{AtlasError, CacheError, FontLoadingError, GlyphLoadingError, MeshError};
pub use crate::handle::FontHandle;
pub use crate::mesh::{MissingGlyphPolicy, PlacedGlyph, TextMesh, TextMeshBuilder, Vertex};
pub use crate::packer::AtlasPacker;
pub use crate::publish::{AtlasPublisher, BakeTicket};
pub use crate::rasterizer::GlyphRasterizer;

#[cfg(test)]
mod test;
