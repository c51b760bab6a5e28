// font-atlas/src/error.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Various types of errors that `font-atlas` can return.

use std::io;
use thiserror::Error;

/// Reasons why a loader might fail to load a font.
#[derive(Debug, Error)]
pub enum FontLoadingError {
    /// Attempted to load a malformed or corrupted font.
    #[error("parse error")]
    Parse,

    /// A disk or similar I/O error occurred while attempting to load the font.
    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// Reasons why a font might fail to load a glyph.
#[derive(Clone, Copy, PartialEq, Debug, Error)]
pub enum GlyphLoadingError {
    /// The font didn't contain a glyph with that ID.
    #[error("no such glyph")]
    NoSuchGlyph,
}

/// Reasons why an atlas bake or a descriptor lookup might fail.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum AtlasError {
    /// The glyphs do not fit in the canvas at the chosen point size, or no point size could be
    /// found that is predicted to fit.
    ///
    /// The caller may retry with a larger canvas or a smaller nominal size.
    #[error("atlas overflow: {reason}")]
    AtlasOverflow {
        /// What ran out of room.
        reason: String,
    },

    /// The atlas has no descriptor for the glyph with this ID.
    #[error("no descriptor for glyph {0}")]
    MissingGlyph(u32),

    /// A working buffer for the bake could not be allocated.
    #[error("failed to allocate {bytes} bytes of working memory")]
    Allocation {
        /// The size of the failed allocation.
        bytes: usize,
    },

    /// The bake configuration is unusable.
    #[error("invalid atlas configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Reasons why a cached atlas could not be read or written.
///
/// Every one of these is a cache miss from the point of view of `load_or_bake`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file is missing or could not be read or written.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// The data does not start with the atlas envelope magic.
    #[error("not an atlas envelope")]
    BadMagic,

    /// The envelope was written by an incompatible version of the format.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u32),

    /// The envelope is truncated or internally inconsistent.
    #[error("corrupt envelope: {0}")]
    Corrupt(&'static str),

    /// The envelope describes a different font, size or resolution than was requested.
    #[error("cached atlas does not match the requested font")]
    Mismatch,

    /// A glyph ID does not fit the 16-bit envelope field.
    #[error("glyph {0} cannot be stored in the envelope")]
    GlyphIdOutOfRange(u32),
}

/// Reasons why a text mesh could not be built.
#[derive(Clone, Copy, PartialEq, Debug, Error)]
pub enum MeshError {
    /// A placed glyph has no descriptor in the atlas.
    #[error("no descriptor for glyph {0}")]
    MissingGlyph(u32),

    /// The mesh would need indices beyond the 16-bit range.
    #[error("{0} glyphs exceed the 16-bit index range")]
    TooManyGlyphs(usize),
}

