// font-atlas/src/mesh.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Quad meshes that draw laid out text out of a baked atlas.
//!
//! Each glyph becomes four vertices (top-left, bottom-left, bottom-right, top-right of its screen
//! rectangle) and two triangles, `(0, 1, 2)` and `(2, 3, 0)`, offset by the glyph's index times
//! four.

use bytemuck::{Pod, Zeroable};
use log::debug;
use pathfinder_geometry::rect::RectF;
use std::mem;

use crate::atlas::{FontAtlas, GlyphDescriptor};
use crate::error::MeshError;

/// Number of `f32`s in one vertex.
pub const VERTEX_STRIDE_FLOATS: usize = 6;

/// Byte offset of the four-component position in a vertex.
pub const POSITION_OFFSET: usize = 0;

/// Byte offset of the two-component texture coordinate in a vertex.
pub const UV_OFFSET: usize = 4 * mem::size_of::<f32>();

/// The most glyphs a mesh can hold with 16-bit indices.
pub const MAX_GLYPHS: usize = (u16::MAX as usize + 1) / 4;

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// One mesh vertex, laid out exactly as the renderer binds it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Screen position; `z` is 0 and `w` is 1.
    pub position: [f32; 4],
    /// Atlas texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    #[inline]
    fn new(x: f32, y: f32, u: f32, v: f32) -> Vertex {
        Vertex {
            position: [x, y, 0.0, 1.0],
            uv: [u, v],
        }
    }
}

/// A glyph positioned on screen by a layout or shaping step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// The glyph ID in the font the atlas was baked from.
    pub glyph_id: u32,
    /// The rectangle the glyph covers on screen, Y axis pointing down.
    pub bounds: RectF,
}

/// What to do with placed glyphs the atlas has no descriptor for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MissingGlyphPolicy {
    /// Fail the build with `MeshError::MissingGlyph`.
    Fail,
    /// Leave the glyph out of the mesh.
    Skip,
    /// Draw this glyph instead, failing if the atlas lacks it too.
    Substitute(u32),
}

impl Default for MissingGlyphPolicy {
    #[inline]
    fn default() -> MissingGlyphPolicy {
        MissingGlyphPolicy::Fail
    }
}

/// Vertex and index buffers for one string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextMesh {
    /// Four vertices per glyph.
    pub vertices: Vec<Vertex>,
    /// Six indices per glyph, a triangle list.
    pub indices: Vec<u16>,
}

impl TextMesh {
    /// The number of glyph quads in the mesh.
    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns true if the mesh draws nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The vertex buffer as flat floats, `VERTEX_STRIDE_FLOATS` per vertex.
    #[inline]
    pub fn vertex_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The vertex buffer as bytes, ready to upload.
    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as bytes, ready to upload.
    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Builds text meshes against one atlas.
#[derive(Clone, Copy, Debug)]
pub struct TextMeshBuilder<'a> {
    atlas: &'a FontAtlas,
    missing_glyph_policy: MissingGlyphPolicy,
}

impl<'a> TextMeshBuilder<'a> {
    /// Creates a builder that fails on glyphs the atlas lacks.
    pub fn new(atlas: &'a FontAtlas) -> TextMeshBuilder<'a> {
        TextMeshBuilder {
            atlas,
            missing_glyph_policy: MissingGlyphPolicy::default(),
        }
    }

    /// Sets what happens to glyphs the atlas lacks.
    #[inline]
    pub fn with_missing_glyph_policy(mut self, policy: MissingGlyphPolicy) -> TextMeshBuilder<'a> {
        self.missing_glyph_policy = policy;
        self
    }

    /// The atlas this builder reads descriptors from.
    #[inline]
    pub fn atlas(&self) -> &'a FontAtlas {
        self.atlas
    }

    /// Emits one quad per placed glyph, in order.
    pub fn build(&self, glyphs: &[PlacedGlyph]) -> Result<TextMesh, MeshError> {
        if glyphs.len() > MAX_GLYPHS {
            return Err(MeshError::TooManyGlyphs(glyphs.len()));
        }

        let mut mesh = TextMesh {
            vertices: Vec::with_capacity(glyphs.len() * 4),
            indices: Vec::with_capacity(glyphs.len() * 6),
        };
        for placed in glyphs {
            let descriptor = match self.descriptor_for(placed.glyph_id)? {
                Some(descriptor) => descriptor,
                None => continue,
            };
            push_quad(&mut mesh, placed.bounds, descriptor);
        }

        debug!("built mesh with {} of {} glyphs", mesh.glyph_count(), glyphs.len());
        Ok(mesh)
    }

    fn descriptor_for(&self, glyph_id: u32) -> Result<Option<&'a GlyphDescriptor>, MeshError> {
        if let Ok(descriptor) = self.atlas.glyph_descriptor(glyph_id) {
            return Ok(Some(descriptor));
        }
        match self.missing_glyph_policy {
            MissingGlyphPolicy::Fail => Err(MeshError::MissingGlyph(glyph_id)),
            MissingGlyphPolicy::Skip => Ok(None),
            MissingGlyphPolicy::Substitute(substitute) => self
                .atlas
                .glyph_descriptor(substitute)
                .map(Some)
                .map_err(|_| MeshError::MissingGlyph(substitute)),
        }
    }
}

fn push_quad(mesh: &mut TextMesh, bounds: RectF, descriptor: &GlyphDescriptor) {
    let base = mesh.vertices.len() as u16;
    let (u0, v0) = (descriptor.top_left_uv.x(), descriptor.top_left_uv.y());
    let (u1, v1) = (descriptor.bottom_right_uv.x(), descriptor.bottom_right_uv.y());

    mesh.vertices.extend_from_slice(&[
        Vertex::new(bounds.min_x(), bounds.min_y(), u0, v0),
        Vertex::new(bounds.min_x(), bounds.max_y(), u0, v1),
        Vertex::new(bounds.max_x(), bounds.max_y(), u1, v1),
        Vertex::new(bounds.max_x(), bounds.min_y(), u1, v0),
    ]);
    mesh.indices
        .extend(QUAD_INDICES.iter().map(|&index| base + index));
}
