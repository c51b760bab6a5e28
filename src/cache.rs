// font-atlas/src/cache.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The persisted atlas format and a file-backed cache built on it.
//!
//! The envelope is little-endian:
//!
//! ```text
//! magic            4 bytes  "SDFA"
//! version          u32
//! family           u32 length, then UTF-8 bytes
//! nominal size     f32
//! fitted size      f32
//! resolution       u32
//! descriptors      u32 count, then per glyph: u16 id, f32 u0, f32 v0, f32 u1, f32 v1
//! texture          u64 length, then raw bytes
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info, warn};
use pathfinder_geometry::vector::Vector2F;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::atlas::{AtlasConfig, FontAtlas, GlyphDescriptor};
use crate::error::{AtlasError, CacheError};
use crate::handle::FontHandle;

const MAGIC: &[u8; 4] = b"SDFA";

/// Version of the envelope layout written by this crate.
pub const FORMAT_VERSION: u32 = 1;

impl FontAtlas {
    /// Writes the atlas envelope.
    pub fn encode<W>(&self, writer: &mut W) -> Result<(), CacheError>
    where
        W: Write,
    {
        writer.write_all(MAGIC)?;
        writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;

        let family = self.font_family().as_bytes();
        writer.write_u32::<LittleEndian>(family.len() as u32)?;
        writer.write_all(family)?;
        writer.write_f32::<LittleEndian>(self.nominal_point_size())?;
        writer.write_f32::<LittleEndian>(self.fitted_point_size())?;
        writer.write_u32::<LittleEndian>(self.storage_resolution())?;

        let descriptors = self.glyph_descriptors();
        writer.write_u32::<LittleEndian>(descriptors.len() as u32)?;
        for descriptor in descriptors {
            if descriptor.glyph_id > u16::MAX as u32 {
                return Err(CacheError::GlyphIdOutOfRange(descriptor.glyph_id));
            }
            writer.write_u16::<LittleEndian>(descriptor.glyph_id as u16)?;
            writer.write_f32::<LittleEndian>(descriptor.top_left_uv.x())?;
            writer.write_f32::<LittleEndian>(descriptor.top_left_uv.y())?;
            writer.write_f32::<LittleEndian>(descriptor.bottom_right_uv.x())?;
            writer.write_f32::<LittleEndian>(descriptor.bottom_right_uv.y())?;
        }

        let texture = self.texture_bytes();
        writer.write_u64::<LittleEndian>(texture.len() as u64)?;
        writer.write_all(texture)?;
        Ok(())
    }

    /// Reads an atlas envelope.
    pub fn decode<R>(reader: &mut R) -> Result<FontAtlas, CacheError>
    where
        R: Read,
    {
        let mut magic = [0; 4];
        reader.read_exact(&mut magic).map_err(truncated)?;
        if &magic != MAGIC {
            return Err(CacheError::BadMagic);
        }
        let version = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        if version != FORMAT_VERSION {
            return Err(CacheError::UnsupportedVersion(version));
        }

        let family_len = reader.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let mut family = Vec::new();
        reader
            .by_ref()
            .take(family_len as u64)
            .read_to_end(&mut family)
            .map_err(truncated)?;
        if family.len() != family_len {
            return Err(CacheError::Corrupt("truncated family name"));
        }
        let font_family =
            String::from_utf8(family).map_err(|_| CacheError::Corrupt("family is not UTF-8"))?;
        let nominal_point_size = reader.read_f32::<LittleEndian>().map_err(truncated)?;
        let fitted_point_size = reader.read_f32::<LittleEndian>().map_err(truncated)?;
        let storage_resolution = reader.read_u32::<LittleEndian>().map_err(truncated)?;

        let descriptor_count = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let mut glyph_descriptors = Vec::new();
        for _ in 0..descriptor_count {
            let glyph_id = reader.read_u16::<LittleEndian>().map_err(truncated)? as u32;
            let mut uv = [0.0; 4];
            reader
                .read_f32_into::<LittleEndian>(&mut uv)
                .map_err(truncated)?;
            glyph_descriptors.push(GlyphDescriptor {
                glyph_id,
                top_left_uv: Vector2F::new(uv[0], uv[1]),
                bottom_right_uv: Vector2F::new(uv[2], uv[3]),
            });
        }

        let texture_len = reader.read_u64::<LittleEndian>().map_err(truncated)?;
        let expected_len = storage_resolution as u64 * storage_resolution as u64;
        if texture_len != expected_len {
            return Err(CacheError::Corrupt("texture size does not match resolution"));
        }
        let mut texture = Vec::new();
        reader
            .by_ref()
            .take(texture_len)
            .read_to_end(&mut texture)
            .map_err(truncated)?;
        if texture.len() as u64 != texture_len {
            return Err(CacheError::Corrupt("truncated texture"));
        }

        FontAtlas::from_parts(
            font_family,
            nominal_point_size,
            fitted_point_size,
            storage_resolution,
            glyph_descriptors,
            texture,
        )
        .map_err(|_| CacheError::Corrupt("inconsistent atlas"))
    }
}

fn truncated(error: io::Error) -> CacheError {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        CacheError::Corrupt("unexpected end of envelope")
    } else {
        CacheError::Io(error)
    }
}

/// Identifies one cached atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheKey {
    /// Family name of the font.
    pub font_family: String,
    /// Requested point size.
    pub nominal_point_size: f32,
    /// Side length of the stored texture.
    pub storage_resolution: u32,
}

impl CacheKey {
    /// The key an atlas was stored under.
    pub fn for_atlas(atlas: &FontAtlas) -> CacheKey {
        CacheKey {
            font_family: atlas.font_family().to_owned(),
            nominal_point_size: atlas.nominal_point_size(),
            storage_resolution: atlas.storage_resolution(),
        }
    }

    /// Returns true if `atlas` was baked for this key.
    pub fn matches(&self, atlas: &FontAtlas) -> bool {
        *self == CacheKey::for_atlas(atlas)
    }

    fn file_name(&self) -> String {
        let family: String = self
            .font_family
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!(
            "{}-{}-{}.sdfa",
            family,
            self.nominal_point_size.to_bits(),
            self.storage_resolution
        )
    }
}

/// How `AtlasCache::load_or_bake` produced its atlas.
#[derive(Debug)]
pub enum CacheOutcome {
    /// The atlas came from the cache.
    Restored,
    /// The atlas was baked; `write` reports whether storing it in the cache worked.
    Baked {
        /// Result of the cache write that followed the bake.
        write: Result<PathBuf, CacheError>,
    },
}

/// Stores atlas envelopes as files in one directory.
#[derive(Clone, Debug)]
pub struct AtlasCache {
    directory: PathBuf,
}

impl AtlasCache {
    /// Creates a cache rooted at `directory`. Nothing is touched on disk until a store.
    pub fn new<P>(directory: P) -> AtlasCache
    where
        P: Into<PathBuf>,
    {
        AtlasCache {
            directory: directory.into(),
        }
    }

    /// A cache in the platform's per-user cache directory, if there is one.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn in_user_cache_dir() -> Option<AtlasCache> {
        dirs_next::cache_dir().map(|dir| AtlasCache::new(dir.join("font-atlas")))
    }

    /// The directory envelopes are stored in.
    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The file an atlas with this key is stored in.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(key.file_name())
    }

    /// Reads the atlas stored under `key`.
    pub fn load(&self, key: &CacheKey) -> Result<FontAtlas, CacheError> {
        let path = self.path_for(key);
        let mut reader = BufReader::new(File::open(&path)?);
        let atlas = FontAtlas::decode(&mut reader)?;
        if !key.matches(&atlas) {
            return Err(CacheError::Mismatch);
        }
        debug!("loaded cached atlas from {}", path.display());
        Ok(atlas)
    }

    /// Writes `atlas` to the cache, replacing any previous entry for the same key.
    ///
    /// The envelope goes to a temporary file first and is renamed into place, so readers never
    /// see a partial file.
    pub fn store(&self, atlas: &FontAtlas) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(&CacheKey::for_atlas(atlas));
        let temp_path = path.with_extension("sdfa.tmp");
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            atlas.encode(&mut writer)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;
        debug!("stored atlas in {}", path.display());
        Ok(path)
    }

    /// Restores the atlas for `font` at `nominal_point_size` from the cache, or bakes it.
    ///
    /// Any failure to load is a cache miss. After a fresh bake the atlas is stored, and the
    /// result of that write is reported in the outcome rather than failing the call.
    pub fn load_or_bake<F>(
        &self,
        font: &F,
        nominal_point_size: f32,
        config: &AtlasConfig,
    ) -> Result<(FontAtlas, CacheOutcome), AtlasError>
    where
        F: FontHandle,
    {
        let key = CacheKey {
            font_family: font.family_name(),
            nominal_point_size,
            storage_resolution: config.storage_resolution,
        };
        match self.load(&key) {
            Ok(atlas) => {
                info!("restored atlas for {} from cache", key.font_family);
                return Ok((atlas, CacheOutcome::Restored));
            }
            Err(error) => warn!("atlas cache miss for {}: {}", key.font_family, error),
        }

        let atlas = FontAtlas::bake(font, nominal_point_size, config)?;
        let write = self.store(&atlas);
        if let Err(ref error) = write {
            warn!("failed to cache atlas for {}: {}", key.font_family, error);
        }
        Ok((atlas, CacheOutcome::Baked { write }))
    }
}
