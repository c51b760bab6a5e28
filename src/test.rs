// font-atlas/src/test.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::transform2d::Transform2F;
use pathfinder_geometry::vector::Vector2F;

use crate::atlas::{AtlasConfig, FontAtlas, GlyphDescriptor};
use crate::canvas::{Canvas, Grid, BACKGROUND, FOREGROUND};
use crate::distance_field::{encode_distance, DistanceFieldGenerator, BOUNDARY_VALUE};
use crate::downsample::Downsampler;
use crate::error::{AtlasError, GlyphLoadingError};
use crate::handle::FontHandle;
use crate::layout::lay_out_text;
use crate::metrics::Metrics;
use crate::outline::{Outline, OutlineBuilder, OutlineSink};
use crate::packer::AtlasPacker;
use crate::rasterizer::GlyphRasterizer;

/// A rectangle in font units: `(x_min, y_min, x_max, y_max)`.
type Rect = (f32, f32, f32, f32);

struct TestGlyph {
    character: Option<char>,
    advance: f32,
    /// The first rectangle is the ink box, later ones are holes.
    rects: Vec<Rect>,
}

/// Box-shaped glyphs with 1000 units per em, ascent 800 and descent -200.
pub(crate) struct TestFont {
    glyphs: Vec<TestGlyph>,
}

impl TestFont {
    /// `.notdef`, space, `A` (a box), `O` (a ring) and `j` (a box with a descender).
    pub(crate) fn standard() -> TestFont {
        TestFont {
            glyphs: vec![
                TestGlyph {
                    character: None,
                    advance: 600.0,
                    rects: vec![(100.0, 0.0, 500.0, 700.0)],
                },
                TestGlyph {
                    character: Some(' '),
                    advance: 250.0,
                    rects: vec![],
                },
                TestGlyph {
                    character: Some('A'),
                    advance: 600.0,
                    rects: vec![(50.0, 0.0, 550.0, 700.0)],
                },
                TestGlyph {
                    character: Some('O'),
                    advance: 700.0,
                    rects: vec![(50.0, 0.0, 650.0, 700.0), (200.0, 200.0, 500.0, 500.0)],
                },
                TestGlyph {
                    character: Some('j'),
                    advance: 400.0,
                    rects: vec![(100.0, -200.0, 300.0, 600.0)],
                },
            ],
        }
    }

    /// Just the `.notdef` box.
    pub(crate) fn single_box() -> TestFont {
        let mut font = TestFont::standard();
        font.glyphs.truncate(1);
        font
    }

    fn glyph(&self, glyph_id: u32) -> Result<&TestGlyph, GlyphLoadingError> {
        self.glyphs
            .get(glyph_id as usize)
            .ok_or(GlyphLoadingError::NoSuchGlyph)
    }
}

fn send_rect<S>(sink: &mut S, (x0, y0, x1, y1): Rect, clockwise: bool)
where
    S: OutlineSink,
{
    sink.move_to(Vector2F::new(x0, y0));
    if clockwise {
        sink.line_to(Vector2F::new(x0, y1));
        sink.line_to(Vector2F::new(x1, y1));
        sink.line_to(Vector2F::new(x1, y0));
    } else {
        sink.line_to(Vector2F::new(x1, y0));
        sink.line_to(Vector2F::new(x1, y1));
        sink.line_to(Vector2F::new(x0, y1));
    }
    sink.close();
}

impl FontHandle for TestFont {
    fn family_name(&self) -> String {
        "Test Boxes".to_owned()
    }

    fn glyph_count(&self) -> u32 {
        self.glyphs.len() as u32
    }

    fn metrics(&self) -> Metrics {
        Metrics {
            units_per_em: 1000,
            ascent: 800.0,
            descent: -200.0,
            line_gap: 0.0,
        }
    }

    fn glyph_for_char(&self, character: char) -> Option<u32> {
        self.glyphs
            .iter()
            .position(|glyph| glyph.character == Some(character))
            .map(|index| index as u32)
    }

    fn advance(&self, glyph_id: u32) -> Result<Vector2F, GlyphLoadingError> {
        Ok(Vector2F::new(self.glyph(glyph_id)?.advance, 0.0))
    }

    fn typographic_bounds(&self, glyph_id: u32) -> Result<RectF, GlyphLoadingError> {
        Ok(match self.glyph(glyph_id)?.rects.first() {
            Some(&(x0, y0, x1, y1)) => {
                RectF::from_points(Vector2F::new(x0, y0), Vector2F::new(x1, y1))
            }
            None => RectF::new(Vector2F::zero(), Vector2F::zero()),
        })
    }

    fn outline<S>(&self, glyph_id: u32, sink: &mut S) -> Result<(), GlyphLoadingError>
    where
        S: OutlineSink,
    {
        for (index, &rect) in self.glyph(glyph_id)?.rects.iter().enumerate() {
            send_rect(sink, rect, index > 0);
        }
        Ok(())
    }
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn square_canvas(size: usize, min: usize, max: usize) -> Canvas {
    let mut canvas = Canvas::blank(size).unwrap();
    for row in min..max {
        for col in min..max {
            canvas[(row, col)] = FOREGROUND;
        }
    }
    canvas
}

fn small_config() -> AtlasConfig {
    AtlasConfig::with_resolutions(128, 64).with_grow_point_size(false)
}

#[test]
pub fn grid_is_row_major() {
    let mut grid = Grid::try_new(3, 2, 0u8).unwrap();
    grid[(1, 2)] = 7;
    assert_eq!(grid.as_slice(), &[0, 0, 0, 0, 0, 7]);
    assert_eq!(grid.row(1), &[0, 0, 7]);
    assert_eq!(grid.index_of(1, 2), Some(5));
    assert_eq!(grid.index_of(2, 0), None);
    assert_eq!(grid.get(0, 3), None);
}

#[test]
pub fn grid_from_vec_checks_length() {
    assert!(Grid::from_vec(2, 2, vec![0u8; 3]).is_none());
    assert!(Grid::from_vec(2, 2, vec![0u8; 4]).is_some());
}

#[test]
pub fn outline_builder_closes_open_contours() {
    let mut builder = OutlineBuilder::new();
    builder.move_to(Vector2F::new(0.0, 0.0));
    builder.line_to(Vector2F::new(4.0, 0.0));
    builder.line_to(Vector2F::new(4.0, 3.0));
    let outline = builder.into_outline();
    assert_eq!(outline.contours.len(), 1);
    assert_eq!(outline.contours[0].positions.len(), 3);

    // Three edges, the last one closing the triangle.
    let edges = outline.flatten();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[2].to(), Vector2F::new(0.0, 0.0));
}

#[test]
pub fn outline_bounds_and_transform() {
    let mut builder = OutlineBuilder::new();
    send_rect(&mut builder, (1.0, 2.0, 5.0, 4.0), false);
    let mut outline = builder.into_outline();
    outline.transform(&Transform2F::from_translation(Vector2F::new(10.0, 0.0)));
    let bounds = outline.bounds().unwrap();
    assert_eq!(bounds.origin(), Vector2F::new(11.0, 2.0));
    assert_eq!(bounds.size(), Vector2F::new(4.0, 2.0));
    assert!(Outline::new().bounds().is_none());
}

#[test]
pub fn quadratic_curves_are_flattened_within_their_hull() {
    let mut builder = OutlineBuilder::new();
    builder.move_to(Vector2F::new(0.0, 0.0));
    builder.quadratic_curve_to(Vector2F::new(5.0, 10.0), Vector2F::new(10.0, 0.0));
    builder.close();
    let edges = builder.into_outline().flatten();
    assert!(edges.len() > 2);
    for edge in &edges {
        assert!(edge.to().y() >= 0.0 && edge.to().y() <= 5.0);
    }
}

#[test]
pub fn rasterizer_fills_pixel_centers() {
    let mut builder = OutlineBuilder::new();
    send_rect(&mut builder, (2.0, 2.0, 6.0, 5.0), false);
    let outline = builder.into_outline();

    let mut canvas = Canvas::blank(8).unwrap();
    GlyphRasterizer::new().fill_outline(&mut canvas, &outline);
    let covered = canvas.as_slice().iter().filter(|&&value| value == FOREGROUND).count();
    assert_eq!(covered, 12);
    assert_eq!(canvas[(2, 2)], FOREGROUND);
    assert_eq!(canvas[(4, 5)], FOREGROUND);
    assert_eq!(canvas[(5, 2)], BACKGROUND);
    assert_eq!(canvas[(2, 6)], BACKGROUND);
}

#[test]
pub fn rasterizer_clips_to_the_canvas() {
    let mut builder = OutlineBuilder::new();
    send_rect(&mut builder, (-4.0, -4.0, 20.0, 2.0), false);
    let mut canvas = Canvas::blank(8).unwrap();
    GlyphRasterizer::new().fill_outline(&mut canvas, &builder.into_outline());
    assert!(canvas.row(0).iter().all(|&value| value == FOREGROUND));
    assert!(canvas.row(1).iter().all(|&value| value == FOREGROUND));
    assert!(canvas.row(2).iter().all(|&value| value == BACKGROUND));
}

#[test]
pub fn rasterizer_leaves_holes_with_opposite_winding() {
    let font = TestFont::standard();
    let mut canvas = Canvas::blank(64).unwrap();
    let origin = Vector2F::new(4.0, 60.0);
    let drawn = GlyphRasterizer::new()
        .rasterize_glyph(&mut canvas, &font, 3, 50.0, origin)
        .unwrap();
    assert!(drawn);
    // Ring spans x 6.5..36.5 and y 25..60; the hole spans x 14..29 and y 35..50.
    assert_eq!(canvas[(30, 10)], FOREGROUND);
    assert_eq!(canvas[(42, 20)], BACKGROUND);
    assert_eq!(canvas[(55, 20)], FOREGROUND);
}

#[test]
pub fn rasterizing_a_space_draws_nothing() {
    let font = TestFont::standard();
    let mut canvas = Canvas::blank(16).unwrap();
    let drawn = GlyphRasterizer::new()
        .rasterize_glyph(&mut canvas, &font, 1, 12.0, Vector2F::new(2.0, 12.0))
        .unwrap();
    assert!(!drawn);
    assert!(canvas.as_slice().iter().all(|&value| value == BACKGROUND));
}

#[test]
pub fn measured_bounds_point_down_from_the_baseline() {
    let font = TestFont::standard();
    let bounds = font.measure_bounds(4, 10.0).unwrap();
    assert_close(bounds.min_x(), 1.0);
    assert_close(bounds.min_y(), -6.0);
    assert_close(bounds.max_y(), 2.0);
    assert_close(font.ascent(10.0), 8.0);
    assert_close(font.descent(10.0), 2.0);
}

#[test]
pub fn measure_string_falls_back_to_notdef() {
    let font = TestFont::standard();
    // `A` is 600 units, `?` is unmapped and measures as `.notdef` (600 units).
    let size = font.measure_string("A?", 10.0);
    assert_close(size.x(), 12.0);
    assert_close(size.y(), 10.0);
}

#[test]
pub fn frame_pixels_are_never_boundary() {
    let canvas = square_canvas(8, 0, 4);
    let generator = DistanceFieldGenerator::default();
    assert!(!generator.is_boundary(&canvas, 0, 4));
    assert!(!generator.is_boundary(&canvas, 4, 0));
    assert!(generator.is_boundary(&canvas, 3, 3));
    assert!(generator.is_boundary(&canvas, 4, 2));
    assert!(!generator.is_boundary(&canvas, 1, 1));
}

#[test]
pub fn boundary_pixels_encode_to_the_mid_value() {
    let canvas = square_canvas(32, 8, 24);
    let generator = DistanceFieldGenerator::default();
    let field = generator.generate(&canvas).unwrap();
    for row in 1..31 {
        for col in 1..31 {
            if generator.is_boundary(&canvas, row, col) {
                assert_eq!(field[(row, col)], BOUNDARY_VALUE);
            }
        }
    }
}

#[test]
pub fn distances_are_exact_along_straight_edges() {
    let canvas = square_canvas(32, 8, 24);
    let distances = DistanceFieldGenerator::default()
        .signed_distances(&canvas)
        .unwrap();
    assert_close(distances[(16, 7)], 0.0);
    assert_close(distances[(16, 8)], 0.0);
    assert_close(distances[(16, 6)], 1.0);
    assert_close(distances[(16, 4)], 3.0);
    assert_close(distances[(16, 9)], -1.0);
    assert_close(distances[(16, 12)], -4.0);
}

#[test]
pub fn distances_grow_away_from_the_outline() {
    let canvas = square_canvas(32, 8, 24);
    let field = DistanceFieldGenerator::default().generate(&canvas).unwrap();
    // Moving outward from the square's center, encoded values fall monotonically.
    let row = field.row(16);
    for col in 2..16 {
        assert!(row[col] <= row[col + 1], "column {}: {:?}", col, &row[..17]);
    }
    assert!(row[16] > BOUNDARY_VALUE);
    assert!(row[3] < BOUNDARY_VALUE);
}

#[test]
pub fn empty_canvas_encodes_to_background() {
    let canvas = Canvas::blank(16).unwrap();
    let field = DistanceFieldGenerator::default().generate(&canvas).unwrap();
    assert!(field.as_slice().iter().all(|&value| value == 0));
}

#[test]
pub fn logistic_encoding() {
    assert_eq!(encode_distance(0.0), 128);
    assert_eq!(encode_distance(-20.0), 255);
    assert_eq!(encode_distance(20.0), 0);
    assert!(encode_distance(-1.0) > encode_distance(1.0));
}

#[test]
pub fn downsampling_to_the_same_size_is_identity() {
    let field = Grid::from_vec(2, 2, vec![1u8, 2, 3, 4]).unwrap();
    let bytes = Downsampler::new().downsample(field, 2).unwrap();
    assert_eq!(bytes, vec![1, 2, 3, 4]);
}

#[test]
pub fn downsampling_a_flat_field_stays_flat() {
    let field = Grid::try_new(16, 16, 200u8).unwrap();
    let bytes = Downsampler::new().downsample(field, 4).unwrap();
    assert_eq!(bytes.len(), 16);
    assert!(bytes.iter().all(|&value| value == 200));
}

#[test]
pub fn size_search_grows_when_allowed() {
    let font = TestFont::single_box();
    let packer = AtlasPacker::new(64);
    assert!(packer.point_size_that_fits(&font, 12.0).unwrap() > 12.0);

    let packer = packer.with_grow_point_size(false);
    assert_eq!(packer.point_size_that_fits(&font, 12.0).unwrap(), 12.0);
}

#[test]
pub fn size_search_shrinks_until_it_fits() {
    let font = TestFont::standard();
    let packer = AtlasPacker::new(64).with_grow_point_size(false);
    let fitted = packer.point_size_that_fits(&font, 200.0).unwrap();
    assert!(fitted < 200.0);
    assert!(packer.is_likely_to_fit(&font, fitted));
    assert!(!packer.is_likely_to_fit(&font, fitted + 1.0));
}

#[test]
pub fn size_search_reports_an_exhausted_step_cap() {
    let font = TestFont::standard();
    let packer = AtlasPacker::new(64)
        .with_grow_point_size(false)
        .with_max_size_steps(2);
    match packer.point_size_that_fits(&font, 200.0) {
        Err(AtlasError::AtlasOverflow { .. }) => {}
        other => panic!("expected an overflow, got {:?}", other),
    }
    assert_eq!(
        packer.point_size_that_fits(&font, 0.0),
        Err(AtlasError::InvalidConfig("nominal point size must be positive"))
    );
}

#[test]
pub fn single_glyph_is_packed_on_the_first_shelf() {
    let font = TestFont::single_box();
    let packer = AtlasPacker::new(64);
    let mut canvas = Canvas::blank(64).unwrap();
    let descriptors = packer
        .pack(&font, 12.0, &mut canvas, &GlyphRasterizer::new())
        .unwrap();
    assert_eq!(descriptors.len(), 1);

    // Margin is ceil(7.2) = 8 and the shelf baseline is ceil(9.6) = 10, so the ink box lands at
    // (4, 5.6)..(8.8, 14).
    let descriptor = descriptors[0];
    assert_eq!(descriptor.glyph_id, 0);
    assert_close(descriptor.top_left_uv.x(), 4.0 / 64.0);
    assert_close(descriptor.top_left_uv.y(), 5.6 / 64.0);
    assert_close(descriptor.bottom_right_uv.x(), 8.8 / 64.0);
    assert_close(descriptor.bottom_right_uv.y(), 14.0 / 64.0);
    assert_eq!(canvas[(10, 6)], FOREGROUND);
    assert_eq!(canvas[(20, 6)], BACKGROUND);
}

#[test]
pub fn every_glyph_gets_a_descriptor() {
    let font = TestFont::standard();
    let mut canvas = Canvas::blank(256).unwrap();
    let descriptors = AtlasPacker::new(256)
        .pack(&font, 20.0, &mut canvas, &GlyphRasterizer::new())
        .unwrap();
    let ids: Vec<u32> = descriptors.iter().map(|descriptor| descriptor.glyph_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    for descriptor in &descriptors {
        for &value in &[
            descriptor.top_left_uv.x(),
            descriptor.top_left_uv.y(),
            descriptor.bottom_right_uv.x(),
            descriptor.bottom_right_uv.y(),
        ] {
            assert!(value >= 0.0 && value <= 1.0);
        }
        assert!(descriptor.top_left_uv.x() <= descriptor.bottom_right_uv.x());
        assert!(descriptor.top_left_uv.y() <= descriptor.bottom_right_uv.y());
    }
    assert!(descriptors[1].is_empty());
    assert_eq!(descriptors[1].top_left_uv, Vector2F::zero());
}

#[test]
pub fn packed_glyphs_do_not_overlap() {
    let font = TestFont::standard();
    let mut canvas = Canvas::blank(64).unwrap();
    let descriptors = AtlasPacker::new(64)
        .pack(&font, 16.0, &mut canvas, &GlyphRasterizer::new())
        .unwrap();
    let inked: Vec<&GlyphDescriptor> =
        descriptors.iter().filter(|descriptor| !descriptor.is_empty()).collect();
    for (index, a) in inked.iter().enumerate() {
        for b in &inked[index + 1..] {
            let disjoint = a.bottom_right_uv.x() <= b.top_left_uv.x()
                || b.bottom_right_uv.x() <= a.top_left_uv.x()
                || a.bottom_right_uv.y() <= b.top_left_uv.y()
                || b.bottom_right_uv.y() <= a.top_left_uv.y();
            assert!(disjoint, "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
pub fn packing_overflow_is_reported() {
    let font = TestFont::standard();
    let mut canvas = Canvas::blank(32).unwrap();
    match AtlasPacker::new(32).pack(&font, 40.0, &mut canvas, &GlyphRasterizer::new()) {
        Err(AtlasError::AtlasOverflow { .. }) => {}
        other => panic!("expected an overflow, got {:?}", other),
    }
}

#[test]
pub fn invalid_configs_are_rejected() {
    let font = TestFont::standard();
    let config = AtlasConfig::with_resolutions(64, 128);
    assert!(matches!(
        FontAtlas::bake(&font, 12.0, &config),
        Err(AtlasError::InvalidConfig(_))
    ));
    assert!(AtlasConfig::default().with_max_size_steps(0).validate().is_err());
    assert!(AtlasConfig::default().validate().is_ok());
}

#[test]
pub fn bakes_are_deterministic() {
    let font = TestFont::standard();
    let first = FontAtlas::bake(&font, 12.0, &small_config()).unwrap();
    let second = FontAtlas::bake(&font, 12.0, &small_config()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.texture_bytes().len(), 64 * 64);
    assert_eq!(first.fitted_point_size(), 12.0);
    assert_eq!(first.font_family(), "Test Boxes");
}

#[test]
pub fn baked_glyph_centers_are_inside() {
    let font = TestFont::standard();
    let atlas = FontAtlas::bake(&font, 24.0, &small_config()).unwrap();
    let resolution = atlas.storage_resolution() as f32;
    // The centre of `A` is deep inside its box, so it encodes well above the mid-value.
    let descriptor = atlas.glyph_descriptor(2).unwrap();
    let center = (descriptor.top_left_uv + descriptor.bottom_right_uv) * 0.5 * resolution;
    let texel = atlas.texture_bytes()
        [center.y() as usize * atlas.storage_resolution() as usize + center.x() as usize];
    assert!(texel > BOUNDARY_VALUE, "texel {}", texel);
}

#[test]
pub fn lookups_of_unknown_glyphs_fail() {
    let font = TestFont::standard();
    let atlas = FontAtlas::bake(&font, 12.0, &small_config()).unwrap();
    assert!(atlas.glyph_descriptor(4).is_ok());
    assert_eq!(atlas.glyph_descriptor(5), Err(AtlasError::MissingGlyph(5)));
}

#[test]
pub fn layout_skips_spaces_and_wraps() {
    let font = TestFont::standard();
    let rect = RectF::new(Vector2F::zero(), Vector2F::new(20.0, 40.0));
    let placed = lay_out_text(&font, "A A A", 10.0, rect);
    let ids: Vec<u32> = placed.iter().map(|glyph| glyph.glyph_id).collect();
    assert_eq!(ids, vec![2, 2, 2]);

    // `A ` takes 8.5 pixels, so the third `A` (at 17) would end at 23 and wraps.
    assert_close(placed[0].bounds.min_x(), 0.5);
    assert_close(placed[0].bounds.min_y(), 1.0);
    assert_close(placed[1].bounds.min_x(), 9.0);
    assert_close(placed[2].bounds.min_x(), 0.5);
    assert_close(placed[2].bounds.min_y(), 11.0);
}

#[test]
pub fn layout_stops_at_the_bottom_edge() {
    let font = TestFont::standard();
    let rect = RectF::new(Vector2F::zero(), Vector2F::new(100.0, 15.0));
    let placed = lay_out_text(&font, "A\nA\nA", 10.0, rect);
    assert_eq!(placed.len(), 1);
}
