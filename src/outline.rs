// font-atlas/src/outline.rs
//
// Copyright © 2020 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bézier glyph outlines, and their reduction to line segments for rasterization.

use bitflags::bitflags;
use pathfinder_geometry::line_segment::LineSegment2F;
use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::transform2d::Transform2F;
use pathfinder_geometry::vector::Vector2F;
use std::mem;

/// Maximum distance, in pixels, between a curve and the polyline that replaces it.
const FLATTENING_TOLERANCE: f32 = 0.2;

/// Upper bound on the number of line segments a single curve is split into.
const MAX_CURVE_SUBDIVISIONS: u32 = 64;

/// Receives Bézier path rendering commands.
pub trait OutlineSink {
    /// Moves the pen to a point.
    fn move_to(&mut self, to: Vector2F);
    /// Draws a line to a point.
    fn line_to(&mut self, to: Vector2F);
    /// Draws a quadratic Bézier curve to a point.
    fn quadratic_curve_to(&mut self, ctrl: Vector2F, to: Vector2F);
    /// Draws a cubic Bézier curve to a point.
    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F);
    /// Closes the path, returning to the first point in it.
    fn close(&mut self);
}

/// A glyph vector outline or path.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Outline {
    /// The individual subpaths that make up this outline.
    pub contours: Vec<Contour>,
}

/// A single curve or subpath within a glyph outline.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Contour {
    /// Positions of each point.
    ///
    /// This must have the same length as the `flags` field.
    pub positions: Vec<Vector2F>,
    /// Flags that specify what type of point the corresponding position represents.
    ///
    /// This must have the same length as the `positions` field.
    pub flags: Vec<PointFlags>,
}

bitflags! {
    /// Flags that specify what type of point the corresponding position represents.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PointFlags: u8 {
        /// This point is the control point of a quadratic Bézier curve or the first control point
        /// of a cubic Bézier curve.
        const CONTROL_POINT_0 = 0x01;
        /// This point is the second control point of a cubic Bézier curve.
        const CONTROL_POINT_1 = 0x02;
    }
}

impl Outline {
    /// Creates a new empty outline.
    #[inline]
    pub fn new() -> Outline {
        Outline { contours: vec![] }
    }

    /// Returns true if the outline has no points at all, like the outline of a space.
    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(|contour| contour.positions.is_empty())
    }

    /// Sends this outline to an `OutlineSink`.
    pub fn copy_to<S>(&self, sink: &mut S)
    where
        S: OutlineSink,
    {
        for contour in &self.contours {
            contour.copy_to(sink);
        }
    }

    /// Applies an affine transform to every point, control points included.
    pub fn transform(&mut self, transform: &Transform2F) {
        for contour in &mut self.contours {
            for position in &mut contour.positions {
                *position = *transform * *position;
            }
        }
    }

    /// Returns the smallest rectangle containing every point of the outline, or `None` if the
    /// outline is empty.
    ///
    /// Control points are included, so this may be slightly larger than the ink bounds.
    pub fn bounds(&self) -> Option<RectF> {
        let mut points = self.contours.iter().flat_map(|contour| contour.positions.iter());
        let first = *points.next()?;
        let (mut min, mut max) = (first, first);
        for &point in points {
            min = min.min(point);
            max = max.max(point);
        }
        Some(RectF::from_points(min, max))
    }

    /// Replaces every curve with a polyline and returns the closed edges of the outline.
    pub fn flatten(&self) -> Vec<LineSegment2F> {
        let mut flattener = Flattener::default();
        self.copy_to(&mut flattener);
        flattener.edges
    }
}

impl Contour {
    /// Creates a new empty contour.
    #[inline]
    pub fn new() -> Contour {
        Contour {
            positions: vec![],
            flags: vec![],
        }
    }

    /// Adds a new point with the given flags to the contour.
    #[inline]
    pub fn push(&mut self, position: Vector2F, flags: PointFlags) {
        self.positions.push(position);
        self.flags.push(flags);
    }

    /// Sends this contour to an `OutlineSink`.
    ///
    /// A dangling control point at the end of a malformed contour is treated as an on-curve
    /// point.
    pub fn copy_to<S>(&self, sink: &mut S)
    where
        S: OutlineSink,
    {
        debug_assert_eq!(self.positions.len(), self.flags.len());
        if self.positions.is_empty() {
            return;
        }
        sink.move_to(self.positions[0]);

        let mut iter = self.positions[1..].iter().zip(self.flags[1..].iter());
        while let Some((&position_0, flags_0)) = iter.next() {
            if flags_0.is_empty() {
                sink.line_to(position_0);
                continue;
            }

            let (&position_1, flags_1) = match iter.next() {
                Some(point) => point,
                None => {
                    sink.line_to(position_0);
                    break;
                }
            };
            if flags_1.is_empty() {
                sink.quadratic_curve_to(position_0, position_1);
                continue;
            }

            match iter.next() {
                Some((&position_2, _)) => {
                    sink.cubic_curve_to(LineSegment2F::new(position_0, position_1), position_2)
                }
                None => {
                    sink.quadratic_curve_to(position_0, position_1);
                    break;
                }
            }
        }

        sink.close();
    }
}

/// Accumulates Bézier path rendering commands into an `Outline` structure.
#[derive(Clone, Debug, Default)]
pub struct OutlineBuilder {
    outline: Outline,
    current_contour: Contour,
}

impl OutlineBuilder {
    /// Creates a new empty `OutlineBuilder`.
    #[inline]
    pub fn new() -> OutlineBuilder {
        OutlineBuilder::default()
    }

    /// Consumes this outline builder and returns the resulting outline.
    ///
    /// A contour that was never closed is closed implicitly.
    pub fn into_outline(mut self) -> Outline {
        if !self.current_contour.positions.is_empty() {
            self.close();
        }
        self.outline
    }
}

impl OutlineSink for OutlineBuilder {
    #[inline]
    fn move_to(&mut self, to: Vector2F) {
        if !self.current_contour.positions.is_empty() {
            self.close();
        }
        self.current_contour.push(to, PointFlags::empty());
    }

    #[inline]
    fn line_to(&mut self, to: Vector2F) {
        self.current_contour.push(to, PointFlags::empty());
    }

    #[inline]
    fn quadratic_curve_to(&mut self, ctrl: Vector2F, to: Vector2F) {
        self.current_contour.push(ctrl, PointFlags::CONTROL_POINT_0);
        self.current_contour.push(to, PointFlags::empty());
    }

    #[inline]
    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
        self.current_contour
            .push(ctrl.from(), PointFlags::CONTROL_POINT_0);
        self.current_contour
            .push(ctrl.to(), PointFlags::CONTROL_POINT_1);
        self.current_contour.push(to, PointFlags::empty());
    }

    #[inline]
    fn close(&mut self) {
        if self.current_contour.positions.is_empty() {
            return;
        }
        self.outline
            .contours
            .push(mem::replace(&mut self.current_contour, Contour::new()));
    }
}

/// Turns path commands into closed polylines.
struct Flattener {
    edges: Vec<LineSegment2F>,
    contour_start: Option<Vector2F>,
    pen: Vector2F,
}

impl Default for Flattener {
    fn default() -> Flattener {
        Flattener {
            edges: vec![],
            contour_start: None,
            pen: Vector2F::zero(),
        }
    }
}

impl Flattener {
    fn push_edge(&mut self, to: Vector2F) {
        if self.pen != to {
            self.edges.push(LineSegment2F::new(self.pen, to));
        }
        self.pen = to;
    }

    fn subdivisions(hull_length: f32) -> u32 {
        let count = (hull_length / FLATTENING_TOLERANCE).sqrt().ceil();
        (count as u32).max(1).min(MAX_CURVE_SUBDIVISIONS)
    }
}

impl OutlineSink for Flattener {
    fn move_to(&mut self, to: Vector2F) {
        self.close();
        self.contour_start = Some(to);
        self.pen = to;
    }

    fn line_to(&mut self, to: Vector2F) {
        self.push_edge(to);
    }

    fn quadratic_curve_to(&mut self, ctrl: Vector2F, to: Vector2F) {
        let from = self.pen;
        let hull = (ctrl - from).length() + (to - ctrl).length();
        let steps = Flattener::subdivisions(hull);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let mt = 1.0 - t;
            let point = from * (mt * mt) + ctrl * (2.0 * mt * t) + to * (t * t);
            self.push_edge(point);
        }
    }

    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
        let from = self.pen;
        let (ctrl_0, ctrl_1) = (ctrl.from(), ctrl.to());
        let hull = (ctrl_0 - from).length() + (ctrl_1 - ctrl_0).length() + (to - ctrl_1).length();
        let steps = Flattener::subdivisions(hull);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let mt = 1.0 - t;
            let point = from * (mt * mt * mt)
                + ctrl_0 * (3.0 * mt * mt * t)
                + ctrl_1 * (3.0 * mt * t * t)
                + to * (t * t * t);
            self.push_edge(point);
        }
    }

    fn close(&mut self) {
        if let Some(start) = self.contour_start.take() {
            self.push_edge(start);
        }
    }
}
