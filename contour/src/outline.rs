// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed outlines of corner-masked rectangles, optionally with a tail.

use core::f64::consts::{FRAC_PI_2, PI};

use peniko::kurbo::{Arc, BezPath, Point, Rect, Shape, Vec2};
use smallvec::SmallVec;

#[cfg(all(not(feature = "std"), not(test)))]
use crate::floatfuncs::FloatFuncs;

use crate::{
    corner::{Corner, CornerMask},
    tail::{Side, TailDescriptor},
};

/// One segment of an [`Outline`], continuing from the previous end point.
#[derive(Clone, Debug)]
pub enum OutlineSeg {
    /// Straight line to a point.
    Line(Point),
    /// Circular arc; its start is the previous end point.
    Arc(Arc),
}

impl OutlineSeg {
    /// Point where this segment ends.
    pub fn end(&self) -> Point {
        match self {
            Self::Line(p) => *p,
            Self::Arc(a) => a.center + Vec2::from_angle(a.start_angle + a.sweep_angle) * a.radii.x,
        }
    }

    fn translate(&mut self, offset: Vec2) {
        match self {
            Self::Line(p) => *p += offset,
            Self::Arc(a) => a.center += offset,
        }
    }
}

/// A closed boundary made of lines and quarter-circle arcs.
#[derive(Clone, Debug, Default)]
pub struct Outline {
    start: Point,
    segments: SmallVec<[OutlineSeg; 11]>,
}

impl Outline {
    /// `true` for the outline of a degenerate box.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First point of the outline.
    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    /// Segments in drawing order.
    #[inline]
    pub fn segments(&self) -> &[OutlineSeg] {
        &self.segments
    }

    /// End point of the last segment.
    pub fn end_point(&self) -> Point {
        self.segments.last().map_or(self.start, OutlineSeg::end)
    }

    /// `true` if the last segment ends where the first one starts.
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && (self.end_point() - self.start).hypot2() < 1e-12
    }

    /// Number of straight segments.
    pub fn line_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, OutlineSeg::Line(_)))
            .count()
    }

    /// Number of arc segments.
    pub fn arc_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, OutlineSeg::Arc(_)))
            .count()
    }

    /// Move every point of the outline by `offset`.
    #[must_use]
    pub fn translate(mut self, offset: Vec2) -> Self {
        self.start += offset;
        for seg in &mut self.segments {
            seg.translate(offset);
        }
        self
    }

    /// Convert to a closed [`BezPath`], approximating arcs with cubic Béziers.
    pub fn to_bez_path(&self, tolerance: f64) -> BezPath {
        let mut path = BezPath::new();
        if self.is_empty() {
            return path;
        }
        path.move_to(self.start);
        for seg in &self.segments {
            match seg {
                OutlineSeg::Line(p) => path.line_to(*p),
                OutlineSeg::Arc(a) => path.extend(a.append_iter(tolerance)),
            }
        }
        path.close_path();
        path
    }

    /// Enclosed area of the flattened outline.
    pub fn area(&self, tolerance: f64) -> f64 {
        self.to_bez_path(tolerance).area().abs()
    }

    /// Tight bounding box of the outline.
    pub fn bounding_box(&self, tolerance: f64) -> Rect {
        self.to_bez_path(tolerance).bounding_box()
    }

    fn push(&mut self, seg: OutlineSeg) {
        self.segments.push(seg);
    }
}

/// Builds [`Outline`]s for boxes with selectively rounded corners.
///
/// The outline starts on the top edge and walks clockwise on screen
/// (y pointing down): top, right, bottom, left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapePathBuilder {
    /// Uniform shift applied to the whole outline.
    ///
    /// `0.5` places strokes on pixel centers for rasterizers that show seams
    /// on shared pixel boundaries. Vector backends should leave this at zero.
    pub pixel_offset: f64,
    /// Accuracy used when arcs and ovals are flattened into Béziers.
    pub tolerance: f64,
}

impl Default for ShapePathBuilder {
    fn default() -> Self {
        Self {
            pixel_offset: 0.0,
            tolerance: 0.1,
        }
    }
}

/// Far corner, walking direction and arc start angle for each side, clockwise from the top.
const WALK: [(Side, Corner, Vec2, f64); 4] = [
    (Side::Top, Corner::TopRight, Vec2::new(1.0, 0.0), 1.5 * PI),
    (Side::Right, Corner::BottomRight, Vec2::new(0.0, 1.0), 0.0),
    (Side::Bottom, Corner::BottomLeft, Vec2::new(-1.0, 0.0), FRAC_PI_2),
    (Side::Left, Corner::TopLeft, Vec2::new(0.0, -1.0), PI),
];

impl ShapePathBuilder {
    /// Make a builder with the given pixel offset.
    pub fn with_pixel_offset(pixel_offset: f64) -> Self {
        Self {
            pixel_offset,
            ..Self::default()
        }
    }

    /// Radius actually used for `bounds`: never negative, never more than half
    /// the shorter side.
    #[inline]
    pub fn effective_radius(bounds: Rect, radius: f64) -> f64 {
        radius
            .max(0.0)
            .min(bounds.width().min(bounds.height()) * 0.5)
            .max(0.0)
    }

    /// Build the closed outline of `bounds` with the corners in `mask` rounded by `radius`.
    ///
    /// A tail, if given, must already have been fitted with
    /// [`constrain_shape`](crate::constrain_shape); it is positioned relative
    /// to `bounds` and protrudes outward from it. Boxes without positive
    /// width and height produce an empty outline.
    pub fn build_outline(
        &self,
        bounds: Rect,
        radius: f64,
        mask: CornerMask,
        tail: Option<&TailDescriptor>,
    ) -> Outline {
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            tracing::trace!(?bounds, "no outline for degenerate bounds");
            return Outline::default();
        }
        let r = Self::effective_radius(bounds, radius);
        let tail = tail.filter(|t| {
            if t.is_degenerate() {
                return false;
            }
            let (lo, hi) = t.footprint();
            let (start, end) = straight_span(bounds, r, mask, t.side);
            let fits = lo >= start - 1e-6 && hi <= end + 1e-6;
            if !fits {
                tracing::error!(
                    ?t,
                    start,
                    end,
                    "tail extends past the straight part of its side; drawing without it"
                );
            }
            fits
        });

        let corner = |c: Corner| match c {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
        };

        let mut outline = Outline {
            start: corner(Corner::TopLeft) + Vec2::new(mask.radius_at(Corner::TopLeft, r), 0.0),
            segments: SmallVec::new(),
        };

        for (side, far, dir, start_angle) in WALK {
            if let Some(t) = tail.filter(|t| t.side == side) {
                push_tail(&mut outline, bounds, t, dir);
            }
            let far_r = mask.radius_at(far, r);
            let normal = side.outward_normal();
            let far_point = corner(far);
            outline.push(OutlineSeg::Line(far_point - dir * far_r));
            if far_r > 0.0 {
                outline.push(OutlineSeg::Arc(Arc {
                    center: far_point - dir * far_r - normal * far_r,
                    radii: Vec2::new(far_r, far_r),
                    start_angle,
                    sweep_angle: FRAC_PI_2,
                    x_rotation: 0.0,
                }));
            }
        }

        if self.pixel_offset != 0.0 {
            outline = outline.translate(Vec2::new(self.pixel_offset, self.pixel_offset));
        }
        outline
    }

    /// Same as [`build_outline`](Self::build_outline), converted to a [`BezPath`].
    pub fn build_path(
        &self,
        bounds: Rect,
        radius: f64,
        mask: CornerMask,
        tail: Option<&TailDescriptor>,
    ) -> BezPath {
        self.build_outline(bounds, radius, mask, tail)
            .to_bez_path(self.tolerance)
    }
}

/// The straight run of `side`, in pixels from the side's origin corner.
fn straight_span(bounds: Rect, r: f64, mask: CornerMask, side: Side) -> (f64, f64) {
    let (first, second) = match side {
        Side::Top => (Corner::TopLeft, Corner::TopRight),
        Side::Right => (Corner::TopRight, Corner::BottomRight),
        Side::Bottom => (Corner::BottomLeft, Corner::BottomRight),
        Side::Left => (Corner::TopLeft, Corner::BottomLeft),
    };
    let edge = side.edge_length(bounds.size());
    (mask.radius_at(first, r), edge - mask.radius_at(second, r))
}

fn push_tail(outline: &mut Outline, bounds: Rect, tail: &TailDescriptor, dir: Vec2) {
    let origin = tail.side.origin_corner(bounds);
    let axis = tail.side.axis();
    let (lo, hi) = tail.footprint();
    let base_lo = origin + axis * lo;
    let base_hi = origin + axis * hi;
    let tip = origin + axis * tail.tip_position + tail.side.outward_normal() * tail.tip_distance;
    // Bottom and left sides are walked against their measuring axis.
    let (first, last) = if dir.dot(axis) > 0.0 {
        (base_lo, base_hi)
    } else {
        (base_hi, base_lo)
    };
    outline.push(OutlineSeg::Line(first));
    outline.push(OutlineSeg::Line(tip));
    outline.push(OutlineSeg::Line(last));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tail::{constrain_shape, TailStyle, TipPosition};
    use peniko::kurbo::Size;

    const TOL: f64 = 0.01;

    fn rect(w: f64, h: f64) -> Rect {
        Rect::new(0.0, 0.0, w, h)
    }

    #[test]
    fn sharp_corners_give_plain_rectangle() {
        let outline =
            ShapePathBuilder::default().build_outline(rect(100.0, 60.0), 10.0, CornerMask::NO_CORNERS, None);
        assert_eq!(outline.line_count(), 4);
        assert_eq!(outline.arc_count(), 0);
        assert!(outline.is_closed());
        let corners: Vec<Point> = outline.segments().iter().map(OutlineSeg::end).collect();
        assert_eq!(
            corners,
            [
                Point::new(100.0, 0.0),
                Point::new(100.0, 60.0),
                Point::new(0.0, 60.0),
                Point::new(0.0, 0.0),
            ]
        );
        assert!((outline.area(TOL) - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn all_corners_give_four_quarter_arcs() {
        let outline =
            ShapePathBuilder::default().build_outline(rect(100.0, 60.0), 10.0, CornerMask::ALL_CORNERS, None);
        assert_eq!(outline.line_count(), 4);
        assert_eq!(outline.arc_count(), 4);
        for seg in outline.segments() {
            if let OutlineSeg::Arc(a) = seg {
                assert_eq!(a.sweep_angle, FRAC_PI_2);
            }
        }
        assert!(outline.is_closed());
        assert_eq!(outline.start(), Point::new(10.0, 0.0));
    }

    #[test]
    fn rounded_area_matches_corner_cutouts() {
        let outline =
            ShapePathBuilder::default().build_outline(rect(100.0, 60.0), 10.0, CornerMask::ALL_CORNERS, None);
        let quarter = PI * 100.0 / 4.0;
        let expected = 6000.0 - 4.0 * (100.0 - quarter);
        let area = outline.area(TOL);
        assert!((area - expected).abs() < 0.5, "area {area} vs {expected}");
        assert!((area - 5914.0).abs() < 1.0);
    }

    #[test]
    fn oversized_radius_clamps_to_half_short_side() {
        let bounds = rect(50.0, 30.0);
        assert_eq!(ShapePathBuilder::effective_radius(bounds, 40.0), 15.0);
        let outline = ShapePathBuilder::default().build_outline(bounds, 40.0, CornerMask::ALL_CORNERS, None);
        for seg in outline.segments() {
            if let OutlineSeg::Arc(a) = seg {
                assert_eq!(a.radii.x, 15.0);
            }
        }
    }

    #[test]
    fn outline_stays_inside_bounds() {
        for (w, h) in [(100.0, 60.0), (50.0, 30.0), (7.0, 90.0), (1.0, 1.0)] {
            for r in [0.0, 3.0, 10.0, 40.0, 1000.0] {
                for bits in 0..16_u8 {
                    let mask = CornerMask::from_bits_truncate(bits);
                    let outline = ShapePathBuilder::default().build_outline(rect(w, h), r, mask, None);
                    let bb = outline.bounding_box(TOL);
                    assert!(bb.x0 >= -1e-6 && bb.y0 >= -1e-6, "{bb:?}");
                    assert!(bb.x1 <= w + 1e-6 && bb.y1 <= h + 1e-6, "{bb:?}");
                    assert!(outline.is_closed());
                    assert_eq!(outline.line_count(), 4);
                    let rounded = if r > 0.0 { mask.bits().count_ones() } else { 0 };
                    assert_eq!(outline.arc_count(), rounded as usize);
                }
            }
        }
    }

    #[test]
    fn degenerate_bounds_produce_nothing() {
        let builder = ShapePathBuilder::default();
        assert!(builder.build_outline(rect(0.0, 10.0), 2.0, CornerMask::ALL_CORNERS, None).is_empty());
        assert!(builder.build_outline(rect(10.0, 0.0), 2.0, CornerMask::ALL_CORNERS, None).is_empty());
        assert!(builder.build_path(rect(0.0, 0.0), 2.0, CornerMask::ALL_CORNERS, None).is_empty());
    }

    #[test]
    fn pixel_offset_shifts_everything() {
        let plain = ShapePathBuilder::default().build_outline(rect(20.0, 20.0), 4.0, CornerMask::TOP, None);
        let shifted = ShapePathBuilder::with_pixel_offset(0.5).build_outline(rect(20.0, 20.0), 4.0, CornerMask::TOP, None);
        let offset = Vec2::new(0.5, 0.5);
        assert_eq!(shifted.start(), plain.start() + offset);
        assert!((shifted.end_point() - (plain.end_point() + offset)).hypot() < 1e-9);
    }

    #[test]
    fn bottom_tail_inserts_triangle() {
        let bounds = rect(100.0, 60.0);
        let style = TailStyle {
            side: Side::Bottom,
            tip: TipPosition::Relative(0.5),
            width: 20.0,
            tip_distance: 15.0,
            margin: 8.0,
        };
        let c = constrain_shape(bounds.size(), 10.0, &style);
        let body = c.tail.body_rect(bounds);
        let outline = ShapePathBuilder::default().build_outline(body, c.radius, CornerMask::ALL_CORNERS, Some(&c.tail));
        assert_eq!(outline.line_count(), 7);
        assert_eq!(outline.arc_count(), 4);
        assert!(outline.is_closed());
        let points: Vec<Point> = outline.segments().iter().map(OutlineSeg::end).collect();
        // After the bottom right arc the walk heads left: base end, tip, base start.
        assert_eq!(points[4], Point::new(60.0, 45.0));
        assert_eq!(points[5], Point::new(50.0, 60.0));
        assert_eq!(points[6], Point::new(40.0, 45.0));
        let bb = outline.bounding_box(TOL);
        assert!((bb.y1 - 60.0).abs() < 1e-9);
        // Body is 100x45 with four rounded corners, plus the triangle.
        let expected = 4500.0 - 4.0 * (100.0 - PI * 25.0) + 0.5 * 20.0 * 15.0;
        assert!((outline.area(TOL) - expected).abs() < 1.0);
    }

    #[test]
    fn side_tails_point_outward() {
        let size = Size::new(80.0, 120.0);
        for side in [Side::Top, Side::Right, Side::Left] {
            let style = TailStyle {
                side,
                tip: TipPosition::Relative(0.5),
                width: 12.0,
                tip_distance: 10.0,
                margin: 4.0,
            };
            let c = constrain_shape(size, 8.0, &style);
            let bounds = Rect::from_origin_size(Point::ORIGIN, size);
            let outline = ShapePathBuilder::default().build_outline(
                c.tail.body_rect(bounds),
                c.radius,
                CornerMask::ALL_CORNERS,
                Some(&c.tail),
            );
            let bb = outline.bounding_box(TOL);
            assert!((bb.x0 - 0.0).abs() < 1e-9 && (bb.y0 - 0.0).abs() < 1e-9, "{side:?}: {bb:?}");
            assert!((bb.x1 - 80.0).abs() < 1e-9 && (bb.y1 - 120.0).abs() < 1e-9, "{side:?}: {bb:?}");
            assert_eq!(outline.line_count(), 7);
        }
    }

    #[test]
    fn unfitted_tail_is_dropped() {
        let tail = TailDescriptor {
            side: Side::Top,
            tip_position: 3.0,
            width: 20.0,
            tip_distance: 10.0,
            margin: 0.0,
        };
        let outline = ShapePathBuilder::default().build_outline(rect(100.0, 60.0), 10.0, CornerMask::ALL_CORNERS, Some(&tail));
        assert_eq!(outline.line_count(), 4);
    }

    #[test]
    fn zero_width_tail_is_not_drawn() {
        let tail = TailDescriptor {
            side: Side::Left,
            tip_position: 30.0,
            width: 0.0,
            tip_distance: 10.0,
            margin: 0.0,
        };
        let outline = ShapePathBuilder::default().build_outline(rect(100.0, 60.0), 10.0, CornerMask::ALL_CORNERS, Some(&tail));
        assert_eq!(outline.line_count(), 4);
    }
}
