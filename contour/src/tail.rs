// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Speech-bubble tails and the constraint pass that makes them fit.
//!
//! A tail is a triangle attached to one side of a rounded rectangle. The
//! wanted geometry in a [`TailStyle`] is relaxed against the available space
//! by [`constrain_shape`], producing a [`TailDescriptor`] with absolute
//! positions that [`ShapePathBuilder`](crate::ShapePathBuilder) can trust.

use peniko::kurbo::{Point, Rect, Size, Vec2};

/// Side of a rectangle a tail is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    /// Top edge; positions are measured from the left.
    Top,
    /// Right edge; positions are measured from the top.
    Right,
    /// Bottom edge; positions are measured from the left.
    #[default]
    Bottom,
    /// Left edge; positions are measured from the top.
    Left,
}

impl Side {
    /// `true` for the top and bottom sides.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Length of this side for a box of `size`.
    #[inline]
    pub fn edge_length(self, size: Size) -> f64 {
        if self.is_horizontal() {
            size.width
        } else {
            size.height
        }
    }

    /// Extent of a box of `size` perpendicular to this side.
    #[inline]
    pub fn perpendicular_extent(self, size: Size) -> f64 {
        if self.is_horizontal() {
            size.height
        } else {
            size.width
        }
    }

    /// Unit vector along the side, pointing away from the side's origin corner.
    #[inline]
    pub fn axis(self) -> Vec2 {
        if self.is_horizontal() {
            Vec2::new(1.0, 0.0)
        } else {
            Vec2::new(0.0, 1.0)
        }
    }

    /// Unit vector pointing out of the box through this side.
    #[inline]
    pub fn outward_normal(self) -> Vec2 {
        match self {
            Self::Top => Vec2::new(0.0, -1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Bottom => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// The corner of `rect` that positions along this side are measured from.
    pub fn origin_corner(self, rect: Rect) -> Point {
        match self {
            Self::Top | Self::Left => Point::new(rect.x0, rect.y0),
            Self::Right => Point::new(rect.x1, rect.y0),
            Self::Bottom => Point::new(rect.x0, rect.y1),
        }
    }
}

/// Where the tip of a tail sits along its side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TipPosition {
    /// Pixels from the side's origin corner.
    Absolute(f64),
    /// Fraction of the side length, `0.5` being the middle.
    Relative(f64),
}

impl Default for TipPosition {
    fn default() -> Self {
        Self::Relative(0.5)
    }
}

impl TipPosition {
    /// Resolve to pixels from the side's origin corner.
    #[inline]
    pub fn resolve(self, edge_length: f64) -> f64 {
        match self {
            Self::Absolute(px) => px,
            Self::Relative(fraction) => fraction * edge_length,
        }
    }
}

/// Wanted tail geometry, before it is fitted into the available bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TailStyle {
    /// Side the tail protrudes from.
    pub side: Side,
    /// Position of the tip along the side.
    pub tip: TipPosition,
    /// Width of the tail's base.
    pub width: f64,
    /// How far the tip protrudes beyond the base line.
    pub tip_distance: f64,
    /// Minimum gap between the tail's base and an adjacent corner arc.
    pub margin: f64,
}

impl Default for TailStyle {
    fn default() -> Self {
        Self {
            side: Side::Bottom,
            tip: TipPosition::default(),
            width: 20.0,
            tip_distance: 10.0,
            margin: 8.0,
        }
    }
}

/// Fitted tail geometry in absolute pixels.
///
/// Positions are relative to the body rectangle the tail is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TailDescriptor {
    /// Side the tail protrudes from.
    pub side: Side,
    /// Tip position, in pixels from the side's origin corner.
    pub tip_position: f64,
    /// Width of the tail's base.
    pub width: f64,
    /// How far the tip protrudes beyond the base line.
    pub tip_distance: f64,
    /// Minimum gap between the tail's base and an adjacent corner arc.
    pub margin: f64,
}

impl TailDescriptor {
    /// `true` if the tail has no visible extent and should not be drawn.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.tip_distance > 0.0)
    }

    /// Start and end of the tail's base, measured along the side.
    #[inline]
    pub fn footprint(&self) -> (f64, f64) {
        let half = self.width * 0.5;
        (self.tip_position - half, self.tip_position + half)
    }

    /// The part of `bounds` left for the body once the tail strip is removed.
    pub fn body_rect(&self, bounds: Rect) -> Rect {
        let d = self.tip_distance.max(0.0);
        let Rect { x0, y0, x1, y1 } = bounds;
        match self.side {
            Side::Top => Rect::new(x0, (y0 + d).min(y1), x1, y1),
            Side::Right => Rect::new(x0, y0, (x1 - d).max(x0), y1),
            Side::Bottom => Rect::new(x0, y0, x1, (y1 - d).max(y0)),
            Side::Left => Rect::new((x0 + d).min(x1), y0, x1, y1),
        }
    }

    /// The same tail described relative to a body shrunk by `inset` on every side.
    #[must_use]
    pub fn inset(&self, inset: f64) -> Self {
        Self {
            tip_position: self.tip_position - inset,
            ..*self
        }
    }
}

/// Corner radius and tail that fit into a given size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstrainedShape {
    /// Shared corner radius.
    pub radius: f64,
    /// Fitted tail.
    pub tail: TailDescriptor,
}

/// Fit a wanted corner radius and tail into a box of `size`.
///
/// The relaxation runs once, top down: the radius first, then the tail width,
/// then the tip distance, then the tip position. Each step only ever shrinks
/// a value, and never below zero. The tip is moved rigidly rather than
/// shrinking the tail further, so that after this pass the tail's base lies
/// within `[radius + margin, edge - radius - margin]` whenever the tail has
/// any width left.
pub fn constrain_shape(size: Size, radius: f64, tail: &TailStyle) -> ConstrainedShape {
    let TailStyle {
        side,
        tip,
        width: wanted_width,
        tip_distance: wanted_tip_distance,
        margin,
    } = *tail;
    let margin = margin.max(0.0);

    let mut r = radius.max(0.0);
    let overflow = (2.0 * r - size.width).max(2.0 * r - size.height);
    if overflow > 0.0 {
        r = (r - overflow * 0.5).max(0.0);
    }

    let edge = side.edge_length(size);
    let span = (edge - 2.0 * r - 2.0 * margin).max(0.0);
    let width = wanted_width.max(0.0).min(span);

    let room = (side.perpendicular_extent(size) - 2.0 * r - 2.0 * margin).max(0.0);
    let tip_distance = wanted_tip_distance.max(0.0).min(room);

    let half = width * 0.5;
    let low = r + margin + half;
    let high = edge - r - margin - half;
    let wanted_tip = tip.resolve(edge);
    let tip_position = if low <= high {
        wanted_tip.max(low).min(high)
    } else {
        edge * 0.5
    };

    if r != radius || width != wanted_width || tip_distance != wanted_tip_distance {
        tracing::debug!(
            radius = r,
            width,
            tip_distance,
            "tail geometry relaxed to fit {}x{}",
            size.width,
            size.height
        );
    }
    if tip_position != wanted_tip {
        tracing::debug!(wanted_tip, tip_position, "tail tip moved to fit");
    }

    ConstrainedShape {
        radius: r,
        tail: TailDescriptor {
            side,
            tip_position,
            width,
            tip_distance,
            margin,
        },
    }
}
