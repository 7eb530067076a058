// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{BezPath, Ellipse, Point, Rect, Shape, Size};

use crate::{corner::CornerMask, outline::ShapePathBuilder};

/// The shape a layer fills, strokes or blurs within its bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ShapeKind {
    /// The bounds themselves.
    #[default]
    Rectangle,
    /// The bounds with every corner rounded.
    RoundedRectangle {
        /// Corner radius, clamped to half the shorter side.
        radius: f64,
    },
    /// Ellipse inscribed in the bounds.
    Oval,
    /// Arbitrary path in layer-local coordinates, drawn as given.
    CustomPath(BezPath),
    /// The bounds with only the corners in `mask` rounded.
    CornerMaskedRect {
        /// Corner radius, clamped to half the shorter side.
        radius: f64,
        /// Corners to round.
        mask: CornerMask,
    },
}

impl From<BezPath> for ShapeKind {
    fn from(path: BezPath) -> Self {
        Self::CustomPath(path)
    }
}

impl ShapeKind {
    /// `true` if a fill of this shape covers its whole bounds.
    pub fn covers_bounds(&self) -> bool {
        match self {
            Self::Rectangle => true,
            Self::RoundedRectangle { radius } | Self::CornerMaskedRect { radius, .. } => {
                *radius <= 0.0
            }
            Self::Oval | Self::CustomPath(_) => false,
        }
    }

    /// Build the path of this shape for `rect`, pulled in by `inset` on every side.
    ///
    /// Radii shrink along with the inset so that corners stay concentric.
    /// Custom paths ignore the inset.
    pub fn to_path(&self, rect: Rect, inset: f64, builder: &ShapePathBuilder) -> BezPath {
        let inner = Rect::new(
            rect.x0 + inset,
            rect.y0 + inset,
            rect.x1 - inset,
            rect.y1 - inset,
        );
        let degenerate = !(inner.width() > 0.0 && inner.height() > 0.0);
        match self {
            Self::CustomPath(path) => path.clone(),
            _ if degenerate => BezPath::new(),
            Self::Rectangle => builder.build_path(inner, 0.0, CornerMask::NO_CORNERS, None),
            Self::RoundedRectangle { radius } => {
                builder.build_path(inner, radius - inset, CornerMask::ALL_CORNERS, None)
            }
            Self::CornerMaskedRect { radius, mask } => {
                builder.build_path(inner, radius - inset, *mask, None)
            }
            Self::Oval => Ellipse::from_rect(inner).to_path(builder.tolerance),
        }
    }
}

/// Active [`ShapeKind`] of a layer together with its cached path.
///
/// Every setter rebuilds the path immediately, so drawing only ever reads it.
#[derive(Clone, Debug, Default)]
pub struct ShapeState {
    kind: ShapeKind,
    size: Size,
    inset: f64,
    builder: ShapePathBuilder,
    path: BezPath,
}

impl ShapeState {
    /// Make a shape state of `kind` with an empty size.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Active shape.
    #[inline]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Size the path was built for.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Cached path in layer-local coordinates.
    #[inline]
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Select the shape.
    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
        self.rebuild();
    }

    /// Select [`ShapeKind::Rectangle`].
    pub fn set_shape_rect(&mut self) {
        self.set_kind(ShapeKind::Rectangle);
    }

    /// Select [`ShapeKind::RoundedRectangle`].
    pub fn set_shape_rounded_rect(&mut self, radius: f64) {
        self.set_kind(ShapeKind::RoundedRectangle { radius });
    }

    /// Select [`ShapeKind::Oval`].
    pub fn set_shape_oval(&mut self) {
        self.set_kind(ShapeKind::Oval);
    }

    /// Select [`ShapeKind::CustomPath`].
    pub fn set_shape_custom_path(&mut self, path: BezPath) {
        self.set_kind(ShapeKind::CustomPath(path));
    }

    /// Select [`ShapeKind::CornerMaskedRect`].
    pub fn set_shape_corner_masked(&mut self, radius: f64, mask: CornerMask) {
        self.set_kind(ShapeKind::CornerMaskedRect { radius, mask });
    }

    /// Resize; returns `false` if the size did not change.
    pub fn set_size(&mut self, size: Size) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        self.rebuild();
        true
    }

    /// Pull the shape in by `inset` on every side.
    pub fn set_inset(&mut self, inset: f64) {
        if inset != self.inset {
            self.inset = inset;
            self.rebuild();
        }
    }

    /// Replace the path builder, e.g. to enable the half-pixel shift.
    pub fn set_builder(&mut self, builder: ShapePathBuilder) {
        if builder != self.builder {
            self.builder = builder;
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let rect = Rect::from_origin_size(Point::ORIGIN, self.size);
        self.path = self.kind.to_path(rect, self.inset, &self.builder);
    }
}
