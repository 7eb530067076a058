// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::any::Any;

use peniko::{
    kurbo::{Point, Rect},
    Color,
};

use crate::{
    composite::{BorderStyle, BoxLayers, BoxPaths, ShadowStyle},
    corner::CornerMask,
    layer::{Drawable, Opacity},
    layered::LayeredDrawable,
    outline::ShapePathBuilder,
    shape::ShapeKind,
    surface::{ColorFilter, Surface},
    tail::{constrain_shape, ConstrainedShape, TailStyle},
};

/// Speech-bubble frame: a rounded box with a triangular tail on one side.
///
/// The tail occupies a strip of the content rectangle along its side; the
/// body fills the rest. Radius and tail are fitted into the content on every
/// relayout with [`constrain_shape`].
#[derive(Debug)]
pub struct NotificationFrame {
    inner: BoxLayers,
    radius: f64,
    tail: TailStyle,
    builder: ShapePathBuilder,
    fitted: ConstrainedShape,
}

impl NotificationFrame {
    /// Frame with a default tail, border and no shadow.
    pub fn new(background: Color) -> Self {
        Self::with_border(background, BorderStyle::default())
    }

    /// Frame with a default tail and the given border.
    pub fn with_border(background: Color, border: BorderStyle) -> Self {
        let mut this = Self {
            inner: BoxLayers::new(background, border),
            radius: 0.0,
            tail: TailStyle::default(),
            builder: ShapePathBuilder::default(),
            fitted: ConstrainedShape::default(),
        };
        this.relayout();
        this
    }

    /// The underlying layer stack.
    pub fn layers(&self) -> &LayeredDrawable {
        &self.inner.layers
    }

    /// Corner radius as requested.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the wanted corner radius.
    pub fn set_radius(&mut self, radius: f64) {
        let radius = radius.max(0.0);
        if radius != self.radius {
            self.radius = radius;
            self.relayout();
        }
    }

    /// Tail as requested.
    pub fn tail(&self) -> TailStyle {
        self.tail
    }

    /// Set the wanted tail.
    pub fn set_tail(&mut self, tail: TailStyle) {
        if tail != self.tail {
            self.tail = tail;
            self.relayout();
        }
    }

    /// Radius and tail as fitted by the last relayout, relative to the body.
    pub fn fitted(&self) -> ConstrainedShape {
        self.fitted
    }

    /// Set the background color.
    pub fn set_background(&mut self, color: Color) {
        self.inner.set_background_color(color);
    }

    /// Set the border style.
    pub fn set_border(&mut self, border: BorderStyle) {
        if self.inner.set_border_style(border) {
            self.relayout();
        }
    }

    /// Show, change or hide the drop shadow.
    pub fn set_shadow(&mut self, shadow: Option<ShadowStyle>) {
        self.inner.set_shadow(shadow);
        self.relayout();
    }

    /// Padding kept between the bounds and the content.
    pub fn set_padding(&mut self, padding: f64) {
        self.inner.set_padding(padding);
        self.relayout();
    }

    /// Replace the path builder.
    pub fn set_builder(&mut self, builder: ShapePathBuilder) {
        if builder != self.builder {
            self.builder = builder;
            self.relayout();
        }
    }

    /// Number of times the outlines were rebuilt.
    pub fn relayout_count(&self) -> usize {
        self.inner.relayout_count()
    }

    fn relayout(&mut self) {
        let content = self.inner.layers.content_rect();
        let size = content.size();
        let fitted = constrain_shape(size, self.radius, &self.tail);
        let local = Rect::from_origin_size(Point::ORIGIN, size);
        // A tail squeezed to nothing gives its strip back to the body.
        let body = if fitted.tail.is_degenerate() {
            local
        } else {
            fitted.tail.body_rect(local)
        };
        let half = self.inner.border_style().width.max(0.0) * 0.5;
        let border_tail = fitted.tail.inset(half);
        let paths = BoxPaths {
            fill: self.builder.build_path(
                body,
                fitted.radius,
                CornerMask::ALL_CORNERS,
                Some(&fitted.tail),
            ),
            border: self.builder.build_path(
                body.inset(-half),
                fitted.radius - half,
                CornerMask::ALL_CORNERS,
                Some(&border_tail),
            ),
            square: fitted.radius <= 0.0
                && fitted.tail.is_degenerate()
                && self.builder.pixel_offset == 0.0,
        };
        self.fitted = fitted;
        self.inner.apply(paths);
    }
}

impl Drawable for NotificationFrame {
    fn bounds(&self) -> Rect {
        self.inner.layers.bounds()
    }

    fn set_bounds(&mut self, bounds: Rect) -> bool {
        let old_size = self.inner.layers.bounds().size();
        if !self.inner.layers.set_bounds(bounds) {
            return false;
        }
        // Children live in local space, so a move leaves them untouched.
        if self.inner.layers.bounds().size() != old_size {
            self.relayout();
        }
        true
    }

    fn set_opacity(&mut self, alpha: u8) {
        self.inner.layers.set_opacity(alpha);
    }

    fn set_dither(&mut self, dither: bool) {
        self.inner.layers.set_dither(dither);
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.inner.layers.set_color_filter(filter);
    }

    fn set_shape(&mut self, shape: ShapeKind) {
        match shape {
            ShapeKind::RoundedRectangle { radius } => self.set_radius(radius),
            ShapeKind::Rectangle => self.set_radius(0.0),
            _ => tracing::trace!("notification frame only takes a corner radius"),
        }
    }

    fn opacity(&self) -> Opacity {
        self.inner.layers.opacity()
    }

    fn is_dirty(&self) -> bool {
        self.inner.layers.is_dirty()
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        self.inner.layers.draw(surface);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        display_list::{DisplayItem, DisplayList},
        tail::{Side, TipPosition},
    };
    use peniko::kurbo::{BezPath, Shape};

    fn frame(tail: TailStyle) -> NotificationFrame {
        let mut f = NotificationFrame::with_border(
            Color::WHITE,
            BorderStyle {
                color: Color::BLACK,
                width: 2.0,
            },
        );
        f.set_radius(10.0);
        f.set_tail(tail);
        f.set_bounds(Rect::new(0.0, 0.0, 100.0, 60.0));
        f
    }

    fn bottom_tail() -> TailStyle {
        TailStyle {
            side: Side::Bottom,
            tip: TipPosition::Relative(0.5),
            width: 20.0,
            tip_distance: 15.0,
            margin: 8.0,
        }
    }

    fn recorded_fill(f: &mut NotificationFrame) -> BezPath {
        let mut list = DisplayList::default();
        f.draw(&mut list);
        list.items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Fill { path, .. } => Some(path.clone()),
                _ => None,
            })
            .expect("background fill")
    }

    #[test]
    fn centered_tail_is_drawn_unchanged() {
        let mut f = frame(bottom_tail());
        let fitted = f.fitted();
        assert_eq!(fitted.radius, 10.0);
        assert_eq!(fitted.tail.tip_position, 50.0);
        assert_eq!(fitted.tail.width, 20.0);
        assert_eq!(fitted.tail.tip_distance, 15.0);

        let path = recorded_fill(&mut f);
        let bbox = path.bounding_box();
        assert!((bbox.y1 - 60.0).abs() < 1e-6, "{bbox:?}");
        assert!((bbox.x1 - 100.0).abs() < 1e-6, "{bbox:?}");
        let body = 100.0 * 45.0 - 4.0 * (100.0 - core::f64::consts::PI * 25.0);
        let triangle = 0.5 * 20.0 * 15.0;
        assert!((path.area().abs() - (body + triangle)).abs() < 1.0);
    }

    #[test]
    fn tip_near_corner_is_moved_inside() {
        let f = frame(TailStyle {
            tip: TipPosition::Absolute(5.0),
            ..bottom_tail()
        });
        assert_eq!(f.fitted().tail.tip_position, 28.0);
    }

    #[test]
    fn top_tail_pushes_body_down() {
        let mut f = frame(TailStyle {
            side: Side::Top,
            ..bottom_tail()
        });
        let bbox = recorded_fill(&mut f).bounding_box();
        assert!(bbox.y0.abs() < 1e-6, "{bbox:?}");
        assert!((bbox.y1 - 60.0).abs() < 1e-6, "{bbox:?}");
    }

    #[test]
    fn unchanged_tail_does_not_relayout() {
        let mut f = frame(bottom_tail());
        let count = f.relayout_count();
        f.set_tail(bottom_tail());
        f.set_radius(10.0);
        assert!(!f.set_bounds(Rect::new(0.0, 0.0, 100.0, 60.0)));
        assert_eq!(f.relayout_count(), count);
        f.set_tail(TailStyle {
            width: 12.0,
            ..bottom_tail()
        });
        assert_eq!(f.relayout_count(), count + 1);
    }

    #[test]
    fn cramped_frame_drops_tail_width_to_zero() {
        let mut f = frame(bottom_tail());
        f.set_bounds(Rect::new(0.0, 0.0, 30.0, 60.0));
        let fitted = f.fitted();
        assert_eq!(fitted.tail.width, 0.0);
        assert!(fitted.tail.is_degenerate());
        let mut list = DisplayList::default();
        f.draw(&mut list);
        assert_eq!(list.fill_count(), 1);
        // No empty band is left where the tail would have been.
        let bbox = recorded_fill(&mut f).bounding_box();
        assert!((bbox.y1 - 60.0).abs() < 1e-6, "{bbox:?}");
        assert!((bbox.x1 - 30.0).abs() < 1e-6, "{bbox:?}");
    }
}
