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
};

/// Box with a background, an inner border, an optional drop shadow and
/// individually rounded corners.
///
/// Every setter that affects geometry rebuilds the outlines right away;
/// drawing only reads them.
#[derive(Debug)]
pub struct CornerBox {
    inner: BoxLayers,
    radius: f64,
    mask: CornerMask,
    builder: ShapePathBuilder,
}

impl CornerBox {
    /// Square box with a default border and no shadow.
    pub fn new(background: Color) -> Self {
        Self::with_border(background, BorderStyle::default())
    }

    /// Square box with the given border and no shadow.
    pub fn with_border(background: Color, border: BorderStyle) -> Self {
        let mut this = Self {
            inner: BoxLayers::new(background, border),
            radius: 0.0,
            mask: CornerMask::ALL_CORNERS,
            builder: ShapePathBuilder::default(),
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

    /// Rounded corners.
    pub fn corner_mask(&self) -> CornerMask {
        self.mask
    }

    /// Set the corner radius.
    pub fn set_radius(&mut self, radius: f64) {
        let radius = radius.max(0.0);
        if radius != self.radius {
            self.radius = radius;
            self.relayout();
        }
    }

    /// Select which corners are rounded.
    pub fn set_corner_mask(&mut self, mask: CornerMask) {
        if mask != self.mask {
            self.mask = mask;
            self.relayout();
        }
    }

    /// Background color.
    pub fn background(&self) -> Color {
        self.inner.background_color()
    }

    /// Set the background color.
    pub fn set_background(&mut self, color: Color) {
        self.inner.set_background_color(color);
    }

    /// Border style.
    pub fn border(&self) -> BorderStyle {
        self.inner.border_style()
    }

    /// Set the border style.
    pub fn set_border(&mut self, border: BorderStyle) {
        if self.inner.set_border_style(border) {
            self.relayout();
        }
    }

    /// Shadow style, if a shadow is shown.
    pub fn shadow(&self) -> Option<ShadowStyle> {
        self.inner.shadow_style()
    }

    /// Show, change or hide the drop shadow.
    ///
    /// The needed padding grows to fit the shadow.
    pub fn set_shadow(&mut self, shadow: Option<ShadowStyle>) {
        self.inner.set_shadow(shadow);
        self.relayout();
    }

    /// Padding kept between the bounds and the content.
    ///
    /// The padding actually used is never less than the shadow's reach.
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
        let local = Rect::from_origin_size(Point::ORIGIN, content.size());
        let half = self.inner.border_style().width.max(0.0) * 0.5;
        let paths = BoxPaths {
            fill: self.builder.build_path(local, self.radius, self.mask, None),
            border: self.builder.build_path(
                local.inset(-half),
                self.radius - half,
                self.mask,
                None,
            ),
            square: (self.radius <= 0.0 || self.mask.is_empty())
                && self.builder.pixel_offset == 0.0,
        };
        self.inner.apply(paths);
    }
}

impl Drawable for CornerBox {
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
        let (radius, mask) = match shape {
            ShapeKind::Rectangle => (0.0, self.mask),
            ShapeKind::RoundedRectangle { radius } => (radius, CornerMask::ALL_CORNERS),
            ShapeKind::CornerMaskedRect { radius, mask } => (radius, mask),
            ShapeKind::Oval | ShapeKind::CustomPath(_) => {
                tracing::trace!("corner box only takes rectangular shapes");
                return;
            }
        };
        let radius = radius.max(0.0);
        if radius != self.radius || mask != self.mask {
            self.radius = radius;
            self.mask = mask;
            self.relayout();
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
    use crate::display_list::{DisplayItem, DisplayList};
    use peniko::kurbo::{Shape, Vec2};

    fn rounded_box() -> CornerBox {
        let mut b = CornerBox::with_border(
            Color::WHITE,
            BorderStyle {
                color: Color::BLACK,
                width: 2.0,
            },
        );
        b.set_radius(10.0);
        b
    }

    fn approx_rect(got: Rect, want: Rect) {
        for (g, w) in [
            (got.x0, want.x0),
            (got.y0, want.y0),
            (got.x1, want.x1),
            (got.y1, want.y1),
        ] {
            assert!((g - w).abs() < 1e-6, "{got:?} != {want:?}");
        }
    }

    #[test]
    fn same_bounds_relayout_once() {
        let mut b = rounded_box();
        let before = b.relayout_count();
        let bounds = Rect::new(0.0, 0.0, 100.0, 60.0);
        assert!(b.set_bounds(bounds));
        assert!(!b.set_bounds(bounds));
        assert_eq!(b.relayout_count(), before + 1);
        b.set_radius(10.0);
        b.set_corner_mask(CornerMask::ALL_CORNERS);
        assert_eq!(b.relayout_count(), before + 1);
    }

    #[test]
    fn background_area_matches_rounded_rect() {
        let mut b = rounded_box();
        b.set_bounds(Rect::new(0.0, 0.0, 100.0, 60.0));
        let mut list = DisplayList::default();
        b.draw(&mut list);
        let area = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Fill { path, .. } => Some(path.area().abs()),
                _ => None,
            })
            .expect("background fill");
        assert!((area - 5914.16).abs() < 1.0, "{area}");
    }

    #[test]
    fn border_is_inset_by_half_its_width() {
        let mut b = rounded_box();
        b.set_bounds(Rect::new(0.0, 0.0, 100.0, 60.0));
        let mut list = DisplayList::default();
        b.draw(&mut list);
        let bbox = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Stroke { path, .. } => Some(path.bounding_box()),
                _ => None,
            })
            .expect("border stroke");
        approx_rect(bbox, Rect::new(1.0, 1.0, 99.0, 59.0));
    }

    #[test]
    fn shadow_wraps_content() {
        let mut b = rounded_box();
        b.set_shadow(Some(ShadowStyle {
            blur_radius: 6.0,
            offset: Vec2::ZERO,
            ..ShadowStyle::default()
        }));
        b.set_bounds(Rect::new(0.0, 0.0, 112.0, 72.0));
        assert_eq!(b.layers().needed_padding(), 6.0);
        assert_eq!(b.layers().content_rect(), Rect::new(6.0, 6.0, 106.0, 66.0));

        let mut list = DisplayList::default();
        b.draw(&mut list);
        let (shadow_path, _) = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::BlurIntoBuffer { path, radius, .. } => Some((path.clone(), *radius)),
                _ => None,
            })
            .expect("shadow blur");
        approx_rect(
            shadow_path.bounding_box(),
            Rect::new(6.0, 6.0, 106.0, 66.0),
        );
        // Shadow is painted before the background.
        let blur_at = list
            .items
            .iter()
            .position(|i| matches!(i, DisplayItem::BlurIntoBuffer { .. }));
        let fill_at = list
            .items
            .iter()
            .position(|i| matches!(i, DisplayItem::Fill { .. }));
        assert!(blur_at < fill_at);
    }

    #[test]
    fn resize_rerenders_shadow() {
        let mut b = rounded_box();
        b.set_shadow(Some(ShadowStyle::default()));
        b.set_bounds(Rect::new(0.0, 0.0, 120.0, 80.0));
        let mut list = DisplayList::default();
        b.draw(&mut list);
        b.draw(&mut list);
        assert_eq!(list.blur_count(), 1);
        b.set_bounds(Rect::new(0.0, 0.0, 140.0, 80.0));
        b.draw(&mut list);
        assert_eq!(list.blur_count(), 2);
        assert!(list
            .items
            .iter()
            .any(|i| matches!(i, DisplayItem::Release(_))));
    }

    #[test]
    fn masked_corners_change_area() {
        let mut b = rounded_box();
        b.set_bounds(Rect::new(0.0, 0.0, 100.0, 60.0));
        b.set_corner_mask(CornerMask::TOP);
        let mut list = DisplayList::default();
        b.draw(&mut list);
        let area = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Fill { path, .. } => Some(path.area().abs()),
                _ => None,
            })
            .expect("background fill");
        let corner_cut = 100.0 - core::f64::consts::PI * 25.0;
        assert!((area - (6000.0 - 2.0 * corner_cut)).abs() < 1.0, "{area}");
    }

    #[test]
    fn shape_selection_maps_to_radius_and_mask() {
        let mut b = rounded_box();
        b.set_shape(ShapeKind::CornerMaskedRect {
            radius: 4.0,
            mask: CornerMask::BOTTOM,
        });
        assert_eq!(b.radius(), 4.0);
        assert_eq!(b.corner_mask(), CornerMask::BOTTOM);
        b.set_shape(ShapeKind::Oval);
        assert_eq!(b.radius(), 4.0);
        b.set_shape(ShapeKind::Rectangle);
        assert_eq!(b.radius(), 0.0);
    }

    #[test]
    fn moving_keeps_shadow_buffer() {
        let mut b = rounded_box();
        b.set_shadow(Some(ShadowStyle::default()));
        b.set_bounds(Rect::new(0.0, 0.0, 120.0, 80.0));
        let relayouts = b.relayout_count();
        let mut list = DisplayList::default();
        b.draw(&mut list);
        assert!(b.set_bounds(Rect::new(30.0, 30.0, 150.0, 110.0)));
        assert_eq!(b.relayout_count(), relayouts);
        b.draw(&mut list);
        assert_eq!(list.blur_count(), 1);
        assert!(!list
            .items
            .iter()
            .any(|i| matches!(i, DisplayItem::Release(_))));
    }

    #[test]
    fn square_background_is_opaque() {
        let mut b = CornerBox::new(Color::WHITE);
        b.set_bounds(Rect::new(0.0, 0.0, 40.0, 30.0));
        let background = b.layers().ids().next().expect("background layer");
        let opacity = |b: &CornerBox| b.layers().layer(background).map(|l| l.opacity());
        assert_eq!(opacity(&b), Some(Opacity::Opaque));
        b.set_radius(6.0);
        assert_eq!(opacity(&b), Some(Opacity::Translucent));
        b.set_corner_mask(CornerMask::NO_CORNERS);
        assert_eq!(opacity(&b), Some(Opacity::Opaque));

        let mut list = DisplayList::default();
        b.draw(&mut list);
        let fill = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Fill { path, .. } => Some(path.bounding_box()),
                _ => None,
            })
            .expect("background fill");
        assert_eq!(fill, Rect::new(0.0, 0.0, 40.0, 30.0));
    }
}
