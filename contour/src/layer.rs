// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paintable units and the leaf layers built on them.

use core::{any::Any, fmt};

use peniko::{
    kurbo::{BezPath, Rect, Size},
    Color,
};
use smallvec::SmallVec;

use crate::{
    shape::{ShapeKind, ShapeState},
    surface::{ColorFilter, Paint, RasterHandle, Surface},
};

/// How much of its bounds a drawable covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opacity {
    /// Every pixel in the bounds is covered with full alpha.
    Opaque,
    /// Some pixels are partially covered or uncovered.
    Translucent,
    /// Nothing is drawn.
    Transparent,
}

impl Opacity {
    /// Opacity of two drawables painted over each other.
    ///
    /// Equal values are kept; otherwise translucency wins over transparency,
    /// which wins over opacity. The result does not depend on order.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Translucent, _) | (_, Self::Translucent) => Self::Translucent,
            (Self::Transparent, _) | (_, Self::Transparent) => Self::Transparent,
            _ => Self::Opaque,
        }
    }
}

/// Anything that can be laid out and painted as one unit.
pub trait Drawable: Any + fmt::Debug {
    /// Frame of the drawable in its parent's coordinate space.
    fn bounds(&self) -> Rect;

    /// Move or resize; returns `false` if nothing changed.
    fn set_bounds(&mut self, bounds: Rect) -> bool;

    /// Overall alpha, `255` being fully opaque.
    fn set_opacity(&mut self, alpha: u8);

    /// Request dithering.
    fn set_dither(&mut self, dither: bool);

    /// Set or clear the color filter.
    fn set_color_filter(&mut self, filter: Option<ColorFilter>);

    /// Select the shape to paint. Drawables without a shape of their own ignore this.
    fn set_shape(&mut self, shape: ShapeKind) {
        let _ = shape;
    }

    /// How much of its bounds this drawable covers.
    fn opacity(&self) -> Opacity;

    /// `true` if something changed since the last [`draw`](Drawable::draw).
    fn is_dirty(&self) -> bool;

    /// Paint onto `surface`.
    fn draw(&mut self, surface: &mut dyn Surface);

    /// Access to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable access to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// State shared by the leaf layers: bounds, paint modifiers and shape.
#[derive(Clone, Debug)]
pub struct LayerState {
    bounds: Rect,
    alpha: u8,
    dither: bool,
    color_filter: Option<ColorFilter>,
    shape: ShapeState,
    dirty: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new(ShapeKind::Rectangle)
    }
}

impl LayerState {
    /// Fully opaque state with empty bounds.
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            bounds: Rect::ZERO,
            alpha: 255,
            dither: false,
            color_filter: None,
            shape: ShapeState::new(shape),
            dirty: true,
        }
    }

    /// Current bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current alpha.
    #[inline]
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Shape and its cached path.
    #[inline]
    pub fn shape(&self) -> &ShapeState {
        &self.shape
    }

    /// Mutable shape; marks the layer dirty.
    pub fn shape_mut(&mut self) -> &mut ShapeState {
        self.dirty = true;
        &mut self.shape
    }

    /// `true` if bounds are too small to draw into.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.bounds.width() > 0.0 && self.bounds.height() > 0.0)
    }

    /// Update bounds; returns the previous size if anything changed.
    pub fn set_bounds(&mut self, bounds: Rect) -> Option<Size> {
        let bounds = bounds.abs();
        if bounds == self.bounds {
            return None;
        }
        let old = self.bounds.size();
        self.bounds = bounds;
        self.shape.set_size(bounds.size());
        self.dirty = true;
        Some(old)
    }

    /// Update alpha; returns `false` if unchanged.
    pub fn set_alpha(&mut self, alpha: u8) -> bool {
        if alpha == self.alpha {
            return false;
        }
        self.alpha = alpha;
        self.dirty = true;
        true
    }

    /// Update dithering; returns `false` if unchanged.
    pub fn set_dither(&mut self, dither: bool) -> bool {
        if dither == self.dither {
            return false;
        }
        self.dither = dither;
        self.dirty = true;
        true
    }

    /// Update the color filter; returns `false` if unchanged.
    pub fn set_color_filter(&mut self, filter: Option<ColorFilter>) -> bool {
        if filter == self.color_filter {
            return false;
        }
        self.color_filter = filter;
        self.dirty = true;
        true
    }

    /// `true` if anything changed since the last draw.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the layer dirty.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Paint for `color` with this layer's alpha, dither and filter applied.
    pub fn paint(&self, color: Color) -> Paint {
        Paint {
            color: color.multiply_alpha(f32::from(self.alpha) / 255.0),
            dither: self.dither,
            color_filter: self.color_filter,
        }
    }

    /// Opacity of painting `color` over this layer's shape.
    pub fn opacity_for(&self, color: Color, fills_shape: bool) -> Opacity {
        let color_alpha = color.components[3];
        if self.alpha == 0 || color_alpha <= 0.0 || self.is_degenerate() {
            Opacity::Transparent
        } else if fills_shape
            && self.alpha == 255
            && color_alpha >= 1.0
            && self.shape.kind().covers_bounds()
        {
            Opacity::Opaque
        } else {
            Opacity::Translucent
        }
    }

    /// Run `paint_fn` with the surface origin at this layer's top left corner.
    ///
    /// Skips drawing entirely for degenerate bounds or an empty path.
    fn with_local_origin(
        &mut self,
        surface: &mut dyn Surface,
        paint_fn: impl FnOnce(&BezPath, &mut dyn Surface),
    ) {
        self.dirty = false;
        if self.is_degenerate() || self.shape.path().is_empty() {
            tracing::trace!(bounds = ?self.bounds, "skipping empty layer");
            return;
        }
        surface.save();
        surface.translate_origin(self.bounds.origin().to_vec2());
        paint_fn(self.shape.path(), surface);
        surface.restore();
    }
}

macro_rules! impl_layer_state_forwarding {
    () => {
        fn bounds(&self) -> Rect {
            self.state.bounds()
        }

        fn is_dirty(&self) -> bool {
            self.state.is_dirty()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

/// Fills its shape with a solid color.
#[derive(Clone, Debug)]
pub struct FillLayer {
    state: LayerState,
    color: Color,
}

impl FillLayer {
    /// Fill the bounds rectangle with `color`.
    pub fn new(color: Color) -> Self {
        Self::with_shape(color, ShapeKind::Rectangle)
    }

    /// Fill `shape` with `color`.
    pub fn with_shape(color: Color, shape: ShapeKind) -> Self {
        Self {
            state: LayerState::new(shape),
            color,
        }
    }

    /// Fill color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Change the fill color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.state.mark_dirty();
    }

    /// Shared layer state.
    pub fn state(&self) -> &LayerState {
        &self.state
    }

    /// Mutable shared layer state, e.g. to pick another shape.
    pub fn state_mut(&mut self) -> &mut LayerState {
        &mut self.state
    }
}

impl Drawable for FillLayer {
    impl_layer_state_forwarding!();

    fn set_dither(&mut self, dither: bool) {
        self.state.set_dither(dither);
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.state.set_color_filter(filter);
    }

    fn set_bounds(&mut self, bounds: Rect) -> bool {
        self.state.set_bounds(bounds).is_some()
    }

    fn set_opacity(&mut self, alpha: u8) {
        self.state.set_alpha(alpha);
    }

    fn set_shape(&mut self, shape: ShapeKind) {
        self.state.shape_mut().set_kind(shape);
    }

    fn opacity(&self) -> Opacity {
        self.state.opacity_for(self.color, true)
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        let paint = self.state.paint(self.color);
        self.state
            .with_local_origin(surface, |path, surface| surface.fill(path, &paint));
    }
}

/// Strokes its shape; the shape is pulled in by half the stroke width so the
/// stroke stays inside the bounds.
#[derive(Clone, Debug)]
pub struct BorderLayer {
    state: LayerState,
    color: Color,
    width: f64,
}

impl BorderLayer {
    /// Stroke the bounds rectangle.
    pub fn new(color: Color, width: f64) -> Self {
        Self::with_shape(color, width, ShapeKind::Rectangle)
    }

    /// Stroke `shape`.
    pub fn with_shape(color: Color, width: f64, shape: ShapeKind) -> Self {
        let mut state = LayerState::new(shape);
        let width = width.max(0.0);
        state.shape_mut().set_inset(width * 0.5);
        Self {
            state,
            color,
            width,
        }
    }

    /// Stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Stroke width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Change the stroke color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.state.mark_dirty();
    }

    /// Change the stroke width.
    pub fn set_width(&mut self, width: f64) {
        let width = width.max(0.0);
        if width != self.width {
            self.width = width;
            self.state.shape_mut().set_inset(width * 0.5);
        }
    }

    /// Shared layer state.
    pub fn state(&self) -> &LayerState {
        &self.state
    }
}

impl Drawable for BorderLayer {
    impl_layer_state_forwarding!();

    fn set_dither(&mut self, dither: bool) {
        self.state.set_dither(dither);
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.state.set_color_filter(filter);
    }

    fn set_bounds(&mut self, bounds: Rect) -> bool {
        self.state.set_bounds(bounds).is_some()
    }

    fn set_opacity(&mut self, alpha: u8) {
        self.state.set_alpha(alpha);
    }

    fn set_shape(&mut self, shape: ShapeKind) {
        self.state.shape_mut().set_kind(shape);
    }

    fn opacity(&self) -> Opacity {
        if self.width <= 0.0 {
            return Opacity::Transparent;
        }
        self.state.opacity_for(self.color, false)
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        if self.width <= 0.0 {
            self.state.dirty = false;
            return;
        }
        let paint = self.state.paint(self.color);
        let width = self.width;
        self.state.with_local_origin(surface, |path, surface| {
            surface.stroke(path, &paint, width);
        });
    }
}

/// Blurred copy of its shape, rendered once into a raster buffer and then
/// composited at the layer's origin.
///
/// The buffer is dropped as soon as anything that affects its pixels changes
/// and re-rendered by the next draw.
#[derive(Clone, Debug)]
pub struct ShadowLayer {
    state: LayerState,
    color: Color,
    blur_radius: f64,
    buffer: Option<RasterHandle>,
    stale: SmallVec<[RasterHandle; 2]>,
}

impl ShadowLayer {
    /// Shadow of the bounds rectangle.
    pub fn new(color: Color, blur_radius: f64) -> Self {
        Self::with_shape(color, blur_radius, ShapeKind::Rectangle)
    }

    /// Shadow of `shape`.
    pub fn with_shape(color: Color, blur_radius: f64, shape: ShapeKind) -> Self {
        Self {
            state: LayerState::new(shape),
            color,
            blur_radius: blur_radius.max(0.0),
            buffer: None,
            stale: SmallVec::new(),
        }
    }

    /// Shadow color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Blur radius.
    pub fn blur_radius(&self) -> f64 {
        self.blur_radius
    }

    /// The currently cached buffer, if any.
    pub fn buffer(&self) -> Option<RasterHandle> {
        self.buffer
    }

    /// Change the shadow color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.invalidate();
    }

    /// Change the blur radius.
    pub fn set_blur_radius(&mut self, blur_radius: f64) {
        let blur_radius = blur_radius.max(0.0);
        if blur_radius != self.blur_radius {
            self.blur_radius = blur_radius;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.stale.push(buffer);
        }
        self.state.mark_dirty();
    }
}

impl Drawable for ShadowLayer {
    impl_layer_state_forwarding!();

    fn set_dither(&mut self, dither: bool) {
        if self.state.set_dither(dither) {
            self.invalidate();
        }
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        if self.state.set_color_filter(filter) {
            self.invalidate();
        }
    }

    fn set_bounds(&mut self, bounds: Rect) -> bool {
        match self.state.set_bounds(bounds) {
            Some(old_size) => {
                if old_size != self.state.bounds().size() {
                    self.invalidate();
                }
                true
            }
            None => false,
        }
    }

    fn set_opacity(&mut self, alpha: u8) {
        if self.state.set_alpha(alpha) {
            self.invalidate();
        }
    }

    fn set_shape(&mut self, shape: ShapeKind) {
        if *self.state.shape().kind() == shape {
            return;
        }
        self.state.shape_mut().set_kind(shape);
        self.invalidate();
    }

    fn opacity(&self) -> Opacity {
        self.state.opacity_for(self.color, false)
    }

    #[tracing::instrument(skip_all)]
    fn draw(&mut self, surface: &mut dyn Surface) {
        for buffer in self.stale.drain(..) {
            surface.release_buffer(buffer);
        }
        self.state.dirty = false;
        if self.state.is_degenerate() || self.state.shape().path().is_empty() {
            tracing::trace!("skipping empty shadow");
            return;
        }
        let buffer = match self.buffer {
            Some(buffer) => buffer,
            None => {
                let paint = self.state.paint(self.color);
                let buffer =
                    surface.blur_into_buffer(self.state.shape().path(), &paint, self.blur_radius);
                tracing::debug!(?buffer, "rendered shadow buffer");
                self.buffer = Some(buffer);
                buffer
            }
        };
        surface.composite_buffer(buffer, self.state.bounds().origin());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_list::{DisplayItem, DisplayList};
    use peniko::kurbo::{Point, Shape, Vec2};

    const MAGENTA: Color = Color::from_rgb8(226, 0, 116);

    #[test]
    fn combine_is_order_independent() {
        use Opacity::*;
        for a in [Opaque, Translucent, Transparent] {
            for b in [Opaque, Translucent, Transparent] {
                assert_eq!(a.combine(b), b.combine(a));
            }
        }
        assert_eq!(Opaque.combine(Opaque), Opaque);
        assert_eq!(Opaque.combine(Translucent), Translucent);
        assert_eq!(Opaque.combine(Transparent), Transparent);
        assert_eq!(Transparent.combine(Translucent), Translucent);
    }

    #[test]
    fn fill_draws_in_local_coordinates() {
        let mut layer = FillLayer::new(MAGENTA);
        assert!(layer.set_bounds(Rect::new(10.0, 20.0, 50.0, 40.0)));
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        assert!(matches!(list.items[0], DisplayItem::Save));
        match &list.items[1] {
            DisplayItem::Translate(v) => assert_eq!(*v, Vec2::new(10.0, 20.0)),
            other => panic!("expected translate, got {other:?}"),
        }
        match &list.items[2] {
            DisplayItem::Fill { path, .. } => {
                assert_eq!(path.bounding_box(), Rect::new(0.0, 0.0, 40.0, 20.0));
            }
            other => panic!("expected fill, got {other:?}"),
        }
        assert!(matches!(list.items[3], DisplayItem::Restore));
        assert!(!layer.is_dirty());
    }

    #[test]
    fn degenerate_bounds_draw_nothing() {
        let mut layer = FillLayer::new(MAGENTA);
        layer.set_bounds(Rect::new(5.0, 5.0, 5.0, 30.0));
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        assert!(list.items.is_empty());
    }

    #[test]
    fn opacity_applies_to_paint() {
        let mut layer = FillLayer::new(MAGENTA);
        layer.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(layer.opacity(), Opacity::Opaque);
        layer.set_opacity(128);
        assert_eq!(layer.opacity(), Opacity::Translucent);
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        let alpha = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Fill { paint, .. } => Some(paint.color.to_rgba8().a),
                _ => None,
            })
            .expect("fill recorded");
        assert_eq!(alpha, 128);
        layer.set_opacity(0);
        assert_eq!(layer.opacity(), Opacity::Transparent);
    }

    #[test]
    fn rounded_fill_is_translucent() {
        let mut layer = FillLayer::with_shape(MAGENTA, ShapeKind::RoundedRectangle { radius: 4.0 });
        layer.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(layer.opacity(), Opacity::Translucent);
    }

    #[test]
    fn border_stays_inside_bounds() {
        let mut layer = BorderLayer::new(MAGENTA, 4.0);
        layer.set_bounds(Rect::new(0.0, 0.0, 30.0, 20.0));
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        let (path, width) = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Stroke { path, width, .. } => Some((path.clone(), *width)),
                _ => None,
            })
            .expect("stroke recorded");
        assert_eq!(width, 4.0);
        assert_eq!(path.bounding_box(), Rect::new(2.0, 2.0, 28.0, 18.0));
    }

    #[test]
    fn zero_width_border_is_transparent() {
        let mut layer = BorderLayer::new(MAGENTA, 0.0);
        layer.set_bounds(Rect::new(0.0, 0.0, 30.0, 20.0));
        assert_eq!(layer.opacity(), Opacity::Transparent);
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        assert!(list.items.is_empty());
    }

    #[test]
    fn shadow_buffer_is_reused_until_resized() {
        let mut layer = ShadowLayer::new(Color::from_rgba8(0, 0, 0, 90), 6.0);
        layer.set_bounds(Rect::new(0.0, 0.0, 40.0, 40.0));
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        layer.draw(&mut list);
        assert_eq!(list.blur_count(), 1);
        let first = layer.buffer().expect("buffer cached");

        // Moving keeps the buffer.
        layer.set_bounds(Rect::new(5.0, 5.0, 45.0, 45.0));
        assert_eq!(layer.buffer(), Some(first));
        layer.draw(&mut list);
        assert_eq!(list.blur_count(), 1);
        assert!(list.items.iter().any(|i| matches!(
            i,
            DisplayItem::Composite { origin, .. } if *origin == Point::new(5.0, 5.0)
        )));

        // Resizing drops it immediately.
        layer.set_bounds(Rect::new(5.0, 5.0, 60.0, 45.0));
        assert_eq!(layer.buffer(), None);
        list.clear();
        layer.draw(&mut list);
        assert!(matches!(list.items[0], DisplayItem::Release(b) if b == first));
        assert_eq!(list.blur_count(), 1);
        assert_ne!(layer.buffer(), Some(first));
    }

    #[test]
    fn shadow_invalidated_by_paint_changes() {
        let mut layer = ShadowLayer::new(Color::from_rgba8(0, 0, 0, 90), 6.0);
        layer.set_bounds(Rect::new(0.0, 0.0, 40.0, 40.0));
        let mut list = DisplayList::default();
        layer.draw(&mut list);
        layer.set_opacity(100);
        assert!(layer.buffer().is_none());
        layer.draw(&mut list);
        layer.set_blur_radius(2.0);
        assert!(layer.buffer().is_none());
        layer.draw(&mut list);
        layer.set_shape(ShapeKind::Oval);
        assert!(layer.buffer().is_none());
        assert!(layer.is_dirty());
        layer.draw(&mut list);

        layer.set_color_filter(Some(ColorFilter(7)));
        assert!(layer.buffer().is_none());
        list.clear();
        layer.draw(&mut list);
        assert_eq!(list.blur_count(), 1);
        let filtered = list.items.iter().find_map(|i| match i {
            DisplayItem::BlurIntoBuffer { paint, .. } => Some(paint.color_filter),
            _ => None,
        });
        assert_eq!(filtered, Some(Some(ColorFilter(7))));

        layer.set_dither(true);
        assert!(layer.buffer().is_none());
        layer.draw(&mut list);
        assert_eq!(list.blur_count(), 2);

        // Unchanged values keep the buffer.
        layer.set_dither(true);
        layer.set_color_filter(Some(ColorFilter(7)));
        layer.set_shape(ShapeKind::Oval);
        assert!(layer.buffer().is_some());
    }
}
