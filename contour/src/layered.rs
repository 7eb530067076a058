// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An ordered stack of drawables painted as one unit.

extern crate alloc;
use alloc::{boxed::Box, vec::Vec};

use core::any::Any;

use peniko::{
    kurbo::{Point, Rect, Shape, Size},
    Color,
};

use crate::{
    layer::{Drawable, Opacity},
    surface::{ColorFilter, Paint, Surface},
};

/// Handle to a layer inside a [`LayeredDrawable`].
///
/// Handles are never reused within one drawable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

#[derive(Debug)]
struct LayerEntry {
    id: LayerId,
    layer: Box<dyn Drawable>,
}

/// Ordered stack of layers, painted back to front.
///
/// Children live in the drawable's local coordinate space: their origin is
/// the top left corner of [`bounds`](LayeredDrawable::bounds). Whenever the
/// size changes every child is resized to the full local frame; composites
/// that need other child geometry reposition them after that.
#[derive(Debug)]
pub struct LayeredDrawable {
    entries: Vec<LayerEntry>,
    next_id: u64,
    bounds: Rect,
    alpha: u8,
    clip_to_bounds: bool,
    backdrop: Option<Color>,
    needed_padding: f64,
    dirty: bool,
    layout_count: usize,
}

impl Default for LayeredDrawable {
    fn default() -> Self {
        Self::new()
    }
}

impl LayeredDrawable {
    /// Empty drawable with zero bounds.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            bounds: Rect::ZERO,
            alpha: 255,
            clip_to_bounds: false,
            backdrop: None,
            needed_padding: 0.0,
            dirty: true,
            layout_count: 0,
        }
    }

    fn make_entry(&mut self, layer: Box<dyn Drawable>) -> LayerEntry {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        let mut layer = layer;
        layer.set_bounds(self.local_frame());
        LayerEntry { id, layer }
    }

    /// Append `layer` on top of the stack.
    pub fn add_layer(&mut self, layer: Box<dyn Drawable>) -> LayerId {
        let index = self.entries.len();
        self.insert_layer_at(index, layer)
    }

    /// Insert `layer` at `index`; indices past the end append.
    pub fn insert_layer_at(&mut self, index: usize, layer: Box<dyn Drawable>) -> LayerId {
        let entry = self.make_entry(layer);
        let id = entry.id;
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.dirty = true;
        id
    }

    /// Insert `layer` directly above `reference`, or on top if `reference` is not here.
    pub fn insert_after(&mut self, layer: Box<dyn Drawable>, reference: LayerId) -> LayerId {
        let index = match self.index_of(reference) {
            Some(i) => i + 1,
            None => {
                tracing::trace!(?reference, "reference layer missing, appending");
                self.entries.len()
            }
        };
        self.insert_layer_at(index, layer)
    }

    /// Insert `layer` directly below `reference`, or on top if `reference` is not here.
    pub fn insert_before(&mut self, layer: Box<dyn Drawable>, reference: LayerId) -> LayerId {
        let index = match self.index_of(reference) {
            Some(i) => i,
            None => {
                tracing::trace!(?reference, "reference layer missing, appending");
                self.entries.len()
            }
        };
        self.insert_layer_at(index, layer)
    }

    /// Remove and drop the layer `id`; returns `false` if it is not here.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.entries.remove(index);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Remove the layer at `index`, clamped to the topmost layer.
    ///
    /// Returns the handle of the removed layer, or `None` if there are no layers.
    pub fn remove_layer_at(&mut self, index: usize) -> Option<LayerId> {
        let last = self.entries.len().checked_sub(1)?;
        let entry = self.entries.remove(index.min(last));
        self.dirty = true;
        Some(entry.id)
    }

    /// Drop every layer.
    pub fn clear_layers(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.dirty = true;
        }
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paint order position of `id`.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Handles in paint order.
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Layer `id`.
    pub fn layer(&self, id: LayerId) -> Option<&dyn Drawable> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &*e.layer)
    }

    /// Mutable layer `id`.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut dyn Drawable> {
        self.dirty = true;
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        Some(&mut *entry.layer)
    }

    /// Layer `id` as its concrete type.
    pub fn layer_as<T: Drawable>(&self, id: LayerId) -> Option<&T> {
        let layer: &dyn Any = self.layer(id)?.as_any();
        layer.downcast_ref()
    }

    /// Mutable layer `id` as its concrete type.
    pub fn layer_as_mut<T: Drawable>(&mut self, id: LayerId) -> Option<&mut T> {
        self.layer_mut(id)?.as_any_mut().downcast_mut()
    }

    /// Frame in the parent's coordinate space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Frame in local coordinates: the origin and the current size.
    pub fn local_frame(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.bounds.size())
    }

    /// Move and resize; returns `false` without doing anything if `bounds` is unchanged.
    pub fn set_bounds(&mut self, bounds: Rect) -> bool {
        let bounds = bounds.abs();
        if bounds == self.bounds {
            tracing::trace!("bounds unchanged");
            return false;
        }
        let resized = bounds.size() != self.bounds.size();
        self.bounds = bounds;
        if resized {
            let frame = self.local_frame();
            for entry in &mut self.entries {
                entry.layer.set_bounds(frame);
            }
        }
        self.layout_count += 1;
        self.dirty = true;
        true
    }

    /// Move without resizing.
    pub fn set_offset(&mut self, origin: Point) -> bool {
        self.set_bounds(self.bounds.with_origin(origin))
    }

    /// Resize keeping the origin.
    pub fn set_size(&mut self, size: Size) -> bool {
        self.set_bounds(self.bounds.with_size(size))
    }

    /// Number of times the bounds actually changed.
    pub fn layout_count(&self) -> usize {
        self.layout_count
    }

    /// Set the opacity of every layer and of the backdrop.
    pub fn set_opacity(&mut self, alpha: u8) {
        self.alpha = alpha;
        for entry in &mut self.entries {
            entry.layer.set_opacity(alpha);
        }
        self.dirty = true;
    }

    /// Set dithering on every layer.
    pub fn set_dither(&mut self, dither: bool) {
        for entry in &mut self.entries {
            entry.layer.set_dither(dither);
        }
        self.dirty = true;
    }

    /// Set the color filter of every layer.
    pub fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        for entry in &mut self.entries {
            entry.layer.set_color_filter(filter);
        }
        self.dirty = true;
    }

    /// Extra space the container must keep around the bounds for effects
    /// drawn outside the content, such as shadows.
    pub fn needed_padding(&self) -> f64 {
        self.needed_padding
    }

    /// Set the needed padding; negative values are treated as zero.
    pub fn set_needed_padding(&mut self, padding: f64) -> bool {
        let padding = padding.max(0.0);
        if padding == self.needed_padding {
            return false;
        }
        self.needed_padding = padding;
        self.dirty = true;
        true
    }

    /// The local frame minus the needed padding on every side.
    ///
    /// Collapses to a zero-sized rectangle at the center if the padding
    /// does not fit.
    pub fn content_rect(&self) -> Rect {
        let frame = self.local_frame();
        let p = self.needed_padding;
        let center = frame.center();
        Rect::new(
            (frame.x0 + p).min(center.x),
            (frame.y0 + p).min(center.y),
            (frame.x1 - p).max(center.x),
            (frame.y1 - p).max(center.y),
        )
    }

    /// Clip children to the local frame while drawing.
    pub fn set_clip_to_bounds(&mut self, clip: bool) {
        if clip != self.clip_to_bounds {
            self.clip_to_bounds = clip;
            self.dirty = true;
        }
    }

    /// Solid color painted over the local frame before any layer.
    pub fn set_backdrop(&mut self, backdrop: Option<Color>) {
        self.backdrop = backdrop;
        self.dirty = true;
    }

    /// Combined opacity of the backdrop and all layers.
    ///
    /// An empty drawable is transparent.
    pub fn opacity(&self) -> Opacity {
        let backdrop = self.backdrop.map(|color| {
            let a = color.components[3];
            if self.alpha == 0 || a <= 0.0 {
                Opacity::Transparent
            } else if self.alpha == 255 && a >= 1.0 {
                Opacity::Opaque
            } else {
                Opacity::Translucent
            }
        });
        backdrop
            .into_iter()
            .chain(self.entries.iter().map(|e| e.layer.opacity()))
            .reduce(Opacity::combine)
            .unwrap_or(Opacity::Transparent)
    }

    /// `true` if this drawable or any layer changed since the last draw.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.entries.iter().any(|e| e.layer.is_dirty())
    }

    /// Paint the backdrop and then every layer, back to front.
    #[tracing::instrument(skip_all)]
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        self.dirty = false;
        if !(self.bounds.width() > 0.0 && self.bounds.height() > 0.0) {
            tracing::trace!(bounds = ?self.bounds, "skipping degenerate drawable");
            return;
        }
        surface.save();
        surface.translate_origin(self.bounds.origin().to_vec2());
        let frame = self.local_frame();
        if self.clip_to_bounds {
            surface.clip_to(frame);
        }
        if let Some(color) = self.backdrop {
            let paint = Paint::solid(color.multiply_alpha(f32::from(self.alpha) / 255.0));
            surface.fill(&frame.to_path(0.1), &paint);
        }
        for entry in &mut self.entries {
            entry.layer.draw(surface);
        }
        surface.restore();
    }
}

impl Drawable for LayeredDrawable {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) -> bool {
        Self::set_bounds(self, bounds)
    }

    fn set_opacity(&mut self, alpha: u8) {
        Self::set_opacity(self, alpha);
    }

    fn set_dither(&mut self, dither: bool) {
        Self::set_dither(self, dither);
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        Self::set_color_filter(self, filter);
    }

    fn opacity(&self) -> Opacity {
        Self::opacity(self)
    }

    fn is_dirty(&self) -> bool {
        Self::is_dirty(self)
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        Self::draw(self, surface);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
