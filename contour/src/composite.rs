// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer wiring shared by the shaped composites.

extern crate alloc;
use alloc::boxed::Box;

use peniko::{
    kurbo::{Affine, BezPath, Rect, Vec2},
    Color,
};

use crate::{
    layer::{BorderLayer, FillLayer, ShadowLayer},
    layered::{LayerId, LayeredDrawable},
    shape::ShapeKind,
};

/// Stroke drawn along the inside of a composite's outline.
#[derive(Clone, Copy, Debug)]
pub struct BorderStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width; zero disables the border.
    pub width: f64,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgba8(0, 0, 0, 255),
            width: 1.0,
        }
    }
}

/// Drop shadow painted under a composite.
#[derive(Clone, Copy, Debug)]
pub struct ShadowStyle {
    /// Shadow color.
    pub color: Color,
    /// Blur radius.
    pub blur_radius: f64,
    /// Offset of the shadow relative to the content.
    pub offset: Vec2,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgba8(0, 0, 0, 64),
            blur_radius: 8.0,
            offset: Vec2::new(0.0, 2.0),
        }
    }
}

impl ShadowStyle {
    /// Distance the shadow may reach beyond the content on any side.
    pub fn extent(&self) -> f64 {
        self.blur_radius.max(0.0) + self.offset.hypot()
    }
}

/// Outline of a composite's content, in content-local coordinates.
pub(crate) struct BoxPaths {
    pub(crate) fill: BezPath,
    pub(crate) border: BezPath,
    /// The outline is the plain content rectangle.
    pub(crate) square: bool,
}

/// Background, border and optional shadow layers inside a [`LayeredDrawable`].
///
/// The shadow, when present, sits at the bottom of the stack.
#[derive(Debug)]
pub(crate) struct BoxLayers {
    pub(crate) layers: LayeredDrawable,
    background: LayerId,
    border: LayerId,
    shadow: Option<LayerId>,
    border_style: BorderStyle,
    shadow_style: Option<ShadowStyle>,
    padding: f64,
    relayouts: usize,
}

impl BoxLayers {
    pub(crate) fn new(background: Color, border_style: BorderStyle) -> Self {
        let mut layers = LayeredDrawable::new();
        let background = layers.add_layer(Box::new(FillLayer::new(background)));
        let border = layers.add_layer(Box::new(BorderLayer::new(
            border_style.color,
            border_style.width,
        )));
        Self {
            layers,
            background,
            border,
            shadow: None,
            border_style,
            shadow_style: None,
            padding: 0.0,
            relayouts: 0,
        }
    }

    pub(crate) fn relayout_count(&self) -> usize {
        self.relayouts
    }

    pub(crate) fn background_color(&self) -> Color {
        self.layers
            .layer_as::<FillLayer>(self.background)
            .map_or(Color::TRANSPARENT, FillLayer::color)
    }

    pub(crate) fn set_background_color(&mut self, color: Color) {
        if let Some(layer) = self.layers.layer_as_mut::<FillLayer>(self.background) {
            layer.set_color(color);
        }
    }

    pub(crate) fn border_style(&self) -> BorderStyle {
        self.border_style
    }

    /// Returns `true` if the width changed and the outline must be rebuilt.
    pub(crate) fn set_border_style(&mut self, style: BorderStyle) -> bool {
        let width_changed = style.width != self.border_style.width;
        self.border_style = style;
        if let Some(layer) = self.layers.layer_as_mut::<BorderLayer>(self.border) {
            layer.set_color(style.color);
            layer.set_width(style.width);
        }
        width_changed
    }

    pub(crate) fn shadow_style(&self) -> Option<ShadowStyle> {
        self.shadow_style
    }

    /// Add, update or remove the shadow layer and recompute the padding.
    pub(crate) fn set_shadow(&mut self, style: Option<ShadowStyle>) {
        match (style, self.shadow) {
            (Some(style), Some(id)) => {
                if let Some(layer) = self.layers.layer_as_mut::<ShadowLayer>(id) {
                    layer.set_color(style.color);
                    layer.set_blur_radius(style.blur_radius);
                }
            }
            (Some(style), None) => {
                let layer = ShadowLayer::new(style.color, style.blur_radius);
                self.shadow = Some(self.layers.insert_layer_at(0, Box::new(layer)));
            }
            (None, Some(id)) => {
                self.layers.remove_layer(id);
                self.shadow = None;
            }
            (None, None) => {}
        }
        self.shadow_style = style;
        self.update_padding();
    }

    #[cfg(test)]
    pub(crate) fn shadow_layer(&self) -> Option<&ShadowLayer> {
        self.layers.layer_as::<ShadowLayer>(self.shadow?)
    }

    pub(crate) fn set_padding(&mut self, padding: f64) {
        self.padding = padding.max(0.0);
        self.update_padding();
    }

    fn update_padding(&mut self) {
        let shadow = self.shadow_style.map_or(0.0, |s| s.extent());
        self.layers.set_needed_padding(self.padding.max(shadow));
    }

    /// Place the layers around the content rectangle and give them `paths`.
    pub(crate) fn apply(&mut self, paths: BoxPaths) {
        let content = self.layers.content_rect();
        let BoxPaths {
            fill,
            border,
            square,
        } = paths;

        if let (Some(id), Some(style)) = (self.shadow, self.shadow_style) {
            let blur = style.blur_radius.max(0.0);
            let bounds: Rect = content.inflate(blur, blur) + style.offset;
            let mut path = fill.clone();
            path.apply_affine(Affine::translate((blur, blur)));
            if let Some(layer) = self.layers.layer_mut(id) {
                layer.set_bounds(bounds);
                layer.set_shape(ShapeKind::CustomPath(path));
            }
        }
        // Square outlines stay `Rectangle` so the background can report itself opaque.
        let (fill, border) = if square {
            (ShapeKind::Rectangle, ShapeKind::Rectangle)
        } else {
            (ShapeKind::CustomPath(fill), ShapeKind::CustomPath(border))
        };
        if let Some(layer) = self.layers.layer_mut(self.background) {
            layer.set_bounds(content);
            layer.set_shape(fill);
        }
        if let Some(layer) = self.layers.layer_mut(self.border) {
            layer.set_bounds(content);
            layer.set_shape(border);
        }

        self.relayouts += 1;
        tracing::debug!(?content, relayouts = self.relayouts, "relayout");
    }
}
