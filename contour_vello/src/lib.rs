// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello rendering utilities for Contour.

use contour::{
    peniko::{
        kurbo::{Affine, BezPath, Rect, Shape, Stroke},
        Color, Fill, Mix,
    },
    DisplayItem, DisplayList, Paint, RasterHandle,
};

use vello::Scene;

extern crate alloc;
use alloc::collections::BTreeMap;

/// Shape rendered into a blur buffer, kept until the buffer is released.
#[derive(Clone, Copy, Debug)]
struct BlurredShape {
    rect: Rect,
    corner_radius: f64,
    color: Color,
    std_dev: f64,
}

impl BlurredShape {
    fn new(path: &BezPath, paint: &Paint, radius: f64) -> Self {
        let rect = path.bounding_box();
        // A rounded rectangle misses (4 - π) r² of its bounding box.
        let missing = (rect.area() - path.area().abs()).max(0.0);
        let corner_radius = (missing / (4.0 - core::f64::consts::PI))
            .sqrt()
            .min(rect.width().min(rect.height()) * 0.5);
        Self {
            rect,
            corner_radius,
            color: paint.color,
            std_dev: radius.max(0.0) * 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SavedState {
    transform: Affine,
    clip_depth: usize,
}

/// State kept between frames.
///
/// Blur buffers outlive the frame they were rendered in, so the same
/// environment should be used for every replay of a given drawable.
#[derive(Debug, Default)]
pub struct Environment {
    buffers: BTreeMap<RasterHandle, BlurredShape>,
}

impl Environment {
    /// Number of blur buffers currently alive.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Add a [`DisplayList`] to a Vello [`Scene`].
    ///
    /// Blurred buffers are drawn as blurred rounded rectangles covering the
    /// blurred shape's bounding box. Dithering and color filters are not
    /// supported by Vello and are ignored.
    #[tracing::instrument(skip_all)]
    pub fn add_display_list_to_scene(&mut self, scene: &mut Scene, list: &DisplayList) {
        let mut transform = Affine::IDENTITY;
        let mut clip_depth = 0_usize;
        let mut stack: Vec<SavedState> = Vec::new();

        for item in &list.items {
            match item {
                DisplayItem::Fill { path, paint } => {
                    scene.fill(Fill::NonZero, transform, paint.color, None, path);
                }
                DisplayItem::Stroke { path, paint, width } => {
                    scene.stroke(&Stroke::new(*width), transform, paint.color, None, path);
                }
                DisplayItem::BlurIntoBuffer {
                    buffer,
                    path,
                    paint,
                    radius,
                } => {
                    self.buffers
                        .insert(*buffer, BlurredShape::new(path, paint, *radius));
                }
                DisplayItem::Composite { buffer, origin } => {
                    let Some(shape) = self.buffers.get(buffer) else {
                        tracing::error!(?buffer, "compositing unknown buffer");
                        continue;
                    };
                    scene.draw_blurred_rounded_rect(
                        transform * Affine::translate(origin.to_vec2()),
                        shape.rect,
                        shape.color,
                        shape.corner_radius,
                        shape.std_dev,
                    );
                }
                DisplayItem::Release(buffer) => {
                    self.buffers.remove(buffer);
                }
                DisplayItem::Clip(rect) => {
                    scene.push_layer(Mix::Clip, 1.0, transform, rect);
                    clip_depth += 1;
                }
                DisplayItem::Translate(delta) => {
                    transform *= Affine::translate(*delta);
                }
                DisplayItem::Save => stack.push(SavedState {
                    transform,
                    clip_depth,
                }),
                DisplayItem::Restore => {
                    let Some(saved) = stack.pop() else {
                        tracing::error!("restore without matching save");
                        continue;
                    };
                    for _ in saved.clip_depth..clip_depth {
                        scene.pop_layer();
                    }
                    transform = saved.transform;
                    clip_depth = saved.clip_depth;
                }
            }
        }

        for _ in 0..clip_depth {
            scene.pop_layer();
        }
    }
}
