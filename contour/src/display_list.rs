// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate alloc;
use alloc::vec::Vec;

use peniko::kurbo::{BezPath, Point, Rect, Vec2};

use crate::surface::{Paint, RasterHandle, Surface};

/// Items for [`DisplayList`]
#[derive(Clone, Debug)]
pub enum DisplayItem {
    /// See [`Surface::fill`].
    Fill {
        /// Filled path.
        path: BezPath,
        /// Paint used.
        paint: Paint,
    },
    /// See [`Surface::stroke`].
    Stroke {
        /// Stroked path.
        path: BezPath,
        /// Paint used.
        paint: Paint,
        /// Stroke width.
        width: f64,
    },
    /// See [`Surface::blur_into_buffer`].
    BlurIntoBuffer {
        /// Buffer that was allocated.
        buffer: RasterHandle,
        /// Blurred path.
        path: BezPath,
        /// Paint used.
        paint: Paint,
        /// Blur radius.
        radius: f64,
    },
    /// See [`Surface::composite_buffer`].
    Composite {
        /// Buffer to draw.
        buffer: RasterHandle,
        /// Where its origin goes.
        origin: Point,
    },
    /// See [`Surface::release_buffer`].
    Release(RasterHandle),
    /// See [`Surface::clip_to`].
    Clip(Rect),
    /// See [`Surface::translate_origin`].
    Translate(Vec2),
    /// See [`Surface::save`].
    Save,
    /// See [`Surface::restore`].
    Restore,
}

/// Surface that records what is drawn onto it.
#[derive(Debug, Default)]
pub struct DisplayList {
    /// Items in DisplayList
    pub items: Vec<DisplayItem>,
    next_buffer: u32,
}

impl DisplayList {
    /// Push a [`DisplayItem`], returning its index.
    pub fn push(&mut self, i: impl Into<DisplayItem>) -> usize {
        let n = self.items.len();
        self.items.push(i.into());
        n
    }

    /// Remove all items. Buffer handles keep counting up.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of fills recorded.
    pub fn fill_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DisplayItem::Fill { .. }))
            .count()
    }

    /// Number of strokes recorded.
    pub fn stroke_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DisplayItem::Stroke { .. }))
            .count()
    }

    /// Number of blurred buffers rendered.
    pub fn blur_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DisplayItem::BlurIntoBuffer { .. }))
            .count()
    }
}

impl Surface for DisplayList {
    fn fill(&mut self, path: &BezPath, paint: &Paint) {
        self.push(DisplayItem::Fill {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn stroke(&mut self, path: &BezPath, paint: &Paint, width: f64) {
        self.push(DisplayItem::Stroke {
            path: path.clone(),
            paint: *paint,
            width,
        });
    }

    fn blur_into_buffer(&mut self, path: &BezPath, paint: &Paint, radius: f64) -> RasterHandle {
        let buffer = RasterHandle(self.next_buffer);
        self.next_buffer = self.next_buffer.wrapping_add(1);
        self.push(DisplayItem::BlurIntoBuffer {
            buffer,
            path: path.clone(),
            paint: *paint,
            radius,
        });
        buffer
    }

    fn composite_buffer(&mut self, buffer: RasterHandle, origin: Point) {
        self.push(DisplayItem::Composite { buffer, origin });
    }

    fn release_buffer(&mut self, buffer: RasterHandle) {
        self.push(DisplayItem::Release(buffer));
    }

    fn clip_to(&mut self, rect: Rect) {
        self.push(DisplayItem::Clip(rect));
    }

    fn translate_origin(&mut self, delta: Vec2) {
        self.push(DisplayItem::Translate(delta));
    }

    fn save(&mut self) {
        self.push(DisplayItem::Save);
    }

    fn restore(&mut self) {
        self.push(DisplayItem::Restore);
    }
}
