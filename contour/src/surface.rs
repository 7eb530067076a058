// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering capability drawables paint onto.

use peniko::{
    kurbo::{BezPath, Point, Rect, Vec2},
    Color,
};

/// Opaque color filter handle, forwarded to the [`Surface`] untouched.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColorFilter(pub u32);

/// Opaque handle to an offscreen raster produced by [`Surface::blur_into_buffer`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RasterHandle(pub u32);

/// Paint parameters for a fill, stroke or blur.
#[derive(Copy, Clone, Debug)]
pub struct Paint {
    /// Color, with the drawable's opacity already multiplied into its alpha.
    pub color: Color,
    /// Request dithering where the backend supports it.
    pub dither: bool,
    /// Color filter to apply, if any.
    pub color_filter: Option<ColorFilter>,
}

impl Paint {
    /// Plain paint of `color` without dithering or filter.
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            dither: false,
            color_filter: None,
        }
    }
}

/// A rendering target.
///
/// Paths and offsets are in the surface's current coordinate space, which
/// [`translate_origin`](Surface::translate_origin) moves and
/// [`save`](Surface::save)/[`restore`](Surface::restore) bracket.
pub trait Surface {
    /// Fill a closed path.
    fn fill(&mut self, path: &BezPath, paint: &Paint);

    /// Stroke a closed path centered on its outline.
    fn stroke(&mut self, path: &BezPath, paint: &Paint, width: f64);

    /// Render a blurred fill of `path` into an offscreen buffer.
    ///
    /// The buffer's origin is the current origin; it is not drawn until
    /// passed to [`composite_buffer`](Surface::composite_buffer).
    fn blur_into_buffer(&mut self, path: &BezPath, paint: &Paint, radius: f64) -> RasterHandle;

    /// Draw a buffer with its origin placed at `origin`.
    fn composite_buffer(&mut self, buffer: RasterHandle, origin: Point);

    /// Signal that a buffer will not be composited again.
    fn release_buffer(&mut self, buffer: RasterHandle) {
        let _ = buffer;
    }

    /// Intersect the current clip with `rect`.
    fn clip_to(&mut self, rect: Rect);

    /// Move the origin of the coordinate space.
    fn translate_origin(&mut self, delta: Vec2);

    /// Push the current origin and clip.
    fn save(&mut self);

    /// Pop to the origin and clip of the matching [`save`](Surface::save).
    fn restore(&mut self);
}
