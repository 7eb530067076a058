// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contour builds brand-styled widget chrome out of simple geometry.
//!
//! - [`ShapePathBuilder`] turns a box, a corner radius and a [`CornerMask`]
//!   into a closed [`Outline`], optionally with a speech-bubble tail.
//! - [`constrain_shape`] fits a wanted radius and [`TailStyle`] into the space
//!   actually available.
//! - [`LayeredDrawable`] stacks [`Drawable`] layers and paints them as one
//!   unit onto any [`Surface`]; [`CornerBox`] and [`NotificationFrame`] are
//!   ready-made stacks of background, border and shadow.
//! - [`DisplayList`] records what is drawn, for tests and for replay into a
//!   real renderer.
//!
//! Geometry is recomputed when properties change, never while drawing.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

pub use peniko;

mod composite;
mod corner;
mod corner_box;
mod display_list;
mod floatfuncs;
mod frame;
mod layer;
mod layered;
mod outline;
mod shape;
mod surface;
mod tail;

pub use composite::{BorderStyle, ShadowStyle};
pub use corner::{Corner, CornerMask};
pub use corner_box::CornerBox;
pub use display_list::{DisplayItem, DisplayList};
pub use frame::NotificationFrame;
pub use layer::{BorderLayer, Drawable, FillLayer, LayerState, Opacity, ShadowLayer};
pub use layered::{LayerId, LayeredDrawable};
pub use outline::{Outline, OutlineSeg, ShapePathBuilder};
pub use shape::{ShapeKind, ShapeState};
pub use surface::{ColorFilter, Paint, RasterHandle, Surface};
pub use tail::{
    constrain_shape, ConstrainedShape, Side, TailDescriptor, TailStyle, TipPosition,
};
