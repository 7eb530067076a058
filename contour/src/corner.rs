// Copyright 2025 the Contour Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Corner selection for partially rounded rectangles.

use bitflags::bitflags;

bitflags! {
    /// Set of rectangle corners that are drawn rounded.
    ///
    /// A corner is rounded iff its bit is set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CornerMask: u8 {
        /// Top left corner.
        const TOP_LEFT = 0b0001;
        /// Top right corner.
        const TOP_RIGHT = 0b0010;
        /// Bottom left corner.
        const BOTTOM_LEFT = 0b0100;
        /// Bottom right corner.
        const BOTTOM_RIGHT = 0b1000;
    }
}

impl CornerMask {
    /// Every corner rounded.
    pub const ALL_CORNERS: Self = Self::all();
    /// No corner rounded.
    pub const NO_CORNERS: Self = Self::empty();
    /// Both top corners.
    pub const TOP: Self = Self::TOP_LEFT.union(Self::TOP_RIGHT);
    /// Both bottom corners.
    pub const BOTTOM: Self = Self::BOTTOM_LEFT.union(Self::BOTTOM_RIGHT);

    /// `true` if `corner` is rounded.
    #[inline]
    pub fn is_rounded(self, corner: Corner) -> bool {
        self.contains(corner.mask())
    }

    /// Radius to use at `corner`, given the shared radius for rounded corners.
    #[inline]
    pub fn radius_at(self, corner: Corner, radius: f64) -> f64 {
        if self.is_rounded(corner) {
            radius
        } else {
            0.0
        }
    }
}

/// One of the four corners of a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Top left.
    TopLeft,
    /// Top right.
    TopRight,
    /// Bottom right.
    BottomRight,
    /// Bottom left.
    BottomLeft,
}

impl Corner {
    /// The single-bit mask for this corner.
    pub const fn mask(self) -> CornerMask {
        match self {
            Self::TopLeft => CornerMask::TOP_LEFT,
            Self::TopRight => CornerMask::TOP_RIGHT,
            Self::BottomRight => CornerMask::BOTTOM_RIGHT,
            Self::BottomLeft => CornerMask::BOTTOM_LEFT,
        }
    }
}
