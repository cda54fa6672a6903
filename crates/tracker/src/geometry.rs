// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

use crate::{Error, Result};

/// Axis-aligned box in pixel coordinates, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box, rejecting non-positive width or height.
    pub fn try_new(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        let b = Self::new(x, y, width, height);
        b.validate()?;
        Ok(b)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidInput(format!(
                "box ({}, {}, {}, {}) must have positive width and height",
                self.x, self.y, self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Center of the box. Halves are floored, which rounds toward the
    /// top-left corner for both positive and negative coordinates.
    pub fn centroid(&self) -> Centroid {
        let x = self.x as i64;
        let y = self.y as i64;
        Centroid {
            x: (x + x + self.width as i64).div_euclid(2),
            y: (y + y + self.height as i64).div_euclid(2),
        }
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from(b: [i32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Centroid {
    pub x: i64,
    pub y: i64,
}

impl Centroid {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(&self, other: &Centroid) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }
}
