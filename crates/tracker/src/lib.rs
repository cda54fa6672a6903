// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

//! motrack - Identity tracking
//!
//! Associates per-frame detections with persistent integer identities. The
//! [`centroid::CentroidTracker`] keeps exactly one frame of state: each call
//! to [`Tracker::update`] matches new boxes against the centroids emitted by
//! the previous call and forgets everything it did not re-emit.

use std::fmt::Debug;

pub mod centroid;
pub mod error;
mod geometry;
mod registry;

pub use centroid::{CentroidTracker, CentroidTrackerBuilder, DuplicatePolicy};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Centroid};

/// Default matching distance in pixels.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 25.0;

pub trait DetectionBox: Debug {
    fn bbox(&self) -> BoundingBox;
}

impl DetectionBox for BoundingBox {
    fn bbox(&self) -> BoundingBox {
        *self
    }
}

/// A detection paired with the identity assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: u64,
    pub bbox: BoundingBox,
    pub centroid: Centroid,
}

/// A live registry entry: an identity and its last-known centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTrack {
    pub id: u64,
    pub centroid: Centroid,
}

pub trait Tracker<T: DetectionBox> {
    /// Assigns an identity to every box, in input order. The output always
    /// has the same length as `boxes`.
    fn update(&mut self, boxes: &[T]) -> Vec<TrackInfo>;

    /// Identities emitted by the most recent update, in scan order.
    fn get_active_tracks(&self) -> Vec<ActiveTrack>;
}

/// Rejects the first malformed box in a frame, reporting its position.
pub fn validate_detections<T: DetectionBox>(boxes: &[T]) -> Result<()> {
    for (i, b) in boxes.iter().enumerate() {
        match b.bbox().validate() {
            Ok(()) => {}
            Err(Error::InvalidInput(msg)) => {
                return Err(Error::InvalidInput(format!("detection {i}: {msg}")));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
