// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

//! Tracker C API - Identity tracking with the centroid tracker.
//!
//! This module provides per-frame identity assignment for detection boxes.

use crate::error::set_error;
use crate::{check_null, check_null_ret_null, try_or_null};
use libc::{c_int, size_t};
use motrack_tracker::{
    ActiveTrack, BoundingBox, CentroidTracker, CentroidTrackerBuilder, DuplicatePolicy, TrackInfo,
    Tracker,
};

/// Detection box in pixel coordinates, top-left origin.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MotBox {
    pub x: i32,
    pub y: i32,
    /// Must be positive
    pub width: i32,
    /// Must be positive
    pub height: i32,
}

impl From<&MotBox> for BoundingBox {
    fn from(b: &MotBox) -> Self {
        BoundingBox::new(b.x, b.y, b.width, b.height)
    }
}

impl From<BoundingBox> for MotBox {
    fn from(b: BoundingBox) -> Self {
        Self {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

/// Track information for a tracked object.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MotTrackInfo {
    /// Persistent identity, allocated from 0 and never reused
    pub id: u64,
    /// The detection box this identity was assigned to. Zeroed for entries
    /// returned by `mot_centroid_tracker_get_active_tracks`.
    pub bbox: MotBox,
    /// Centroid X (floored)
    pub cx: i64,
    /// Centroid Y (floored)
    pub cy: i64,
}

impl From<&TrackInfo> for MotTrackInfo {
    fn from(info: &TrackInfo) -> Self {
        Self {
            id: info.id,
            bbox: info.bbox.into(),
            cx: info.centroid.x,
            cy: info.centroid.y,
        }
    }
}

impl From<&ActiveTrack> for MotTrackInfo {
    fn from(track: &ActiveTrack) -> Self {
        Self {
            id: track.id,
            bbox: BoundingBox::default().into(),
            cx: track.centroid.x,
            cy: track.centroid.y,
        }
    }
}

/// Opaque centroid tracker type.
pub struct MotCentroidTracker {
    inner: CentroidTracker,
}

/// List of track info results.
pub struct MotTrackInfoList {
    tracks: Vec<MotTrackInfo>,
}

// ============================================================================
// Centroid Tracker Functions
// ============================================================================

/// Create a new centroid tracker with specified parameters.
///
/// @param distance_threshold Matching distance in pixels (strictly less-than)
/// @param exclusive Non-zero to emit each identity at most once per frame
/// @return New tracker handle on success, NULL on error
/// @par Errors (errno):
/// - EINVAL: Threshold is not a finite positive number
#[no_mangle]
pub extern "C" fn mot_centroid_tracker_new(
    distance_threshold: f64,
    exclusive: c_int,
) -> *mut MotCentroidTracker {
    let policy = if exclusive != 0 {
        DuplicatePolicy::Exclusive
    } else {
        DuplicatePolicy::Merge
    };
    let tracker = try_or_null!(
        CentroidTrackerBuilder::new()
            .distance_threshold(distance_threshold)
            .policy(policy)
            .try_build(),
        libc::EINVAL
    );

    Box::into_raw(Box::new(MotCentroidTracker { inner: tracker }))
}

/// Create a new centroid tracker with default parameters.
///
/// Default values:
/// - distance_threshold: 25.0
/// - duplicates within a frame merge into one identity
///
/// @return New tracker handle
#[no_mangle]
pub extern "C" fn mot_centroid_tracker_new_default() -> *mut MotCentroidTracker {
    Box::into_raw(Box::new(MotCentroidTracker {
        inner: CentroidTracker::new(),
    }))
}

/// Update the tracker with one frame of detections.
///
/// The returned list has one entry per input box, in input order. An empty
/// frame clears every live identity.
///
/// @param tracker Tracker handle
/// @param boxes Array of detection boxes (may be NULL if num_boxes is 0)
/// @param num_boxes Number of boxes
/// @return Track info list (caller must free), NULL on error
/// @par Errors (errno):
/// - EINVAL: NULL tracker, NULL boxes with num_boxes > 0, or a box with
///   non-positive width or height. The tracker state is not modified.
#[no_mangle]
pub unsafe extern "C" fn mot_centroid_tracker_update(
    tracker: *mut MotCentroidTracker,
    boxes: *const MotBox,
    num_boxes: size_t,
) -> *mut MotTrackInfoList {
    check_null_ret_null!(tracker);

    let boxes: Vec<BoundingBox> = if num_boxes == 0 {
        Vec::new()
    } else {
        check_null_ret_null!(boxes);
        std::slice::from_raw_parts(boxes, num_boxes)
            .iter()
            .map(BoundingBox::from)
            .collect()
    };

    let results = try_or_null!((*tracker).inner.try_update(&boxes), libc::EINVAL);
    let tracks = results.iter().map(MotTrackInfo::from).collect();

    Box::into_raw(Box::new(MotTrackInfoList { tracks }))
}

/// Get all identities emitted by the most recent update, in scan order.
///
/// @param tracker Tracker handle
/// @return Track info list (caller must free), NULL on error
/// @par Errors (errno):
/// - EINVAL: Invalid argument (NULL tracker)
#[no_mangle]
pub unsafe extern "C" fn mot_centroid_tracker_get_active_tracks(
    tracker: *const MotCentroidTracker,
) -> *mut MotTrackInfoList {
    check_null_ret_null!(tracker);

    let tracks = <CentroidTracker as Tracker<BoundingBox>>::get_active_tracks(&(*tracker).inner)
        .iter()
        .map(MotTrackInfo::from)
        .collect();
    Box::into_raw(Box::new(MotTrackInfoList { tracks }))
}

/// Get the identity the next new object will receive.
///
/// This is also the number of distinct objects seen so far.
///
/// @param tracker Tracker handle
/// @return Next identity, or 0 if tracker is NULL
#[no_mangle]
pub unsafe extern "C" fn mot_centroid_tracker_next_id(tracker: *const MotCentroidTracker) -> u64 {
    if tracker.is_null() {
        return 0;
    }
    (*tracker).inner.next_id()
}

/// Free a centroid tracker.
///
/// @param tracker Tracker handle to free (can be NULL, no-op)
#[no_mangle]
pub unsafe extern "C" fn mot_centroid_tracker_free(tracker: *mut MotCentroidTracker) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

// ============================================================================
// Track Info List Functions
// ============================================================================

/// Get the number of tracks in a list.
///
/// @param list Track info list handle
/// @return Number of tracks, or 0 if list is NULL
#[no_mangle]
pub unsafe extern "C" fn mot_track_info_list_len(list: *const MotTrackInfoList) -> size_t {
    if list.is_null() {
        return 0;
    }
    (*list).tracks.len()
}

/// Get a track info from a list by index.
///
/// @param list Track info list handle
/// @param index Index of the track (0-based)
/// @param out_info Output parameter for the track info
/// @return 0 on success, -1 on error
/// @par Errors (errno):
/// - EINVAL: Invalid argument (NULL list/out_info, index out of bounds)
#[no_mangle]
pub unsafe extern "C" fn mot_track_info_list_get(
    list: *const MotTrackInfoList,
    index: size_t,
    out_info: *mut MotTrackInfo,
) -> c_int {
    check_null!(list, out_info);

    if index >= (*list).tracks.len() {
        return set_error(libc::EINVAL);
    }

    *out_info = (&(*list).tracks)[index];
    0
}

/// Free a track info list.
///
/// @param list Track info list handle to free (can be NULL, no-op)
#[no_mangle]
pub unsafe extern "C" fn mot_track_info_list_free(list: *mut MotTrackInfoList) {
    if !list.is_null() {
        drop(Box::from_raw(list));
    }
}
