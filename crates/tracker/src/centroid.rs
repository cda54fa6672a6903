// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

use crate::{
    registry::Registry, validate_detections, ActiveTrack, DetectionBox, Result, TrackInfo,
    Tracker, DEFAULT_DISTANCE_THRESHOLD,
};
use log::{debug, trace};

/// How a second detection in the same frame may claim an identity that was
/// already emitted during that frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Any registry entry stays a candidate for the whole frame, including
    /// entries matched or created earlier in it. Two nearby detections can
    /// therefore share one identity; the entry keeps the last centroid.
    #[default]
    Merge,
    /// An identity is emitted at most once per frame. Once matched or
    /// created it leaves the candidate pool until the next frame.
    Exclusive,
}

/// Greedy nearest-centroid tracker with one frame of memory.
///
/// Each box is matched against the registry in scan order and takes the
/// identity of the first entry whose centroid lies strictly within
/// `distance_threshold`. Unmatched boxes receive a fresh identity. After the
/// frame, only identities emitted in it survive; identity values are never
/// reused.
#[derive(Debug, Clone)]
pub struct CentroidTracker {
    distance_threshold: f64,
    policy: DuplicatePolicy,
    registry: Registry,
    next_id: u64,
    frame_count: u64,
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CentroidTracker {
    pub fn new() -> CentroidTracker {
        CentroidTracker {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            policy: DuplicatePolicy::Merge,
            registry: Registry::default(),
            next_id: 0,
            frame_count: 0,
        }
    }

    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// The identity the next unmatched detection will receive. Equals the
    /// number of identities allocated so far.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Number of update calls processed.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Validates every box before updating. On error the tracker state is
    /// left untouched.
    pub fn try_update<T: DetectionBox>(&mut self, boxes: &[T]) -> Result<Vec<TrackInfo>> {
        validate_detections(boxes)?;
        Ok(self.update(boxes))
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl<T> Tracker<T> for CentroidTracker
where
    T: DetectionBox,
{
    fn update(&mut self, boxes: &[T]) -> Vec<TrackInfo> {
        self.frame_count += 1;
        let skip_emitted = self.policy == DuplicatePolicy::Exclusive;

        let mut tracks = Vec::with_capacity(boxes.len());
        for detection in boxes {
            let bbox = detection.bbox();
            let centroid = bbox.centroid();

            let id = match self.registry.find_first_within(
                &centroid,
                self.distance_threshold,
                skip_emitted,
            ) {
                Some(index) => {
                    let id = self.registry.id(index);
                    trace!("Matched {:?} to id {}", bbox, id);
                    self.registry.refresh(index, centroid);
                    id
                }
                None => {
                    let id = self.allocate_id();
                    debug!("New id {} at {:?}", id, centroid);
                    self.registry.insert(id, centroid);
                    id
                }
            };

            tracks.push(TrackInfo { id, bbox, centroid });
        }

        for id in self.registry.end_frame() {
            debug!("Id {} dropped after frame {}", id, self.frame_count);
        }

        tracks
    }

    fn get_active_tracks(&self) -> Vec<ActiveTrack> {
        self.registry.iter().copied().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CentroidTrackerBuilder {
    distance_threshold: Option<f64>,
    policy: DuplicatePolicy,
}

impl CentroidTrackerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching distance in pixels. A detection matches an entry only when
    /// the centroid distance is strictly less than this value.
    pub fn distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = Some(threshold);
        self
    }

    pub fn policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> CentroidTracker {
        CentroidTracker {
            distance_threshold: self
                .distance_threshold
                .unwrap_or(DEFAULT_DISTANCE_THRESHOLD),
            policy: self.policy,
            ..CentroidTracker::new()
        }
    }

    /// Like [`build`](Self::build) but rejects a threshold that is not a
    /// finite positive number.
    pub fn try_build(self) -> Result<CentroidTracker> {
        if let Some(t) = self.distance_threshold {
            if !t.is_finite() || t <= 0.0 {
                return Err(crate::Error::InvalidConfig(format!(
                    "distance threshold must be finite and positive, got {t}"
                )));
            }
        }
        Ok(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::{CentroidTracker, CentroidTrackerBuilder, DuplicatePolicy};
    use crate::{ActiveTrack, BoundingBox, Centroid, DetectionBox, Error, Tracker};

    /// Detection type carrying extra fields the tracker ignores
    #[derive(Debug, Clone)]
    struct MockDetection {
        bbox: BoundingBox,
        #[allow(dead_code)]
        score: f32,
    }

    impl MockDetection {
        fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
            Self {
                bbox: BoundingBox::new(x, y, w, h),
                score: 1.0,
            }
        }
    }

    impl DetectionBox for MockDetection {
        fn bbox(&self) -> BoundingBox {
            self.bbox
        }
    }

    fn b(x: i32, y: i32, w: i32, h: i32) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    fn ids(tracks: &[crate::TrackInfo]) -> Vec<u64> {
        tracks.iter().map(|t| t.id).collect()
    }

    fn active(tracker: &CentroidTracker) -> Vec<ActiveTrack> {
        <CentroidTracker as Tracker<BoundingBox>>::get_active_tracks(tracker)
    }

    fn exclusive() -> CentroidTracker {
        CentroidTrackerBuilder::new()
            .policy(DuplicatePolicy::Exclusive)
            .build()
    }

    #[test]
    fn test_centroid_tracker_new() {
        let tracker = CentroidTracker::new();
        assert_eq!(tracker.distance_threshold(), 25.0);
        assert_eq!(tracker.policy(), DuplicatePolicy::Merge);
        assert_eq!(tracker.next_id(), 0);
        assert_eq!(tracker.frame_count(), 0);
        assert!(active(&tracker).is_empty());
    }

    #[test]
    fn test_output_matches_input_order() {
        let mut tracker = CentroidTracker::new();
        let boxes = vec![b(400, 10, 5, 5), b(10, 10, 20, 20), b(200, 200, 8, 3)];
        let tracks = tracker.update(&boxes);

        assert_eq!(tracks.len(), boxes.len());
        for (track, input) in tracks.iter().zip(&boxes) {
            assert_eq!(track.bbox, *input);
            assert_eq!(track.centroid, input.centroid());
        }
    }

    #[test]
    fn test_small_move_keeps_identity() {
        let mut tracker = CentroidTracker::new();
        let first = tracker.update(&[b(10, 10, 20, 20)]);
        assert_eq!(ids(&first), vec![0]);

        // centroid (20,20) -> (22,21), distance ~2.2
        let second = tracker.update(&[b(12, 11, 20, 20)]);
        assert_eq!(ids(&second), vec![0]);
        assert_eq!(tracker.next_id(), 1);
    }

    #[test]
    fn test_missed_frame_retires_identity() {
        let mut tracker = CentroidTracker::new();
        assert_eq!(ids(&tracker.update(&[b(0, 0, 10, 10)])), vec![0]);

        let empty: Vec<BoundingBox> = vec![];
        assert!(tracker.update(&empty).is_empty());
        assert!(active(&tracker).is_empty());

        // same centroid as before, but the old identity is gone for good
        assert_eq!(ids(&tracker.update(&[b(0, 0, 10, 10)])), vec![1]);
    }

    #[test]
    fn test_far_apart_boxes_get_distinct_ids() {
        let mut tracker = CentroidTracker::new();
        // centroids (5,5) and (500,500)
        let tracks = tracker.update(&[b(0, 0, 10, 10), b(495, 495, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0, 1]);
        assert_eq!(tracks[0].centroid, Centroid::new(5, 5));
        assert_eq!(tracks[1].centroid, Centroid::new(500, 500));
    }

    #[test]
    fn test_same_frame_duplicates_merge() {
        let mut tracker = CentroidTracker::new();
        // centroids (5,5) and (6,5), distance 1
        let tracks = tracker.update(&[b(0, 0, 10, 10), b(1, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0, 0]);
        assert_eq!(tracker.next_id(), 1);

        // one registry entry, holding the last centroid
        let live = active(&tracker);
        assert_eq!(
            live,
            vec![ActiveTrack {
                id: 0,
                centroid: Centroid::new(6, 5)
            }]
        );
    }

    #[test]
    fn test_same_frame_duplicates_exclusive() {
        let mut tracker = exclusive();
        let tracks = tracker.update(&[b(0, 0, 10, 10), b(1, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0, 1]);

        let live = active(&tracker);
        assert_eq!(live.len(), tracks.len());
    }

    #[test]
    fn test_exclusive_second_detection_takes_next_candidate() {
        let mut tracker = exclusive();
        tracker.update(&[b(0, 0, 10, 10), b(30, 0, 10, 10)]); // (5,5)=0, (35,5)=1

        // (20,5) is 15 from both; 0 comes first in scan order and is taken
        // by the first box, so the second box falls through to id 1
        let tracks = tracker.update(&[b(15, 0, 10, 10), b(15, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0, 1]);
        assert_eq!(tracker.next_id(), 2);
    }

    #[test]
    fn test_merge_second_detection_reuses_first_match() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10), b(30, 0, 10, 10)]);

        let tracks = tracker.update(&[b(15, 0, 10, 10), b(15, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0, 0]);

        // id 1 was not re-emitted and is gone
        let live = active(&tracker);
        assert_eq!(live.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_distance_equal_to_threshold_is_not_a_match() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10)]); // (5,5)

        // (30,5) is exactly 25 away
        let tracks = tracker.update(&[b(25, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![1]);
    }

    #[test]
    fn test_distance_just_below_threshold_matches() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10)]); // (5,5)

        // (29,5) is 24 away
        let tracks = tracker.update(&[b(24, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0]);
    }

    #[test]
    fn test_custom_threshold() {
        let mut tracker = CentroidTrackerBuilder::new()
            .distance_threshold(5.0)
            .build();
        tracker.update(&[b(0, 0, 10, 10)]);
        let tracks = tracker.update(&[b(6, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![1]);
    }

    #[test]
    fn test_match_follows_scan_order_not_proximity() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10), b(30, 0, 10, 10)]); // (5,5)=0, (35,5)=1

        // (22,5) is closer to 1, but 0 is scanned first and is within range
        let tracks = tracker.update(&[b(17, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![0]);
    }

    #[test]
    fn test_registry_order_follows_previous_emission() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10), b(30, 0, 10, 10)]); // 0 at (5,5), 1 at (35,5)

        // emit 1 first this time
        tracker.update(&[b(32, 0, 10, 10), b(-5, 0, 10, 10)]); // 1 at (37,5), 0 at (0,5)
        let live = active(&tracker);
        assert_eq!(live.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 0]);

        // (19,5) is within range of both; 1 now comes first
        let tracks = tracker.update(&[b(14, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![1]);
    }

    #[test]
    fn test_new_identity_is_candidate_within_frame_under_merge() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(500, 500, 10, 10)]); // id 0, far away

        let tracks = tracker.update(&[b(0, 0, 10, 10), b(2, 2, 10, 10)]);
        assert_eq!(ids(&tracks), vec![1, 1]);
    }

    #[test]
    fn test_counter_never_resets() {
        let mut tracker = CentroidTracker::new();
        let empty: Vec<BoundingBox> = vec![];
        for frame in 0..5 {
            let tracks = tracker.update(&[b(frame * 1000, 0, 10, 10)]);
            assert_eq!(ids(&tracks), vec![frame as u64]);
            tracker.update(&empty);
        }
        assert_eq!(tracker.next_id(), 5);
        assert_eq!(tracker.frame_count(), 10);
    }

    #[test]
    fn test_empty_update_clears_registry() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10), b(100, 0, 10, 10), b(200, 0, 10, 10)]);
        assert_eq!(
            active(&tracker).len(),
            3
        );

        let empty: Vec<BoundingBox> = vec![];
        assert!(tracker.update(&empty).is_empty());
        assert!(active(&tracker).is_empty());
        assert_eq!(tracker.next_id(), 3);
    }

    #[test]
    fn test_partial_frame_drops_unseen() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10), b(100, 0, 10, 10)]); // 0, 1

        let tracks = tracker.update(&[b(101, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![1]);

        // 0 missed one frame and cannot come back
        let tracks = tracker.update(&[b(0, 0, 10, 10), b(101, 0, 10, 10)]);
        assert_eq!(ids(&tracks), vec![2, 1]);
    }

    #[test]
    fn test_generic_detection_type() {
        let mut tracker = CentroidTracker::new();
        let det1 = vec![MockDetection::new(10, 10, 20, 20)];
        let res1 = tracker.update(&det1);
        let det2 = vec![MockDetection::new(12, 11, 20, 20)];
        let res2 = tracker.update(&det2);

        assert_eq!(res1[0].id, res2[0].id);
        assert_eq!(res2[0].bbox, det2[0].bbox);
    }

    #[test]
    fn test_try_update_rejects_malformed_box() {
        let mut tracker = CentroidTracker::new();
        tracker.update(&[b(0, 0, 10, 10)]);

        let err = tracker
            .try_update(&[b(0, 0, 10, 10), b(5, 5, 0, 4)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        // state unchanged: id 0 is still live and no frame was counted
        assert_eq!(tracker.frame_count(), 1);
        let tracks = tracker.try_update(&[b(0, 0, 10, 10)]).unwrap();
        assert_eq!(ids(&tracks), vec![0]);
    }

    #[test]
    fn test_try_build_rejects_bad_threshold() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let res = CentroidTrackerBuilder::new().distance_threshold(t).try_build();
            assert!(matches!(res, Err(Error::InvalidConfig(_))), "{t}");
        }
        let tracker = CentroidTrackerBuilder::new()
            .distance_threshold(40.0)
            .try_build()
            .unwrap();
        assert_eq!(tracker.distance_threshold(), 40.0);
    }
}
