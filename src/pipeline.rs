// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

//! Frame stream driver.
//!
//! Each input line is one frame: a JSON array of boxes, either as
//! `[x, y, w, h]` arrays or as `{"x", "y", "width", "height"}` objects. Each
//! processed frame produces one output line:
//!
//! ```text
//! {"frame":3,"objects":[{"x":10,"y":10,"width":20,"height":20,"id":0}]}
//! ```

use std::io::{BufRead, Write};

use log::{debug, info};
use motrack_tracker::{
    validate_detections, BoundingBox, CentroidTracker, CentroidTrackerBuilder, DuplicatePolicy,
    TrackInfo, Tracker, DEFAULT_DISTANCE_THRESHOLD,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub distance_threshold: f64,
    pub policy: DuplicatePolicy,
    /// Process every Nth frame (frames are counted from 1).
    pub frame_skip: u64,
    /// Boxes with an area at or below this are dropped before tracking.
    pub min_area: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            policy: DuplicatePolicy::Merge,
            frame_skip: 1,
            min_area: 0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoxRepr {
    Array([i32; 4]),
    Object(BoundingBox),
}

impl From<BoxRepr> for BoundingBox {
    fn from(b: BoxRepr) -> Self {
        match b {
            BoxRepr::Array(a) => a.into(),
            BoxRepr::Object(b) => b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub id: u64,
}

impl From<&TrackInfo> for TrackedObject {
    fn from(t: &TrackInfo) -> Self {
        Self {
            x: t.bbox.x,
            y: t.bbox.y,
            width: t.bbox.width,
            height: t.bbox.height,
            id: t.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub frame: u64,
    pub objects: Vec<TrackedObject>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_frames: u64,
    pub processed_frames: u64,
    /// Highest identity emitted plus one.
    pub objects_tracked: u64,
}

/// Parses one frame of detections. Geometry is not validated here.
pub fn parse_frame(line: &str) -> Result<Vec<BoundingBox>> {
    let boxes: Vec<BoxRepr> = serde_json::from_str(line)?;
    Ok(boxes.into_iter().map(BoundingBox::from).collect())
}

pub struct Pipeline {
    config: PipelineConfig,
    tracker: CentroidTracker,
    summary: Summary,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        if config.frame_skip == 0 {
            return Err(Error::InvalidArgument(
                "frame skip must be at least 1".to_string(),
            ));
        }
        let tracker = CentroidTrackerBuilder::new()
            .distance_threshold(config.distance_threshold)
            .policy(config.policy)
            .try_build()?;
        Ok(Self {
            config,
            tracker,
            summary: Summary::default(),
        })
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Counts a frame and reports whether it is due for processing.
    fn next_frame(&mut self) -> Option<u64> {
        self.summary.total_frames += 1;
        let frame = self.summary.total_frames;
        (frame % self.config.frame_skip == 0).then_some(frame)
    }

    fn track(&mut self, frame: u64, boxes: Vec<BoundingBox>) -> Result<FrameOutput> {
        validate_detections(&boxes)?;
        let boxes: Vec<BoundingBox> = boxes
            .into_iter()
            .filter(|b| b.area() > self.config.min_area)
            .collect();

        let tracks = self.tracker.update(&boxes);
        self.summary.processed_frames += 1;
        if let Some(max) = tracks.iter().map(|t| t.id).max() {
            self.summary.objects_tracked = self.summary.objects_tracked.max(max + 1);
        }

        Ok(FrameOutput {
            frame,
            objects: tracks.iter().map(TrackedObject::from).collect(),
        })
    }

    /// Tracks one frame. Returns `None` when the frame is skipped.
    pub fn process_frame(&mut self, boxes: Vec<BoundingBox>) -> Result<Option<FrameOutput>> {
        let Some(frame) = self.next_frame() else {
            return Ok(None);
        };
        self.track(frame, boxes)
            .map(Some)
            .map_err(|e| Error::Frame(frame, Box::new(e)))
    }

    /// Parses and tracks one input line. Skipped frames are not parsed.
    pub fn process_line(&mut self, line: &str) -> Result<Option<FrameOutput>> {
        let Some(frame) = self.next_frame() else {
            return Ok(None);
        };
        parse_frame(line)
            .and_then(|boxes| self.track(frame, boxes))
            .map(Some)
            .map_err(|e| Error::Frame(frame, Box::new(e)))
    }

    /// Runs the whole stream, writing one JSON line per processed frame.
    /// Blank lines are ignored and do not count as frames.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<Summary> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(output) = self.process_line(&line)? {
                debug!(
                    "frame {}: {} objects",
                    output.frame,
                    output.objects.len()
                );
                serde_json::to_writer(&mut writer, &output)?;
                writer.write_all(b"\n")?;
            }
        }
        writer.flush()?;

        info!(
            "Processed {} of {} frames, {} objects tracked",
            self.summary.processed_frames, self.summary.total_frames, self.summary.objects_tracked
        );
        Ok(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_arrays() {
        let boxes = parse_frame("[[10, 10, 20, 20], [0, 0, 5, 5]]").unwrap();
        assert_eq!(
            boxes,
            vec![BoundingBox::new(10, 10, 20, 20), BoundingBox::new(0, 0, 5, 5)]
        );
    }

    #[test]
    fn test_parse_frame_objects() {
        let boxes = parse_frame(r#"[{"x": 1, "y": 2, "width": 3, "height": 4}]"#).unwrap();
        assert_eq!(boxes, vec![BoundingBox::new(1, 2, 3, 4)]);
    }

    #[test]
    fn test_parse_frame_empty() {
        assert!(parse_frame("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_frame_rejects_garbage() {
        assert!(matches!(parse_frame("[[1, 2, 3]]"), Err(Error::JsonError(_))));
        assert!(matches!(parse_frame("{}"), Err(Error::JsonError(_))));
    }

    #[test]
    fn test_zero_frame_skip_rejected() {
        let config = PipelineConfig {
            frame_skip: 0,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let config = PipelineConfig {
            distance_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(Error::TrackerError(motrack_tracker::Error::InvalidConfig(_)))
        ));
    }
}
