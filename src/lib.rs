// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

//! motrack
//!
//! Persistent identities for per-frame object detections. The tracking core
//! lives in [`tracker`]; [`pipeline`] drives it over a stream of frames in
//! JSON Lines form, the way the `motrack` binary does.

mod error;
pub mod pipeline;

pub use error::{Error, Result};
pub use motrack_tracker as tracker;
pub use pipeline::{Pipeline, PipelineConfig, Summary};
