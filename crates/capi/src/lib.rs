// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

//! motrack C API
//!
//! C bindings for the centroid identity tracker, so detection pipelines
//! written in C/C++ can attach persistent identities to per-frame boxes.

#![allow(clippy::missing_safety_doc)]
#![allow(unsafe_op_in_unsafe_fn)]

mod error;
mod tracker;

pub use error::*;
pub use tracker::*;
