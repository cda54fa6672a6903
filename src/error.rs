// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    TrackerError(motrack_tracker::Error),
    InvalidArgument(String),
    /// Error raised while handling a specific input frame (1-based).
    Frame(u64, Box<Error>),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

impl From<motrack_tracker::Error> for Error {
    fn from(err: motrack_tracker::Error) -> Self {
        Error::TrackerError(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::JsonError(e) => write!(f, "JSON error: {}", e),
            Error::TrackerError(e) => write!(f, "{}", e),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::Frame(frame, e) => write!(f, "frame {}: {}", frame, e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::JsonError(e) => Some(e),
            Error::TrackerError(e) => Some(e),
            Error::InvalidArgument(_) => None,
            Error::Frame(_, e) => Some(e.as_ref()),
        }
    }
}
