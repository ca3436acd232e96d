use std::path::PathBuf;
use thiserror::Error;

/// Rejected configuration. Always fatal, raised before any frame is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid ROI band [{start}, {end}): start must be below end")]
    InvalidRoi { start: u32, end: u32 },

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by a frame source for a single read.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame could not be decoded; the stream itself is still usable.
    #[error("corrupt frame: {0}")]
    Corrupt(String),

    /// The underlying device or file went away; the stream cannot continue.
    #[error("frame source failure: {0}")]
    Device(String),
}

/// A frame that cannot be turned into a silhouette.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("ROI band [{start}, {end}) does not fit a frame {width} pixels wide")]
    RoiOutOfBounds { start: u32, end: u32, width: u32 },
}

/// Errors that terminate a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to open frame source {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("frame source failed at frame {frame_index}: {message}")]
    Device { frame_index: usize, message: String },

    #[error("debug output: {0}")]
    Debug(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
