use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Half-open column range `[start, end)` cropped from every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiBand {
    pub start: u32,
    pub end: u32,
}

impl RoiBand {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl Default for RoiBand {
    fn default() -> Self {
        Self {
            start: 600,
            end: 750,
        }
    }
}

/// Tunables for one scan. Static for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub roi: RoiBand,
    /// Frames skipped at the start of a stream.
    pub skipped_frames_count: usize,
    /// Maximum probe distance (columns) on either side of the previous column.
    pub max_deviation: usize,
    pub thresh_limit: u32,
    /// Gap widths must be strictly below this.
    pub gap_limit: usize,
    /// Rows after the steepest drop searched for the recovery.
    pub lookahead: usize,
    /// Second pass: columns at `mean + mask_offset` and beyond are masked.
    pub mask_offset: usize,
    /// Second pass: tighter mask applied to row 0 only.
    pub seed_row_mask_offset: usize,
    /// Re-enter warmup after every accepted detection.
    pub rearm_warmup_on_detection: bool,
    /// Stop after this many frame reads.
    pub max_frames: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roi: RoiBand::default(),
            skipped_frames_count: 60,
            max_deviation: 500,
            thresh_limit: 5,
            gap_limit: 400,
            lookahead: 100,
            mask_offset: 10,
            seed_row_mask_offset: 2,
            rearm_warmup_on_detection: false,
            max_frames: None,
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_roi(mut self, roi: RoiBand) -> Self {
        self.roi = roi;
        self
    }

    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roi.start >= self.roi.end {
            return Err(ConfigError::InvalidRoi {
                start: self.roi.start,
                end: self.roi.end,
            });
        }
        if self.thresh_limit == 0 {
            return Err(ConfigError::NonPositive("thresh_limit"));
        }
        if self.gap_limit == 0 {
            return Err(ConfigError::NonPositive("gap_limit"));
        }
        if self.lookahead == 0 {
            return Err(ConfigError::NonPositive("lookahead"));
        }
        if self.max_deviation == 0 {
            return Err(ConfigError::NonPositive("max_deviation"));
        }
        Ok(())
    }
}
