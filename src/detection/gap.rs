use tracing::debug;

use crate::config::ScanConfig;
use crate::models::{BorderCurve, DeltaProfile, GapCandidate};

/// Outcome of analyzing one border curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapVerdict {
    pub accepted: bool,
    pub gap_width: usize,
    /// `None` when the profile had no drop with a following window.
    pub candidate: Option<GapCandidate>,
}

impl GapVerdict {
    fn rejected(candidate: Option<GapCandidate>) -> Self {
        Self {
            accepted: false,
            gap_width: candidate.map(|c| c.width()).unwrap_or(0),
            candidate,
        }
    }
}

/// Decides whether a traced curve shows a rail joint gap.
#[derive(Debug, Clone, Copy)]
pub struct GapAnalyzer {
    pub thresh_limit: u32,
    pub gap_limit: usize,
    pub lookahead: usize,
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self {
            thresh_limit: 5,
            gap_limit: 400,
            lookahead: 100,
        }
    }
}

impl GapAnalyzer {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            thresh_limit: config.thresh_limit,
            gap_limit: config.gap_limit,
            lookahead: config.lookahead,
        }
    }

    pub fn analyze(&self, curve: &BorderCurve) -> GapVerdict {
        self.analyze_profile(&curve.deltas())
    }

    pub fn analyze_profile(&self, profile: &DeltaProfile) -> GapVerdict {
        let Some(candidate) = find_candidate(profile, self.lookahead) else {
            return GapVerdict::rejected(None);
        };

        if !self.accepts(&candidate) {
            debug!(?candidate, "gap candidate rejected");
            return GapVerdict::rejected(Some(candidate));
        }

        GapVerdict {
            accepted: true,
            gap_width: candidate.width(),
            candidate: Some(candidate),
        }
    }

    /// Threshold tests. Half-limits are compared as `2 * |v| > limit` to stay
    /// in integers.
    pub fn accepts(&self, candidate: &GapCandidate) -> bool {
        let limit = self.thresh_limit as i64;
        candidate.thresh() > limit
            && 2 * candidate.min_value.abs() > limit
            && 2 * candidate.max_value > limit
            && candidate.max_index > candidate.min_index
            && candidate.width() < self.gap_limit
    }
}

/// Steepest drop, then the steepest rise in `(min_index, min_index + lookahead)`.
/// Ties resolve to the first occurrence.
pub fn find_candidate(profile: &DeltaProfile, lookahead: usize) -> Option<GapCandidate> {
    let values = profile.values();
    let (min_index, min_value) = first_extreme(values, |v, best| v < best)?;

    let start = min_index + 1;
    let end = min_index.saturating_add(lookahead).min(values.len());
    if start >= end {
        return None;
    }
    let (offset, max_value) = first_extreme(&values[start..end], |v, best| v > best)?;

    Some(GapCandidate {
        min_index,
        min_value,
        max_index: start + offset,
        max_value,
    })
}

fn first_extreme(values: &[i64], better: impl Fn(i64, i64) -> bool) -> Option<(usize, i64)> {
    let mut iter = values.iter().copied().enumerate();
    let mut best = iter.next()?;
    for (idx, v) in iter {
        if better(v, best.1) {
            best = (idx, v);
        }
    }
    Some(best)
}
