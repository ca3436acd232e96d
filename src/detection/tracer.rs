//! Row-by-row reconstruction of the rail edge from an [`EdgeMap`].
//!
//! Every decision is a pure function of the map, the row, the previous
//! column and the curve traced so far, so each step can be checked in
//! isolation. The sweep itself never fails: rows with no usable edge repeat
//! the previous column.

use tracing::debug;

use crate::config::ScanConfig;
use crate::models::{BorderCurve, EdgeMap, mean_column};

/// Traces one column per row through an edge map.
#[derive(Debug, Clone, Copy)]
pub struct BorderTracer {
    pub max_deviation: usize,
    pub mask_offset: usize,
    pub seed_row_mask_offset: usize,
}

impl BorderTracer {
    pub fn new(max_deviation: usize) -> Self {
        Self {
            max_deviation,
            mask_offset: 10,
            seed_row_mask_offset: 2,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            max_deviation: config.max_deviation,
            mask_offset: config.mask_offset,
            seed_row_mask_offset: config.seed_row_mask_offset,
        }
    }

    /// Trace the map. With a `previous` curve from an earlier pass, everything
    /// right of that curve's mean (plus the configured offsets) is masked out
    /// first, so a parallel reflection cannot capture the seed.
    pub fn trace(&self, map: &EdgeMap, previous: Option<&BorderCurve>) -> BorderCurve {
        match previous {
            Some(curve) => {
                let masked = mask_beyond(map, curve, self.mask_offset, self.seed_row_mask_offset);
                self.sweep(&masked)
            }
            None => self.sweep(map),
        }
    }

    fn sweep(&self, map: &EdgeMap) -> BorderCurve {
        let (width, height) = (map.width(), map.height());
        if width == 0 || height == 0 {
            return BorderCurve::new(Vec::new());
        }

        let seed = find_first_column(map).unwrap_or(width - 1);
        let mut columns = Vec::with_capacity(height);
        columns.push(seed);

        let mut held = 0usize;
        for row in 1..height {
            let prev = columns[row - 1];
            let next = match find_next_column(map, row, prev, &columns, self.max_deviation) {
                Some(col) => col,
                None => {
                    held += 1;
                    prev
                }
            };
            columns.push(next);
        }

        debug!(seed, held, rows = height, "border traced");
        BorderCurve::new(columns)
    }
}

/// Rightmost edge cell of the first row that has one, ignoring column 0.
pub fn find_first_column(map: &EdgeMap) -> Option<usize> {
    let width = map.width();
    for row in 0..map.height() {
        if let Some(col) = (1..width).rev().find(|&col| !map.is_walkable(row, col)) {
            return Some(col);
        }
    }
    None
}

/// Nearest edge cell at or left of `from`, at most `max_deviation` columns away.
pub fn probe_left(map: &EdgeMap, row: usize, from: usize, max_deviation: usize) -> Option<usize> {
    let lowest = from.saturating_sub(max_deviation);
    (lowest..=from).rev().find(|&col| !map.is_walkable(row, col))
}

/// Nearest edge cell at or right of `from`, at most `max_deviation` columns away.
pub fn probe_right(map: &EdgeMap, row: usize, from: usize, max_deviation: usize) -> Option<usize> {
    let highest = from.saturating_add(max_deviation).min(map.width() - 1);
    (from..=highest).find(|&col| !map.is_walkable(row, col))
}

/// Whether the span between `prev` and `candidate` looked flat in the rows
/// just above `row`.
///
/// Of the slices one and two rows up, the one with fewer walkable cells is
/// the reference; the span is noisy when more than half of that reference is
/// walkable. Near the top of the map the one-above slice stands in for the
/// missing two-above slice.
pub fn is_noisy(map: &EdgeMap, row: usize, prev: usize, candidate: usize) -> bool {
    if row == 0 {
        return false;
    }
    let (lo, hi) = (prev.min(candidate), prev.max(candidate));
    let one_above = map.walkable_count(row - 1, lo, hi);
    let two_above = match row.checked_sub(2) {
        Some(r) => map.walkable_count(r, lo, hi),
        None => one_above,
    };
    let reference = if one_above < two_above { one_above } else { two_above };
    reference * 2 > hi - lo + 1
}

/// Resolve the column for `row` given the previous row's column.
///
/// Returns `None` when neither probe finds an edge; the caller repeats
/// `prev` in that case.
pub fn find_next_column(
    map: &EdgeMap,
    row: usize,
    prev: usize,
    curve_so_far: &[usize],
    max_deviation: usize,
) -> Option<usize> {
    let left = probe_left(map, row, prev, max_deviation);
    let right = probe_right(map, row, prev, max_deviation);

    let chosen = match (left, right) {
        (None, None) => return None,
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (Some(l), Some(r)) => {
            let noisy_left = is_noisy(map, row, prev, l);
            let noisy_right = is_noisy(map, row, prev, r);
            if prev - l <= r - prev {
                if noisy_left { r } else { l }
            } else if noisy_right {
                l
            } else {
                r
            }
        }
    };

    Some(correct_drift(map, row, prev, chosen, curve_so_far))
}

/// Revert a noisy choice to `prev` when `prev` sits closer to the running mean.
pub fn correct_drift(map: &EdgeMap, row: usize, prev: usize, chosen: usize, curve_so_far: &[usize]) -> usize {
    if !is_noisy(map, row, prev, chosen) {
        return chosen;
    }
    match mean_column(curve_so_far) {
        Some(mean) if (mean - chosen as f64).abs() > (mean - prev as f64).abs() => prev,
        _ => chosen,
    }
}

/// Copy of `map` with everything right of `previous`'s mean made walkable.
pub fn mask_beyond(map: &EdgeMap, previous: &BorderCurve, offset: usize, seed_row_offset: usize) -> EdgeMap {
    let mut masked = map.clone();
    let (width, height) = (map.width(), map.height());
    let Some(mean) = previous.mean() else {
        return masked;
    };
    if width == 0 || height == 0 {
        return masked;
    }

    let middle = mean.floor() as usize;
    let cut = (middle + offset).min(width - 1);
    for row in 0..height {
        masked.clear_from(row, cut);
    }
    masked.clear_from(0, (middle + seed_row_offset).min(width - 1));
    masked
}
