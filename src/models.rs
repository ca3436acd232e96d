use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// One decoded video frame.
pub type Frame = RgbImage;

/// Sobel magnitude image as produced by `imageproc`.
pub type GradientImage = ImageBuffer<Luma<u16>, Vec<u16>>;

const WALKABLE: u8 = 1;
const EDGE: u8 = 0;

/// Binary edge map. A cell is walkable (1) where the silhouette is flat and an
/// edge (0) where the gradient is nonzero. The tracer hunts for edge cells.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    cells: GrayImage,
}

impl EdgeMap {
    /// Map with no edges at all.
    pub fn walkable(width: usize, height: usize) -> Self {
        Self {
            cells: GrayImage::from_pixel(width as u32, height as u32, Luma([WALKABLE])),
        }
    }

    /// Build a map from a `(row, col) -> is_walkable` predicate.
    pub fn from_fn(width: usize, height: usize, mut walkable: impl FnMut(usize, usize) -> bool) -> Self {
        let cells = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            if walkable(y as usize, x as usize) {
                Luma([WALKABLE])
            } else {
                Luma([EDGE])
            }
        });
        Self { cells }
    }

    /// Cells with zero gradient magnitude become walkable.
    pub fn from_gradient(gradient: &GradientImage) -> Self {
        let cells = GrayImage::from_fn(gradient.width(), gradient.height(), |x, y| {
            if gradient.get_pixel(x, y)[0] == 0 {
                Luma([WALKABLE])
            } else {
                Luma([EDGE])
            }
        });
        Self { cells }
    }

    pub fn width(&self) -> usize {
        self.cells.width() as usize
    }

    pub fn height(&self) -> usize {
        self.cells.height() as usize
    }

    pub fn is_walkable(&self, row: usize, col: usize) -> bool {
        self.cells.get_pixel(col as u32, row as u32)[0] == WALKABLE
    }

    pub fn set_walkable(&mut self, row: usize, col: usize) {
        self.cells.put_pixel(col as u32, row as u32, Luma([WALKABLE]));
    }

    pub fn set_edge(&mut self, row: usize, col: usize) {
        self.cells.put_pixel(col as u32, row as u32, Luma([EDGE]));
    }

    /// Number of walkable cells in `row` over the inclusive column range `lo..=hi`.
    pub fn walkable_count(&self, row: usize, lo: usize, hi: usize) -> usize {
        (lo..=hi).filter(|&col| self.is_walkable(row, col)).count()
    }

    /// Mark every cell of `row` at column `from` and beyond as walkable.
    pub fn clear_from(&mut self, row: usize, from: usize) {
        for col in from..self.width() {
            self.set_walkable(row, col);
        }
    }

    /// Raw 0/1 cells.
    pub fn as_image(&self) -> &GrayImage {
        &self.cells
    }

    /// 0/255 rendition for saving to disk.
    pub fn to_visual(&self) -> GrayImage {
        GrayImage::from_fn(self.cells.width(), self.cells.height(), |x, y| {
            Luma([self.cells.get_pixel(x, y)[0] * 255])
        })
    }
}

/// Traced rail edge: one column per row, row 0 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderCurve(Vec<usize>);

impl BorderCurve {
    pub fn new(columns: Vec<usize>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        mean_column(&self.0)
    }

    pub fn deltas(&self) -> DeltaProfile {
        DeltaProfile::from_curve(self)
    }
}

/// Mean of a column sequence; `None` when empty.
pub fn mean_column(columns: &[usize]) -> Option<f64> {
    if columns.is_empty() {
        return None;
    }
    let sum: usize = columns.iter().sum();
    Some(sum as f64 / columns.len() as f64)
}

/// First discrete difference of a border curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaProfile(Vec<i64>);

impl DeltaProfile {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn from_curve(curve: &BorderCurve) -> Self {
        let values = curve
            .columns()
            .windows(2)
            .map(|pair| pair[1] as i64 - pair[0] as i64)
            .collect();
        Self(values)
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Steepest drop and the steepest recovery that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapCandidate {
    pub min_index: usize,
    pub min_value: i64,
    pub max_index: usize,
    pub max_value: i64,
}

impl GapCandidate {
    pub fn width(&self) -> usize {
        self.max_index.saturating_sub(self.min_index)
    }

    /// Size of the swing from the drop to the recovery.
    pub fn thresh(&self) -> i64 {
        self.max_value - self.min_value
    }
}

/// Result reported for a frame that completed a full analysis cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub frame_index: usize,
    /// Gap width in pixels (rows of the traced curve).
    pub gap_width: usize,
    pub accepted: bool,
}

impl DetectionResult {
    /// Convert the pixel width using an externally supplied calibration factor.
    pub fn gap_mm(&self, mm_per_pixel: f64) -> f64 {
        self.gap_width as f64 * mm_per_pixel
    }
}
