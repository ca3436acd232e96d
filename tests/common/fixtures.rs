use image::{Rgb, RgbImage};
use railgaps::{EdgeMap, RoiBand, ScanConfig};

pub const FRAME_WIDTH: u32 = 150;
pub const FRAME_HEIGHT: u32 = 100;

const DARK: Rgb<u8> = Rgb([30, 30, 30]);
const BRIGHT: Rgb<u8> = Rgb([200, 200, 200]);

/// Frame that is dark left of `boundary(row)` and bright from it onwards.
pub fn rail_frame(width: u32, height: u32, boundary: impl Fn(u32) -> u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| if x >= boundary(y) { BRIGHT } else { DARK })
}

/// Straight rail edge at column 100: no gap.
pub fn straight_frame() -> RgbImage {
    rail_frame(FRAME_WIDTH, FRAME_HEIGHT, |_| 100)
}

/// Rail edge that steps in by 10 columns at row 20 and back out to 99 at
/// row 45. The traced curve drops by 10 between rows 20 and 21 and recovers
/// by 8 between rows 45 and 46: a 25-row gap.
pub fn gap_frame() -> RgbImage {
    rail_frame(FRAME_WIDTH, FRAME_HEIGHT, |row| match row {
        0..20 => 100,
        20..45 => 90,
        _ => 99,
    })
}

/// Uniform frame with no edge at all.
pub fn flat_frame() -> RgbImage {
    RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, BRIGHT)
}

/// Defaults with an ROI band covering the whole synthetic frame.
pub fn test_config() -> ScanConfig {
    ScanConfig::default().with_roi(RoiBand::new(0, FRAME_WIDTH))
}

/// Same as [`test_config`] without warmup.
pub fn no_warmup_config() -> ScanConfig {
    ScanConfig {
        skipped_frames_count: 0,
        ..test_config()
    }
}

/// Edge map whose only edge cells sit in `col` on every row.
pub fn vertical_edge_map(width: usize, height: usize, col: usize) -> EdgeMap {
    EdgeMap::from_fn(width, height, |_, c| c != col)
}

/// Deterministic pseudo-random edge map with roughly `edge_percent` edge cells.
pub fn noisy_edge_map(width: usize, height: usize, seed: u64, edge_percent: u64) -> EdgeMap {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    EdgeMap::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % 100 >= edge_percent
    })
}
