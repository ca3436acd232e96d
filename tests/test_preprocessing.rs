//! Integration tests for silhouette extraction.

mod common;

use common::*;
use railgaps::detection::preprocessing::{crop_band, detect_edges};
use railgaps::{GapDetector, PreprocessError, Preprocessor, RoiBand};

#[test]
fn test_vertical_boundary_yields_two_edge_columns() {
    let silhouette = Preprocessor::new(test_config().roi).process(&straight_frame()).unwrap();
    let edges = &silhouette.edges;

    assert_eq!((edges.width(), edges.height()), (FRAME_WIDTH as usize, FRAME_HEIGHT as usize));
    for row in 0..edges.height() {
        for col in 0..edges.width() {
            let expect_edge = col == 99 || col == 100;
            assert_eq!(!edges.is_walkable(row, col), expect_edge, "row {} col {}", row, col);
        }
    }
}

#[test]
fn test_mask_is_zero_one_foreground() {
    let silhouette = Preprocessor::new(test_config().roi).process(&straight_frame()).unwrap();

    assert_eq!(silhouette.mask.dimensions(), silhouette.gray.dimensions());
    assert_eq!(silhouette.mask.get_pixel(10, 5)[0], 0);
    assert_eq!(silhouette.mask.get_pixel(120, 5)[0], 1);
    assert!(silhouette.mask.pixels().all(|p| p[0] <= 1));
}

#[test]
fn test_roi_band_is_cropped_before_processing() {
    // Boundary at frame column 180; band starts at 100.
    let frame = rail_frame(300, 40, |_| 180);
    let silhouette = Preprocessor::new(RoiBand::new(100, 250)).process(&frame).unwrap();

    assert_eq!(silhouette.gray.dimensions(), (150, 40));
    assert!(!silhouette.edges.is_walkable(0, 79));
    assert!(!silhouette.edges.is_walkable(0, 80));
    assert!(silhouette.edges.is_walkable(0, 81));
    assert!(silhouette.edges.is_walkable(0, 78));
}

#[test]
fn test_uniform_frame_has_no_edges() {
    let silhouette = Preprocessor::new(test_config().roi).process(&flat_frame()).unwrap();
    let edges = &silhouette.edges;
    assert!((0..edges.height()).all(|row| edges.walkable_count(row, 0, edges.width() - 1) == edges.width()));
}

#[test]
fn test_default_band_needs_wide_frames() {
    let err = crop_band(&straight_frame(), RoiBand::default()).unwrap_err();
    assert_eq!(
        err,
        PreprocessError::RoiOutOfBounds {
            start: 600,
            end: 750,
            width: FRAME_WIDTH
        }
    );
}

#[test]
fn test_detect_edges_on_mask() {
    let mask = image::GrayImage::from_fn(6, 4, |x, _| image::Luma([if x >= 3 { 1 } else { 0 }]));
    let edges = detect_edges(&mask);
    assert_eq!(edges.walkable_count(2, 0, 5), 4);
    assert!(!edges.is_walkable(2, 2));
    assert!(!edges.is_walkable(2, 3));
}

#[test]
fn test_detector_runs_both_passes() {
    let analysis = GapDetector::new(&test_config()).detect(&gap_frame()).unwrap();

    assert_eq!(analysis.first_pass.len(), FRAME_HEIGHT as usize);
    assert_eq!(analysis.border.len(), FRAME_HEIGHT as usize);
    assert_eq!(analysis.first_pass.columns()[0], 100);
    assert_eq!(analysis.border.columns()[20], 100);
    assert_eq!(analysis.border.columns()[21], 90);
    assert_eq!(analysis.border.columns()[46], 98);
    assert!(analysis.verdict.accepted);
    assert_eq!(analysis.verdict.gap_width, 25);
}
