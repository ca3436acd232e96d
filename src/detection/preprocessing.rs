use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::contrast::otsu_level;
use imageproc::gradients::sobel_gradients;
use tracing::trace;

use crate::config::RoiBand;
use crate::error::PreprocessError;
use crate::models::{EdgeMap, Frame};

/// Intermediate images derived from one frame.
#[derive(Debug, Clone)]
pub struct Silhouette {
    pub gray: GrayImage,
    /// 0/1 foreground mask (brighter than the Otsu level).
    pub mask: GrayImage,
    pub edges: EdgeMap,
}

/// Turns frames into edge maps. Stateless apart from the ROI band.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    roi: RoiBand,
}

impl Preprocessor {
    pub fn new(roi: RoiBand) -> Self {
        Self { roi }
    }

    pub fn process(&self, frame: &Frame) -> Result<Silhouette, PreprocessError> {
        let band = crop_band(frame, self.roi)?;
        let gray = to_grayscale(&band);
        let level = otsu_level(&gray);
        let mask = binarize(&gray, level);
        let edges = detect_edges(&mask);
        trace!(level, width = edges.width(), height = edges.height(), "silhouette ready");
        Ok(Silhouette { gray, mask, edges })
    }
}

/// Crop all rows of the frame to the column band.
pub fn crop_band(frame: &RgbImage, roi: RoiBand) -> Result<RgbImage, PreprocessError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyFrame { width, height });
    }
    if roi.end > width || roi.start >= roi.end {
        return Err(PreprocessError::RoiOutOfBounds {
            start: roi.start,
            end: roi.end,
            width,
        });
    }
    Ok(imageops::crop_imm(frame, roi.start, 0, roi.width(), height).to_image())
}

/// Luminance-weighted grayscale.
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    imageops::grayscale(img)
}

/// 1 where the pixel is strictly brighter than `level`, 0 elsewhere.
pub fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([1])
        } else {
            Luma([0])
        }
    })
}

/// Sobel magnitude of the mask, inverted so that flat cells are walkable.
pub fn detect_edges(mask: &GrayImage) -> EdgeMap {
    EdgeMap::from_gradient(&sobel_gradients(mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn crop_rejects_band_outside_frame() {
        let frame = RgbImage::from_pixel(100, 10, Rgb([0, 0, 0]));
        let err = crop_band(&frame, RoiBand::new(50, 120)).unwrap_err();
        assert_eq!(
            err,
            PreprocessError::RoiOutOfBounds {
                start: 50,
                end: 120,
                width: 100
            }
        );
    }

    #[test]
    fn crop_rejects_empty_frame() {
        let frame = RgbImage::new(0, 0);
        assert!(matches!(
            crop_band(&frame, RoiBand::new(0, 1)),
            Err(PreprocessError::EmptyFrame { .. })
        ));
    }

    #[test]
    fn binarize_is_strict() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([[10u8, 20, 30][x as usize]]));
        let mask = binarize(&gray, 20);
        assert_eq!(mask.as_raw(), &vec![0, 0, 1]);
    }
}
