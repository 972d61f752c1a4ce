use image::imageops::{self, FilterType};
use image::RgbImage;

/// Side length of the normalized board bitmap, in pixels.
pub const BOARD_SIZE: u32 = 512;
/// Side length of one square bitmap handed to a classifier.
pub const SQUARE_SIZE: u32 = 64;
/// Number of squares on a board.
pub const BOARD_SQUARES: usize = 64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardShapeError {
    #[error("normalized board must be {expected}x{expected} pixels, got {width}x{height}")]
    WrongSize {
        expected: u32,
        width: u32,
        height: u32,
    },
}

/// Axis-aligned `512x512` RGB board: files a..h left to right, ranks 8..1
/// top to bottom.
#[derive(Clone, Debug)]
pub struct NormalizedBoard {
    image: RgbImage,
}

impl NormalizedBoard {
    /// Wrap an image that is already `BOARD_SIZE x BOARD_SIZE`.
    pub fn new(image: RgbImage) -> Result<Self, BoardShapeError> {
        if image.dimensions() != (BOARD_SIZE, BOARD_SIZE) {
            return Err(BoardShapeError::WrongSize {
                expected: BOARD_SIZE,
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image })
    }

    /// Resample an arbitrary board region to the canonical size.
    ///
    /// An empty region produces an all-black board.
    pub fn from_region(region: &RgbImage) -> Self {
        let image = if region.width() == 0 || region.height() == 0 {
            RgbImage::new(BOARD_SIZE, BOARD_SIZE)
        } else if region.dimensions() == (BOARD_SIZE, BOARD_SIZE) {
            region.clone()
        } else {
            imageops::resize(region, BOARD_SIZE, BOARD_SIZE, FilterType::Triangle)
        };
        Self { image }
    }

    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Side length of one board cell in pixels.
    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.image.width() / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_shape() {
        let err = NormalizedBoard::new(RgbImage::new(100, 512)).unwrap_err();
        assert_eq!(
            err,
            BoardShapeError::WrongSize {
                expected: 512,
                width: 100,
                height: 512
            }
        );
    }

    #[test]
    fn from_region_always_yields_canonical_size() {
        for (w, h) in [(0, 0), (1, 1), (300, 200), (512, 512), (1024, 700)] {
            let board = NormalizedBoard::from_region(&RgbImage::new(w, h));
            assert_eq!(board.image().dimensions(), (BOARD_SIZE, BOARD_SIZE));
            assert_eq!(board.cell_size(), 64);
        }
    }
}
