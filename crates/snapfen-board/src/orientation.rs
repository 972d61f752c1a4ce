//! Display orientation guess.
//!
//! In the standard orientation h1 (bottom right) is a light square and a1
//! (bottom left) is dark. Comparing the two bottom corner cells is enough
//! for a guess; confidence is the brightness gap on a `[0, 1]` scale.

use serde::{Deserialize, Serialize};
use snapfen_core::{gray_stats, luma, NormalizedBoard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardOrientation {
    /// White at the bottom.
    Standard,
    /// Black at the bottom.
    Flipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientationEstimate {
    pub orientation: BoardOrientation,
    pub confidence: f64,
}

fn cell_brightness(board: &NormalizedBoard, x0: u32, y0: u32, size: u32) -> f64 {
    let img = board.image();
    let pixels =
        (y0..y0 + size).flat_map(|y| (x0..x0 + size).map(move |x| luma(*img.get_pixel(x, y))));
    gray_stats(pixels).mean
}

pub fn detect_orientation(board: &NormalizedBoard) -> OrientationEstimate {
    let (w, h) = board.image().dimensions();
    let cell = board.cell_size();
    let bottom_right = cell_brightness(board, w - cell, h - cell, cell);
    let bottom_left = cell_brightness(board, 0, h - cell, cell);

    let orientation = if bottom_right > bottom_left {
        BoardOrientation::Standard
    } else {
        BoardOrientation::Flipped
    };
    OrientationEstimate {
        orientation,
        confidence: (bottom_right - bottom_left).abs() / 255.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgb, RgbImage};
    use snapfen_core::BOARD_SIZE;

    fn board_with_corners(left: u8, right: u8) -> NormalizedBoard {
        let img = RgbImage::from_fn(BOARD_SIZE, BOARD_SIZE, |x, y| {
            let v = match (x / 64, y / 64) {
                (0, 7) => left,
                (7, 7) => right,
                _ => 128,
            };
            Rgb([v, v, v])
        });
        NormalizedBoard::new(img).unwrap()
    }

    #[test]
    fn light_bottom_right_is_standard() {
        let est = detect_orientation(&board_with_corners(50, 200));
        assert_eq!(est.orientation, BoardOrientation::Standard);
        assert_relative_eq!(est.confidence, 150.0 / 255.0, epsilon = 1e-9);
        assert!((est.confidence - 0.588).abs() < 1e-3);
    }

    #[test]
    fn dark_bottom_right_is_flipped() {
        let est = detect_orientation(&board_with_corners(210, 30));
        assert_eq!(est.orientation, BoardOrientation::Flipped);
        assert_relative_eq!(est.confidence, 180.0 / 255.0, epsilon = 1e-9);
    }

    #[test]
    fn equal_corners_are_flipped_with_zero_confidence() {
        let est = detect_orientation(&board_with_corners(90, 90));
        assert_eq!(est.orientation, BoardOrientation::Flipped);
        assert_eq!(est.confidence, 0.0);
    }

    #[test]
    fn serializes_like_the_service_payload() {
        let est = detect_orientation(&board_with_corners(90, 90));
        let json = serde_json::to_value(est).unwrap();
        assert_eq!(json["orientation"], "flipped");
    }
}
