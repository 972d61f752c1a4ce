//! Board localization and square extraction.
//!
//! ## Quickstart
//!
//! ```
//! use image::RgbImage;
//! use snapfen_board::{split_squares, BoardLocator};
//!
//! let photo = RgbImage::new(640, 480);
//! let board = BoardLocator::default().locate(&photo);
//! let squares = split_squares(&board);
//! assert_eq!(squares.len(), 64);
//! ```
//!
//! Localization strategies, in priority order:
//! 1. Quad: Canny edges, dilation, largest external contours reduced to a
//!    square-ish 4-gon, perspective warp onto the board square.
//! 2. Line grid: Hough lines traced into segments; horizontal and vertical
//!    segment midpoints bound the board.
//! 3. Block variance: blocks well above the median variance are checkered;
//!    their bounding box, squared up and centered, is the board.
//! 4. Centered square crop.

mod contour;
mod lines;
mod locator;
mod orientation;
mod params;
mod quad;
mod split;
mod variance;

pub use locator::{BoardLocator, LocateStrategy, Localization};
pub use orientation::{detect_orientation, BoardOrientation, OrientationEstimate};
pub use params::{ContourParams, LineGridParams, LocatorParams, VarianceGridParams};
pub use quad::{order_corners, BoardQuad, CropRect};
pub use split::{split_squares, SquareImages};
