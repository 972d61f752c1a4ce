//! Core types and utilities for recognising a chess position in an image.
//!
//! This crate holds what every stage of the pipeline agrees on: the 13-way
//! square label set, the normalized board bitmap, square naming, and a few
//! pixel-level primitives (grayscale, bilinear sampling, perspective warp).
//! It knows nothing about where a board sits in a photo or
//! how a square gets its label.

mod board;
mod homography;
mod label;
mod logger;
mod pixels;

pub use board::{BoardShapeError, NormalizedBoard, BOARD_SIZE, BOARD_SQUARES, SQUARE_SIZE};
pub use homography::{square_to_quad, warp_perspective_rgb, Homography};
pub use label::{
    square_index, square_name, PieceColor, PieceKind, PieceLabel, SquareClassification,
};
pub use pixels::{
    crop_resized, gray_stats, luma, mean_rgb, sample_bilinear_rgb, to_gray, GrayStats,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
