//! Chess position recognition from board photos and screenshots.
//!
//! This crate provides:
//! - re-exports of the stage crates (`core`, `board`, `classify`, `position`)
//! - [`Detector`], the end-to-end pipeline: locate the board, split it into
//!   64 squares, classify each square, assemble and validate a FEN
//! - [`DetectConfig`], a JSON config covering every tunable
//! - the `snapfen` command-line tool (feature `cli`)
//!
//! ## Quickstart
//!
//! ```no_run
//! use snapfen::{load_rgb_image, DetectConfig, Detector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = Detector::from_config(&DetectConfig::default());
//! let image = load_rgb_image("board.png")?;
//! let report = detector.detect(&image)?;
//! println!("{} (review: {})", report.position.fen, report.position.needs_review);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `snapfen::core`: labels, square names, normalized board, pixel helpers.
//! - `snapfen::board`: board localization, square splitting, orientation.
//! - `snapfen::classify`: classifier backends and backend selection.
//! - `snapfen::position`: FEN assembly and validation.
//!
//! A learned square classifier runs through ONNX Runtime when built with the
//! `onnx` feature and a model file is present; otherwise the heuristic
//! classifier is used with no change to the output shape.

pub use snapfen_board as board;
pub use snapfen_classify as classify;
pub use snapfen_core as core;
pub use snapfen_position as position;

pub use snapfen_board::{BoardOrientation, LocateStrategy, OrientationEstimate};
pub use snapfen_classify::BackendInfo;
pub use snapfen_core::{PieceLabel, SquareClassification};
pub use snapfen_position::PositionResult;

mod config;
mod detector;

pub use config::{ConfigError, DetectConfig};
pub use detector::{load_rgb_image, DetectError, DetectionReport, Detector};
