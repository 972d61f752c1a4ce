//! Per-square content classification.
//!
//! Two backends share the [`SquareClassifier`] trait:
//!
//! - [`ModelClassifier`] runs a learned 13-way classifier over each square.
//!   The ONNX runtime binding ([`OnnxBackend`]) is behind the `onnx` feature.
//! - [`HeuristicClassifier`] needs no model. It compares each square to the
//!   board's estimated light/dark background colors and guesses the piece
//!   kind from its silhouette. Piece-type accuracy is low; empty-vs-occupied
//!   and piece color are much more reliable.
//!
//! [`load_classifier`] picks a backend once at startup and never fails: a
//! missing or unloadable model degrades silently to the heuristic.
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use snapfen_classify::{HeuristicClassifier, SquareClassifier};
//! use snapfen_core::{PieceLabel, SQUARE_SIZE};
//!
//! let squares: [RgbImage; 64] = std::array::from_fn(|i| {
//!     let light = (i / 8 + i % 8) % 2 == 0;
//!     let c = if light { Rgb([240, 217, 181]) } else { Rgb([181, 136, 99]) };
//!     RgbImage::from_pixel(SQUARE_SIZE, SQUARE_SIZE, c)
//! });
//! let out = HeuristicClassifier::default().classify(&squares).unwrap();
//! assert!(out.iter().all(|c| c.label == PieceLabel::Empty));
//! ```

mod heuristic;
mod model;
#[cfg(feature = "onnx")]
mod onnx;
mod params;
mod select;
mod shape;

use image::RgbImage;
use serde::Serialize;
use snapfen_core::{SquareClassification, BOARD_SQUARES};

pub use heuristic::{BackgroundColors, CellStats, HeuristicClassifier};
pub use model::{softmax, ModelClassifier, ScoreBackend};
#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;
pub use params::{ChannelOrder, HeuristicParams, ModelParams, ShapeBands};
pub use select::{load_classifier, DEFAULT_MODEL_PATH};

/// Errors raised while classifying squares.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// The inference runtime rejected the model or the input.
    #[error("classifier backend error: {0}")]
    Backend(String),
    #[error("classifier returned {got} scores, expected {expected}")]
    ScoreLength { expected: usize, got: usize },
}

/// Which backend is active, as reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub model_loaded: bool,
    /// `"onnx"` or `"heuristic"`.
    pub model_type: &'static str,
}

/// Labels all 64 squares of a board.
///
/// Squares are in scan order (a8, b8, ..., h1) and the output keeps it.
/// Implementations are shared across threads behind an `Arc`.
pub trait SquareClassifier: Send + Sync {
    fn classify(
        &self,
        squares: &[RgbImage; BOARD_SQUARES],
    ) -> Result<[SquareClassification; BOARD_SQUARES], ClassifyError>;

    fn backend_info(&self) -> BackendInfo;
}
