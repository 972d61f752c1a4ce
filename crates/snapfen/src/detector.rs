use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::{ImageReader, RgbImage};
use serde::Serialize;
use snapfen_board::{
    detect_orientation, split_squares, BoardLocator, LocateStrategy, OrientationEstimate,
};
use snapfen_classify::{load_classifier, BackendInfo, ClassifyError, SquareClassifier};
use snapfen_core::NormalizedBoard;
use snapfen_position::{AssembleError, PositionAssembler, PositionResult};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::DetectConfig;

/// Errors produced by the end-to-end helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("detection failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("detection failed: {0}")]
    Assemble(#[from] AssembleError),

    #[error("failed to read image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result of one detection: the position report plus run metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectionReport {
    #[serde(flatten)]
    pub position: PositionResult,
    pub processing_time_ms: u64,
    /// How the board was located.
    pub strategy: LocateStrategy,
}

/// Decode an image file into RGB8, whatever its on-disk format.
pub fn load_rgb_image(path: impl AsRef<Path>) -> Result<RgbImage, DetectError> {
    let path = path.as_ref();
    let wrap = |source: image::ImageError| DetectError::ImageDecode {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| wrap(image::ImageError::IoError(e)))?;
    Ok(reader.decode().map_err(wrap)?.to_rgb8())
}

/// Image in, position out.
///
/// The classifier is chosen once and shared: clone the `Detector` (or wrap
/// it in an `Arc`) to run detections from several threads.
#[derive(Clone)]
pub struct Detector {
    locator: BoardLocator,
    classifier: Arc<dyn SquareClassifier>,
    assembler: PositionAssembler,
}

impl Detector {
    pub fn new(
        locator: BoardLocator,
        classifier: Arc<dyn SquareClassifier>,
        assembler: PositionAssembler,
    ) -> Self {
        Self {
            locator,
            classifier,
            assembler,
        }
    }

    /// Build every stage from `config`, loading the model if one is configured.
    pub fn from_config(config: &DetectConfig) -> Self {
        let classifier = load_classifier(
            config.model_path.as_deref(),
            config.heuristic.clone(),
            config.model.clone(),
        );
        Self::new(
            BoardLocator::new(config.locator.clone()),
            classifier,
            PositionAssembler::new(config.assembly.clone()),
        )
    }

    pub fn backend_info(&self) -> BackendInfo {
        self.classifier.backend_info()
    }

    /// Locate, split, classify and assemble.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width(), height = image.height())
        )
    )]
    pub fn detect(&self, image: &RgbImage) -> Result<DetectionReport, DetectError> {
        let start = Instant::now();
        log::debug!("image size: {}x{}", image.width(), image.height());

        let located = self.locator.locate_detailed(image);
        let position = self.detect_board(&located.board)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "detection complete in {processing_time_ms}ms: {} (confidence {:.2}, {:?})",
            position.fen,
            position.confidence,
            located.strategy
        );
        Ok(DetectionReport {
            position,
            processing_time_ms,
            strategy: located.strategy,
        })
    }

    /// Classify and assemble an already normalized board.
    pub fn detect_board(&self, board: &NormalizedBoard) -> Result<PositionResult, DetectError> {
        let squares = split_squares(board);
        let classifications = self.classifier.classify(&squares)?;
        Ok(self.assembler.assemble(&classifications)?)
    }

    /// Guess whether the board is shown from white's or black's side.
    pub fn detect_orientation(&self, image: &RgbImage) -> OrientationEstimate {
        detect_orientation(&self.locator.locate(image))
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("locator", &self.locator)
            .field("backend", &self.backend_info())
            .field("assembler", &self.assembler)
            .finish()
    }
}
