use image::RgbImage;
use serde::{Deserialize, Serialize};
use snapfen_core::{
    crop_resized, square_to_quad, to_gray, warp_perspective_rgb, NormalizedBoard, BOARD_SIZE,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::contour::find_board_quad;
use crate::lines::{detect_segments, grid_bounds};
use crate::params::LocatorParams;
use crate::quad::{BoardQuad, CropRect};
use crate::variance::{center_square, variance_region};

/// Which strategy produced the normalized board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateStrategy {
    /// Outer border found as a four-sided contour and perspective-warped.
    Contour,
    /// Board spanned by detected internal grid lines.
    LineGrid,
    /// Board spanned by high-variance blocks.
    VarianceGrid,
    /// Largest centered square of the image.
    CenterCrop,
}

/// Output of [`BoardLocator::locate_detailed`].
#[derive(Clone, Debug)]
pub struct Localization {
    pub board: NormalizedBoard,
    pub strategy: LocateStrategy,
    /// Source-image outline; only the contour strategy produces one.
    pub quad: Option<BoardQuad>,
    /// Source-image crop; every strategy except contour produces one.
    pub region: Option<CropRect>,
}

/// Finds the board in a photo or screenshot and normalizes it.
///
/// Strategies run in fixed order (quad, line grid, block variance) and the
/// first success wins; a centered square crop backs them all, so locating
/// never fails.
#[derive(Clone, Debug, Default)]
pub struct BoardLocator {
    params: LocatorParams,
}

/// Smallest side for which edge-based strategies are attempted.
const MIN_EDGE_STRATEGY_SIDE: u32 = 3;

impl BoardLocator {
    pub fn new(params: LocatorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    /// Normalized `512x512` board for any input image.
    pub fn locate(&self, image: &RgbImage) -> NormalizedBoard {
        self.locate_detailed(image).board
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width(), height = image.height())
        )
    )]
    pub fn locate_detailed(&self, image: &RgbImage) -> Localization {
        let (w, h) = image.dimensions();
        let gray = to_gray(image);

        if w.min(h) >= MIN_EDGE_STRATEGY_SIDE {
            if let Some(quad) = find_board_quad(&gray, &self.params.contour) {
                if let Some(board) = warp_quad(image, &quad) {
                    log::debug!("board located by contour: {:?}", quad.corners);
                    return Localization {
                        board,
                        strategy: LocateStrategy::Contour,
                        quad: Some(quad),
                        region: None,
                    };
                }
                log::debug!("contour quad is degenerate, trying line grid");
            }

            let segments = detect_segments(&gray, &self.params.lines);
            if let Some(rect) = grid_bounds(&segments, &self.params.lines) {
                log::debug!("board located by line grid: {rect:?}");
                return Localization {
                    board: crop_board(image, rect),
                    strategy: LocateStrategy::LineGrid,
                    quad: None,
                    region: Some(rect),
                };
            }
        }

        if let Some(rect) = variance_region(&gray, &self.params.variance) {
            log::debug!("board located by block variance: {rect:?}");
            return Localization {
                board: crop_board(image, rect),
                strategy: LocateStrategy::VarianceGrid,
                quad: None,
                region: Some(rect),
            };
        }

        let rect = center_square(w, h);
        log::debug!("board located by center crop: {rect:?}");
        Localization {
            board: crop_board(image, rect),
            strategy: LocateStrategy::CenterCrop,
            quad: None,
            region: Some(rect),
        }
    }
}

fn crop_board(image: &RgbImage, rect: CropRect) -> NormalizedBoard {
    let region = crop_resized(image, rect.x, rect.y, rect.width, rect.height, BOARD_SIZE);
    NormalizedBoard::from_region(&region)
}

/// Perspective-warp the quad onto the canonical board square.
fn warp_quad(image: &RgbImage, quad: &BoardQuad) -> Option<NormalizedBoard> {
    let image_from_board = square_to_quad((BOARD_SIZE - 1) as f32, &quad.corners)?;
    let warped = warp_perspective_rgb(image, image_from_board, BOARD_SIZE, BOARD_SIZE);
    NormalizedBoard::new(warped).ok()
}
