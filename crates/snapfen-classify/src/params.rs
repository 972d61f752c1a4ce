use serde::{Deserialize, Serialize};
use snapfen_core::PieceKind;

/// Fill-ratio / solidity bands mapping a piece silhouette to a piece kind.
///
/// These are coarse, uncalibrated approximations; a trained model should
/// be preferred whenever one is available.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeBands {
    /// Above this fill ratio: rook or queen.
    pub large_fill: f64,
    /// Large silhouettes more solid than this are rooks.
    pub rook_solidity: f64,
    /// Above this fill ratio: king or bishop.
    pub medium_fill: f64,
    /// Medium silhouettes more solid than this are kings.
    pub king_solidity: f64,
    /// Above this fill ratio: knight or bishop.
    pub small_fill: f64,
    /// Small silhouettes less solid than this are knights.
    pub knight_solidity: f64,
}

impl Default for ShapeBands {
    fn default() -> Self {
        Self {
            large_fill: 0.55,
            rook_solidity: 0.85,
            medium_fill: 0.4,
            king_solidity: 0.8,
            small_fill: 0.25,
            knight_solidity: 0.7,
        }
    }
}

impl ShapeBands {
    pub fn classify(&self, fill_ratio: f64, solidity: f64) -> PieceKind {
        if fill_ratio > self.large_fill {
            if solidity > self.rook_solidity {
                PieceKind::Rook
            } else {
                PieceKind::Queen
            }
        } else if fill_ratio > self.medium_fill {
            if solidity > self.king_solidity {
                PieceKind::King
            } else {
                PieceKind::Bishop
            }
        } else if fill_ratio > self.small_fill {
            if solidity < self.knight_solidity {
                PieceKind::Knight
            } else {
                PieceKind::Bishop
            }
        } else {
            PieceKind::Pawn
        }
    }
}

/// Color/shape heuristic settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicParams {
    /// Corner samples sit this many pixels in from each edge.
    pub corner_inset: u32,
    /// Side of the centered region inspected for a piece.
    pub center_size: u32,
    /// A square is empty only below this RGB distance from its background...
    pub empty_color_distance: f64,
    /// ...and below this grayscale variance.
    pub empty_variance: f64,
    /// Per-pixel max channel difference marking a pixel as "not background".
    pub piece_mask_delta: f64,
    /// Mean brightness of piece pixels above which the piece is white.
    pub white_brightness: f64,
    pub empty_confidence: f32,
    pub piece_confidence: f32,
    pub shape: ShapeBands,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            corner_inset: 2,
            center_size: 40,
            empty_color_distance: 25.0,
            empty_variance: 400.0,
            piece_mask_delta: 30.0,
            white_brightness: 128.0,
            empty_confidence: 0.85,
            piece_confidence: 0.55,
            shape: ShapeBands::default(),
        }
    }
}

/// Channel order of the model input planes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    /// The shipped chess-square model was trained on BGR planes.
    #[default]
    Bgr,
}

/// Learned-model input settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Side of the square input tensor.
    pub input_size: u32,
    pub channel_order: ChannelOrder,
    /// Model input name; the first declared input when unset.
    pub input_name: Option<String>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            input_size: 64,
            channel_order: ChannelOrder::Bgr,
            input_name: None,
        }
    }
}
