use std::ops::Index;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use snapfen_core::{square_index, square_name, PieceLabel, SquareClassification, BOARD_SQUARES};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::fen::{encode_placement, CastlingRights};
use crate::validate::validate_fen;

/// Assembly settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyParams {
    /// Squares strictly below this confidence are flagged for review.
    pub low_confidence_threshold: f32,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 0.9,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("expected {expected} classifications, got {got}")]
    InvalidInput { expected: usize, got: usize },
}

/// Per-square confidences, serialized as a square-name map in scan order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareConfidences([f32; BOARD_SQUARES]);

impl SquareConfidences {
    pub fn get(&self, square: &str) -> Option<f32> {
        square_index(square).map(|i| self.0[i])
    }

    /// `(square name, confidence)` in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (String, f32)> + '_ {
        self.0.iter().enumerate().map(|(i, &c)| (square_name(i), c))
    }
}

impl Index<usize> for SquareConfidences {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl Serialize for SquareConfidences {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(BOARD_SQUARES))?;
        for (name, c) in self.iter() {
            map.serialize_entry(&name, &c)?;
        }
        map.end()
    }
}

/// Detected position with its confidence report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionResult {
    pub fen: String,
    /// Mean of the 64 square confidences.
    pub confidence: f32,
    pub square_confidences: SquareConfidences,
    /// Scan order.
    pub low_confidence_squares: Vec<String>,
    pub needs_review: bool,
    pub validation_errors: Vec<String>,
}

/// Castling rights implied by kings and rooks on their home squares.
///
/// Positional only: whether either piece has moved is unknowable from a
/// single image.
pub fn guess_castling(board: &[PieceLabel; BOARD_SQUARES]) -> CastlingRights {
    // a8 = 0, e8 = 4, h8 = 7, a1 = 56, e1 = 60, h1 = 63
    let white_king = board[60] == PieceLabel::Wk;
    let black_king = board[4] == PieceLabel::Bk;
    CastlingRights {
        white_king_side: white_king && board[63] == PieceLabel::Wr,
        white_queen_side: white_king && board[56] == PieceLabel::Wr,
        black_king_side: black_king && board[7] == PieceLabel::Br,
        black_queen_side: black_king && board[0] == PieceLabel::Br,
    }
}

/// Turns 64 square classifications into a FEN record and review report.
#[derive(Clone, Debug, Default)]
pub struct PositionAssembler {
    params: AssemblyParams,
}

impl PositionAssembler {
    pub fn new(params: AssemblyParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &AssemblyParams {
        &self.params
    }

    /// Assemble a position from scan-order classifications.
    ///
    /// Side to move is always white: nothing in a static image says whose
    /// turn it is. En passant, halfmove clock and fullmove number are fixed
    /// to `- 0 1`. Legality problems are reported in `validation_errors`;
    /// only a classification count other than 64 is an error.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn assemble(
        &self,
        classifications: &[SquareClassification],
    ) -> Result<PositionResult, AssembleError> {
        let squares: &[SquareClassification; BOARD_SQUARES] =
            classifications
                .try_into()
                .map_err(|_| AssembleError::InvalidInput {
                    expected: BOARD_SQUARES,
                    got: classifications.len(),
                })?;

        let board = squares.map(|c| c.label);
        let fen = format!(
            "{} w {} - 0 1",
            encode_placement(&board),
            guess_castling(&board)
        );

        let confidences = SquareConfidences(squares.map(|c| c.confidence));
        let confidence = (confidences.0.iter().map(|&c| c as f64).sum::<f64>()
            / BOARD_SQUARES as f64) as f32;

        let threshold = self.params.low_confidence_threshold;
        let low_confidence_squares: Vec<String> = confidences
            .iter()
            .filter(|&(_, c)| c < threshold)
            .map(|(name, _)| name)
            .collect();

        let validation_errors: Vec<String> =
            validate_fen(&fen).iter().map(ToString::to_string).collect();

        let needs_review = !low_confidence_squares.is_empty() || !validation_errors.is_empty();
        log::debug!(
            "assembled {fen} (confidence {confidence:.3}, {} low, {} issues)",
            low_confidence_squares.len(),
            validation_errors.len()
        );

        Ok(PositionResult {
            fen,
            confidence,
            square_confidences: confidences,
            low_confidence_squares,
            needs_review,
            validation_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn from_placement(placement: &str, confidence: f32) -> Vec<SquareClassification> {
        crate::fen::parse_placement(placement)
            .unwrap()
            .iter()
            .map(|&l| SquareClassification::new(l, confidence))
            .collect()
    }

    #[test]
    fn start_position_assembles_cleanly() {
        let input = from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", 1.0);
        let r = PositionAssembler::default().assemble(&input).unwrap();
        assert_eq!(r.fen, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(!r.needs_review);
        assert!(r.validation_errors.is_empty());
        assert!(r.low_confidence_squares.is_empty());
        assert_relative_eq!(r.confidence, 1.0);
    }

    #[test]
    fn empty_board_needs_review() {
        let input = vec![SquareClassification::new(PieceLabel::Empty, 1.0); 64];
        let r = PositionAssembler::default().assemble(&input).unwrap();
        assert_eq!(r.fen, "8/8/8/8/8/8/8/8 w - - 0 1");
        assert!(r.needs_review);
        assert!(r.validation_errors.contains(&"expected 1 white king, found 0".to_string()));
        assert!(r.validation_errors.contains(&"expected 1 black king, found 0".to_string()));
    }

    #[test]
    fn pawn_on_a8_is_flagged() {
        let mut input = vec![SquareClassification::new(PieceLabel::Empty, 1.0); 64];
        input[0] = SquareClassification::new(PieceLabel::Wp, 1.0);
        let r = PositionAssembler::default().assemble(&input).unwrap();
        assert!(r.fen.starts_with("P7/"));
        assert!(r
            .validation_errors
            .iter()
            .any(|e| e.contains("pawn on rank 8") && e.contains("a8")));
    }

    #[test]
    fn low_confidence_threshold_is_strict() {
        let mut input = from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", 1.0);
        input[10].confidence = 0.9;
        input[20].confidence = 0.8999;
        let r = PositionAssembler::default().assemble(&input).unwrap();
        assert_eq!(r.low_confidence_squares, ["e6"]);
        assert!(r.needs_review);
        assert!(r.validation_errors.is_empty());
        assert_eq!(r.square_confidences.get("c7"), Some(0.9));
        assert_eq!(r.square_confidences[20], 0.8999);
    }

    #[test]
    fn invalid_input_iff_not_64() {
        let assembler = PositionAssembler::default();
        for n in [0usize, 1, 63, 64, 65, 128] {
            let input = vec![SquareClassification::new(PieceLabel::Empty, 0.5); n];
            match assembler.assemble(&input) {
                Ok(_) => assert_eq!(n, 64),
                Err(AssembleError::InvalidInput { expected, got }) => {
                    assert_ne!(n, 64);
                    assert_eq!((expected, got), (64, n));
                }
            }
        }
    }

    #[test]
    fn castling_needs_king_and_rook_at_home() {
        let cases = [
            ("r3k2r/8/8/8/8/8/8/R3K2R", "KQkq"),
            ("4k2r/8/8/8/8/8/8/R3K3", "Qk"),
            ("r3k3/8/8/8/8/8/8/4K2R", "Kq"),
            ("r2k3r/8/8/8/8/8/8/R2K3R", "-"),
            ("R3k2R/8/8/8/8/8/8/r3K2r", "-"),
        ];
        for (placement, expected) in cases {
            let board = crate::fen::parse_placement(placement).unwrap();
            assert_eq!(guess_castling(&board).to_string(), expected, "{placement}");
        }
    }

    #[test]
    fn confidence_is_the_mean() {
        let mut input = from_placement("4k3/8/8/8/8/8/8/4K3", 1.0);
        for c in input.iter_mut().take(32) {
            c.confidence = 0.5;
        }
        let r = PositionAssembler::default().assemble(&input).unwrap();
        assert_relative_eq!(r.confidence, 0.75);
        assert_eq!(r.low_confidence_squares.len(), 32);
        assert_eq!(r.low_confidence_squares[0], "a8");
    }
}
