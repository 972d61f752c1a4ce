//! Structural sanity checks on a position.
//!
//! Only what a board photo can get wrong is checked: king counts, pawns on
//! back ranks and piece-count overflow. Check, stalemate and move-history
//! consistency are out of reach.

use snapfen_core::{square_name, PieceColor, PieceKind, PieceLabel};

use crate::fen::{FenError, Position};

const MAX_PAWNS: usize = 8;
const MAX_PIECES: usize = 16;

/// One finding. Findings are collected, never raised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("invalid FEN: {0}")]
    InvalidFen(#[from] FenError),
    #[error("expected 1 {color} king, found {found}")]
    KingCount { color: PieceColor, found: usize },
    #[error("pawn on rank {rank}: {square}")]
    PawnOnBackRank { rank: u8, square: String },
    #[error("{color} has {count} pawns (max 8)")]
    TooManyPawns { color: PieceColor, count: usize },
    #[error("{color} has {count} pieces (max 16)")]
    TooManyPieces { color: PieceColor, count: usize },
}

/// Every issue found in `position`, in a fixed order: king counts (white,
/// black), pawns on rank 1 then rank 8 (file a to h), then pawn and piece
/// counts per color.
pub fn validate_position(position: &Position) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let colors = [PieceColor::White, PieceColor::Black];

    for color in colors {
        let found = position.count(PieceLabel::piece(color, PieceKind::King));
        if found != 1 {
            issues.push(ValidationIssue::KingCount { color, found });
        }
    }

    // scan order starts at rank 8, so rank 1 is the last row
    for (rank, row) in [(1u8, 7usize), (8, 0)] {
        for idx in row * 8..row * 8 + 8 {
            if position.board[idx].kind() == Some(PieceKind::Pawn) {
                issues.push(ValidationIssue::PawnOnBackRank {
                    rank,
                    square: square_name(idx),
                });
            }
        }
    }

    for color in colors {
        let pawns = position.count(PieceLabel::piece(color, PieceKind::Pawn));
        if pawns > MAX_PAWNS {
            issues.push(ValidationIssue::TooManyPawns { color, count: pawns });
        }
        let total = position.count_color(color);
        if total > MAX_PIECES {
            issues.push(ValidationIssue::TooManyPieces { color, count: total });
        }
    }

    issues
}

/// Parse `fen` and validate it; a parse failure is the only finding then.
pub fn validate_fen(fen: &str) -> Vec<ValidationIssue> {
    match Position::from_fen(fen) {
        Ok(position) => validate_position(&position),
        Err(e) => vec![e.into()],
    }
}
