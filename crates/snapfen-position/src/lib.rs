//! From 64 square labels to a reviewed FEN record.
//!
//! [`PositionAssembler`] encodes the placement, guesses castling rights from
//! home squares, aggregates confidences and runs structural validation.
//! Validation findings are data, not errors: the only hard failure is a
//! classification count other than 64.
//!
//! ```
//! use snapfen_core::{PieceLabel, SquareClassification};
//! use snapfen_position::PositionAssembler;
//!
//! let squares = vec![SquareClassification::new(PieceLabel::Empty, 1.0); 64];
//! let result = PositionAssembler::default().assemble(&squares).unwrap();
//! assert_eq!(result.fen, "8/8/8/8/8/8/8/8 w - - 0 1");
//! assert!(result.needs_review);
//! ```

mod assemble;
mod fen;
mod validate;

pub use assemble::{
    guess_castling, AssembleError, AssemblyParams, PositionAssembler, PositionResult,
    SquareConfidences,
};
pub use fen::{encode_placement, parse_placement, CastlingRights, FenError, Position};
pub use validate::{validate_fen, validate_position, ValidationIssue};
