//! Forsyth-Edwards Notation: placement encoding and full-record parsing.

use std::fmt;

use snapfen_core::{square_index, square_name, PieceColor, PieceLabel, BOARD_SQUARES};

/// Errors produced by [`Position::from_fen`] and [`parse_placement`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 1 to 6 fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} describes {width} squares")]
    RankWidth { rank: u8, width: usize },
    #[error("rank {rank} has two consecutive digits")]
    AdjacentDigits { rank: u8 },
    #[error("invalid piece character `{0}`")]
    BadPiece(char),
    #[error("invalid side to move `{0}`")]
    BadSide(String),
    #[error("invalid castling field `{0}`")]
    BadCastling(String),
    #[error("invalid en passant square `{0}`")]
    BadEnPassant(String),
    #[error("invalid move counter `{0}`")]
    BadCounter(String),
}

/// Run-length encoded placement field, rank 8 first.
pub fn encode_placement(board: &[PieceLabel; BOARD_SQUARES]) -> String {
    let mut out = String::with_capacity(72);
    for (r, rank) in board.chunks_exact(8).enumerate() {
        if r > 0 {
            out.push('/');
        }
        let mut empty = 0u8;
        for label in rank {
            match label.fen_char() {
                None => empty += 1,
                Some(c) => {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(c);
                }
            }
        }
        if empty > 0 {
            out.push((b'0' + empty) as char);
        }
    }
    out
}

/// Parse a placement field back into 64 labels in scan order.
pub fn parse_placement(field: &str) -> Result<[PieceLabel; BOARD_SQUARES], FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut board = [PieceLabel::Empty; BOARD_SQUARES];
    for (r, rank) in ranks.iter().enumerate() {
        let rank_no = 8 - r as u8;
        let mut file = 0usize;
        let mut prev_digit = false;
        for c in rank.chars() {
            if let Some(d) = c.to_digit(10) {
                if !(1..=8).contains(&d) {
                    return Err(FenError::BadPiece(c));
                }
                if prev_digit {
                    return Err(FenError::AdjacentDigits { rank: rank_no });
                }
                file += d as usize;
                prev_digit = true;
            } else {
                let label = PieceLabel::from_fen_char(c).ok_or(FenError::BadPiece(c))?;
                if file < 8 {
                    board[r * 8 + file] = label;
                }
                file += 1;
                prev_digit = false;
            }
            if file > 8 {
                return Err(FenError::RankWidth {
                    rank: rank_no,
                    width: file,
                });
            }
        }
        if file != 8 {
            return Err(FenError::RankWidth {
                rank: rank_no,
                width: file,
            });
        }
    }
    Ok(board)
}

/// Castling availability flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }

    /// `-` or a subset of `KQkq`, each letter at most once.
    pub fn parse(field: &str) -> Result<Self, FenError> {
        let bad = || FenError::BadCastling(field.to_string());
        if field == "-" {
            return Ok(Self::default());
        }
        if field.is_empty() {
            return Err(bad());
        }
        let mut rights = Self::default();
        for c in field.chars() {
            let slot = match c {
                'K' => &mut rights.white_king_side,
                'Q' => &mut rights.white_queen_side,
                'k' => &mut rights.black_king_side,
                'q' => &mut rights.black_queen_side,
                _ => return Err(bad()),
            };
            if *slot {
                return Err(bad());
            }
            *slot = true;
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("-");
        }
        for (set, c) in [
            (self.white_king_side, 'K'),
            (self.white_queen_side, 'Q'),
            (self.black_king_side, 'k'),
            (self.black_queen_side, 'q'),
        ] {
            if set {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// A parsed FEN record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Square contents in scan order (a8, b8, ..., h1).
    pub board: [PieceLabel; BOARD_SQUARES],
    pub side_to_move: PieceColor,
    pub castling: CastlingRights,
    /// Scan-order index of the en passant target square.
    pub en_passant: Option<usize>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    /// Parse a FEN record. Trailing fields may be omitted and default to
    /// `w - - 0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.is_empty() || fields.len() > 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        let board = parse_placement(fields[0])?;

        let side_to_move = match fields.get(1).copied().unwrap_or("w") {
            "w" => PieceColor::White,
            "b" => PieceColor::Black,
            other => return Err(FenError::BadSide(other.to_string())),
        };

        let castling = CastlingRights::parse(fields.get(2).copied().unwrap_or("-"))?;

        let en_passant = match fields.get(3).copied().unwrap_or("-") {
            "-" => None,
            sq => {
                let idx = square_index(sq).ok_or_else(|| FenError::BadEnPassant(sq.to_string()))?;
                // target squares only exist on ranks 3 and 6
                if !sq.ends_with('3') && !sq.ends_with('6') {
                    return Err(FenError::BadEnPassant(sq.to_string()));
                }
                Some(idx)
            }
        };

        let counter = |i: usize, default: u32| -> Result<u32, FenError> {
            match fields.get(i) {
                None => Ok(default),
                Some(s) => s.parse().map_err(|_| FenError::BadCounter(s.to_string())),
            }
        };
        let halfmove_clock = counter(4, 0)?;
        let fullmove_number = counter(5, 1)?;

        Ok(Self {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Number of squares holding `label`.
    pub fn count(&self, label: PieceLabel) -> usize {
        self.board.iter().filter(|&&l| l == label).count()
    }

    /// Number of pieces of `color`.
    pub fn count_color(&self, color: PieceColor) -> usize {
        self.board.iter().filter(|l| l.color() == Some(color)).count()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side_to_move {
            PieceColor::White => 'w',
            PieceColor::Black => 'b',
        };
        let ep = self.en_passant.map(square_name);
        write!(
            f,
            "{} {side} {} {} {} {}",
            encode_placement(&self.board),
            self.castling,
            ep.as_deref().unwrap_or("-"),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Deterministic pseudo-random boards (LCG), half of the squares empty.
    fn boards(n: usize) -> Vec<[PieceLabel; BOARD_SQUARES]> {
        let mut state = 0x2545_f491u32;
        let mut next = move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 16) as usize
        };
        (0..n)
            .map(|_| {
                std::array::from_fn(|_| {
                    let r = next() % 26;
                    PieceLabel::from_index(r.saturating_sub(13)).unwrap_or(PieceLabel::Empty)
                })
            })
            .collect()
    }

    #[test]
    fn start_position_parses_and_prints() {
        let pos = Position::from_fen(START).unwrap();
        assert_eq!(pos.board[0], PieceLabel::Br);
        assert_eq!(pos.board[4], PieceLabel::Bk);
        assert_eq!(pos.board[60], PieceLabel::Wk);
        assert_eq!(pos.side_to_move, PieceColor::White);
        assert_eq!(pos.castling.to_string(), "KQkq");
        assert_eq!(pos.count(PieceLabel::Wp), 8);
        assert_eq!(pos.count_color(PieceColor::Black), 16);
        assert_eq!(pos.to_string(), START);
    }

    #[test]
    fn placement_round_trips() {
        for board in boards(200) {
            let placement = encode_placement(&board);
            assert_eq!(parse_placement(&placement).unwrap(), board, "{placement}");
        }
        let empty = [PieceLabel::Empty; BOARD_SQUARES];
        assert_eq!(encode_placement(&empty), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn missing_trailing_fields_take_defaults() {
        let pos = Position::from_fen("8/8/8/8/8/8/8/8").unwrap();
        assert_eq!(pos.side_to_move, PieceColor::White);
        assert!(pos.castling.is_none());
        assert_eq!(pos.en_passant, None);
        assert_eq!((pos.halfmove_clock, pos.fullmove_number), (0, 1));

        let pos = Position::from_fen("8/8/8/8/4P3/8/8/8 b - e3 0 1").unwrap();
        assert_eq!(pos.en_passant, square_index("e3"));
        assert_eq!(pos.side_to_move, PieceColor::Black);
    }

    #[test]
    fn malformed_records_are_rejected() {
        let cases = [
            ("", FenError::FieldCount(0)),
            ("8/8/8/8/8/8/8/8 w - - 0 1 extra", FenError::FieldCount(7)),
            ("8/8/8/8/8/8/8", FenError::RankCount(7)),
            ("9/8/8/8/8/8/8/8", FenError::BadPiece('9')),
            ("44/8/8/8/8/8/8/8", FenError::AdjacentDigits { rank: 8 }),
            ("8/8/8/8/8/8/8/7", FenError::RankWidth { rank: 1, width: 7 }),
            ("8/8/8/8/8/8/8/ppppppppp", FenError::RankWidth { rank: 1, width: 9 }),
            ("8/8/8/8/8/8/8/7x", FenError::BadPiece('x')),
            ("8/8/8/8/8/8/8/8 x", FenError::BadSide("x".into())),
            ("8/8/8/8/8/8/8/8 w KK", FenError::BadCastling("KK".into())),
            ("8/8/8/8/8/8/8/8 w Kx", FenError::BadCastling("Kx".into())),
            ("8/8/8/8/8/8/8/8 w - e4", FenError::BadEnPassant("e4".into())),
            ("8/8/8/8/8/8/8/8 w - - x", FenError::BadCounter("x".into())),
        ];
        for (fen, expected) in cases {
            assert_eq!(Position::from_fen(fen), Err(expected), "{fen:?}");
        }
    }

    #[test]
    fn illegal_placements_still_parse() {
        // no kings, a pawn on the back rank, two black kings
        for fen in ["P7/8/8/8/8/8/8/8 w - - 0 1", "kk6/8/8/8/8/8/8/8"] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.count(PieceLabel::Wk), 0, "{fen}");
        }
        assert_eq!(
            Position::from_fen("kk6/8/8/8/8/8/8/8").unwrap().count(PieceLabel::Bk),
            2
        );
    }

    #[test]
    fn castling_prints_in_canonical_order() {
        let rights = CastlingRights::parse("qK").unwrap();
        assert_eq!(rights.to_string(), "Kq");
        assert_eq!(CastlingRights::default().to_string(), "-");
    }
}
