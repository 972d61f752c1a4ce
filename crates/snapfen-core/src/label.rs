use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    White,
    Black,
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase FEN letter.
    pub fn fen_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

/// Square content label.
///
/// Variant order is the classification model's output order and must not
/// change: `empty, wp, wn, wb, wr, wq, wk, bp, bn, bb, br, bq, bk`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceLabel {
    Empty,
    Wp,
    Wn,
    Wb,
    Wr,
    Wq,
    Wk,
    Bp,
    Bn,
    Bb,
    Br,
    Bq,
    Bk,
}

impl PieceLabel {
    pub const COUNT: usize = 13;

    pub const ALL: [PieceLabel; Self::COUNT] = [
        PieceLabel::Empty,
        PieceLabel::Wp,
        PieceLabel::Wn,
        PieceLabel::Wb,
        PieceLabel::Wr,
        PieceLabel::Wq,
        PieceLabel::Wk,
        PieceLabel::Bp,
        PieceLabel::Bn,
        PieceLabel::Bb,
        PieceLabel::Br,
        PieceLabel::Bq,
        PieceLabel::Bk,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn piece(color: PieceColor, kind: PieceKind) -> Self {
        use PieceColor::*;
        use PieceKind::*;
        match (color, kind) {
            (White, Pawn) => PieceLabel::Wp,
            (White, Knight) => PieceLabel::Wn,
            (White, Bishop) => PieceLabel::Wb,
            (White, Rook) => PieceLabel::Wr,
            (White, Queen) => PieceLabel::Wq,
            (White, King) => PieceLabel::Wk,
            (Black, Pawn) => PieceLabel::Bp,
            (Black, Knight) => PieceLabel::Bn,
            (Black, Bishop) => PieceLabel::Bb,
            (Black, Rook) => PieceLabel::Br,
            (Black, Queen) => PieceLabel::Bq,
            (Black, King) => PieceLabel::Bk,
        }
    }

    pub fn color(self) -> Option<PieceColor> {
        match self.index() {
            0 => None,
            1..=6 => Some(PieceColor::White),
            _ => Some(PieceColor::Black),
        }
    }

    pub fn kind(self) -> Option<PieceKind> {
        const KINDS: [PieceKind; 6] = [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ];
        match self.index() {
            0 => None,
            i => Some(KINDS[(i - 1) % 6]),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == PieceLabel::Empty
    }

    /// FEN letter: uppercase for white, lowercase for black, `None` when empty.
    pub fn fen_char(self) -> Option<char> {
        let c = self.kind()?.fen_char();
        match self.color()? {
            PieceColor::White => Some(c.to_ascii_uppercase()),
            PieceColor::Black => Some(c),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some(Self::piece(color, kind))
    }

    pub fn as_str(self) -> &'static str {
        const NAMES: [&str; PieceLabel::COUNT] = [
            "empty", "wp", "wn", "wb", "wr", "wq", "wk", "bp", "bn", "bb", "br", "bq", "bk",
        ];
        NAMES[self.index()]
    }
}

impl fmt::Display for PieceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieceLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| format!("unknown square label `{s}`"))
    }
}

/// Label and confidence for one square.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquareClassification {
    #[serde(rename = "class")]
    pub label: PieceLabel,
    /// In `[0, 1]`.
    pub confidence: f32,
}

impl SquareClassification {
    pub fn new(label: PieceLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Algebraic name of a scan-order index (`0 -> a8`, `7 -> h8`, `63 -> h1`).
///
/// Indices past 63 wrap onto the board; callers pass `0..64`.
pub fn square_name(index: usize) -> String {
    let index = index % 64;
    let file = (b'a' + (index % 8) as u8) as char;
    let rank = 8 - index / 8;
    format!("{file}{rank}")
}

/// Scan-order index of an algebraic square name.
pub fn square_index(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    let file = file as usize - 'a' as usize;
    let rank = rank as usize - '0' as usize;
    Some((8 - rank) * 8 + file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_order_matches_model_output() {
        let names: Vec<&str> = PieceLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            names,
            ["empty", "wp", "wn", "wb", "wr", "wq", "wk", "bp", "bn", "bb", "br", "bq", "bk"]
        );
        for (i, l) in PieceLabel::ALL.iter().enumerate() {
            assert_eq!(l.index(), i);
            assert_eq!(PieceLabel::from_index(i), Some(*l));
        }
        assert_eq!(PieceLabel::from_index(13), None);
    }

    #[test]
    fn fen_letters_follow_color_case() {
        assert_eq!(PieceLabel::Wk.fen_char(), Some('K'));
        assert_eq!(PieceLabel::Bn.fen_char(), Some('n'));
        assert_eq!(PieceLabel::Empty.fen_char(), None);
        for l in PieceLabel::ALL.iter().skip(1) {
            let c = l.fen_char().unwrap();
            assert_eq!(PieceLabel::from_fen_char(c), Some(*l));
        }
        assert_eq!(PieceLabel::from_fen_char('x'), None);
    }

    #[test]
    fn color_and_kind_split() {
        assert_eq!(PieceLabel::Wq.color(), Some(PieceColor::White));
        assert_eq!(PieceLabel::Wq.kind(), Some(PieceKind::Queen));
        assert_eq!(PieceLabel::Bp.color(), Some(PieceColor::Black));
        assert_eq!(PieceLabel::Bp.kind(), Some(PieceKind::Pawn));
        assert_eq!(PieceLabel::Empty.kind(), None);
    }

    #[test]
    fn scan_order_names() {
        assert_eq!(square_name(0), "a8");
        assert_eq!(square_name(7), "h8");
        assert_eq!(square_name(8), "a7");
        assert_eq!(square_name(60), "e1");
        assert_eq!(square_name(63), "h1");
        for i in 0..64 {
            assert_eq!(square_index(&square_name(i)), Some(i));
        }
        assert_eq!(square_index("i1"), None);
        assert_eq!(square_index("a9"), None);
    }

    #[test]
    fn classification_serializes_with_class_key() {
        let c = SquareClassification::new(PieceLabel::Br, 0.5);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"class":"br","confidence":0.5}"#);
        assert_eq!("wk".parse::<PieceLabel>(), Ok(PieceLabel::Wk));
    }
}
