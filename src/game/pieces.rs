use std::ops::Not;
use strum::IntoEnumIterator;
use strum_macros::{EnumCount, EnumIter, FromRepr};

/// Packed contents of a single cell of the board array.
///
/// The low three bits hold the piece kind, `BLACK_FLAG` marks black pieces and
/// `MOVED_FLAG` marks pawns that already left their starting square.
pub type SquareState = u8;

pub const EMPTY: SquareState = 0;
pub const INVALID: SquareState = 255;

pub const BLACK_FLAG: SquareState = 8;
pub const PIECE_MASK: SquareState = BLACK_FLAG - 1;
pub const MOVED_FLAG: SquareState = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumCount, FromRepr)]
#[repr(u8)]
pub enum Piece {
    Pawn = 1,
    Rook = 2,
    Knight = 3,
    Bishop = 4,
    Queen = 5,
    King = 6,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount, FromRepr)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl Color {
    /// The bits a square of this color carries in `BLACK_FLAG`.
    pub const fn flag(self) -> SquareState {
        match self {
            Color::White => 0,
            Color::Black => BLACK_FLAG,
        }
    }

    /// +1 for white, -1 for black; the material imbalance is kept from white's view.
    pub const fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl Piece {
    pub const fn value(self) -> i32 {
        match self {
            Piece::Pawn => 10,
            Piece::Rook => 50,
            Piece::Knight => 20,
            Piece::Bishop => 30,
            Piece::Queen => 300,
            Piece::King => 30000,
        }
    }

    /// The square value of an unmoved piece of the given color.
    pub const fn with_color(self, color: Color) -> SquareState {
        self as SquareState | color.flag()
    }

    pub fn to_char(self) -> char {
        match self {
            Piece::Pawn   => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook   => 'r',
            Piece::Queen  => 'q',
            Piece::King   => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        Piece::iter().find(|piece| piece.to_char() == c.to_ascii_lowercase())
    }
}

pub trait SquareStateExt {
    fn is_empty(&self) -> bool;
    fn piece(&self) -> Option<Piece>;
    fn color(&self) -> Color;
    fn is_moved(&self) -> bool;
    fn belongs_to(&self, color: Color) -> bool;
    fn to_char(&self) -> char;

    const WHITE_PAWN: SquareState = Piece::Pawn.with_color(Color::White);
    const WHITE_ROOK: SquareState = Piece::Rook.with_color(Color::White);
    const WHITE_KNIGHT: SquareState = Piece::Knight.with_color(Color::White);
    const WHITE_BISHOP: SquareState = Piece::Bishop.with_color(Color::White);
    const WHITE_QUEEN: SquareState = Piece::Queen.with_color(Color::White);
    const WHITE_KING: SquareState = Piece::King.with_color(Color::White);

    const BLACK_PAWN: SquareState = Piece::Pawn.with_color(Color::Black);
    const BLACK_ROOK: SquareState = Piece::Rook.with_color(Color::Black);
    const BLACK_KNIGHT: SquareState = Piece::Knight.with_color(Color::Black);
    const BLACK_BISHOP: SquareState = Piece::Bishop.with_color(Color::Black);
    const BLACK_QUEEN: SquareState = Piece::Queen.with_color(Color::Black);
    const BLACK_KING: SquareState = Piece::King.with_color(Color::Black);
}

impl SquareStateExt for u8 {
    fn is_empty(&self) -> bool {
        *self == EMPTY
    }

    fn piece(&self) -> Option<Piece> {
        if *self == EMPTY || *self == INVALID {
            return None;
        }

        Piece::from_repr(*self & PIECE_MASK)
    }

    fn color(&self) -> Color {
        if *self & BLACK_FLAG != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    fn is_moved(&self) -> bool {
        *self & MOVED_FLAG != 0
    }

    fn belongs_to(&self, color: Color) -> bool {
        *self != EMPTY && *self != INVALID && self.color() == color
    }

    fn to_char(&self) -> char {
        match self.piece() {
            Some(piece) => match self.color() {
                Color::White => piece.to_char().to_ascii_uppercase(),
                Color::Black => piece.to_char(),
            },
            None if *self == INVALID => ' ',
            None => '.',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_state_decoding() {
        let moved_black_pawn = u8::BLACK_PAWN | MOVED_FLAG;

        assert_eq!(moved_black_pawn.piece(), Some(Piece::Pawn));
        assert_eq!(moved_black_pawn.color(), Color::Black);
        assert!(moved_black_pawn.is_moved());
        assert!(moved_black_pawn.belongs_to(Color::Black));
        assert!(!moved_black_pawn.belongs_to(Color::White));

        assert_eq!(u8::WHITE_KING.piece(), Some(Piece::King));
        assert_eq!(u8::WHITE_KING.color(), Color::White);
        assert!(!u8::WHITE_KING.is_moved());

        assert_eq!(EMPTY.piece(), None);
        assert_eq!(INVALID.piece(), None);
        assert!(!EMPTY.belongs_to(Color::White));
        assert!(!INVALID.belongs_to(Color::Black));
    }

    #[test]
    fn piece_chars() {
        for piece in Piece::iter() {
            assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
        }

        assert_eq!(Piece::from_char('N'), Some(Piece::Knight));
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn square_state_chars() {
        assert_eq!(u8::WHITE_QUEEN.to_char(), 'Q');
        assert_eq!(u8::BLACK_KNIGHT.to_char(), 'n');
        assert_eq!(EMPTY.to_char(), '.');
    }
}
