use crate::piece_type::PieceType;
use crate::side::Side;

/// A single piece on the board: its side, its type and the square it stands on.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub side: Side,
    pub piece_type: PieceType,
    pub position: u8,
}

impl Piece {
    pub fn new(side: Side, piece_type: PieceType, position: u8) -> Self {
        debug_assert!(position < 64, "piece position out of range: {}", position);
        Piece {
            side,
            piece_type,
            position,
        }
    }
}
