//! A move and its follow-jump continuations.
//!
//! A [`Move`] is a single ply together with the tree of jumps that may
//! continue it, so every root-to-leaf path through a move is one complete
//! legal move: either a single step, or a whole jump chain. The board state
//! after the ply is derived once during construction, which lets two moves
//! be compared by nothing but their source and target boards.

use rand::Rng;

use crate::bit_board::BitBoard;
use crate::board_square::square_to_coordinate;
use crate::piece::Piece;
use crate::piece_type::PieceType;
use crate::side::Side;

#[derive(Clone, Debug)]
pub struct Move {
    moving_piece: Piece,
    target_position: u8,
    attacked_piece: Option<Piece>,
    promotion: bool,
    source_bit_board: BitBoard,
    target_bit_board: BitBoard,
    follow_moves: Vec<Move>,
}

impl Move {
    /// Builds a move and derives its target board from the source board:
    /// the source square is vacated, the jumped piece (if any) is removed
    /// and the moving piece lands on the target square, as a King when the
    /// move promotes.
    pub fn new(
        moving_piece: Piece,
        target_position: u8,
        attacked_piece: Option<Piece>,
        promotion: bool,
        source_bit_board: BitBoard,
    ) -> Self {
        let mut target_bit_board = source_bit_board;

        let source_mask = !(1u64 << moving_piece.position);
        target_bit_board.white_men &= source_mask;
        target_bit_board.white_kings &= source_mask;
        target_bit_board.black_men &= source_mask;
        target_bit_board.black_kings &= source_mask;

        if let Some(attacked) = &attacked_piece {
            let attacked_mask = !(1u64 << attacked.position);
            target_bit_board.white_men &= attacked_mask;
            target_bit_board.white_kings &= attacked_mask;
            target_bit_board.black_men &= attacked_mask;
            target_bit_board.black_kings &= attacked_mask;
        }

        let target_mask = 1u64 << target_position;
        let lands_as_king = promotion || moving_piece.piece_type == PieceType::King;
        match (moving_piece.side, lands_as_king) {
            (Side::White, true) => target_bit_board.white_kings |= target_mask,
            (Side::White, false) => target_bit_board.white_men |= target_mask,
            (Side::Black, true) => target_bit_board.black_kings |= target_mask,
            (Side::Black, false) => target_bit_board.black_men |= target_mask,
        }

        Move {
            moving_piece,
            target_position,
            attacked_piece,
            promotion,
            source_bit_board,
            target_bit_board,
            follow_moves: Vec::new(),
        }
    }

    pub fn add_follow_move(&mut self, follow_move: Move) {
        self.follow_moves.push(follow_move);
    }

    pub fn clear_follow_moves(&mut self) {
        self.follow_moves.clear();
    }

    /// Whether any continuation through this move ends on the given board.
    /// A move without follow moves is its own ending.
    pub fn compare_follow_moves_to_bit_board(&self, bit_board: &BitBoard) -> bool {
        if self.follow_moves.is_empty() {
            self.target_bit_board == *bit_board
        } else {
            self.follow_moves
                .iter()
                .any(|follow_move| follow_move.compare_follow_moves_to_bit_board(bit_board))
        }
    }

    /// Prunes the follow moves down to the path that ends on the given
    /// board. The caller has to verify beforehand with
    /// [`Move::compare_follow_moves_to_bit_board`] that such a path exists.
    pub fn shrink_follow_moves_to_bit_board(&mut self, bit_board: &BitBoard) {
        self.follow_moves
            .retain(|follow_move| follow_move.compare_follow_moves_to_bit_board(bit_board));

        for follow_move in &mut self.follow_moves {
            follow_move.shrink_follow_moves_to_bit_board(bit_board);
        }
    }

    /// Keeps one uniformly chosen follow move at every level so that a
    /// single linear jump path remains.
    pub fn shrink_follow_moves_randomly(&mut self, rng: &mut impl Rng) {
        if self.follow_moves.is_empty() {
            return;
        }

        let keep = rng.random_range(0..self.follow_moves.len());
        self.follow_moves.swap(0, keep);
        self.follow_moves.truncate(1);
        self.follow_moves[0].shrink_follow_moves_randomly(rng);
    }

    /// The human-readable form of this ply: "A3-B4" for a step,
    /// "C3-D4-E5" for a jump with the jumped square in the middle.
    /// Follow moves are not included.
    pub fn description(&self) -> String {
        let mut description = String::new();

        description.push_str(&square_to_coordinate(self.moving_piece.position));
        description.push('-');

        if let Some(attacked) = &self.attacked_piece {
            description.push_str(&square_to_coordinate(attacked.position));
            description.push('-');
        }

        description.push_str(&square_to_coordinate(self.target_position));
        description
    }

    pub fn moving_piece(&self) -> Piece {
        self.moving_piece
    }

    pub fn target_position(&self) -> u8 {
        self.target_position
    }

    pub fn attacked_piece(&self) -> Option<Piece> {
        self.attacked_piece
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion
    }

    pub fn source_bit_board(&self) -> BitBoard {
        self.source_bit_board
    }

    pub fn target_bit_board(&self) -> BitBoard {
        self.target_bit_board
    }

    pub fn follow_moves(&self) -> &[Move] {
        &self.follow_moves
    }
}

impl PartialEq for Move {
    /// Two moves are the same transition when they start and end on the
    /// same boards. That pins down source, target and captured square.
    fn eq(&self, other: &Self) -> bool {
        self.source_bit_board == other.source_bit_board
            && self.target_bit_board == other.target_bit_board
    }
}
