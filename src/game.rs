//! The running game: board, side to move and the executed move history.

use crate::bit_board::BitBoard;
use crate::game_move::Move;
use crate::piece::Piece;
use crate::piece_type::PieceType;
use crate::side::Side;

/// A game in progress. The board always equals the target board of the last
/// executed move. When the same side that just jumped is still to move, the
/// game is in a move combo and that side has to continue jumping.
#[derive(Clone, PartialEq, Debug)]
pub struct Game {
    bit_board: BitBoard,
    starting_bit_board: BitBoard,
    current_turn: Side,
    executed_moves: Vec<Move>,
}

impl Default for Game {
    /// A fresh game: starting position, White to move, empty history.
    fn default() -> Self {
        Game::from_position(BitBoard::default(), Side::White)
    }
}

impl Game {
    /// A game starting from an arbitrary position.
    pub fn from_position(bit_board: BitBoard, current_turn: Side) -> Self {
        Game {
            bit_board,
            starting_bit_board: bit_board,
            current_turn,
            executed_moves: Vec::new(),
        }
    }

    /// Executes a single ply. The history entry keeps no follow moves; the
    /// turn only passes to the opponent when the executed move had no
    /// follow moves, otherwise the same side continues its combo.
    pub fn execute_move(&mut self, game_move: &Move) {
        let mut executed = game_move.clone();
        let had_follow_moves = !executed.follow_moves().is_empty();
        executed.clear_follow_moves();

        self.bit_board = executed.target_bit_board();
        self.executed_moves.push(executed);

        if !had_follow_moves {
            self.current_turn = self.current_turn.opposite();
        }
    }

    /// Takes back the most recent plies of both players so that the side to
    /// move resumes from the position before its last move. Does nothing
    /// while the history holds fewer than three plies.
    pub fn undo_last_move(&mut self) {
        if self.executed_moves.len() < 3 {
            return;
        }

        while self
            .executed_moves
            .last()
            .is_some_and(|game_move| game_move.moving_piece().side != self.current_turn)
        {
            self.executed_moves.pop();
        }

        while self
            .executed_moves
            .last()
            .is_some_and(|game_move| game_move.moving_piece().side == self.current_turn)
        {
            self.executed_moves.pop();
        }

        self.bit_board = match self.executed_moves.last() {
            Some(game_move) => game_move.target_bit_board(),
            None => self.starting_bit_board,
        };
    }

    /// Whether the side to move just jumped and is expected to continue.
    pub fn in_move_combo(&self) -> bool {
        self.executed_moves
            .last()
            .is_some_and(|game_move| game_move.moving_piece().side == self.current_turn)
    }

    /// The piece that has to continue the combo, standing on the landing
    /// square of the last ply. A man that promoted on that ply continues
    /// as a King. `None` when no combo is in progress.
    pub fn move_combo_piece(&self) -> Option<Piece> {
        if !self.in_move_combo() {
            return None;
        }

        self.executed_moves.last().map(|last_move| {
            let piece_type = if last_move.is_promotion() {
                PieceType::King
            } else {
                last_move.moving_piece().piece_type
            };
            Piece::new(
                last_move.moving_piece().side,
                piece_type,
                last_move.target_position(),
            )
        })
    }

    /// The squares already jumped in the ongoing combo, collected from the
    /// trailing history entries of the side to move. Zero outside a combo.
    pub fn capture_bit_board(&self) -> u64 {
        self.executed_moves
            .iter()
            .rev()
            .take_while(|game_move| game_move.moving_piece().side == self.current_turn)
            .filter_map(|game_move| game_move.attacked_piece())
            .fold(0u64, |capture_bit_board, attacked| {
                capture_bit_board | (1u64 << attacked.position)
            })
    }

    pub fn bit_board(&self) -> BitBoard {
        self.bit_board
    }

    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    pub fn executed_moves(&self) -> &[Move] {
        &self.executed_moves
    }
}
