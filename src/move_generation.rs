//! Bitboard move generation.
//!
//! All pieces of one side and type are moved together, one diagonal
//! direction at a time, with a single shift of their bitboard word. Wall
//! masks drop the pieces that would leave the board before the shift and
//! occupancy masks drop the ones that would land on another piece after it;
//! the surviving bits are then read back into individual moves.
//!
//! Jump generation runs the same idea in two phases per direction: first
//! the pieces advance onto an enemy square (Kings may slide over empty
//! squares to get there), then the pieces standing on an enemy jump past it
//! onto an empty landing square. Every generated jump recursively collects
//! its follow jumps, carrying a capture mask of the squares already jumped
//! in the chain so that no piece is ever jumped twice and the chain cannot
//! cross a jumped square again.

use crate::bit_board::BitBoard;
use crate::game::Game;
use crate::game_move::Move;
use crate::piece::Piece;
use crate::piece_type::PieceType;
use crate::side::Side;

// Walls keeping pieces from stepping over the edge of the board. The attack
// walls are two squares wide because a jump needs room for the enemy square
// and the landing square.
const WALL_NORMAL_LEFT: u64 = 0x8080_8080_8080_8080;
const WALL_NORMAL_RIGHT: u64 = 0x0101_0101_0101_0101;
const WALL_NORMAL_UP: u64 = 0xFF00_0000_0000_0000;
const WALL_NORMAL_DOWN: u64 = 0x0000_0000_0000_00FF;
const WALL_ATTACK_LEFT: u64 = 0xC0C0_C0C0_C0C0_C0C0;
const WALL_ATTACK_RIGHT: u64 = 0x0303_0303_0303_0303;
const WALL_ATTACK_UP: u64 = 0xFFFF_0000_0000_0000;
const WALL_ATTACK_DOWN: u64 = 0x0000_0000_0000_FFFF;

/// One of the four diagonal directions a piece can move in, with the walls
/// that apply to it and the number of places a single diagonal step shifts
/// a square index.
struct MoveDirection {
    normal_wall: u64,
    attack_wall: u64,
    position_move: i32,
}

impl MoveDirection {
    fn shift(&self, bits: u64) -> u64 {
        if self.position_move >= 0 {
            bits << self.position_move
        } else {
            bits >> -self.position_move
        }
    }

    /// Whether a piece of the given side and type promotes when it lands on
    /// the given square moving in this direction. Only Men promote: White
    /// on the top row, Black on the bottom row.
    fn promotes(&self, side: Side, piece_type: PieceType, position: u8) -> bool {
        if piece_type != PieceType::Man {
            return false;
        }
        if self.position_move > 0 {
            side == Side::White && position > 55
        } else {
            side == Side::Black && position < 8
        }
    }
}

const LEFT_UP: MoveDirection = MoveDirection {
    normal_wall: WALL_NORMAL_LEFT | WALL_NORMAL_UP,
    attack_wall: WALL_ATTACK_LEFT | WALL_ATTACK_UP,
    position_move: 9,
};

const RIGHT_UP: MoveDirection = MoveDirection {
    normal_wall: WALL_NORMAL_RIGHT | WALL_NORMAL_UP,
    attack_wall: WALL_ATTACK_RIGHT | WALL_ATTACK_UP,
    position_move: 7,
};

const LEFT_DOWN: MoveDirection = MoveDirection {
    normal_wall: WALL_NORMAL_LEFT | WALL_NORMAL_DOWN,
    attack_wall: WALL_ATTACK_LEFT | WALL_ATTACK_DOWN,
    position_move: -7,
};

const RIGHT_DOWN: MoveDirection = MoveDirection {
    normal_wall: WALL_NORMAL_RIGHT | WALL_NORMAL_DOWN,
    attack_wall: WALL_ATTACK_RIGHT | WALL_ATTACK_DOWN,
    position_move: -9,
};

const ALL_DIRECTIONS: [&MoveDirection; 4] = [&LEFT_UP, &RIGHT_UP, &LEFT_DOWN, &RIGHT_DOWN];

/// Yields the set bit indices of a word in ascending order.
fn iter_set_bits(mut bits: u64) -> impl Iterator<Item = u8> {
    std::iter::from_fn(move || {
        if bits == 0 {
            None
        } else {
            let bit = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(bit)
        }
    })
}

/// Generates the legal moves for the game situation: the jump continuations
/// of the combo piece while a combo is running, the full move list of the
/// side to move otherwise.
pub fn generate_moves_for_game(game: &Game) -> Vec<Move> {
    match game.move_combo_piece() {
        Some(combo_piece) => {
            generate_moves_for_piece(&game.bit_board(), combo_piece, game.capture_bit_board())
        }
        None => generate_moves_for_side(&game.bit_board(), game.current_turn()),
    }
}

/// Generates all legal moves of one side on the given board.
///
/// Jump moves are generated first; since jumping is obligatory in Shashki,
/// normal moves are only offered when no jump exists. Men step only towards
/// the far side of the board, Kings slide any distance in all four
/// directions.
pub fn generate_moves_for_side(bit_board: &BitBoard, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();

    for piece_type in [PieceType::Man, PieceType::King] {
        for direction in ALL_DIRECTIONS {
            generate_attack_moves(&mut moves, bit_board, side, piece_type, direction);
        }
    }

    if moves.is_empty() {
        let man_directions: [&MoveDirection; 2] = match side {
            Side::White => [&LEFT_UP, &RIGHT_UP],
            Side::Black => [&LEFT_DOWN, &RIGHT_DOWN],
        };
        for direction in man_directions {
            generate_normal_moves(&mut moves, bit_board, side, PieceType::Man, direction);
        }
        for direction in ALL_DIRECTIONS {
            generate_normal_moves(&mut moves, bit_board, side, PieceType::King, direction);
        }
    }

    moves
}

/// Generates the jump moves of a single piece, honouring the squares
/// already jumped earlier in the chain. This is the entry point for the
/// combo situation, where only the combo piece may move and only by
/// jumping.
pub fn generate_moves_for_piece(
    bit_board: &BitBoard,
    piece: Piece,
    capture_bit_board: u64,
) -> Vec<Move> {
    let mut moves = Vec::new();

    for direction in ALL_DIRECTIONS {
        move_before_enemy(
            &mut moves,
            bit_board,
            piece.side,
            piece.piece_type,
            direction,
            capture_bit_board,
            1u64 << piece.position,
            1,
        );
    }

    moves
}

fn generate_normal_moves(
    moves: &mut Vec<Move>,
    bit_board: &BitBoard,
    side: Side,
    piece_type: PieceType,
    direction: &MoveDirection,
) {
    let move_bit_board = bit_board.pieces_of_side_and_type(side, piece_type);
    generate_normal_moves_with_bit_board(
        moves,
        bit_board,
        side,
        piece_type,
        direction,
        move_bit_board,
        1,
    );
}

fn generate_normal_moves_with_bit_board(
    moves: &mut Vec<Move>,
    bit_board: &BitBoard,
    side: Side,
    piece_type: PieceType,
    direction: &MoveDirection,
    mut move_bit_board: u64,
    move_count: i32,
) {
    // Drop the pieces that would step over the edge, step the rest together
    // and keep only the ones that landed on an empty square.
    move_bit_board &= !direction.normal_wall;
    move_bit_board = direction.shift(move_bit_board);
    move_bit_board &= !bit_board.blocking_board();

    if move_bit_board == 0 {
        return;
    }

    for target in iter_set_bits(move_bit_board) {
        let source = (target as i32 - move_count * direction.position_move) as u8;
        moves.push(Move::new(
            Piece::new(side, piece_type, source),
            target,
            None,
            direction.promotes(side, piece_type, target),
            *bit_board,
        ));
    }

    // Kings slide any distance, so the survivors take another step.
    if piece_type == PieceType::King {
        generate_normal_moves_with_bit_board(
            moves,
            bit_board,
            side,
            piece_type,
            direction,
            move_bit_board,
            move_count + 1,
        );
    }
}

fn generate_attack_moves(
    moves: &mut Vec<Move>,
    bit_board: &BitBoard,
    side: Side,
    piece_type: PieceType,
    direction: &MoveDirection,
) {
    let move_bit_board = bit_board.pieces_of_side_and_type(side, piece_type);
    move_before_enemy(
        moves,
        bit_board,
        side,
        piece_type,
        direction,
        0,
        move_bit_board,
        1,
    );
}

/// The first jump phase: the pieces advance in the direction until they
/// stand on an enemy square. A Man reaches the enemy with its single step;
/// a King may slide over any number of empty squares first, which is the
/// recursion here. Pieces standing on an enemy hand over to
/// [`move_after_enemy`].
fn move_before_enemy(
    moves: &mut Vec<Move>,
    bit_board: &BitBoard,
    side: Side,
    piece_type: PieceType,
    direction: &MoveDirection,
    capture_bit_board: u64,
    mut move_bit_board: u64,
    move_count: i32,
) {
    move_bit_board &= !direction.attack_wall;
    move_bit_board = direction.shift(move_bit_board);
    // A square jumped earlier in the chain cannot be crossed again.
    move_bit_board &= !capture_bit_board;

    if move_bit_board == 0 {
        return;
    }

    let attack_bit_board = move_bit_board & bit_board.blocking_board_of_side(side.opposite());

    // Only pieces on empty squares may keep sliding towards an enemy.
    move_bit_board &= !bit_board.blocking_board();
    if piece_type == PieceType::King {
        move_before_enemy(
            moves,
            bit_board,
            side,
            piece_type,
            direction,
            capture_bit_board,
            move_bit_board,
            move_count + 1,
        );
    }

    move_after_enemy(
        moves,
        bit_board,
        side,
        piece_type,
        direction,
        capture_bit_board,
        attack_bit_board,
        move_count + 1,
        1,
    );
}

/// The second jump phase: the pieces standing on an enemy square jump past
/// it onto an empty landing square. Kings may land any number of squares
/// behind the enemy, so the recursion grows the landing distance. Every
/// landing emits a jump move and collects its follow jumps with the enemy
/// square added to the capture mask.
fn move_after_enemy(
    moves: &mut Vec<Move>,
    bit_board: &BitBoard,
    side: Side,
    piece_type: PieceType,
    direction: &MoveDirection,
    capture_bit_board: u64,
    mut move_bit_board: u64,
    move_count: i32,
    attack_count: i32,
) {
    move_bit_board &= !direction.normal_wall;
    move_bit_board = direction.shift(move_bit_board);
    // The landing square has to be empty - a jump never takes two pieces at
    // once, a second piece is taken by a follow jump instead.
    move_bit_board &= !bit_board.blocking_board();
    move_bit_board &= !capture_bit_board;

    if move_bit_board == 0 {
        return;
    }

    for target in iter_set_bits(move_bit_board) {
        let source = (target as i32 - move_count * direction.position_move) as u8;
        let attacked_position = (target as i32 - attack_count * direction.position_move) as u8;

        let mut attack_move = Move::new(
            Piece::new(side, piece_type, source),
            target,
            Some(Piece::new(
                side.opposite(),
                bit_board.piece_type_on_position(attacked_position),
                attacked_position,
            )),
            direction.promotes(side, piece_type, target),
            *bit_board,
        );

        let follow_move_capture_bit_board = capture_bit_board | (1u64 << attacked_position);
        generate_follow_moves(&mut attack_move, follow_move_capture_bit_board);
        moves.push(attack_move);
    }

    if piece_type == PieceType::King {
        move_after_enemy(
            moves,
            bit_board,
            side,
            piece_type,
            direction,
            capture_bit_board,
            move_bit_board,
            move_count + 1,
            attack_count + 1,
        );
    }
}

/// Collects the follow jumps of a freshly generated jump move in all four
/// directions. The capture mask holds every square jumped so far in the
/// chain - those squares both block the path and must not be jumped again,
/// which matches the rule that jumped pieces only leave the board once the
/// whole chain is over.
fn generate_follow_moves(game_move: &mut Move, capture_bit_board: u64) {
    for direction in ALL_DIRECTIONS {
        follow_move_before_enemy(
            game_move,
            direction,
            capture_bit_board,
            1u64 << game_move.target_position(),
            1,
        );
    }
}

/// The effective type of the moving piece inside a jump chain: a Man that
/// promoted earlier in the chain continues jumping as a King.
fn effective_piece_type(game_move: &Move) -> PieceType {
    if game_move.is_promotion() {
        PieceType::King
    } else {
        game_move.moving_piece().piece_type
    }
}

/// Like [`move_before_enemy`], but running on the target board of the
/// previous jump and with the effective piece type, so a mid-chain
/// promotion switches the rest of the chain to King movement.
fn follow_move_before_enemy(
    game_move: &mut Move,
    direction: &MoveDirection,
    capture_bit_board: u64,
    mut move_bit_board: u64,
    move_count: i32,
) {
    move_bit_board &= !direction.attack_wall;
    move_bit_board = direction.shift(move_bit_board);
    move_bit_board &= !capture_bit_board;

    if move_bit_board == 0 {
        return;
    }

    let target_bit_board = game_move.target_bit_board();
    let enemy_side = game_move.moving_piece().side.opposite();
    let attack_bit_board = move_bit_board & target_bit_board.blocking_board_of_side(enemy_side);

    move_bit_board &= !target_bit_board.blocking_board();
    if effective_piece_type(game_move) == PieceType::King {
        follow_move_before_enemy(
            game_move,
            direction,
            capture_bit_board,
            move_bit_board,
            move_count + 1,
        );
    }

    follow_move_after_enemy(
        game_move,
        direction,
        capture_bit_board,
        attack_bit_board,
        move_count + 1,
        1,
    );
}

/// Like [`move_after_enemy`] for follow jumps: every landing square behind
/// the enemy becomes a follow move of the parent jump, which in turn
/// collects its own follow moves with the grown capture mask.
fn follow_move_after_enemy(
    game_move: &mut Move,
    direction: &MoveDirection,
    capture_bit_board: u64,
    mut move_bit_board: u64,
    move_count: i32,
    attack_count: i32,
) {
    move_bit_board &= !direction.normal_wall;
    move_bit_board = direction.shift(move_bit_board);
    move_bit_board &= !game_move.target_bit_board().blocking_board();
    move_bit_board &= !capture_bit_board;

    if move_bit_board == 0 {
        return;
    }

    let side = game_move.moving_piece().side;
    let piece_type = effective_piece_type(game_move);
    let source_bit_board = game_move.target_bit_board();

    for target in iter_set_bits(move_bit_board) {
        let source = (target as i32 - move_count * direction.position_move) as u8;
        let attacked_position = (target as i32 - attack_count * direction.position_move) as u8;

        let mut follow_move = Move::new(
            Piece::new(side, piece_type, source),
            target,
            Some(Piece::new(
                side.opposite(),
                source_bit_board.piece_type_on_position(attacked_position),
                attacked_position,
            )),
            direction.promotes(side, piece_type, target),
            source_bit_board,
        );

        let follow_move_capture_bit_board = capture_bit_board | (1u64 << attacked_position);
        generate_follow_moves(&mut follow_move, follow_move_capture_bit_board);
        game_move.add_follow_move(follow_move);
    }

    if piece_type == PieceType::King {
        follow_move_after_enemy(
            game_move,
            direction,
            capture_bit_board,
            move_bit_board,
            move_count + 1,
            attack_count + 1,
        );
    }
}
