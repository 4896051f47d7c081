//! Move selection: alpha-beta minimax over lazily expanded board nodes.
//!
//! The search works on boards, not on move trees: a jump chain with several
//! paths only matters through the boards its endings produce, so every
//! ending becomes one child node. Each root child carries its own board as
//! the "ancestor" through the recursion, and the winning ancestor board is
//! mapped back onto the generated move list at the end. That keeps the
//! search free of any move-tree bookkeeping.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::bit_board::BitBoard;
use crate::errors::ShashkiErrors;
use crate::evaluation::{evaluate_bit_board, Score, MAX_SCORE, MIN_SCORE};
use crate::game::Game;
use crate::game_move::Move;
use crate::move_generation::{generate_moves_for_game, generate_moves_for_side};
use crate::side::Side;

/// A node of the search tree: one board constellation and the
/// constellations reachable from it. Children are only attached while the
/// search descends through the node.
struct EngineNode {
    bit_board: BitBoard,
    child_nodes: Vec<EngineNode>,
}

impl EngineNode {
    fn new(bit_board: BitBoard) -> Self {
        EngineNode {
            bit_board,
            child_nodes: Vec::new(),
        }
    }
}

/// What the search hands back up the recursion: the evaluation of the best
/// reachable ending and the board produced by the first ply that leads
/// there.
struct EngineResult {
    evaluation_value: Score,
    ancestor_move_bit_board: Option<BitBoard>,
}

/// Attaches one child per ending of the move's jump tree. A move with two
/// alternative follow jumps that themselves branch twice contributes four
/// children, one per reachable board.
fn convert_move_combo_to_child_nodes(engine_node: &mut EngineNode, game_move: &Move) {
    if game_move.follow_moves().is_empty() {
        engine_node
            .child_nodes
            .push(EngineNode::new(game_move.target_bit_board()));
    } else {
        for follow_move in game_move.follow_moves() {
            convert_move_combo_to_child_nodes(engine_node, follow_move);
        }
    }
}

/// Expands and evaluates the node in one pass, so that subtrees cut off by
/// the alpha-beta pruning are never built at all. White maximises, Black
/// minimises; the window is fail-hard.
fn build_and_evaluate(
    engine_node: &mut EngineNode,
    side: Side,
    depth: usize,
    mut alpha: Score,
    mut beta: Score,
    ancestor_move_bit_board: Option<BitBoard>,
) -> EngineResult {
    if depth == 0 {
        return EngineResult {
            evaluation_value: evaluate_bit_board(&engine_node.bit_board),
            ancestor_move_bit_board,
        };
    }

    let possible_moves = generate_moves_for_side(&engine_node.bit_board, side);
    if possible_moves.is_empty() {
        return EngineResult {
            evaluation_value: evaluate_bit_board(&engine_node.bit_board),
            ancestor_move_bit_board,
        };
    }

    for possible_move in &possible_moves {
        convert_move_combo_to_child_nodes(engine_node, possible_move);
    }

    if side == Side::White {
        let mut maximum = EngineResult {
            evaluation_value: MIN_SCORE,
            ancestor_move_bit_board: None,
        };

        for child_node in &mut engine_node.child_nodes {
            // At the root every child tags itself as the ancestor; deeper
            // down the inherited ancestor is passed through.
            let child_ancestor = ancestor_move_bit_board.or(Some(child_node.bit_board));
            let evaluation =
                build_and_evaluate(child_node, Side::Black, depth - 1, alpha, beta, child_ancestor);

            if evaluation.evaluation_value > maximum.evaluation_value {
                maximum = evaluation;
            }
            if maximum.evaluation_value > alpha {
                alpha = maximum.evaluation_value;
            }
            if beta <= alpha {
                break;
            }
        }

        maximum
    } else {
        let mut minimum = EngineResult {
            evaluation_value: MAX_SCORE,
            ancestor_move_bit_board: None,
        };

        for child_node in &mut engine_node.child_nodes {
            let child_ancestor = ancestor_move_bit_board.or(Some(child_node.bit_board));
            let evaluation =
                build_and_evaluate(child_node, Side::White, depth - 1, alpha, beta, child_ancestor);

            if evaluation.evaluation_value < minimum.evaluation_value {
                minimum = evaluation;
            }
            if minimum.evaluation_value < beta {
                beta = minimum.evaluation_value;
            }
            if beta <= alpha {
                break;
            }
        }

        minimum
    }
}

/// Searches the game tree to the given depth and returns the move that
/// realises the best reachable evaluation for the side to move. The
/// returned move is shrunk to the single jump path the search chose.
///
/// # Returns
/// * `Ok(Move)` - The chosen move.
/// * `Err(ShashkiErrors::NoLegalMoves)` - If the side to move cannot move.
pub fn best_move(game: &Game, depth: usize) -> Result<Move, ShashkiErrors> {
    let mut start_node = EngineNode::new(game.bit_board());
    let engine_result = build_and_evaluate(
        &mut start_node,
        game.current_turn(),
        depth,
        MIN_SCORE,
        MAX_SCORE,
        None,
    );

    if let Some(ancestor_move_bit_board) = engine_result.ancestor_move_bit_board {
        let possible_moves = generate_moves_for_game(game);
        for possible_move in &possible_moves {
            if possible_move.compare_follow_moves_to_bit_board(&ancestor_move_bit_board) {
                let mut chosen = possible_move.clone();
                chosen.shrink_follow_moves_to_bit_board(&ancestor_move_bit_board);
                return Ok(chosen);
            }
        }
    }

    // The search produced no usable ancestor (or the combo move list does
    // not contain it) - any legal move is better than none.
    random_move(game)
}

/// A uniformly random legal move, shrunk to a single random jump path.
pub fn random_move(game: &Game) -> Result<Move, ShashkiErrors> {
    random_move_with_rng(game, &mut rand::rng())
}

/// Like [`random_move`] with a caller-supplied random source, for
/// reproducible games and benchmarks.
pub fn random_move_with_rng(game: &Game, rng: &mut impl Rng) -> Result<Move, ShashkiErrors> {
    let possible_moves = generate_moves_for_game(game);

    let mut chosen = possible_moves
        .choose(rng)
        .cloned()
        .ok_or(ShashkiErrors::NoLegalMoves)?;
    chosen.shrink_follow_moves_randomly(rng);

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::piece_type::PieceType;

    #[test]
    fn test_depth_one_picks_the_best_evaluation() {
        // White can promote on A8 or C8 (worth +5) or shuffle the man on
        // D2 (worth +1); depth one must pick a promotion.
        let bit_board = BitBoard::new(1 << 54 | 1 << 12, 0, 1 << 55, 0);
        let game = Game::from_position(bit_board, Side::White);

        let chosen = best_move(&game, 1).unwrap();
        assert!(chosen.is_promotion());
        assert_eq!(evaluate_bit_board(&chosen.target_bit_board()), 5 + 1 - 1);

        let legal_moves = generate_moves_for_side(&bit_board, Side::White);
        let best_score = legal_moves
            .iter()
            .map(|game_move| evaluate_bit_board(&game_move.target_bit_board()))
            .max()
            .unwrap();
        assert_eq!(evaluate_bit_board(&chosen.target_bit_board()), best_score);
    }

    #[test]
    fn test_depth_two_takes_the_free_man() {
        // White king on E5 against a lone black man on F6.
        let bit_board = BitBoard::new(0, 1 << 35, 1 << 42, 0);
        let game = Game::from_position(bit_board, Side::White);

        let chosen = best_move(&game, 2).unwrap();
        assert_eq!(
            chosen.attacked_piece().map(|attacked| attacked.position),
            Some(42)
        );
        assert_eq!(evaluate_bit_board(&chosen.target_bit_board()), 5);
    }

    #[test]
    fn test_black_minimises() {
        // The mirrored position: a black king takes the white man.
        let bit_board = BitBoard::new(1 << 42, 0, 0, 1 << 35);
        let game = Game::from_position(bit_board, Side::Black);

        let chosen = best_move(&game, 2).unwrap();
        assert_eq!(
            chosen.attacked_piece().map(|attacked| attacked.position),
            Some(42)
        );
        assert_eq!(evaluate_bit_board(&chosen.target_bit_board()), -5);
    }

    #[test]
    fn test_best_move_returns_shrunken_jump_chain() {
        // The double jump C3-D4-E5, E5-D6-C7 is the only move; the engine
        // must hand back the full linear chain.
        let bit_board = BitBoard::new(1 << 21, 0, 1 << 28 | 1 << 44, 0);
        let game = Game::from_position(bit_board, Side::White);

        let chosen = best_move(&game, 1).unwrap();
        assert_eq!(chosen.description(), "C3-D4-E5");
        assert_eq!(chosen.follow_moves().len(), 1);
        let follow = &chosen.follow_moves()[0];
        assert_eq!(follow.description(), "E5-D6-C7");
        assert!(follow.follow_moves().is_empty());
        assert_eq!(evaluate_bit_board(&follow.target_bit_board()), 1);
    }

    #[test]
    fn test_best_move_from_the_starting_position() {
        let game = Game::default();
        let legal_descriptions: Vec<String> = generate_moves_for_game(&game)
            .iter()
            .map(Move::description)
            .collect();

        for depth in 1..=4 {
            let chosen = best_move(&game, depth).unwrap();
            assert!(legal_descriptions.contains(&chosen.description()));
        }
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        // The white man on A7 is completely blocked by the man on B8.
        let bit_board = BitBoard::new(1 << 55, 0, 1 << 62, 0);
        let game = Game::from_position(bit_board, Side::White);

        assert!(matches!(
            best_move(&game, 3),
            Err(ShashkiErrors::NoLegalMoves)
        ));
        assert!(matches!(
            random_move(&game),
            Err(ShashkiErrors::NoLegalMoves)
        ));
    }

    #[test]
    fn test_random_move_is_reproducible_and_linear() {
        let game = Game::default();

        let mut first_rng = StdRng::seed_from_u64(42);
        let mut second_rng = StdRng::seed_from_u64(42);
        let first = random_move_with_rng(&game, &mut first_rng).unwrap();
        let second = random_move_with_rng(&game, &mut second_rng).unwrap();
        assert_eq!(first, second);

        // A random move from a branching jump tree is always one path.
        let bit_board = BitBoard::new(
            1 << 21,
            0,
            1 << 28 | 1 << 44 | 1 << 46 | 1 << 30,
            0,
        );
        let combo_game = Game::from_position(bit_board, Side::White);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            let chosen = random_move_with_rng(&combo_game, &mut rng).unwrap();
            let mut node = &chosen;
            while !node.follow_moves().is_empty() {
                assert_eq!(node.follow_moves().len(), 1);
                assert_eq!(
                    node.follow_moves()[0].moving_piece().piece_type,
                    PieceType::Man
                );
                node = &node.follow_moves()[0];
            }
        }
    }

    #[test]
    fn test_search_prefers_not_to_lose_material() {
        // Black to move with a man on D6; stepping to C5 or E5 would let
        // the white man on B4/F4 jump it. The safe retreat keeps material
        // level, and depth two sees the threat.
        let bit_board = BitBoard::new(1 << 30 | 1 << 26, 0, 1 << 44 | 1 << 62, 0);
        let game = Game::from_position(bit_board, Side::Black);

        let chosen = best_move(&game, 2).unwrap();
        let mut next_game = game.clone();
        next_game.execute_move(&chosen);

        let answers = generate_moves_for_side(&next_game.bit_board(), Side::White);
        let white_can_capture = answers
            .iter()
            .any(|game_move| game_move.attacked_piece().is_some());
        assert!(!white_can_capture, "black walked into a capture");
    }
}
