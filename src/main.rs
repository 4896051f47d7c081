//! Interactive text front end for the shashki engine.
//!
//! Reads commands from stdin, renders the board to stdout and lets the
//! player face the engine at a chosen search depth. The whole game logic
//! lives in the library; this binary only translates between the command
//! surface and the engine API.

use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};

use shashki::board_square::coordinate_to_square;
use shashki::engine::best_move;
use shashki::errors::ShashkiErrors;
use shashki::game::Game;
use shashki::game_move::Move;
use shashki::move_generation::generate_moves_for_game;
use shashki::piece_type::PieceType;
use shashki::side::Side;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum PlayerColor {
    White,
    Black,
}

impl From<PlayerColor> for Side {
    fn from(color: PlayerColor) -> Side {
        match color {
            PlayerColor::White => Side::White,
            PlayerColor::Black => Side::Black,
        }
    }
}

/// Play Shashki (Russian draughts) against the engine in the terminal.
#[derive(Parser)]
#[command(name = "shashki", version)]
struct CliOptions {
    /// Engine level, the search depth in plies.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=15))]
    level: u8,

    /// The color the player controls.
    #[arg(long, value_enum, default_value_t = PlayerColor::White)]
    side: PlayerColor,
}

struct Cli {
    game: Game,
    player_side: Side,
    engine_level: usize,
}

const BOARD_HORIZONTAL_LINE: &str =
    "    :-------:-------:-------:-------:-------:-------:-------:-------:";
const BOARD_HORIZONTAL_PLACE: &str =
    "    :       :       :       :       :       :       :       :       :";
const BOARD_HORIZONTAL_DESCRIPTION: &str =
    "        A       B       C       D       E       F       G       H    ";

impl Cli {
    fn new(options: &CliOptions) -> Self {
        Cli {
            game: Game::default(),
            player_side: options.side.into(),
            engine_level: options.level as usize,
        }
    }

    fn piece_symbol(&self, row_index: u8, column_index: u8) -> char {
        let position = (row_index - 1) * 8 + (8 - column_index);
        let position_mask = 1u64 << position;
        let bit_board = self.game.bit_board();

        if bit_board.pieces_of_side_and_type(Side::White, PieceType::Man) & position_mask != 0 {
            'o'
        } else if bit_board.pieces_of_side_and_type(Side::White, PieceType::King) & position_mask
            != 0
        {
            'O'
        } else if bit_board.pieces_of_side_and_type(Side::Black, PieceType::Man) & position_mask
            != 0
        {
            '+'
        } else if bit_board.pieces_of_side_and_type(Side::Black, PieceType::King) & position_mask
            != 0
        {
            '#'
        } else {
            ' '
        }
    }

    fn print_board(&self) {
        for row_index in (1..=8).rev() {
            println!("{}", BOARD_HORIZONTAL_LINE);
            println!("{}", BOARD_HORIZONTAL_PLACE);
            print!("  {} ", row_index);
            for column_index in 1..=8 {
                print!(":   {}   ", self.piece_symbol(row_index, column_index));
            }
            println!(":");
            println!("{}", BOARD_HORIZONTAL_PLACE);
        }
        println!("{}", BOARD_HORIZONTAL_LINE);
        println!("{}\n", BOARD_HORIZONTAL_DESCRIPTION);
    }

    fn print_status(&self) {
        println!("\nYou are playing as: {}", self.player_side);
        println!("You are playing against engine level: {}", self.engine_level);
        println!("Side to move: {}", self.game.current_turn());
        println!("\nBoard:\n");
        self.print_board();
    }

    fn print_help(&self) {
        println!("\nHELP - prints the commands possible to use.");
        println!("STATUS - prints the current situation in the game with the board.");
        println!("SETUP - initializes a new game.");
        println!("HINT - shows the moves that are possible for you.");
        println!("BESTHINT - shows the best move you can do.");
        println!("MOVE:XX-XX - executes the move XX-XX (XX-XX-XX for a jump).");
        println!("QUIT - exits the shashki application.\n");
    }

    fn show_hint(&self) {
        println!();
        for possible_move in generate_moves_for_game(&self.game) {
            println!("{}", possible_move.description());
        }
        println!();
    }

    fn show_best_hint(&self) {
        match best_move(&self.game, self.engine_level) {
            Ok(hint) => println!("\n{}\n", hint.description()),
            Err(ShashkiErrors::NoLegalMoves) => println!("\nYou have no legal move left.\n"),
            Err(error) => println!("\n{}\n", error),
        }
    }

    /// Executes the engine's chosen move along its whole jump path.
    fn execute_move_path(&mut self, game_move: &Move) {
        self.game.execute_move(game_move);
        if let Some(follow_move) = game_move.follow_moves().first() {
            self.execute_move_path(follow_move);
        }
    }

    fn make_engine_move(&mut self) {
        println!("The engine is thinking about the next move...");

        match best_move(&self.game, self.engine_level) {
            Ok(engine_move) => {
                println!("The engine plays: {}", engine_move.description());
                self.execute_move_path(&engine_move);
                self.print_status();
                self.announce_game_over_if_finished();
            }
            Err(_) => println!("\nThe engine has no legal move left - you win!\n"),
        }
    }

    /// Checks that every square label in the move description parses; this
    /// tells a mistyped command apart from a move that is merely illegal.
    fn move_description_is_well_formed(description: &str) -> bool {
        let squares: Vec<&str> = description.split('-').collect();
        (2..=3).contains(&squares.len())
            && squares
                .iter()
                .all(|square| coordinate_to_square(square).is_ok())
    }

    fn make_move(&mut self, input: &str) {
        let description = match input.split_once(':') {
            Some((_, description)) => description.trim().to_string(),
            None => {
                println!("\nA move command looks like MOVE:A3-B4!\n");
                return;
            }
        };

        if !Self::move_description_is_well_formed(&description) {
            println!("\nThat is not a move description - try something like A3-B4.\n");
            return;
        }

        let possible_moves = generate_moves_for_game(&self.game);
        let chosen = possible_moves
            .into_iter()
            .find(|possible_move| possible_move.description() == description);

        match chosen {
            Some(player_move) => {
                self.game.execute_move(&player_move);
                self.print_status();

                if self.announce_game_over_if_finished() {
                    return;
                }
                if self.game.current_turn() != self.player_side {
                    self.make_engine_move();
                }
            }
            None => println!("\nInvalid move!\n"),
        }
    }

    /// Prints the result when the side to move has no legal move left.
    fn announce_game_over_if_finished(&self) -> bool {
        if !generate_moves_for_game(&self.game).is_empty() {
            return false;
        }

        if self.game.current_turn() == self.player_side {
            println!("\nYou have no move left - the engine wins!\n");
        } else {
            println!("\nThe engine has no move left - you win!\n");
        }
        true
    }

    fn setup_game(&mut self, input_lines: &mut impl Iterator<Item = io::Result<String>>) {
        println!("\nWelcome to a new game of Shashki!\n");

        loop {
            print!("Please choose the color you want to play (White/Black): ");
            let _ = io::stdout().flush();
            match next_command(input_lines) {
                Some(color) if color == "WHITE" => {
                    self.player_side = Side::White;
                    break;
                }
                Some(color) if color == "BLACK" => {
                    self.player_side = Side::Black;
                    break;
                }
                Some(_) => println!("Invalid input!"),
                None => return,
            }
        }

        loop {
            print!("Please choose the engine level (1-15): ");
            let _ = io::stdout().flush();
            match next_command(input_lines) {
                Some(level) => match level.parse::<usize>() {
                    Ok(level) if (1..=15).contains(&level) => {
                        self.engine_level = level;
                        break;
                    }
                    _ => println!("Invalid input!"),
                },
                None => return,
            }
        }

        self.game = Game::default();

        println!("\nSetup finished, the game can start!");
        self.print_status();

        if self.game.current_turn() != self.player_side {
            self.make_engine_move();
        }
    }
}

fn next_command(input_lines: &mut impl Iterator<Item = io::Result<String>>) -> Option<String> {
    for line in input_lines {
        match line {
            Ok(line) => {
                let trimmed = line.trim().to_uppercase();
                if !trimmed.is_empty() {
                    return Some(trimmed);
                }
            }
            Err(_) => return None,
        }
    }
    None
}

fn main() {
    let options = CliOptions::parse();
    let mut cli = Cli::new(&options);

    let stdin = io::stdin();
    let mut input_lines = stdin.lock().lines();

    println!("\nWelcome to a new game of Shashki!");
    cli.print_status();
    if cli.game.current_turn() != cli.player_side {
        cli.make_engine_move();
    }

    loop {
        print!("Please enter the next command (type \"HELP\" for help): ");
        let _ = io::stdout().flush();

        let input = match next_command(&mut input_lines) {
            Some(input) => input,
            None => break,
        };

        if input.starts_with("MOVE") {
            cli.make_move(&input);
            continue;
        }

        match input.as_str() {
            "HELP" => cli.print_help(),
            "STATUS" => cli.print_status(),
            "SETUP" => cli.setup_game(&mut input_lines),
            "HINT" => cli.show_hint(),
            "BESTHINT" => cli.show_best_hint(),
            "QUIT" => break,
            _ => println!("\nInvalid input!\n"),
        }
    }

    println!("\nExiting shashki application...");
}
