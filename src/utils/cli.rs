use clap::{Parser, ValueEnum};
use std::io;

use crate::engine::search::limits::DEFAULT_DEPTH;

/// Who picks the moves of one side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Player {
    Human,
    Computer,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Raumschach rules engine and player", long_about = None)]
pub struct Args {
    /// Search depth; 0 scores the replies statically
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Threads used to split the root moves of a search
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    #[arg(long, value_enum, default_value_t = Player::Human)]
    pub white: Player,

    #[arg(long, value_enum, default_value_t = Player::Computer)]
    pub black: Player,
}

pub enum GUICommand {
    New,                       // new game from the initial position
    Print,                     // print every active board
    Status,                    // report the game status
    Moves(Option<String>),     // moves [<square>]
    Move(String),              // move <notation|index>
    Random,                    // play a random legal move
    Undo,                      // take back the last move
    Search(Vec<String>),       // go (with params)
    Perft(String),             // perft <depth>
    Eval,                      // eval - static evaluation for the side to move
    SetOption(String, String), // setoption name <name> value <value>
    Quit,                      // quit the program

    Invalid(String), // placeholder for invalid commands so we can pattern match
}

impl GUICommand {
    /// Reads the next command; `None` once stdin is closed.
    pub fn receive() -> Option<GUICommand> {
        let mut input = String::new();

        match io::stdin().read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(Self::parse(&input)),
            Err(err) => {
                log::warn!("Failed to read a command: {}", err);
                None
            }
        }
    }

    pub fn parse(input: &str) -> GUICommand {
        let parts = input.split_whitespace().collect::<Vec<_>>();

        match parts.as_slice() {
            ["new"] => GUICommand::New,
            ["print"] => GUICommand::Print,
            ["status"] => GUICommand::Status,
            ["moves"] => GUICommand::Moves(None),
            ["moves", square] => GUICommand::Moves(Some(square.to_string())),
            ["move", notation] => GUICommand::Move(notation.to_string()),
            ["random"] => GUICommand::Random,
            ["undo"] => GUICommand::Undo,
            ["go", params @ ..] => GUICommand::Search(params.iter().map(|p| p.to_string()).collect()),
            ["perft", depth] => GUICommand::Perft(depth.to_string()),
            ["eval"] => GUICommand::Eval,
            ["setoption", "name", name_and_rest @ ..] if !name_and_rest.is_empty() => {
                Self::parse_setoption(name_and_rest)
            }
            ["quit"] => GUICommand::Quit,
            _ => GUICommand::Invalid(input.trim().to_string()),
        }
    }

    fn parse_setoption(parts: &[&str]) -> GUICommand {
        // everything before "value" is the option name
        match parts.iter().position(|&part| part == "value") {
            Some(value_pos) => {
                let name = parts[..value_pos].join(" ");
                let value = parts[value_pos + 1..].join(" ");

                if !name.is_empty() && !value.is_empty() {
                    GUICommand::SetOption(name, value)
                } else {
                    GUICommand::Invalid(format!("setoption name {} value {}", name, value))
                }
            }
            None => GUICommand::Invalid(format!("setoption name {}", parts.join(" "))),
        }
    }
}
