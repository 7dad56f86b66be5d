use crate::engine::evaluate::evaluate;
use crate::engine::search::limits::{MAX_DEPTH, MAX_THREADS, SearchLimits, SearchParams};
use crate::engine::search::results::SearchResult;
use crate::engine::search::searcher::Search;
use crate::game::board::{BoardState, GameStatus};
use crate::game::moves::{Move, UndoInfo};
use crate::game::notation::{
    attack_board_as_string, is_well_formed_move, move_as_string, parse_position, position_as_string,
};
use crate::game::pieces::{Color, SquareStateExt};
use crate::game::square::{
    ATTACK_BOARD_SIZE, BLEVELS, MAIN_BOARD_SIZE, NUM_MAIN_BOARDS, Position, SquareIndexExt, board_squares,
    main_board_position,
};
use crate::utils::cli::Player;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::thread::{self, JoinHandle};

pub struct GameController {
    pub state: BoardState,
    pub history: Vec<(Move, UndoInfo)>,
    pub players: [Player; 2], // indexed by `Color`
    pub limits: SearchLimits,
    search_thread: Option<JoinHandle<SearchResult>>,
    last_search_result: Option<SearchResult>,
    rng: StdRng,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResultType {
    Success,         // successful move
    InvalidNotation, // not something a move renders as
    InvalidMove,     // well formed, but not legal here
    AmbiguousMove,   // several legal moves render the same
    NoHistory,       // nothing to take back
    GameOver,        // the game already ended
}

type PerftBreakdown = Vec<(Move, usize)>;

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl GameController {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// A controller whose random mover is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: BoardState::new(),
            history: Vec::new(),
            players: [Player::Human, Player::Computer],
            limits: SearchLimits::default(),
            search_thread: None,
            last_search_result: None,
            rng,
        }
    }

    pub fn new_game(&mut self) {
        self.wait_for_search();

        self.state = BoardState::new();
        self.history.clear();
        self.last_search_result = None;
    }

    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move()
    }

    pub fn player(&self, side: Color) -> Player {
        self.players[side as usize]
    }

    pub fn status(&self) -> GameStatus {
        self.state.game_status()
    }

    pub fn legal_moves(&mut self) -> Vec<Move> {
        let side = self.side_to_move();
        self.state.get_legal_moves(side)
    }

    /// Moves starting at the square named by `notation`.
    pub fn legal_moves_from(&mut self, notation: &str) -> Option<Vec<Move>> {
        let pos = parse_position(&self.state, notation)?;
        let side = self.side_to_move();

        Some(self.state.get_legal_moves_for_position(side, pos))
    }

    /// Resolves an index into the `legal_moves` listing or a rendered move.
    pub fn find_move(&mut self, notation: &str) -> Result<Move, MoveResultType> {
        let moves = self.legal_moves();

        if let Ok(index) = notation.parse::<usize>() {
            return moves.get(index).copied().ok_or(MoveResultType::InvalidMove);
        }

        if !is_well_formed_move(notation) {
            return Err(MoveResultType::InvalidNotation);
        }

        let mut matching = moves
            .into_iter()
            .filter(|board_move| move_as_string(&self.state, board_move) == notation);

        match (matching.next(), matching.next()) {
            (Some(board_move), None) => Ok(board_move),
            (Some(_), Some(_)) => Err(MoveResultType::AmbiguousMove),
            (None, _) => Err(MoveResultType::InvalidMove),
        }
    }

    /// Plays the move named by `notation`, returning it as rendered before it was played.
    pub fn play(&mut self, notation: &str) -> Result<String, MoveResultType> {
        if self.status() != GameStatus::InPlay {
            return Err(MoveResultType::GameOver);
        }

        let board_move = self.find_move(notation)?;
        let rendered = move_as_string(&self.state, &board_move);

        self.make_move(board_move);

        Ok(rendered)
    }

    pub fn try_move(&mut self, notation: &str) -> MoveResultType {
        match self.play(notation) {
            Ok(_) => MoveResultType::Success,
            Err(result) => result,
        }
    }

    /// Plays a move that is known to be legal.
    pub fn make_move(&mut self, board_move: Move) {
        let undo = self.state.do_move(&board_move);
        self.history.push((board_move, undo));
    }

    /// Takes back the last move, returning it.
    pub fn undo(&mut self) -> Result<Move, MoveResultType> {
        match self.history.pop() {
            Some((board_move, undo)) => {
                self.state.undo_move(&undo);
                Ok(board_move)
            }
            None => Err(MoveResultType::NoHistory),
        }
    }

    pub fn random_move(&mut self) -> Option<Move> {
        let moves = self.legal_moves();
        moves.choose(&mut self.rng).copied()
    }

    pub fn set_option(&mut self, name: &str, value: &str) {
        match name.to_lowercase().as_str() {
            "depth" => match value.parse::<usize>() {
                Ok(depth) if depth <= MAX_DEPTH => self.limits.depth = depth,
                Ok(_) => log::warn!(
                    "Invalid value for Depth option: {}. Expected value between 0 and {}",
                    value,
                    MAX_DEPTH
                ),
                Err(_) => log::warn!("Invalid value for Depth option: {}. Expected numeric value", value),
            },
            "threads" => match value.parse::<usize>() {
                Ok(threads) if (1..=MAX_THREADS).contains(&threads) => self.limits.threads = threads,
                Ok(_) => log::warn!(
                    "Invalid value for Threads option: {}. Expected value between 1 and {}",
                    value,
                    MAX_THREADS
                ),
                Err(_) => log::warn!("Invalid value for Threads option: {}. Expected numeric value", value),
            },
            "white" | "black" => match Player::from_str(value, true) {
                Ok(player) => {
                    let side = if name.eq_ignore_ascii_case("white") { Color::White } else { Color::Black };
                    self.players[side as usize] = player;
                }
                Err(_) => log::warn!(
                    "Invalid value for {} option: {}. Expected 'human' or 'computer'",
                    name,
                    value
                ),
            },
            _ => log::warn!("Unknown option: {}", name),
        }
    }

    /// Leaf counts below each legal move of the side to move.
    pub fn perft(&mut self, depth: usize) -> PerftBreakdown {
        let mut move_breakdown = vec![];

        for board_move in self.legal_moves() {
            let count = self.dfs_count_moves(board_move, depth);
            move_breakdown.push((board_move, count));
        }

        move_breakdown
    }

    fn dfs_count_moves(&mut self, initial_move: Move, depth: usize) -> usize {
        if depth <= 1 {
            return 1;
        }

        let undo = self.state.do_move(&initial_move);
        let current_moves = self.legal_moves();

        // bulk counting
        let total_count = if depth == 2 {
            current_moves.len()
        } else {
            current_moves
                .into_iter()
                .map(|board_move| self.dfs_count_moves(board_move, depth - 1))
                .sum()
        };

        self.state.undo_move(&undo);

        total_count
    }

    /// Starts a search of a copy of the position on a worker thread.
    pub fn search(&mut self, params: Vec<String>) {
        self.wait_for_search();

        let limits = SearchParams::parse(params).limits(self.limits);
        let mut state = self.state.clone();
        let side = self.side_to_move();

        let handle = thread::spawn(move || Search::new(&mut state, limits).run(side));

        self.search_thread = Some(handle);
    }

    pub fn wait_for_search(&mut self) -> Option<SearchResult> {
        if let Some(handle) = self.search_thread.take() {
            match handle.join() {
                Ok(result) => {
                    self.last_search_result = Some(result);
                    return Some(result);
                }
                Err(_) => log::warn!("Search thread panicked"),
            }
        }

        None
    }

    pub fn last_search_result(&self) -> Option<SearchResult> {
        self.last_search_result
    }

    /// Lets the computer answer while it is its turn and the game goes on.
    /// Returns the notation of every move it played.
    pub fn play_computer_moves(&mut self) -> Vec<String> {
        let mut played = vec![];

        while self.player(self.side_to_move()) == Player::Computer && self.status() == GameStatus::InPlay {
            self.search(vec![]);

            let Some(result) = self.wait_for_search() else {
                break;
            };

            let Some(board_move) = result.best_move else {
                break;
            };

            log::debug!("{} chose {}", self.side_to_move().name(), result.describe(&self.state));

            played.push(move_as_string(&self.state, &board_move));
            self.make_move(board_move);
        }

        played
    }

    pub fn print_evaluation(&self) {
        println!("{}", evaluate(&self.state, self.side_to_move()));
    }

    pub fn print_moves(&self, moves: &[Move]) {
        for (i, board_move) in moves.iter().enumerate() {
            println!("{:>3}: {}", i, move_as_string(&self.state, board_move));
        }

        println!("\nMoves: {}", moves.len());
    }

    /// Every present board from the black end down, with optional markers
    /// on the empty target squares of `highlights`.
    pub fn print_with_moves(&self, highlights: &[Position]) {
        for level in 0..BLEVELS {
            for main_board in 0..NUM_MAIN_BOARDS {
                let first = main_board_position(main_board);

                if first.level == level {
                    let name = ["B", "N", "W"][main_board].to_string();
                    self.print_board(&name, first, MAIN_BOARD_SIZE, highlights);
                }
            }

            for attack_board in self.state.active_attack_boards() {
                let first = attack_board.position();

                if first.level == level {
                    let name = format!(
                        "{} ({}, docked at {})",
                        attack_board_as_string(&attack_board),
                        self.state.attack_board_owner(attack_board).name(),
                        position_as_string(&self.state, &attack_board.closest_main_board_square())
                    );
                    self.print_board(&name, first, ATTACK_BOARD_SIZE, highlights);
                }
            }
        }

        println!("{} to move", self.side_to_move().name());
    }

    fn print_board(&self, name: &str, first: Position, size: usize, highlights: &[Position]) {
        println!("{}", name);

        let mut row = String::new();

        for pos in board_squares(first, size) {
            if row.is_empty() {
                row.push_str(&format!("{} ", 11 - pos.square.row()));
            }

            let s = self.state.get(pos);
            let c = if s.is_empty() && highlights.contains(&pos) { '*' } else { s.to_char() };

            row.push(' ');
            row.push(c);

            if pos.square.col() + 1 == first.square.col() + size {
                println!("{}", row);
                row.clear();
            }
        }

        let files = (0..size)
            .map(|c| "zabcde".as_bytes()[first.square.col() - 1 + c] as char)
            .map(|c| format!(" {}", c))
            .collect::<String>();

        println!("  {}", files);
    }

    pub fn print(&self) {
        self.print_with_moves(&[]);
    }

    /// Plays up to `count` random legal moves, stopping when the game ends.
    pub fn play_random_moves(&mut self, count: usize) -> usize {
        let mut played = 0;

        while played < count && self.status() == GameStatus::InPlay {
            let Some(board_move) = self.random_move() else {
                break;
            };

            self.make_move(board_move);
            played += 1;
        }

        played
    }
}
