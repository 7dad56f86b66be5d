use crate::game::board::BoardState;
use crate::game::moves::Move;
use crate::game::notation::move_as_string;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>, // None when the root has no legal move
    pub score: i32,
}

impl SearchResult {
    pub fn new(best_move: Option<Move>, score: i32) -> Self {
        Self { best_move, score }
    }

    pub fn no_move(score: i32) -> Self {
        Self {
            best_move: None,
            score,
        }
    }

    /// Renders the move against the position it was searched from.
    pub fn describe(&self, state: &BoardState) -> String {
        match &self.best_move {
            Some(best_move) => format!("{} ({})", move_as_string(state, best_move), self.score),
            None => format!("none ({})", self.score),
        }
    }
}

pub struct SearchStats {
    pub nodes: u64,
    pub start_time: Instant,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            nodes: 0,
            start_time: Instant::now(),
        }
    }

    pub fn increment_nodes(&mut self) {
        self.nodes += 1;
    }

    pub fn get_elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    pub fn get_nps(&self) -> u64 {
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        if elapsed_secs > 0.0 {
            (self.nodes as f64 / elapsed_secs) as u64
        } else {
            0
        }
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}
