use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::engine::evaluate::{CHECKMATE_SCORE, evaluate};
use crate::game::board::BoardState;
use crate::game::moves::Move;
use crate::game::pieces::Color;

use super::limits::SearchLimits;
use super::ordering::MovePicker;
use super::results::{SearchResult, SearchStats};

/// Fixed-depth negamax over a board it owns for the duration of the search.
pub struct Search<'a> {
    pub state: &'a mut BoardState,
    pub stats: SearchStats,
    pub limits: SearchLimits,
}

impl<'a> Search<'a> {
    pub fn new(state: &'a mut BoardState, limits: SearchLimits) -> Self {
        Self {
            state,
            stats: SearchStats::new(),
            limits,
        }
    }

    /// Best move for `side`. Splits the root moves over a thread pool when
    /// more than one thread is allowed; the answer does not depend on it.
    pub fn run(&mut self, side: Color) -> SearchResult {
        let result = if self.limits.threads > 1 {
            self.run_parallel(side)
        } else {
            self.alpha_beta(side, self.limits.depth, -CHECKMATE_SCORE, CHECKMATE_SCORE)
        };

        log::info!(
            "score: {} nodes: {} time: {}ms nps: {}",
            result.score,
            self.stats.nodes,
            self.stats.get_elapsed_ms(),
            self.stats.get_nps()
        );

        result
    }

    fn score_move(&mut self, board_move: &Move, side: Color, depth: usize, alpha: i32, beta: i32) -> i32 {
        let undo = self.state.do_move(board_move);

        let score = if depth == 0 {
            self.stats.increment_nodes();
            evaluate(self.state, side)
        } else {
            -self.alpha_beta(!side, depth - 1, -beta, -alpha).score
        };

        self.state.undo_move(&undo);

        score
    }

    /// Fail-soft alpha-beta; at depth 0 the replies are scored statically.
    pub fn alpha_beta(&mut self, side: Color, depth: usize, mut alpha: i32, beta: i32) -> SearchResult {
        self.stats.increment_nodes();

        let moves = self.state.get_legal_moves(side);

        if moves.is_empty() {
            return SearchResult::no_move(-CHECKMATE_SCORE);
        }

        let mut best_move = None;
        let mut best_score = -CHECKMATE_SCORE;

        for board_move in MovePicker::new(self.state, moves) {
            let score = self.score_move(&board_move, side, depth, alpha, beta);

            if best_move.is_none() || score > best_score {
                best_move = Some(board_move);
                best_score = score;

                if best_score > alpha {
                    alpha = best_score;
                }

                if best_score >= beta {
                    break;
                }
            }
        }

        SearchResult::new(best_move, best_score)
    }

    /// Plain negamax with the same move order and no pruning.
    pub fn minimax(&mut self, side: Color, depth: usize) -> SearchResult {
        self.stats.increment_nodes();

        let moves = self.state.get_legal_moves(side);

        if moves.is_empty() {
            return SearchResult::no_move(-CHECKMATE_SCORE);
        }

        let mut best_move = None;
        let mut best_score = -CHECKMATE_SCORE;

        for board_move in MovePicker::new(self.state, moves) {
            let undo = self.state.do_move(&board_move);

            let score = if depth == 0 {
                self.stats.increment_nodes();
                evaluate(self.state, side)
            } else {
                -self.minimax(!side, depth - 1).score
            };

            self.state.undo_move(&undo);

            if best_move.is_none() || score > best_score {
                best_move = Some(board_move);
                best_score = score;
            }
        }

        SearchResult::new(best_move, best_score)
    }

    /// Every root move gets its own copy of the board and a full window, so
    /// the scores are exact and the first best one wins as in the serial search.
    fn run_parallel(&mut self, side: Color) -> SearchResult {
        let pool = match ThreadPoolBuilder::new().num_threads(self.limits.threads).build() {
            Ok(pool) => pool,
            Err(err) => {
                log::warn!("Failed to build a pool of {} threads ({}), searching serially", self.limits.threads, err);
                return self.alpha_beta(side, self.limits.depth, -CHECKMATE_SCORE, CHECKMATE_SCORE);
            }
        };

        self.stats.increment_nodes();

        let moves = self.state.get_legal_moves(side);

        if moves.is_empty() {
            return SearchResult::no_move(-CHECKMATE_SCORE);
        }

        let ordered = MovePicker::new(self.state, moves).collect::<Vec<_>>();
        let root = &*self.state;
        let limits = self.limits;

        let scored = pool.install(|| {
            ordered
                .par_iter()
                .map(|board_move| {
                    let mut state = root.clone();
                    let mut search = Search::new(&mut state, limits);

                    let score = search.score_move(board_move, side, limits.depth, -CHECKMATE_SCORE, CHECKMATE_SCORE);

                    (*board_move, score, search.stats.nodes)
                })
                .collect::<Vec<_>>()
        });

        let mut best = SearchResult::no_move(-CHECKMATE_SCORE);

        for (board_move, score, nodes) in scored {
            self.stats.nodes += nodes;
            log::debug!("root move {:?} scored {}", board_move, score);

            if best.best_move.is_none() || score > best.score {
                best = SearchResult::new(Some(board_move), score);
            }
        }

        best
    }
}

/// Searches a copy of `state` for the best move of `side`.
pub fn search_best_move(state: &BoardState, side: Color, depth: usize) -> SearchResult {
    let mut state = state.clone();
    let limits = SearchLimits { depth, threads: 1 };

    Search::new(&mut state, limits).run(side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::GameStatus;
    use crate::game::pieces::{EMPTY, SquareStateExt};
    use crate::game::square::Position;

    fn kings_only() -> BoardState {
        let mut state = BoardState::empty();
        state.set(Position::at(5, 10, 5), u8::WHITE_KING);
        state.set(Position::at(1, 3, 5), u8::BLACK_KING);
        state
    }

    #[test]
    fn takes_a_hanging_queen() {
        let mut state = kings_only();
        let rook = Position::at(3, 6, 2);
        state.set(rook, u8::WHITE_ROOK);
        state.set(Position::at(3, 6, 4), u8::BLACK_QUEEN);
        state.recompute_material_imbalance();

        let result = search_best_move(&state, Color::White, 0);

        assert_eq!(
            result.best_move,
            Some(Move::Piece {
                from: rook,
                to: Position::at(3, 6, 4)
            })
        );
        assert!(result.score > 0);
    }

    // black king in the corner of its board, both exits covered by white rooks
    fn cornered_black_king(checking: bool) -> BoardState {
        let mut state = kings_only();
        state.set(Position::at(1, 3, 5), EMPTY);
        state.set(Position::at(1, 3, 2), u8::BLACK_KING);
        state.set(Position::at(3, 7, 3), u8::WHITE_ROOK);

        if checking {
            state.set(Position::at(3, 7, 2), u8::WHITE_ROOK);
        } else {
            state.set(Position::at(1, 4, 5), u8::WHITE_ROOK);
        }

        state.ply = 1;
        state.recompute_material_imbalance();
        state
    }

    #[test]
    fn mated_root_has_no_move() {
        let state = cornered_black_king(true);

        assert!(state.clone().get_legal_moves(Color::Black).is_empty());
        assert!(state.is_in_check(Color::Black));
        assert_eq!(state.game_status(), GameStatus::MateForWhite);

        let result = search_best_move(&state, Color::Black, 1);
        assert_eq!(result, SearchResult::no_move(-CHECKMATE_SCORE));
    }

    #[test]
    fn stalemate_scores_as_a_loss() {
        let state = cornered_black_king(false);

        assert!(state.clone().get_legal_moves(Color::Black).is_empty());
        assert!(!state.is_in_check(Color::Black));
        assert!(state.is_stalemate());
        assert_eq!(state.game_status(), GameStatus::MateForWhite);

        let result = search_best_move(&state, Color::Black, 2);
        assert_eq!(result, SearchResult::no_move(-CHECKMATE_SCORE));
    }

    #[test]
    fn stalemating_reply_is_worth_a_mate() {
        // white to move; any quiet move leaves black stalemated
        let mut state = cornered_black_king(false);
        state.ply = 0;

        let result = search_best_move(&state, Color::White, 1);
        assert_eq!(result.score, CHECKMATE_SCORE);
    }

    #[test]
    fn alpha_beta_agrees_with_minimax() {
        let mut state = BoardState::new();

        for depth in 0..2 {
            let mut minimax_state = state.clone();
            let expected = Search::new(&mut minimax_state, SearchLimits { depth, threads: 1 }).minimax(Color::White, depth);

            let mut pruned = Search::new(&mut state, SearchLimits { depth, threads: 1 });
            let result = pruned.alpha_beta(Color::White, depth, -CHECKMATE_SCORE, CHECKMATE_SCORE);

            assert_eq!(result, expected);
            assert_eq!(state, BoardState::new());
        }
    }

    #[test]
    fn parallel_root_matches_serial() {
        let state = BoardState::new();

        let serial = search_best_move(&state, Color::White, 1);

        let mut copy = state.clone();
        let parallel = Search::new(&mut copy, SearchLimits { depth: 1, threads: 4 }).run(Color::White);

        assert_eq!(parallel, serial);
    }
}
