use crate::game::board::BoardState;
use crate::game::moves::Move;
use crate::game::pieces::SquareStateExt;

/// Value of the captured piece, zero for quiet moves.
pub fn capture_rank(state: &BoardState, board_move: &Move) -> i32 {
    match board_move {
        Move::Piece { to, .. } => state.get(*to).piece().map_or(0, |piece| piece.value()),
        _ => 0,
    }
}

/// Hands out moves best capture first. Ranks are computed once; each call
/// to `next` selects the highest remaining one, so a cutoff skips the rest
/// of the sort.
pub struct MovePicker {
    moves: Vec<Move>,
    ranks: Vec<i32>,
    next: usize,
}

impl MovePicker {
    pub fn new(state: &BoardState, moves: Vec<Move>) -> Self {
        let ranks = moves.iter().map(|board_move| capture_rank(state, board_move)).collect();

        Self { moves, ranks, next: 0 }
    }
}

impl Iterator for MovePicker {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        if self.next >= self.moves.len() {
            return None;
        }

        let mut best = self.next;
        for i in self.next + 1..self.moves.len() {
            if self.ranks[i] > self.ranks[best] {
                best = i;
            }
        }

        self.moves.swap(self.next, best);
        self.ranks.swap(self.next, best);
        self.next += 1;

        Some(self.moves[self.next - 1])
    }
}
