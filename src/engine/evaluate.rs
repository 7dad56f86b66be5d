use crate::game::board::BoardState;
use crate::game::pieces::{Color, EMPTY, SquareStateExt};
use crate::game::square::{
    ATTACK_BOARD_SIZE, BAREA, MAIN_BOARD_SIZE, NUM_MAIN_BOARDS, Position, board_squares,
    main_board_position,
};

/// Score of a side that has been mated; no evaluation gets close.
pub const CHECKMATE_SCORE: i32 = 1_000_000;

/// Centrality bonus per cell, shared by every level.
#[rustfmt::skip]
const SQUARE_SCORES: [i32; BAREA] = [
    -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1,
    -1,  0,  0, -1, -1,  0,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -1,  0,  0,  1,  1,  0,  0, -1,
    -1,  0,  1,  2,  2,  1,  0, -1,
    -1,  0,  1,  3,  3,  1,  0, -1,
    -1,  0,  1,  3,  3,  1,  0, -1,
    -1,  0,  1,  2,  2,  1,  0, -1,
    -1,  0,  0,  1,  1,  0,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -1,  0,  0, -1, -1,  0,  0, -1,
    -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1,
];

fn board_score(state: &BoardState, first: Position, size: usize) -> i32 {
    board_squares(first, size)
        .map(|pos| {
            let s = state.get(pos);

            if s == EMPTY {
                0
            } else {
                s.color().sign() * SQUARE_SCORES[pos.square]
            }
        })
        .sum()
}

/// Positional part of the evaluation, from white's view.
pub fn positional_score(state: &BoardState) -> i32 {
    let mut score = 0;

    for main_board in 0..NUM_MAIN_BOARDS {
        score += board_score(state, main_board_position(main_board), MAIN_BOARD_SIZE);
    }

    for attack_board in state.active_attack_boards() {
        score += board_score(state, attack_board.position(), ATTACK_BOARD_SIZE);
    }

    score
}

/// Static evaluation from the point of view of `side`.
pub fn evaluate(state: &BoardState, side: Color) -> i32 {
    (state.material_imbalance + positional_score(state)) * side.sign()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;

    #[test]
    fn initial_position_is_balanced() {
        let state = BoardState::new();

        assert_eq!(evaluate(&state, Color::White), 0);
        assert_eq!(evaluate(&state, Color::Black), 0);
    }

    #[test]
    fn centralizing_a_knight_pays() {
        let mut state = BoardState::new();

        // knight from the back rank corner to the center of the white board
        state.do_move(&Move::Piece {
            from: Position::at(5, 10, 2),
            to: Position::at(5, 8, 3),
        });

        assert_eq!(positional_score(&state), 2);
        assert_eq!(evaluate(&state, Color::White), 2);
        assert_eq!(evaluate(&state, Color::Black), -2);
    }

    #[test]
    fn material_dominates() {
        let mut state = BoardState::new();
        state.set(Position::at(1, 4, 4), EMPTY);
        state.recompute_material_imbalance();

        assert_eq!(state.material_imbalance, 10);
        assert!(evaluate(&state, Color::White) > 0);
        assert!(evaluate(&state, Color::Black) < 0);
    }
}
