use crate::game::pieces::{EMPTY, SquareState};
use crate::game::square::{AttackBoard, Position};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Piece { from: Position, to: Position },
    AttackBoard { from: AttackBoard, to: AttackBoard },
    WhiteKingsideCastling,
    WhiteQueensideCastling,
    BlackKingsideCastling,
    BlackQueensideCastling,
}

impl Move {
    pub fn is_castling(&self) -> bool {
        matches!(
            self,
            Move::WhiteKingsideCastling
                | Move::WhiteQueensideCastling
                | Move::BlackKingsideCastling
                | Move::BlackQueensideCastling
        )
    }
}

// an attack board relocation touches both 2x2 blocks
pub const MAX_SQUARES_TOUCHED_PER_MOVE: usize = 8;

/// Everything `do_move` overwrote, so `undo_move` can put it back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UndoInfo {
    pub num_squares_touched: usize,
    pub squares_touched: [Position; MAX_SQUARES_TOUCHED_PER_MOVE],
    pub prev_states: [SquareState; MAX_SQUARES_TOUCHED_PER_MOVE],
    pub prev_attack_board_bits: u32,
    pub prev_attack_board_side: u32,
    pub prev_castling_rights: u8,
    pub prev_material_imbalance: i32,
}

impl UndoInfo {
    pub fn new(
        attack_board_bits: u32,
        attack_board_side: u32,
        castling_rights: u8,
        material_imbalance: i32,
    ) -> Self {
        Self {
            num_squares_touched: 0,
            squares_touched: [Position::new(0, 0); MAX_SQUARES_TOUCHED_PER_MOVE],
            prev_states: [EMPTY; MAX_SQUARES_TOUCHED_PER_MOVE],
            prev_attack_board_bits: attack_board_bits,
            prev_attack_board_side: attack_board_side,
            prev_castling_rights: castling_rights,
            prev_material_imbalance: material_imbalance,
        }
    }

    pub fn touch(&mut self, pos: Position, prev_state: SquareState) {
        assert!(
            self.num_squares_touched < MAX_SQUARES_TOUCHED_PER_MOVE,
            "move touched more than {} squares",
            MAX_SQUARES_TOUCHED_PER_MOVE
        );

        self.squares_touched[self.num_squares_touched] = pos;
        self.prev_states[self.num_squares_touched] = prev_state;
        self.num_squares_touched += 1;
    }
}
