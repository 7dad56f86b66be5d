use std::fmt::{Display, Formatter, Result};
use std::sync::LazyLock;

use super::moves::{Move, UndoInfo};
use super::pieces::{
    Color, EMPTY, INVALID, MOVED_FLAG, Piece, SquareState, SquareStateExt,
};
use super::square::{
    ATTACK_BOARD_SIZE, AttackBoard, BAREA, BCOLS, BLEVELS, BROWS, MAIN_BOARD_SIZE,
    NUM_ATTACK_BOARD_SLOTS, NUM_MAIN_BOARDS, Position, SquareIndex, SquareIndexExt, board_squares, main_board_position,
};

// castling rights bits
pub const CR_WHITE_KINGSIDE: u8 = 1;
pub const CR_WHITE_QUEENSIDE: u8 = 2;
pub const CR_BLACK_KINGSIDE: u8 = 4;
pub const CR_BLACK_QUEENSIDE: u8 = 8;
pub const CR_ALL: u8 = CR_WHITE_KINGSIDE | CR_WHITE_QUEENSIDE | CR_BLACK_KINGSIDE | CR_BLACK_QUEENSIDE;

pub const WHITE_KING_HOME: Position = Position::new(4, 11 * BCOLS + 5);
pub const WHITE_KINGSIDE_ROOK_HOME: Position = Position::new(4, 11 * BCOLS + 6);
pub const WHITE_QUEENSIDE_ROOK_HOME: Position = Position::new(4, 11 * BCOLS + 1);
pub const WHITE_QUEENSIDE_KING_TARGET: Position = Position::new(4, 11 * BCOLS + 2);

pub const BLACK_KING_HOME: Position = Position::new(0, 2 * BCOLS + 5);
pub const BLACK_KINGSIDE_ROOK_HOME: Position = Position::new(0, 2 * BCOLS + 6);
pub const BLACK_QUEENSIDE_ROOK_HOME: Position = Position::new(0, 2 * BCOLS + 1);
pub const BLACK_QUEENSIDE_KING_TARGET: Position = Position::new(0, 2 * BCOLS + 2);

pub fn castling_rights_of(color: Color) -> u8 {
    match color {
        Color::White => CR_WHITE_KINGSIDE | CR_WHITE_QUEENSIDE,
        Color::Black => CR_BLACK_KINGSIDE | CR_BLACK_QUEENSIDE,
    }
}

/// Fixed squares of one of the four castling moves.
#[derive(Copy, Clone, Debug)]
pub struct CastlingSquares {
    pub color: Color,
    pub right: u8,
    pub king_from: Position,
    pub king_to: Position,
    pub rook_from: Position,
    pub rook_to: Position,
}

pub fn castling_squares(board_move: &Move) -> Option<CastlingSquares> {
    match board_move {
        Move::WhiteKingsideCastling => Some(CastlingSquares {
            color: Color::White,
            right: CR_WHITE_KINGSIDE,
            king_from: WHITE_KING_HOME,
            king_to: WHITE_KINGSIDE_ROOK_HOME,
            rook_from: WHITE_KINGSIDE_ROOK_HOME,
            rook_to: WHITE_KING_HOME,
        }),
        Move::WhiteQueensideCastling => Some(CastlingSquares {
            color: Color::White,
            right: CR_WHITE_QUEENSIDE,
            king_from: WHITE_KING_HOME,
            king_to: WHITE_QUEENSIDE_KING_TARGET,
            rook_from: WHITE_QUEENSIDE_ROOK_HOME,
            rook_to: WHITE_KING_HOME,
        }),
        Move::BlackKingsideCastling => Some(CastlingSquares {
            color: Color::Black,
            right: CR_BLACK_KINGSIDE,
            king_from: BLACK_KING_HOME,
            king_to: BLACK_KINGSIDE_ROOK_HOME,
            rook_from: BLACK_KINGSIDE_ROOK_HOME,
            rook_to: BLACK_KING_HOME,
        }),
        Move::BlackQueensideCastling => Some(CastlingSquares {
            color: Color::Black,
            right: CR_BLACK_QUEENSIDE,
            king_from: BLACK_KING_HOME,
            king_to: BLACK_QUEENSIDE_KING_TARGET,
            rook_from: BLACK_QUEENSIDE_ROOK_HOME,
            rook_to: BLACK_KING_HOME,
        }),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// White has no legal moves.
    MateForBlack,
    /// Black has no legal moves.
    MateForWhite,
    InPlay,
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            GameStatus::MateForBlack => "black wins by checkmate",
            GameStatus::MateForWhite => "white wins by checkmate",
            GameStatus::InPlay => "in play",
        };

        write!(f, "{}", text)
    }
}

/// The whole mutable state of a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardState {
    pub board: [[SquareState; BAREA]; BLEVELS],
    pub attack_board_bits: u32, // presence of each attack board slot
    pub attack_board_side: u32, // set bits are black-owned attack boards
    pub material_imbalance: i32, // positive is good for white
    pub castling_rights: u8,
    pub ply: u32,
}

fn blank_level() -> [SquareState; BAREA] {
    let mut level = [EMPTY; BAREA];

    for (square, cell) in level.iter_mut().enumerate() {
        let (row, col) = (square.row(), square.col());

        let is_border = row < 2 || row >= BROWS - 2 || col == 0 || col == BCOLS - 1;
        let is_notch = (row == 2 || row == BROWS - 3) && (col == 3 || col == 4);

        if is_border || is_notch {
            *cell = INVALID;
        }
    }

    level
}

static INITIAL_BOARD_STATE: LazyLock<BoardState> = LazyLock::new(|| {
    let mut state = BoardState::empty();

    let back_rank = [u8::BLACK_ROOK, u8::BLACK_QUEEN, u8::BLACK_KING, u8::BLACK_ROOK];
    let corner_cols = [1, 2, 5, 6];

    // black attack boards sit above the black main board
    state.add_attack_board(AttackBoard::new(0, AttackBoard::ABOVE_LEFT_UP), Color::Black);
    state.add_attack_board(AttackBoard::new(0, AttackBoard::ABOVE_RIGHT_UP), Color::Black);

    for (col, piece) in corner_cols.iter().zip(back_rank) {
        state.set(Position::at(0, 2, *col), piece);
        state.set(Position::at(0, 3, *col), u8::BLACK_PAWN);
    }

    let black_officers = [u8::BLACK_KNIGHT, u8::BLACK_BISHOP, u8::BLACK_BISHOP, u8::BLACK_KNIGHT];
    for (i, piece) in black_officers.into_iter().enumerate() {
        state.set(Position::at(1, 3, 2 + i), piece);
        state.set(Position::at(1, 4, 2 + i), u8::BLACK_PAWN);
    }

    // white attack boards sit above the white main board
    state.add_attack_board(AttackBoard::new(2, AttackBoard::ABOVE_LEFT_DOWN), Color::White);
    state.add_attack_board(AttackBoard::new(2, AttackBoard::ABOVE_RIGHT_DOWN), Color::White);

    let back_rank = [u8::WHITE_ROOK, u8::WHITE_QUEEN, u8::WHITE_KING, u8::WHITE_ROOK];
    for (col, piece) in corner_cols.iter().zip(back_rank) {
        state.set(Position::at(4, 11, *col), piece);
        state.set(Position::at(4, 10, *col), u8::WHITE_PAWN);
    }

    let white_officers = [u8::WHITE_KNIGHT, u8::WHITE_BISHOP, u8::WHITE_BISHOP, u8::WHITE_KNIGHT];
    for (i, piece) in white_officers.into_iter().enumerate() {
        state.set(Position::at(5, 10, 2 + i), piece);
        state.set(Position::at(5, 9, 2 + i), u8::WHITE_PAWN);
    }

    state.castling_rights = CR_ALL;
    state
});

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// The canonical starting position.
    pub fn new() -> Self {
        INITIAL_BOARD_STATE.clone()
    }

    /// A board with no pieces, no attack boards and no castling rights.
    pub fn empty() -> Self {
        let level = blank_level();

        Self {
            board: [level; BLEVELS],
            attack_board_bits: 0,
            attack_board_side: 0,
            material_imbalance: 0,
            castling_rights: 0,
            ply: 0,
        }
    }

    #[inline]
    pub fn get(&self, pos: Position) -> SquareState {
        self.board[pos.level][pos.square]
    }

    /// Raw write; callers building positions by hand should finish with
    /// `recompute_material_imbalance`.
    #[inline]
    pub fn set(&mut self, pos: Position, state: SquareState) {
        self.board[pos.level][pos.square] = state;
    }

    /// Every level holds the same padding, so level 0 answers bounds checks.
    #[inline]
    pub fn is_valid_square(&self, square: SquareIndex) -> bool {
        self.board[0][square] != INVALID
    }

    pub fn side_to_move(&self) -> Color {
        if self.ply % 2 == 0 { Color::White } else { Color::Black }
    }

    pub fn add_attack_board(&mut self, attack_board: AttackBoard, owner: Color) {
        self.attack_board_bits |= attack_board.bit();

        match owner {
            Color::White => self.attack_board_side &= !attack_board.bit(),
            Color::Black => self.attack_board_side |= attack_board.bit(),
        }
    }

    pub fn is_attack_board_active(&self, attack_board: AttackBoard) -> bool {
        self.attack_board_bits & attack_board.bit() != 0
    }

    pub fn attack_board_owner(&self, attack_board: AttackBoard) -> Color {
        if self.attack_board_side & attack_board.bit() != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn active_attack_boards(&self) -> impl Iterator<Item = AttackBoard> + '_ {
        AttackBoard::all().filter(|attack_board| self.is_attack_board_active(*attack_board))
    }

    /// Every playable cell, main board by main board, each followed by its present attack boards.
    pub fn playable_squares(&self) -> impl Iterator<Item = Position> + '_ {
        (0..NUM_MAIN_BOARDS).flat_map(move |main_board| {
            let main = board_squares(main_board_position(main_board), MAIN_BOARD_SIZE);

            let attack = (0..NUM_ATTACK_BOARD_SLOTS)
                .map(move |slot| AttackBoard::new(main_board, slot))
                .filter(move |attack_board| self.is_attack_board_active(*attack_board))
                .flat_map(|attack_board| board_squares(attack_board.position(), ATTACK_BOARD_SIZE));

            main.chain(attack)
        })
    }

    pub fn attack_board_is_empty(&self, attack_board: AttackBoard) -> bool {
        board_squares(attack_board.position(), ATTACK_BOARD_SIZE).all(|pos| self.get(pos).is_empty())
    }

    /// An attack board may relocate while it carries at most one piece, and
    /// only a piece of its owner.
    pub fn attack_board_can_move(&self, attack_board: AttackBoard) -> bool {
        let owner = self.attack_board_owner(attack_board);
        let mut piece_count = 0;

        for pos in board_squares(attack_board.position(), ATTACK_BOARD_SIZE) {
            let state = self.get(pos);

            if state.is_empty() {
                continue;
            }

            if state.color() != owner {
                return false;
            }

            piece_count += 1;
            if piece_count > 1 {
                return false;
            }
        }

        true
    }

    /// The present attack board that holds `pos`, if any.
    pub fn attack_board_for_position(&self, pos: &Position) -> Option<AttackBoard> {
        self.active_attack_boards().find(|attack_board| attack_board.contains(pos))
    }

    /// Material balance computed from scratch, in the same units as `material_imbalance`.
    pub fn compute_material_imbalance(&self) -> i32 {
        self.playable_squares()
            .filter_map(|pos| {
                let state = self.get(pos);
                state.piece().map(|piece| state.color().sign() * piece.value())
            })
            .sum()
    }

    pub fn recompute_material_imbalance(&mut self) {
        self.material_imbalance = self.compute_material_imbalance();
    }

    /// Applies a move and returns what is needed to take it back.
    pub fn do_move(&mut self, board_move: &Move) -> UndoInfo {
        let mut undo = UndoInfo::new(
            self.attack_board_bits,
            self.attack_board_side,
            self.castling_rights,
            self.material_imbalance,
        );

        match *board_move {
            Move::Piece { from, to } => self.do_piece_move(from, to, &mut undo),
            Move::AttackBoard { from, to } => self.do_attack_board_move(from, to, &mut undo),
            _ => {
                let castling = castling_squares(board_move).expect("castling move has fixed squares");
                self.do_castling(&castling, &mut undo);
            }
        }

        self.ply += 1;

        undo
    }

    pub fn undo_move(&mut self, undo: &UndoInfo) {
        for i in (0..undo.num_squares_touched).rev() {
            let pos = undo.squares_touched[i];
            self.board[pos.level][pos.square] = undo.prev_states[i];
        }

        self.attack_board_bits = undo.prev_attack_board_bits;
        self.attack_board_side = undo.prev_attack_board_side;
        self.material_imbalance = undo.prev_material_imbalance;
        self.castling_rights = undo.prev_castling_rights;
        self.ply -= 1;
    }

    fn do_piece_move(&mut self, from: Position, to: Position, undo: &mut UndoInfo) {
        let moving = self.get(from);
        let captured = self.get(to);

        undo.touch(from, moving);
        undo.touch(to, captured);

        if let Some(piece) = captured.piece() {
            self.material_imbalance -= captured.color().sign() * piece.value();

            // a rook taken on its home square can no longer castle
            self.revoke_castling_from_rook_home(to);
        }

        let color = moving.color();
        let mut placed = moving;

        match moving.piece() {
            Some(Piece::Pawn) => {
                placed |= MOVED_FLAG;

                if self.pawn_promotes(color, to.square) {
                    self.material_imbalance += color.sign() * (Piece::Queen.value() - Piece::Pawn.value());
                    placed = Piece::Queen.with_color(color);
                }
            }
            Some(Piece::King) => self.castling_rights &= !castling_rights_of(color),
            Some(Piece::Rook) => self.revoke_castling_from_rook_home(from),
            _ => {}
        }

        self.set(to, placed);
        self.set(from, EMPTY);
    }

    fn revoke_castling_from_rook_home(&mut self, pos: Position) {
        let right = match pos {
            WHITE_KINGSIDE_ROOK_HOME => CR_WHITE_KINGSIDE,
            WHITE_QUEENSIDE_ROOK_HOME => CR_WHITE_QUEENSIDE,
            BLACK_KINGSIDE_ROOK_HOME => CR_BLACK_KINGSIDE,
            BLACK_QUEENSIDE_ROOK_HOME => CR_BLACK_QUEENSIDE,
            _ => return,
        };

        self.castling_rights &= !right;
    }

    /// A pawn promotes once it runs out of board in its file. On the two
    /// off-center files of the last main-board row that only happens when
    /// no attack board extends the file.
    pub fn pawn_promotes(&self, color: Color, square: SquareIndex) -> bool {
        let (row, col) = (square.row(), square.col());

        let (last_row, last_main_row, main_board, above_left, below_left, above_right, below_right) = match color {
            Color::Black => (
                11,
                10,
                2,
                AttackBoard::ABOVE_LEFT_DOWN,
                AttackBoard::BELOW_LEFT_DOWN,
                AttackBoard::ABOVE_RIGHT_DOWN,
                AttackBoard::BELOW_RIGHT_DOWN,
            ),
            Color::White => (
                2,
                3,
                0,
                AttackBoard::ABOVE_LEFT_UP,
                AttackBoard::BELOW_LEFT_UP,
                AttackBoard::ABOVE_RIGHT_UP,
                AttackBoard::BELOW_RIGHT_UP,
            ),
        };

        let is_free = |slot_a: usize, slot_b: usize| {
            !self.is_attack_board_active(AttackBoard::new(main_board, slot_a))
                && !self.is_attack_board_active(AttackBoard::new(main_board, slot_b))
        };

        if row == last_row {
            return true;
        }

        if row != last_main_row {
            return false;
        }

        match col {
            3 | 4 => true,
            2 => is_free(above_left, below_left),
            5 => is_free(above_right, below_right),
            _ => false,
        }
    }

    fn do_attack_board_move(&mut self, from: AttackBoard, to: AttackBoard, undo: &mut UndoInfo) {
        let from_squares = board_squares(from.position(), ATTACK_BOARD_SIZE);
        let to_squares = board_squares(to.position(), ATTACK_BOARD_SIZE);

        // the 2x2 block moves as a whole, cell by cell
        for (from_pos, to_pos) in from_squares.zip(to_squares) {
            let carried = self.get(from_pos);

            undo.touch(from_pos, carried);
            undo.touch(to_pos, self.get(to_pos));

            let placed = match carried.piece() {
                Some(Piece::Pawn) => carried | MOVED_FLAG,
                _ => carried,
            };

            self.set(to_pos, placed);
            self.set(from_pos, EMPTY);
        }

        self.attack_board_bits ^= from.bit();
        self.attack_board_bits ^= to.bit();

        if self.attack_board_side & from.bit() != 0 {
            self.attack_board_side &= !from.bit();
            self.attack_board_side |= to.bit();
        } else {
            self.attack_board_side &= !to.bit();
        }

        // the home attack boards carry the castling pieces
        let vacated = (from.main_board, from.slot);

        if self.castling_rights & CR_BLACK_QUEENSIDE != 0 && vacated == (0, AttackBoard::ABOVE_LEFT_UP) {
            self.castling_rights &= !CR_BLACK_QUEENSIDE;
        }

        if self.castling_rights & CR_BLACK_KINGSIDE != 0 && vacated == (0, AttackBoard::ABOVE_RIGHT_UP) {
            self.castling_rights &= !castling_rights_of(Color::Black);
        }

        if self.castling_rights & CR_WHITE_QUEENSIDE != 0 && vacated == (2, AttackBoard::ABOVE_LEFT_DOWN) {
            self.castling_rights &= !CR_WHITE_QUEENSIDE;
        }

        if self.castling_rights & CR_WHITE_KINGSIDE != 0 && vacated == (2, AttackBoard::ABOVE_RIGHT_DOWN) {
            self.castling_rights &= !castling_rights_of(Color::White);
        }
    }

    fn do_castling(&mut self, castling: &CastlingSquares, undo: &mut UndoInfo) {
        let squares = [castling.king_from, castling.king_to, castling.rook_from, castling.rook_to];

        for (i, pos) in squares.iter().enumerate() {
            if !squares[..i].contains(pos) {
                undo.touch(*pos, self.get(*pos));
            }
        }

        let king = self.get(castling.king_from);
        let rook = self.get(castling.rook_from);

        self.set(castling.king_from, EMPTY);
        self.set(castling.rook_from, EMPTY);
        self.set(castling.king_to, king);
        self.set(castling.rook_to, rook);

        self.castling_rights &= !castling_rights_of(castling.color);
    }

    /// Terminal check over both colours: a side without legal moves has lost,
    /// white being examined first.
    pub fn game_status(&self) -> GameStatus {
        let mut scratch = self.clone();

        if scratch.get_legal_moves(Color::White).is_empty() {
            return GameStatus::MateForBlack;
        }

        if scratch.get_legal_moves(Color::Black).is_empty() {
            return GameStatus::MateForWhite;
        }

        GameStatus::InPlay
    }

    /// Whether the side to move is out of moves without being in check.
    /// `game_status` scores this as a loss; renderers may want to tell it apart.
    pub fn is_stalemate(&self) -> bool {
        let side = self.side_to_move();

        !self.is_in_check(side) && self.clone().get_legal_moves(side).is_empty()
    }
}
