use super::board::{BoardState, castling_squares};
use super::moves::Move;
use super::pieces::{Color, EMPTY, INVALID, MOVED_FLAG, Piece, SquareStateExt};
use super::square::{
    ATTACK_BOARD_SIZE, AttackBoard, BAREA, BCOLS, BISHOP_DIRECTIONS, BLEVELS, KING_DELTAS, KNIGHT_DELTAS,
    MAIN_BOARD_SIZE, NUM_MAIN_BOARDS, NUM_ATTACK_BOARD_SLOTS, Position, ROOK_DIRECTIONS, SquareIndex,
    SquareIndexExt, board_squares, is_active, main_board_position,
};

const ROW: isize = BCOLS as isize;

/// Typical upper bound of a move list; used as a capacity hint only.
pub const MAX_MOVES: usize = 128;

type PinTable = [[bool; BAREA]; BLEVELS];

/// What a ray finds when it reaches a square.
enum RayHit {
    Attacker,
    Blocker,
    Nothing,
}

/// Scratch state of a single generation call.
struct MoveGenContext<'a> {
    state: &'a mut BoardState,
    moves: &'a mut Vec<Move>,
    side: Color,
    king_square: SquareIndex,
    is_in_check: bool,
    is_pinned: bool,
    test_every_move: bool,
    from: Position,
    pins: PinTable,
}

impl<'a> MoveGenContext<'a> {
    fn new(state: &'a mut BoardState, moves: &'a mut Vec<Move>, side: Color) -> Self {
        let king_square = state.find_king_square(side);
        let is_in_check = state.is_in_check_from(side, king_square);
        let pins = state.find_pins(side, king_square);

        Self {
            state,
            moves,
            side,
            king_square,
            is_in_check,
            is_pinned: false,
            test_every_move: false,
            from: Position::new(0, 0),
            pins,
        }
    }

    fn append_move(&mut self, level: usize, square: SquareIndex) {
        self.moves.push(Move::Piece {
            from: self.from,
            to: Position::new(level, square),
        });
    }

    /// Tries the move on the board, keeps it if the king ends up safe and takes it back.
    fn append_move_if_legal(&mut self, level: usize, square: SquareIndex) {
        let from = self.from;
        let prev_from = self.state.board[from.level][from.square];
        let prev_to = self.state.board[level][square];

        self.state.board[from.level][from.square] = EMPTY;
        self.state.board[level][square] = prev_from;

        let king_square = match prev_from.piece() {
            Some(Piece::King) => square,
            _ => self.king_square,
        };

        if !self.state.is_in_check_from(self.side, king_square) {
            self.append_move(level, square);
        }

        self.state.board[from.level][from.square] = prev_from;
        self.state.board[level][square] = prev_to;
    }

    fn append(&mut self, level: usize, square: SquareIndex) {
        if self.is_in_check || self.is_pinned {
            self.append_move_if_legal(level, square);
        } else {
            self.append_move(level, square);
        }
    }

    /// Adds every active level of `square` the piece may land on; returns
    /// whether some level holds a piece.
    fn append_squares_at(&mut self, square: SquareIndex) -> bool {
        let mut blocked = false;

        for level in 0..BLEVELS {
            if !is_active(self.state.attack_board_bits, level, square) {
                continue;
            }

            let s = self.state.board[level][square];
            debug_assert!(s != INVALID);

            if s == EMPTY || s.color() != self.side {
                self.append(level, square);
            }

            if s != EMPTY {
                blocked = true;
            }
        }

        blocked
    }

    fn append_squares_no_capture(&mut self, square: SquareIndex) -> bool {
        let mut blocked = false;

        for level in 0..BLEVELS {
            if !is_active(self.state.attack_board_bits, level, square) {
                continue;
            }

            if self.state.board[level][square] == EMPTY {
                self.append_move_if_legal(level, square);
            } else {
                blocked = true;
            }
        }

        blocked
    }

    fn append_squares_capture_only(&mut self, square: SquareIndex) {
        for level in 0..BLEVELS {
            if !is_active(self.state.attack_board_bits, level, square) {
                continue;
            }

            let s = self.state.board[level][square];

            if s != EMPTY && s.color() != self.side {
                self.append_move_if_legal(level, square);
            }
        }
    }

    fn follow_dir(&mut self, delta: isize) {
        let mut cur = self.from.square.offset(delta);

        while self.state.is_valid_square(cur) {
            if self.append_squares_at(cur) {
                break;
            }

            cur = cur.offset(delta);
        }
    }

    fn walk_offsets(&mut self, deltas: &[isize]) {
        for delta in deltas {
            let square = self.from.square.offset(*delta);

            if self.state.is_valid_square(square) {
                self.append_squares_at(square);
            }
        }
    }

    fn walk_king(&mut self) {
        self.walk_offsets(&KING_DELTAS);

        if self.is_in_check || self.state.ply <= 1 {
            return;
        }

        let candidates = match self.side {
            Color::White => [Move::WhiteKingsideCastling, Move::WhiteQueensideCastling],
            Color::Black => [Move::BlackKingsideCastling, Move::BlackQueensideCastling],
        };

        for castling_move in candidates {
            let Some(castling) = castling_squares(&castling_move) else {
                continue;
            };

            if self.state.castling_rights & castling.right == 0 || self.from != castling.king_from {
                continue;
            }

            // queenside: the square between king and rook must be clear
            if castling.king_to != castling.rook_from && self.state.get(castling.king_to) != EMPTY {
                continue;
            }

            // only the landing square of the king is tested
            if self.state.is_in_check_from(self.side, castling.king_to.square) {
                continue;
            }

            self.moves.push(castling_move);
        }
    }

    fn walk_pawn(&mut self, moved: bool) {
        let forward: isize = match self.side {
            Color::White => -ROW,
            Color::Black => ROW,
        };
        let from = self.from.square;

        let one_step = from.offset(forward);
        let blocked = if self.state.is_valid_square(one_step) {
            self.append_squares_no_capture(one_step)
        } else {
            true
        };

        let two_steps = from.offset(2 * forward);
        if !moved && !blocked && self.state.is_valid_square(two_steps) {
            self.append_squares_no_capture(two_steps);
        }

        for side_step in [1, -1] {
            let capture = from.offset(forward + side_step);

            if self.state.is_valid_square(capture) {
                self.append_squares_capture_only(capture);
            }
        }
    }

    fn generate_for_piece(&mut self, from: Position) {
        let s = self.state.get(from);

        let Some(piece) = s.piece() else {
            panic!("no piece to generate moves for at {:?}", from);
        };

        self.from = from;
        self.is_pinned = self.test_every_move || piece == Piece::King || self.pins[from.level][from.square];

        match piece {
            Piece::Rook => ROOK_DIRECTIONS.iter().for_each(|delta| self.follow_dir(*delta)),
            Piece::Bishop => BISHOP_DIRECTIONS.iter().for_each(|delta| self.follow_dir(*delta)),
            Piece::Queen => ROOK_DIRECTIONS
                .iter()
                .chain(BISHOP_DIRECTIONS.iter())
                .for_each(|delta| self.follow_dir(*delta)),
            Piece::Knight => self.walk_offsets(&KNIGHT_DELTAS),
            Piece::King => self.walk_king(),
            Piece::Pawn => self.walk_pawn(s & MOVED_FLAG != 0),
        }
    }

    fn generate_for_board(&mut self, first: Position, size: usize) {
        for pos in board_squares(first, size) {
            if self.state.get(pos).belongs_to(self.side) {
                self.generate_for_piece(pos);
            }
        }
    }
}

impl BoardState {
    /// All legal moves of `side`: piece moves first, then attack board relocations.
    pub fn get_legal_moves(&mut self, side: Color) -> Vec<Move> {
        self.generate_legal_moves(side, false)
    }

    /// With `test_every_move` set, every piece move goes through the
    /// try-and-take-back check instead of the pin table.
    pub(crate) fn generate_legal_moves(&mut self, side: Color, test_every_move: bool) -> Vec<Move> {
        let mut moves = Vec::with_capacity(MAX_MOVES);

        {
            let mut ctx = MoveGenContext::new(self, &mut moves, side);
            ctx.test_every_move = test_every_move;

            for main_board in 0..NUM_MAIN_BOARDS {
                ctx.generate_for_board(main_board_position(main_board), MAIN_BOARD_SIZE);

                for slot in 0..NUM_ATTACK_BOARD_SLOTS {
                    let attack_board = AttackBoard::new(main_board, slot);

                    if ctx.state.is_attack_board_active(attack_board) {
                        ctx.generate_for_board(attack_board.position(), ATTACK_BOARD_SIZE);
                    }
                }
            }
        }

        let own_boards = self
            .active_attack_boards()
            .filter(|attack_board| self.attack_board_owner(*attack_board) == side)
            .collect::<Vec<_>>();

        for from in own_boards {
            self.append_attack_board_moves(&mut moves, from, side);
        }

        log::trace!("{} legal moves for {}", moves.len(), side.name());

        moves
    }

    /// Legal moves starting at `pos`: the moves of the piece standing there,
    /// or the relocations of the attack board when `pos` is an empty square
    /// of one owned by `side`.
    pub fn get_legal_moves_for_position(&mut self, side: Color, pos: Position) -> Vec<Move> {
        let mut moves = Vec::new();
        let s = self.get(pos);

        if s != EMPTY {
            if s.belongs_to(side) {
                let mut ctx = MoveGenContext::new(self, &mut moves, side);
                ctx.generate_for_piece(pos);
            }
        } else if let Some(from) = self.attack_board_for_position(&pos) {
            if self.attack_board_owner(from) == side {
                self.append_attack_board_moves(&mut moves, from, side);
            }
        }

        moves
    }

    fn append_attack_board_moves(&mut self, moves: &mut Vec<Move>, from: AttackBoard, side: Color) {
        for to in self.next_positions_for_attack_board(from) {
            let board_move = Move::AttackBoard { from, to };

            if self.is_legal_move(&board_move, side) {
                moves.push(board_move);
            }
        }
    }

    /// Slots an attack board may be moved to, before the check test.
    pub fn next_positions_for_attack_board(&self, from: AttackBoard) -> Vec<AttackBoard> {
        let mut positions = Vec::new();

        if !self.attack_board_can_move(from) {
            return positions;
        }

        let mut push_if_free = |to: AttackBoard| {
            if !self.is_attack_board_active(to) {
                positions.push(to);
            }
        };

        push_if_free(from.flipped(AttackBoard::UP_FLAG));
        push_if_free(from.flipped(AttackBoard::RIGHT_FLAG));

        // only an empty board changes level
        if self.attack_board_is_empty(from) {
            let other_level = from.flipped(AttackBoard::ABOVE_FLAG);

            push_if_free(other_level);

            if from.is_above() && from.main_board > 0 {
                push_if_free(AttackBoard::new(from.main_board - 1, other_level.slot));
                push_if_free(AttackBoard::new(from.main_board - 1, other_level.slot ^ AttackBoard::UP_FLAG));
            }

            if !from.is_above() && from.main_board < NUM_MAIN_BOARDS - 1 {
                push_if_free(AttackBoard::new(from.main_board + 1, other_level.slot));
                push_if_free(AttackBoard::new(from.main_board + 1, other_level.slot ^ AttackBoard::UP_FLAG));
            }
        }

        positions
    }

    /// Whether `side` is safe after the move.
    pub fn is_legal_move(&mut self, board_move: &Move, side: Color) -> bool {
        let undo = self.do_move(board_move);
        let legal = !self.is_in_check(side);
        self.undo_move(&undo);

        legal
    }

    pub fn is_in_check(&self, side: Color) -> bool {
        self.is_in_check_from(side, self.find_king_square(side))
    }

    pub fn find_king_square(&self, side: Color) -> SquareIndex {
        let king = Piece::King.with_color(side);

        for square in 0..BAREA {
            for level in 0..BLEVELS {
                let s = self.board[level][square];

                if s == INVALID {
                    break;
                }

                if s & !MOVED_FLAG == king {
                    return square;
                }
            }
        }

        panic!("no {} king on the board", side.name());
    }

    fn find_piece_at(&self, square: SquareIndex, piece: Piece, by: Color) -> RayHit {
        let mut hit = RayHit::Nothing;

        for level in 0..BLEVELS {
            let s = self.board[level][square] & !MOVED_FLAG;

            if s == piece.with_color(by) || s == Piece::Queen.with_color(by) {
                return RayHit::Attacker;
            }

            if s != EMPTY {
                hit = RayHit::Blocker;
            }
        }

        hit
    }

    fn find_piece_on_dir(&self, from: SquareIndex, delta: isize, piece: Piece, by: Color) -> bool {
        let mut cur = from.offset(delta);

        while self.is_valid_square(cur) {
            match self.find_piece_at(cur, piece, by) {
                RayHit::Attacker => return true,
                RayHit::Blocker => return false,
                RayHit::Nothing => cur = cur.offset(delta),
            }
        }

        false
    }

    fn find_piece_near(&self, from: SquareIndex, deltas: &[isize], piece: Piece, by: Color) -> bool {
        let target = piece.with_color(by);

        deltas.iter().any(|delta| {
            let next = from.offset(*delta);

            (0..BLEVELS)
                .map(|level| self.board[level][next])
                .take_while(|s| *s != INVALID)
                .any(|s| s & !MOVED_FLAG == target)
        })
    }

    /// Whether a king of `side` standing on `king_square` would be attacked.
    /// A ray stops at the first square where any level holds a piece.
    pub fn is_in_check_from(&self, side: Color, king_square: SquareIndex) -> bool {
        let enemy = !side;

        for i in 0..4 {
            if self.find_piece_on_dir(king_square, ROOK_DIRECTIONS[i], Piece::Rook, enemy)
                || self.find_piece_on_dir(king_square, BISHOP_DIRECTIONS[i], Piece::Bishop, enemy)
            {
                return true;
            }
        }

        if self.find_piece_near(king_square, &KNIGHT_DELTAS, Piece::Knight, enemy) {
            return true;
        }

        // squares from which an enemy pawn captures towards the king
        let pawn_deltas = match side {
            Color::Black => [ROW + 1, ROW - 1],
            Color::White => [-ROW + 1, -ROW - 1],
        };

        if self.find_piece_near(king_square, &pawn_deltas, Piece::Pawn, enemy) {
            return true;
        }

        self.find_piece_near(king_square, &KING_DELTAS, Piece::King, enemy)
    }

    /// Marks pieces of `side` that alone shield the king from an enemy slider.
    fn find_pins(&self, side: Color, king_square: SquareIndex) -> PinTable {
        let mut pins = [[false; BAREA]; BLEVELS];

        for i in 0..4 {
            self.find_pin_on_dir(&mut pins, side, king_square, ROOK_DIRECTIONS[i], Piece::Rook);
            self.find_pin_on_dir(&mut pins, side, king_square, BISHOP_DIRECTIONS[i], Piece::Bishop);
        }

        pins
    }

    fn find_pin_on_dir(
        &self,
        pins: &mut PinTable,
        side: Color,
        king_square: SquareIndex,
        delta: isize,
        slider: Piece,
    ) {
        let mut cur = king_square.offset(delta);
        let mut candidate: Option<Position> = None;

        while self.is_valid_square(cur) {
            for level in 0..BLEVELS {
                let s = self.board[level][cur];

                if s == EMPTY {
                    continue;
                }

                if s.color() == side {
                    if candidate.is_some() {
                        return;
                    }

                    candidate = Some(Position::new(level, cur));
                } else {
                    if let Some(pinned) = candidate {
                        if pinned.square != cur && matches!(s.piece(), Some(p) if p == slider || p == Piece::Queen) {
                            pins[pinned.level][pinned.square] = true;
                        }
                    }

                    return;
                }
            }

            cur = cur.offset(delta);
        }
    }
}
