use std::sync::LazyLock;

// board array dimensions; the border rows and columns are filled with INVALID
pub const BLEVELS: usize = 7;
pub const BROWS: usize = 10 + 4;
pub const BCOLS: usize = 6 + 2;
pub const BAREA: usize = BROWS * BCOLS;

pub const NUM_MAIN_BOARDS: usize = 3;
pub const NUM_ATTACK_BOARD_SLOTS: usize = 8;
pub const NUM_ATTACK_BOARDS_PER_SIDE: usize = 2;

pub const MAIN_BOARD_SIZE: usize = 4;
pub const ATTACK_BOARD_SIZE: usize = 2;

const ROW: isize = BCOLS as isize;

pub const KNIGHT_DELTAS: [isize; 8] = [
    2 * ROW + 1,
    2 * ROW - 1,
    -2 * ROW + 1,
    -2 * ROW - 1,
    ROW + 2,
    ROW - 2,
    -ROW + 2,
    -ROW - 2,
];

pub const KING_DELTAS: [isize; 8] = [-ROW - 1, -ROW, -ROW + 1, 1, ROW + 1, ROW, ROW - 1, -1];

pub const ROOK_DIRECTIONS: [isize; 4] = [1, -1, ROW, -ROW];
pub const BISHOP_DIRECTIONS: [isize; 4] = [ROW - 1, ROW + 1, -ROW - 1, -ROW + 1];

/// A cell of the board array: the level it lives on and its flat index within that level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub level: usize,
    pub square: usize,
}

/// Index into a single level, shared by every level stacked at the same row and column.
pub type SquareIndex = usize;

pub trait SquareIndexExt {
    fn row(&self) -> usize;
    fn col(&self) -> usize;
    fn from_row_col(row: usize, col: usize) -> SquareIndex;
    fn offset(&self, delta: isize) -> SquareIndex;
}

impl SquareIndexExt for usize {
    fn row(&self) -> usize {
        self / BCOLS
    }

    fn col(&self) -> usize {
        self % BCOLS
    }

    fn from_row_col(row: usize, col: usize) -> SquareIndex {
        row * BCOLS + col
    }

    /// Steps by a flat delta. The two border rows on each side keep every
    /// knight and king delta from a playable square inside the array.
    fn offset(&self, delta: isize) -> SquareIndex {
        (*self as isize + delta) as SquareIndex
    }
}

impl Position {
    pub const fn new(level: usize, square: SquareIndex) -> Self {
        Self { level, square }
    }

    pub fn at(level: usize, row: usize, col: usize) -> Self {
        Self {
            level,
            square: SquareIndex::from_row_col(row, col),
        }
    }
}

/// Slot of an attack board: the main board it docks to and one of eight
/// corner x above/below codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttackBoard {
    pub main_board: usize,
    pub slot: usize,
}

impl AttackBoard {
    pub const UP_FLAG: usize = 1;
    pub const RIGHT_FLAG: usize = 2;
    pub const ABOVE_FLAG: usize = 4;

    pub const BELOW_LEFT_DOWN: usize = 0;
    pub const BELOW_LEFT_UP: usize = 1;
    pub const BELOW_RIGHT_DOWN: usize = 2;
    pub const BELOW_RIGHT_UP: usize = 3;
    pub const ABOVE_LEFT_DOWN: usize = 4;
    pub const ABOVE_LEFT_UP: usize = 5;
    pub const ABOVE_RIGHT_DOWN: usize = 6;
    pub const ABOVE_RIGHT_UP: usize = 7;

    pub const fn new(main_board: usize, slot: usize) -> Self {
        Self { main_board, slot }
    }

    /// Bit of this slot in the presence and ownership masks.
    pub const fn bit(&self) -> u32 {
        1u32 << (NUM_ATTACK_BOARD_SLOTS * self.main_board + self.slot)
    }

    pub const fn is_up(&self) -> bool {
        self.slot & Self::UP_FLAG != 0
    }

    pub const fn is_right(&self) -> bool {
        self.slot & Self::RIGHT_FLAG != 0
    }

    pub const fn is_above(&self) -> bool {
        self.slot & Self::ABOVE_FLAG != 0
    }

    pub const fn flipped(&self, flags: usize) -> Self {
        Self::new(self.main_board, self.slot ^ flags)
    }

    /// Top left cell of the attack board.
    pub fn position(&self) -> Position {
        let mut level = 2 * self.main_board;
        if !self.is_above() {
            level += 2;
        }

        let mut row = 2 + 2 * self.main_board;
        if !self.is_up() {
            row += 4;
        }

        let mut col = 1;
        if self.is_right() {
            col += 4;
        }

        Position::at(level, row, col)
    }

    /// The corner square of the main board the attack board is pinned to.
    pub fn closest_main_board_square(&self) -> Position {
        let r = if self.is_up() { 0 } else { MAIN_BOARD_SIZE - 1 };
        let c = if self.is_right() { MAIN_BOARD_SIZE - 1 } else { 0 };

        let first = main_board_position(self.main_board);

        Position::new(first.level, first.square + SquareIndex::from_row_col(r, c))
    }

    pub fn contains(&self, pos: &Position) -> bool {
        let first = self.position();

        first.level == pos.level
            && (first.square.row()..first.square.row() + ATTACK_BOARD_SIZE).contains(&pos.square.row())
            && (first.square.col()..first.square.col() + ATTACK_BOARD_SIZE).contains(&pos.square.col())
    }

    /// Every slot, main board by main board.
    pub fn all() -> impl Iterator<Item = AttackBoard> {
        (0..NUM_MAIN_BOARDS)
            .flat_map(|main_board| (0..NUM_ATTACK_BOARD_SLOTS).map(move |slot| AttackBoard::new(main_board, slot)))
    }
}

/// Top left cell of a main board.
pub fn main_board_position(main_board: usize) -> Position {
    Position::new(1 + 2 * main_board, 2 + (3 + 2 * main_board) * BCOLS)
}

/// Cells of a `size` x `size` board whose top left cell is `first`.
pub fn board_squares(first: Position, size: usize) -> impl Iterator<Item = Position> {
    (0..size).flat_map(move |r| {
        (0..size).map(move |c| Position::new(first.level, first.square + SquareIndex::from_row_col(r, c)))
    })
}

/// Mask of attack-board bits a cell needs present to be playable.
pub const ALWAYS_ACTIVE: u32 = 0;
pub const NEVER_ACTIVE: u32 = u32::MAX;

pub type ActiveMaskTable = [[u32; BAREA]; BLEVELS];

/// For every cell, the presence bits it depends on: zero for main boards,
/// the slot bit for attack board cells and `NEVER_ACTIVE` for the padding.
pub static ACTIVE_MASK_TABLE: LazyLock<Box<ActiveMaskTable>> = LazyLock::new(|| {
    let mut table = Box::new([[NEVER_ACTIVE; BAREA]; BLEVELS]);

    for main_board in 0..NUM_MAIN_BOARDS {
        for pos in board_squares(main_board_position(main_board), MAIN_BOARD_SIZE) {
            table[pos.level][pos.square] = ALWAYS_ACTIVE;
        }
    }

    for attack_board in AttackBoard::all() {
        for pos in board_squares(attack_board.position(), ATTACK_BOARD_SIZE) {
            table[pos.level][pos.square] = attack_board.bit();
        }
    }

    table
});

/// Whether the cell belongs to a main board or to an attack board present in `attack_board_bits`.
#[inline]
pub fn is_active(attack_board_bits: u32, level: usize, square: SquareIndex) -> bool {
    let mask = ACTIVE_MASK_TABLE[level][square];

    mask != NEVER_ACTIVE && attack_board_bits & mask == mask
}
