use super::board::BoardState;
use super::moves::Move;
use super::pieces::{EMPTY, Piece, SquareStateExt};
use super::square::{
    AttackBoard, BROWS, NUM_ATTACK_BOARD_SLOTS, Position, SquareIndex, SquareIndexExt, is_active,
};

const FILES: &str = "zabcde";

const BLACK_BOARD_LEVEL: usize = 1;
const NEUTRAL_BOARD_LEVEL: usize = 3;
const WHITE_BOARD_LEVEL: usize = 5;

/// `QL<n>` / `KL<n>`, with `n` counting up from the white end.
pub fn attack_board_as_string(attack_board: &AttackBoard) -> String {
    let side = if attack_board.is_right() { "KL" } else { "QL" };
    let number = 5 - 2 * attack_board.main_board + attack_board.is_up() as usize;

    format!("{}{}", side, number)
}

pub fn position_as_string(state: &BoardState, pos: &Position) -> String {
    let file = FILES.as_bytes()[pos.square.col() - 1] as char;
    let rank = BROWS - 3 - pos.square.row();

    let board = match pos.level {
        BLACK_BOARD_LEVEL => "B".to_string(),
        NEUTRAL_BOARD_LEVEL => "N".to_string(),
        WHITE_BOARD_LEVEL => "W".to_string(),
        _ => match state.attack_board_for_position(pos) {
            Some(attack_board) => attack_board_as_string(&attack_board),
            None => panic!("position {:?} is on no board", pos),
        },
    };

    format!("{}{}{}", file, rank, board)
}

/// Renders a move as it would be read before it is played on `state`.
pub fn move_as_string(state: &BoardState, board_move: &Move) -> String {
    match board_move {
        Move::Piece { from, to } => {
            let moving = state.get(*from);
            let mut notation = String::new();

            let Some(piece) = moving.piece() else {
                panic!("no piece to move at {:?}", from);
            };

            if piece != Piece::Pawn {
                notation.push(piece.to_char().to_ascii_uppercase());
            }

            if state.get(*to) != EMPTY {
                if piece == Piece::Pawn {
                    notation.push_str(&position_as_string(state, from));
                }

                notation.push('x');
            }

            notation.push_str(&position_as_string(state, to));
            notation
        }
        Move::AttackBoard { to, .. } => attack_board_as_string(to),
        Move::WhiteKingsideCastling | Move::BlackKingsideCastling => "o-o".to_string(),
        Move::WhiteQueensideCastling | Move::BlackQueensideCastling => "o-o-o".to_string(),
    }
}

fn parse_attack_board(state: &BoardState, code: &str) -> Option<Vec<AttackBoard>> {
    let is_right = match code.get(..2)? {
        "QL" => false,
        "KL" => true,
        _ => return None,
    };

    let number = code[2..].parse::<usize>().ok()?;
    if !(1..=6).contains(&number) {
        return None;
    }

    let main_board = (6 - number) / 2;
    let is_up = number % 2 == 0;

    // above and below share a code; the board on the map decides
    let candidates = (0..NUM_ATTACK_BOARD_SLOTS)
        .map(|slot| AttackBoard::new(main_board, slot))
        .filter(|attack_board| attack_board.is_right() == is_right && attack_board.is_up() == is_up)
        .filter(|attack_board| state.is_attack_board_active(*attack_board))
        .collect::<Vec<_>>();

    Some(candidates)
}

/// Reads `<file><rank><board>`, e.g. `a3W` or `z0QL1`.
pub fn parse_position(state: &BoardState, notation: &str) -> Option<Position> {
    let mut chars = notation.chars();

    let col = FILES.find(chars.next()?)? + 1;
    let rank = chars.next()?.to_digit(10)? as usize;
    let row = BROWS - 3 - rank;
    let square = SquareIndex::from_row_col(row, col);

    let pos = match chars.as_str() {
        "B" => Position::new(BLACK_BOARD_LEVEL, square),
        "N" => Position::new(NEUTRAL_BOARD_LEVEL, square),
        "W" => Position::new(WHITE_BOARD_LEVEL, square),
        code => parse_attack_board(state, code)?
            .into_iter()
            .map(|attack_board| (attack_board, Position::new(attack_board.position().level, square)))
            .find(|(attack_board, pos)| attack_board.contains(pos))
            .map(|(_, pos)| pos)?,
    };

    // the named board has to cover the cell
    if is_active(state.attack_board_bits, pos.level, pos.square) {
        Some(pos)
    } else {
        None
    }
}

fn is_attack_board_code(code: &str) -> bool {
    (code.starts_with("QL") || code.starts_with("KL"))
        && code[2..].parse::<usize>().is_ok_and(|number| (1..=6).contains(&number))
}

fn is_position_shaped(notation: &str) -> bool {
    let mut chars = notation.chars();

    let file = chars.next().is_some_and(|c| FILES.contains(c));
    let rank = chars.next().is_some_and(|c| c.is_ascii_digit());
    let board = chars.as_str();

    file && rank && (matches!(board, "B" | "N" | "W") || is_attack_board_code(board))
}

/// Whether the text has the shape `move_as_string` produces, regardless of
/// the position.
pub fn is_well_formed_move(notation: &str) -> bool {
    if matches!(notation, "o-o" | "o-o-o") || is_attack_board_code(notation) {
        return true;
    }

    let is_officer = |c: char| c.is_ascii_uppercase() && Piece::from_char(c).is_some_and(|piece| piece != Piece::Pawn);
    let body = notation.strip_prefix(is_officer).unwrap_or(notation);

    match body.split_once('x') {
        Some((from, to)) => (from.is_empty() || is_position_shaped(from)) && is_position_shaped(to),
        None => is_position_shaped(body),
    }
}
