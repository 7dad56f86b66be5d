use crate::controller::GameController;
use crate::engine::evaluate::CHECKMATE_SCORE;
use crate::engine::search::limits::SearchLimits;
use crate::engine::search::searcher::Search;
use crate::game::board::{BoardState, GameStatus};
use crate::game::moves::Move;
use crate::game::pieces::{Color, EMPTY, MOVED_FLAG, Piece, SquareStateExt};
use crate::game::square::{ATTACK_BOARD_SIZE, AttackBoard, Position, board_squares};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

const PLAYOUT_SEEDS: [u64; 4] = [1, 42, 1337, 2024];

/// Plays seeded random games and hands every visited position to `check`.
fn for_each_playout_position(plies: usize, check: impl FnMut(&mut BoardState, &[Move])) {
    for_each_playout_position_from(&BoardState::new(), plies, check);
}

fn for_each_playout_position_from(start: &BoardState, plies: usize, mut check: impl FnMut(&mut BoardState, &[Move])) {
    for seed in PLAYOUT_SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = start.clone();

        for _ in 0..plies {
            let side = state.side_to_move();
            let moves = state.get_legal_moves(side);

            check(&mut state, &moves);

            let Some(board_move) = moves.choose(&mut rng) else {
                break;
            };

            state.do_move(board_move);
        }
    }
}

/// The opening layout with both queenside attack boards cleared, so they can
/// relocate from the first move on.
fn empty_queenside_boards() -> BoardState {
    let mut state = BoardState::new();

    for attack_board in [
        AttackBoard::new(0, AttackBoard::ABOVE_LEFT_UP),
        AttackBoard::new(2, AttackBoard::ABOVE_LEFT_DOWN),
    ] {
        for pos in board_squares(attack_board.position(), ATTACK_BOARD_SIZE) {
            state.set(pos, EMPTY);
        }
    }

    state.recompute_material_imbalance();
    state
}

#[test]
fn test_do_undo_round_trip() {
    for_each_playout_position(60, |state, moves| {
        for board_move in moves {
            let before = state.clone();

            let undo = state.do_move(board_move);
            state.undo_move(&undo);

            assert_eq!(*state, before, "{:?} did not undo cleanly", board_move);
        }
    });
}

#[test]
fn test_attack_board_relocations_undo_cleanly() {
    let mut relocations = 0;

    for_each_playout_position_from(&empty_queenside_boards(), 60, |state, moves| {
        for board_move in moves {
            if matches!(board_move, Move::AttackBoard { .. }) {
                relocations += 1;
            }

            let before = state.clone();

            let undo = state.do_move(board_move);
            assert_eq!(state.compute_material_imbalance(), state.material_imbalance);
            state.undo_move(&undo);

            assert_eq!(*state, before, "{:?} did not undo cleanly", board_move);
        }
    });

    assert!(relocations > 0);
}

#[test]
fn test_pin_table_agrees_with_trying_every_move() {
    let mut compare = |state: &mut BoardState, moves: &[Move]| {
        let side = state.side_to_move();
        assert_eq!(state.generate_legal_moves(side, true), moves);
    };

    for_each_playout_position(60, &mut compare);
    for_each_playout_position_from(&empty_queenside_boards(), 60, &mut compare);

    // sliders lined up on the king from every direction, on several levels
    let mut state = BoardState::empty();
    state.set(Position::at(3, 6, 3), u8::WHITE_KING);
    state.set(Position::at(3, 6, 4), u8::WHITE_BISHOP);
    state.set(Position::at(1, 6, 5), u8::BLACK_ROOK);
    state.set(Position::at(3, 7, 4), u8::WHITE_ROOK);
    state.set(Position::at(5, 8, 5), u8::BLACK_QUEEN);
    state.set(Position::at(1, 4, 3), u8::WHITE_KNIGHT);
    state.set(Position::at(1, 3, 3), u8::BLACK_ROOK);
    state.set(Position::at(3, 5, 2), u8::WHITE_PAWN | MOVED_FLAG);
    state.set(Position::at(5, 10, 2), u8::BLACK_KING);
    state.recompute_material_imbalance();

    for side in [Color::White, Color::Black] {
        let fast = state.get_legal_moves(side);
        assert_eq!(state.generate_legal_moves(side, true), fast);
    }
}

#[test]
fn test_legal_moves_leave_king_safe() {
    for_each_playout_position(60, |state, moves| {
        let side = state.side_to_move();

        for board_move in moves {
            let undo = state.do_move(board_move);

            if !board_move.is_castling() {
                assert!(!state.is_in_check(side), "{:?} leaves the {} king in check", board_move, side.name());
            }

            state.undo_move(&undo);
        }
    });
}

#[test]
fn test_material_imbalance_consistency() {
    for_each_playout_position(200, |state, _| {
        assert_eq!(state.material_imbalance, state.compute_material_imbalance());
    });
}

#[test]
fn test_generated_moves_match_per_square_queries() {
    for_each_playout_position(30, |state, moves| {
        let side = state.side_to_move();
        let positions = state.playable_squares().collect::<Vec<_>>();

        let mut per_square = positions
            .into_iter()
            .flat_map(|pos| state.get_legal_moves_for_position(side, pos))
            .filter(|board_move| !board_move.is_castling())
            .collect::<Vec<_>>();

        // every empty square of a board repeats its relocations
        per_square.sort_by_key(|board_move| format!("{:?}", board_move));
        per_square.dedup();

        let mut all = moves.iter().copied().filter(|m| !m.is_castling()).collect::<Vec<_>>();
        all.sort_by_key(|board_move| format!("{:?}", board_move));

        assert_eq!(per_square, all);
    });
}

#[test]
fn test_initial_move_count_is_deterministic() {
    let mut state = BoardState::new();

    let first = state.get_legal_moves(Color::White);
    let second = state.get_legal_moves(Color::White);

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.iter().all(|m| !m.is_castling()));

    // pawn double steps are there from the start
    assert!(first.contains(&Move::Piece {
        from: Position::at(5, 9, 2),
        to: Position::at(5, 7, 2),
    }));
}

#[test]
fn test_initial_position_is_symmetric() {
    let mut state = BoardState::new();

    let white = state.get_legal_moves(Color::White);
    let black = state.get_legal_moves(Color::Black);

    assert_eq!(white.len(), black.len());
}

#[test]
fn test_simple_capture() {
    let mut state = BoardState::empty();
    state.set(Position::at(5, 10, 5), u8::WHITE_KING);
    state.set(Position::at(1, 3, 4), u8::BLACK_KING);

    let rook = Position::at(3, 6, 2);
    let pawn = Position::at(3, 6, 5);
    state.set(rook, u8::WHITE_ROOK);
    state.set(pawn, u8::BLACK_PAWN);
    state.recompute_material_imbalance();

    let capture = Move::Piece { from: rook, to: pawn };
    assert!(state.get_legal_moves_for_position(Color::White, rook).contains(&capture));

    let before = state.material_imbalance;
    state.do_move(&capture);

    assert_eq!(state.material_imbalance - before, Piece::Pawn.value());
}

#[test]
fn test_check_evasion() {
    let mut state = BoardState::empty();
    let king = Position::at(5, 10, 5);

    state.set(king, u8::WHITE_KING);
    state.set(Position::at(5, 10, 2), u8::BLACK_ROOK);
    state.set(Position::at(3, 8, 3), u8::BLACK_KNIGHT);
    state.set(Position::at(1, 3, 5), u8::BLACK_KING);
    state.recompute_material_imbalance();

    assert!(state.is_in_check(Color::White));

    let moves = state.get_legal_moves(Color::White);
    assert_eq!(
        moves,
        vec![Move::Piece {
            from: king,
            to: Position::at(5, 9, 4),
        }]
    );
}

#[test]
fn test_promotion_boundary() {
    fn promote(state: &mut BoardState, from: Position, to: Position) -> u8 {
        let pawn = state.get(from);
        state.recompute_material_imbalance();
        let before = state.material_imbalance;

        let undo = state.do_move(&Move::Piece { from, to });
        let placed = state.get(to);

        let sign = pawn.color().sign();
        let gain = state.material_imbalance - before;

        if placed.piece() == Some(Piece::Queen) {
            assert_eq!(gain, sign * (Piece::Queen.value() - Piece::Pawn.value()));
        } else {
            assert_eq!(gain, 0);
        }

        state.undo_move(&undo);
        placed
    }

    let white_queen = u8::WHITE_QUEEN;
    let white_pawn = u8::WHITE_PAWN | MOVED_FLAG;
    let black_queen = u8::BLACK_QUEEN;
    let black_pawn = u8::BLACK_PAWN | MOVED_FLAG;

    let mut state = BoardState::empty();

    // white: the center files of the last black-board row always promote
    state.set(Position::at(1, 4, 3), u8::WHITE_PAWN);
    assert_eq!(promote(&mut state, Position::at(1, 4, 3), Position::at(1, 3, 3)), white_queen);
    state.set(Position::at(1, 4, 3), EMPTY);

    // the corner files only while no attack board extends them
    let from = Position::at(1, 4, 2);
    let to = Position::at(1, 3, 2);
    state.set(from, u8::WHITE_PAWN);
    assert_eq!(promote(&mut state, from, to), white_queen);

    state.add_attack_board(AttackBoard::new(0, AttackBoard::BELOW_LEFT_UP), Color::Black);
    assert_eq!(promote(&mut state, from, to), white_pawn);

    let mut state = BoardState::empty();
    state.set(from, u8::WHITE_PAWN);
    state.add_attack_board(AttackBoard::new(0, AttackBoard::ABOVE_LEFT_UP), Color::Black);
    assert_eq!(promote(&mut state, from, to), white_pawn);

    // the right corner does not care about the left attack boards
    let from = Position::at(1, 4, 5);
    state.set(from, u8::WHITE_PAWN);
    assert_eq!(promote(&mut state, from, Position::at(1, 3, 5)), white_queen);

    // the last row of an attack board always promotes
    let from = Position::at(0, 3, 1);
    state.set(from, u8::WHITE_PAWN);
    assert_eq!(promote(&mut state, from, Position::at(0, 2, 1)), white_queen);

    // black mirrors it on the white board
    let mut state = BoardState::empty();
    let from = Position::at(5, 9, 5);
    let to = Position::at(5, 10, 5);
    state.set(from, u8::BLACK_PAWN);
    assert_eq!(promote(&mut state, from, to), black_queen);

    state.add_attack_board(AttackBoard::new(2, AttackBoard::ABOVE_RIGHT_DOWN), Color::White);
    assert_eq!(promote(&mut state, from, to), black_pawn);

    // an ordinary step never promotes
    let from = Position::at(5, 8, 3);
    state.set(from, u8::BLACK_PAWN);
    assert_eq!(promote(&mut state, from, Position::at(5, 9, 3)), black_pawn);
}

#[test]
fn test_castling_after_the_first_moves() {
    let mut state = BoardState::new();
    state.ply = 2;

    let moves = state.get_legal_moves(Color::White);
    assert!(moves.contains(&Move::WhiteKingsideCastling));
    assert!(!moves.contains(&Move::WhiteQueensideCastling));

    state.ply = 3;
    let moves = state.get_legal_moves(Color::Black);
    assert!(moves.contains(&Move::BlackKingsideCastling));
    assert!(!moves.contains(&Move::BlackQueensideCastling));
}

#[test]
fn test_alpha_beta_equivalence() {
    let mut controller = GameController::with_seed(3);
    controller.play_random_moves(6);

    for depth in 0..=1 {
        let side = controller.side_to_move();
        let limits = SearchLimits { depth, threads: 1 };

        let mut state = controller.state.clone();
        let minimax = Search::new(&mut state, limits).minimax(side, depth);

        let mut state = controller.state.clone();
        let alpha_beta = Search::new(&mut state, limits).alpha_beta(side, depth, -CHECKMATE_SCORE, CHECKMATE_SCORE);

        assert_eq!(minimax, alpha_beta, "depth {}", depth);
    }
}

#[test]
fn test_random_games_end_in_a_known_status() {
    for seed in PLAYOUT_SEEDS {
        let mut controller = GameController::with_seed(seed);
        let played = controller.play_random_moves(300);

        let status = controller.status();
        if played < 300 {
            assert_ne!(status, GameStatus::InPlay);
        }

        if controller.state.get_legal_moves(controller.side_to_move()).is_empty() {
            assert_ne!(status, GameStatus::InPlay);
        }
    }
}
