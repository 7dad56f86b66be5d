use clap::Parser;
use vulcan::controller::{GameController, MoveResultType};
use vulcan::game::notation::move_as_string;
use vulcan::utils::cli::{Args, GUICommand};

fn play_computer_moves(controller: &mut GameController) {
    for notation in controller.play_computer_moves() {
        // the side that moved is the one not on move any more
        println!("{} plays {}", (!controller.side_to_move()).name(), notation);
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let mut controller = GameController::new();

    controller.set_option("Depth", &args.depth.to_string());
    controller.set_option("Threads", &args.threads.to_string());
    controller.players = [args.white, args.black];

    log::info!("vulcan {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    play_computer_moves(&mut controller);

    while let Some(input) = GUICommand::receive() {
        match input {
            GUICommand::Quit => break,
            GUICommand::New => {
                controller.new_game();
                play_computer_moves(&mut controller);
            }
            GUICommand::Print => controller.print(),
            GUICommand::Status => {
                if controller.state.is_stalemate() {
                    println!("{} (stalemate)", controller.status());
                } else {
                    println!("{}", controller.status());
                }
            }
            GUICommand::Moves(None) => {
                let moves = controller.legal_moves();
                controller.print_moves(&moves);
            }
            GUICommand::Moves(Some(square)) => match controller.legal_moves_from(&square) {
                Some(moves) => controller.print_moves(&moves),
                None => println!("{:?}", MoveResultType::InvalidNotation),
            },
            GUICommand::Move(notation) => {
                let side = controller.side_to_move();

                match controller.play(&notation) {
                    Ok(rendered) => {
                        println!("{} plays {}", side.name(), rendered);
                        play_computer_moves(&mut controller);
                    }
                    Err(result) => {
                        log::info!("{:?}", result);
                        println!("{:?}", result);
                    }
                }
            }
            GUICommand::Random => {
                let side = controller.side_to_move();

                match controller.random_move() {
                    Some(board_move) => {
                        println!("{} plays {}", side.name(), move_as_string(&controller.state, &board_move));
                        controller.make_move(board_move);
                        play_computer_moves(&mut controller);
                    }
                    None => println!("{:?}", MoveResultType::GameOver),
                }
            }
            GUICommand::Undo => match controller.undo() {
                Ok(board_move) => println!("undo {}", move_as_string(&controller.state, &board_move)),
                Err(result) => println!("{:?}", result),
            },
            GUICommand::Search(params) => {
                controller.search(params);

                let result = controller.wait_for_search();
                match result.and_then(|result| result.best_move.map(|m| (m, result.score))) {
                    Some((best_move, score)) => {
                        println!("bestmove {} score {}", move_as_string(&controller.state, &best_move), score)
                    }
                    None => println!("bestmove none"),
                }
            }
            GUICommand::Perft(depth) => match depth.parse::<usize>() {
                Ok(depth) => {
                    let moves = controller.perft(depth);

                    for (board_move, count) in &moves {
                        println!("{}: {}", move_as_string(&controller.state, board_move), count);
                    }

                    println!("\nNodes: {}", moves.iter().map(|(_, count)| count).sum::<usize>());
                }
                Err(_) => log::warn!("Invalid perft depth: {}", depth),
            },
            GUICommand::Eval => controller.print_evaluation(),
            GUICommand::SetOption(name, value) => controller.set_option(&name, &value),
            GUICommand::Invalid(command) => log::warn!("Invalid command: {}", command),
        }
    }

    controller.wait_for_search();
}
