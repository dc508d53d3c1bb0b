// Copyright (C) 2020-2026 Andy Kurnia.

use rand::prelude::*;
use skrafl::{board, display, error, game_config, game_state, kwg, lexicon, move_picker, movegen};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(serde::Serialize)]
struct GameRecord {
    game: usize,
    seed: u64,
    turns: u32,
    p1_policy: &'static str,
    p1_score: i16,
    p2_policy: &'static str,
    p2_score: i16,
    elapsed_ms: u64,
}

fn policy_name(move_picker: &move_picker::MovePicker) -> &'static str {
    match move_picker {
        move_picker::MovePicker::MaxScore => "max_score",
        move_picker::MovePicker::RestrictedVocabulary { .. } => "restricted_vocabulary",
        move_picker::MovePicker::Casual { .. } => "casual",
    }
}

fn play_game(
    game_config: &game_config::GameConfig<'_>,
    kwg: &kwg::Kwg,
    move_pickers: &[move_picker::MovePicker],
    move_generator: &mut movegen::MoveGenerator,
    game: usize,
    seed: u64,
) -> error::Returns<GameRecord> {
    let t0 = std::time::Instant::now();
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
    let mut game_state = game_state::GameState::new(game_config);
    game_state.reset_and_draw_tiles(&mut rng);
    let mut turns = 0;
    loop {
        let decision = {
            let board_snapshot = board::BoardSnapshot {
                board_tiles: &game_state.board_tiles,
                game_config,
                kwg,
            };
            let params = movegen::GenMovesParams {
                board_snapshot: &board_snapshot,
                rack: &game_state.current_player().rack,
                bag_size: game_state.bag.len(),
                deadline: None,
            };
            let outcome = move_generator.gen_moves(&params)?;
            move_pickers[game_state.turn as usize].pick(&params, &outcome, &mut rng)
        };
        tracing::trace!(
            game,
            turn = turns,
            player = game_state.turn,
            play = %display::fmt_play(game_config.alphabet(), &decision.to_play()),
            "decided"
        );
        game_state.play(&mut rng, &decision.to_play())?;
        turns += 1;
        if game_state.is_game_over() {
            game_state.finalize_scores();
            break;
        }
        game_state.next_turn();
    }
    tracing::debug!(
        game,
        "final board\n{}",
        display::board_to_string(
            game_config.alphabet(),
            game_config.board_layout(),
            &game_state.board_tiles
        )
    );
    Ok(GameRecord {
        game,
        seed,
        turns,
        p1_policy: policy_name(&move_pickers[0]),
        p1_score: game_state.players[0].score,
        p2_policy: policy_name(&move_pickers[1]),
        p2_score: game_state.players[1].score,
        elapsed_ms: t0.elapsed().as_millis() as u64,
    })
}

// usage: auto language lexicon.kwg [common.kwg [num_games [games.csv]]]
// player 1 always plays its best move, player 2 is casual when a common-word
// lexicon is given.
pub fn main() -> error::Returns<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 3 {
        println!("args: english CSW21.kwg [english-common.kwg [100 [games.csv]]]");
        return Ok(());
    }
    let Some(game_config) = game_config::make_game_config_by_name(&args[1]) else {
        skrafl::return_error!(format!("invalid language {:?}", args[1]));
    };
    let registry = lexicon::LexiconRegistry::new();
    let load = |filename: &str| {
        registry.get_or_load(filename, || {
            let bin = std::fs::read(filename).map_err(|e| {
                error::EngineError::CorruptLexicon(format!("cannot read {}: {}", filename, e))
            })?;
            kwg::Kwg::from_bytes(&bin)
        })
    };
    let kwg = load(args[2].as_str())?;
    let move_pickers = [
        move_picker::MovePicker::MaxScore,
        match args.get(3) {
            Some(filename) => move_picker::MovePicker::Casual {
                common: load(filename.as_str())?,
                top_n: 5,
                fallback: move_picker::Fallback::LowestScoring,
            },
            None => move_picker::MovePicker::MaxScore,
        },
    ];
    if game_config.num_players() as usize != move_pickers.len() {
        skrafl::return_error!(format!("need {} players", move_pickers.len()));
    }
    let num_games = match args.get(4) {
        Some(s) => s.parse::<usize>()?,
        None => 100,
    };
    let output: Box<dyn std::io::Write> = match args.get(5) {
        Some(filename) => Box::new(std::fs::File::create(filename)?),
        None => Box::new(std::io::stdout()),
    };
    let mut csv_writer = csv::Writer::from_writer(output);

    let base_seed = rand::rng().random::<u64>();
    let num_threads = num_cpus::get().min(num_games.max(1));
    tracing::info!(num_games, num_threads, base_seed, "starting self-play");
    let t0 = std::time::Instant::now();
    let next_game = AtomicUsize::new(0);
    let (tx, rx) = std::sync::mpsc::channel::<Result<GameRecord, String>>();

    let (game_config, kwg, move_pickers, next_game) =
        (&game_config, &*kwg, &move_pickers, &next_game);
    std::thread::scope(|s| -> error::Returns<()> {
        for _ in 0..num_threads {
            let tx = tx.clone();
            s.spawn(move || {
                let mut move_generator = movegen::MoveGenerator::new(game_config);
                loop {
                    let game = next_game.fetch_add(1, Ordering::Relaxed);
                    if game >= num_games {
                        break;
                    }
                    let seed = base_seed.wrapping_add(game as u64);
                    let result =
                        play_game(game_config, kwg, move_pickers, &mut move_generator, game, seed)
                            .map_err(|e| format!("game {} (seed {}): {}", game, seed, e));
                    if tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);
        let mut scores = [0i64; 2];
        let mut wins = [0usize; 2];
        let mut num_done = 0;
        for result in rx {
            let game_record = result.map_err(error::new)?;
            scores[0] += game_record.p1_score as i64;
            scores[1] += game_record.p2_score as i64;
            match game_record.p1_score.cmp(&game_record.p2_score) {
                std::cmp::Ordering::Greater => wins[0] += 1,
                std::cmp::Ordering::Less => wins[1] += 1,
                std::cmp::Ordering::Equal => {}
            }
            csv_writer.serialize(&game_record)?;
            num_done += 1;
        }
        csv_writer.flush()?;
        tracing::info!(
            games = num_done,
            p1_wins = wins[0],
            p2_wins = wins[1],
            p1_average = scores[0] as f64 / num_done.max(1) as f64,
            p2_average = scores[1] as f64 / num_done.max(1) as f64,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "self-play done"
        );
        Ok(())
    })
}
