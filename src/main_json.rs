// Copyright (C) 2020-2026 Andy Kurnia.

use rand::prelude::*;
use skrafl::{display, error, game_config, kibitzer, kwg, lexicon, move_picker, movegen};
use std::io::Read;
use std::sync::Arc;

// lexicon name, language, file.
static LEXICON_FILES: &[(&str, &str, &str)] = &[
    ("CSW21", "english", "CSW21.kwg"),
    ("NWL23", "english", "NWL23.kwg"),
    ("english-common", "english", "english-common.kwg"),
    ("icelandic", "icelandic", "icelandic.kwg"),
    ("icelandic-common", "icelandic", "icelandic-common.kwg"),
];

fn load_lexicon(
    registry: &lexicon::LexiconRegistry,
    name: &str,
) -> error::Returns<(&'static str, Arc<kwg::Kwg>)> {
    let Some(&(_, language, filename)) = LEXICON_FILES.iter().find(|(n, _, _)| *n == name) else {
        skrafl::return_error!(format!("invalid lexicon {:?}", name));
    };
    let kwg = registry.get_or_load(name, || {
        let bin = std::fs::read(filename).map_err(|e| {
            error::EngineError::CorruptLexicon(format!("cannot read {}: {}", filename, e))
        })?;
        kwg::Kwg::from_bytes(&bin)
    })?;
    Ok((language, kwg))
}

// usage: json [request.json], reads stdin without a filename.
// example request:
// {
//   "lexicon": "CSW21",
//   "rack": [ 1, 3, 10, 16, 17, 18, 19 ],
//   "board": [ [ 0, 0, ... ], ... ],
//   "bag": 80,
//   "player": { "policy": "casual", "common_lexicon": "english-common", "top_n": 5 },
//   "count": 15,
//   "timeout_ms": 1000
// }
pub fn main() -> error::Returns<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = std::env::args().collect::<Vec<_>>();
    let data = match args.get(1) {
        Some(filename) => std::fs::read_to_string(filename)?,
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            s
        }
    };
    let request = serde_json::from_str::<kibitzer::TurnRequest>(&data)?;

    let registry = lexicon::LexiconRegistry::new();
    let (language, kwg) = load_lexicon(&registry, &request.lexicon)?;
    match &request.player {
        move_picker::RobotConfig::MaxScore => {}
        move_picker::RobotConfig::RestrictedVocabulary { common_lexicon, .. }
        | move_picker::RobotConfig::Casual { common_lexicon, .. } => {
            let (common_language, _) = load_lexicon(&registry, common_lexicon)?;
            if common_language != language {
                skrafl::return_error!(format!(
                    "{:?} is {} but {:?} is {}",
                    common_lexicon, common_language, request.lexicon, language
                ));
            }
        }
    }
    let Some(game_config) = game_config::make_game_config_by_name(language) else {
        skrafl::return_error!(format!("invalid language {:?}", language));
    };

    let mut move_generator = movegen::MoveGenerator::new(&game_config);
    let mut kibitzer = kibitzer::Kibitzer::new();
    let mut rng = rand_chacha::ChaCha20Rng::from_os_rng();
    let answer = kibitzer.answer(
        &mut move_generator,
        &game_config,
        &kwg,
        &registry,
        &request,
        &mut rng,
    )?;

    let alphabet = game_config.alphabet();
    eprint!(
        "{}",
        display::board_to_string(alphabet, game_config.board_layout(), &kibitzer.board_tiles)
    );
    eprintln!("rack: {}", alphabet.fmt_rack(&request.rack));
    for play in answer.candidates.iter() {
        eprintln!("{}", display::fmt_play(alphabet, play));
    }
    eprintln!("decision: {}", display::fmt_play(alphabet, &answer.decision.to_play()));

    println!(
        "{}",
        serde_json::to_string_pretty(&kibitzer::JsonDecision::from(&answer))?
    );
    Ok(())
}
