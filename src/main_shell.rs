// Copyright (C) 2020-2026 Andy Kurnia.

use rand::prelude::*;
use skrafl::{
    alphabet, board, display, error, game_config, kwg, lexicon, move_picker, movegen, play_scorer,
    rlhelper,
};

static HELP: &str = "commands:
  lang english|icelandic    switch language (clears the board)
  lex FILE.kwg [NAME]       load a lexicon, NAME defaults to main
  clear                     empty the board
  put 8H WORD               write tiles across (8H) or down (H8), '.' skips
  rack TILES                set the rack, ? for blank
  bag N                     tiles left in the bag
  show                      print board, rack and bag
  gen [N]                   list the best N moves
  pick [JSON]               robot decision, e.g. '{\"policy\": \"max_score\"}'
  play 8H WORD              validate, score and apply a move
  source FILE               run commands from a file
  exit";

struct Shell {
    game_config: game_config::GameConfig<'static>,
    registry: lexicon::LexiconRegistry,
    board_tiles: Vec<u8>,
    rack: Vec<u8>,
    bag_size: usize,
    move_generator: movegen::MoveGenerator,
    rng: rand_chacha::ChaCha20Rng,
}

// "8H" is row 8 column H across, "H8" is the same square down.
fn parse_coord(s: &str) -> Option<(bool, i8, i8)> {
    let sb = s.as_bytes();
    let down = sb.first()?.is_ascii_alphabetic();
    let split = sb.iter().position(|&b| b.is_ascii_alphabetic() != down)?;
    let (first, second) = s.split_at(split);
    let (letters, digits) = if down { (first, second) } else { (second, first) };
    if letters.len() != 1 {
        return None;
    }
    let col = (letters.as_bytes()[0].to_ascii_uppercase() - b'A') as i8;
    let row = digits.parse::<i8>().ok()? - 1;
    Some(if down {
        (true, col, row)
    } else {
        (false, row, col)
    })
}

fn read_play_word(alphabet_reader: &alphabet::AlphabetReader, s: &str) -> Option<Vec<u8>> {
    let sb = s.as_bytes();
    let mut v = Vec::with_capacity(sb.len());
    let mut ix = 0;
    while ix < sb.len() {
        if sb[ix] == b'.' {
            v.push(0);
            ix += 1;
        } else {
            let (tile, end_ix) = alphabet_reader.next_tile(sb, ix)?;
            v.push(tile);
            ix = end_ix;
        }
    }
    Some(v)
}

impl Shell {
    fn new(game_config: game_config::GameConfig<'static>) -> Self {
        let area = game_config.board_layout().dim().area();
        let move_generator = movegen::MoveGenerator::new(&game_config);
        Self {
            game_config,
            registry: lexicon::LexiconRegistry::new(),
            board_tiles: vec![0; area],
            rack: Vec::new(),
            bag_size: 86,
            move_generator,
            rng: rand_chacha::ChaCha20Rng::from_os_rng(),
        }
    }

    fn main_kwg(&self) -> error::Returns<std::sync::Arc<kwg::Kwg>> {
        match self.registry.get("main") {
            Some(kwg) => Ok(kwg),
            None => {
                skrafl::return_error!("no lexicon, try lex FILE.kwg".into());
            }
        }
    }

    fn parse_play(&self, coord: &str, word: &str) -> error::Returns<movegen::Play> {
        let Some((down, lane, idx)) = parse_coord(coord) else {
            skrafl::return_error!(format!("bad coordinate {:?}", coord));
        };
        let alphabet_reader = alphabet::AlphabetReader::new_for_plays(self.game_config.alphabet());
        let Some(word) = read_play_word(&alphabet_reader, word) else {
            skrafl::return_error!(format!("bad word {:?}", word));
        };
        Ok(movegen::Play::Place {
            down,
            lane,
            idx,
            word: word.into(),
            score: 0,
        })
    }

    fn show(&self) {
        let alphabet = self.game_config.alphabet();
        display::print_board(alphabet, self.game_config.board_layout(), &self.board_tiles);
        println!("rack: {}", alphabet.fmt_rack(&self.rack));
        println!("bag: {}", self.bag_size);
    }

    fn run(&mut self, strings: &[String]) -> error::Returns<()> {
        let alphabet = self.game_config.alphabet();
        let dim = self.game_config.board_layout().dim();
        match strings[0].as_str() {
            "help" => println!("{}", HELP),
            "lang" if strings.len() > 1 => {
                let Some(game_config) = game_config::make_game_config_by_name(&strings[1]) else {
                    skrafl::return_error!(format!("invalid language {:?}", strings[1]));
                };
                *self = Self {
                    registry: std::mem::take(&mut self.registry),
                    ..Self::new(game_config)
                };
            }
            "lex" if strings.len() > 1 => {
                let kwg = kwg::Kwg::from_bytes(&std::fs::read(&strings[1])?)?;
                let name = strings.get(2).map_or("main", |s| s.as_str());
                println!("{}: {} words", name, kwg.count_dawg_words());
                self.registry.insert(name, kwg);
            }
            "clear" => self.board_tiles.iter_mut().for_each(|m| *m = 0),
            "put" if strings.len() > 2 => {
                if let movegen::Play::Place {
                    down,
                    lane,
                    idx,
                    word,
                    ..
                } = self.parse_play(&strings[1], &strings[2])?
                {
                    let strider = dim.lane(down, lane);
                    if lane < 0
                        || lane >= dim.num_lanes(down)
                        || idx < 0
                        || idx as usize + word.len() > strider.len() as usize
                    {
                        skrafl::return_error!("word does not fit".into());
                    }
                    for (i, &tile) in (idx..).zip(word.iter()) {
                        if tile != 0 {
                            self.board_tiles[strider.at(i)] = tile;
                        }
                    }
                }
            }
            "rack" if strings.len() > 1 => {
                let Some(rack) =
                    alphabet::AlphabetReader::new_for_racks(alphabet).read(&strings[1])
                else {
                    skrafl::return_error!(format!("bad rack {:?}", strings[1]));
                };
                board::check_rack(&self.game_config, &rack)?;
                self.rack = rack;
            }
            "bag" if strings.len() > 1 => self.bag_size = strings[1].parse()?,
            "show" => self.show(),
            "gen" => {
                let count = match strings.get(1) {
                    Some(s) => s.parse::<usize>()?,
                    None => 20,
                };
                let kwg = self.main_kwg()?;
                let board_snapshot = board::BoardSnapshot {
                    board_tiles: &self.board_tiles,
                    game_config: &self.game_config,
                    kwg: &kwg,
                };
                let t0 = std::time::Instant::now();
                let outcome = self.move_generator.gen_moves(&movegen::GenMovesParams {
                    board_snapshot: &board_snapshot,
                    rack: &self.rack,
                    bag_size: self.bag_size,
                    deadline: None,
                })?;
                println!("found {} moves in {:?}", outcome.plays.len(), t0.elapsed());
                for play in outcome.plays.iter().take(count) {
                    println!("{}", display::fmt_play(alphabet, play));
                }
                if outcome.no_legal_move() {
                    println!(
                        "no moves, {}",
                        if outcome.exchange_possible {
                            "exchange"
                        } else {
                            "pass"
                        }
                    );
                }
            }
            "pick" => {
                let robot_config = match strings.get(1) {
                    Some(s) => serde_json::from_str::<move_picker::RobotConfig>(s)?,
                    None => move_picker::RobotConfig::MaxScore,
                };
                let move_picker = move_picker::MovePicker::from_config(&robot_config, &self.registry)
                    .map_err(error::new)?;
                let kwg = self.main_kwg()?;
                let board_snapshot = board::BoardSnapshot {
                    board_tiles: &self.board_tiles,
                    game_config: &self.game_config,
                    kwg: &kwg,
                };
                let params = movegen::GenMovesParams {
                    board_snapshot: &board_snapshot,
                    rack: &self.rack,
                    bag_size: self.bag_size,
                    deadline: None,
                };
                let outcome = self.move_generator.gen_moves(&params)?;
                let decision = move_picker.pick(&params, &outcome, &mut self.rng);
                println!("{}", display::fmt_play(alphabet, &decision.to_play()));
            }
            "play" if strings.len() > 2 => {
                let kwg = self.main_kwg()?;
                let mut play = self.parse_play(&strings[1], &strings[2])?;
                let board_snapshot = board::BoardSnapshot {
                    board_tiles: &self.board_tiles,
                    game_config: &self.game_config,
                    kwg: &kwg,
                };
                let mut play_scorer = play_scorer::PlayScorer::new();
                play_scorer
                    .validate_play(&board_snapshot, &self.rack, &play)
                    .map_err(error::new)?;
                let score = play_scorer.compute_score(&board_snapshot, &play);
                if let movegen::Play::Place {
                    score: play_score, ..
                } = &mut play
                {
                    *play_score = score;
                }
                println!("{}", display::fmt_play(alphabet, &play));
                for placement in play.placements(dim) {
                    self.board_tiles[dim.at_row_col(placement.row, placement.col)] =
                        placement.letter | if placement.is_blank { 0x80 } else { 0 };
                }
                for tile in play.tiles_used() {
                    if let Some(pos) = self.rack.iter().position(|&t| t == tile) {
                        self.rack.swap_remove(pos);
                    }
                }
            }
            _ => println!("invalid input, help for help"),
        }
        Ok(())
    }
}

pub fn main() -> error::Returns<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let mut shell = Shell::new(game_config::make_english_game_config());
    let mut rl = rlhelper::new_rl_editor()?;
    let mut cmd_stack = Vec::<(String, Option<(String, usize)>)>::new();
    loop {
        if let Some((line, source)) = cmd_stack.pop() {
            if let Some((filename, line_num)) = source {
                println!("{}:{}> {}", filename, line_num, line);
            }
            match shell_words::split(&line) {
                Ok(strings) => {
                    if strings.is_empty() {
                        continue;
                    }
                    match strings[0].as_str() {
                        "exit" => {
                            break;
                        }
                        "source" => {
                            if strings.len() > 1 {
                                match std::fs::read_to_string(&strings[1]) {
                                    Ok(whole_file) => {
                                        let v = cmd_stack.len();
                                        for (line_num, line) in whole_file.lines().enumerate() {
                                            cmd_stack.push((
                                                line.to_string(),
                                                Some((strings[1].clone(), line_num + 1)),
                                            ));
                                        }
                                        cmd_stack[v..].reverse();
                                    }
                                    Err(err) => {
                                        println!("cannot open file: {:?}", err);
                                    }
                                }
                            } else {
                                println!("need another arg");
                            }
                        }
                        _ => {
                            if let Err(err) = shell.run(&strings) {
                                println!("error: {}", err);
                            }
                        }
                    }
                }
                Err(err) => {
                    println!("Bad quoting: {:?}", err);
                }
            }
        } else {
            match rl.readline(">> ") {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    cmd_stack.push((line, None));
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
    }

    Ok(())
}
