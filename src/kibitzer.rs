// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board, error, game_config, kwg, lexicon, move_picker, movegen};
use rand::prelude::*;

// note: only this representation uses -1i8 for blank-as-A (in "board" input
// and "word" response for "action":"play"). everywhere else, use 0x81u8.

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum JsonPlay {
    #[serde(rename = "pass")]
    Pass,
    #[serde(rename = "exchange")]
    Exchange { tiles: Box<[u8]> },
    #[serde(rename = "play")]
    Play {
        down: bool,
        lane: i8,
        idx: i8,
        word: Box<[i8]>,
        score: i16,
    },
}

impl From<&movegen::Play> for JsonPlay {
    #[inline(always)]
    fn from(play: &movegen::Play) -> Self {
        match &play {
            movegen::Play::Exchange { tiles } => {
                if tiles.is_empty() {
                    Self::Pass
                } else {
                    // tiles: array of numbers. 0 for blank, 1 for A.
                    Self::Exchange {
                        tiles: tiles[..].into(),
                    }
                }
            }
            movegen::Play::Place {
                down,
                lane,
                idx,
                word,
                score,
            } => {
                // turn 0x81u8, 0x82u8 into -1i8, -2i8
                let word_played = word
                    .iter()
                    .map(|&x| {
                        if x & 0x80 != 0 {
                            -((x & !0x80) as i8)
                        } else {
                            x as i8
                        }
                    })
                    .collect::<Vec<i8>>();
                // across plays: down=false, lane=row, idx=col (0-based).
                // down plays: down=true, lane=col, idx=row (0-based).
                // word: 0 for play-through, 1 for A, -1 for blank-as-A.
                Self::Play {
                    down: *down,
                    lane: *lane,
                    idx: *idx,
                    word: word_played.into(),
                    score: *score,
                }
            }
        }
    }
}

impl From<&move_picker::Decision> for JsonPlay {
    #[inline(always)]
    fn from(decision: &move_picker::Decision) -> Self {
        (&decision.to_play()).into()
    }
}

// tile numbering follows alphabet order (not necessarily unicode order).
// rack: array of numbers. 0 for blank, 1 for A.
// board: 2D array of numbers. 0 for empty, 1 for A, -1 for blank-as-A.
// bag: number of tiles still in the bag.
// player: robot policy, defaults to the highest score.
// count: how many ranked candidates to return alongside the decision.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct TurnRequest {
    pub lexicon: String,
    pub rack: Vec<u8>,
    pub board: Vec<Vec<i8>>,
    pub bag: usize,
    #[serde(default)]
    pub player: move_picker::RobotConfig,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct JsonDecision {
    #[serde(flatten)]
    pub decision: JsonPlay,
    pub exchange_possible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<JsonPlay>,
}

pub struct TurnAnswer {
    pub decision: move_picker::Decision,
    pub exchange_possible: bool,
    // best first, at most the requested count.
    pub candidates: Vec<movegen::Play>,
}

impl From<&TurnAnswer> for JsonDecision {
    fn from(answer: &TurnAnswer) -> Self {
        Self {
            decision: (&answer.decision).into(),
            exchange_possible: answer.exchange_possible,
            candidates: answer.candidates.iter().map(|play| play.into()).collect(),
        }
    }
}

pub struct Kibitzer {
    // tiles not on the board and not on the rack, by tile number.
    pub available_tally: Vec<u8>,
    pub board_tiles: Vec<u8>,
}

impl Kibitzer {
    pub fn new() -> Self {
        Self {
            available_tally: Vec::new(),
            board_tiles: Vec::new(),
        }
    }

    pub fn prepare(
        &mut self,
        game_config: &game_config::GameConfig<'_>,
        rack: &[u8],
        signed_board_tiles: &[Vec<i8>],
    ) -> error::EngineResult<()> {
        let alphabet = game_config.alphabet();
        let alphabet_len_without_blank = alphabet.len() - 1;

        let expected_dim = game_config.board_layout().dim();
        if signed_board_tiles.len() != expected_dim.rows as usize {
            return Err(error::EngineError::InvalidBoard(format!(
                "need {} rows, found {} rows",
                expected_dim.rows,
                signed_board_tiles.len()
            )));
        }
        for (row_num, row) in (0..).zip(signed_board_tiles.iter()) {
            if row.len() != expected_dim.cols as usize {
                return Err(error::EngineError::InvalidBoard(format!(
                    "row {} (0-based): need {} cols, found {} cols",
                    row_num,
                    expected_dim.cols,
                    row.len()
                )));
            }
        }
        self.board_tiles.clear();
        self.board_tiles.reserve(expected_dim.area());
        for (row_num, row) in (0..).zip(signed_board_tiles.iter()) {
            for (col_num, &signed_tile) in (0..).zip(row) {
                if signed_tile == 0 {
                    self.board_tiles.push(0);
                } else if signed_tile as u8 <= alphabet_len_without_blank {
                    self.board_tiles.push(signed_tile as u8);
                } else if (!signed_tile as u8) < alphabet_len_without_blank {
                    // turn -1i8, -2i8 into 0x81u8, 0x82u8
                    self.board_tiles.push(0x81 + !signed_tile as u8);
                } else {
                    return Err(error::EngineError::InvalidBoard(format!(
                        "row {} col {} (0-based): invalid tile {}, alphabet size is {}",
                        row_num, col_num, signed_tile, alphabet_len_without_blank
                    )));
                }
            }
        }

        board::check_rack(game_config, rack)?;
        board::check_tile_counts(game_config, &self.board_tiles, rack)?;

        self.available_tally.clear();
        self.available_tally
            .extend((0..alphabet.len()).map(|tile| alphabet.freq(tile)));
        for &tile in self.board_tiles.iter().filter(|&&t| t != 0) {
            self.available_tally[if tile & 0x80 != 0 { 0 } else { tile as usize }] -= 1;
        }
        for &tile in rack {
            self.available_tally[tile as usize] -= 1;
        }
        Ok(())
    }

    #[inline(always)]
    pub fn num_unseen(&self) -> usize {
        self.available_tally.iter().map(|&x| x as usize).sum()
    }

    // The request's lexicon and language are resolved by the caller.
    pub fn answer(
        &mut self,
        move_generator: &mut movegen::MoveGenerator,
        game_config: &game_config::GameConfig<'_>,
        kwg: &kwg::Kwg,
        registry: &lexicon::LexiconRegistry,
        request: &TurnRequest,
        rng: &mut dyn RngCore,
    ) -> error::EngineResult<TurnAnswer> {
        self.prepare(game_config, &request.rack, &request.board)?;
        let num_unseen = self.num_unseen();
        if request.bag > num_unseen {
            return Err(error::EngineError::InvalidRackState(format!(
                "bag holds {} tiles but only {} are unaccounted for",
                request.bag, num_unseen
            )));
        }
        let move_picker = move_picker::MovePicker::from_config(&request.player, registry)
            .map_err(error::EngineError::CorruptLexicon)?;

        let board_snapshot = board::BoardSnapshot {
            board_tiles: &self.board_tiles,
            game_config,
            kwg,
        };
        let params = movegen::GenMovesParams {
            board_snapshot: &board_snapshot,
            rack: &request.rack,
            bag_size: request.bag,
            deadline: request.timeout_ms.map(|timeout_ms| {
                std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms)
            }),
        };
        let mut outcome = move_generator.gen_moves(&params)?;
        let decision = move_picker.pick(&params, &outcome, rng);
        tracing::debug!(
            lexicon = request.lexicon.as_str(),
            candidates = outcome.plays.len(),
            score = decision.score(),
            "turn decided"
        );
        outcome.plays.truncate(request.count.unwrap_or(0));
        Ok(TurnAnswer {
            decision,
            exchange_possible: outcome.exchange_possible,
            candidates: outcome.plays,
        })
    }
}

impl Default for Kibitzer {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
