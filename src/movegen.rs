// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board, board_layout, error, game_config, kwg, matrix};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Play {
    // an empty exchange is a pass.
    Exchange {
        tiles: Box<[u8]>,
    },
    Place {
        down: bool,
        lane: i8,
        idx: i8,
        // 0 plays through the tile already on the board.
        word: Box<[u8]>,
        score: i16,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePlacement {
    pub row: i8,
    pub col: i8,
    pub letter: u8,
    pub is_blank: bool,
}

impl Play {
    #[inline(always)]
    pub fn score(&self) -> i16 {
        match self {
            Play::Exchange { .. } => 0,
            Play::Place { score, .. } => *score,
        }
    }

    // newly placed tiles, in reading order.
    pub fn placements(&self, dim: matrix::Dim) -> Vec<TilePlacement> {
        match self {
            Play::Exchange { .. } => Vec::new(),
            Play::Place {
                down,
                lane,
                idx,
                word,
                ..
            } => (*idx..)
                .zip(word.iter())
                .filter(|&(_, &tile)| tile != 0)
                .map(|(i, &tile)| {
                    let (row, col) = if *down { (i, *lane) } else { (*lane, i) };
                    debug_assert!(dim.contains(row, col));
                    TilePlacement {
                        row,
                        col,
                        letter: tile & 0x7f,
                        is_blank: tile & 0x80 != 0,
                    }
                })
                .collect(),
        }
    }

    // the word along the play's own line, with played-through tiles filled in.
    pub fn main_word(&self, board_tiles: &[u8], dim: matrix::Dim) -> Box<[u8]> {
        match self {
            Play::Exchange { .. } => Box::new([]),
            Play::Place {
                down,
                lane,
                idx,
                word,
                ..
            } => {
                let strider = dim.lane(*down, *lane);
                (*idx..)
                    .zip(word.iter())
                    .map(|(i, &tile)| {
                        if tile == 0 {
                            board_tiles[strider.at(i)]
                        } else {
                            tile
                        }
                    })
                    .collect()
            }
        }
    }

    // rack tiles consumed, blanks as 0.
    pub fn tiles_used(&self) -> Vec<u8> {
        match self {
            Play::Exchange { tiles } => tiles.to_vec(),
            Play::Place { word, .. } => word
                .iter()
                .filter(|&&tile| tile != 0)
                .map(|&tile| if tile & 0x80 != 0 { 0 } else { tile })
                .collect(),
        }
    }

    // two plays with the same key put the same tiles on the same squares.
    fn placement_key(&self, dim: matrix::Dim) -> Box<[(usize, u8)]> {
        match self {
            Play::Exchange { tiles } => tiles.iter().map(|&t| (usize::MAX, t)).collect(),
            Play::Place { down, lane, idx, word, .. } => {
                let strider = dim.lane(*down, *lane);
                (*idx..)
                    .zip(word.iter())
                    .filter(|&(_, &tile)| tile != 0)
                    .map(|(i, &tile)| (strider.at(i), tile))
                    .collect()
            }
        }
    }
}

// Board position order: across before down, then lane, index, word.
pub fn cmp_play_position(a: &Play, b: &Play) -> std::cmp::Ordering {
    match (a, b) {
        (
            Play::Place {
                down: a_down,
                lane: a_lane,
                idx: a_idx,
                word: a_word,
                ..
            },
            Play::Place {
                down: b_down,
                lane: b_lane,
                idx: b_idx,
                word: b_word,
                ..
            },
        ) => (a_down, a_lane, a_idx, a_word).cmp(&(b_down, b_lane, b_idx, b_word)),
        (Play::Place { .. }, Play::Exchange { .. }) => std::cmp::Ordering::Less,
        (Play::Exchange { .. }, Play::Place { .. }) => std::cmp::Ordering::Greater,
        (Play::Exchange { tiles: a }, Play::Exchange { tiles: b }) => a.cmp(b),
    }
}

// highest score first.
pub fn cmp_plays(a: &Play, b: &Play) -> std::cmp::Ordering {
    b.score()
        .cmp(&a.score())
        .then_with(|| cmp_play_position(a, b))
}

pub struct GenMovesParams<'a> {
    pub board_snapshot: &'a board::BoardSnapshot<'a>,
    pub rack: &'a [u8],
    // tiles left in the bag, decides whether exchanging is allowed.
    pub bag_size: usize,
    pub deadline: Option<std::time::Instant>,
}

pub struct GenOutcome {
    // placements only, best first.
    pub plays: Vec<Play>,
    // exchanging is allowed this turn.
    pub exchange_possible: bool,
}

impl GenOutcome {
    #[inline(always)]
    pub fn no_legal_move(&self) -> bool {
        self.plays.is_empty()
    }

    #[inline(always)]
    pub fn must_pass(&self) -> bool {
        self.no_legal_move() && !self.exchange_possible
    }
}

struct Clock {
    deadline: Option<std::time::Instant>,
    ticks: u32,
    timed_out: bool,
}

impl Clock {
    #[inline(always)]
    fn out_of_time(&mut self) -> bool {
        if let Some(deadline) = self.deadline {
            if !self.timed_out {
                self.ticks = self.ticks.wrapping_add(1);
                if self.ticks & 0x3ff == 0 && std::time::Instant::now() >= deadline {
                    self.timed_out = true;
                }
            }
        }
        self.timed_out
    }
}

struct Env<'a> {
    board_snapshot: &'a board::BoardSnapshot<'a>,
    cross_sets: &'a [board::CrossSet],
    rack_tally: &'a mut [u8],
    word_buffer: &'a mut [u8],
    plays: &'a mut Vec<Play>,
    clock: &'a mut Clock,
    strider: matrix::Strider,
    down: bool,
    lane: i8,
    anchor: i8,
    leftmost: i8,
    rightmost: i8,
    num_played: i8,
    idx_left: i8,
}

fn record(
    env: &mut Env<'_>,
    idx_left: i8,
    idx_right: i8,
    main_score: i16,
    perpendicular_score: i16,
    word_multiplier: i8,
) {
    let score = main_score * (word_multiplier as i16)
        + perpendicular_score
        + env
            .board_snapshot
            .game_config
            .num_played_bonus(env.num_played);
    env.plays.push(Play::Place {
        down: env.down,
        lane: env.lane,
        idx: idx_left,
        word: env.word_buffer[(idx_left as usize)..(idx_right as usize)].into(),
        score,
    });
}

// is_unique: a single placed tile counts as a word in this direction. It is
// only set where the other direction cannot see the tile as a word.
fn play_right(
    env: &mut Env<'_>,
    mut idx: i8,
    mut p: i32,
    mut main_score: i16,
    perpendicular_score: i16,
    word_multiplier: i8,
    is_unique: bool,
) {
    if env.clock.out_of_time() {
        return;
    }
    let board_snapshot = env.board_snapshot;
    let kwg = board_snapshot.kwg;
    let alphabet = board_snapshot.game_config.alphabet();
    // tail-recurse through the tiles already there
    while idx < env.rightmost {
        let b = board_snapshot.board_tiles[env.strider.at(idx)];
        if b == 0 {
            break;
        }
        p = kwg.seek(p, b & 0x7f);
        if p <= 0 {
            return;
        }
        main_score += alphabet.score(b) as i16;
        idx += 1;
    }
    if idx > env.anchor + 1
        && (env.num_played + is_unique as i8) >= 2
        && idx - env.idx_left >= 2
        && kwg[p].accepts()
    {
        record(
            env,
            env.idx_left,
            idx,
            main_score,
            perpendicular_score,
            word_multiplier,
        );
    }
    if idx >= env.rightmost {
        return;
    }

    let square = env.strider.at(idx);
    let cross_set = env.cross_sets[square];
    if cross_set.bits == 1 {
        // nothing fits here
        return;
    }
    p = kwg[p].arc_index();
    if p <= 0 {
        return;
    }
    let premium = board_snapshot.game_config.board_layout().premiums()[square];
    let new_word_multiplier = word_multiplier * premium.word_multiplier;
    let placed_is_unique = is_unique || !cross_set.is_constrained();
    loop {
        let node = kwg[p];
        let tile = node.tile();
        if tile != 0 && cross_set.allows(tile) {
            for (rack_tile, placed_tile) in [(tile, tile), (0, tile | 0x80)] {
                if env.rack_tally[rack_tile as usize] == 0 {
                    continue;
                }
                env.rack_tally[rack_tile as usize] -= 1;
                env.num_played += 1;
                let tile_value =
                    (alphabet.score(placed_tile) as i16) * (premium.tile_multiplier as i16);
                env.word_buffer[idx as usize] = placed_tile;
                play_right(
                    env,
                    idx + 1,
                    p,
                    main_score + tile_value,
                    if cross_set.is_constrained() {
                        perpendicular_score
                            + (cross_set.score + tile_value) * (premium.word_multiplier as i16)
                    } else {
                        perpendicular_score
                    },
                    new_word_multiplier,
                    placed_is_unique,
                );
                env.num_played -= 1;
                env.rack_tally[rack_tile as usize] += 1;
            }
        }
        if node.is_end() {
            break;
        }
        p += 1;
    }
}

fn play_left(
    env: &mut Env<'_>,
    mut idx: i8,
    mut p: i32,
    mut main_score: i16,
    perpendicular_score: i16,
    word_multiplier: i8,
    is_unique: bool,
) {
    if env.clock.out_of_time() {
        return;
    }
    let board_snapshot = env.board_snapshot;
    let kwg = board_snapshot.kwg;
    let alphabet = board_snapshot.game_config.alphabet();
    while idx >= env.leftmost {
        let b = board_snapshot.board_tiles[env.strider.at(idx)];
        if b == 0 {
            break;
        }
        p = kwg.seek(p, b & 0x7f);
        if p <= 0 {
            return;
        }
        main_score += alphabet.score(b) as i16;
        idx -= 1;
    }
    if (env.num_played + is_unique as i8) >= 2
        && env.anchor - idx >= 2
        && kwg[p].accepts()
    {
        record(
            env,
            idx + 1,
            env.anchor + 1,
            main_score,
            perpendicular_score,
            word_multiplier,
        );
    }

    p = kwg[p].arc_index();
    if p <= 0 {
        return;
    }
    let in_range = idx >= env.leftmost;
    let (premium, cross_set) = if in_range {
        let square = env.strider.at(idx);
        (
            board_snapshot.game_config.board_layout().premiums()[square],
            env.cross_sets[square],
        )
    } else {
        (board_layout::FVS, board::CrossSet { bits: 1, score: 0 })
    };
    let new_word_multiplier = word_multiplier * premium.word_multiplier;
    let placed_is_unique = is_unique || !cross_set.is_constrained();
    loop {
        let node = kwg[p];
        let tile = node.tile();
        if tile == 0 {
            // separator: the prefix is done, continue right of the anchor.
            env.idx_left = idx + 1;
            play_right(
                env,
                env.anchor + 1,
                p,
                main_score,
                perpendicular_score,
                word_multiplier,
                is_unique,
            );
        } else if in_range && cross_set.allows(tile) {
            for (rack_tile, placed_tile) in [(tile, tile), (0, tile | 0x80)] {
                if env.rack_tally[rack_tile as usize] == 0 {
                    continue;
                }
                env.rack_tally[rack_tile as usize] -= 1;
                env.num_played += 1;
                let tile_value =
                    (alphabet.score(placed_tile) as i16) * (premium.tile_multiplier as i16);
                env.word_buffer[idx as usize] = placed_tile;
                play_left(
                    env,
                    idx - 1,
                    p,
                    main_score + tile_value,
                    if cross_set.is_constrained() {
                        perpendicular_score
                            + (cross_set.score + tile_value) * (premium.word_multiplier as i16)
                    } else {
                        perpendicular_score
                    },
                    new_word_multiplier,
                    placed_is_unique,
                );
                env.num_played -= 1;
                env.rack_tally[rack_tile as usize] += 1;
            }
        }
        if node.is_end() {
            break;
        }
        p += 1;
    }
}

// Each placement is reached from exactly one anchor: a run of tiles is
// anchored at its last tile, and an empty anchor stops anchors to its left
// from reaching it.
fn gen_place_moves(env: &mut Env<'_>, star: Option<i8>, single_tile_plays: bool) {
    let board_tiles = env.board_snapshot.board_tiles;
    let strider = env.strider;
    let len = strider.len();
    env.word_buffer
        .iter_mut()
        .take(len as usize)
        .for_each(|m| *m = 0);

    let mut rightmost = len; // processed up to here
    let mut leftmost = len;
    loop {
        while leftmost > 0 && board_tiles[strider.at(leftmost - 1)] == 0 {
            leftmost -= 1;
        }
        if leftmost > 0 {
            // board[leftmost - 1] is a tile.
            env.anchor = leftmost - 1;
            env.leftmost = 0;
            env.rightmost = rightmost;
            play_left(env, env.anchor, kwg::GADDAG_ROOT, 0, 0, 1, single_tile_plays);
        }
        {
            let mut leftmost = leftmost; // shadowing
            if leftmost > 0 {
                // leftmost touches the tile, those plays went through it.
                leftmost += 1;
            }
            for anchor in (leftmost..rightmost).rev() {
                let cross_set = env.cross_sets[strider.at(anchor)];
                if cross_set.is_constrained() || star == Some(anchor) {
                    if rightmost - leftmost < 2 {
                        // not enough room for 2-tile words
                        break;
                    }
                    if cross_set.bits != 1 {
                        env.anchor = anchor;
                        env.leftmost = leftmost;
                        env.rightmost = rightmost;
                        play_left(env, anchor, kwg::GADDAG_ROOT, 0, 0, 1, single_tile_plays);
                    }
                    rightmost = anchor; // prevent duplicates
                }
            }
        }
        while leftmost > 0 && board_tiles[strider.at(leftmost - 1)] != 0 {
            leftmost -= 1;
        }
        if leftmost <= 1 {
            break;
        }
        rightmost = leftmost - 1; // prevent touching leftmost tile
    }
}

// Owns the working buffers, so keep one per thread.
pub struct MoveGenerator {
    cross_checks: board::CrossChecks,
    rack_tally: Box<[u8]>,
    word_buffer: Box<[u8]>,
    plays: Vec<Play>,
}

impl MoveGenerator {
    pub fn new(game_config: &game_config::GameConfig<'_>) -> Self {
        let dim = game_config.board_layout().dim();
        Self {
            cross_checks: board::CrossChecks::new(game_config),
            rack_tally: vec![0u8; game_config.alphabet().len() as usize].into_boxed_slice(),
            word_buffer: vec![0u8; std::cmp::max(dim.rows, dim.cols) as usize]
                .into_boxed_slice(),
            plays: Vec::new(),
        }
    }

    // cross checks of the most recent gen_moves call.
    #[inline(always)]
    pub fn cross_checks(&self) -> &board::CrossChecks {
        &self.cross_checks
    }

    pub fn gen_moves(
        &mut self,
        params: &GenMovesParams<'_>,
    ) -> error::EngineResult<GenOutcome> {
        let t0 = std::time::Instant::now();
        let board_snapshot = params.board_snapshot;
        let game_config = board_snapshot.game_config;
        let kwg = board_snapshot.kwg;
        board::check_board_tiles(game_config, board_snapshot.board_tiles)?;
        board::check_rack(game_config, params.rack)?;
        board::check_tile_counts(game_config, board_snapshot.board_tiles, params.rack)?;
        if !kwg.is_empty() && !kwg.has_gaddag() {
            return Err(error::EngineError::CorruptLexicon(
                "move generation needs a lexicon built with its gaddag part".into(),
            ));
        }
        if kwg.max_tile() >= game_config.alphabet().len() {
            return Err(error::EngineError::CorruptLexicon(format!(
                "lexicon uses tile {}, alphabet has {}",
                kwg.max_tile(),
                game_config.alphabet().len() - 1
            )));
        }
        let mut clock = Clock {
            deadline: params.deadline,
            ticks: 0,
            timed_out: params.deadline.is_some_and(|deadline| t0 >= deadline),
        };

        let dim = game_config.board_layout().dim();
        self.rack_tally.iter_mut().for_each(|m| *m = 0);
        for &tile in params.rack {
            self.rack_tally[tile as usize] += 1;
        }
        self.plays.clear();
        self.cross_checks.recompute(board_snapshot);
        let star = self.cross_checks.star().map(|idx| dim.row_col(idx));

        if !params.rack.is_empty() && !kwg.is_empty() {
            let cross_checks = &self.cross_checks;
            for down in [false, true] {
                for lane in 0..dim.num_lanes(down) {
                    if clock.timed_out {
                        break;
                    }
                    let star_in_lane = star.and_then(|(row, col)| {
                        if down {
                            (col == lane).then_some(row)
                        } else {
                            (row == lane).then_some(col)
                        }
                    });
                    let mut env = Env {
                        board_snapshot,
                        cross_sets: cross_checks.for_plays(down),
                        rack_tally: &mut self.rack_tally,
                        word_buffer: &mut self.word_buffer,
                        plays: &mut self.plays,
                        clock: &mut clock,
                        strider: dim.lane(down, lane),
                        down,
                        lane,
                        anchor: 0,
                        leftmost: 0,
                        rightmost: 0,
                        num_played: 0,
                        idx_left: 0,
                    };
                    // single tiles are reported across unless only down sees a word.
                    gen_place_moves(&mut env, star_in_lane, !down);
                }
            }
        }

        if clock.timed_out {
            let elapsed = t0.elapsed();
            tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                partial = self.plays.len(),
                "move generation timed out"
            );
            self.plays.clear();
            return Err(error::EngineError::SearchTimeout { elapsed });
        }

        let num_generated = self.plays.len();
        let mut seen = std::collections::HashSet::with_capacity(num_generated);
        self.plays.retain(|play| seen.insert(play.placement_key(dim)));
        self.plays.sort_by(cmp_plays);
        tracing::debug!(
            generated = num_generated,
            unique = self.plays.len(),
            elapsed_us = t0.elapsed().as_micros() as u64,
            "moves generated"
        );

        Ok(GenOutcome {
            plays: std::mem::take(&mut self.plays),
            exchange_possible: !params.rack.is_empty() && game_config.can_exchange(params.bag_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::standard_board_with;
    use crate::kwg::tests::english_kwg;
    use crate::play_scorer;

    fn rack(s: &str) -> Vec<u8> {
        s.bytes()
            .map(|b| if b == b'?' { 0 } else { b & 0x3f })
            .collect()
    }

    fn gen_checked(
        game_config: &game_config::GameConfig<'_>,
        kwg: &kwg::Kwg,
        board_tiles: &[u8],
        rack: &[u8],
    ) -> GenOutcome {
        let board_snapshot = board::BoardSnapshot {
            board_tiles,
            game_config,
            kwg,
        };
        let outcome = MoveGenerator::new(game_config)
            .gen_moves(&GenMovesParams {
                board_snapshot: &board_snapshot,
                rack,
                bag_size: 50,
                deadline: None,
            })
            .unwrap();
        let mut play_scorer = play_scorer::PlayScorer::new();
        for play in &outcome.plays {
            play_scorer
                .validate_play(&board_snapshot, rack, play)
                .unwrap_or_else(|e| panic!("{:?}: {}", play, e));
            assert_eq!(
                play_scorer.compute_score(&board_snapshot, play),
                play.score(),
                "{:?}",
                play
            );
        }
        outcome
    }

    #[test]
    fn opening_plays_cross_the_star() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["ACT", "CAT"]);
        let board_tiles = vec![0u8; 225];
        let outcome = gen_checked(&game_config, &kwg, &board_tiles, &rack("CATVVWW"));
        assert_eq!(outcome.plays.len(), 12);
        for play in &outcome.plays {
            // (3 + 1 + 1) doubled by the star, no bonus for 3 of 7 tiles.
            assert_eq!(play.score(), 10);
            assert!(
                play.placements(game_config.board_layout().dim())
                    .iter()
                    .any(|p| (p.row, p.col) == (7, 7))
            );
        }
        let dim = game_config.board_layout().dim();
        let mut words = outcome
            .plays
            .iter()
            .map(|play| play.main_word(&board_tiles, dim))
            .collect::<Vec<_>>();
        words.sort();
        words.dedup();
        assert_eq!(words, vec![rack("ACT").into(), rack("CAT").into()]);
        // deterministic order: across first
        assert!(matches!(
            outcome.plays[0],
            Play::Place {
                down: false,
                lane: 7,
                idx: 5,
                ..
            }
        ));
    }

    #[test]
    fn full_rack_gets_the_bonus() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["RETAINS"]);
        let outcome = gen_checked(&game_config, &kwg, &[0u8; 225], &rack("AEINRST"));
        // no premium but the star from col 4 to col 10.
        assert!(outcome.plays.iter().any(|play| matches!(
            play,
            Play::Place {
                down: false,
                lane: 7,
                idx: 4,
                score: 64,
                ..
            }
        )));
        assert_eq!(outcome.plays[0].score(), 66);
        assert!(outcome.plays.iter().all(|play| play.score() >= 64));
    }

    #[test]
    fn plays_through_existing_tiles() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["AT", "CAT"]);
        let board_tiles = standard_board_with(&[(7, 7, "AT", false)]);
        let outcome = gen_checked(&game_config, &kwg, &board_tiles, &rack("C"));
        assert_eq!(
            outcome.plays,
            vec![Play::Place {
                down: false,
                lane: 7,
                idx: 6,
                word: [3, 0, 0].into(),
                score: 5,
            }]
        );
    }

    #[test]
    fn invalid_perpendicular_words_are_excluded() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["AT", "TA"]);
        let board_tiles = standard_board_with(&[(7, 7, "AT", false)]);
        let outcome = gen_checked(&game_config, &kwg, &board_tiles, &rack("AT"));
        let has = |down: bool, lane: i8, idx: i8, w: &str| {
            outcome.plays.iter().any(|play| {
                matches!(play, Play::Place { down: d, lane: l, idx: i, word, .. }
                    if *d == down && *l == lane && *i == idx && word[..] == rack(w)[..])
            })
        };
        // TA over AT makes TA and AT downwards.
        assert!(has(false, 6, 7, "TA"));
        // AT over AT would make AA and TT.
        assert!(!has(false, 6, 7, "AT"));
        assert!(has(false, 8, 7, "TA"));
    }

    #[test]
    fn single_tiles_are_reported_once() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["AT", "TA"]);
        // T at (8, 7) makes TA across and AT down.
        let board_tiles = standard_board_with(&[(7, 7, "A", false), (8, 8, "A", false)]);
        let outcome = gen_checked(&game_config, &kwg, &board_tiles, &rack("T"));
        let dim = game_config.board_layout().dim();
        let mut squares = outcome
            .plays
            .iter()
            .map(|play| {
                let placements = play.placements(dim);
                assert_eq!(placements.len(), 1);
                (placements[0].row, placements[0].col)
            })
            .collect::<Vec<_>>();
        let num_plays = squares.len();
        squares.sort();
        squares.dedup();
        assert_eq!(squares.len(), num_plays);
        // (6,7) (7,6) (7,8) (8,7) around the first A, (7,8) (8,9) (9,8) (8,7) around the second.
        assert_eq!(
            squares,
            vec![(6, 7), (7, 6), (7, 8), (8, 7), (8, 9), (9, 8)]
        );
        // the shared square counts both words: TA across + AT down.
        let shared = outcome
            .plays
            .iter()
            .find(|play| play.placements(dim)[0].row == 8 && play.placements(dim)[0].col == 7)
            .unwrap();
        assert!(matches!(shared, Play::Place { down: false, .. }));
        assert_eq!(shared.score(), 4);
    }

    #[test]
    fn blanks_stand_in_for_missing_letters() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["ZA"]);
        let outcome = gen_checked(&game_config, &kwg, &[0u8; 225], &rack("?A"));
        assert!(!outcome.plays.is_empty());
        for play in &outcome.plays {
            // blank as Z is worth nothing, A is doubled.
            assert_eq!(play.score(), 2);
            assert_eq!(play.tiles_used().iter().filter(|&&t| t == 0).count(), 1);
        }
    }

    #[test]
    fn exchange_or_pass_without_moves() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["AT"]);
        let board_tiles = vec![0u8; 225];
        let board_snapshot = board::BoardSnapshot {
            board_tiles: &board_tiles,
            game_config: &game_config,
            kwg: &kwg,
        };
        let mut move_generator = MoveGenerator::new(&game_config);
        let qvw = rack("QVW");
        let mut params = GenMovesParams {
            board_snapshot: &board_snapshot,
            rack: &qvw,
            bag_size: 20,
            deadline: None,
        };
        let outcome = move_generator.gen_moves(&params).unwrap();
        assert!(outcome.no_legal_move());
        assert!(outcome.exchange_possible);
        params.bag_size = 0;
        let outcome = move_generator.gen_moves(&params).unwrap();
        assert!(outcome.must_pass());
    }

    #[test]
    fn expired_deadline_is_a_timeout() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["AT"]);
        let board_tiles = vec![0u8; 225];
        let board_snapshot = board::BoardSnapshot {
            board_tiles: &board_tiles,
            game_config: &game_config,
            kwg: &kwg,
        };
        let at = rack("AT");
        let result = MoveGenerator::new(&game_config).gen_moves(&GenMovesParams {
            board_snapshot: &board_snapshot,
            rack: &at,
            bag_size: 20,
            deadline: Some(std::time::Instant::now()),
        });
        assert!(matches!(
            result,
            Err(error::EngineError::SearchTimeout { .. })
        ));
    }

    #[test]
    fn rejects_bad_input() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["AT"]);
        let dawg_only =
            kwg::Kwg::from_sorted_words(crate::build::BuildFormat::DawgOnly, &[rack("AT").into()])
                .unwrap();
        let board_tiles = vec![0u8; 225];
        let short_board = vec![0u8; 100];
        let at = rack("AT");
        let too_many = rack("AAAAAAAA");
        let mut move_generator = MoveGenerator::new(&game_config);
        for (board_tiles, rack, kwg, expect_rack_error) in [
            (&short_board[..], &at[..], &kwg, false),
            (&board_tiles[..], &too_many[..], &kwg, true),
        ] {
            let result = move_generator.gen_moves(&GenMovesParams {
                board_snapshot: &board::BoardSnapshot {
                    board_tiles,
                    game_config: &game_config,
                    kwg,
                },
                rack,
                bag_size: 0,
                deadline: None,
            });
            match result {
                Err(error::EngineError::InvalidRackState(_)) => assert!(expect_rack_error),
                Err(error::EngineError::InvalidBoard(_)) => assert!(!expect_rack_error),
                _ => panic!("unexpected outcome"),
            }
        }
        assert!(matches!(
            move_generator.gen_moves(&GenMovesParams {
                board_snapshot: &board::BoardSnapshot {
                    board_tiles: &board_tiles,
                    game_config: &game_config,
                    kwg: &dawg_only,
                },
                rack: &at,
                bag_size: 0,
                deadline: None,
            }),
            Err(error::EngineError::CorruptLexicon(_))
        ));
    }

    #[test]
    fn rejects_tiles_that_do_not_exist() {
        let game_config = game_config::make_english_game_config();
        let kwg = english_kwg(&["ZZ"]);
        let empty_board = vec![0u8; 225];
        let z_on_board = standard_board_with(&[(7, 7, "Z", false)]);
        let zzz = rack("ZZZ");
        let z = rack("Z");
        let mut move_generator = MoveGenerator::new(&game_config);
        for (board_tiles, rack) in [(&empty_board, &zzz), (&z_on_board, &z)] {
            assert!(matches!(
                move_generator.gen_moves(&GenMovesParams {
                    board_snapshot: &board::BoardSnapshot {
                        board_tiles,
                        game_config: &game_config,
                        kwg: &kwg,
                    },
                    rack,
                    bag_size: 50,
                    deadline: None,
                }),
                Err(error::EngineError::InvalidRackState(_))
            ));
        }
    }

    #[test]
    fn rejects_lexicon_beyond_the_alphabet() {
        let game_config = game_config::make_english_game_config();
        let mut bytes = english_kwg(&["AT"]).to_bytes();
        // T (20) becomes 30, which English does not have.
        for node in bytes.chunks_exact_mut(4) {
            if node[3] == 20 {
                node[3] = 30;
            }
        }
        let kwg = kwg::Kwg::from_bytes(&bytes).unwrap();
        assert_eq!(kwg.max_tile(), 30);
        let board_tiles = vec![0u8; 225];
        let at = rack("AT");
        assert!(matches!(
            MoveGenerator::new(&game_config).gen_moves(&GenMovesParams {
                board_snapshot: &board::BoardSnapshot {
                    board_tiles: &board_tiles,
                    game_config: &game_config,
                    kwg: &kwg,
                },
                rack: &at,
                bag_size: 50,
                deadline: None,
            }),
            Err(error::EngineError::CorruptLexicon(_))
        ));
    }

    #[test]
    fn clock_looks_at_the_time_every_1024_ticks() {
        let mut clock = Clock {
            deadline: Some(std::time::Instant::now()),
            ticks: 0,
            timed_out: false,
        };
        for _ in 0..1023 {
            assert!(!clock.out_of_time());
        }
        assert!(clock.out_of_time());
        assert!(clock.out_of_time());
        let mut unlimited = Clock {
            deadline: None,
            ticks: 0,
            timed_out: false,
        };
        for _ in 0..5000 {
            assert!(!unlimited.out_of_time());
        }
    }

    #[test]
    fn timeout_during_search_discards_partial_plays() {
        let game_config = game_config::make_english_game_config();
        // every string of A to H with 2 to 5 letters.
        let mut words = Vec::<Box<[u8]>>::new();
        let mut prefixes = vec![Vec::<u8>::new()];
        for len in 1..=5 {
            prefixes = prefixes
                .iter()
                .flat_map(|prefix| {
                    (1..=8).map(move |tile| {
                        let mut word = prefix.clone();
                        word.push(tile);
                        word
                    })
                })
                .collect();
            if len >= 2 {
                words.extend(prefixes.iter().map(|word| word.clone().into_boxed_slice()));
            }
        }
        words.sort();
        let kwg = kwg::Kwg::from_sorted_words(crate::build::BuildFormat::Gaddawg, &words).unwrap();
        let board_tiles = vec![0u8; 225];
        let board_snapshot = board::BoardSnapshot {
            board_tiles: &board_tiles,
            game_config: &game_config,
            kwg: &kwg,
        };
        let tiles = rack("??ABCDE");
        let mut move_generator = MoveGenerator::new(&game_config);
        let result = move_generator.gen_moves(&GenMovesParams {
            board_snapshot: &board_snapshot,
            rack: &tiles,
            bag_size: 50,
            deadline: Some(std::time::Instant::now() + std::time::Duration::from_millis(2)),
        });
        assert!(matches!(
            result,
            Err(error::EngineError::SearchTimeout { .. })
        ));
        assert!(move_generator.plays.is_empty());
        // the same generator still works without a deadline.
        let outcome = move_generator
            .gen_moves(&GenMovesParams {
                board_snapshot: &board_snapshot,
                rack: &tiles,
                bag_size: 50,
                deadline: None,
            })
            .unwrap();
        assert!(outcome.plays.len() > 10000);
    }
}
