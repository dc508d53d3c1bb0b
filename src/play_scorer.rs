// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board, matrix, movegen};

// Recounts and re-verifies plays without the generator's cross sets.
pub struct PlayScorer {
    rack_tally: Vec<u8>,
}

impl PlayScorer {
    pub fn new() -> Self {
        Self {
            rack_tally: Vec::new(),
        }
    }

    // Every placement rule plus every word formed.
    pub fn validate_play(
        &mut self,
        board_snapshot: &board::BoardSnapshot<'_>,
        rack: &[u8],
        play: &movegen::Play,
    ) -> Result<(), String> {
        let game_config = board_snapshot.game_config;
        let alphabet = game_config.alphabet();
        self.rack_tally.clear();
        self.rack_tally.resize(alphabet.len() as usize, 0);
        for &tile in rack {
            if tile as usize >= self.rack_tally.len() {
                return Err(format!("rack has invalid tile {}", tile));
            }
            self.rack_tally[tile as usize] += 1;
        }

        match play {
            movegen::Play::Exchange { tiles } => {
                for &tile in tiles.iter() {
                    match self.rack_tally.get_mut(tile as usize) {
                        Some(count) if *count > 0 => *count -= 1,
                        _ => return Err(format!("exchanging {} not on rack", tile)),
                    }
                }
                Ok(())
            }
            movegen::Play::Place {
                down,
                lane,
                idx,
                word,
                ..
            } => {
                let board_layout = game_config.board_layout();
                let dim = board_layout.dim();
                let board_tiles = board_snapshot.board_tiles;
                if *lane < 0 || *lane >= dim.num_lanes(*down) {
                    return Err(format!("lane {} is off the board", lane));
                }
                let strider = dim.lane(*down, *lane);
                let word_len = word.len() as isize;
                if word_len < 2 || *idx < 0 || (*idx as isize) + word_len > strider.len() as isize
                {
                    return Err(format!(
                        "{} tiles from {} do not fit in a lane of {}",
                        word_len,
                        idx,
                        strider.len()
                    ));
                }
                let idx_end = *idx + word_len as i8;
                if (*idx > 0 && board_tiles[strider.at(*idx - 1)] != 0)
                    || (idx_end < strider.len() && board_tiles[strider.at(idx_end)] != 0)
                {
                    return Err("word continues into adjacent tiles".into());
                }

                let mut num_played = 0;
                let mut connected = false;
                let mut covers_star = false;
                let star = dim.at_row_col(board_layout.star_row(), board_layout.star_col());
                for (i, &tile) in (*idx..).zip(word.iter()) {
                    let square = strider.at(i);
                    let b = board_tiles[square];
                    if tile == 0 {
                        if b == 0 {
                            return Err(format!("nothing to play through at {}", i));
                        }
                        connected = true;
                        continue;
                    }
                    if b != 0 {
                        return Err(format!("square {} is already taken", i));
                    }
                    let letter = tile & 0x7f;
                    if letter == 0 || letter >= alphabet.len() {
                        return Err(format!("invalid tile {}", tile));
                    }
                    let rack_tile = (if tile & 0x80 != 0 { 0 } else { letter }) as usize;
                    if self.rack_tally[rack_tile] == 0 {
                        return Err(format!(
                            "rack has no {}",
                            alphabet.from_rack(rack_tile as u8).unwrap_or("#")
                        ));
                    }
                    self.rack_tally[rack_tile] -= 1;
                    num_played += 1;
                    covers_star |= square == star;
                    let perpendicular_strider = dim.lane(!*down, i);
                    connected |= (*lane > 0
                        && board_tiles[perpendicular_strider.at(*lane - 1)] != 0)
                        || (*lane + 1 < perpendicular_strider.len()
                            && board_tiles[perpendicular_strider.at(*lane + 1)] != 0);
                }
                if num_played == 0 {
                    return Err("no tile placed".into());
                }
                if board_tiles.iter().all(|&t| t == 0) {
                    if !covers_star {
                        return Err("first play must cover the star".into());
                    }
                } else if !connected {
                    return Err("play does not touch any tile".into());
                }

                let main_word = play.main_word(board_tiles, dim);
                if !board_snapshot.kwg.accepts(&main_word) {
                    return Err(format!("{} is not a word", alphabet.fmt_word(&main_word)));
                }
                for (i, &tile) in (*idx..).zip(word.iter()) {
                    if tile == 0 {
                        continue;
                    }
                    if let Some(perpendicular_word) =
                        perpendicular_word(board_tiles, dim.lane(!*down, i), *lane, tile)
                    {
                        if !board_snapshot.kwg.accepts(&perpendicular_word) {
                            return Err(format!(
                                "{} is not a word",
                                alphabet.fmt_word(&perpendicular_word)
                            ));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    // Assume play is valid.
    pub fn compute_score(
        &mut self,
        board_snapshot: &board::BoardSnapshot<'_>,
        play: &movegen::Play,
    ) -> i16 {
        let game_config = board_snapshot.game_config;

        let mut recounted_score = 0;
        match play {
            movegen::Play::Exchange { .. } => {}
            movegen::Play::Place {
                down,
                lane,
                idx,
                word,
                ..
            } => {
                let alphabet = game_config.alphabet();
                let board_layout = game_config.board_layout();
                let premiums = board_layout.premiums();
                let dim = board_layout.dim();
                let strider = dim.lane(*down, *lane);
                let mut num_played = 0;

                {
                    let mut word_multiplier = 1;
                    let mut word_score = 0i16;
                    for (i, &tile) in (*idx..).zip(word.iter()) {
                        let square = strider.at(i);
                        let premium = premiums[square];
                        let tile_score = if tile != 0 {
                            num_played += 1;
                            word_multiplier *= premium.word_multiplier;
                            alphabet.score(tile) as i16 * premium.tile_multiplier as i16
                        } else {
                            // bonuses only count the turn a square is covered.
                            alphabet.score(board_snapshot.board_tiles[square]) as i16
                        };
                        word_score += tile_score;
                    }
                    recounted_score += word_score * word_multiplier as i16;
                }

                for (i, &tile) in (*idx..).zip(word.iter()) {
                    if tile == 0 {
                        continue;
                    }
                    let perpendicular_strider = dim.lane(!*down, i);
                    if perpendicular_word(board_snapshot.board_tiles, perpendicular_strider, *lane, tile)
                        .is_none()
                    {
                        continue;
                    }
                    let premium = premiums[perpendicular_strider.at(*lane)];
                    let mut word_score =
                        alphabet.score(tile) as i16 * premium.tile_multiplier as i16;
                    let mut j = *lane - 1;
                    while j >= 0 {
                        let b = board_snapshot.board_tiles[perpendicular_strider.at(j)];
                        if b == 0 {
                            break;
                        }
                        word_score += alphabet.score(b) as i16;
                        j -= 1;
                    }
                    let mut j = *lane + 1;
                    while j < perpendicular_strider.len() {
                        let b = board_snapshot.board_tiles[perpendicular_strider.at(j)];
                        if b == 0 {
                            break;
                        }
                        word_score += alphabet.score(b) as i16;
                        j += 1;
                    }
                    recounted_score += word_score * premium.word_multiplier as i16;
                }
                recounted_score += game_config.num_played_bonus(num_played);
            }
        };

        recounted_score
    }
}

impl Default for PlayScorer {
    fn default() -> Self {
        Self::new()
    }
}

// The word formed across `strider` by putting tile at index `at`, if any
// neighbor along the strider is occupied.
fn perpendicular_word(
    board_tiles: &[u8],
    strider: matrix::Strider,
    at: i8,
    tile: u8,
) -> Option<Box<[u8]>> {
    let mut start = at;
    while start > 0 && board_tiles[strider.at(start - 1)] != 0 {
        start -= 1;
    }
    let mut end = at + 1;
    while end < strider.len() && board_tiles[strider.at(end)] != 0 {
        end += 1;
    }
    if end - start < 2 {
        return None;
    }
    Some(
        (start..end)
            .map(|j| if j == at { tile } else { board_tiles[strider.at(j)] })
            .collect(),
    )
}
