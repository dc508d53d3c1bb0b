// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board, kwg, movegen};

// Checks every word a play forms against some other vocabulary.
#[derive(Clone)]
pub struct LimitedVocabChecker {
    word_check_buf: Vec<u8>,
}

impl LimitedVocabChecker {
    pub fn new() -> Self {
        Self {
            word_check_buf: Vec::new(),
        }
    }

    // word_is_ok sees natural tiles only; blanks are unmarked.
    pub fn words_placed_are_ok<WordIsOk: FnMut(&[u8]) -> bool>(
        &mut self,
        board_snapshot: &board::BoardSnapshot<'_>,
        play: &movegen::Play,
        mut word_is_ok: WordIsOk,
    ) -> bool {
        let (down, lane, idx, word) = match play {
            movegen::Play::Exchange { .. } => return true,
            movegen::Play::Place {
                down,
                lane,
                idx,
                word,
                ..
            } => (*down, *lane, *idx, word),
        };
        let dim = board_snapshot.game_config.board_layout().dim();
        let strider = dim.lane(down, lane);
        self.word_check_buf.clear();
        for (i, &tile) in (idx..).zip(word.iter()) {
            let placed_tile = if tile != 0 {
                tile
            } else {
                board_snapshot.board_tiles[strider.at(i)]
            };
            self.word_check_buf.push(placed_tile & 0x7f);
        }
        if !word_is_ok(&self.word_check_buf) {
            return false;
        }
        for (i, &tile) in (idx..).zip(word.iter()) {
            if tile == 0 {
                continue;
            }
            let perpendicular_strider = dim.lane(!down, i);
            let mut j = lane;
            while j > 0 && board_snapshot.board_tiles[perpendicular_strider.at(j - 1)] != 0 {
                j -= 1;
            }
            let perpendicular_strider_len = perpendicular_strider.len();
            if j == lane
                && (j + 1 >= perpendicular_strider_len
                    || board_snapshot.board_tiles[perpendicular_strider.at(j + 1)] == 0)
            {
                // no perpendicular tile
                continue;
            }
            self.word_check_buf.clear();
            for j in j..perpendicular_strider_len {
                let placed_tile = if j == lane {
                    tile
                } else {
                    board_snapshot.board_tiles[perpendicular_strider.at(j)]
                };
                if placed_tile == 0 {
                    break;
                }
                self.word_check_buf.push(placed_tile & 0x7f);
            }
            if !word_is_ok(&self.word_check_buf) {
                return false;
            }
        }
        true
    }

    #[inline(always)]
    pub fn words_are_in(
        &mut self,
        board_snapshot: &board::BoardSnapshot<'_>,
        play: &movegen::Play,
        vocab: &kwg::Kwg,
    ) -> bool {
        self.words_placed_are_ok(board_snapshot, play, |word| vocab.accepts(word))
    }

    // Keeps order.
    pub fn filter_plays<'p>(
        &mut self,
        board_snapshot: &board::BoardSnapshot<'_>,
        plays: &'p [movegen::Play],
        vocab: &kwg::Kwg,
    ) -> Vec<&'p movegen::Play> {
        plays
            .iter()
            .filter(|play| self.words_are_in(board_snapshot, play, vocab))
            .collect()
    }
}

impl Default for LimitedVocabChecker {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
