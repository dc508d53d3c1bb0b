// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board_layout, error, game_config, kwg, matrix};

// Everything a move computation reads. Tiles are row-major, 0 is empty,
// t | 0x80 is a blank designated as t.
pub struct BoardSnapshot<'a> {
    pub board_tiles: &'a [u8],
    pub game_config: &'a game_config::GameConfig<'a>,
    pub kwg: &'a kwg::Kwg,
}

// bits == 0: no perpendicular tiles, anything goes.
// otherwise bit 0 is set and bit t means tile t completes a valid word.
// score is the face value of the perpendicular tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrossSet {
    pub bits: u64,
    pub score: i16,
}

impl CrossSet {
    #[inline(always)]
    pub fn is_constrained(&self) -> bool {
        self.bits != 0
    }

    #[inline(always)]
    pub fn allows(&self, tile: u8) -> bool {
        self.bits == 0 || self.bits & (1 << (tile & 0x7f)) != 0
    }
}

// Fills the cross sets of the empty squares along one lane, as seen by plays
// perpendicular to that lane. Runs are read bottom-up through the gaddag.
fn gen_cross_set(
    board_snapshot: &BoardSnapshot<'_>,
    strider: matrix::Strider,
    cross_sets: &mut [CrossSet],
) {
    let board_tiles = board_snapshot.board_tiles;
    let kwg = board_snapshot.kwg;
    let alphabet = board_snapshot.game_config.alphabet();
    let len = strider.len();
    for i in 0..len {
        cross_sets[strider.at(i)] = CrossSet::default();
    }

    let mut p = kwg::GADDAG_ROOT;
    let mut score = 0i16;
    let mut k = len;
    for j in (0..len).rev() {
        let b = board_tiles[strider.at(j)];
        if b == 0 {
            p = kwg::GADDAG_ROOT;
            score = 0;
            k = j;
            continue;
        }
        if p > 0 {
            p = kwg.seek(p, b & 0x7f);
        }
        score += alphabet.score(b) as i16;
        if j > 0 && board_tiles[strider.at(j - 1)] != 0 {
            continue;
        }

        // tiles from j inclusive to k exclusive.
        if k < len && !(k + 1 < len && board_tiles[strider.at(k + 1)] != 0) {
            // the square after the run, with nothing beyond it.
            let mut bits = 1u64;
            if let Some(q) = kwg.child(p, 0) {
                let mut q = kwg[q].arc_index();
                if q > 0 {
                    loop {
                        let node = kwg[q];
                        if node.accepts() {
                            bits |= 1 << node.tile();
                        }
                        if node.is_end() {
                            break;
                        }
                        q += 1;
                    }
                }
            }
            cross_sets[strider.at(k)] = CrossSet { bits, score };
        }

        if j > 0 {
            // the square before the run. squares before it may hold another run.
            let mut bits = 1u64;
            if p > 0 {
                let mut q = kwg[p].arc_index();
                if q > 0 {
                    loop {
                        let node = kwg[q];
                        if node.tile() != 0 {
                            let mut r = q;
                            for i in (0..j - 1).rev() {
                                let b = board_tiles[strider.at(i)];
                                if b == 0 {
                                    break;
                                }
                                r = kwg.seek(r, b & 0x7f);
                                if r <= 0 {
                                    break;
                                }
                            }
                            if r > 0 && kwg[r].accepts() {
                                bits |= 1 << node.tile();
                            }
                        }
                        if node.is_end() {
                            break;
                        }
                        q += 1;
                    }
                }
            }
            for i in (0..j - 1).rev() {
                let b = board_tiles[strider.at(i)];
                if b == 0 {
                    break;
                }
                score += alphabet.score(b) as i16;
            }
            cross_sets[strider.at(j - 1)] = CrossSet { bits, score };
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Square {
    pub row: i8,
    pub col: i8,
    // 0 when empty.
    pub tile: u8,
    pub premium: board_layout::Premium,
    // letters allowed for a play across (resp. down) through this square.
    pub across_letters: u64,
    pub down_letters: u64,
    pub is_anchor: bool,
}

// Derived state for one board position. Not incremental: recompute after
// every committed move.
pub struct CrossChecks {
    dim: matrix::Dim,
    letters_mask: u64,
    tiles: Box<[u8]>,
    premiums: Box<[board_layout::Premium]>,
    // indexed by square. across plays are constrained by the columns.
    for_across_plays: Box<[CrossSet]>,
    for_down_plays: Box<[CrossSet]>,
    anchors: Box<[bool]>,
    // the star square, only while the board is empty.
    star: Option<usize>,
}

impl CrossChecks {
    pub fn new(game_config: &game_config::GameConfig<'_>) -> Self {
        let board_layout = game_config.board_layout();
        let area = board_layout.dim().area();
        Self {
            dim: board_layout.dim(),
            letters_mask: game_config.alphabet().letters_mask(),
            tiles: vec![0u8; area].into_boxed_slice(),
            premiums: board_layout.premiums().into(),
            for_across_plays: vec![CrossSet::default(); area].into_boxed_slice(),
            for_down_plays: vec![CrossSet::default(); area].into_boxed_slice(),
            anchors: vec![false; area].into_boxed_slice(),
            star: None,
        }
    }

    // board_tiles must cover the whole layout.
    pub fn compute(board_snapshot: &BoardSnapshot<'_>) -> Self {
        let mut cross_checks = Self::new(board_snapshot.game_config);
        cross_checks.recompute(board_snapshot);
        cross_checks
    }

    pub fn recompute(&mut self, board_snapshot: &BoardSnapshot<'_>) {
        let dim = self.dim;
        let board_tiles = board_snapshot.board_tiles;
        self.tiles.copy_from_slice(board_tiles);
        for col in 0..dim.cols {
            gen_cross_set(board_snapshot, dim.down(col), &mut self.for_across_plays);
        }
        for row in 0..dim.rows {
            gen_cross_set(board_snapshot, dim.across(row), &mut self.for_down_plays);
        }
        self.star = if board_tiles.iter().all(|&t| t == 0) {
            let board_layout = board_snapshot.game_config.board_layout();
            Some(dim.at_row_col(board_layout.star_row(), board_layout.star_col()))
        } else {
            None
        };
        // a square next to a tile always gets a constrained cross set.
        for (idx, anchor) in self.anchors.iter_mut().enumerate() {
            *anchor = board_tiles[idx] == 0
                && (self.for_across_plays[idx].is_constrained()
                    || self.for_down_plays[idx].is_constrained());
        }
        if let Some(star) = self.star {
            self.anchors[star] = true;
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> matrix::Dim {
        self.dim
    }

    #[inline(always)]
    pub fn for_plays(&self, down: bool) -> &[CrossSet] {
        if down {
            &self.for_down_plays
        } else {
            &self.for_across_plays
        }
    }

    #[inline(always)]
    pub fn star(&self) -> Option<usize> {
        self.star
    }

    #[inline(always)]
    pub fn is_empty_board(&self) -> bool {
        self.star.is_some()
    }

    // Letters that may be placed at (row, col) by a play in that direction.
    // Empty for occupied squares.
    pub fn cross_check(&self, row: i8, col: i8, down: bool) -> u64 {
        let idx = self.dim.at_row_col(row, col);
        if self.tiles[idx] != 0 {
            return 0;
        }
        let cross_set = self.for_plays(down)[idx];
        if cross_set.is_constrained() {
            cross_set.bits & self.letters_mask
        } else {
            self.letters_mask
        }
    }

    #[inline(always)]
    pub fn is_anchor(&self, row: i8, col: i8) -> bool {
        self.anchors[self.dim.at_row_col(row, col)]
    }

    pub fn anchors(&self) -> Vec<(i8, i8)> {
        self.anchors
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a)
            .map(|(idx, _)| self.dim.row_col(idx))
            .collect()
    }

    pub fn square(&self, row: i8, col: i8) -> Square {
        let idx = self.dim.at_row_col(row, col);
        Square {
            row,
            col,
            tile: self.tiles[idx],
            premium: self.premiums[idx],
            across_letters: self.cross_check(row, col, false),
            down_letters: self.cross_check(row, col, true),
            is_anchor: self.anchors[idx],
        }
    }
}

// Shape and tile range only.
pub fn check_board_tiles(
    game_config: &game_config::GameConfig<'_>,
    board_tiles: &[u8],
) -> error::EngineResult<()> {
    let dim = game_config.board_layout().dim();
    if board_tiles.len() != dim.area() {
        return Err(error::EngineError::InvalidBoard(format!(
            "expected {}x{} squares, got {}",
            dim.rows,
            dim.cols,
            board_tiles.len()
        )));
    }
    let alphabet_len = game_config.alphabet().len();
    for (idx, &tile) in board_tiles.iter().enumerate() {
        if tile != 0 && (tile & 0x7f == 0 || tile & 0x7f >= alphabet_len) {
            let (row, col) = dim.row_col(idx);
            return Err(error::EngineError::InvalidBoard(format!(
                "invalid tile {} at row {} col {}",
                tile, row, col
            )));
        }
    }
    Ok(())
}

pub fn check_rack(game_config: &game_config::GameConfig<'_>, rack: &[u8]) -> error::EngineResult<()> {
    if rack.len() > game_config.rack_size() as usize {
        return Err(error::EngineError::InvalidRackState(format!(
            "{} tiles on a rack of {}",
            rack.len(),
            game_config.rack_size()
        )));
    }
    let alphabet_len = game_config.alphabet().len();
    if let Some(&tile) = rack.iter().find(|&&tile| tile >= alphabet_len) {
        return Err(error::EngineError::InvalidRackState(format!(
            "invalid tile {} on rack",
            tile
        )));
    }
    Ok(())
}

// Board plus rack must fit in the tile distribution. Board blanks count as
// blanks.
pub fn check_tile_counts(
    game_config: &game_config::GameConfig<'_>,
    board_tiles: &[u8],
    rack: &[u8],
) -> error::EngineResult<()> {
    let alphabet = game_config.alphabet();
    let mut counts = vec![0usize; alphabet.len() as usize];
    for &tile in board_tiles.iter().filter(|&&t| t != 0) {
        counts[if tile & 0x80 != 0 { 0 } else { tile as usize }] += 1;
    }
    for (tile, &count) in counts.iter().enumerate() {
        if count > alphabet.freq(tile as u8) as usize {
            return Err(error::EngineError::InvalidBoard(format!(
                "{} copies of {} on the board, only {} exist",
                count,
                alphabet.from_rack(tile as u8).unwrap_or("#"),
                alphabet.freq(tile as u8)
            )));
        }
    }
    for &tile in rack {
        counts[tile as usize] += 1;
    }
    for (tile, &count) in counts.iter().enumerate() {
        if count > alphabet.freq(tile as u8) as usize {
            return Err(error::EngineError::InvalidRackState(format!(
                "rack holds {} that is already used up on the board",
                alphabet.from_rack(tile as u8).unwrap_or("#")
            )));
        }
    }
    Ok(())
}
