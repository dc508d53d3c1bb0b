// Copyright (C) 2020-2026 Andy Kurnia.

use super::{bag, error, game_config, movegen};
use rand::prelude::*;

fn use_tiles<II: IntoIterator<Item = u8>>(
    rack: &mut Vec<u8>,
    tiles_iter: II,
) -> error::Returns<()> {
    // the rack is left alone unless every tile is there.
    let mut remaining = rack.clone();
    for tile in tiles_iter {
        let pos = remaining.iter().rposition(|&t| t == tile).ok_or("bad tile")?;
        remaining.swap_remove(pos);
    }
    *rack = remaining;
    Ok(())
}

#[derive(Clone, Debug)]
pub struct GamePlayer {
    pub score: i16,
    pub rack: Vec<u8>,
}

#[derive(Clone)]
pub struct GameState<'a> {
    pub game_config: &'a game_config::GameConfig<'a>,
    pub players: Box<[GamePlayer]>,
    pub board_tiles: Box<[u8]>,
    pub bag: bag::Bag,
    pub turn: u8,
    pub num_scoreless_turns: u16,
}

impl<'a> GameState<'a> {
    pub fn new(game_config: &'a game_config::GameConfig<'a>) -> Self {
        let dim = game_config.board_layout().dim();
        let rack_size = game_config.rack_size() as usize;
        Self {
            game_config,
            players: (0..game_config.num_players())
                .map(|_| GamePlayer {
                    score: 0,
                    rack: Vec::with_capacity(rack_size),
                })
                .collect(),
            board_tiles: vec![0u8; dim.area()].into_boxed_slice(),
            bag: bag::Bag::new(game_config.alphabet()),
            turn: 0,
            num_scoreless_turns: 0,
        }
    }

    // shuffles the bag and deals to every player.
    pub fn reset_and_draw_tiles(&mut self, rng: &mut dyn RngCore) {
        self.players.iter_mut().for_each(|player| {
            player.score = 0;
            player.rack.clear();
        });
        self.board_tiles.iter_mut().for_each(|m| *m = 0);
        self.bag = bag::Bag::new(self.game_config.alphabet());
        self.bag.shuffle(rng);
        self.turn = 0;
        self.num_scoreless_turns = 0;
        let rack_size = self.game_config.rack_size() as usize;
        for player in self.players.iter_mut() {
            self.bag.replenish(&mut player.rack, rack_size);
        }
    }

    #[inline(always)]
    pub fn current_player(&self) -> &GamePlayer {
        &self.players[self.turn as usize]
    }

    // an empty exchange is a pass.
    pub fn play(&mut self, rng: &mut dyn RngCore, play: &movegen::Play) -> error::Returns<()> {
        let rack_size = self.game_config.rack_size() as usize;
        let current_player = &mut self.players[self.turn as usize];
        match play {
            movegen::Play::Exchange { tiles } => {
                if !tiles.is_empty() && !self.game_config.can_exchange(self.bag.len()) {
                    return_error!(format!(
                        "cannot exchange with {} tiles in the bag",
                        self.bag.len()
                    ));
                }
                use_tiles(&mut current_player.rack, tiles.iter().copied())?;
                self.bag.replenish(&mut current_player.rack, rack_size);
                self.bag.put_back(rng, tiles);
                self.num_scoreless_turns += 1;
            }
            movegen::Play::Place {
                down,
                lane,
                idx,
                word,
                score,
            } => {
                use_tiles(&mut current_player.rack, play.tiles_used())?;
                let strider = self.game_config.board_layout().dim().lane(*down, *lane);
                for (i, &tile) in (*idx..).zip(word.iter()) {
                    if tile != 0 {
                        self.board_tiles[strider.at(i)] = tile;
                    }
                }
                current_player.score += score;
                self.bag.replenish(&mut current_player.rack, rack_size);
                if *score == 0 {
                    self.num_scoreless_turns += 1;
                } else {
                    self.num_scoreless_turns = 0;
                }
            }
        }
        Ok(())
    }

    pub fn next_turn(&mut self) {
        self.turn += 1;
        if self.turn as usize >= self.players.len() {
            self.turn = 0;
        }
    }

    // someone went out, or three scoreless turns in a row per player.
    pub fn is_game_over(&self) -> bool {
        (self.bag.is_empty() && self.players.iter().any(|player| player.rack.is_empty()))
            || self.num_scoreless_turns >= 3 * self.players.len() as u16
    }

    // deducts unplayed tiles. a player who went out gains what the others held.
    pub fn finalize_scores(&mut self) {
        let alphabet = self.game_config.alphabet();
        let rack_values = self
            .players
            .iter()
            .map(|player| {
                player
                    .rack
                    .iter()
                    .map(|&tile| alphabet.score(tile) as i16)
                    .sum::<i16>()
            })
            .collect::<Vec<_>>();
        let total = rack_values.iter().sum::<i16>();
        for (player, &rack_value) in self.players.iter_mut().zip(rack_values.iter()) {
            if player.rack.is_empty() {
                player.score += total;
            } else {
                player.score -= rack_value;
            }
        }
    }
}
