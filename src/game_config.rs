// Copyright (C) 2020-2026 Andy Kurnia.

use super::{alphabet, board_layout};

pub struct StaticGameConfig<'a> {
    alphabet: alphabet::Alphabet<'a>,
    board_layout: board_layout::BoardLayout,
    rack_size: i8,
    num_players: u8,
    full_rack_bonus: i16,
    // exchanging needs at least this many tiles left in the bag (>= 1).
    exchange_bag_minimum: i16,
}

pub enum GameConfig<'a> {
    Static(StaticGameConfig<'a>),
}

impl<'a> GameConfig<'a> {
    pub fn new(
        alphabet: alphabet::Alphabet<'a>,
        board_layout: board_layout::BoardLayout,
        rack_size: i8,
    ) -> Self {
        GameConfig::Static(StaticGameConfig {
            alphabet,
            board_layout,
            rack_size,
            num_players: 2,
            full_rack_bonus: 50,
            exchange_bag_minimum: 1,
        })
    }

    pub fn with_exchange_bag_minimum(mut self, exchange_bag_minimum: i16) -> Self {
        match &mut self {
            GameConfig::Static(x) => x.exchange_bag_minimum = exchange_bag_minimum.max(1),
        }
        self
    }

    #[inline(always)]
    pub fn alphabet(&self) -> &alphabet::Alphabet<'a> {
        match self {
            GameConfig::Static(x) => &x.alphabet,
        }
    }

    #[inline(always)]
    pub fn board_layout(&self) -> &board_layout::BoardLayout {
        match self {
            GameConfig::Static(x) => &x.board_layout,
        }
    }

    #[inline(always)]
    pub fn rack_size(&self) -> i8 {
        match self {
            GameConfig::Static(x) => x.rack_size,
        }
    }

    #[inline(always)]
    pub fn num_players(&self) -> u8 {
        match self {
            GameConfig::Static(x) => x.num_players,
        }
    }

    #[inline(always)]
    pub fn exchange_bag_minimum(&self) -> i16 {
        match self {
            GameConfig::Static(x) => x.exchange_bag_minimum,
        }
    }

    #[inline(always)]
    pub fn full_rack_bonus(&self) -> i16 {
        match self {
            GameConfig::Static(x) => x.full_rack_bonus,
        }
    }

    #[inline(always)]
    pub fn num_played_bonus(&self, num_played: i8) -> i16 {
        match self {
            GameConfig::Static(x) => {
                // branchless
                x.full_rack_bonus & -((num_played >= x.rack_size) as i16)
            }
        }
    }

    #[inline(always)]
    pub fn can_exchange(&self, bag_size: usize) -> bool {
        bag_size >= self.exchange_bag_minimum() as usize
    }
}

pub fn make_english_game_config() -> GameConfig<'static> {
    GameConfig::new(
        alphabet::make_english_alphabet(),
        board_layout::make_standard_board_layout(),
        7,
    )
}

pub fn make_icelandic_game_config() -> GameConfig<'static> {
    GameConfig::new(
        alphabet::make_icelandic_alphabet(),
        board_layout::make_standard_board_layout(),
        7,
    )
}

// tournament rule: exchanges need a full rack's worth of tiles in the bag.
pub fn make_english_tournament_game_config() -> GameConfig<'static> {
    make_english_game_config().with_exchange_bag_minimum(7)
}

pub fn make_game_config_by_name(language: &str) -> Option<GameConfig<'static>> {
    match language {
        "english" | "en" => Some(make_english_game_config()),
        "english-tournament" => Some(make_english_tournament_game_config()),
        "icelandic" | "is" => Some(make_icelandic_game_config()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rack_bonus_only_for_full_rack() {
        let game_config = make_english_game_config();
        assert_eq!(game_config.num_played_bonus(6), 0);
        assert_eq!(game_config.num_played_bonus(7), 50);
    }

    #[test]
    fn exchange_threshold() {
        let game_config = make_english_game_config();
        assert!(!game_config.can_exchange(0));
        assert!(game_config.can_exchange(1));
        let strict = make_english_tournament_game_config();
        assert!(!strict.can_exchange(6));
        assert!(strict.can_exchange(7));
    }

    #[test]
    fn named_configs() {
        assert!(make_game_config_by_name("icelandic").is_some());
        assert!(make_game_config_by_name("klingon").is_none());
        let is = make_game_config_by_name("is").unwrap();
        assert_eq!(is.alphabet().len(), 33);
        assert_eq!(is.rack_size(), 7);
    }
}
