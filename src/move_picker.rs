// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board, kwg, lexicon, move_filter, movegen, play_scorer};
use rand::prelude::*;
use std::sync::Arc;

// What a restricted robot does when none of its candidates are common words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    // the worst-scoring move of the full list.
    #[default]
    LowestScoring,
    PassOrExchange,
}

// Robot strength, as read from configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RobotConfig {
    MaxScore,
    RestrictedVocabulary {
        common_lexicon: String,
        #[serde(default)]
        fallback: Fallback,
    },
    Casual {
        common_lexicon: String,
        top_n: usize,
        #[serde(default)]
        fallback: Fallback,
    },
}

impl Default for RobotConfig {
    #[inline(always)]
    fn default() -> Self {
        RobotConfig::MaxScore
    }
}

pub enum MovePicker {
    MaxScore,
    RestrictedVocabulary {
        common: Arc<kwg::Kwg>,
        fallback: Fallback,
    },
    // a random pick among the best top_n common-word moves.
    Casual {
        common: Arc<kwg::Kwg>,
        top_n: usize,
        fallback: Fallback,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Play(movegen::Play),
    Exchange { tiles: Box<[u8]> },
    Pass,
}

impl Decision {
    #[inline(always)]
    pub fn score(&self) -> i16 {
        match self {
            Decision::Play(play) => play.score(),
            Decision::Exchange { .. } | Decision::Pass => 0,
        }
    }

    // passing is exchanging nothing.
    pub fn to_play(&self) -> movegen::Play {
        match self {
            Decision::Play(play) => play.clone(),
            Decision::Exchange { tiles } => movegen::Play::Exchange {
                tiles: tiles.clone(),
            },
            Decision::Pass => movegen::Play::Exchange {
                tiles: Box::new([]),
            },
        }
    }
}

// Keeps blanks. Heaviest tiles go first when the bag cannot take them all.
pub fn choose_exchange(
    board_snapshot: &board::BoardSnapshot<'_>,
    rack: &[u8],
    bag_size: usize,
) -> Box<[u8]> {
    let alphabet = board_snapshot.game_config.alphabet();
    let mut tiles = rack.iter().copied().filter(|&t| t != 0).collect::<Vec<_>>();
    if tiles.is_empty() {
        tiles = rack.to_vec();
    }
    tiles.sort_by(|&a, &b| {
        alphabet
            .score(b)
            .cmp(&alphabet.score(a))
            .then_with(|| a.cmp(&b))
    });
    tiles.truncate(bag_size);
    tiles.sort_unstable();
    tiles.into_boxed_slice()
}

impl MovePicker {
    pub fn from_config(
        robot_config: &RobotConfig,
        registry: &lexicon::LexiconRegistry,
    ) -> Result<Self, String> {
        let common = |name: &str| {
            registry
                .get(name)
                .ok_or_else(|| format!("common-word lexicon {:?} is not loaded", name))
        };
        Ok(match robot_config {
            RobotConfig::MaxScore => MovePicker::MaxScore,
            RobotConfig::RestrictedVocabulary {
                common_lexicon,
                fallback,
            } => MovePicker::RestrictedVocabulary {
                common: common(common_lexicon)?,
                fallback: *fallback,
            },
            RobotConfig::Casual {
                common_lexicon,
                top_n,
                fallback,
            } => MovePicker::Casual {
                common: common(common_lexicon)?,
                top_n: (*top_n).max(1),
                fallback: *fallback,
            },
        })
    }

    fn no_move(params: &movegen::GenMovesParams<'_>, outcome: &movegen::GenOutcome) -> Decision {
        if outcome.exchange_possible {
            Decision::Exchange {
                tiles: choose_exchange(params.board_snapshot, params.rack, params.bag_size),
            }
        } else {
            Decision::Pass
        }
    }

    fn fall_back(
        fallback: Fallback,
        params: &movegen::GenMovesParams<'_>,
        outcome: &movegen::GenOutcome,
    ) -> Decision {
        tracing::warn!(?fallback, "no common-word move");
        match fallback {
            Fallback::LowestScoring => match outcome.plays.last() {
                Some(play) => Decision::Play(play.clone()),
                None => Self::no_move(params, outcome),
            },
            Fallback::PassOrExchange => Self::no_move(params, outcome),
        }
    }

    // outcome.plays must be sorted best first, as gen_moves returns them.
    pub fn pick(
        &self,
        params: &movegen::GenMovesParams<'_>,
        outcome: &movegen::GenOutcome,
        rng: &mut dyn RngCore,
    ) -> Decision {
        let decision = if outcome.no_legal_move() {
            Self::no_move(params, outcome)
        } else {
            match self {
                MovePicker::MaxScore => Decision::Play(outcome.plays[0].clone()),
                MovePicker::RestrictedVocabulary { common, fallback } => {
                    let mut checker = move_filter::LimitedVocabChecker::new();
                    match outcome
                        .plays
                        .iter()
                        .find(|play| checker.words_are_in(params.board_snapshot, play, common))
                    {
                        Some(play) => Decision::Play(play.clone()),
                        None => Self::fall_back(*fallback, params, outcome),
                    }
                }
                MovePicker::Casual {
                    common,
                    top_n,
                    fallback,
                } => {
                    let mut checker = move_filter::LimitedVocabChecker::new();
                    let mut candidates =
                        checker.filter_plays(params.board_snapshot, &outcome.plays, common);
                    candidates.truncate((*top_n).max(1));
                    if candidates.is_empty() {
                        Self::fall_back(*fallback, params, outcome)
                    } else {
                        Decision::Play(candidates[rng.random_range(0..candidates.len())].clone())
                    }
                }
            }
        };
        Self::verify(params, &decision);
        decision
    }

    // A generated move that fails the independent check is a defect.
    fn verify(params: &movegen::GenMovesParams<'_>, decision: &Decision) {
        if let Decision::Play(play) = decision {
            let mut play_scorer = play_scorer::PlayScorer::new();
            if let Err(e) = play_scorer.validate_play(params.board_snapshot, params.rack, play) {
                panic!("generated an illegal move {:?}: {}", play, e);
            }
            let recounted_score = play_scorer.compute_score(params.board_snapshot, play);
            if recounted_score != play.score() {
                panic!(
                    "generated {:?} scoring {}, recounted {}",
                    play,
                    play.score(),
                    recounted_score
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::standard_board_with;
    use crate::game_config;
    use crate::kwg::tests::english_kwg;

    struct Fixture {
        game_config: game_config::GameConfig<'static>,
        kwg: kwg::Kwg,
        board_tiles: Vec<u8>,
    }

    impl Fixture {
        fn new(words: &[&str], placed: &[(i8, i8, &str, bool)]) -> Self {
            Self {
                game_config: game_config::make_english_game_config(),
                kwg: english_kwg(words),
                board_tiles: standard_board_with(placed),
            }
        }

        fn decide(&self, move_picker: &MovePicker, rack: &[u8], bag_size: usize) -> Decision {
            let board_snapshot = board::BoardSnapshot {
                board_tiles: &self.board_tiles,
                game_config: &self.game_config,
                kwg: &self.kwg,
            };
            let params = movegen::GenMovesParams {
                board_snapshot: &board_snapshot,
                rack,
                bag_size,
                deadline: None,
            };
            let outcome = movegen::MoveGenerator::new(&self.game_config)
                .gen_moves(&params)
                .unwrap();
            let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
            move_picker.pick(&params, &outcome, &mut rng)
        }
    }

    fn main_word(fixture: &Fixture, decision: &Decision) -> Vec<u8> {
        match decision {
            Decision::Play(play) => play
                .main_word(
                    &fixture.board_tiles,
                    fixture.game_config.board_layout().dim(),
                )
                .to_vec(),
            _ => panic!("expected a play, got {:?}", decision),
        }
    }

    #[test]
    fn max_score_takes_the_top_move() {
        let fixture = Fixture::new(&["AX", "AT"], &[]);
        // AX on the star: (1 + 8) * 2.
        let decision = fixture.decide(&MovePicker::MaxScore, &[1, 20, 24], 50);
        assert_eq!(decision.score(), 18);
        assert_eq!(main_word(&fixture, &decision), vec![1, 24]);
    }

    #[test]
    fn restricted_vocabulary_prefers_common_words() {
        let fixture = Fixture::new(&["AX", "AT"], &[]);
        let move_picker = MovePicker::RestrictedVocabulary {
            common: Arc::new(english_kwg(&["AT"])),
            fallback: Fallback::LowestScoring,
        };
        let decision = fixture.decide(&move_picker, &[1, 20, 24], 50);
        assert_eq!(main_word(&fixture, &decision), vec![1, 20]);
        assert_eq!(decision.score(), 4);
    }

    #[test]
    fn restricted_vocabulary_fallbacks() {
        let fixture = Fixture::new(&["AX", "XU"], &[]);
        let common = Arc::new(english_kwg(&["AT"]));
        let lowest = MovePicker::RestrictedVocabulary {
            common: Arc::clone(&common),
            fallback: Fallback::LowestScoring,
        };
        // AX and XU both score 18.
        let decision = fixture.decide(&lowest, &[1, 21, 24], 50);
        assert!(matches!(decision, Decision::Play(_)));
        let strict = MovePicker::RestrictedVocabulary {
            common,
            fallback: Fallback::PassOrExchange,
        };
        assert_eq!(
            fixture.decide(&strict, &[1, 21, 24], 50),
            Decision::Exchange {
                tiles: [1, 21, 24].into()
            }
        );
        assert_eq!(fixture.decide(&strict, &[1, 21, 24], 0), Decision::Pass);
    }

    #[test]
    fn lowest_scoring_fallback_is_the_last_move() {
        let fixture = Fixture::new(&["AT", "ZA"], &[]);
        let move_picker = MovePicker::RestrictedVocabulary {
            common: Arc::new(english_kwg(&["QI"])),
            fallback: Fallback::LowestScoring,
        };
        let decision = fixture.decide(&move_picker, &[1, 20, 26], 50);
        // AT is worth 4, ZA 22.
        assert_eq!(main_word(&fixture, &decision), vec![1, 20]);
    }

    #[test]
    fn no_moves_means_exchange_or_pass() {
        let fixture = Fixture::new(&["AT"], &[]);
        assert_eq!(
            fixture.decide(&MovePicker::MaxScore, &[0, 17, 26], 2),
            Decision::Exchange {
                tiles: [17, 26].into()
            }
        );
        assert_eq!(
            fixture.decide(&MovePicker::MaxScore, &[17, 22, 26], 2),
            Decision::Exchange {
                tiles: [17, 26].into()
            }
        );
        assert_eq!(
            fixture.decide(&MovePicker::MaxScore, &[0, 17, 26], 0),
            Decision::Pass
        );
        assert_eq!(
            Decision::Pass.to_play(),
            movegen::Play::Exchange {
                tiles: Box::new([])
            }
        );
    }

    #[test]
    fn casual_picks_among_the_best_common_moves() {
        let fixture = Fixture::new(&["AT", "TA", "ZA"], &[]);
        let move_picker = MovePicker::Casual {
            common: Arc::new(english_kwg(&["AT", "TA"])),
            top_n: 3,
            fallback: Fallback::LowestScoring,
        };
        for _ in 0..4 {
            let decision = fixture.decide(&move_picker, &[1, 20, 26], 50);
            let word = main_word(&fixture, &decision);
            assert!(word == vec![1, 20] || word == vec![20, 1]);
            assert_eq!(decision.score(), 4);
        }
    }

    #[test]
    #[should_panic(expected = "recounted")]
    fn tampered_scores_fail_loudly() {
        let fixture = Fixture::new(&["AT"], &[]);
        let board_snapshot = board::BoardSnapshot {
            board_tiles: &fixture.board_tiles,
            game_config: &fixture.game_config,
            kwg: &fixture.kwg,
        };
        let params = movegen::GenMovesParams {
            board_snapshot: &board_snapshot,
            rack: &[1, 20],
            bag_size: 50,
            deadline: None,
        };
        let outcome = movegen::GenOutcome {
            plays: vec![movegen::Play::Place {
                down: false,
                lane: 7,
                idx: 7,
                word: [1, 20].into(),
                score: 40,
            }],
            exchange_possible: true,
        };
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(0);
        MovePicker::MaxScore.pick(&params, &outcome, &mut rng);
    }

    #[test]
    fn robot_config_from_json() {
        let registry = lexicon::LexiconRegistry::new();
        registry.insert("common", english_kwg(&["AT"]));
        let robot_config = serde_json::from_str::<RobotConfig>(
            r#"{ "policy": "casual", "common_lexicon": "common", "top_n": 5 }"#,
        )
        .unwrap();
        assert_eq!(
            robot_config,
            RobotConfig::Casual {
                common_lexicon: "common".into(),
                top_n: 5,
                fallback: Fallback::LowestScoring,
            }
        );
        assert!(matches!(
            MovePicker::from_config(&robot_config, &registry),
            Ok(MovePicker::Casual { top_n: 5, .. })
        ));
        let missing = serde_json::from_str::<RobotConfig>(
            r#"{ "policy": "restricted_vocabulary", "common_lexicon": "nope", "fallback": "pass_or_exchange" }"#,
        )
        .unwrap();
        assert!(MovePicker::from_config(&missing, &registry).is_err());
        assert!(matches!(
            MovePicker::from_config(&RobotConfig::MaxScore, &registry),
            Ok(MovePicker::MaxScore)
        ));
    }
}
