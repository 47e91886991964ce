use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    card::CardId,
    state::{GameEvent, MemoryGame},
};
use crate::utils::clock::Timestamp;

const DEFAULT_MATCH_POINTS: i32 = 2;
const DEFAULT_BONUS_POINTS: i32 = 2;
const DEFAULT_MISMATCH_PENALTY: i32 = 1;
/// Upper bound accepted for any single scoring value.
pub const MAX_SCORING_POINTS: i32 = 1_000;

/// 计分规则。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoringRules {
    pub match_points: i32,
    /// Extra points for a pair matched with its whole bonus left.
    pub bonus_points: i32,
    /// Charged per card that had already been seen when a pair mismatches.
    pub mismatch_penalty: i32,
}

impl ScoringRules {
    pub fn match_award(&self, bonus: f64) -> i32 {
        let bonus = bonus.clamp(0.0, 1.0);
        let extra = (self.bonus_points as f64 * bonus).round() as i32;
        self.match_points.saturating_add(extra)
    }

    pub fn mismatch_cost(&self, previously_seen: usize) -> i32 {
        let seen = i32::try_from(previously_seen).unwrap_or(i32::MAX);
        self.mismatch_penalty.saturating_mul(seen)
    }

    /// Name and value of the first rule outside `0..=MAX_SCORING_POINTS`.
    pub fn out_of_range(&self) -> Option<(&'static str, i32)> {
        [
            ("match_points", self.match_points),
            ("bonus_points", self.bonus_points),
            ("mismatch_penalty", self.mismatch_penalty),
        ]
        .into_iter()
        .find(|(_, value)| !(0..=MAX_SCORING_POINTS).contains(value))
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            match_points: DEFAULT_MATCH_POINTS,
            bonus_points: DEFAULT_BONUS_POINTS,
            mismatch_penalty: DEFAULT_MISMATCH_PENALTY,
        }
    }
}

impl<T: PartialEq> MemoryGame<T> {
    /// Applies a tap on `card_id` at time `now` and returns what changed.
    ///
    /// Matched cards, face-up cards and unknown ids are ignored and produce no
    /// events. A mismatched pair stays face-up until the next choice turns it
    /// back over.
    pub fn choose(&mut self, card_id: CardId, now: Timestamp) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let Some(chosen) = self.index_of(card_id) else {
            return events;
        };
        if self.cards[chosen].is_matched || self.cards[chosen].is_face_up {
            return events;
        }

        if let Some(waiting) = self.index_of_only_face_up_card() {
            let waiting_id = self.cards[waiting].id;
            if self.cards[chosen].content == self.cards[waiting].content {
                let bonus = self.cards[chosen]
                    .bonus_remaining(now)
                    .min(self.cards[waiting].bonus_remaining(now));
                self.cards[chosen].mark_matched(now);
                self.cards[waiting].mark_matched(now);

                let points = self.scoring.match_award(bonus);
                self.score = self.score.saturating_add(points);
                events.push(GameEvent::PairMatched {
                    first: waiting_id,
                    second: card_id,
                    points,
                });
            } else {
                let previously_seen = [chosen, waiting]
                    .iter()
                    .filter(|&&index| self.cards[index].has_been_seen)
                    .count();
                let penalty = self.scoring.mismatch_cost(previously_seen);
                self.score = self.score.saturating_sub(penalty);
                events.push(GameEvent::PairMismatched {
                    first: waiting_id,
                    second: card_id,
                    penalty,
                });
            }
            self.only_face_up_card = None;
        } else {
            for card in self.cards.iter_mut() {
                if card.turn_face_down(now) {
                    events.push(GameEvent::CardFlipped {
                        card_id: card.id,
                        face_up: false,
                    });
                }
            }
            self.only_face_up_card = Some(card_id);
        }

        if self.cards[chosen].turn_face_up(now) {
            events.push(GameEvent::CardFlipped {
                card_id,
                face_up: true,
            });
        }

        if self.is_finished() {
            events.push(GameEvent::GameFinished { score: self.score });
        }
        events
    }

    /// Uniformly permutes the deck. Card state is untouched.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Card;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const T0: Timestamp = 1_700_000_000_000.0;

    fn at(seconds: f64) -> Timestamp {
        T0 + seconds * 1000.0
    }

    /// Ids 0 and 1 hold "A", ids 2 and 3 hold "B".
    fn aabb() -> MemoryGame<&'static str> {
        MemoryGame::unshuffled(2, 10.0, ScoringRules::default(), |i| ["A", "B"][i])
    }

    fn face_up_ids(game: &MemoryGame<&'static str>) -> Vec<CardId> {
        game.cards()
            .iter()
            .filter(|card| card.is_face_up())
            .map(Card::id)
            .collect()
    }

    #[test]
    fn first_choice_becomes_the_tracked_card() {
        let mut game = aabb();
        let events = game.choose(2, T0);

        assert_eq!(game.index_of_only_face_up_card(), Some(2));
        assert_eq!(face_up_ids(&game), vec![2]);
        assert_eq!(
            events,
            vec![GameEvent::CardFlipped {
                card_id: 2,
                face_up: true
            }]
        );
    }

    #[test]
    fn choosing_a_matched_card_changes_nothing() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, at(1.0));

        let before = game.clone();
        let events = game.choose(0, at(2.0));
        assert!(events.is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn choosing_the_face_up_card_again_changes_nothing() {
        let mut game = aabb();
        game.choose(3, T0);

        let before = game.clone();
        assert!(game.choose(3, at(4.0)).is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn choosing_either_card_of_a_visible_mismatch_changes_nothing() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(2, at(1.0));

        let before = game.clone();
        let score = game.score();
        assert!(game.choose(0, at(2.0)).is_empty());
        assert!(game.choose(2, at(2.5)).is_empty());
        assert_eq!(game, before);
        assert_eq!(game.score(), score);
    }

    #[test]
    fn oversized_scoring_saturates_instead_of_overflowing() {
        let scoring = ScoringRules {
            match_points: i32::MAX,
            bonus_points: i32::MAX,
            mismatch_penalty: i32::MAX,
        };
        let mut game = MemoryGame::unshuffled(2, 10.0, scoring, |i| ["A", "B"][i]);

        game.choose(0, T0);
        game.choose(1, T0);
        assert_eq!(game.score(), i32::MAX);

        game.choose(2, T0);
        game.choose(3, T0);
        assert_eq!(game.score(), i32::MAX);

        let mut game = MemoryGame::unshuffled(2, 10.0, scoring, |i| ["A", "B"][i]);
        for (id, second) in [(0, 2), (3, 1), (0, 2), (3, 1)] {
            game.choose(id, T0);
            game.choose(second, T0);
        }
        assert_eq!(game.score(), i32::MIN);
    }

    #[test]
    fn scoring_range_check_names_the_offending_rule() {
        assert_eq!(ScoringRules::default().out_of_range(), None);
        let negative = ScoringRules {
            mismatch_penalty: -50,
            ..ScoringRules::default()
        };
        assert_eq!(negative.out_of_range(), Some(("mismatch_penalty", -50)));
        let huge = ScoringRules {
            match_points: MAX_SCORING_POINTS + 1,
            ..ScoringRules::default()
        };
        assert_eq!(huge.out_of_range(), Some(("match_points", MAX_SCORING_POINTS + 1)));
    }

    #[test]
    fn unknown_card_ids_are_ignored() {
        let mut game = aabb();
        let before = game.clone();
        assert!(game.choose(99, T0).is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn equal_contents_match_both_cards() {
        let mut game = aabb();
        game.choose(0, T0);
        let events = game.choose(1, at(1.0));

        for id in [0, 1] {
            let card = game.card(id).expect("card should exist");
            assert!(card.is_matched());
            assert!(card.is_face_up());
            assert!(card.last_face_up_date().is_none());
        }
        assert!(game.index_of_only_face_up_card().is_none());
        assert!(matches!(
            events.first(),
            Some(GameEvent::PairMatched {
                first: 0,
                second: 1,
                ..
            })
        ));
    }

    #[test]
    fn different_contents_leave_both_visible_and_unmatched() {
        let mut game = aabb();
        game.choose(0, T0);
        let events = game.choose(2, at(1.0));

        assert!(game.index_of_only_face_up_card().is_none());
        assert_eq!(face_up_ids(&game), vec![0, 2]);
        assert!(game.cards().iter().all(|card| !card.is_matched()));
        assert!(events.contains(&GameEvent::PairMismatched {
            first: 0,
            second: 2,
            penalty: 0
        }));
    }

    #[test]
    fn next_choice_after_a_mismatch_covers_the_pair() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(2, at(2.0));
        let events = game.choose(3, at(3.0));

        assert_eq!(face_up_ids(&game), vec![3]);
        assert_eq!(game.index_of_only_face_up_card(), Some(3));

        let first = game.card(0).expect("card 0");
        let second = game.card(2).expect("card 2");
        assert!(first.has_been_seen() && second.has_been_seen());
        assert!((first.past_face_up_time() - 3.0).abs() < 1e-9);
        assert!((second.past_face_up_time() - 1.0).abs() < 1e-9);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, GameEvent::CardFlipped { face_up: false, .. }))
                .count(),
            2
        );
    }

    #[test]
    fn walkthrough_match_a_then_track_b() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, at(0.5));
        assert!(game.card(0).map(Card::is_matched).unwrap_or(false));
        assert!(game.card(1).map(Card::is_matched).unwrap_or(false));

        game.choose(2, at(1.0));
        assert_eq!(game.index_of_only_face_up_card(), Some(2));
        assert!(!game.card(2).map(Card::is_matched).unwrap_or(true));
        // Matched cards stay face-up.
        assert_eq!(face_up_ids(&game), vec![0, 1, 2]);
    }

    #[test]
    fn quick_match_earns_full_bonus() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, T0);
        assert_eq!(game.score(), 4);
    }

    #[test]
    fn slow_match_earns_partial_bonus() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, at(7.0));
        // Card 0 has 30% left, rounded from 0.6 extra points.
        assert_eq!(game.score(), 3);
    }

    #[test]
    fn bonus_is_frozen_once_matched() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, at(4.0));

        let card = game.card(0).expect("card 0");
        let frozen = card.bonus_remaining(at(4.0));
        assert!((frozen - 0.6).abs() < 1e-9);
        assert_eq!(card.bonus_remaining(at(400.0)), frozen);
    }

    #[test]
    fn mismatch_penalises_only_previously_seen_cards() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(2, at(1.0));
        assert_eq!(game.score(), 0);

        // Card 0 was seen, card 3 is new.
        game.choose(3, at(2.0));
        game.choose(0, at(3.0));
        assert_eq!(game.score(), -1);

        // Cards 2 and 0 have both been seen.
        game.choose(2, at(4.0));
        game.choose(0, at(5.0));
        assert_eq!(game.score(), -3);
    }

    #[test]
    fn matching_every_pair_finishes_the_game() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, T0);
        game.choose(2, T0);
        let events = game.choose(3, T0);

        assert!(game.is_finished());
        assert_eq!(game.matched_pairs(), 2);
        assert_eq!(events.last(), Some(&GameEvent::GameFinished { score: 8 }));
    }

    #[test]
    fn shuffle_only_reorders() {
        let mut game = aabb();
        game.choose(0, T0);
        game.choose(1, at(1.0));
        game.choose(2, at(2.0));

        let mut before: Vec<Card<&str>> = game.cards().to_vec();
        let mut rng = SmallRng::seed_from_u64(42);
        game.shuffle(&mut rng);
        let mut after: Vec<Card<&str>> = game.cards().to_vec();

        before.sort_by_key(Card::id);
        after.sort_by_key(Card::id);
        assert_eq!(before, after);

        let tracked = game
            .index_of_only_face_up_card()
            .map(|index| game.cards()[index].id());
        assert_eq!(tracked, Some(2));
        game.integrity_check().expect("shuffle keeps the game consistent");
    }

    #[test]
    fn shuffle_is_uniform_over_positions() {
        const ROUNDS: usize = 24_000;
        let mut rng = SmallRng::seed_from_u64(2024);
        let mut counts = [[0usize; 4]; 4];

        for _ in 0..ROUNDS {
            let mut game = aabb();
            game.shuffle(&mut rng);
            for (position, card) in game.cards().iter().enumerate() {
                counts[card.id() as usize][position] += 1;
            }
        }

        let expected = ROUNDS / 4;
        for row in counts.iter() {
            for &count in row.iter() {
                let deviation = (count as i64 - expected as i64).abs();
                assert!(
                    deviation < 450,
                    "position frequency {count} too far from {expected}"
                );
            }
        }
    }
}
