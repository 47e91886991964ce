use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::card::{Card, CardId};
use super::rules::ScoringRules;

/// 对局中产生的事件，供前端驱动动画与重绘。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GameEvent {
    CardFlipped {
        card_id: CardId,
        face_up: bool,
    },
    PairMatched {
        first: CardId,
        second: CardId,
        points: i32,
    },
    PairMismatched {
        first: CardId,
        second: CardId,
        penalty: i32,
    },
    GameFinished {
        score: i32,
    },
    Shuffled,
    Restarted {
        pairs: usize,
    },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("card id {card_id} appears more than once")]
    DuplicateCardId { card_id: CardId },

    #[error("content of card {card_id} appears {copies} time(s) instead of twice")]
    UnpairedContent { card_id: CardId, copies: usize },

    #[error("tracked card {card_id} is not a face-up unmatched card")]
    DanglingFaceUpCard { card_id: CardId },
}

/// 翻牌配对游戏的完整状态。
///
/// The tracked face-up card is stored by id rather than by position, so
/// reordering the deck never points it at the wrong card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryGame<T> {
    pub(crate) cards: Vec<Card<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) only_face_up_card: Option<CardId>,
    #[serde(default)]
    pub(crate) score: i32,
    #[serde(default)]
    pub(crate) scoring: ScoringRules,
}

impl<T: Clone + PartialEq> MemoryGame<T> {
    /// Builds `number_of_pairs` pairs in generation order: pair `i` occupies
    /// positions `2i` and `2i + 1` and carries ids `2i` and `2i + 1`.
    pub fn unshuffled<F>(
        number_of_pairs: usize,
        bonus_time_limit: f64,
        scoring: ScoringRules,
        mut content_at: F,
    ) -> Self
    where
        F: FnMut(usize) -> T,
    {
        let mut cards = Vec::with_capacity(number_of_pairs * 2);
        for pair_index in 0..number_of_pairs {
            let content = content_at(pair_index);
            let id = (pair_index * 2) as CardId;
            cards.push(Card::new(id, content.clone(), bonus_time_limit));
            cards.push(Card::new(id + 1, content, bonus_time_limit));
        }

        Self {
            cards,
            only_face_up_card: None,
            score: 0,
            scoring,
        }
    }

    pub fn new<F, R>(
        number_of_pairs: usize,
        bonus_time_limit: f64,
        scoring: ScoringRules,
        content_at: F,
        rng: &mut R,
    ) -> Self
    where
        F: FnMut(usize) -> T,
        R: Rng + ?Sized,
    {
        let mut game = Self::unshuffled(number_of_pairs, bonus_time_limit, scoring, content_at);
        game.shuffle(rng);
        game
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        for (index, card) in self.cards.iter().enumerate() {
            if self.cards[..index].iter().any(|other| other.id == card.id) {
                return Err(IntegrityError::DuplicateCardId { card_id: card.id });
            }
            let copies = self
                .cards
                .iter()
                .filter(|other| other.content == card.content)
                .count();
            if copies != 2 {
                return Err(IntegrityError::UnpairedContent {
                    card_id: card.id,
                    copies,
                });
            }
        }

        if let Some(card_id) = self.only_face_up_card {
            let tracked_is_valid = self
                .card(card_id)
                .map(|card| card.is_face_up && !card.is_matched)
                .unwrap_or(false);
            if !tracked_is_valid {
                return Err(IntegrityError::DanglingFaceUpCard { card_id });
            }
        }

        Ok(())
    }
}

impl<T> MemoryGame<T> {
    pub fn cards(&self) -> &[Card<T>] {
        &self.cards
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card<T>> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    pub fn index_of(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }

    /// Position of the single face-up card waiting for its partner.
    pub fn index_of_only_face_up_card(&self) -> Option<usize> {
        self.only_face_up_card
            .and_then(|card_id| self.index_of(card_id))
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn scoring(&self) -> &ScoringRules {
        &self.scoring
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched).count() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// An empty game is never finished; there is nothing to win.
    pub fn is_finished(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|card| card.is_matched)
    }
}

impl<T> Default for MemoryGame<T> {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            only_face_up_card: None,
            score: 0,
            scoring: ScoringRules::default(),
        }
    }
}
