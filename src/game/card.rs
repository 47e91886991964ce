use serde::{Deserialize, Serialize};

use crate::utils::clock::{seconds_between, Timestamp};

/// 卡牌标识，在一局内唯一且不变。
pub type CardId = u32;

/// 翻牌游戏中的单张卡牌。
///
/// 奖励时间不靠计时器递减：卡牌只记录最近一次翻开的时间戳与此前累计的翻开时长，
/// 所有奖励查询都由这两个值和调用方传入的 `now` 推算。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card<T> {
    pub(crate) id: CardId,
    #[serde(default)]
    pub(crate) is_face_up: bool,
    #[serde(default)]
    pub(crate) is_matched: bool,
    pub(crate) content: T,
    /// Seconds a card may spend face-up before its bonus is gone.
    #[serde(default)]
    pub(crate) bonus_time_limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) last_face_up_date: Option<Timestamp>,
    /// Seconds spent face-up in earlier intervals.
    #[serde(default)]
    pub(crate) past_face_up_time: f64,
    #[serde(default)]
    pub(crate) has_been_seen: bool,
}

impl<T> Card<T> {
    pub fn new(id: CardId, content: T, bonus_time_limit: f64) -> Self {
        Self {
            id,
            is_face_up: false,
            is_matched: false,
            content,
            bonus_time_limit: bonus_time_limit.max(0.0),
            last_face_up_date: None,
            past_face_up_time: 0.0,
            has_been_seen: false,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn is_face_up(&self) -> bool {
        self.is_face_up
    }

    pub fn is_matched(&self) -> bool {
        self.is_matched
    }

    pub fn has_been_seen(&self) -> bool {
        self.has_been_seen
    }

    pub fn bonus_time_limit(&self) -> f64 {
        self.bonus_time_limit
    }

    pub fn last_face_up_date(&self) -> Option<Timestamp> {
        self.last_face_up_date
    }

    pub fn past_face_up_time(&self) -> f64 {
        self.past_face_up_time
    }

    /// Total seconds this card has been face-up while its bonus was running.
    pub fn face_up_time(&self, now: Timestamp) -> f64 {
        match self.last_face_up_date {
            Some(since) => self.past_face_up_time + seconds_between(since, now),
            None => self.past_face_up_time,
        }
    }

    pub fn bonus_time_remaining(&self, now: Timestamp) -> f64 {
        (self.bonus_time_limit - self.face_up_time(now)).max(0.0)
    }

    /// Fraction of the bonus still available, in `[0, 1]`.
    pub fn bonus_remaining(&self, now: Timestamp) -> f64 {
        let remaining = self.bonus_time_remaining(now);
        if self.bonus_time_limit > 0.0 && remaining > 0.0 {
            (remaining / self.bonus_time_limit).min(1.0)
        } else {
            0.0
        }
    }

    pub fn has_earned_bonus(&self, now: Timestamp) -> bool {
        self.is_matched && self.bonus_time_remaining(now) > 0.0
    }

    pub fn is_consuming_bonus_time(&self, now: Timestamp) -> bool {
        self.is_face_up && !self.is_matched && self.bonus_time_remaining(now) > 0.0
    }

    pub(crate) fn turn_face_up(&mut self, now: Timestamp) -> bool {
        if self.is_face_up {
            return false;
        }
        self.is_face_up = true;
        self.start_using_bonus_time(now);
        true
    }

    pub(crate) fn turn_face_down(&mut self, now: Timestamp) -> bool {
        if !self.is_face_up || self.is_matched {
            return false;
        }
        self.is_face_up = false;
        self.has_been_seen = true;
        self.stop_using_bonus_time(now);
        true
    }

    /// Locks the bonus in at its value for `now`.
    pub(crate) fn mark_matched(&mut self, now: Timestamp) {
        self.is_matched = true;
        self.stop_using_bonus_time(now);
    }

    fn start_using_bonus_time(&mut self, now: Timestamp) {
        if self.is_consuming_bonus_time(now) && self.last_face_up_date.is_none() {
            self.last_face_up_date = Some(now);
        }
    }

    fn stop_using_bonus_time(&mut self, now: Timestamp) {
        self.past_face_up_time = self.face_up_time(now);
        self.last_face_up_date = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Timestamp = 1_700_000_000_000.0;

    fn secs(seconds: f64) -> Timestamp {
        START + seconds * 1000.0
    }

    #[test]
    fn fresh_card_has_full_bonus() {
        let card = Card::new(0, "A", 10.0);
        assert_eq!(card.bonus_remaining(START), 1.0);
        assert!(!card.is_consuming_bonus_time(START));
        assert!(card.last_face_up_date().is_none());
    }

    #[test]
    fn bonus_is_zero_without_a_limit() {
        let mut card = Card::new(0, "A", 0.0);
        card.turn_face_up(START);
        assert_eq!(card.bonus_remaining(secs(1.0)), 0.0);
        assert!(card.last_face_up_date().is_none());
        assert!(!card.is_consuming_bonus_time(secs(1.0)));
    }

    #[test]
    fn bonus_decays_while_face_up_and_clamps_at_zero() {
        let mut card = Card::new(0, "A", 10.0);
        card.turn_face_up(START);

        let mut previous = card.bonus_remaining(START);
        for step in 1..=30 {
            let current = card.bonus_remaining(secs(step as f64 * 0.5));
            assert!(current <= previous, "bonus must never grow while face-up");
            assert!((0.0..=1.0).contains(&current));
            previous = current;
        }

        assert!((card.bonus_remaining(secs(4.0)) - 0.6).abs() < 1e-9);
        assert_eq!(card.bonus_remaining(secs(12.0)), 0.0);
        assert!(!card.is_consuming_bonus_time(secs(12.0)));
    }

    #[test]
    fn face_down_intervals_are_folded_into_past_time() {
        let mut card = Card::new(0, "A", 10.0);
        card.turn_face_up(START);
        card.turn_face_down(secs(3.0));

        assert!(card.has_been_seen());
        assert!(card.last_face_up_date().is_none());
        assert!((card.past_face_up_time() - 3.0).abs() < 1e-9);
        // Time spent face-down does not count.
        assert!((card.bonus_remaining(secs(50.0)) - 0.7).abs() < 1e-9);

        card.turn_face_up(secs(50.0));
        assert!((card.face_up_time(secs(52.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn matching_freezes_the_bonus() {
        let mut card = Card::new(0, "A", 10.0);
        card.turn_face_up(START);
        card.mark_matched(secs(2.0));

        let frozen = card.bonus_remaining(secs(2.0));
        assert!((frozen - 0.8).abs() < 1e-9);
        assert_eq!(card.bonus_remaining(secs(500.0)), frozen);
        assert!(card.has_earned_bonus(secs(500.0)));
        assert!(!card.is_consuming_bonus_time(secs(500.0)));
    }

    #[test]
    fn matched_cards_refuse_to_turn_face_down() {
        let mut card = Card::new(0, "A", 10.0);
        card.turn_face_up(START);
        card.mark_matched(START);
        assert!(!card.turn_face_down(secs(1.0)));
        assert!(card.is_face_up());
    }
}
