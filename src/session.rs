//! 可观察的游戏会话：持有模型与建局配置，每次变更后通知订阅者。

use log::{debug, info, trace};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::game::{Card, CardId, GameEvent, MemoryGame};
use crate::utils::clock::{Clock, SystemClock, Timestamp};

pub type SubscriptionId = u32;

type Listener = Box<dyn FnMut(u64, &[GameEvent])>;

/// 某一时刻每张卡牌的奖励状态，供前端绘制倒计时。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BonusSnapshot {
    pub card_id: CardId,
    pub bonus_remaining: f64,
    pub is_consuming_bonus_time: bool,
    pub has_earned_bonus: bool,
}

impl BonusSnapshot {
    pub fn collect<T>(game: &MemoryGame<T>, now: Timestamp) -> Vec<Self> {
        game.cards()
            .iter()
            .map(|card| BonusSnapshot {
                card_id: card.id(),
                bonus_remaining: card.bonus_remaining(now),
                is_consuming_bonus_time: card.is_consuming_bonus_time(now),
                has_earned_bonus: card.has_earned_bonus(now),
            })
            .collect()
    }
}

pub struct MemorySession<T> {
    config: GameConfig,
    contents: Vec<T>,
    rng: SmallRng,
    clock: Box<dyn Clock>,
    model: MemoryGame<T>,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl<T: Clone + PartialEq> MemorySession<T> {
    pub fn new(config: GameConfig, contents: Vec<T>) -> Self {
        Self::with_clock(config, contents, SystemClock)
    }

    /// `contents` lists one face per pair; repeated faces are dropped.
    pub fn with_clock(config: GameConfig, contents: Vec<T>, clock: impl Clock + 'static) -> Self {
        let mut distinct: Vec<T> = Vec::with_capacity(contents.len());
        for content in contents {
            if !distinct.contains(&content) {
                distinct.push(content);
            }
        }

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let model = Self::build_model(&config, &distinct, &mut rng);
        debug!(
            "session created with {} pair(s) from {} face(s)",
            model.pair_count(),
            distinct.len()
        );

        Self {
            config,
            contents: distinct,
            rng,
            clock: Box::new(clock),
            model,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    fn build_model(config: &GameConfig, contents: &[T], rng: &mut SmallRng) -> MemoryGame<T> {
        let pairs = config.pair_count(contents.len());
        MemoryGame::new(
            pairs,
            config.bonus_time_limit,
            config.scoring,
            |pair_index| contents[pair_index].clone(),
            rng,
        )
    }

    pub fn choose(&mut self, card_id: CardId) -> Vec<GameEvent> {
        let now = self.clock.now();
        let events = self.model.choose(card_id, now);
        if events.is_empty() {
            trace!("choose({card_id}) ignored");
            return events;
        }
        debug!("choose({card_id}) produced {} event(s)", events.len());
        if self.model.is_finished() {
            info!("game finished with score {}", self.model.score());
        }
        self.publish(&events);
        events
    }

    pub fn shuffle(&mut self) {
        self.model.shuffle(&mut self.rng);
        self.publish(&[GameEvent::Shuffled]);
    }

    /// Discards the current game and deals a new one from the same configuration.
    pub fn restart(&mut self) {
        self.model = Self::build_model(&self.config, &self.contents, &mut self.rng);
        let pairs = self.model.pair_count();
        info!("game restarted with {pairs} pair(s)");
        self.publish(&[GameEvent::Restarted { pairs }]);
    }
}

impl<T> MemorySession<T> {
    pub fn cards(&self) -> &[Card<T>] {
        self.model.cards()
    }

    pub fn model(&self) -> &MemoryGame<T> {
        &self.model
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> i32 {
        self.model.score()
    }

    pub fn is_finished(&self) -> bool {
        self.model.is_finished()
    }

    /// Bumped once for every operation that changed the game.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn bonus_snapshot(&self) -> Vec<BonusSnapshot> {
        BonusSnapshot::collect(&self.model, self.clock.now())
    }

    /// Registers a listener called with the new revision and the events of
    /// every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(u64, &[GameEvent]) + 'static,
    {
        let mut id = self.next_subscription;
        while self.listeners.iter().any(|(existing, _)| *existing == id) {
            id = id.wrapping_add(1);
        }
        self.next_subscription = id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn publish(&mut self, events: &[GameEvent]) {
        self.revision += 1;
        let revision = self.revision;
        for (_, listener) in self.listeners.iter_mut() {
            listener(revision, events);
        }
    }
}
