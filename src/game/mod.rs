//! 游戏核心逻辑模块（卡牌、状态机、计分规则）。

pub mod card;
pub mod rules;
pub mod state;

pub use card::{Card, CardId};
pub use rules::{ScoringRules, MAX_SCORING_POINTS};
pub use state::{GameEvent, IntegrityError, MemoryGame};
