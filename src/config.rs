use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::game::{ScoringRules, MAX_SCORING_POINTS};
use crate::theme::Theme;

const DEFAULT_PAIRS: i32 = 8;
const DEFAULT_BONUS_TIME_LIMIT: f64 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "relaxed" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" | "expert" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

/// 一局游戏的构造参数；`restart` 会用同一份配置重新建局。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Requested pair count. Zero or negative builds an empty game.
    #[serde(default = "default_pairs")]
    pub pairs: i32,
    /// Seconds of face-up time each card may spend before its bonus is gone.
    #[serde(default = "default_bonus_time_limit")]
    pub bonus_time_limit: f64,
    #[serde(default)]
    pub scoring: ScoringRules,
    /// Fixed shuffle seed; fresh entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_pairs() -> i32 {
    DEFAULT_PAIRS
}

fn default_bonus_time_limit() -> f64 {
    DEFAULT_BONUS_TIME_LIMIT
}

impl GameConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                pairs: 4,
                bonus_time_limit: 15.0,
                scoring: ScoringRules::default(),
                seed: None,
            },
            Difficulty::Normal => Self {
                pairs: DEFAULT_PAIRS,
                bonus_time_limit: DEFAULT_BONUS_TIME_LIMIT,
                scoring: ScoringRules::default(),
                seed: None,
            },
            Difficulty::Hard => Self {
                pairs: 12,
                bonus_time_limit: 6.0,
                scoring: ScoringRules {
                    mismatch_penalty: 2,
                    ..ScoringRules::default()
                },
                seed: None,
            },
        }
    }

    pub fn with_pairs(mut self, pairs: i32) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn with_bonus_time_limit(mut self, seconds: f64) -> Self {
        self.bonus_time_limit = seconds;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringRules) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pairs actually dealt when only `available` distinct faces exist.
    pub fn pair_count(&self, available: usize) -> usize {
        usize::try_from(self.pairs.max(0))
            .unwrap_or(0)
            .min(available)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.bonus_time_limit.is_finite() || self.bonus_time_limit < 0.0 {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "bonus_time_limit must be a non-negative number of seconds, got {}",
                    self.bonus_time_limit
                ),
            });
        }
        if let Some((rule, value)) = self.scoring.out_of_range() {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "scoring.{rule} must be between 0 and {MAX_SCORING_POINTS}, got {value}"
                ),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_difficulty(Difficulty::Normal)
    }
}

/// 前端传入的建局选项：先取难度预设，再逐项覆盖。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_time_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl EngineOptions {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn resolve(self) -> Result<(GameConfig, Theme), EngineError> {
        let mut config = match self.difficulty.as_deref() {
            Some(value) => {
                let difficulty =
                    Difficulty::from_str(value).map_err(|_| EngineError::UnknownDifficulty {
                        value: value.to_string(),
                    })?;
                GameConfig::from_difficulty(difficulty)
            }
            None => GameConfig::default(),
        };

        if let Some(pairs) = self.pairs {
            config = config.with_pairs(pairs);
        }
        if let Some(seconds) = self.bonus_time_limit {
            config = config.with_bonus_time_limit(seconds);
        }
        if let Some(scoring) = self.scoring {
            config = config.with_scoring(scoring);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;

        Ok((config, self.theme.unwrap_or_default()))
    }
}
