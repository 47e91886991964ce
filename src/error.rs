use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::IntegrityError;

/// 引擎边界上的错误（配置解析、序列化）。游戏操作本身不会失败。
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EngineError {
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("unknown difficulty `{value}`")]
    UnknownDifficulty { value: String },

    #[error("serialization failed: {message}")]
    Serialization { message: String },

    #[error("game state is inconsistent: {error}")]
    IntegrityViolation {
        #[from]
        error: IntegrityError,
    },
}

// serde_json::Error is neither Clone nor Serialize, so only its message is kept.
impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: error.to_string(),
        }
    }
}
