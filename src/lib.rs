pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod theme;
pub mod utils;

use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use log::{info, warn, LevelFilter};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::{Function, Promise};

pub use config::{Difficulty, EngineOptions, GameConfig};
pub use error::EngineError;
pub use game::{Card, CardId, GameEvent, IntegrityError, MemoryGame, ScoringRules};
pub use session::{BonusSnapshot, MemorySession, SubscriptionId};
pub use theme::Theme;
pub use utils::{Clock, ManualClock, SystemClock, Timestamp};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    if utils::logger::init(LevelFilter::Info).is_err() {
        warn!("console logger was already installed");
    }
}

fn to_js_error(error: EngineError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// 前端渲染一帧所需的全部状态。
#[derive(Serialize)]
struct EngineSnapshot<'a> {
    revision: u64,
    score: i32,
    finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_of_only_face_up_card: Option<usize>,
    cards: &'a [Card<String>],
    bonus: Vec<BonusSnapshot>,
}

#[wasm_bindgen]
pub struct MemoryGameEngine {
    session: MemorySession<String>,
}

#[wasm_bindgen]
impl MemoryGameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<MemoryGameEngine, JsValue> {
        let options = match options_json {
            Some(json) => EngineOptions::from_json(&json).map_err(to_js_error)?,
            None => EngineOptions::default(),
        };
        let (config, theme) = options.resolve().map_err(to_js_error)?;
        info!(
            "new game: theme `{}`, {} pair(s) requested, bonus limit {}s",
            theme.name, config.pairs, config.bonus_time_limit
        );
        Ok(MemoryGameEngine {
            session: MemorySession::new(config, theme.contents),
        })
    }

    pub fn cards_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.cards()).map_err(serde_to_js_error)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        let snapshot = EngineSnapshot {
            revision: self.session.revision(),
            score: self.session.score(),
            finished: self.session.is_finished(),
            index_of_only_face_up_card: self.session.model().index_of_only_face_up_card(),
            cards: self.session.cards(),
            bonus: self.session.bonus_snapshot(),
        };
        serde_json::to_string(&snapshot).map_err(serde_to_js_error)
    }

    /// Returns the produced events as JSON; `[]` when the tap changed nothing.
    pub fn choose(&mut self, card_id: u32) -> Result<String, JsValue> {
        let events = self.session.choose(card_id);
        serde_json::to_string(&events).map_err(serde_to_js_error)
    }

    pub fn shuffle(&mut self) {
        self.session.shuffle();
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    pub fn score(&self) -> i32 {
        self.session.score()
    }

    pub fn revision(&self) -> f64 {
        self.session.revision() as f64
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn validate(&self) -> Result<(), JsValue> {
        self.session
            .model()
            .integrity_check()
            .map_err(|error| to_js_error(error.into()))
    }

    /// `callback(revision, eventsJson)` runs after every change.
    pub fn on_change(&mut self, callback: Function) -> SubscriptionId {
        self.session.subscribe(move |revision, events| {
            let json = match serde_json::to_string(events) {
                Ok(json) => json,
                Err(error) => {
                    warn!("could not encode change events: {error}");
                    return;
                }
            };
            if let Err(thrown) = callback.call2(
                &JsValue::NULL,
                &JsValue::from_f64(revision as f64),
                &JsValue::from_str(&json),
            ) {
                warn!("change listener threw: {thrown:?}");
            }
        })
    }

    pub fn off_change(&mut self, id: SubscriptionId) -> bool {
        self.session.unsubscribe(id)
    }

    /// Resolves with the bonus state as it will be after `delay_ms`, so hosts
    /// can animate the countdown without a timer inside the game.
    pub fn snapshot_after(&self, delay_ms: Option<u32>) -> Promise {
        let game = self.session.model().clone();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let snapshot = BonusSnapshot::collect(&game, SystemClock.now());
            let json = serde_json::to_string(&snapshot).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回默认建局配置，方便前端展示或修改。
#[wasm_bindgen(js_name = "defaultConfig")]
pub fn default_config() -> Result<JsValue, JsValue> {
    to_value(&GameConfig::default()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "defaultTheme")]
pub fn default_theme() -> Result<JsValue, JsValue> {
    to_value(&Theme::default()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level = LevelFilter::from_str(level).map_err(serde_to_js_error)?;
    utils::logger::set_level(level);
    Ok(())
}
