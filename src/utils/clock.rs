use std::cell::Cell;
use std::rc::Rc;

/// Milliseconds since the Unix epoch, the unit `Date.now()` reports.
pub type Timestamp = f64;

/// 奖励计时使用的时钟。
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Seconds elapsed between two timestamps, never negative.
pub fn seconds_between(from: Timestamp, to: Timestamp) -> f64 {
    ((to - from) / 1000.0).max(0.0)
}

/// Wall clock: `Date.now()` in the browser, `SystemTime` elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> Timestamp {
        web_sys::js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    pub fn advance_secs(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds * 1000.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000.0);
        let handle = clock.clone();
        handle.advance_secs(2.5);
        assert_eq!(clock.now(), 3_500.0);
    }

    #[test]
    fn seconds_between_never_goes_negative() {
        assert_eq!(seconds_between(2_000.0, 1_000.0), 0.0);
        assert_eq!(seconds_between(1_000.0, 4_000.0), 3.0);
    }
}
