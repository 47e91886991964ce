//! Host-facing helpers: wall clock, console logging, panic hook.

pub mod clock;
pub mod logger;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}
