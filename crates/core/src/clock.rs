//! Time sources and the fixed-cadence frame gate.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Draws per second of the render loop.
pub const DRAW_RATE_HZ: u32 = 12;

/// Monotonic time, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall clock anchored at construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and headless runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Accumulating-deadline gate for the render loop.
///
/// The first callback only records its timestamp. After that a callback draws
/// when a full step has elapsed since the last scheduled draw, and the
/// schedule advances by exactly one step, never snapping to `now`. One draw per
/// callback at most, so a stall is worked off one frame per callback.
#[derive(Clone, Debug)]
pub struct FrameGate {
    step: Duration,
    last: Option<Duration>,
}

impl FrameGate {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / rate_hz.max(1),
            last: None,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn tick(&mut self, now: Duration) -> bool {
        match self.last {
            None => {
                self.last = Some(now);
                false
            }
            Some(last) if now.saturating_sub(last) >= self.step => {
                self.last = Some(last + self.step);
                true
            }
            Some(_) => false,
        }
    }

    /// When the next draw becomes due; `None` before the first callback.
    pub fn next_due(&self) -> Option<Duration> {
        self.last.map(|last| last + self.step)
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(DRAW_RATE_HZ)
    }
}
