//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic time (finish timestamps, podium delay)
//! - Frame loop cancellation
//! - Drawing surfaces and the physics engine bridge (web only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;
use std::rc::Rc;

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Native clock measured from creation
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for headless hosts and tests
///
/// Clones share the same time, so a host can keep one handle while the race
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward; negative steps are ignored
    pub fn advance(&self, ms: f64) {
        if ms > 0.0 {
            self.now.set(self.now.get() + ms);
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms.max(self.now.get()));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Stop flag for a self-rescheduling frame loop
///
/// `begin` hands the loop a `FrameTicket`; the loop checks it before requesting
/// its next frame. `stop` invalidates the ticket, so the loop ends at its next
/// callback and drops whatever it captured. A ticket from an earlier run stays
/// dead after a restart.
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    /// (active, run generation)
    state: Rc<Cell<(bool, u64)>>,
}

/// One run of a `FrameLoop`
#[derive(Debug, Clone)]
pub struct FrameTicket {
    state: Rc<Cell<(bool, u64)>>,
    generation: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run; `None` while one is already active
    pub fn begin(&self) -> Option<FrameTicket> {
        let (active, generation) = self.state.get();
        if active {
            return None;
        }
        let generation = generation.wrapping_add(1);
        self.state.set((true, generation));
        Some(FrameTicket {
            state: Rc::clone(&self.state),
            generation,
        })
    }

    pub fn stop(&self) {
        let (_, generation) = self.state.get();
        self.state.set((false, generation));
    }

    pub fn is_active(&self) -> bool {
        self.state.get().0
    }
}

impl FrameTicket {
    /// Whether the run this ticket belongs to should keep going
    pub fn is_live(&self) -> bool {
        self.state.get() == (true, self.generation)
    }
}
