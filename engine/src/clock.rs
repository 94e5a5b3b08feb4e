//! Frame time sources.

use std::{cell::Cell, rc::Rc, time::Instant};

/// Source of the wall-clock time between two frames.
pub trait Clock {
    /// Seconds since the previous call, or since creation on the first call.
    fn restart(&mut self) -> f32;
}

/// Clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    /// Starts measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn restart(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f32()
    }
}

/// Clock that reports a delta chosen by the caller.
///
/// Clones share the delta, so a test can keep a clone to change the frame
/// time after handing the clock to an engine.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    delta: Rc<Cell<f32>>,
}

impl ManualClock {
    /// Creates a clock reporting `delta` seconds per frame.
    #[must_use]
    pub fn new(delta: f32) -> Self {
        Self {
            delta: Rc::new(Cell::new(delta)),
        }
    }

    /// Changes the delta reported from the next frame on.
    pub fn set_delta(&self, delta: f32) {
        self.delta.set(delta);
    }

    /// Delta reported per frame.
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta.get()
    }
}

impl Clock for ManualClock {
    fn restart(&mut self) -> f32 {
        self.delta.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_the_delta() {
        let clock = ManualClock::new(0.01);
        let mut handed_out = clock.clone();

        clock.set_delta(0.5);

        assert_eq!(handed_out.restart(), 0.5);
    }

    #[test]
    fn system_clock_never_goes_backwards() {
        let mut clock = SystemClock::new();
        assert!(clock.restart() >= 0.0);
        assert!(clock.restart() >= 0.0);
    }
}
