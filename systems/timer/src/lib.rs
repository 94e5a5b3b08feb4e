#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One-shot and repeating timers advanced by scene time.

use std::{fmt, time::Duration};

use tessera_core::{Error, Result};

/// Identifier of a timer inside its [`TimerManager`].
pub type TimerId = u64;

/// Repeat count of timers that never stop on their own.
pub const REPEAT_FOREVER: i32 = -1;

type Callback = Box<dyn FnMut(&mut Timer)>;

/// Run state of a [`Timer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerStatus {
    /// Counting towards the next dispatch.
    Running,
    /// Frozen; elapsed time is kept.
    Paused,
    /// Finished or cancelled; swept by the manager at the end of the frame.
    Stopped,
}

/// Callback scheduled to run after an interval, once or repeatedly.
///
/// Interval timers subtract the interval from the elapsed time after each
/// dispatch instead of resetting it, so a long frame fires every interval it
/// covers and the phase is preserved. A zero interval dispatches once per
/// update.
pub struct Timer {
    id: TimerId,
    interval: Duration,
    elapsed: Duration,
    repeat_count: i32,
    dispatch_count: u32,
    status: TimerStatus,
    timescale: f32,
    callback: Option<Callback>,
}

impl Timer {
    fn new(id: TimerId, interval: Duration, repeat_count: i32, callback: Callback) -> Self {
        Self {
            id,
            interval,
            elapsed: Duration::ZERO,
            repeat_count,
            dispatch_count: 0,
            status: TimerStatus::Running,
            timescale: 1.0,
            callback: Some(callback),
        }
    }

    /// Identifier of the timer.
    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Current run state.
    #[must_use]
    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Reports whether the timer is counting.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Reports whether the timer is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.status == TimerStatus::Paused
    }

    /// Reports whether the timer is stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.status == TimerStatus::Stopped
    }

    /// Pauses a running timer.
    pub fn pause(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
        }
    }

    /// Resumes a paused timer.
    pub fn resume(&mut self) {
        if self.status == TimerStatus::Paused {
            self.status = TimerStatus::Running;
        }
    }

    /// Stops the timer. It is removed at the end of the frame.
    pub fn stop(&mut self) {
        self.status = TimerStatus::Stopped;
    }

    /// Starts counting from zero again, forgetting previous dispatches.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.dispatch_count = 0;
        self.status = TimerStatus::Running;
    }

    /// Time between dispatches.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the time between dispatches.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Total number of dispatches before the timer stops, or
    /// [`REPEAT_FOREVER`].
    #[must_use]
    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }

    /// Changes the total number of dispatches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `count` is positive or
    /// [`REPEAT_FOREVER`].
    pub fn set_repeat_count(&mut self, count: i32) -> Result<()> {
        validate_repeat_count(count)?;
        self.repeat_count = count;
        Ok(())
    }

    /// Number of times the callback ran since the last restart.
    #[must_use]
    pub fn dispatch_count(&self) -> u32 {
        self.dispatch_count
    }

    /// Time accumulated towards the next dispatch.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left until the next dispatch.
    #[must_use]
    pub fn remaining_duration(&self) -> Duration {
        self.interval.saturating_sub(self.elapsed)
    }

    /// Multiplier applied to the time this timer receives.
    #[must_use]
    pub fn timescale(&self) -> f32 {
        self.timescale
    }

    /// Changes the timer's own speed multiplier. Negative values become zero.
    pub fn set_timescale(&mut self, timescale: f32) {
        self.timescale = if timescale.is_finite() {
            timescale.max(0.0)
        } else {
            0.0
        };
    }

    /// Replaces the callback.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Timer) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Advances the timer by `delta` scaled by its timescale, dispatching as
    /// many times as the accumulated time allows.
    pub fn update(&mut self, delta: Duration) {
        if self.status != TimerStatus::Running {
            return;
        }
        self.elapsed += delta.mul_f32(self.timescale);

        while self.status == TimerStatus::Running && self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.dispatch_count += 1;
            self.dispatch();

            if self.repeat_count > 0
                && i64::from(self.dispatch_count) >= i64::from(self.repeat_count)
                && self.status == TimerStatus::Running
            {
                self.status = TimerStatus::Stopped;
            }
            if self.interval.is_zero() {
                break;
            }
        }
    }

    fn dispatch(&mut self) {
        let Some(mut callback) = self.callback.take() else {
            return;
        };
        callback(self);
        if self.callback.is_none() {
            self.callback = Some(callback);
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .field("elapsed", &self.elapsed)
            .field("repeat_count", &self.repeat_count)
            .field("dispatch_count", &self.dispatch_count)
            .field("status", &self.status)
            .field("timescale", &self.timescale)
            .finish()
    }
}

fn validate_repeat_count(count: i32) -> Result<()> {
    if count == REPEAT_FOREVER || count > 0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "repeat count must be positive or {REPEAT_FOREVER}, got {count}"
        )))
    }
}

/// Owns the timers of a scene and advances them in creation order.
#[derive(Debug)]
pub struct TimerManager {
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl TimerManager {
    /// Creates a manager without timers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedules `callback` to run once after `delay`.
    pub fn set_timeout<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Timer) + 'static,
    {
        self.schedule(delay, 1, Box::new(callback))
    }

    /// Schedules `callback` to run every `interval` until stopped.
    pub fn set_interval<F>(&mut self, interval: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Timer) + 'static,
    {
        self.schedule(interval, REPEAT_FOREVER, Box::new(callback))
    }

    /// Schedules `callback` to run every `interval`, `repeat_count` times in
    /// total, or forever with [`REPEAT_FOREVER`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a zero or negative repeat count
    /// other than [`REPEAT_FOREVER`].
    pub fn set_repeating<F>(
        &mut self,
        interval: Duration,
        repeat_count: i32,
        callback: F,
    ) -> Result<TimerId>
    where
        F: FnMut(&mut Timer) + 'static,
    {
        validate_repeat_count(repeat_count)?;
        Ok(self.schedule(interval, repeat_count, Box::new(callback)))
    }

    fn schedule(&mut self, interval: Duration, repeat_count: i32, callback: Callback) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers
            .push(Timer::new(id, interval, repeat_count, callback));
        log::trace!("scheduled timer {id} every {interval:?} x{repeat_count}");
        id
    }

    /// Timer with identifier `id`.
    #[must_use]
    pub fn timer(&self, id: TimerId) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.id == id)
    }

    /// Mutable timer with identifier `id`.
    pub fn timer_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|timer| timer.id == id)
    }

    /// Removes a timer immediately. Returns `false` if it does not exist.
    pub fn remove(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        before != self.timers.len()
    }

    /// Advances every timer by `delta`.
    pub fn update(&mut self, delta: Duration) {
        for timer in &mut self.timers {
            timer.update(delta);
        }
    }

    /// Advances every timer by `delta` seconds. Negative or non-finite
    /// deltas advance nothing.
    pub fn update_secs(&mut self, delta: f32) {
        self.update(Duration::try_from_secs_f32(delta).unwrap_or_default());
    }

    /// Drops every stopped timer.
    pub fn sweep_stopped(&mut self) {
        self.timers.retain(|timer| !timer.is_stopped());
    }

    /// Drops every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Number of timers, stopped ones included until they are swept.
    #[must_use]
    pub fn count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&mut Timer) + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move |_: &mut Timer| handle.set(handle.get() + 1))
    }

    #[test]
    fn timeouts_fire_once_then_stop() {
        let mut timers = TimerManager::new();
        let (count, callback) = counter();
        let id = timers.set_timeout(Duration::from_millis(50), callback);

        timers.update(Duration::from_millis(30));
        assert_eq!(count.get(), 0);
        timers.update(Duration::from_millis(30));
        timers.update(Duration::from_millis(100));

        assert_eq!(count.get(), 1);
        assert!(timers.timer(id).is_some_and(Timer::is_stopped));
        timers.sweep_stopped();
        assert_eq!(timers.count(), 0);
    }

    #[test]
    fn long_frames_fire_every_covered_interval() {
        let mut timers = TimerManager::new();
        let (count, callback) = counter();
        let id = timers.set_interval(Duration::from_millis(100), callback);

        timers.update(Duration::from_millis(350));

        assert_eq!(count.get(), 3);
        let timer = timers.timer(id).expect("interval timer");
        assert_eq!(timer.elapsed(), Duration::from_millis(50));
        assert!(timer.is_running());
    }

    #[test]
    fn paused_and_zero_timescale_timers_do_not_advance() {
        let mut timers = TimerManager::new();
        let (count, callback) = counter();
        let id = timers.set_interval(Duration::from_millis(10), callback);

        timers.timer_mut(id).expect("timer").pause();
        timers.update(Duration::from_millis(100));
        assert_eq!(count.get(), 0);

        let timer = timers.timer_mut(id).expect("timer");
        timer.resume();
        timer.set_timescale(0.0);
        timers.update(Duration::from_millis(100));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn callbacks_can_stop_their_own_timer() {
        let mut timers = TimerManager::new();
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        let _ = timers.set_interval(Duration::from_millis(10), move |timer| {
            handle.set(handle.get() + 1);
            timer.stop();
        });

        timers.update(Duration::from_millis(100));
        timers.sweep_stopped();

        assert_eq!(count.get(), 1);
        assert_eq!(timers.count(), 0);
    }

    #[test]
    fn invalid_repeat_counts_are_rejected() {
        let mut timers = TimerManager::new();
        let (_, callback) = counter();
        assert!(matches!(
            timers.set_repeating(Duration::from_millis(1), 0, callback),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(timers.count(), 0);
    }

    #[test]
    fn clear_leaves_no_timers() {
        let mut timers = TimerManager::new();
        let (_, first) = counter();
        let (_, second) = counter();
        let _ = timers.set_timeout(Duration::from_secs(1), first);
        let _ = timers.set_interval(Duration::from_secs(1), second);
        assert!(timers.remove(1));
        assert!(!timers.remove(1));
        timers.clear();
        assert_eq!(timers.count(), 0);
    }
}
