//! Frame rate estimation.

use std::time::Duration;

/// Counts frames and reports the frame rate once a second of samples
/// accumulated.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    last: f32,
}

impl FpsCounter {
    /// Records a frame that took `frame` and returns the new estimate when
    /// one second has elapsed since the previous estimate.
    pub(crate) fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }
        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.last = per_second;
        Some(per_second)
    }

    /// Most recent estimate; zero until a full second was recorded.
    pub(crate) fn fps(&self) -> f32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_after_one_second_of_samples() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);

        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        let fps = counter
            .record_frame(frame)
            .expect("should report after one second of samples");

        assert!((fps - 4.0).abs() <= 1e-3);
        assert_eq!(counter.fps(), fps);
        assert!(counter.record_frame(frame).is_none());
    }
}
