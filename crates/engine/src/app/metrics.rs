use std::time::{Duration, Instant};

/// Frames-per-second measured over a rolling one-second window, the way the
/// HUD reports it: the count of frames completed in the last full window.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    window: Duration,
    frames: u32,
    current_fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window_start: Instant::now(),
            window,
            frames: 0,
            current_fps: 0,
        }
    }

    /// Count one frame; returns the new rate when a window rolls over.
    pub fn record_frame(&mut self, now: Instant) -> Option<u32> {
        self.frames = self.frames.saturating_add(1);
        if now.saturating_duration_since(self.window_start) < self.window {
            return None;
        }
        self.current_fps = self.frames;
        self.frames = 0;
        self.window_start = now;
        Some(self.current_fps)
    }

    pub fn fps(&self) -> u32 {
        self.current_fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rate_before_the_first_window_completes() {
        let mut counter = FpsCounter::new();
        let base = Instant::now();
        for offset_ms in [0u64, 100, 500, 900] {
            assert_eq!(
                counter.record_frame(base + Duration::from_millis(offset_ms)),
                None
            );
        }
        assert_eq!(counter.fps(), 0);
    }

    #[test]
    fn window_rollover_publishes_the_frame_count() {
        let mut counter = FpsCounter::with_window(Duration::from_millis(100));
        let base = Instant::now();
        for frame in 1..=5u64 {
            counter.record_frame(base + Duration::from_millis(frame * 10));
        }
        let published = counter.record_frame(base + Duration::from_millis(120));
        assert_eq!(published, Some(6));
        assert_eq!(counter.fps(), 6);
    }

    #[test]
    fn counting_restarts_after_each_window() {
        let mut counter = FpsCounter::with_window(Duration::from_millis(100));
        let base = Instant::now();
        counter.record_frame(base + Duration::from_millis(110));
        assert_eq!(counter.fps(), 1);

        counter.record_frame(base + Duration::from_millis(150));
        counter.record_frame(base + Duration::from_millis(180));
        let published = counter.record_frame(base + Duration::from_millis(215));
        assert_eq!(published, Some(3));
    }
}
