use std::time::Instant;

use tracing::{debug, info};

/// Per-frame throughput clock. `tick()` at the start of a frame, `fps()` once
/// the frame is done.
#[derive(Debug, Default)]
pub struct FpsClock {
    started: Option<Instant>,
}

impl FpsClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn fps(&self) -> f64 {
        self.fps_at(Instant::now())
    }

    /// Frames per second implied by the time from the last tick to `now`.
    /// Zero before the first tick or when no time has passed.
    pub fn fps_at(&self, now: Instant) -> f64 {
        let Some(started) = self.started else {
            return 0.0;
        };
        let secs = now.saturating_duration_since(started).as_secs_f64();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }
}

/// Receives the measured frame rate once per frame.
pub trait FpsSink: Send {
    fn report_fps(&mut self, fps: f64);
}

/// Logs every sample at debug level and every `every`-th at info.
pub struct TracingFps {
    every: u64,
    frames: u64,
}

impl TracingFps {
    pub fn new(every: u64) -> Self {
        Self { every, frames: 0 }
    }
}

impl FpsSink for TracingFps {
    fn report_fps(&mut self, fps: f64) {
        self.frames += 1;
        if self.every > 0 && self.frames % self.every == 0 {
            info!(fps, frames = self.frames, "throughput");
        } else {
            debug!(fps, frames = self.frames, "throughput");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn zero_before_first_tick() {
        assert_eq!(FpsClock::new().fps(), 0.0);
    }

    #[test]
    fn fps_from_elapsed() {
        let mut clock = FpsClock::new();
        clock.tick();
        let started = clock.started.unwrap();
        let fps = clock.fps_at(started + Duration::from_millis(40));
        assert!((fps - 25.0).abs() < 1e-9);
        assert_eq!(clock.fps_at(started), 0.0);
    }

    #[test]
    fn tracing_sink_counts_frames() {
        let mut sink = TracingFps::new(3);
        for _ in 0..7 {
            sink.report_fps(30.0);
        }
        assert_eq!(sink.frames, 7);
    }
}
