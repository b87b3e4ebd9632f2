//! Per-frame statistics

use kiln_render::BackendCounters;

/// Timing and render counters for the most recent frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Index of the frame, starting at 0 for the first tick
    pub frame: u64,
    /// Raw elapsed milliseconds since the previous frame
    pub ms: f64,
    /// Clamped, scaled delta in seconds
    pub dt: f64,
    /// Frames counted in the last complete one-second window
    pub fps: u32,
    pub draw_calls: u32,
    pub primitives: u32,
    /// Frames in the current window
    window_frames: u32,
    /// Elapsed milliseconds in the current window
    window_ms: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timing of a new frame
    pub fn begin_frame(&mut self, frame: u64, ms: f64, dt: f64) {
        self.frame = frame;
        self.ms = ms;
        self.dt = dt;
        self.draw_calls = 0;
        self.primitives = 0;

        self.window_frames += 1;
        self.window_ms += ms;
        if self.window_ms >= 1000.0 {
            self.fps = self.window_frames;
            self.window_frames = 0;
            self.window_ms -= 1000.0;
        }
    }

    /// Copy the backend's counters after the render phase
    pub fn record_render(&mut self, counters: BackendCounters) {
        self.draw_calls = counters.draw_calls;
        self.primitives = counters.primitives;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_window() {
        let mut stats = FrameStats::new();
        for i in 0..59 {
            stats.begin_frame(i, 16.0, 0.016);
        }
        assert_eq!(stats.fps, 0);

        // 63rd frame crosses the one-second mark
        for i in 59..63 {
            stats.begin_frame(i, 16.0, 0.016);
        }
        assert_eq!(stats.fps, 63);
        assert_eq!(stats.frame, 62);
    }

    #[test]
    fn test_render_counters_reset_per_frame() {
        let mut stats = FrameStats::new();
        stats.begin_frame(0, 0.0, 0.0);
        stats.record_render(BackendCounters {
            draw_calls: 3,
            primitives: 30,
            passes: 1,
        });
        assert_eq!(stats.draw_calls, 3);

        stats.begin_frame(1, 16.0, 0.016);
        assert_eq!(stats.draw_calls, 0);
        assert_eq!(stats.primitives, 0);
    }
}
