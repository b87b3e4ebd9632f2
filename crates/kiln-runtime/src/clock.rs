//! Frame clock: bounded, scaled per-frame deltas from raw timestamps

/// Converts a monotonic timestamp sequence into per-frame deltas in seconds
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Multiplier applied after clamping
    pub scale: f64,
    /// Upper bound for one frame's delta in seconds, before scaling
    pub max_delta: f64,
    /// Timestamp units per second (1000 for milliseconds)
    pub units_per_second: f64,
    last_timestamp: Option<f64>,
    /// Raw elapsed units of the last tick
    last_elapsed: f64,
    /// Sum of emitted deltas
    total_time: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            scale: 1.0,
            max_delta: 0.1,
            units_per_second: 1000.0,
            last_timestamp: None,
            last_elapsed: 0.0,
            total_time: 0.0,
        }
    }
}

impl FrameClock {
    /// Create a clock for millisecond timestamps with a 100ms delta cap
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(scale: f64, max_delta: f64, units_per_second: f64) -> Self {
        Self {
            scale,
            max_delta,
            units_per_second,
            ..Self::default()
        }
    }

    /// Advance to `timestamp` and return the frame delta in seconds.
    ///
    /// The first call, and any call whose timestamp does not move forward, yields 0.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        let elapsed = match self.last_timestamp {
            Some(last) if timestamp > last => timestamp - last,
            _ => 0.0,
        };
        self.last_timestamp = Some(timestamp);
        self.last_elapsed = elapsed;

        let dt = (elapsed / self.units_per_second).clamp(0.0, self.max_delta.max(0.0)) * self.scale;
        self.total_time += dt;
        dt
    }

    /// Forget the previous timestamp so the next tick starts from zero
    pub fn reset(&mut self) {
        self.last_timestamp = None;
        self.last_elapsed = 0.0;
        self.total_time = 0.0;
    }

    /// Raw elapsed time of the last tick in milliseconds
    pub fn last_elapsed_ms(&self) -> f64 {
        self.last_elapsed * 1000.0 / self.units_per_second
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Total scaled time in seconds since the last reset
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.scale, 1.0);
        assert!((clock.max_delta - 0.1).abs() < EPS);
        assert_eq!(clock.units_per_second, 1000.0);
        assert_eq!(clock.last_timestamp(), None);
    }

    #[test]
    fn test_clamped_sequence() {
        let mut clock = FrameClock::new();
        let deltas: Vec<f64> = [0.0, 16.0, 33.0, 5000.0]
            .iter()
            .map(|&t| clock.tick(t))
            .collect();
        let expected = [0.0, 0.016, 0.017, 0.1];
        for (dt, want) in deltas.iter().zip(expected) {
            assert!((dt - want).abs() < EPS, "got {}, want {}", dt, want);
        }
    }

    #[test]
    fn test_non_increasing_timestamp_yields_zero() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        assert_eq!(clock.tick(100.0), 0.0);
        assert_eq!(clock.tick(50.0), 0.0);
        assert!((clock.tick(60.0) - 0.01).abs() < EPS);
    }

    #[test]
    fn test_scale_applies_after_clamp() {
        let mut clock = FrameClock::with_settings(0.5, 0.1, 1000.0);
        clock.tick(0.0);
        assert!((clock.tick(1000.0) - 0.05).abs() < EPS);
        assert!((clock.tick(1020.0) - 0.01).abs() < EPS);
        assert!((clock.last_elapsed_ms() - 20.0).abs() < EPS);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.tick(16.0);
        clock.reset();
        assert_eq!(clock.tick(500.0), 0.0);
        assert_eq!(clock.total_time(), 0.0);
    }

    #[test]
    fn test_seconds_timestamps() {
        let mut clock = FrameClock::with_settings(1.0, 0.25, 1.0);
        clock.tick(1.0);
        assert!((clock.tick(1.2) - 0.2).abs() < 1e-6);
        assert!((clock.last_elapsed_ms() - 200.0).abs() < 1e-6);
    }
}
