//! Elapsed-time clock driving the animation.

use instant::Instant;

#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self::from_start(Instant::now())
    }

    pub fn from_start(start: Instant) -> Self {
        Self { start, last: start }
    }

    /// Seconds since the clock was started. Also resets the delta reference point.
    pub fn elapsed(&mut self) -> f32 {
        self.last = Instant::now();
        self.since_start(self.last)
    }

    /// Seconds since the previous call to `elapsed` or `delta`.
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }

    fn since_start(&self, now: Instant) -> f32 {
        now.duration_since(self.start).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant::Duration;

    #[test]
    fn elapsed_counts_from_start() {
        let start = Instant::now() - Duration::from_secs(2);
        let mut clock = Clock::from_start(start);
        let elapsed = clock.elapsed();
        assert!(elapsed >= 2.0, "{elapsed}");
        assert!(elapsed < 3.0, "{elapsed}");
    }

    #[test]
    fn delta_restarts_after_each_call() {
        let start = Instant::now() - Duration::from_secs(5);
        let mut clock = Clock::from_start(start);
        let first = clock.delta();
        assert!(first >= 5.0, "{first}");
        let second = clock.delta();
        assert!(second < 1.0, "{second}");
        // elapsed is unaffected by delta calls
        assert!(clock.elapsed() >= 5.0);
    }

    #[test]
    fn elapsed_resets_the_delta_reference() {
        let start = Instant::now() - Duration::from_secs(5);
        let mut clock = Clock::from_start(start);
        clock.elapsed();
        let delta = clock.delta();
        assert!(delta < 1.0, "{delta}");
    }
}
