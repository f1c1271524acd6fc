//! Eased integer counters
//!
//! A [`CountUp`] animates from zero to an integer target over a fixed
//! duration. Intermediate values are floored, and the final frame is always
//! the exact target regardless of floating point drift.

use std::time::{Duration, Instant};

use crate::easing::Easing;

/// One sampled frame of a count-up animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountUpFrame {
    pub value: i64,
    pub finished: bool,
}

#[derive(Clone, Debug)]
pub struct CountUp {
    target: i64,
    duration: Duration,
    easing: Easing,
    started: Instant,
    steps: Option<u32>,
}

impl CountUp {
    pub fn new(target: i64, duration: Duration, started: Instant) -> Self {
        Self {
            target,
            duration,
            easing: Easing::EaseOutQuart,
            started,
            steps: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Advance in `steps` equal increments instead of every frame
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = (steps > 0).then_some(steps);
        self
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    /// Normalized progress at `now`, clamped to `[0, 1]`
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let raw = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        match self.steps {
            Some(steps) => (raw * steps as f64).floor() / steps as f64,
            None => raw,
        }
    }

    pub fn sample(&self, now: Instant) -> CountUpFrame {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return CountUpFrame {
                value: self.target,
                finished: true,
            };
        }
        let eased = self.easing.apply(progress);
        CountUpFrame {
            value: (self.target as f64 * eased).floor() as i64,
            finished: false,
        }
    }
}
