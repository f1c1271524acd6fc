//! Rate limiting for high-frequency callbacks
//!
//! - [`Throttle`] runs the first call in a window and silently drops the rest
//!   until the window closes. Dropped calls are not queued.
//! - [`Debounce`] waits for a quiet period and then runs once, using the
//!   arguments of the last call.
//!
//! Both come in a bare gate form and a wrapper form that owns the callback.

use std::time::{Duration, Instant};

/// Leading-edge throttle gate
#[derive(Clone, Debug)]
pub struct Throttle {
    limit: Duration,
    open_at: Option<Instant>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            open_at: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Returns `true` if a call at `now` may run, and closes the window if so
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(open_at) = self.open_at {
            if now < open_at {
                return false;
            }
        }
        self.open_at = Some(now + self.limit);
        true
    }

    /// Whether a call at `now` would be dropped
    pub fn is_closed(&self, now: Instant) -> bool {
        self.open_at.is_some_and(|open_at| now < open_at)
    }

    pub fn reset(&mut self) {
        self.open_at = None;
    }
}

/// A callback wrapped in a [`Throttle`]
pub struct Throttled<F> {
    gate: Throttle,
    func: F,
}

impl<F> Throttled<F> {
    pub fn new(limit: Duration, func: F) -> Self {
        Self {
            gate: Throttle::new(limit),
            func,
        }
    }

    /// Invoke the callback unless the current window is closed
    pub fn call<A, R>(&mut self, now: Instant, arg: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if self.gate.try_acquire(now) {
            Some((self.func)(arg))
        } else {
            None
        }
    }
}

/// Trailing-edge debounce gate
#[derive(Clone, Debug)]
pub struct Debounce {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    /// Record a call, pushing the deadline back
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    /// Returns `true` exactly once after the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending call will fire
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// A callback wrapped in a [`Debounce`], remembering the latest arguments
pub struct Debounced<F, A> {
    gate: Debounce,
    func: F,
    pending: Option<A>,
}

impl<F, A> Debounced<F, A> {
    pub fn new(wait: Duration, func: F) -> Self {
        Self {
            gate: Debounce::new(wait),
            func,
            pending: None,
        }
    }

    /// Schedule a call; replaces any pending arguments
    pub fn call(&mut self, now: Instant, arg: A) {
        self.pending = Some(arg);
        self.gate.touch(now);
    }

    /// Run the pending call if the quiet period has elapsed
    pub fn poll<R>(&mut self, now: Instant) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if !self.gate.poll(now) {
            return None;
        }
        let arg = self.pending.take()?;
        Some((self.func)(arg))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.gate.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_throttle_burst_runs_once() {
        let start = Instant::now();
        let mut count = 0;
        let mut throttled = Throttled::new(ms(100), |_: ()| count += 1);

        for i in 0..10 {
            throttled.call(start + ms(i * 5), ());
        }
        drop(throttled);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_throttle_reopens_after_limit() {
        let start = Instant::now();
        let mut count = 0;
        let mut throttled = Throttled::new(ms(100), |_: ()| count += 1);

        throttled.call(start, ());
        throttled.call(start + ms(150), ());
        drop(throttled);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_throttle_drops_instead_of_queueing() {
        let start = Instant::now();
        let mut gate = Throttle::from_millis(100);

        assert!(gate.try_acquire(start));
        assert!(!gate.try_acquire(start + ms(99)));
        assert!(gate.is_closed(start + ms(99)));
        // The dropped call did not extend the window
        assert!(gate.try_acquire(start + ms(100)));
    }

    #[test]
    fn test_throttle_returns_value() {
        let start = Instant::now();
        let mut throttled = Throttled::new(ms(16), |y: f64| y * 0.4);
        assert_eq!(throttled.call(start, 100.0), Some(40.0));
        assert_eq!(throttled.call(start + ms(1), 200.0), None);
    }

    #[test]
    fn test_zero_limit_never_drops() {
        let start = Instant::now();
        let mut gate = Throttle::new(Duration::ZERO);
        assert!(gate.try_acquire(start));
        assert!(gate.try_acquire(start));
    }

    #[test]
    fn test_debounce_single_trailing_call() {
        let start = Instant::now();
        let mut seen = Vec::new();
        let mut debounced = Debounced::new(ms(200), |v: u32| seen.push(v));

        debounced.call(start, 1);
        debounced.call(start + ms(50), 2);
        debounced.call(start + ms(100), 3);

        assert_eq!(debounced.poll::<()>(start + ms(250)), None);
        assert_eq!(debounced.poll::<()>(start + ms(300)), Some(()));
        assert_eq!(debounced.poll::<()>(start + ms(900)), None);
        drop(debounced);
        assert_eq!(seen, vec![3]);
    }

    #[test]
    fn test_debounce_gate_cancel() {
        let start = Instant::now();
        let mut gate = Debounce::new(ms(10));
        gate.touch(start);
        assert!(gate.is_pending());
        gate.cancel();
        assert!(!gate.poll(start + ms(20)));
    }
}
