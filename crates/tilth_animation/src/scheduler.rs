//! Cooperative timer queue
//!
//! Deferred work is stored as plain data and released by [`TimerQueue::pop_due`]
//! when the caller's clock passes its due time. Entries due at the same
//! instant come out in the order they were scheduled.

use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};
use tracing::trace;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

struct TimerEntry<T> {
    due: Instant,
    seq: u64,
    task: T,
}

/// Pending one-shot timers carrying a payload of type `T`
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, TimerEntry<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    /// Schedule `task` to run `delay` after `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.timers.insert(TimerEntry {
            due: now + delay,
            seq,
            task,
        });
        trace!("Scheduled timer {:?} in {:?} ({} pending)", id, delay, self.timers.len());
        id
    }

    /// Cancel a pending timer, returning its payload if it had not fired
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let task = self.timers.remove(id).map(|entry| entry.task);
        if task.is_some() {
            trace!("Cancelled timer {:?}", id);
        }
        task
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Remove and return the earliest timer due at or before `now`
    ///
    /// Returns the instant the timer was due together with its payload.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, T)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(id, _)| id)?;
        self.timers.remove(id).map(|entry| (entry.due, entry.task))
    }

    /// Earliest due time among pending timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|entry| entry.due).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(start, ms(300), "hide");
        queue.schedule(start, ms(10), "show");
        queue.schedule(start, ms(3000), "remove");

        assert!(queue.pop_due(start + ms(5)).is_none());

        let now = start + ms(400);
        assert_eq!(queue.pop_due(now).map(|(_, t)| t), Some("show"));
        assert_eq!(queue.pop_due(now).map(|(_, t)| t), Some("hide"));
        assert!(queue.pop_due(now).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(start + ms(3000)));
    }

    #[test]
    fn test_same_deadline_keeps_schedule_order() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        for i in 0..5 {
            queue.schedule(start, ms(10), i);
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(start + ms(10)))
            .map(|(_, t)| t)
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        let id = queue.schedule(start, ms(10), 'a');
        assert!(queue.is_pending(id));
        assert_eq!(queue.cancel(id), Some('a'));
        assert_eq!(queue.cancel(id), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_reports_due_time() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(start, ms(200), ());
        let (due, _) = queue.pop_due(start + ms(1000)).unwrap();
        assert_eq!(due, start + ms(200));
    }
}
