//! Deadline queue for dismissal timers.
//!
//! Timers never fire on their own: the owner polls [`TimerQueue::pop_due`]
//! with the current time, which keeps firing order deterministic under a
//! manual clock.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    by_deadline: BTreeMap<(DateTime<Utc>, TimerId), T>,
    deadlines: HashMap<TimerId, DateTime<Utc>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            by_deadline: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer firing `delay` after `now`.
    pub fn arm(&mut self, now: DateTime<Utc>, delay: Duration, payload: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.by_deadline.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Returns `false` when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.deadlines
            .remove(&id)
            .and_then(|deadline| self.by_deadline.remove(&(deadline, id)))
            .is_some()
    }

    /// Earliest due timer, in deadline then arming order.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(TimerId, T)> {
        let (&(deadline, id), _) = self.by_deadline.first_key_value()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.by_deadline
            .remove(&(deadline, id))
            .map(|payload| (id, payload))
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
    }

    #[must_use]
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;
    use chrono::DateTime;
    use std::time::Duration;

    #[test]
    fn timers_fire_in_deadline_order() {
        let start = DateTime::UNIX_EPOCH;
        let mut queue = TimerQueue::new();
        queue.arm(start, Duration::from_secs(2), "late");
        queue.arm(start, Duration::from_secs(1), "early");
        queue.arm(start, Duration::from_secs(1), "early-second");

        let later = start + chrono::Duration::seconds(5);
        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(later))
            .map(|(_, payload)| payload)
            .collect();
        assert_eq!(fired, ["early", "early-second", "late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn nothing_fires_before_the_deadline() {
        let start = DateTime::UNIX_EPOCH;
        let mut queue = TimerQueue::new();
        queue.arm(start, Duration::from_millis(500), ());
        assert!(queue.pop_due(start).is_none());
        assert_eq!(
            queue.next_deadline(),
            Some(start + chrono::Duration::milliseconds(500))
        );
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let start = DateTime::UNIX_EPOCH;
        let mut queue = TimerQueue::new();
        let id = queue.arm(start, Duration::ZERO, ());
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(!queue.is_armed(id));
        assert!(queue.pop_due(start).is_none());
    }
}
