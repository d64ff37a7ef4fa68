//! Timer scheduling for delayed and repeating widget actions
//!
//! Widgets never hold callbacks into themselves. Instead they schedule a
//! timer tagged with their [`WidgetId`]; when it fires, the host delivers
//! `InputEvent::Timer(id)` back to the owner, which decides what to do. This
//! keeps every mutation on the event-delivery path and lets a superseded
//! timer be cancelled or paused before it fires.
//!
//! [`TimerScheduler`] is a deterministic implementation driven by a virtual
//! clock. Hosts advance it once per frame; tests advance it explicitly.
//!
//! ```ignore
//! let mut scheduler = TimerScheduler::new();
//! let timer = scheduler.schedule_once(widget_id, 100);
//!
//! for fired in scheduler.advance(16) {
//!     // deliver InputEvent::Timer(fired.timer) to fired.owner
//! }
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::events::WidgetId;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

/// Host scheduler interface consumed by widgets
pub trait Scheduler {
    /// Schedule a timer for `owner` that fires after `delay_ms`, then every
    /// `interval_ms` if one is given
    fn schedule(&mut self, owner: WidgetId, delay_ms: u64, interval_ms: Option<u64>) -> TimerId;

    /// Cancel a timer; returns `false` if it was already gone
    fn cancel(&mut self, timer: TimerId) -> bool;

    /// Pause a timer, keeping the time remaining until it fires
    fn pause(&mut self, timer: TimerId) -> bool;

    /// Resume a paused timer
    fn resume(&mut self, timer: TimerId) -> bool;

    /// Whether the timer exists and is not paused
    fn is_active(&self, timer: TimerId) -> bool;

    /// Schedule a one-shot timer
    fn schedule_once(&mut self, owner: WidgetId, delay_ms: u64) -> TimerId {
        self.schedule(owner, delay_ms, None)
    }

    /// Schedule a repeating timer
    fn schedule_repeating(&mut self, owner: WidgetId, delay_ms: u64, interval_ms: u64) -> TimerId {
        self.schedule(owner, delay_ms, Some(interval_ms))
    }
}

/// A timer that fired during [`TimerScheduler::advance`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    pub owner: WidgetId,
    pub timer: TimerId,
}

#[derive(Debug)]
struct TimerEntry {
    owner: WidgetId,
    due_ms: u64,
    interval_ms: Option<u64>,
    /// Time left until firing while paused
    paused_remaining: Option<u64>,
}

/// Deterministic scheduler driven by an explicit virtual clock
#[derive(Debug, Default)]
pub struct TimerScheduler {
    timers: SlotMap<TimerId, TimerEntry>,
    now_ms: u64,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live timers (active or paused)
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance the clock by `elapsed_ms`, returning fired timers in due order
    ///
    /// A repeating timer fires once per elapsed interval, so a long advance
    /// can report the same timer several times.
    pub fn advance(&mut self, elapsed_ms: u64) -> SmallVec<[FiredTimer; 4]> {
        let target = self.now_ms.saturating_add(elapsed_ms);
        let mut fired = SmallVec::new();

        loop {
            let next = self
                .timers
                .iter()
                .filter(|(_, t)| t.paused_remaining.is_none() && t.due_ms <= target)
                .min_by_key(|(_, t)| t.due_ms)
                .map(|(id, _)| id);

            let Some(id) = next else {
                break;
            };

            let Some(entry) = self.timers.get_mut(id) else {
                break;
            };
            self.now_ms = self.now_ms.max(entry.due_ms);
            fired.push(FiredTimer {
                owner: entry.owner,
                timer: id,
            });

            let interval = entry.interval_ms;
            match interval {
                Some(interval) => entry.due_ms += interval.max(1),
                None => {
                    self.timers.remove(id);
                }
            }
        }

        self.now_ms = target;
        if !fired.is_empty() {
            tracing::trace!(count = fired.len(), now = self.now_ms, "timers fired");
        }
        fired
    }
}

impl Scheduler for TimerScheduler {
    fn schedule(&mut self, owner: WidgetId, delay_ms: u64, interval_ms: Option<u64>) -> TimerId {
        self.timers.insert(TimerEntry {
            owner,
            due_ms: self.now_ms.saturating_add(delay_ms),
            interval_ms,
            paused_remaining: None,
        })
    }

    fn cancel(&mut self, timer: TimerId) -> bool {
        self.timers.remove(timer).is_some()
    }

    fn pause(&mut self, timer: TimerId) -> bool {
        let now = self.now_ms;
        match self.timers.get_mut(timer) {
            Some(entry) if entry.paused_remaining.is_none() => {
                entry.paused_remaining = Some(entry.due_ms.saturating_sub(now));
                true
            }
            _ => false,
        }
    }

    fn resume(&mut self, timer: TimerId) -> bool {
        let now = self.now_ms;
        match self.timers.get_mut(timer) {
            Some(entry) => match entry.paused_remaining.take() {
                Some(remaining) => {
                    entry.due_ms = now + remaining;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    fn is_active(&self, timer: TimerId) -> bool {
        self.timers
            .get(timer)
            .map(|t| t.paused_remaining.is_none())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = TimerScheduler::new();
        let owner = WidgetId::next();
        let timer = scheduler.schedule_once(owner, 100);

        assert!(scheduler.advance(99).is_empty());
        let fired = scheduler.advance(1);
        assert_eq!(fired.as_slice(), &[FiredTimer { owner, timer }]);
        assert!(scheduler.advance(1000).is_empty());
        assert!(!scheduler.is_active(timer));
    }

    #[test]
    fn test_repeating_fires_per_interval() {
        let mut scheduler = TimerScheduler::new();
        let owner = WidgetId::next();
        let timer = scheduler.schedule_repeating(owner, 250, 30);

        assert!(scheduler.advance(249).is_empty());
        assert_eq!(scheduler.advance(1).len(), 1);
        // 280, 310, 340
        assert_eq!(scheduler.advance(90).len(), 3);
        assert!(scheduler.cancel(timer));
        assert!(scheduler.advance(1000).is_empty());
    }

    #[test]
    fn test_pause_keeps_remaining_time() {
        let mut scheduler = TimerScheduler::new();
        let owner = WidgetId::next();
        let timer = scheduler.schedule_once(owner, 100);

        scheduler.advance(40);
        assert!(scheduler.pause(timer));
        assert!(!scheduler.is_active(timer));
        assert!(scheduler.advance(500).is_empty());

        assert!(scheduler.resume(timer));
        assert!(scheduler.advance(59).is_empty());
        assert_eq!(scheduler.advance(1).len(), 1);
    }

    #[test]
    fn test_cancelled_before_firing() {
        let mut scheduler = TimerScheduler::new();
        let owner = WidgetId::next();
        let timer = scheduler.schedule_once(owner, 10);
        assert!(scheduler.cancel(timer));
        assert!(!scheduler.cancel(timer));
        assert!(scheduler.advance(100).is_empty());
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = TimerScheduler::new();
        let a = WidgetId::next();
        let b = WidgetId::next();
        let late = scheduler.schedule_once(a, 50);
        let early = scheduler.schedule_once(b, 20);

        let fired = scheduler.advance(100);
        assert_eq!(fired[0].timer, early);
        assert_eq!(fired[1].timer, late);
    }
}
