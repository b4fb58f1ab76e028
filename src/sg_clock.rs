//! Event clock: a [`PriorityHeap`] keyed by simulated time
//!
//! Events at the same time are ordered by [`Action::rank`] (highest first),
//! then by the order in which they were scheduled.

use std::cmp::Ordering;

use log::trace;

use crate::sg_heap::{PriorityHeap, TieBreak};
use crate::sg_interface::{Event, SimError, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub event: Event,
    sequence: u64,
}

/// Execute before deploy, attack before fix before rebuild
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionRank;

impl TieBreak<ScheduledEvent> for ActionRank {
    fn tie_break(&self, a: &ScheduledEvent, b: &ScheduledEvent) -> Ordering {
        b.event
            .action
            .rank()
            .cmp(&a.event.action.rank())
            .then(a.sequence.cmp(&b.sequence))
    }
}

pub struct EventClock {
    queue: PriorityHeap<ScheduledEvent, ActionRank>,
    now: SimTime,
    next_sequence: u64,
}

impl EventClock {
    pub fn new() -> Self {
        Self {
            queue: PriorityHeap::new(ActionRank),
            now: 0,
            next_sequence: 0,
        }
    }

    /// Time of the most recently fetched event
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule_at(&mut self, time: SimTime, event: Event) {
        trace!("schedule {:?} at {} (now {})", event, time, self.now);
        let scheduled = ScheduledEvent {
            event,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.queue.push(scheduled, time);
    }

    pub fn schedule_after(&mut self, delay: SimTime, event: Event) -> Result<(), SimError> {
        let time = self
            .now
            .checked_add(delay)
            .ok_or(SimError::TimeOverflow { now: self.now, delay })?;
        self.schedule_at(time, event);
        Ok(())
    }

    /// Pop the next event and advance the clock to its time
    pub fn fetch(&mut self) -> Result<(SimTime, Event), SimError> {
        let next = self.queue.pop()?;
        self.now = next.priority;
        Ok((next.priority, next.content.event))
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sg_interface::Action;

    #[test]
    fn test_fetch_in_time_order() {
        let mut clock = EventClock::new();
        clock.schedule_at(30, Event::new(Action::DeployFix));
        clock.schedule_at(10, Event::targeting(Action::DeployAttack, 2));
        clock.schedule_at(20, Event::new(Action::DeployRebuild));

        let times: Vec<SimTime> = (0..3).map(|_| clock.fetch().unwrap().0).collect();
        assert_eq!(times, vec![10, 20, 30]);
        assert_eq!(clock.now(), 30);
        assert!(clock.is_empty());
    }

    #[test]
    fn test_same_time_events_follow_action_rank() {
        let mut clock = EventClock::new();
        // scheduled lowest rank first on purpose
        clock.schedule_at(5, Event::new(Action::DeployRebuild));
        clock.schedule_at(5, Event::new(Action::ExecuteRebuild));
        clock.schedule_at(5, Event::new(Action::DeployFix));
        clock.schedule_at(5, Event::new(Action::ExecuteFix));
        clock.schedule_at(5, Event::targeting(Action::DeployAttack, 0));
        clock.schedule_at(5, Event::targeting(Action::ExecuteAttack, 1));

        let actions: Vec<Action> = (0..6).map(|_| clock.fetch().unwrap().1.action).collect();
        assert_eq!(
            actions,
            vec![
                Action::ExecuteAttack,
                Action::DeployAttack,
                Action::ExecuteFix,
                Action::DeployFix,
                Action::ExecuteRebuild,
                Action::DeployRebuild,
            ]
        );
    }

    #[test]
    fn test_equal_rank_is_fifo() {
        let mut clock = EventClock::new();
        for target in [4, 1, 3] {
            clock.schedule_at(0, Event::targeting(Action::DeployAttack, target));
        }

        let targets: Vec<_> = (0..3).map(|_| clock.fetch().unwrap().1.target).collect();
        assert_eq!(targets, vec![Some(4), Some(1), Some(3)]);
    }

    #[test]
    fn test_schedule_after_is_relative_to_now() {
        let mut clock = EventClock::new();
        clock.schedule_at(100, Event::new(Action::DeployFix));
        clock.fetch().unwrap();

        clock.schedule_after(20, Event::new(Action::ExecuteRebuild)).unwrap();
        assert_eq!(clock.fetch().unwrap().0, 120);
    }

    #[test]
    fn test_fetch_empty_clock_fails() {
        let mut clock = EventClock::new();
        assert_eq!(clock.fetch(), Err(SimError::EmptyHeap));
    }

    #[test]
    fn test_schedule_overflow_is_an_error() {
        let mut clock = EventClock::new();
        clock.schedule_at(SimTime::MAX - 5, Event::new(Action::DeployRebuild));
        clock.fetch().unwrap();

        assert_eq!(
            clock.schedule_after(10, Event::new(Action::ExecuteRebuild)),
            Err(SimError::TimeOverflow {
                now: SimTime::MAX - 5,
                delay: 10
            })
        );
    }
}
