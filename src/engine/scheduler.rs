// Timed spawn scheduling.
// Pending spawns wait in a PriorityQueue keyed on trigger time; each tick the
// head is peeked and only dequeued once its time has come.

use std::cmp::Ordering;

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::priority_queue::PriorityQueue;

/// One pending spawn.
///
/// Ordered by `due`, then by `seq` (insertion order), so spawns scheduled for
/// the same instant come out first-in first-out.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledSpawn {
    /// Game time in seconds at which the unit appears.
    pub due: f32,
    pub seq: u64,
    pub position: Vec3,
}

impl Ord for ScheduledSpawn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledSpawn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the ordering key; position is payload.
impl PartialEq for ScheduledSpawn {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledSpawn {}

#[derive(Resource, Default)]
pub struct SpawnScheduler {
    queue: PriorityQueue<ScheduledSpawn>,
    next_seq: u64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a spawn at `position` for game time `due`. Returns its sequence
    /// number, or `None` if `due` is NaN or infinite.
    pub fn schedule(&mut self, due: f32, position: Vec3) -> Option<u64> {
        if !due.is_finite() {
            log::warn!("rejected spawn with non-finite trigger time {}", due);
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.enqueue(ScheduledSpawn { due, seq, position });
        log::trace!("scheduled spawn #{} at t={:.2}", seq, due);
        Some(seq)
    }

    /// Trigger time of the earliest pending spawn.
    pub fn next_due(&self) -> Option<f32> {
        self.queue.peek().map(|s| s.due)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop a pending spawn before it fires. Returns false if it already fired
    /// or was never scheduled.
    pub fn cancel(&mut self, seq: u64) -> bool {
        let Some(target) = self.queue.iter().find(|s| s.seq == seq).copied() else {
            return false;
        };
        self.queue.remove(&target).is_some()
    }

    /// Remove and return every spawn with `due <= now`, earliest first.
    pub fn pop_due(&mut self, now: f32) -> Vec<ScheduledSpawn> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|s| s.due <= now) {
            match self.queue.dequeue() {
                Ok(spawn) => due.push(spawn),
                Err(_) => break,
            }
        }
        if !due.is_empty() {
            log::debug!(
                "t={:.2}: {} spawns due, {} pending",
                now,
                due.len(),
                self.queue.len()
            );
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_before_time() {
        let mut sched = SpawnScheduler::new();
        sched.schedule(2.0, Vec3::ZERO);
        assert!(sched.pop_due(1.5).is_empty());
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.next_due(), Some(2.0));
    }

    #[test]
    fn test_pop_due_in_time_order() {
        let mut sched = SpawnScheduler::new();
        sched.schedule(3.0, Vec3::X);
        sched.schedule(1.0, Vec3::Y);
        sched.schedule(2.0, Vec3::Z);
        sched.schedule(5.0, Vec3::ONE);

        let due: Vec<f32> = sched.pop_due(3.0).iter().map(|s| s.due).collect();
        assert_eq!(due, vec![1.0, 2.0, 3.0]);
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.next_due(), Some(5.0));
    }

    #[test]
    fn test_same_time_is_fifo() {
        let mut sched = SpawnScheduler::new();
        for i in 0..8 {
            sched.schedule(1.0, Vec3::new(i as f32, 0.0, 0.0));
        }
        let xs: Vec<f32> = sched.pop_due(1.0).iter().map(|s| s.position.x).collect();
        assert_eq!(xs, (0..8).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel() {
        let mut sched = SpawnScheduler::new();
        let a = sched.schedule(1.0, Vec3::ZERO).unwrap();
        let b = sched.schedule(0.5, Vec3::ZERO).unwrap();
        assert!(sched.cancel(b));
        assert!(!sched.cancel(b));
        assert_eq!(sched.next_due(), Some(1.0));
        assert_eq!(sched.pop_due(10.0)[0].seq, a);
        assert_eq!(sched.next_due(), None);
    }

    #[test]
    fn test_non_finite_times_are_rejected() {
        let mut sched = SpawnScheduler::new();
        assert_eq!(sched.schedule(-f32::NAN, Vec3::ZERO), None);
        assert_eq!(sched.schedule(f32::NAN, Vec3::ZERO), None);
        assert_eq!(sched.schedule(f32::INFINITY, Vec3::ZERO), None);
        assert_eq!(sched.schedule(f32::NEG_INFINITY, Vec3::ZERO), None);
        assert!(sched.schedule(0.0, Vec3::X).is_some());

        assert_eq!(sched.pending(), 1);
        let fired = sched.pop_due(100.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].position, Vec3::X);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.next_due(), None);
    }
}
