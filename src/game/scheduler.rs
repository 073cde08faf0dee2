use std::time::Duration;

/// Identifies one registered periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Registry of repeating tasks driven by an explicit clock.
///
/// Callers drain due work with [`Scheduler::pop_due`] one task at a time, so a
/// task's handler may cancel or register other tasks before the next one fires.
pub trait Scheduler<T> {
    /// Elapsed time on the scheduler's clock.
    fn now(&self) -> Duration;

    /// Registers `task` to fire every `period`, first at `now() + period`.
    fn schedule_repeating(&mut self, period: Duration, task: T) -> TaskHandle;

    /// Returns `false` when the handle was not registered.
    fn cancel(&mut self, handle: TaskHandle) -> bool;

    fn cancel_all(&mut self);

    fn pending(&self) -> usize;

    /// Fires the earliest task due at or before `deadline`, moving the clock to
    /// its due time. Ties go to the task registered first.
    fn pop_due(&mut self, deadline: Duration) -> Option<T>;

    /// Moves the clock forward to `deadline` once nothing else is due.
    fn settle(&mut self, deadline: Duration);
}

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TaskHandle,
    period: Duration,
    due: Duration,
    task: T,
}

/// Scheduler over a virtual clock that only moves when advanced.
#[derive(Debug, Clone)]
pub struct VirtualScheduler<T> {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for VirtualScheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> VirtualScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn period_of(&self, handle: TaskHandle) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.period)
    }
}

impl<T: Clone> Scheduler<T> for VirtualScheduler<T> {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_repeating(&mut self, period: Duration, task: T) -> TaskHandle {
        // A zero period would fire forever without the clock moving.
        let period = period.max(Duration::from_millis(1));
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            period,
            due: self.now + period,
            task,
        });
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    fn cancel_all(&mut self) {
        self.entries.clear();
    }

    fn pending(&self) -> usize {
        self.entries.len()
    }

    fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        let entry = self
            .entries
            .iter_mut()
            .filter(|entry| entry.due <= deadline)
            .min_by_key(|entry| (entry.due, entry.handle))?;
        self.now = self.now.max(entry.due);
        entry.due += entry.period;
        Some(entry.task.clone())
    }

    fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn drain(scheduler: &mut VirtualScheduler<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(task) = scheduler.pop_due(until) {
            fired.push(task);
        }
        scheduler.settle(until);
        fired
    }

    #[test]
    fn tasks_fire_in_due_order_with_ties_by_registration() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule_repeating(ms(20), "slow");
        scheduler.schedule_repeating(ms(10), "fast");
        let fired = drain(&mut scheduler, ms(40));
        assert_eq!(fired, vec!["fast", "slow", "fast", "fast", "slow", "fast"]);
        assert_eq!(scheduler.now(), ms(40));
    }

    #[test]
    fn nothing_fires_before_first_period() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule_repeating(ms(30), "tick");
        assert!(drain(&mut scheduler, ms(29)).is_empty());
        assert_eq!(drain(&mut scheduler, ms(30)), vec!["tick"]);
    }

    #[test]
    fn cancelled_tasks_stop_firing() {
        let mut scheduler = VirtualScheduler::new();
        let tick = scheduler.schedule_repeating(ms(10), "tick");
        scheduler.schedule_repeating(ms(15), "spawn");
        assert!(scheduler.cancel(tick));
        assert!(!scheduler.cancel(tick));
        assert!(!scheduler.is_scheduled(tick));
        assert_eq!(drain(&mut scheduler, ms(30)), vec!["spawn", "spawn"]);

        scheduler.cancel_all();
        assert_eq!(scheduler.pending(), 0);
        assert!(drain(&mut scheduler, ms(100)).is_empty());
    }

    #[test]
    fn registration_mid_run_starts_from_current_time() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule_repeating(ms(10), "a");
        assert_eq!(scheduler.pop_due(ms(100)), Some("a"));
        let late = scheduler.schedule_repeating(ms(25), "b");
        assert_eq!(scheduler.period_of(late), Some(ms(25)));
        let fired = drain(&mut scheduler, ms(40));
        assert_eq!(fired, vec!["a", "a", "b", "a"]);
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut scheduler = VirtualScheduler::new();
        let handle = scheduler.schedule_repeating(Duration::ZERO, "spin");
        assert_eq!(scheduler.period_of(handle), Some(ms(1)));
        assert_eq!(drain(&mut scheduler, ms(3)).len(), 3);
    }
}
