//! World-scoped timer registry.
//!
//! Every repeating or one-shot action in a play session is registered here
//! and nowhere else. `cancel_all` synchronously stops all of them and closes
//! the scope, which is how the end-of-game hard freeze halts the simulation.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Timer<T> {
    id: TimerId,
    due_at: u64,
    /// `None` for one-shot timers.
    period: Option<u64>,
    task: T,
}

#[derive(Clone, Debug)]
pub struct TimerScope<T> {
    timers: Vec<Timer<T>>,
    next_id: u64,
    closed: bool,
}

impl<T> Default for TimerScope<T> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 0,
            closed: false,
        }
    }
}

impl<T: Clone> TimerScope<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `task` every `period_ms`, first at `now + period_ms`.
    pub fn every(&mut self, now: u64, period_ms: u64, task: T) -> TimerId {
        let period = period_ms.max(1);
        self.insert(now + period, Some(period), task)
    }

    /// Fire `task` once, `delay_ms` from `now`.
    pub fn after(&mut self, now: u64, delay_ms: u64, task: T) -> TimerId {
        self.insert(now + delay_ms, None, task)
    }

    fn insert(&mut self, due_at: u64, period: Option<u64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // A closed scope hands out ids that never fire.
        if !self.closed {
            self.timers.push(Timer { id, due_at, period, task });
        }
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.iter().position(|t| t.id == id) {
            Some(index) => {
                self.timers.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.closed = true;
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pops the earliest timer due at or before `until`. Ties go to the
    /// timer registered first. Repeating timers are re-armed one period
    /// later; one-shots are removed.
    pub fn pop_due(&mut self, until: u64) -> Option<(u64, T)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_at <= until)
            .min_by_key(|(_, t)| (t.due_at, t.id))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[index];
        let fired_at = timer.due_at;
        match timer.period {
            Some(period) => {
                timer.due_at += period;
                Some((fired_at, timer.task.clone()))
            }
            None => {
                let timer = self.timers.swap_remove(index);
                Some((fired_at, timer.task))
            }
        }
    }
}
