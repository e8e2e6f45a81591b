// crates/engine_ecs/src/scheduler.rs
//! Cooperative tasks multiplexed onto the frame tick.
//!
//! A [`Task`] runs until it returns a [`Step`]; `Step::Wait` is its only
//! suspension point. Tasks resume inside `Level::advance`, after every game
//! object has been updated, so between two waits a task has exclusive access
//! to the level.
//!
//! Each task may be bound to an owning entity. The owner acts as a liveness
//! token: removing the entity cancels its pending tasks, and a task whose
//! owner disappeared while it was running is dropped instead of rescheduled.

use std::any::type_name;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::entity::EntityId;
use crate::level::Level;

/// What a task wants after resuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait(Duration),
    Done,
}

pub trait Task {
    fn resume(&mut self, level: &mut Level) -> Step;

    fn label(&self) -> &'static str {
        type_name::<Self>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

pub(crate) struct ScheduledTask {
    id: TaskId,
    wake_at: Duration,
    seq: u64,
    owner: Option<EntityId>,
    task: Box<dyn Task>,
}

impl ScheduledTask {
    pub(crate) fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub(crate) fn label(&self) -> &'static str {
        self.task.label()
    }

    pub(crate) fn resume(&mut self, level: &mut Level) -> Step {
        self.task.resume(level)
    }
}

// Min-heap on (wake_at, seq): earliest first, FIFO among equal wake times.
impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.wake_at, other.seq).cmp(&(self.wake_at, self.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.wake_at == other.wake_at && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

#[derive(Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Game time: the sum of every frame delta handed to the level.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending_for(&self, owner: EntityId) -> usize {
        self.queue.iter().filter(|t| t.owner == Some(owner)).count()
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Schedules `task` to resume after `delay`.
    pub fn spawn(
        &mut self,
        delay: Duration,
        owner: Option<EntityId>,
        task: impl Task + 'static,
    ) -> TaskId {
        let seq = self.next_seq();
        let id = TaskId(seq);
        self.queue.push(ScheduledTask {
            id,
            wake_at: self.now + delay,
            seq,
            owner,
            task: Box::new(task),
        });
        id
    }

    /// Runs `f` once after `delay`.
    pub fn after<F>(&mut self, delay: Duration, owner: Option<EntityId>, f: F) -> TaskId
    where
        F: FnOnce(&mut Level) + 'static,
    {
        self.spawn(delay, owner, After(Some(f)))
    }

    /// Checks `predicate` every `cadence` (first check one cadence from now)
    /// and runs `then` once it holds.
    pub fn poll_until<P, F>(
        &mut self,
        cadence: Duration,
        owner: Option<EntityId>,
        predicate: P,
        then: F,
    ) -> TaskId
    where
        P: FnMut(&mut Level) -> bool + 'static,
        F: FnOnce(&mut Level) + 'static,
    {
        self.spawn(cadence, owner, PollUntil { cadence, predicate, then: Some(then) })
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|t| t.id != id);
        self.queue.len() != before
    }

    /// Drops every pending task bound to `owner`.
    pub fn cancel_owned_by(&mut self, owner: EntityId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|t| t.owner != Some(owner));
        before - self.queue.len()
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    pub(crate) fn pop_due(&mut self) -> Option<ScheduledTask> {
        if self.queue.peek().is_some_and(|t| t.wake_at <= self.now) {
            self.queue.pop()
        } else {
            None
        }
    }

    /// Wakes are measured from the previous wake so cadences don't drift
    /// with frame timing. A zero wait yields until the next frame.
    pub(crate) fn requeue(&mut self, mut task: ScheduledTask, wait: Duration) {
        task.wake_at = if wait.is_zero() {
            self.now + Duration::from_nanos(1)
        } else {
            task.wake_at + wait
        };
        task.seq = self.next_seq();
        self.queue.push(task);
    }
}

struct After<F>(Option<F>);

impl<F> Task for After<F>
where
    F: FnOnce(&mut Level),
{
    fn resume(&mut self, level: &mut Level) -> Step {
        if let Some(f) = self.0.take() {
            f(level);
        }
        Step::Done
    }
}

struct PollUntil<P, F> {
    cadence: Duration,
    predicate: P,
    then: Option<F>,
}

impl<P, F> Task for PollUntil<P, F>
where
    P: FnMut(&mut Level) -> bool,
    F: FnOnce(&mut Level),
{
    fn resume(&mut self, level: &mut Level) -> Step {
        if !(self.predicate)(level) {
            return Step::Wait(self.cadence);
        }
        if let Some(then) = self.then.take() {
            then(level);
        }
        Step::Done
    }
}
