//! Virtual time scheduler for deterministic timing.
//!
//! Provides virtual time that only advances when explicitly instructed,
//! enabling deterministic testing of `debounce`, `timer`, `interval`, etc.
//!
//! ```rust
//! use std::{convert::Infallible, time::Duration};
//!
//! use rxflow::prelude::*;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! timer::<Infallible, _>(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(|_| println!("fired"));
//!
//! // Advance virtual time to trigger the emission
//! scheduler.advance_by(Duration::from_millis(100));
//! ```
//!
//! Unlike a thread-local test clock, every `VirtualTimeScheduler::new()` is
//! an independent clock; clones share it.

use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
  time::Duration,
};

use super::{Scheduler, TaskHandle};

struct ScheduledTask {
  due: Duration,
  task_id: usize,
  task: Box<dyn FnOnce()>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.task_id == other.task_id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

#[derive(Default)]
struct VirtualState {
  now: Duration,
  queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

/// A scheduler driven by a virtual clock.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler(Rc<RefCell<VirtualState>>);

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  /// Advance the clock by `duration`, running every task that becomes due.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Advance the clock to `target`, running every task due at or before it.
  ///
  /// Tasks scheduled by running tasks are picked up in the same call when
  /// they are due. Moving backwards is a no-op.
  pub fn advance_to(&self, target: Duration) {
    while let Some(task) = self.pop_due(Some(target)) {
      task.handle.run(task.task);
    }
    let mut state = self.0.borrow_mut();
    if state.now < target {
      state.now = target;
    }
  }

  /// Run every pending task, advancing the clock to the last due time.
  pub fn flush(&self) {
    while let Some(task) = self.pop_due(None) {
      task.handle.run(task.task);
    }
  }

  /// Number of scheduled tasks that are neither cancelled nor run.
  pub fn pending_count(&self) -> usize {
    self
      .0
      .borrow()
      .queue
      .iter()
      .filter(|t| !t.handle.is_cancelled() && !t.handle.is_finished())
      .count()
  }

  /// Drop a cancelled task from the queue. The task closure is released
  /// after the queue borrow ends, as dropping it may cancel other tasks.
  fn discard(&self, task_id: usize) {
    let Ok(mut state) = self.0.try_borrow_mut() else {
      // Still skipped when it comes due.
      return;
    };
    let (discarded, kept): (Vec<_>, Vec<_>) =
      std::mem::take(&mut state.queue).into_iter().partition(|t| t.task_id == task_id);
    state.queue = kept.into();
    drop(state);
    drop(discarded);
  }

  fn pop_due(&self, target: Option<Duration>) -> Option<ScheduledTask> {
    let mut state = self.0.borrow_mut();
    let due = state.queue.peek()?.due;
    if target.is_some_and(|target| due > target) {
      return None;
    }
    let task = state.queue.pop()?;
    if state.now < task.due {
      state.now = task.due;
    }
    Some(task)
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn schedule<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + 'static,
  {
    let handle = TaskHandle::new();
    let mut state = self.0.borrow_mut();
    let due = state.now + delay;
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    tracing::trace!(task_id, due_ms = due.as_millis() as u64, "task scheduled on virtual clock");
    state.queue.push(ScheduledTask { due, task_id, task: Box::new(task), handle: handle.clone() });
    drop(state);

    let weak = Rc::downgrade(&self.0);
    handle.on_cancel(move || {
      if let Some(state) = weak.upgrade() {
        VirtualTimeScheduler(state).discard(task_id);
      }
    });
    handle
  }

  fn now(&self) -> Duration { self.0.borrow().now }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  fn recorder() -> (Rc<RefCell<Vec<(u64, &'static str)>>>, VirtualTimeScheduler) {
    (Rc::new(RefCell::new(vec![])), VirtualTimeScheduler::new())
  }

  fn push_at(
    scheduler: &VirtualTimeScheduler,
    log: &Rc<RefCell<Vec<(u64, &'static str)>>>,
    delay: u64,
    name: &'static str,
  ) -> TaskHandle {
    let log = log.clone();
    let c_scheduler = scheduler.clone();
    scheduler.schedule(Duration::from_millis(delay), move || {
      log.borrow_mut().push((c_scheduler.now().as_millis() as u64, name))
    })
  }

  #[test]
  fn fires_in_due_order_then_fifo() {
    let (log, scheduler) = recorder();
    push_at(&scheduler, &log, 30, "c");
    push_at(&scheduler, &log, 10, "a");
    push_at(&scheduler, &log, 20, "b1");
    push_at(&scheduler, &log, 20, "b2");

    scheduler.advance_by(Duration::from_millis(25));
    assert_eq!(*log.borrow(), vec![(10, "a"), (20, "b1"), (20, "b2")]);
    assert_eq!(scheduler.now(), Duration::from_millis(25));

    scheduler.flush();
    assert_eq!(log.borrow().last(), Some(&(30, "c")));
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn cancelled_task_never_runs() {
    let (log, scheduler) = recorder();
    let handle = push_at(&scheduler, &log, 10, "a");
    assert_eq!(scheduler.pending_count(), 1);
    handle.cancel();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_millis(100));
    assert!(log.borrow().is_empty());
  }

  #[test]
  fn cancel_releases_task_closure() {
    let scheduler = VirtualTimeScheduler::new();
    let state = Rc::new(());
    let handles: Vec<_> = (0..100)
      .map(|_| {
        let c_state = state.clone();
        scheduler.schedule(Duration::from_secs(60), move || drop(c_state))
      })
      .collect();
    assert_eq!(Rc::strong_count(&state), 101);

    handles.iter().for_each(TaskHandle::cancel);
    assert_eq!(Rc::strong_count(&state), 1);
    assert!(scheduler.0.borrow().queue.is_empty());
  }

  #[test]
  fn tasks_scheduled_while_firing_run_when_due() {
    let (log, scheduler) = recorder();
    let c_log = log.clone();
    let c_scheduler = scheduler.clone();
    scheduler.schedule(Duration::from_millis(10), move || {
      push_at(&c_scheduler, &c_log, 5, "nested");
    });

    scheduler.advance_by(Duration::from_millis(20));
    assert_eq!(*log.borrow(), vec![(15, "nested")]);
  }

  #[test]
  fn independent_clocks() {
    let a = VirtualTimeScheduler::new();
    let b = VirtualTimeScheduler::new();
    a.advance_by(Duration::from_millis(10));
    assert_eq!(b.now(), Duration::ZERO);
    assert_eq!(a.clone().now(), Duration::from_millis(10));
  }
}
