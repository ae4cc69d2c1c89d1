//! Schedulers: the only place where the runtime touches time.
//!
//! A [`Scheduler`] runs a callback once after a delay and hands back a
//! [`TaskHandle`] that can cancel it. Timing operators (`debounce`, `timer`,
//! `interval`) take the scheduler as an explicit value:
//!
//! - [`VirtualTimeScheduler`]: a virtual clock that only moves when told to,
//!   for deterministic tests and simulations.
//! - `LocalPoolScheduler` (feature `timer`): real time on a `futures`
//!   `LocalPool`.
//! - `TokioLocalScheduler` (feature `tokio-scheduler`): real time on a tokio
//!   `LocalSet`.

use std::{
  cell::{Cell, RefCell},
  fmt::Debug,
  rc::Rc,
  time::Duration,
};

mod virtual_time;
pub use virtual_time::VirtualTimeScheduler;

#[cfg(all(feature = "timer", not(target_arch = "wasm32")))]
mod local_pool;
#[cfg(all(feature = "timer", not(target_arch = "wasm32")))]
pub use local_pool::LocalPoolScheduler;

#[cfg(feature = "tokio-scheduler")]
mod tokio_local;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_local::TokioLocalScheduler;

/// A Scheduler orders delayed callbacks.
///
/// Callbacks fire in non-decreasing order of their due time, and a callback
/// whose handle was cancelled before it fired never runs.
pub trait Scheduler: Clone + 'static {
  /// Run `task` once after `delay`.
  fn schedule<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + 'static;

  /// Time elapsed on this scheduler's clock.
  fn now(&self) -> Duration;
}

#[derive(Default)]
struct TaskFlags {
  cancelled: Cell<bool>,
  finished: Cell<bool>,
  // Releases whatever the scheduler holds for the task (timer, closure).
  on_cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Cancel handle of a scheduled task.
#[derive(Clone, Default)]
pub struct TaskHandle(Rc<TaskFlags>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// Prevent the task from running. Idempotent, and a no-op once the task
  /// has run.
  pub fn cancel(&self) {
    if self.0.finished.get() || self.0.cancelled.replace(true) {
      return;
    }
    tracing::trace!("scheduled task cancelled");
    let release = self.0.on_cancel.take();
    if let Some(release) = release {
      release();
    }
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.get() }

  /// Whether the task has already run.
  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.get() }

  /// Register the scheduler's release hook, run on the first `cancel`
  /// before the task fired.
  pub(crate) fn on_cancel<F: FnOnce() + 'static>(&self, release: F) {
    if self.is_cancelled() {
      release();
    } else if !self.is_finished() {
      *self.0.on_cancel.borrow_mut() = Some(Box::new(release));
    }
  }

  /// Run `task` unless the handle was cancelled; a handle runs at most once.
  pub(crate) fn run<F: FnOnce()>(&self, task: F) {
    if self.is_cancelled() || self.0.finished.replace(true) {
      return;
    }
    self.0.on_cancel.take();
    tracing::trace!("scheduled task fired");
    task();
  }
}

impl Debug for TaskHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskHandle")
      .field("cancelled", &self.is_cancelled())
      .field("finished", &self.is_finished())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[test]
  fn handle_runs_once() {
    let count = Rc::new(RefCell::new(0));
    let handle = TaskHandle::new();
    let c = count.clone();
    handle.run(move || *c.borrow_mut() += 1);
    let c = count.clone();
    handle.run(move || *c.borrow_mut() += 1);
    assert_eq!(*count.borrow(), 1);
    assert!(handle.is_finished());
  }

  #[test]
  fn cancelled_handle_never_runs() {
    let handle = TaskHandle::new();
    handle.cancel();
    handle.cancel();
    handle.run(|| panic!("must not run"));
    assert!(handle.is_cancelled());
    assert!(!handle.is_finished());
  }

  #[test]
  fn cancel_runs_release_hook_once() {
    let released = Rc::new(RefCell::new(0));
    let handle = TaskHandle::new();
    let c = released.clone();
    handle.on_cancel(move || *c.borrow_mut() += 1);
    handle.cancel();
    handle.cancel();
    assert_eq!(*released.borrow(), 1);

    let fired = TaskHandle::new();
    let c = released.clone();
    fired.on_cancel(move || *c.borrow_mut() += 1);
    fired.run(|| {});
    fired.cancel();
    assert_eq!(*released.borrow(), 1);
  }

  #[test]
  fn cancel_after_run_is_noop() {
    let handle = TaskHandle::new();
    handle.run(|| {});
    handle.cancel();
    assert!(!handle.is_cancelled());
  }
}
