use std::time::Duration;

use tokio::time::Instant;

use super::{Scheduler, TaskHandle};

/// Real-time scheduler running its delayed tasks on the current tokio
/// `LocalSet`.
///
/// Scheduling outside of a `LocalSet` panics, as `tokio::task::spawn_local`
/// does.
#[derive(Clone)]
pub struct TokioLocalScheduler {
  origin: Instant,
}

impl TokioLocalScheduler {
  pub fn new() -> Self { Self { origin: Instant::now() } }
}

impl Default for TokioLocalScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for TokioLocalScheduler {
  fn schedule<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + 'static,
  {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    let join = tokio::task::spawn_local(async move {
      tokio::time::sleep(delay).await;
      c_handle.run(task);
    });
    handle.on_cancel(move || join.abort());
    handle
  }

  fn now(&self) -> Duration { self.origin.elapsed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[tokio::test(flavor = "current_thread")]
  async fn fires_on_local_set() {
    let local = tokio::task::LocalSet::new();
    let log = Rc::new(RefCell::new(vec![]));
    let c_log = log.clone();
    local
      .run_until(async move {
        let scheduler = TokioLocalScheduler::new();
        let a = c_log.clone();
        scheduler.schedule(Duration::from_millis(20), move || a.borrow_mut().push("late"));
        let b = c_log.clone();
        scheduler.schedule(Duration::from_millis(10), move || b.borrow_mut().push("early"));
        let c = c_log.clone();
        let cancelled =
          scheduler.schedule(Duration::from_millis(5), move || c.borrow_mut().push("never"));
        cancelled.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;
      })
      .await;

    assert_eq!(*log.borrow(), vec!["early", "late"]);
  }

  #[tokio::test(flavor = "current_thread")]
  async fn cancel_aborts_sleeping_task() {
    let local = tokio::task::LocalSet::new();
    let state = Rc::new(());
    let c_state = state.clone();
    local
      .run_until(async move {
        let scheduler = TokioLocalScheduler::new();
        let handle = scheduler.schedule(Duration::from_secs(3600), move || drop(c_state));
        tokio::task::yield_now().await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(5)).await;
      })
      .await;

    assert_eq!(Rc::strong_count(&state), 1);
  }
}
