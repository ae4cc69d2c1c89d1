use std::time::{Duration, Instant};

use futures::{executor::LocalSpawner, future, task::LocalSpawnExt, FutureExt};

use super::{Scheduler, TaskHandle};

/// Real-time scheduler spawning its delayed tasks onto a `futures`
/// `LocalPool`.
///
/// Tasks only make progress while the pool is being run.
///
/// ```rust
/// use std::{convert::Infallible, time::Duration};
///
/// use futures::executor::LocalPool;
/// use rxflow::prelude::*;
///
/// let mut pool = LocalPool::new();
/// let scheduler = LocalPoolScheduler::new(pool.spawner());
/// timer::<Infallible, _>(Duration::from_millis(1), scheduler).subscribe(|_| println!("tick"));
/// pool.run();
/// ```
#[derive(Clone)]
pub struct LocalPoolScheduler {
  spawner: LocalSpawner,
  origin: Instant,
}

impl LocalPoolScheduler {
  pub fn new(spawner: LocalSpawner) -> Self { Self { spawner, origin: Instant::now() } }
}

impl Scheduler for LocalPoolScheduler {
  fn schedule<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + 'static,
  {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    let (fut, abort) = future::abortable(async move {
      futures_time::task::sleep(delay.into()).await;
      c_handle.run(task);
    });
    // Aborting drops the sleeping future, and the task with it, on the
    // pool's next turn instead of when the delay runs out.
    handle.on_cancel(move || abort.abort());
    if let Err(err) = self.spawner.spawn_local(fut.map(|_| ())) {
      tracing::warn!(%err, "failed to spawn scheduled task");
      handle.cancel();
    }
    handle
  }

  fn now(&self) -> Duration { self.origin.elapsed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use futures::executor::LocalPool;

  use super::*;

  #[test]
  fn fires_in_delay_order() {
    let mut pool = LocalPool::new();
    let scheduler = LocalPoolScheduler::new(pool.spawner());
    let log = Rc::new(RefCell::new(vec![]));

    for (delay, name) in [(30, "c"), (5, "a"), (15, "b")] {
      let log = log.clone();
      scheduler.schedule(Duration::from_millis(delay), move || log.borrow_mut().push(name));
    }
    let cancelled = {
      let log = log.clone();
      scheduler.schedule(Duration::from_millis(1), move || log.borrow_mut().push("x"))
    };
    cancelled.cancel();

    pool.run();
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert!(scheduler.now() >= Duration::from_millis(30));
  }

  #[test]
  fn cancel_releases_task_before_delay() {
    let mut pool = LocalPool::new();
    let scheduler = LocalPoolScheduler::new(pool.spawner());
    let state = Rc::new(());
    let c_state = state.clone();
    let handle = scheduler.schedule(Duration::from_secs(3600), move || drop(c_state));
    pool.run_until_stalled();
    assert_eq!(Rc::strong_count(&state), 2);

    handle.cancel();
    pool.run_until_stalled();
    assert_eq!(Rc::strong_count(&state), 1);
  }
}
