//! Debounce operator
//!
//! Emits a value only after `duration` passed without the source emitting
//! another one. Every new value cancels the pending timer and restarts it, so
//! superseded values are dropped. On completion a pending value is emitted
//! right away, before the completion; on error it is discarded.

use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
  subscription::Subscription,
};

#[derive(Clone)]
pub struct DebounceOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> DebounceOp<S, SD> {
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    DebounceOp { source, duration, scheduler }
  }
}

struct DebounceState<Item> {
  trailing_value: Option<Item>,
  task_handle: Option<TaskHandle>,
}

impl<Item> DebounceState<Item> {
  /// Cancel the pending timer and hand back the value it was guarding.
  fn take_pending(&mut self) -> Option<Item> {
    if let Some(handle) = self.task_handle.take() {
      handle.cancel();
    }
    self.trailing_value.take()
  }
}

#[doc(hidden)]
pub struct DebounceShared<O, Item> {
  observer: RefCell<O>,
  state: RefCell<DebounceState<Item>>,
}

impl<S, SD> Observable for DebounceOp<S, SD>
where
  S: Observable,
  S::Item: 'static,
  SD: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let shared = Rc::new(DebounceShared {
      observer: RefCell::new(observer),
      state: RefCell::new(DebounceState { trailing_value: None, task_handle: None }),
    });
    let c_shared = shared.clone();
    subscription.add_teardown(move || {
      let pending = c_shared.state.borrow_mut().take_pending();
      drop(pending);
    });
    let observer = DebounceObserver {
      shared,
      delay: self.duration,
      scheduler: self.scheduler,
    };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct DebounceObserver<O, SD, Item> {
  shared: Rc<DebounceShared<O, Item>>,
  scheduler: SD,
  delay: Duration,
}

impl<O, SD, Item, Err> Observer<Item, Err> for DebounceObserver<O, SD, Item>
where
  O: Observer<Item, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
{
  fn next(&mut self, value: Item) {
    let superseded = {
      let mut state = self.shared.state.borrow_mut();
      let superseded = state.take_pending();
      state.trailing_value = Some(value);
      superseded
    };
    drop(superseded);

    let c_shared = self.shared.clone();
    let handle = self.scheduler.schedule(self.delay, move || {
      let value = {
        let mut state = c_shared.state.borrow_mut();
        state.task_handle = None;
        state.trailing_value.take()
      };
      if let Some(value) = value {
        c_shared.observer.borrow_mut().next(value);
      }
    });
    let mut state = self.shared.state.borrow_mut();
    if !handle.is_finished() {
      state.task_handle = Some(handle);
    }
  }

  fn error(&mut self, err: Err) {
    let pending = self.shared.state.borrow_mut().take_pending();
    drop(pending);
    self.shared.observer.borrow_mut().error(err);
  }

  fn complete(&mut self) {
    let pending = self.shared.state.borrow_mut().take_pending();
    let mut observer = self.shared.observer.borrow_mut();
    if let Some(value) = pending {
      observer.next(value);
    }
    observer.complete();
  }

  fn is_closed(&self) -> bool {
    self
      .shared
      .observer
      .try_borrow()
      .map_or(false, |o| o.is_closed())
  }
}
