//! SwitchMap operator
//!
//! Transforms each value emitted by the source into an inner Observable, and
//! forwards items from only the most recently created inner Observable. When a
//! new inner Observable is produced, the previous one is unsubscribed.
//!
//! Behavior summary:
//! - Only the latest inner Observable's emissions are forwarded downstream.
//! - The operator completes only after the source completes and the current
//!   inner Observable completes.
//! - Errors from the source or from the current inner Observable are propagated
//!   immediately.
//!
//! Common uses: canceling in-flight operations (e.g. API calls) when new data
//! arrives, implementing type-ahead search, or switching between streams based
//! on user input.
//!
//! Example:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxflow::prelude::*;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let source = Subject::<u32, ()>::new();
//! let c_scheduler = scheduler.clone();
//! let _subscription = source
//!   .clone()
//!   .switch_map(move |value| {
//!     timer(Duration::from_millis(100), c_scheduler.clone())
//!       .map(move |_| format!("Result from {}", value))
//!   })
//!   .subscribe(|result| println!("{}", result));
//!
//! source.next(1);
//! source.next(2);
//! scheduler.flush(); // prints "Result from 2" only
//! ```

use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

#[derive(Clone)]
pub struct SwitchMapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> SwitchMapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { SwitchMapOp { source, func } }
}

struct SwitchMapState {
  inner: Option<Subscription>,
  outer_completed: bool,
  closed: bool,
}

#[doc(hidden)]
pub struct SwitchMapShared<O> {
  observer: RefCell<O>,
  state: RefCell<SwitchMapState>,
  subscription: Subscription,
}

impl<O> SwitchMapShared<O> {
  fn is_closed(&self) -> bool { self.state.borrow().closed }

  fn error<Item, Err>(&self, err: Err)
  where
    O: Observer<Item, Err>,
  {
    let inner = {
      let mut state = self.state.borrow_mut();
      if state.closed {
        return;
      }
      state.closed = true;
      state.inner.take()
    };
    if let Some(inner) = inner {
      inner.unsubscribe();
    }
    self.observer.borrow_mut().error(err);
  }

  fn complete<Item, Err>(&self)
  where
    O: Observer<Item, Err>,
  {
    self.observer.borrow_mut().complete();
  }
}

impl<S, F, Inner> Observable for SwitchMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> Inner + 'static,
  Inner: Observable<Err = S::Err>,
  Inner::Item: 'static,
  S::Err: 'static,
{
  type Item = Inner::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Inner::Item, S::Err> + 'static,
  {
    let shared = Rc::new(SwitchMapShared {
      observer: RefCell::new(observer),
      state: RefCell::new(SwitchMapState { inner: None, outer_completed: false, closed: false }),
      subscription: subscription.clone(),
    });
    self
      .source
      .actual_subscribe(SwitchMapOuterObserver { shared, func: self.func }, subscription)
  }
}

pub struct SwitchMapOuterObserver<O, F> {
  shared: Rc<SwitchMapShared<O>>,
  func: F,
}

impl<O, F, Item, Inner> Observer<Item, Inner::Err> for SwitchMapOuterObserver<O, F>
where
  O: Observer<Inner::Item, Inner::Err> + 'static,
  F: FnMut(Item) -> Inner,
  Inner: Observable,
{
  fn next(&mut self, value: Item) {
    if self.shared.is_closed() {
      return;
    }
    let previous = self.shared.state.borrow_mut().inner.take();
    if let Some(previous) = previous {
      tracing::trace!(inner = previous.id(), "switching away from inner observable");
      self.shared.subscription.remove(&previous);
      previous.unsubscribe();
    }

    let inner = (self.func)(value);
    let child = Subscription::new();
    self.shared.subscription.add(child.clone());
    self.shared.state.borrow_mut().inner = Some(child.clone());
    let observer = SwitchMapInnerObserver { shared: self.shared.clone(), subscription: child.clone() };
    inner.actual_subscribe(Subscriber::new(observer, child.clone()), &child);
  }

  fn error(&mut self, err: Inner::Err) { self.shared.error::<Inner::Item, _>(err) }

  fn complete(&mut self) {
    let done = {
      let mut state = self.shared.state.borrow_mut();
      if state.closed {
        return;
      }
      state.outer_completed = true;
      state.closed = state.inner.is_none();
      state.closed
    };
    if done {
      self.shared.complete::<Inner::Item, Inner::Err>();
    }
  }

  fn is_closed(&self) -> bool { self.shared.is_closed() }
}

pub struct SwitchMapInnerObserver<O> {
  shared: Rc<SwitchMapShared<O>>,
  subscription: Subscription,
}

impl<O, Item, Err> Observer<Item, Err> for SwitchMapInnerObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.shared.is_closed() {
      self.shared.observer.borrow_mut().next(value);
    }
  }

  fn error(&mut self, err: Err) { self.shared.error::<Item, Err>(err) }

  fn complete(&mut self) {
    self.shared.subscription.remove(&self.subscription);
    {
      let mut state = self.shared.state.borrow_mut();
      if state.inner.as_ref() != Some(&self.subscription) {
        return;
      }
      state.inner = None;
      if state.closed || !state.outer_completed {
        return;
      }
      state.closed = true;
    }
    self.shared.complete::<Item, Err>();
  }

  fn is_closed(&self) -> bool { self.shared.is_closed() || self.subscription.is_closed() }
}
