//! Tap: side effects on the value channel.
//!
//! The closure sees each value by reference before it is forwarded. `tap`
//! does not observe errors or completion; combine it with `finalize` for
//! that.

use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct TapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> TapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TapOp { source, func } }
}

impl<S, F> Observable for TapOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    self
      .source
      .actual_subscribe(TapObserver { observer, func: self.func }, subscription)
  }
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<O, F, Item, Err> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value);
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct TryTapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> TryTapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TryTapOp { source, func } }
}

impl<S, F> Observable for TryTapOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> Result<(), S::Err> + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let observer = TryTapObserver { observer, func: self.func, done: false };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct TryTapObserver<O, F> {
  observer: O,
  func: F,
  done: bool,
}

impl<O, F, Item, Err> Observer<Item, Err> for TryTapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<(), Err>,
{
  fn next(&mut self, value: Item) {
    if self.done {
      return;
    }
    match (self.func)(&value) {
      Ok(()) => self.observer.next(value),
      Err(err) => {
        self.done = true;
        self.observer.error(err);
      }
    }
  }

  fn error(&mut self, err: Err) {
    if !self.done {
      self.done = true;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.done {
      self.done = true;
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.done || self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn runs_before_downstream() {
    let log = Rc::new(RefCell::new(vec![]));
    let (c1, c2) = (log.clone(), log.clone());
    from_iter::<_, Infallible>(vec![1, 2])
      .tap(move |v| c1.borrow_mut().push(format!("tap {v}")))
      .subscribe(move |v| c2.borrow_mut().push(format!("got {v}")));

    assert_eq!(*log.borrow(), vec!["tap 1", "got 1", "tap 2", "got 2"]);
  }

  #[test]
  fn try_tap_failure_errors_the_stream() {
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    from_iter(vec![1, 2, 3])
      .try_tap(|v| if *v == 2 { Err("two") } else { Ok(()) })
      .subscribe_with(move |n| c_events.borrow_mut().push(n));

    assert_eq!(*events.borrow(), vec![Notification::Next(1), Notification::Error("two")]);
  }
}
