use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct MapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> MapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func } }
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> B + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<B, S::Err> + 'static,
  {
    let observer = MapObserver { observer, func: self.func };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<O, F, Item, B, Err> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// `map` with a fallible closure. The first `Err` is sent downstream as the
/// stream error and every later upstream notification is ignored.
#[derive(Clone)]
pub struct TryMapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> TryMapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TryMapOp { source, func } }
}

impl<S, F, B> Observable for TryMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> Result<B, S::Err> + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<B, S::Err> + 'static,
  {
    let observer = TryMapObserver { observer, func: self.func, done: false };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct TryMapObserver<O, F> {
  observer: O,
  func: F,
  done: bool,
}

impl<O, F, Item, B, Err> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.done {
      return;
    }
    match (self.func)(value) {
      Ok(v) => self.observer.next(v),
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
  fn primitive_type() {
    let sum = Rc::new(RefCell::new(0));
    let c_sum = sum.clone();
    from_iter::<_, Infallible>(100..101)
      .map(|v| v * 2)
      .subscribe(move |v| *c_sum.borrow_mut() += v);
    assert_eq!(*sum.borrow(), 200);
  }

  #[test]
  fn changes_item_type() {
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    from_iter::<_, Infallible>(vec![1, 2])
      .map(|v| format!("#{v}"))
      .subscribe(move |v| c_result.borrow_mut().push(v));
    assert_eq!(*result.borrow(), vec!["#1".to_string(), "#2".to_string()]);
  }

  #[test]
  fn try_map_error_terminates() {
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    let subscription = from_iter(1..10)
      .try_map(|v| if v < 3 { Ok(v * 10) } else { Err("too big") })
      .subscribe_with(move |n| c_events.borrow_mut().push(n));

    assert_eq!(
      *events.borrow(),
      vec![Notification::Next(10), Notification::Next(20), Notification::Error("too big")]
    );
    assert!(subscription.is_closed());
  }
}
