use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct FilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> FilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { FilterOp { source, filter } }
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    self
      .source
      .actual_subscribe(FilterObserver { observer, filter: self.filter }, subscription)
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<O, F, Item, Err> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// `filter` with a fallible predicate; an `Err` terminates the stream.
#[derive(Clone)]
pub struct TryFilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> TryFilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { TryFilterOp { source, filter } }
}

impl<S, F> Observable for TryFilterOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> Result<bool, S::Err> + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let observer = TryFilterObserver { observer, filter: self.filter, done: false };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct TryFilterObserver<O, F> {
  observer: O,
  filter: F,
  done: bool,
}

impl<O, F, Item, Err> Observer<Item, Err> for TryFilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    if self.done {
      return;
    }
    match (self.filter)(&value) {
      Ok(true) => self.observer.next(value),
      Ok(false) => {}
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
