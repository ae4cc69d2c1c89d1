use crate::{observable::Observable, observer::Observer, subscription::Subscription};

/// Emits only the first `count` values, then completes.
///
/// Completing downstream unsubscribes the chain, so the upstream stops
/// producing as soon as the last value passed.
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { TakeOp { source, count } }
}

impl<S> Observable for TakeOp<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, mut observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    if self.count == 0 {
      observer.complete();
      return;
    }
    let observer = TakeObserver { observer, remaining: self.count, done: false };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct TakeObserver<O> {
  observer: O,
  remaining: usize,
  done: bool,
}

impl<O, Item, Err> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.done {
      return;
    }
    self.remaining -= 1;
    self.observer.next(value);
    if self.remaining == 0 {
      self.done = true;
      self.observer.complete();
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
